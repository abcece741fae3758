use serde::{Deserialize, Serialize};

use crate::certificate::payload::CertificateData;
use crate::errors::EditError;
use crate::geometry::PageGeometry;
use crate::pagination::PaginationResult;
use crate::sections::SectionRegistry;

/// Work-order identification printed on every page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub work: String,
    pub version: String,
}

/// Partial metadata update. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataPatch {
    #[serde(default)]
    pub work: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl Metadata {
    pub fn apply(&mut self, patch: MetadataPatch) {
        if let Some(work) = patch.work {
            self.work = work;
        }
        if let Some(version) = patch.version {
            self.version = version;
        }
    }
}

/// Full state of one certificate being edited.
///
/// `pagination` is derived from `page` and `sections`; only
/// [`crate::certificate::CertificateStore`] writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateState {
    pub page: PageGeometry,
    #[serde(default)]
    pub pagination: PaginationResult,
    pub metadata: Metadata,
    pub sections: SectionRegistry,
    pub data: CertificateData,
}

impl CertificateState {
    /// Checks what deserialization alone cannot: the geometry invariants.
    /// Section ids and payload shape are checked while deserializing.
    pub fn validate(&self) -> Result<(), EditError> {
        self.page.validate()
    }
}
