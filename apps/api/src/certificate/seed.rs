//! Seed certificate used when no other certificate has been loaded.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::info;

use crate::certificate::model::{CertificateState, Metadata};
use crate::certificate::payload::CertificateData;
use crate::errors::EditError;
use crate::geometry::PageGeometry;
use crate::pagination::PaginationResult;
use crate::sections::SectionRegistry;

/// `(display name, component)` in print order.
pub const SEED_SECTIONS: [(&str, &str); 7] = [
    ("Header", "HeaderSection"),
    ("Customer & Instrument Details", "CustomerDetailsSection"),
    ("Calibration Data", "CalibrationDataSection"),
    ("Reference Instrument", "ReferenceInstrumentSection"),
    ("Traceability Statement", "TraceabilityStatementSection"),
    ("Uncertainty Statement", "UncertaintyStatementSection"),
    ("Footer", "FooterSection"),
];

/// A4, millimetres, 20 mm linked margins, the seven standard sections and the
/// example calibration payload. Pagination is left for the store to derive.
pub fn default_certificate() -> Result<CertificateState, EditError> {
    let mut sections = SectionRegistry::new();
    for (name, component) in SEED_SECTIONS {
        sections.add_section(name, component, None)?;
    }

    Ok(CertificateState {
        page: PageGeometry::default(),
        pagination: PaginationResult::default(),
        metadata: Metadata {
            work: "WN25-77".to_string(),
            version: "LC5643UUC97B".to_string(),
        },
        sections,
        data: CertificateData::new(seed_payload())?,
    })
}

/// Reads a seed certificate from a JSON file and checks its invariants.
pub fn load_seed(path: &Path) -> Result<CertificateState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed certificate {}", path.display()))?;
    let state: CertificateState = serde_json::from_str(&raw)
        .with_context(|| format!("Seed certificate {} is not a valid certificate", path.display()))?;
    state
        .validate()
        .with_context(|| format!("Seed certificate {} has invalid page geometry", path.display()))?;
    info!(
        path = %path.display(),
        sections = state.sections.len(),
        "Loaded seed certificate"
    );
    Ok(state)
}

fn seed_payload() -> Value {
    let reference = |id: u32, serial: &str| {
        json!({
            "id": id,
            "equipment": "Leak Standard",
            "serial": serial,
            "traceability": "...",
            "certificate": "...",
            "due": "2025-06-30"
        })
    };

    json!({
        "certificateNo": "UAL/000087/25",
        "customer": {
            "name": "Metquay Inc",
            "address": ""
        },
        "dates": {
            "issue": "2025-06-16",
            "received": "2025-06-16",
            "calibrated": "2025-06-16",
            "due": "2026-06-16"
        },
        "instrument": {
            "type": "Leak Standard",
            "manufacturer": "",
            "model": "CM551.0-7104BVP/2",
            "serial": "2001",
            "tag": ""
        },
        "conditions": {
            "location": "At Lab",
            "dataType": "As Found & As Left",
            "humidity": "55 %rh",
            "temperature": "20 °C",
            "workProcedure": "LSP 101",
            "asFound": "",
            "asLeft": ""
        },
        "referenceInstruments": [
            reference(1, "111962"),
            reference(2, "191829"),
            reference(3, "ETEMP-01"),
            reference(4, "80824")
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::SectionId;
    use std::io::Write;

    #[test]
    fn test_seed_payload_passes_shape_checks() {
        assert!(CertificateData::new(seed_payload()).is_ok());
        let seed = default_certificate().unwrap();
        assert_eq!(
            seed.data.get("certificateNo"),
            Some(&json!("UAL/000087/25"))
        );
    }

    #[test]
    fn test_seed_sections_in_order() {
        let seed = default_certificate().unwrap();
        let names: Vec<&str> = seed.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), 7);
        assert_eq!(names[0], "Header");
        assert_eq!(names[6], "Footer");
        assert_eq!(seed.sections.ids().first(), Some(&SectionId(1)));
        assert_eq!(seed.sections.ids().last(), Some(&SectionId(7)));
    }

    #[test]
    fn test_seed_geometry() {
        let seed = default_certificate().unwrap();
        assert!(seed.validate().is_ok());
        assert_eq!(seed.page.content_area_height(), 257.0);
        assert!(seed.page.margin().linked);
        assert_eq!(seed.metadata.work, "WN25-77");
    }

    #[test]
    fn test_load_seed_round_trips_through_file() {
        let mut seed = default_certificate().unwrap();
        seed.metadata.version = "FROM-FILE".to_string();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string_pretty(&seed).unwrap().as_bytes())
            .unwrap();

        let loaded = load_seed(file.path()).unwrap();
        assert_eq!(loaded, seed);
    }

    #[test]
    fn test_load_seed_rejects_bad_geometry() {
        let mut value = serde_json::to_value(default_certificate().unwrap()).unwrap();
        value["page"]["height"] = json!(30.0);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(value.to_string().as_bytes()).unwrap();

        let err = load_seed(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid page geometry"));
    }

    #[test]
    fn test_load_seed_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_seed(&dir.path().join("absent.json")).is_err());
    }
}
