//! Certificate State Container — the single writer for one certificate.
//!
//! # Pipeline
//! Every mutation runs against a draft copy of the state. On success the draft
//! replaces the live state, pagination is re-derived, the revision counter moves,
//! and only then are observers called. On failure nothing changes and nobody is
//! notified, so observers never see a half-applied edit.
//!
//! The store is not internally synchronized. Callers sharing it across tasks wrap
//! it in a lock (the HTTP layer uses one `tokio::sync::Mutex` per session map).

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::certificate::model::{CertificateState, MetadataPatch};
use crate::certificate::seed::default_certificate;
use crate::errors::EditError;
use crate::geometry::Edge;
use crate::pagination::{paginate, resolve_current_page};
use crate::sections::{Section, SectionId};

/// Callback receiving every committed state.
pub type Observer = Box<dyn FnMut(&CertificateState) + Send>;

/// Handle returned by [`CertificateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct CertificateStore {
    state: CertificateState,
    /// Section the editor is looking at; the current page follows it.
    anchor: Option<SectionId>,
    revision: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl CertificateStore {
    /// Wraps `state` after validating it and deriving its pagination.
    pub fn new(state: CertificateState) -> Result<Self, EditError> {
        state.validate()?;
        let mut store = Self {
            state,
            anchor: None,
            revision: 0,
            observers: Vec::new(),
            next_subscription: 0,
        };
        store.repaginate();
        Ok(store)
    }

    /// Store holding the built-in seed certificate.
    pub fn seeded() -> Result<Self, EditError> {
        Self::new(default_certificate()?)
    }

    // ── reading ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> &CertificateState {
        &self.state
    }

    pub fn snapshot(&self) -> CertificateState {
        self.state.clone()
    }

    /// Number of committed mutations since the store was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Sections on the page currently in view.
    pub fn current_page_sections(&self) -> Vec<&Section> {
        let pagination = &self.state.pagination;
        let ids = pagination.sections_on_page(self.state.sections.as_slice(), pagination.current_page);
        self.state
            .sections
            .iter()
            .filter(|s| ids.contains(&s.id))
            .collect()
    }

    // ── observers ───────────────────────────────────────────────────────────

    /// Registers `observer` and calls it once with the current state.
    pub fn subscribe<F>(&mut self, mut observer: F) -> SubscriptionId
    where
        F: FnMut(&CertificateState) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        observer(&self.state);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Detaches an observer. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    // ── geometry ────────────────────────────────────────────────────────────

    pub fn set_format(&mut self, name: &str) -> Result<(), EditError> {
        self.commit(|s| s.page.set_format(name))
    }

    pub fn set_unit(&mut self, unit: &str) -> Result<(), EditError> {
        self.commit(|s| s.page.set_unit(unit))
    }

    pub fn set_margin(&mut self, edge: Edge, value: f64) -> Result<(), EditError> {
        self.commit(|s| s.page.set_margin(edge, value))
    }

    pub fn set_linked(&mut self, linked: bool) -> Result<(), EditError> {
        self.commit(|s| s.page.set_linked(linked))
    }

    pub fn set_dimensions(&mut self, width: f64, height: f64) -> Result<(), EditError> {
        self.commit(|s| s.page.set_dimensions(width, height))
    }

    // ── sections ────────────────────────────────────────────────────────────

    pub fn add_section(
        &mut self,
        name: &str,
        component: &str,
        index: Option<usize>,
    ) -> Result<SectionId, EditError> {
        self.commit(|s| s.sections.add_section(name, component, index))
    }

    pub fn remove_section(&mut self, id: SectionId) -> Result<Section, EditError> {
        self.commit(|s| s.sections.remove_section(id))
    }

    pub fn reorder_section(&mut self, id: SectionId, new_index: usize) -> Result<(), EditError> {
        self.commit(|s| s.sections.reorder(id, new_index))
    }

    pub fn rename_section(&mut self, id: SectionId, name: &str) -> Result<(), EditError> {
        self.commit(|s| s.sections.rename(id, name))
    }

    pub fn update_render_height(&mut self, id: SectionId, height: f64) -> Result<(), EditError> {
        self.commit(|s| s.sections.update_render_height(id, height))
    }

    /// Applies a full measurement pass with a single repagination and notification.
    pub fn update_render_heights(&mut self, heights: &[(SectionId, f64)]) -> Result<(), EditError> {
        self.commit(|s| s.sections.update_render_heights(heights))
    }

    // ── pagination ──────────────────────────────────────────────────────────

    pub fn set_pagination_enabled(&mut self, enabled: bool) -> Result<(), EditError> {
        self.commit(|s| {
            s.pagination.enabled = enabled;
            Ok(())
        })
    }

    /// Moves the view to `page` and starts tracking its first section.
    pub fn set_current_page(&mut self, page: u32) -> Result<(), EditError> {
        let total_pages = self.state.pagination.total_pages;
        if page < 1 || page > total_pages {
            return Err(EditError::OutOfRange { page, total_pages });
        }
        self.anchor = self
            .state
            .pagination
            .sections_on_page(self.state.sections.as_slice(), page)
            .first()
            .copied();
        self.state.pagination.current_page = page;
        self.publish();
        Ok(())
    }

    // ── payload ─────────────────────────────────────────────────────────────

    /// Merges `patch` (RFC 7396) into the certificate data.
    pub fn set_data(&mut self, patch: &Value) -> Result<(), EditError> {
        self.commit(|s| {
            s.data = s.data.merged(patch)?;
            Ok(())
        })
    }

    pub fn set_metadata(&mut self, patch: MetadataPatch) -> Result<(), EditError> {
        self.commit(|s| {
            s.metadata.apply(patch);
            Ok(())
        })
    }

    /// Replaces the whole certificate. Observers stay attached.
    pub fn load(&mut self, state: CertificateState) -> Result<(), EditError> {
        state.validate()?;
        self.state = state;
        self.anchor = None;
        self.repaginate();
        self.publish();
        Ok(())
    }

    // ── internals ───────────────────────────────────────────────────────────

    fn commit<T>(
        &mut self,
        op: impl FnOnce(&mut CertificateState) -> Result<T, EditError>,
    ) -> Result<T, EditError> {
        let mut draft = self.state.clone();
        let out = op(&mut draft)?;
        self.state = draft;
        self.repaginate();
        self.publish();
        Ok(out)
    }

    fn repaginate(&mut self) {
        let previous_page = self.state.pagination.current_page;
        let sections = self.state.sections.as_slice();
        let mut result = paginate(
            self.state.page.content_area_height(),
            sections,
            self.state.pagination.enabled,
        );
        self.anchor = resolve_current_page(&mut result, sections, previous_page, self.anchor);
        self.state.pagination = result;
    }

    fn publish(&mut self) {
        self.revision += 1;
        debug!(
            revision = self.revision,
            total_pages = self.state.pagination.total_pages,
            current_page = self.state.pagination.current_page,
            observers = self.observers.len(),
            "Committed certificate edit"
        );
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.state);
        }
    }
}

impl fmt::Debug for CertificateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateStore")
            .field("state", &self.state)
            .field("anchor", &self.anchor)
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
