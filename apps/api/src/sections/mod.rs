//! Section Registry — the ordered list of certificate sections.
//!
//! Sequence order is print order. Ids come from a counter that only moves
//! forward, so a removed id is never handed out again for the life of the
//! registry. Page assignment is not stored here; it is derived by
//! [`crate::pagination`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::EditError;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Stable identity of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub u32);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named unit of certificate content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    /// Display label shown in the editor.
    pub name: String,
    /// Renderable content unit. Opaque to the engine.
    pub component: String,
    /// Measured or estimated height in the page unit, supplied by the renderer.
    #[serde(default)]
    pub render_height: f64,
}

/// Ordered section list plus the id allocator.
///
/// Serializes as a plain array of sections. Deserializing checks id uniqueness
/// and resumes the allocator after the largest id seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Section>", into = "Vec<Section>")]
pub struct SectionRegistry {
    sections: Vec<Section>,
    next_id: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Registry operations
// ────────────────────────────────────────────────────────────────────────────

impl SectionRegistry {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            next_id: 1,
        }
    }

    /// Inserts a new section at `index` (default: end) and returns its id.
    pub fn add_section(
        &mut self,
        name: impl Into<String>,
        component: impl Into<String>,
        index: Option<usize>,
    ) -> Result<SectionId, EditError> {
        let len = self.sections.len();
        let index = index.unwrap_or(len);
        if index > len {
            return Err(EditError::InvalidIndex { index, len });
        }
        let section = self.allocate(name.into(), component.into())?;
        let id = section.id;
        self.sections.insert(index, section);
        Ok(id)
    }

    /// Removes a section and returns it. Later sections shift up by one.
    pub fn remove_section(&mut self, id: SectionId) -> Result<Section, EditError> {
        let pos = self.position(id)?;
        Ok(self.sections.remove(pos))
    }

    /// Moves a section to `new_index`, keeping every other relative order.
    pub fn reorder(&mut self, id: SectionId, new_index: usize) -> Result<(), EditError> {
        let pos = self.position(id)?;
        let len = self.sections.len();
        if new_index >= len {
            return Err(EditError::InvalidIndex {
                index: new_index,
                len,
            });
        }
        let section = self.sections.remove(pos);
        self.sections.insert(new_index, section);
        Ok(())
    }

    pub fn rename(&mut self, id: SectionId, name: impl Into<String>) -> Result<(), EditError> {
        let pos = self.position(id)?;
        self.sections[pos].name = name.into();
        Ok(())
    }

    /// Records a fresh measurement for one section.
    pub fn update_render_height(&mut self, id: SectionId, height: f64) -> Result<(), EditError> {
        check_height(id, height)?;
        let pos = self.position(id)?;
        self.sections[pos].render_height = height;
        Ok(())
    }

    /// Records a whole layout pass. Either every height is applied or none is.
    pub fn update_render_heights(&mut self, heights: &[(SectionId, f64)]) -> Result<(), EditError> {
        let mut positions = Vec::with_capacity(heights.len());
        for &(id, height) in heights {
            check_height(id, height)?;
            positions.push(self.position(id)?);
        }
        for (pos, &(_, height)) in positions.into_iter().zip(heights) {
            self.sections[pos].render_height = height;
        }
        Ok(())
    }

    fn allocate(&mut self, name: String, component: String) -> Result<Section, EditError> {
        let id = SectionId(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or_else(|| {
            EditError::InvalidValue(format!("no section ids left after {id}"))
        })?;
        Ok(Section {
            id,
            name,
            component,
            render_height: 0.0,
        })
    }

    // ── queries ─────────────────────────────────────────────────────────────

    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SectionId) -> bool {
        self.get(id).is_some()
    }

    pub fn position(&self, id: SectionId) -> Result<usize, EditError> {
        self.sections
            .iter()
            .position(|s| s.id == id)
            .ok_or(EditError::NotFound(id))
    }

    pub fn as_slice(&self) -> &[Section] {
        &self.sections
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    pub fn ids(&self) -> Vec<SectionId> {
        self.sections.iter().map(|s| s.id).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<Section>> for SectionRegistry {
    type Error = EditError;

    fn try_from(sections: Vec<Section>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        for section in &sections {
            if section.id.0 == 0 {
                return Err(EditError::InvalidPayload(
                    "section ids must be positive".to_string(),
                ));
            }
            if !seen.insert(section.id) {
                return Err(EditError::InvalidPayload(format!(
                    "duplicate section id {}",
                    section.id
                )));
            }
            check_height(section.id, section.render_height)?;
        }
        let largest = sections.iter().map(|s| s.id.0).max().unwrap_or(0);
        let next_id = largest.checked_add(1).ok_or_else(|| {
            EditError::InvalidPayload(format!(
                "section id {largest} leaves no ids for new sections"
            ))
        })?;
        Ok(Self { sections, next_id })
    }
}

impl From<SectionRegistry> for Vec<Section> {
    fn from(registry: SectionRegistry) -> Self {
        registry.sections
    }
}

impl<'a> IntoIterator for &'a SectionRegistry {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

fn check_height(id: SectionId, height: f64) -> Result<(), EditError> {
    if !height.is_finite() || height < 0.0 {
        return Err(EditError::InvalidValue(format!(
            "render height of section {id} must be a non-negative number, got {height}"
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
