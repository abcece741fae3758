//! Page margins and the linking invariant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::EditError;

/// One side of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    pub fn as_str(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Right => "right",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
        }
    }
}

impl FromStr for Edge {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Edge::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EditError::InvalidValue(format!("unknown margin edge '{s}'")))
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four edge distances in the document unit.
///
/// While `linked` is true all four values are equal: a write to any edge is a
/// write to every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
    pub linked: bool,
}

impl Margin {
    /// Linked margin with the same distance on every edge.
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
            linked: true,
        }
    }

    pub fn get(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
        }
    }

    /// Returns a copy with `edge` set to `value`, or every edge when linked.
    pub(crate) fn with_edge(mut self, edge: Edge, value: f64) -> Self {
        if self.linked {
            return Self::uniform(value);
        }
        match edge {
            Edge::Top => self.top = value,
            Edge::Right => self.right = value,
            Edge::Bottom => self.bottom = value,
            Edge::Left => self.left = value,
        }
        self
    }

    /// Returns a copy with the linked flag changed. Linking snapshots `top`.
    pub(crate) fn with_linked(self, linked: bool) -> Self {
        match (self.linked, linked) {
            (false, true) => Self::uniform(self.top),
            _ => Self { linked, ..self },
        }
    }

    /// Applies `f` to every edge distance.
    pub(crate) fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
            left: f(self.left),
            linked: self.linked,
        }
    }

    /// True when the linking invariant holds.
    pub fn is_consistent(&self) -> bool {
        !self.linked
            || (self.top == self.right && self.top == self.bottom && self.top == self.left)
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unlinked() -> Margin {
        Margin {
            top: 10.0,
            right: 12.0,
            bottom: 14.0,
            left: 16.0,
            linked: false,
        }
    }

    #[test]
    fn test_unlinked_write_touches_one_edge() {
        let m = unlinked().with_edge(Edge::Bottom, 30.0);
        assert_eq!(m.bottom, 30.0);
        assert_eq!((m.top, m.right, m.left), (10.0, 12.0, 16.0));
    }

    #[test]
    fn test_linked_write_propagates() {
        let m = Margin::uniform(20.0).with_edge(Edge::Left, 5.0);
        for edge in Edge::ALL {
            assert_eq!(m.get(edge), 5.0);
        }
        assert!(m.linked);
    }

    #[test]
    fn test_linking_snapshots_top() {
        let m = unlinked().with_linked(true);
        assert!(m.linked);
        assert_eq!(m, Margin::uniform(10.0));
    }

    #[test]
    fn test_unlinking_keeps_values() {
        let m = Margin::uniform(8.0).with_linked(false);
        assert!(!m.linked);
        assert_eq!((m.top, m.right, m.bottom, m.left), (8.0, 8.0, 8.0, 8.0));
        let m = m.with_edge(Edge::Top, 3.0);
        assert_eq!(m.top, 3.0);
        assert_eq!(m.right, 8.0);
    }

    #[test]
    fn test_consistency_check() {
        assert!(Margin::uniform(1.0).is_consistent());
        assert!(unlinked().is_consistent());
        let broken = Margin {
            linked: true,
            ..unlinked()
        };
        assert!(!broken.is_consistent());
    }

    #[test]
    fn test_edge_parse() {
        assert_eq!("Top".parse::<Edge>().unwrap(), Edge::Top);
        assert!("middle".parse::<Edge>().is_err());
    }
}
