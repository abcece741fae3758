//! Certificate layout engine: page geometry, section registry, pagination, and the
//! state container that keeps them consistent, plus the HTTP surface the editor uses.

pub mod certificate;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod pagination;
pub mod routes;
pub mod sections;
pub mod state;
