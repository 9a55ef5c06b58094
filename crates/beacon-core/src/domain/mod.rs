//! Domain models for Beacon.
//!
//! - `StatusRecord`: normalized build status, match and wording rules
//! - `Project` / `AggregateProject`: monitored projects and groupings
//! - `ValidationErrors`: per-field validation failures

pub mod error;
pub mod project;
pub mod status;

pub use error::{BeaconError, FieldError, ValidationErrors};
pub use project::{AggregateProject, Project, ProjectId};
pub use status::{StatusRecord, StatusWord};
