// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod fetch;
pub mod localtime;
pub mod model;
pub mod observe;
pub mod pipeline;
pub mod sanitize;
pub mod sources;
pub mod xmltv;

// ---- Re-exports for stable public API ----
pub use crate::config::GuideConfig;
pub use crate::model::{Channel, Programme};
pub use crate::pipeline::{build_guide, collect_all};
pub use crate::sources::{ProgrammeSource, ScheduleWindow};
