//! Domain model for the workout tracker: plan templates, the progress overlay,
//! the rest timer, plan documents, and weight records.

#![forbid(unsafe_code)]

pub mod default_plan;
pub mod model;
pub mod plan_document;
pub mod time;

pub use default_plan::default_plan;
pub use time::Clock;
