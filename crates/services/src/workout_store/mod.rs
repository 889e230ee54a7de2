//! The workout progress store: in-memory week progress with ordered
//! write-through, a duplicate-completion guard, and the rest timer driver.

mod config;
mod guard;
mod rest_timer;
mod store;
mod writer;

pub use config::StoreConfig;
pub use rest_timer::RestTimerHandle;
pub use store::{SetOutcome, WorkoutStore};
pub use writer::PersistEvent;
