//! Worker tasks that back the runtime orchestration.
//!
//! Each admitted session runs in its own session worker, while a single
//! rating worker serializes every write to battle records and profiles.

mod rating;
mod session;

pub use rating::{RatingHandle, RecordRequest};

pub(crate) use rating::RatingWorker;
pub(crate) use session::{SessionTimings, SessionWorker};
