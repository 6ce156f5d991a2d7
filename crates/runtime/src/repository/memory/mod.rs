//! In-memory repository implementations for testing and development.

mod rating;

pub use rating::InMemoryRatingRepository;
