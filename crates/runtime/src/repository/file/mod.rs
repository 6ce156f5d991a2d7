//! File-based repository implementations.

mod rating;

pub use rating::FileRatingRepository;
