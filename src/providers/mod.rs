pub mod cbr;
pub mod iso4217;
pub mod util;

// Re-export the fetch traits next to their implementations
pub use crate::core::fetch::{RateFetcher, ReferenceFetcher};
