//! Content provider.
//!
//! Static capybara images and facts. Selection is stateless: random,
//! by index, or derived from the current UTC day/hour.

pub mod facts;
pub mod library;

pub use library::{CapyImage, CapyLibrary, ContentError, Page};
