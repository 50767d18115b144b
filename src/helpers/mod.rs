//! Helper functions for templates and page generation

mod date;
mod url;

pub use date::*;
pub use url::*;
