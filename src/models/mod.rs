//! Data models for the link directory.
//!
//! These models are also the wire form stored in the document tree, so field
//! names follow the store's camelCase convention.

mod category;
mod listing;
mod profile;

pub use category::*;
pub use listing::*;
pub use profile::*;
