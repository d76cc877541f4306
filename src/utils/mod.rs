//! Utility functions and types

mod stats;

pub use stats::cohens_d;
