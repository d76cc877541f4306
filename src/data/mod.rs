//! Data access: CSV I/O, the train/validation split and SQL extraction.
//!
//! The encoding and training modules never touch the filesystem; everything
//! that does lives here.

mod extraction;
mod loader;
mod split;

pub use extraction::{
    connect, extract, run_query_and_save, ConnectionProfile, ExtractionConfig, ExtractionJob,
    QuerySource, QuerySpec, SqlConnection, TableSource,
};
pub use loader::{DataLoader, DataSaver};
pub use split::{train_validation_split, TrainValidationSplit};
