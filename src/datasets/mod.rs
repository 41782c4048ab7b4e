/// Product reviews with binary feedback labels
pub mod reviews;

/// Downsampling to equal class counts
pub mod balance;

pub use balance::balance;
pub use reviews::{Feedback, Review};

/// Dataset Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DatasetError {
    /// A required column is absent from the header row
    #[error("missing required column {0}")]
    MissingColumn(String),

    /// One of the labels has no rows, so there is nothing to balance against
    #[error("cannot balance classes: no rows labeled {0}")]
    EmptyClass(Feedback),
}
