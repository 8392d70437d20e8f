use thiserror::Error;

/// Integrity problems in a loaded snapshot that make analysis impossible.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("no current gameweek found in bootstrap data")]
    NoCurrentGameweek,
    #[error("no pages to display")]
    NoPages,
}
