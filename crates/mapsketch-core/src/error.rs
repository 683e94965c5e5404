use thiserror::Error;

/// Errors raised by the core data model.
///
/// Store operations themselves never fail; these cover parsing of
/// user-supplied values such as colours.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("invalid colour: {0:?}")]
    InvalidColor(String),
}
