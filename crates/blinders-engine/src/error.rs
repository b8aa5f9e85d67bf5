use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the blinders engine and its collaborators.
///
/// The engine never returns these to its callers; they surface from
/// collaborator implementations (e.g. an overlay host that cannot create a
/// window) and are logged where they are handled.
#[derive(Debug, Error)]
pub enum Error {
    /// The overlay host could not create or manipulate an overlay surface.
    #[error("Overlay error: {0}")]
    Overlay(String),

    /// Operation must be executed on the main thread.
    #[error("Operation requires main thread")]
    MainThread,

    /// Generic error with context.
    #[error("Engine error: {0}")]
    Msg(String),
}
