use thiserror::Error;

/// Errors that can occur during window and application operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Operation must be executed on the main thread.
    #[error("Operation requires main thread")]
    MainThread,

    /// No running application has the given pid.
    #[error("No running application with pid {0}")]
    AppNotFound(i32),

    /// Failed to activate the application.
    #[error("Activation failed")]
    ActivationFailed,

    /// AppKit refused to build an overlay window.
    #[error("Overlay window could not be created: {0}")]
    OverlayCreate(String),
}

/// Result alias for mac-winops operations.
pub type Result<T> = std::result::Result<T, Error>;
