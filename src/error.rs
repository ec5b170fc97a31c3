//=========================================================================
// Errors
//=========================================================================
//
// EngineError
//   ├─ Precondition   calling-contract violation (caller bug)
//   └─ Platform       window / event loop failure (fatal for the caller)
//
// Neither kind is retried by the engine.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== PlatformError =======================================================

/// Window system failures.
///
/// These are fatal: without a window and event loop there is nothing to
/// run.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Failed to create the event loop (OS-level issue, or a second loop).
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[from] winit::error::EventLoopError),

    /// The OS refused to create the window.
    #[error("window creation failed: {0}")]
    WindowCreation(#[from] winit::error::OsError),

    /// The event loop never delivered the window (no `resumed` event).
    #[error("window was not created by the event loop")]
    WindowUnavailable,
}

//=== EngineError =========================================================

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An operation was called out of order, such as running before
    /// `init`, initializing twice, or rendering without a live camera.
    #[error("precondition violated: {0}")]
    Precondition(&'static str),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_implement_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
        assert_error::<EngineError>();
    }

    #[test]
    fn precondition_display() {
        let error = EngineError::Precondition("engine is not initialized");
        assert_eq!(error.to_string(), "precondition violated: engine is not initialized");
    }

    #[test]
    fn platform_error_converts_transparently() {
        let error: EngineError = PlatformError::WindowUnavailable.into();
        assert!(matches!(error, EngineError::Platform(PlatformError::WindowUnavailable)));
        assert_eq!(error.to_string(), "window was not created by the event loop");
    }
}
