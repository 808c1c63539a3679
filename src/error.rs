use crate::engine::EngineError;
use thiserror::Error;

/// Errors surfaced by the player's control operations.
///
/// Render failures never appear here: they are logged and the frame is
/// skipped, with the next decode signal retrying naturally.
#[derive(Debug, Error)]
pub enum Error {
    /// A live session already exists; `dispose` it before re-initializing.
    #[error("player already initialized")]
    AlreadyInitialized,

    /// The operation needs a live session and none exists.
    #[error("player not initialized")]
    NotInitialized,

    /// A required call argument was absent.
    #[error("missing required argument `{0}`")]
    MissingArgument(&'static str),

    /// The decode engine could not be created.
    #[error("engine creation failed")]
    EngineCreateFailed(#[source] EngineError),

    /// The decode engine rejected initialization.
    #[error("engine initialization failed")]
    EngineInitFailed(#[source] EngineError),

    /// The engine rejected the load command for the given source.
    #[error("load command rejected")]
    LoadFailed(#[source] EngineError),

    /// Any other engine-reported failure.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
