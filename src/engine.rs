//! The decode-engine seam.
//!
//! The player drives an external media engine through these traits: it can
//! set options and properties, issue commands, and ask a software render
//! context to draw the current frame into a caller-supplied RGBA buffer.
//! The engine calls back on its own threads when a new frame is ready; the
//! callback must therefore be `Send + Sync` and cheap.

use std::sync::Arc;
use thiserror::Error;

/// Invoked by the engine whenever a new frame should be rendered.
///
/// May be called from any engine-internal thread, at any rate.
pub type FrameCallback = Arc<dyn Fn() + Send + Sync>;

/// An error code reported by the decode engine (negative, engine-defined).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("engine error {code}: {message}")]
pub struct EngineError {
    pub code: i32,
    pub message: String,
}

impl EngineError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Failure modes of a single render call. Both are non-fatal to the
/// pipeline: the pass is skipped and the next decode signal retries.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The engine rejected the render parameters, typically because the
    /// target geometry no longer matches the stream.
    #[error("invalid render parameter (stale output geometry?)")]
    InvalidParameter,

    /// Any other engine render failure, carrying the engine's code.
    #[error("render failed with code {0}")]
    Failed(i32),
}

/// Destination for one software-rendered frame.
///
/// Pixel format is fixed: tightly-packed 32-bit RGBA, row-major,
/// `stride == width * 4`, no padding.
pub struct RenderTarget<'a> {
    pub pixels: &'a mut [u8],
    pub width: u32,
    pub height: u32,
    pub stride: usize,
}

/// Capability surface of the external media decode engine.
///
/// Teardown is `Drop`. A session drops its [`RenderContext`] before
/// dropping the engine that created it.
pub trait DecodeEngine: Send {
    /// Set a pre-initialization option.
    fn set_option(&self, key: &str, value: &str) -> Result<(), EngineError>;

    /// Finish engine setup; options set afterwards go through
    /// [`set_property`](Self::set_property).
    fn initialize(&mut self) -> Result<(), EngineError>;

    fn set_property(&self, key: &str, value: &str) -> Result<(), EngineError>;

    fn get_property_i64(&self, key: &str) -> Result<i64, EngineError>;

    fn get_property_string(&self, key: &str) -> Result<String, EngineError>;

    /// Issue a command, e.g. `["loadfile", url]`.
    fn command(&self, args: &[&str]) -> Result<(), EngineError>;

    /// Create a software-output render context bound to this engine and
    /// register `on_update` as its new-frame callback.
    fn create_render_context(
        &mut self,
        on_update: FrameCallback,
    ) -> Result<Box<dyn RenderContext>, EngineError>;
}

/// A configured software-output binding of the engine.
pub trait RenderContext: Send {
    /// Render the current frame into `target`. Expected to return promptly
    /// (software path, bounded by frame size).
    fn render(&mut self, target: RenderTarget<'_>) -> Result<(), RenderError>;
}

/// Produces a fresh engine instance for each session.
pub type EngineFactory =
    Box<dyn Fn() -> Result<Box<dyn DecodeEngine>, EngineError> + Send + Sync>;
