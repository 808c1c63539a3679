//! # Soft Video Player
//!
//! A software-rendered video playback pipeline: an external decode engine
//! draws frames into a shared RGBA pixel buffer, and a presentation host is
//! pinged whenever a fresh frame is ready to copy out.
//!
//! ## Features
//!
//! - Pluggable decode engine and presentation host (trait seams)
//! - Coalesced frame scheduling: the engine may signal faster than the
//!   consumer renders, at most one pass is ever queued
//! - Tear-free shared frame buffer with mid-stream resolution changes
//! - Session lifecycle with idempotent pause/dispose and deferred
//!   render-context activation
//! - Method-style control surface (init / load / play / pause / dispose)
//!
//! ## Example
//!
//! ```rust,no_run
//! use soft_video_player::{ControlSurface, SessionController};
//! use std::collections::HashMap;
//!
//! # fn collaborators() -> (soft_video_player::EngineFactory, std::sync::Arc<dyn soft_video_player::PresentationHost>) { unimplemented!() }
//! let (engine_factory, host) = collaborators();
//! let surface = ControlSurface::new(SessionController::new(engine_factory, host));
//!
//! let _response = surface.call("init", &HashMap::new());
//! let mut args = HashMap::new();
//! args.insert("url".to_string(), "https://example.com/stream.m3u8".to_string());
//! surface.call("load", &args);
//! surface.call("play", &args);
//! ```

mod control;
mod engine;
mod error;
mod frame_buffer;
mod main_context;
mod presentation;
mod render_pass;
mod scheduler;
mod session;

pub use control::{Args, ControlSurface, MethodResponse};
pub use engine::{
    DecodeEngine, EngineError, EngineFactory, FrameCallback, RenderContext, RenderError,
    RenderTarget,
};
pub use error::Error;
pub use frame_buffer::{BYTES_PER_PIXEL, ConsumerFrame, FrameBuffer};
pub use presentation::{PresentationHost, SurfaceId};
pub use render_pass::Diagnostics;
pub use session::SessionController;

// Re-export commonly used types
pub use url::Url;
