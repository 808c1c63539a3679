//! Method-style control surface.
//!
//! Mirrors a host-side method channel: calls arrive as a method name plus a
//! string argument map and yield a success value, a coded error, or
//! not-implemented. The transport itself (dispatch, marshaling) belongs to
//! the host and stays outside this crate.

use crate::error::Error;
use crate::session::SessionController;
use std::collections::HashMap;

/// String argument map accompanying a method call.
pub type Args = HashMap<String, String>;

/// Outcome of one control-surface call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodResponse {
    /// The call succeeded; `init` carries the surface handle.
    Success(Option<i64>),
    /// The call failed with a stable code and a human-readable message.
    Error { code: &'static str, message: String },
    /// The method name is not part of the control surface.
    NotImplemented,
}

/// Dispatches control methods onto a [`SessionController`].
pub struct ControlSurface {
    controller: SessionController,
}

impl ControlSurface {
    pub fn new(controller: SessionController) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Handle one method call.
    ///
    /// `pause` and `dispose` are tolerant of a missing session and always
    /// succeed in that case; every other failure maps to a stable error
    /// code.
    pub fn call(&self, method: &str, args: &Args) -> MethodResponse {
        log::debug!("method called: {method}");
        match method {
            "init" => match self.controller.init() {
                Ok(surface) => MethodResponse::Success(Some(surface.0)),
                Err(err) => error_response(err),
            },
            "load" => {
                let Some(url) = args.get("url") else {
                    return error_response(Error::MissingArgument("url"));
                };
                match self.controller.load(url) {
                    Ok(()) => MethodResponse::Success(None),
                    Err(err) => error_response(err),
                }
            }
            "play" => match self.controller.play() {
                Ok(()) => MethodResponse::Success(None),
                Err(err) => error_response(err),
            },
            "pause" => match self.controller.pause() {
                Ok(()) => MethodResponse::Success(None),
                Err(err) => error_response(err),
            },
            "dispose" => match self.controller.dispose() {
                Ok(()) => MethodResponse::Success(None),
                Err(err) => error_response(err),
            },
            _ => MethodResponse::NotImplemented,
        }
    }
}

fn error_response(err: Error) -> MethodResponse {
    let code = match &err {
        Error::AlreadyInitialized => "ALREADY",
        Error::NotInitialized => "NOT_INIT",
        Error::MissingArgument(_) => "ARG",
        Error::EngineCreateFailed(_) => "ENGINE_CREATE",
        Error::EngineInitFailed(_) => "ENGINE_INIT",
        Error::LoadFailed(_) => "LOAD",
        Error::Engine(_) => "ENGINE",
    };
    log::warn!("method failed with {code}: {err}");
    MethodResponse::Error {
        code,
        message: err.to_string(),
    }
}
