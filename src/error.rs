//! Errores de los handlers.
//!
//! Ningún error sale de un handler: todos terminan convertidos en una
//! respuesta HTTP con `into_response()`.

use thiserror::Error;
use tracing::debug;

use crate::http::{Response, StatusCode};

/// Motivos por los que un handler no puede servir un request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("no variant of the resource exists: {0}")]
    NotFound(String),

    #[error("path escapes the served directory: {0}")]
    PathTraversal(String),

    #[error("declared body of {total} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { total: usize, max: usize },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("no request callback configured")]
    Unconfigured,

    #[error("could not allocate {0} bytes for the request body")]
    AllocationFailure(usize),
}

impl HandlerError {
    /// Código HTTP con el que se responde este error
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::NotFound(_) => StatusCode::NotFound,
            HandlerError::PathTraversal(_) => StatusCode::BadRequest,
            HandlerError::PayloadTooLarge { .. } => StatusCode::PayloadTooLarge,
            HandlerError::BadRequest(_) => StatusCode::BadRequest,
            HandlerError::Unconfigured => StatusCode::InternalServerError,
            // Sin buffer es lo mismo que no haber recibido body
            HandlerError::AllocationFailure(_) => StatusCode::BadRequest,
        }
    }

    /// Respuesta sin body con el código del error
    pub fn into_response(self) -> Response {
        debug!(status = self.status().as_u16(), reason = %self, "request rejected");
        Response::new(self.status())
    }
}

impl From<HandlerError> for Response {
    fn from(err: HandlerError) -> Self {
        err.into_response()
    }
}
