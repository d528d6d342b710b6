//! # Handler de body JSON
//! src/handlers/json_body.rs
//!
//! Acumula el body del request en un buffer acotado, lo parsea como JSON
//! y llama al callback de la aplicación con el documento.
//!
//! | Situación                               | Respuesta |
//! |-----------------------------------------|-----------|
//! | body válido                             | callback  |
//! | sin body, body inválido o sin memoria   | 400       |
//! | total declarado > máximo                | 413       |
//! | sin callback                            | 500       |

use std::sync::Arc;

use serde_json::{Deserializer, Value};
use tracing::{debug, warn};

use super::{uri_matches, RequestFilter, WebHandler};
use crate::error::HandlerError;
use crate::http::{MethodMask, PendingBody, Request, Response, ANY_HEADER};
use crate::json::JSON_MIMETYPE;

/// Máximo de body por defecto (bytes)
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16384;

/// Función que recibe el documento ya parseado
pub type JsonRequestCallback = Arc<dyn Fn(&mut Request, Value) -> Response + Send + Sync>;

pub struct JsonBodyHandler {
    uri: String,
    methods: MethodMask,
    on_request: Option<JsonRequestCallback>,
    max_content_length: usize,
    filter: Option<RequestFilter>,
}

impl JsonBodyHandler {
    /// Handler para `uri` que acepta POST, PUT y PATCH
    pub fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            methods: MethodMask::WRITE,
            on_request: None,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            filter: None,
        }
    }

    pub fn set_method(&mut self, methods: MethodMask) -> &mut Self {
        self.methods = methods;
        self
    }

    pub fn set_max_content_length(&mut self, max: usize) -> &mut Self {
        self.max_content_length = max;
        self
    }

    pub fn on_request<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut Request, Value) -> Response + Send + Sync + 'static,
    {
        self.on_request = Some(Arc::new(callback));
        self
    }

    pub fn set_filter<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn max_content_length(&self) -> usize {
        self.max_content_length
    }

    /// Saca el body del request y lo parsea. El buffer se libera aquí,
    /// antes de llamar al callback.
    fn take_document(&self, request: &mut Request) -> Result<Value, HandlerError> {
        let body = request
            .take_pending_body()
            .ok_or_else(|| HandlerError::BadRequest("no body received".to_string()))?;

        if body.exceeds_limit() {
            return Err(HandlerError::PayloadTooLarge {
                total: body.total(),
                max: body.max(),
            });
        }

        let Some(buffer) = body.buffer() else {
            return Err(if body.total() > 0 {
                HandlerError::AllocationFailure(body.total())
            } else {
                HandlerError::BadRequest("empty body".to_string())
            });
        };

        parse_leading_document(buffer)
    }
}

/// Parsea el primer documento JSON del buffer.
///
/// El buffer mide el total declarado; si llegaron menos bytes, el resto
/// quedó en cero y se ignora junto con cualquier otro byte después del
/// documento.
fn parse_leading_document(buffer: &[u8]) -> Result<Value, HandlerError> {
    let end = buffer.iter().rposition(|&b| b != 0).map_or(0, |last| last + 1);
    match Deserializer::from_slice(&buffer[..end]).into_iter::<Value>().next() {
        Some(Ok(document)) => Ok(document),
        Some(Err(e)) => Err(HandlerError::BadRequest(e.to_string())),
        None => Err(HandlerError::BadRequest("empty body".to_string())),
    }
}

/// Compara solo el tipo de medio: `application/json; charset=utf-8` vale
fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(JSON_MIMETYPE))
}

impl WebHandler for JsonBodyHandler {
    fn filter(&self, request: &Request) -> bool {
        self.filter.as_ref().map_or(true, |f| f(request))
    }

    fn can_handle(&self, request: &mut Request) -> bool {
        if !self.methods.contains(request.method()) {
            return false;
        }
        if !uri_matches(&self.uri, request.path()) {
            return false;
        }
        if !is_json_content_type(request.content_type()) {
            return false;
        }
        request.add_interesting_header(ANY_HEADER);
        true
    }

    fn handle_request(&self, request: &mut Request) -> Response {
        let Some(callback) = &self.on_request else {
            return HandlerError::Unconfigured.into_response();
        };

        match self.take_document(request) {
            Ok(document) => callback(request, document),
            Err(e) => {
                if matches!(e, HandlerError::AllocationFailure(_)) {
                    warn!(path = request.path(), error = %e, "json body dropped");
                }
                e.into_response()
            }
        }
    }

    fn handle_body(&self, request: &mut Request, data: &[u8], index: usize, total: usize) {
        if self.on_request.is_none() {
            return;
        }
        let max = self.max_content_length;
        let body = request.pending_body_or_init(|| PendingBody::allocate(total, max));
        let copied = body.write_at(index, data);
        if copied < data.len() && body.has_buffer() {
            debug!(index, len = data.len(), copied, "body chunk outside declared length");
        }
    }

    fn is_request_handler_trivial(&self) -> bool {
        self.on_request.is_none()
    }
}
