//! # Handler genérico por callback
//! src/handlers/callback.rs
//!
//! Despacha a funciones de la aplicación según método y prefijo de URI.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use http_handlers::handlers::{CallbackHandler, WebHandler};
//! use http_handlers::http::{Method, MethodMask, Request, Response, StatusCode};
//!
//! let mut handler = CallbackHandler::new();
//! handler
//!     .set_uri("/hello")
//!     .set_method(MethodMask::GET)
//!     .on_request(|_req: &mut Request| Response::new(StatusCode::Ok).with_body("hola"));
//!
//! let mut request = Request::new(Method::GET, "/hello");
//! assert!(handler.can_handle(&mut request));
//! assert_eq!(handler.handle_request(&mut request).status(), StatusCode::Ok);
//! ```

use std::sync::Arc;

use super::{uri_matches, RequestFilter, WebHandler};
use crate::error::HandlerError;
use crate::http::{MethodMask, Request, Response, ANY_HEADER};

/// Función que atiende el request completo
pub type RequestCallback = Arc<dyn Fn(&mut Request) -> Response + Send + Sync>;

/// Función que recibe un trozo del body: `(request, data, index, total)`
pub type BodyCallback = Arc<dyn Fn(&mut Request, &[u8], usize, usize) + Send + Sync>;

/// Función que recibe un trozo de un upload:
/// `(request, filename, index, data, is_final)`
pub type UploadCallback = Arc<dyn Fn(&mut Request, &str, usize, &[u8], bool) + Send + Sync>;

/// Handler que delega en callbacks de la aplicación
pub struct CallbackHandler {
    uri: String,
    methods: MethodMask,
    on_request: Option<RequestCallback>,
    on_body: Option<BodyCallback>,
    on_upload: Option<UploadCallback>,
    filter: Option<RequestFilter>,
}

impl CallbackHandler {
    /// Handler sin URI (acepta cualquier path), cualquier método y sin
    /// callbacks
    pub fn new() -> Self {
        Self {
            uri: String::new(),
            methods: MethodMask::ANY,
            on_request: None,
            on_body: None,
            on_upload: None,
            filter: None,
        }
    }

    pub fn set_uri(&mut self, uri: &str) -> &mut Self {
        self.uri = uri.to_string();
        self
    }

    pub fn set_method(&mut self, methods: MethodMask) -> &mut Self {
        self.methods = methods;
        self
    }

    pub fn on_request<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut Request) -> Response + Send + Sync + 'static,
    {
        self.on_request = Some(Arc::new(callback));
        self
    }

    pub fn on_body<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut Request, &[u8], usize, usize) + Send + Sync + 'static,
    {
        self.on_body = Some(Arc::new(callback));
        self
    }

    pub fn on_upload<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut Request, &str, usize, &[u8], bool) + Send + Sync + 'static,
    {
        self.on_upload = Some(Arc::new(callback));
        self
    }

    pub fn set_filter<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Default for CallbackHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl WebHandler for CallbackHandler {
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
        request.add_interesting_header(ANY_HEADER);
        true
    }

    fn handle_request(&self, request: &mut Request) -> Response {
        match &self.on_request {
            Some(callback) => callback(request),
            None => HandlerError::Unconfigured.into_response(),
        }
    }

    fn handle_body(&self, request: &mut Request, data: &[u8], index: usize, total: usize) {
        if let Some(callback) = &self.on_body {
            callback(request, data, index, total);
        }
    }

    fn handle_upload(
        &self,
        request: &mut Request,
        filename: &str,
        index: usize,
        data: &[u8],
        is_final: bool,
    ) {
        if let Some(callback) = &self.on_upload {
            callback(request, filename, index, data, is_final);
        }
    }

    fn is_request_handler_trivial(&self) -> bool {
        self.on_request.is_none()
    }
}
