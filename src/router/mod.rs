//! # Despacho de handlers
//! src/router/mod.rs
//!
//! El dispatcher decide qué handler atiende cada request.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Dispatcher ─┬→ filter + can_handle (en orden de registro)
//!                       ├→ retain_interesting_headers
//!                       └→ WebHandler → Response
//! ```
//!
//! Un handler no trivial (con callback de request) gana sobre uno trivial
//! aunque el trivial se haya registrado antes. Si nadie acepta el request se
//! responde 404 Not Found.

use std::sync::Arc;

use tracing::debug;

use crate::handlers::WebHandler;
use crate::http::{Request, Response, StatusCode};

/// Nombre del servidor en las respuestas
pub const SERVER_NAME: &str = "http-handlers/0.1";

/// Lista ordenada de handlers
pub struct Dispatcher {
    handlers: Vec<Arc<dyn WebHandler>>,
}

impl Dispatcher {
    /// Crea un dispatcher vacío
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Registra un handler al final de la lista
    ///
    /// # Ejemplo
    /// ```
    /// use http_handlers::handlers::CallbackHandler;
    /// use http_handlers::router::Dispatcher;
    /// use http_handlers::http::{Request, Response, StatusCode};
    ///
    /// let mut hello = CallbackHandler::new();
    /// hello
    ///     .set_uri("/hello")
    ///     .on_request(|_req: &mut Request| Response::new(StatusCode::Ok));
    ///
    /// let mut dispatcher = Dispatcher::new();
    /// dispatcher.add(hello);
    /// assert_eq!(dispatcher.len(), 1);
    /// ```
    pub fn add<H: WebHandler + 'static>(&mut self, handler: H) -> Arc<H> {
        let handler = Arc::new(handler);
        self.handlers.push(Arc::clone(&handler) as Arc<dyn WebHandler>);
        handler
    }

    /// Registra un handler ya compartido
    pub fn add_shared(&mut self, handler: Arc<dyn WebHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Elige el handler para el request.
    ///
    /// Después de elegir, el request conserva solo los headers que el
    /// handler elegido (o los que se consultaron) pidieron.
    pub fn select(&self, request: &mut Request) -> Option<Arc<dyn WebHandler>> {
        let mut trivial: Option<&Arc<dyn WebHandler>> = None;
        let mut chosen: Option<&Arc<dyn WebHandler>> = None;

        for handler in &self.handlers {
            if !handler.filter(request) || !handler.can_handle(request) {
                continue;
            }
            if !handler.is_request_handler_trivial() {
                chosen = Some(handler);
                break;
            }
            if trivial.is_none() {
                trivial = Some(handler);
            }
        }

        request.retain_interesting_headers();
        chosen.or(trivial).map(Arc::clone)
    }

    /// Atiende un request cuyo body ya se recibió completo
    ///
    /// # Ejemplo
    /// ```
    /// use http_handlers::router::Dispatcher;
    /// use http_handlers::http::{Request, StatusCode};
    ///
    /// let dispatcher = Dispatcher::new();
    /// let (mut request, _) = Request::parse_head(b"GET /nada HTTP/1.0\r\n\r\n").unwrap();
    /// let response = dispatcher.dispatch(&mut request, &[]);
    /// assert_eq!(response.status(), StatusCode::NotFound);
    /// ```
    pub fn dispatch(&self, request: &mut Request, body: &[u8]) -> Response {
        let mut response = match self.select(request) {
            Some(handler) => {
                if !body.is_empty() {
                    handler.handle_body(request, body, 0, body.len());
                }
                handler.handle_request(request)
            }
            None => Self::not_found(request),
        };
        Self::add_common_headers(&mut response);
        response
    }

    /// Respuesta cuando ningún handler acepta el request
    pub fn not_found(request: &Request) -> Response {
        debug!(method = %request.method(), path = request.path(), "no handler");
        Response::error(
            StatusCode::NotFound,
            &format!("Route not found: {}", request.path()),
        )
    }

    /// Agrega headers comunes a todas las respuestas
    pub fn add_common_headers(response: &mut Response) {
        response.add_header("Server", SERVER_NAME);
        response.add_header("Connection", "close");
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::CallbackHandler;
    use crate::http::{Method, MethodMask};
    use std::sync::Mutex;

    fn handler_with_body(uri: &str, body: &'static str) -> CallbackHandler {
        let mut handler = CallbackHandler::new();
        handler
            .set_uri(uri)
            .on_request(move |_req: &mut Request| Response::new(StatusCode::Ok).with_body(body));
        handler
    }

    fn body_text(response: &mut Response) -> String {
        let mut buf = [0u8; 256];
        let n = response.fill_window(0, &mut buf);
        String::from_utf8_lossy(&buf[..n]).to_string()
    }

    #[test]
    fn test_dispatcher_creation() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_first_acceptor_wins() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.add(handler_with_body("/api", "first"));
        dispatcher.add(handler_with_body("/api", "second"));

        let mut request = Request::new(Method::GET, "/api/x");
        let mut response = dispatcher.dispatch(&mut request, &[]);
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(body_text(&mut response), "first");
    }

    #[test]
    fn test_non_trivial_beats_trivial() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.add(CallbackHandler::new());
        dispatcher.add(handler_with_body("/", "real"));

        let mut request = Request::new(Method::GET, "/");
        let mut response = dispatcher.dispatch(&mut request, &[]);
        assert_eq!(body_text(&mut response), "real");
    }

    #[test]
    fn test_trivial_used_when_alone() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.add(CallbackHandler::new());

        let mut request = Request::new(Method::GET, "/");
        let response = dispatcher.dispatch(&mut request, &[]);
        assert_eq!(response.status(), StatusCode::InternalServerError);
    }

    #[test]
    fn test_filter_skips_handler() {
        let mut dispatcher = Dispatcher::new();
        let mut admin = handler_with_body("/", "admin");
        admin.set_filter(|req: &Request| req.has_header("X-Admin"));
        dispatcher.add(admin);
        dispatcher.add(handler_with_body("/", "public"));

        let mut request = Request::new(Method::GET, "/");
        let mut response = dispatcher.dispatch(&mut request, &[]);
        assert_eq!(body_text(&mut response), "public");

        let mut request = Request::new(Method::GET, "/").with_header("X-Admin", "1");
        let mut response = dispatcher.dispatch(&mut request, &[]);
        assert_eq!(body_text(&mut response), "admin");
    }

    #[test]
    fn test_route_not_found() {
        let mut dispatcher = Dispatcher::new();
        let mut only_post = handler_with_body("/api", "x");
        only_post.set_method(MethodMask::POST);
        dispatcher.add(only_post);

        let mut request = Request::new(Method::GET, "/api");
        let response = dispatcher.dispatch(&mut request, &[]);
        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.header("Connection"), Some("close"));
        assert_eq!(response.header("Server"), Some(SERVER_NAME));
    }

    #[test]
    fn test_select_prunes_headers() {
        let mut dispatcher = Dispatcher::new();
        let mut only_post = handler_with_body("/", "x");
        only_post.set_method(MethodMask::POST);
        dispatcher.add(only_post);

        let mut request = Request::new(Method::GET, "/")
            .with_header("Accept-Encoding", "gzip")
            .with_header("X-Other", "1");
        assert!(dispatcher.select(&mut request).is_none());
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_dispatch_feeds_body() {
        let received = Arc::new(Mutex::new(Vec::new()));

        let mut dispatcher = Dispatcher::new();
        let mut echo = CallbackHandler::new();
        let sink = Arc::clone(&received);
        echo.on_body(move |_req: &mut Request, data: &[u8], index, total| {
            assert_eq!((index, total), (0, 4));
            sink.lock().unwrap().extend_from_slice(data);
        })
        .on_request(|_req: &mut Request| Response::new(StatusCode::Ok));
        dispatcher.add(echo);

        let mut request = Request::new(Method::POST, "/");
        let response = dispatcher.dispatch(&mut request, b"ping");
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(received.lock().unwrap().as_slice(), b"ping");
    }
}
