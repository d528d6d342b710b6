//! # Handlers
//! src/handlers/mod.rs
//!
//! Un handler decide si atiende un request (`can_handle`), recibe el body
//! por partes (`handle_body` / `handle_upload`) y al final produce la
//! respuesta (`handle_request`).
//!
//! ## Ciclo de vida de un request
//!
//! ```text
//! dispatcher → filter + can_handle (en orden de registro)
//!            → handle_body / handle_upload (0..n veces)
//!            → handle_request → Response → ventanas al socket
//! ```
//!
//! Una misma instancia atiende muchos requests a la vez, por eso ningún
//! handler guarda estado de un request: todo lo transitorio vive en el
//! `Request` (body pendiente) o en la `Response` (cursores del productor).

use std::sync::Arc;

use crate::http::{Request, Response};

pub mod callback;
pub mod json_body;
pub mod negotiation;
pub mod static_files;

pub use callback::CallbackHandler;
pub use json_body::JsonBodyHandler;
pub use negotiation::NegotiationStats;
pub use static_files::StaticHandler;

/// Filtro opcional que el dispatcher evalúa antes de `can_handle`
pub type RequestFilter = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Interfaz que el dispatcher usa con cada handler registrado
pub trait WebHandler: Send + Sync {
    /// Filtro previo a `can_handle` (por defecto acepta todo)
    fn filter(&self, _request: &Request) -> bool {
        true
    }

    /// `true` si este handler atiende el request.
    ///
    /// Aquí el handler declara con `add_interesting_header` los headers que
    /// el dispatcher debe conservar.
    fn can_handle(&self, request: &mut Request) -> bool;

    /// Produce la respuesta. Siempre retorna una: un request nunca queda
    /// sin contestar.
    fn handle_request(&self, request: &mut Request) -> Response;

    /// Un trozo del body: `data` va en la posición `index` de un body de
    /// `total` bytes.
    fn handle_body(&self, _request: &mut Request, _data: &[u8], _index: usize, _total: usize) {}

    /// Un trozo de un archivo subido por multipart
    fn handle_upload(
        &self,
        _request: &mut Request,
        _filename: &str,
        _index: usize,
        _data: &[u8],
        _is_final: bool,
    ) {
    }

    /// `true` si el handler no tiene lógica propia de request. El
    /// dispatcher lo usa solo como respaldo si nadie más acepta.
    fn is_request_handler_trivial(&self) -> bool {
        true
    }
}

/// Regla de prefijo compartida por todos los handlers.
///
/// Un prefijo vacío acepta cualquier path; si no, el path tiene que ser
/// igual al prefijo o empezar con `prefijo + "/"`.
///
/// # Ejemplo
/// ```
/// use http_handlers::handlers::uri_matches;
///
/// assert!(uri_matches("/api", "/api"));
/// assert!(uri_matches("/api", "/api/users"));
/// assert!(!uri_matches("/api", "/apiary"));
/// assert!(uri_matches("", "/cualquier/cosa"));
/// ```
pub fn uri_matches(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() || path == prefix {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_matches() {
        assert!(uri_matches("", "/"));
        assert!(uri_matches("/static", "/static"));
        assert!(uri_matches("/static", "/static/"));
        assert!(uri_matches("/static", "/static/css/app.css"));
        assert!(!uri_matches("/static", "/statics"));
        assert!(!uri_matches("/static", "/"));
        assert!(!uri_matches("/static", "/other/static"));
    }
}
