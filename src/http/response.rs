//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Una `Response` tiene status, headers y, opcionalmente, un productor de
//! body (`ChunkedContent`). El transporte escribe primero `head_bytes()` y
//! después pide ventanas con `fill_window` hasta que retorna 0.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use http_handlers::http::{Response, StatusCode};
//!
//! let mut response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("Hello");
//!
//! let mut buf = [0u8; 16];
//! let n = response.fill_window(0, &mut buf);
//! assert_eq!(&buf[..n], b"Hello");
//! ```

use std::collections::HashMap;
use std::fmt;

use super::StatusCode;
use crate::content::{BytesContent, ChunkedContent};

/// Respuesta HTTP con body producido por ventanas
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// Headers HTTP. Usamos HashMap para evitar duplicados
    headers: HashMap<String, String>,

    /// Largo del body si se conoce de antemano
    content_length: Option<usize>,

    /// Productor del body (None = sin body)
    body: Option<Box<dyn ChunkedContent>>,

    /// `false` si el productor no puede generar nada: no se debe enviar
    source_valid: bool,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            content_length: None,
            body: None,
            source_valid: true,
        }
    }

    /// Agrega un header a la respuesta (versión builder).
    ///
    /// Si el header ya existe, se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo de la respuesta desde un string
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo de la respuesta desde bytes
    pub fn with_body_bytes(self, body: Vec<u8>) -> Self {
        let len = body.len();
        self.with_content(Box::new(BytesContent::new(body)), Some(len))
    }

    /// Establece un productor de body.
    ///
    /// Con `length = None` la respuesta no lleva Content-Length y el
    /// transporte transmite hasta que el productor se agota.
    pub fn with_content(mut self, content: Box<dyn ChunkedContent>, length: Option<usize>) -> Self {
        self.body = Some(content);
        self.content_length = length;
        match length {
            Some(len) => self.add_header("Content-Length", &len.to_string()),
            None => self
                .headers
                .retain(|name, _| !name.eq_ignore_ascii_case("Content-Length")),
        }
        self
    }

    /// Crea una respuesta de error con mensaje JSON
    ///
    /// Formato del JSON: `{"error": "mensaje"}`
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(&body)
    }

    /// Marca la respuesta como no transmisible
    pub fn mark_source_invalid(&mut self) {
        self.source_valid = false;
    }

    /// `false` si el body no se pudo producir y la respuesta no debe enviarse
    pub fn is_source_valid(&self) -> bool {
        self.source_valid
    }

    /// Escribe en `dest` la ventana del body que empieza en `offset`.
    ///
    /// Retorna 0 al final del body, o siempre si la respuesta no tiene body.
    pub fn fill_window(&mut self, offset: usize, dest: &mut [u8]) -> usize {
        if !self.status.allows_body() {
            return 0;
        }
        let Some(body) = self.body.as_mut() else {
            return 0;
        };
        let dest = match self.content_length {
            Some(len) if offset >= len => return 0,
            Some(len) => {
                let limit = (len - offset).min(dest.len());
                &mut dest[..limit]
            }
            None => dest,
        };
        body.fill_window(offset, dest)
    }

    /// Status line + headers + línea vacía
    ///
    /// Formato:
    /// ```text
    /// HTTP/1.0 200 OK\r\n
    /// Header-Name: Value\r\n
    /// \r\n
    /// ```
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut result = Vec::new();

        // 1. Status line
        result.extend_from_slice(format!("HTTP/1.0 {}\r\n", self.status).as_bytes());

        // 2. Headers
        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        if self.body.is_none() && self.status.allows_body() {
            result.extend_from_slice(b"Content-Length: 0\r\n");
        }

        // 3. Línea vacía que separa headers del body
        result.extend_from_slice(b"\r\n");

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Busca un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Largo del body si se conoce
    pub fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some() && self.status.allows_body()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("content_length", &self.content_length)
            .field("has_body", &self.body.is_some())
            .field("source_valid", &self.source_valid)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(response: &mut Response) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = response.fill_window(out.len(), &mut buf);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[test]
    fn test_new_response() {
        let mut response = Response::new(StatusCode::NotFound);
        assert_eq!(response.status(), StatusCode::NotFound);
        assert!(response.headers().is_empty());
        assert!(!response.has_body());
        assert!(body_of(&mut response).is_empty());
    }

    #[test]
    fn test_with_header_overwrites_case_insensitively() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_header("content-type", "text/html");

        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/html"));
    }

    #[test]
    fn test_with_body() {
        let mut response = Response::new(StatusCode::Ok).with_body("Hello World");

        assert_eq!(response.header("Content-Length"), Some("11"));
        assert_eq!(response.content_length(), Some(11));
        assert_eq!(body_of(&mut response), b"Hello World");
    }

    #[test]
    fn test_error_response_escapes_message() {
        let mut response = Response::error(StatusCode::BadRequest, "bad \"input\"");

        assert_eq!(response.status(), StatusCode::BadRequest);
        let body: serde_json::Value = serde_json::from_slice(&body_of(&mut response)).unwrap();
        assert_eq!(body["error"], "bad \"input\"");
    }

    #[test]
    fn test_not_modified_never_has_body() {
        let mut response = Response::new(StatusCode::NotModified).with_body("stale");
        assert!(!response.has_body());
        assert!(body_of(&mut response).is_empty());
    }

    #[test]
    fn test_head_bytes() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body("Test");

        let text = String::from_utf8(response.head_bytes()).unwrap();
        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_empty_response_declares_zero_length() {
        let text = String::from_utf8(Response::new(StatusCode::NotFound).head_bytes()).unwrap();
        assert!(text.contains("Content-Length: 0\r\n"));

        let text = String::from_utf8(Response::new(StatusCode::NotModified).head_bytes()).unwrap();
        assert!(!text.contains("Content-Length"));
    }

    #[test]
    fn test_unknown_length_content() {
        let content = Box::new(BytesContent::new(b"streamed".to_vec()));
        let mut response = Response::new(StatusCode::Ok).with_content(content, None);

        assert_eq!(response.header("Content-Length"), None);
        assert_eq!(body_of(&mut response), b"streamed");
    }
}
