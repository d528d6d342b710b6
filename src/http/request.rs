//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser mínimo de la cabecera de un request (request line + headers) y la
//! vista de solo lectura que consumen los handlers.
//!
//! ## Formato de la cabecera
//!
//! ```text
//! POST /api/echo?verbose=1 HTTP/1.1\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 7\r\n
//! \r\n
//! ```
//!
//! El body **no** se guarda aquí: el dispatcher lo entrega por partes a
//! `WebHandler::handle_body`. Lo único que el request guarda del body es el
//! `PendingBody` que un handler decida reservar, y se libera junto con el
//! request.

use std::collections::HashMap;

use thiserror::Error;

use super::body::PendingBody;
use super::method::Method;

/// Nombre especial: el handler quiere conservar todos los headers
pub const ANY_HEADER: &str = "ANY";

/// Request HTTP visto por los handlers
#[derive(Debug)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path de la petición sin query (ej: "/index.html")
    path: String,

    /// Query parameters parseados (ej: {"verbose": "1"})
    query_params: HashMap<String, String>,

    /// Headers HTTP, con el nombre en minúsculas
    headers: HashMap<String, String>,

    /// Versión HTTP ("HTTP/1.0" o "HTTP/1.1")
    version: String,

    /// Content-Type tal cual lo envió el cliente (vacío si no vino)
    content_type: String,

    /// Content-Length declarado (0 si no vino)
    content_length: usize,

    /// Headers que el handler elegido pidió conservar (en minúsculas)
    interesting_headers: Vec<String>,

    /// Body acumulado para este request, si algún handler lo reservó
    pending_body: Option<PendingBody>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Aún no llegó la línea vacía que cierra los headers
    #[error("Incomplete HTTP request")]
    IncompleteRequest,

    /// Formato inválido de la request line
    #[error("Invalid request line format")]
    InvalidRequestLine,

    /// Método HTTP no soportado
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Versión HTTP incorrecta
    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    /// Header malformado
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Content-Length que no es un número
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// Request vacío
    #[error("Empty request")]
    EmptyRequest,
}

impl Request {
    /// Crea un request sin headers. Útil para dispatchers propios y tests.
    pub fn new(method: Method, path: &str) -> Self {
        let (path, query_params) = Self::parse_path_and_query(path);
        Self {
            method,
            path,
            query_params,
            headers: HashMap::new(),
            version: "HTTP/1.1".to_string(),
            content_type: String::new(),
            content_length: 0,
            interesting_headers: Vec::new(),
            pending_body: None,
        }
    }

    /// Agrega un header (versión builder)
    ///
    /// `Content-Type` y `Content-Length` también actualizan sus campos
    /// dedicados.
    ///
    /// # Ejemplo
    /// ```
    /// use http_handlers::http::{Method, Request};
    ///
    /// let request = Request::new(Method::POST, "/api")
    ///     .with_header("Content-Type", "application/json");
    /// assert_eq!(request.content_type(), "application/json");
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.insert_header(name, value);
        self
    }

    fn insert_header(&mut self, name: &str, value: &str) {
        let key = name.trim().to_ascii_lowercase();
        let value = value.trim().to_string();
        match key.as_str() {
            "content-type" => self.content_type = value.clone(),
            "content-length" => self.content_length = value.parse().unwrap_or(0),
            _ => {}
        }
        self.headers.insert(key, value);
    }

    /// Parsea la cabecera de un request HTTP desde bytes
    ///
    /// # Retorna
    ///
    /// * `Ok((Request, usize))` - Request y cantidad de bytes que ocupó la
    ///   cabecera (incluyendo el `\r\n\r\n` final); lo que sigue es body.
    /// * `Err(ParseError)` - Error durante el parsing
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use http_handlers::http::Request;
    ///
    /// let raw = b"GET /index.html?lang=es HTTP/1.0\r\nAccept-Encoding: gzip\r\n\r\n";
    /// let (request, head_len) = Request::parse_head(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/index.html");
    /// assert_eq!(request.query_param("lang"), Some("es"));
    /// assert_eq!(request.header("accept-encoding"), Some("gzip"));
    /// assert_eq!(head_len, raw.len());
    /// ```
    pub fn parse_head(buffer: &[u8]) -> Result<(Self, usize), ParseError> {
        if buffer.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyRequest);
        }

        let head_end = buffer
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .ok_or(ParseError::IncompleteRequest)?;

        let head = std::str::from_utf8(&buffer[..head_end])
            .map_err(|_| ParseError::InvalidRequestLine)?;

        let mut lines = head.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::IncompleteRequest)?;

        // 1. Request line
        let (method, target, version) = Self::parse_request_line(request_line)?;
        let mut request = Request::new(method, target);
        request.version = version;

        // 2. Headers
        for line in lines {
            let Some(colon_pos) = line.find(':') else {
                return Err(ParseError::InvalidHeader(line.to_string()));
            };
            let name = &line[..colon_pos];
            let value = &line[colon_pos + 1..];
            if name.trim().eq_ignore_ascii_case("content-length")
                && value.trim().parse::<usize>().is_err()
            {
                return Err(ParseError::InvalidContentLength(value.trim().to_string()));
            }
            request.insert_header(name, value);
        }

        Ok((request, head_end + 4))
    }

    /// Parsea la request line
    ///
    /// Formato: `GET /path?query HTTP/1.0`
    fn parse_request_line(line: &str) -> Result<(Method, &str, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Debe tener exactamente 3 partes: METHOD PATH VERSION
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::parse(parts[0])?;

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, parts[1], version))
    }

    /// Separa el path de la query string
    ///
    /// Ejemplo: "/api?num=10&fast=true" → ("/api", {"num": "10", "fast": "true"})
    fn parse_path_and_query(path_with_query: &str) -> (String, HashMap<String, String>) {
        match path_with_query.split_once('?') {
            Some((path, query)) => (Self::url_decode(path), Self::parse_query_string(query)),
            None => (Self::url_decode(path_with_query), HashMap::new()),
        }
    }

    fn parse_query_string(query: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();

        for param in query.split('&') {
            if param.is_empty() {
                continue;
            }

            match param.split_once('=') {
                Some((key, value)) => {
                    params.insert(key.to_string(), Self::url_decode(&value.replace('+', " ")));
                }
                // Parámetro sin valor (ej: "?debug")
                None => {
                    params.insert(param.to_string(), String::new());
                }
            }
        }

        params
    }

    /// Decodifica secuencias `%XX`. Una secuencia inválida se deja tal cual.
    fn url_decode(s: &str) -> String {
        let bytes = s.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' && i + 2 < bytes.len() {
                if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    out.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
            out.push(bytes[i]);
            i += 1;
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el path del request (sin query string)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Alias de `path()`
    pub fn url(&self) -> &str {
        &self.path
    }

    /// Obtiene un query parameter específico
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Obtiene todos los headers (nombres en minúsculas)
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Content-Type declarado por el cliente (vacío si no vino)
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Content-Length declarado por el cliente (0 si no vino)
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Declara un header que el dispatcher debe conservar para este request.
    ///
    /// `"ANY"` conserva todos.
    pub fn add_interesting_header(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        if !self.interesting_headers.contains(&name) {
            self.interesting_headers.push(name);
        }
    }

    /// Headers declarados como interesantes (en minúsculas)
    pub fn interesting_headers(&self) -> &[String] {
        &self.interesting_headers
    }

    /// Descarta los headers que ningún handler declaró como interesantes.
    ///
    /// Lo llama el dispatcher después de elegir handler. Content-Type y
    /// Content-Length sobreviven siempre en sus campos dedicados.
    pub fn retain_interesting_headers(&mut self) {
        let any = ANY_HEADER.to_ascii_lowercase();
        if self.interesting_headers.contains(&any) {
            return;
        }
        let keep = &self.interesting_headers;
        self.headers.retain(|name, _| keep.contains(name));
    }

    /// Body pendiente de este request, si algún handler lo reservó
    pub fn pending_body(&self) -> Option<&PendingBody> {
        self.pending_body.as_ref()
    }

    pub fn pending_body_mut(&mut self) -> Option<&mut PendingBody> {
        self.pending_body.as_mut()
    }

    /// Body pendiente del request, creándolo con `init` si todavía no
    /// existe. Solo la primera llamada reserva: el buffer nunca se reemplaza.
    pub fn pending_body_or_init<F>(&mut self, init: F) -> &mut PendingBody
    where
        F: FnOnce() -> PendingBody,
    {
        self.pending_body.get_or_insert_with(init)
    }

    /// Libera el body pendiente y lo retorna
    pub fn take_pending_body(&mut self) -> Option<PendingBody> {
        self.pending_body.take()
    }
}

/// Valor de un dígito hexadecimal (`None` si no lo es)
fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET / HTTP/1.0\r\n\r\n";
        let (request, len) = Request::parse_head(raw).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(len, raw.len());
    }

    #[test]
    fn test_parse_with_query_params() {
        let raw = b"GET /api/status?verbose=1&name=a+b HTTP/1.1\r\n\r\n";
        let (request, _) = Request::parse_head(raw).unwrap();

        assert_eq!(request.path(), "/api/status");
        assert_eq!(request.query_param("verbose"), Some("1"));
        assert_eq!(request.query_param("name"), Some("a b"));
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let raw = b"GET / HTTP/1.0\r\nIf-None-Match: \"abc\"\r\nAccept-Encoding: gzip\r\n\r\n";
        let (request, _) = Request::parse_head(raw).unwrap();

        assert_eq!(request.header("if-none-match"), Some("\"abc\""));
        assert_eq!(request.header("ACCEPT-ENCODING"), Some("gzip"));
        assert!(!request.has_header("If-Modified-Since"));
    }

    #[test]
    fn test_content_fields() {
        let raw = b"POST /api HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 7\r\n\r\n{\"a\":1}";
        let (request, len) = Request::parse_head(raw).unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.content_type(), "application/json");
        assert_eq!(request.content_length(), 7);
        assert_eq!(&raw[len..], b"{\"a\":1}");
    }

    #[test]
    fn test_url_decode_path() {
        let raw = b"GET /my%20file.txt HTTP/1.0\r\n\r\n";
        let (request, _) = Request::parse_head(raw).unwrap();
        assert_eq!(request.path(), "/my file.txt");
    }

    #[test]
    fn test_url_decode_rejects_signed_hex() {
        let raw = b"GET /a%+1b%2Fc%zz HTTP/1.0\r\n\r\n";
        let (request, _) = Request::parse_head(raw).unwrap();
        assert_eq!(request.path(), "/a%+1b/c%zz");
    }

    #[test]
    fn test_incomplete_head() {
        let raw = b"GET / HTTP/1.0\r\nHost: x\r\n";
        assert_eq!(
            Request::parse_head(raw).unwrap_err(),
            ParseError::IncompleteRequest
        );
    }

    #[test]
    fn test_invalid_version() {
        let raw = b"GET / HTTP/2.0\r\n\r\n";
        let result = Request::parse_head(raw);

        assert!(matches!(result, Err(ParseError::InvalidHttpVersion(_))));
    }

    #[test]
    fn test_invalid_content_length() {
        let raw = b"POST / HTTP/1.0\r\nContent-Length: lots\r\n\r\n";
        let result = Request::parse_head(raw);

        assert!(matches!(result, Err(ParseError::InvalidContentLength(_))));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(
            Request::parse_head(b""),
            Err(ParseError::EmptyRequest)
        ));
    }

    #[test]
    fn test_invalid_request_line() {
        let raw = b"GET\r\n\r\n";
        let result = Request::parse_head(raw);

        assert!(matches!(result, Err(ParseError::InvalidRequestLine)));
    }

    #[test]
    fn test_retain_interesting_headers() {
        let mut request = Request::new(Method::GET, "/")
            .with_header("If-None-Match", "\"x\"")
            .with_header("User-Agent", "curl")
            .with_header("Content-Type", "text/plain");

        request.add_interesting_header("If-None-Match");
        request.retain_interesting_headers();

        assert_eq!(request.header("If-None-Match"), Some("\"x\""));
        assert_eq!(request.header("User-Agent"), None);
        // El Content-Type sobrevive en su campo propio
        assert_eq!(request.content_type(), "text/plain");
    }

    #[test]
    fn test_retain_any_keeps_everything() {
        let mut request = Request::new(Method::GET, "/")
            .with_header("X-One", "1")
            .with_header("X-Two", "2");

        request.add_interesting_header(ANY_HEADER);
        request.retain_interesting_headers();

        assert_eq!(request.headers().len(), 2);
    }

    #[test]
    fn test_pending_body_installed_once() {
        let mut request = Request::new(Method::POST, "/api");
        request.pending_body_or_init(|| PendingBody::allocate(10, 100));
        request.pending_body_or_init(|| PendingBody::allocate(20, 100));

        let body = request.pending_body().unwrap();
        assert_eq!(body.total(), 10);
        assert_eq!(body.buffer().map(|b| b.len()), Some(10));
    }
}
