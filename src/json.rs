//! # Respuestas JSON por ventanas
//! src/json.rs
//!
//! `JsonResponse` envuelve un documento `serde_json::Value` que la
//! aplicación arma en memoria. El texto serializado nunca se materializa
//! completo: cada ventana vuelve a serializar el documento y solo copia los
//! bytes que caen dentro de ella.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use http_handlers::json::JsonResponse;
//! use http_handlers::http::StatusCode;
//!
//! let mut json = JsonResponse::new(false);
//! json.root_mut()["temperature"] = 21.5.into();
//! json.root_mut()["unit"] = "C".into();
//!
//! let response = json.into_response();
//! assert_eq!(response.status(), StatusCode::Ok);
//! // {"temperature":21.5,"unit":"C"}
//! assert_eq!(response.content_length(), Some(31));
//! ```

use std::io;

use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::{Map, Serializer, Value};
use serde::Serialize;
use tracing::warn;

use crate::content::{ByteCounter, ChunkWindow, ChunkedContent};
use crate::http::{Response, StatusCode};

/// Content-Type de los documentos JSON
pub const JSON_MIMETYPE: &str = "application/json";

/// Documento JSON que se serializa bajo demanda
#[derive(Debug, Clone)]
pub struct JsonResponse {
    root: Value,
    status: StatusCode,
    pretty: bool,
    /// Largo serializado; 0 = sin calcular, vacío o inválido
    content_length: usize,
}

impl JsonResponse {
    /// Crea una respuesta con raíz objeto (`{}`) o arreglo (`[]`)
    pub fn new(is_array: bool) -> Self {
        let root = if is_array {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
        Self::from_value(root)
    }

    /// Igual que `new` pero con salida indentada
    pub fn pretty(is_array: bool) -> Self {
        Self {
            pretty: true,
            ..Self::new(is_array)
        }
    }

    /// Envuelve un documento ya construido
    pub fn from_value(root: Value) -> Self {
        Self {
            root,
            status: StatusCode::Ok,
            pretty: false,
            content_length: 0,
        }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Acceso mutable a la raíz. Solo se puede usar antes de medir el
    /// documento: después de `declared_content_length()` el largo queda fijo.
    pub fn root_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Calcula (una sola vez) el largo serializado del documento.
    ///
    /// Debe llamarse antes de negociar el Content-Length. Retorna 0 si el
    /// documento no se pudo serializar.
    pub fn declared_content_length(&mut self) -> usize {
        if self.content_length == 0 {
            let mut counter = ByteCounter::new();
            match self.serialize_into(&mut counter) {
                Ok(()) => self.content_length = counter.count(),
                Err(e) => warn!(error = %e, "json document could not be measured"),
            }
        }
        self.content_length
    }

    /// `false` si el documento mide 0: la respuesta no debe enviarse
    pub fn producible(&self) -> bool {
        self.content_length > 0
    }

    /// Convierte el documento en una `Response` lista para el transporte
    pub fn into_response(mut self) -> Response {
        let length = self.declared_content_length();
        let status = self.status;
        let valid = self.producible();
        let mut response = Response::new(status)
            .with_header("Content-Type", JSON_MIMETYPE)
            .with_content(Box::new(self), Some(length));
        if !valid {
            response.mark_source_invalid();
        }
        response
    }

    fn serialize_into<W: io::Write>(&self, writer: W) -> serde_json::Result<()> {
        if self.pretty {
            write_with(writer, PrettyFormatter::new(), &self.root)
        } else {
            write_with(writer, CompactFormatter, &self.root)
        }
    }
}

fn write_with<W: io::Write, F: Formatter>(
    writer: W,
    formatter: F,
    value: &Value,
) -> serde_json::Result<()> {
    let mut serializer = Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)
}

impl ChunkedContent for JsonResponse {
    fn fill_window(&mut self, offset: usize, dest: &mut [u8]) -> usize {
        if offset >= self.content_length {
            return 0;
        }
        let limit = (self.content_length - offset).min(dest.len());
        let mut window = ChunkWindow::with_limit(dest, offset, limit);
        if let Err(e) = self.serialize_into(&mut window) {
            // Ventana llena: el serializador se corta a propósito
            if !window.is_full() {
                warn!(offset, error = %e, "json serialization failed mid-stream");
            }
        }
        window.written()
    }
}
