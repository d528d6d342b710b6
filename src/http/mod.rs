//! # Módulo HTTP
//!
//! Tipos HTTP que comparten los handlers y el transporte:
//!
//! - Parsing de la cabecera de un request
//! - Métodos y máscaras de métodos
//! - Body pendiente de un request (`PendingBody`)
//! - Respuestas con body producido por ventanas
//! - Códigos de estado
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 304 Not Modified\r\n
//! ETag: "5d41402abc4b2a76"\r\n
//! Cache-Control: max-age=600\r\n
//! \r\n
//! ```

pub mod body;
pub mod method;
pub mod request;
pub mod response;
pub mod status;

// Re-exportamos los tipos principales para facilitar su uso
pub use body::PendingBody;
pub use method::{Method, MethodMask};
pub use request::{ParseError, Request, ANY_HEADER};
pub use response::Response;
pub use status::StatusCode;
