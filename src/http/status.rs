//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Los handlers solo responden con un conjunto pequeño de códigos:
//!
//! - **2xx**: 200 OK (recurso servido, documento JSON)
//! - **3xx**: 304 Not Modified (petición condicional, sin body)
//! - **4xx**: 400, 404, 413
//! - **5xx**: 500 (handler sin callback configurado)

/// Códigos de estado que producen los handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - Representación servida
    Ok = 200,

    /// 304 Not Modified - La copia en caché del cliente sigue vigente
    NotModified = 304,

    /// 400 Bad Request - Body ausente, JSON inválido o path con `..`
    BadRequest = 400,

    /// 404 Not Found - No existe ninguna variante del recurso
    NotFound = 404,

    /// 413 Payload Too Large - El body declarado supera el máximo
    PayloadTooLarge = 413,

    /// 500 Internal Server Error - No hay callback registrado
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use http_handlers::http::StatusCode;
    /// assert_eq!(StatusCode::NotModified.as_u16(), 304);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Indica si la respuesta con este código puede llevar body.
    ///
    /// Un 304 nunca lleva body, aunque tenga headers de caché.
    pub fn allows_body(&self) -> bool {
        !matches!(self, StatusCode::NotModified)
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::Ok.as_u16(), 200);
        assert_eq!(StatusCode::NotModified.as_u16(), 304);
        assert_eq!(StatusCode::BadRequest.as_u16(), 400);
        assert_eq!(StatusCode::NotFound.as_u16(), 404);
        assert_eq!(StatusCode::PayloadTooLarge.as_u16(), 413);
        assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    }

    #[test]
    fn test_reason_phrases() {
        assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
        assert_eq!(StatusCode::NotModified.reason_phrase(), "Not Modified");
        assert_eq!(StatusCode::PayloadTooLarge.reason_phrase(), "Payload Too Large");
    }

    #[test]
    fn test_allows_body() {
        assert!(StatusCode::Ok.allows_body());
        assert!(StatusCode::NotFound.allows_body());
        assert!(!StatusCode::NotModified.allows_body());
    }

    #[test]
    fn test_error_classes() {
        assert!(StatusCode::PayloadTooLarge.is_client_error());
        assert!(!StatusCode::NotModified.is_client_error());
        assert!(StatusCode::InternalServerError.is_server_error());
        assert!(!StatusCode::BadRequest.is_server_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(StatusCode::NotModified.to_string(), "304 Not Modified");
        assert_eq!(StatusCode::PayloadTooLarge.to_string(), "413 Payload Too Large");
    }
}
