//! # Métodos HTTP y máscaras de métodos
//! src/http/method.rs
//!
//! Cada método ocupa un bit, así un handler puede aceptar varios métodos
//! con una sola máscara (`MethodMask::POST | MethodMask::PUT`).

use std::fmt;
use std::ops::BitOr;

use super::request::ParseError;

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    DELETE,
    PUT,
    PATCH,
    HEAD,
    OPTIONS,
}

impl Method {
    /// Parsea un método HTTP desde un string
    ///
    /// # Errores
    ///
    /// Retorna error si el método no es soportado
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "DELETE" => Ok(Method::DELETE),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "HEAD" => Ok(Method::HEAD),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::DELETE => "DELETE",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
        }
    }

    /// Bit que representa al método dentro de una `MethodMask`
    pub fn bit(&self) -> u8 {
        match self {
            Method::GET => 0b0000_0001,
            Method::POST => 0b0000_0010,
            Method::DELETE => 0b0000_0100,
            Method::PUT => 0b0000_1000,
            Method::PATCH => 0b0001_0000,
            Method::HEAD => 0b0010_0000,
            Method::OPTIONS => 0b0100_0000,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conjunto de métodos que acepta un handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodMask(u8);

impl MethodMask {
    pub const GET: MethodMask = MethodMask(0b0000_0001);
    pub const POST: MethodMask = MethodMask(0b0000_0010);
    pub const DELETE: MethodMask = MethodMask(0b0000_0100);
    pub const PUT: MethodMask = MethodMask(0b0000_1000);
    pub const PATCH: MethodMask = MethodMask(0b0001_0000);
    pub const HEAD: MethodMask = MethodMask(0b0010_0000);
    pub const OPTIONS: MethodMask = MethodMask(0b0100_0000);
    pub const ANY: MethodMask = MethodMask(0b0111_1111);

    /// Los tres métodos que llevan body de escritura
    pub const WRITE: MethodMask = MethodMask(0b0001_1010);

    /// Verifica si el método está incluido en la máscara
    ///
    /// # Ejemplo
    /// ```
    /// use http_handlers::http::{Method, MethodMask};
    ///
    /// let mask = MethodMask::POST | MethodMask::PUT;
    /// assert!(mask.contains(Method::PUT));
    /// assert!(!mask.contains(Method::GET));
    /// ```
    pub fn contains(&self, method: Method) -> bool {
        self.0 & method.bit() != 0
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}

impl BitOr for MethodMask {
    type Output = MethodMask;

    fn bitor(self, rhs: MethodMask) -> MethodMask {
        MethodMask(self.0 | rhs.0)
    }
}

impl From<Method> for MethodMask {
    fn from(method: Method) -> Self {
        MethodMask(method.bit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_methods() {
        assert_eq!(Method::parse("GET").unwrap(), Method::GET);
        assert_eq!(Method::parse("PATCH").unwrap(), Method::PATCH);
        assert!(matches!(
            Method::parse("BREW"),
            Err(ParseError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_write_mask() {
        assert!(MethodMask::WRITE.contains(Method::POST));
        assert!(MethodMask::WRITE.contains(Method::PUT));
        assert!(MethodMask::WRITE.contains(Method::PATCH));
        assert!(!MethodMask::WRITE.contains(Method::GET));
        assert!(!MethodMask::WRITE.contains(Method::DELETE));
    }

    #[test]
    fn test_any_contains_everything() {
        for m in [
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::PUT,
            Method::PATCH,
            Method::HEAD,
            Method::OPTIONS,
        ] {
            assert!(MethodMask::ANY.contains(m), "{} missing", m);
        }
    }

    #[test]
    fn test_from_method() {
        let mask: MethodMask = Method::DELETE.into();
        assert_eq!(mask, MethodMask::DELETE);
    }
}
