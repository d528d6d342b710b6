//! # Productores de contenido por ventanas
//! src/content/mod.rs
//!
//! Todo body de respuesta es un `ChunkedContent`: el transporte le pide
//! ventanas `(offset, buffer)` con offsets no decrecientes hasta que retorna
//! 0. Ningún productor necesita tener el body completo en memoria.
//!
//! - `BytesContent`: body chico ya armado en memoria
//! - `FileContent`: bytes crudos de un archivo
//! - `TemplateContent`: archivo con placeholders `%NOMBRE%` expandidos
//! - `json::JsonResponse`: documento JSON serializado por ventanas

pub mod file;
pub mod template;
pub mod window;

pub use file::FileContent;
pub use template::{TemplateContent, TemplateProcessor};
pub use window::{ByteCounter, ChunkWindow};

/// Productor de bytes direccionado por offset
pub trait ChunkedContent: Send {
    /// Escribe en `dest` los bytes del stream a partir de `offset`.
    ///
    /// Retorna cuántos bytes escribió; menos de `dest.len()` solo al final
    /// del stream. Puede llamarse muchas veces para la misma respuesta.
    fn fill_window(&mut self, offset: usize, dest: &mut [u8]) -> usize;
}

/// Body que ya está completo en memoria
#[derive(Debug, Clone, Default)]
pub struct BytesContent {
    data: Vec<u8>,
}

impl BytesContent {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ChunkedContent for BytesContent {
    fn fill_window(&mut self, offset: usize, dest: &mut [u8]) -> usize {
        if offset >= self.data.len() {
            return 0;
        }
        let mut window = ChunkWindow::new(dest, 0);
        window.push(&self.data[offset..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_content_windows() {
        let mut content = BytesContent::new(b"hello world".to_vec());
        let mut buf = [0u8; 4];

        assert_eq!(content.fill_window(0, &mut buf), 4);
        assert_eq!(&buf, b"hell");
        assert_eq!(content.fill_window(8, &mut buf), 3);
        assert_eq!(&buf[..3], b"rld");
        assert_eq!(content.fill_window(11, &mut buf), 0);
    }
}
