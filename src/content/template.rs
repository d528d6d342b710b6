//! # Plantillas con placeholders
//! src/content/template.rs
//!
//! Expande placeholders `%NOMBRE%` mientras se transmite el archivo. El
//! valor de cada placeholder lo da un callback de la aplicación.
//!
//! Reglas:
//! - `%%` produce un `%` literal
//! - un nombre tiene como mucho `MAX_PLACEHOLDER_LEN` bytes de
//!   `[A-Za-z0-9_.-]`
//! - un placeholder sin cerrar o con bytes inválidos se copia tal cual
//!
//! Como la longitud expandida no se conoce de antemano, estas respuestas
//! no llevan Content-Length.

use std::collections::VecDeque;
use std::io::{self, BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::sync::Arc;

use tracing::warn;

use super::{ChunkWindow, ChunkedContent};
use crate::fs::FileSource;

/// Largo máximo del nombre de un placeholder
pub const MAX_PLACEHOLDER_LEN: usize = 32;

const DELIMITER: u8 = b'%';

/// Callback que resuelve un placeholder a su valor
pub type TemplateProcessor = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Archivo expandido a través de un `TemplateProcessor`
pub struct TemplateContent {
    source: BufReader<Box<dyn FileSource>>,
    processor: TemplateProcessor,
    /// Salida ya expandida que todavía no se entregó
    pending: VecDeque<u8>,
    /// Bytes de salida ya consumidos (descartados o escritos)
    produced: usize,
}

impl TemplateContent {
    pub fn new(source: Box<dyn FileSource>, processor: TemplateProcessor) -> Self {
        Self {
            source: BufReader::new(source),
            processor,
            pending: VecDeque::new(),
            produced: 0,
        }
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.source.seek(SeekFrom::Start(0))?;
        self.pending.clear();
        self.produced = 0;
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.source.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Expande el siguiente token de la fuente hacia `pending`.
    ///
    /// Retorna `false` al llegar al final de la fuente.
    fn expand_next(&mut self) -> io::Result<bool> {
        let Some(byte) = self.read_byte()? else {
            return Ok(false);
        };
        if byte != DELIMITER {
            self.pending.push_back(byte);
            return Ok(true);
        }

        let mut name = Vec::with_capacity(MAX_PLACEHOLDER_LEN);
        loop {
            match self.read_byte()? {
                Some(DELIMITER) if name.is_empty() => {
                    self.pending.push_back(DELIMITER);
                    return Ok(true);
                }
                Some(DELIMITER) => {
                    let key = String::from_utf8_lossy(&name);
                    let value = (self.processor)(&key);
                    self.pending.extend(value.as_bytes());
                    return Ok(true);
                }
                Some(c) if is_placeholder_byte(c) && name.len() < MAX_PLACEHOLDER_LEN => {
                    name.push(c);
                }
                other => {
                    self.pending.push_back(DELIMITER);
                    self.pending.extend(&name);
                    if let Some(c) = other {
                        self.pending.push_back(c);
                    }
                    return Ok(true);
                }
            }
        }
    }
}

fn is_placeholder_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'-' | b'.')
}

impl ChunkedContent for TemplateContent {
    fn fill_window(&mut self, offset: usize, dest: &mut [u8]) -> usize {
        if offset < self.produced {
            if let Err(e) = self.rewind() {
                warn!(offset, error = %e, "template rewind failed");
                return 0;
            }
        }

        let mut window = ChunkWindow::new(dest, offset - self.produced);
        while !window.is_full() {
            if self.pending.is_empty() {
                match self.expand_next() {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => {
                        warn!(offset, error = %e, "template source read failed");
                        break;
                    }
                }
            }
            let consumed = window.push(self.pending.make_contiguous());
            self.pending.drain(..consumed);
            self.produced += consumed;
        }

        window.written()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn expand_all(template: &str, window: usize) -> String {
        let processor: TemplateProcessor = Arc::new(|name: &str| match name {
            "NAME" => "mundo".to_string(),
            "EMPTY" => String::new(),
            other => format!("<{}>", other.to_lowercase()),
        });
        let mut content =
            TemplateContent::new(Box::new(Cursor::new(template.as_bytes().to_vec())), processor);

        let mut out = Vec::new();
        let mut buf = vec![0u8; window];
        loop {
            let n = content.fill_window(out.len(), &mut buf);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_replaces_placeholders() {
        assert_eq!(expand_all("Hola %NAME%!", 64), "Hola mundo!");
        assert_eq!(expand_all("%A%%B%", 64), "<a><b>");
        assert_eq!(expand_all("[%EMPTY%]", 64), "[]");
    }

    #[test]
    fn test_double_percent_is_literal() {
        assert_eq!(expand_all("100%% seguro", 64), "100% seguro");
    }

    #[test]
    fn test_invalid_placeholder_copied_verbatim() {
        assert_eq!(expand_all("50% de 100", 64), "50% de 100");
        assert_eq!(expand_all("fin %ABIERTO", 64), "fin %ABIERTO");
    }

    #[test]
    fn test_name_too_long_is_literal() {
        let long = "X".repeat(MAX_PLACEHOLDER_LEN + 1);
        let template = format!("%{}%", long);
        assert_eq!(expand_all(&template, 64), format!("%{}%", long));
    }

    #[test]
    fn test_small_windows_match_large_windows() {
        let template = "<p>%NAME%</p><p>%OTRO%</p> 10%% %NAME%";
        assert_eq!(expand_all(template, 1), expand_all(template, 1024));
        assert_eq!(expand_all(template, 3), expand_all(template, 1024));
    }

    #[test]
    fn test_rewind_on_earlier_offset() {
        let processor: TemplateProcessor = Arc::new(|_: &str| "VALOR".to_string());
        let mut content =
            TemplateContent::new(Box::new(Cursor::new(b"a%X%b".to_vec())), processor);
        let mut buf = [0u8; 4];

        assert_eq!(content.fill_window(0, &mut buf), 4);
        assert_eq!(&buf, b"aVAL");
        assert_eq!(content.fill_window(1, &mut buf), 4);
        assert_eq!(&buf, b"VALO");
    }
}
