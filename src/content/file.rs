//! # Contenido respaldado por archivo
//! src/content/file.rs

use std::io::{ErrorKind, Read, SeekFrom};

use tracing::warn;

use super::ChunkedContent;
use crate::fs::FileSource;

/// Bytes crudos de un archivo, leídos bajo demanda.
///
/// Guarda la posición de lectura; solo hace `seek` cuando el offset pedido
/// no coincide con ella.
pub struct FileContent {
    source: Box<dyn FileSource>,
    position: u64,
}

impl FileContent {
    pub fn new(source: Box<dyn FileSource>) -> Self {
        Self { source, position: 0 }
    }
}

impl ChunkedContent for FileContent {
    fn fill_window(&mut self, offset: usize, dest: &mut [u8]) -> usize {
        let offset = offset as u64;
        if offset != self.position {
            match self.source.seek(SeekFrom::Start(offset)) {
                Ok(pos) => self.position = pos,
                Err(e) => {
                    warn!(offset, error = %e, "seek failed, ending file stream");
                    return 0;
                }
            }
        }

        let mut filled = 0;
        while filled < dest.len() {
            match self.source.read(&mut dest[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(offset, error = %e, "read failed, ending file stream");
                    break;
                }
            }
        }

        self.position += filled as u64;
        filled
    }
}
