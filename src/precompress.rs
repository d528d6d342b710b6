//! # Precompresión de archivos estáticos
//! src/precompress.rs
//!
//! Recorre el directorio raíz y escribe `archivo.gz` junto a cada archivo de
//! texto. El handler estático sirve después esas variantes a los clientes
//! que aceptan gzip, sin comprimir nada por request.
//!
//! Una variante `.gz` más nueva que su original se deja como está.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, info, warn};

use crate::mime::{is_compressible, GZIP_SUFFIX};

/// Resultado de una pasada de precompresión
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrecompressReport {
    /// Variantes escritas en esta pasada
    pub written: usize,
    /// Variantes que ya estaban al día
    pub up_to_date: usize,
    /// Bytes originales de los archivos comprimidos
    pub original_bytes: u64,
    /// Bytes de las variantes escritas
    pub compressed_bytes: u64,
}

/// Precomprime todos los archivos de texto bajo `root`
pub fn precompress_dir(root: &Path) -> io::Result<PrecompressReport> {
    let mut report = PrecompressReport::default();
    visit(root, &mut report)?;
    info!(
        root = %root.display(),
        written = report.written,
        up_to_date = report.up_to_date,
        original_bytes = report.original_bytes,
        compressed_bytes = report.compressed_bytes,
        "precompression finished"
    );
    Ok(report)
}

fn visit(dir: &Path, report: &mut PrecompressReport) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            visit(&path, report)?;
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        let name = path.to_string_lossy();
        if name.ends_with(GZIP_SUFFIX) || !is_compressible(&name) {
            continue;
        }

        let gz_path = path.with_file_name(format!(
            "{}{}",
            entry.file_name().to_string_lossy(),
            GZIP_SUFFIX
        ));

        if is_up_to_date(&path, &gz_path) {
            report.up_to_date += 1;
            continue;
        }

        match compress_file_gzip(&path, &gz_path) {
            Ok((original, compressed)) => {
                debug!(path = %path.display(), original, compressed, "precompressed");
                report.written += 1;
                report.original_bytes += original;
                report.compressed_bytes += compressed;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not precompress");
            }
        }
    }
    Ok(())
}

/// `true` si la variante existe y no es más vieja que el original
fn is_up_to_date(original: &Path, gz: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|meta| meta.modified()).ok();
    match (modified(original), modified(gz)) {
        (Some(original), Some(gz)) => gz >= original,
        _ => false,
    }
}

/// Comprime `input` en `output` y retorna (bytes originales, bytes gzip)
fn compress_file_gzip(input: &Path, output: &Path) -> io::Result<(u64, u64)> {
    let mut input_file = File::open(input)?;
    let output_file = File::create(output)?;

    let mut encoder = GzEncoder::new(output_file, Compression::best());
    let original = io::copy(&mut input_file, &mut encoder)?;
    encoder.finish()?;

    let compressed = fs::metadata(output)?.len();
    Ok((original, compressed))
}
