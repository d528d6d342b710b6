//! # Validación de caché
//! src/cache.rs
//!
//! Identidad de caché (ETag) y fechas HTTP para las peticiones
//! condicionales (`If-None-Match`, `If-Modified-Since`).
//!
//! ## ETag
//!
//! SHA-256 sobre `(variante, tamaño, mtime segundos, mtime nanos)` en
//! little-endian; se usan los primeros 8 bytes en hex, entre comillas.
//! La variante (plano o `.gz`) entra en el hash, así las dos
//! representaciones de un recurso nunca comparten ETag.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::fs::FileMeta;

/// Formato de fecha HTTP (IMF-fixdate)
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Calcula el ETag de una variante
pub fn etag_for(meta: &FileMeta, precompressed: bool) -> String {
    let (secs, nanos) = meta
        .modified
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| (d.as_secs(), d.subsec_nanos()))
        .unwrap_or((0, 0));

    let mut hasher = Sha256::new();
    hasher.update([u8::from(precompressed)]);
    hasher.update(meta.size.to_le_bytes());
    hasher.update(secs.to_le_bytes());
    hasher.update(nanos.to_le_bytes());
    let digest = hasher.finalize();

    let hex: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    format!("\"{}\"", hex)
}

/// `true` si algún valor de `If-None-Match` coincide con el ETag.
///
/// Acepta listas separadas por coma, `*` y la forma débil `W/"..."`.
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|candidate| {
            candidate == "*" || candidate == etag || candidate.strip_prefix("W/") == Some(etag)
        })
}

/// Formatea una fecha como fecha HTTP: `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(date: DateTime<Utc>) -> String {
    date.format(HTTP_DATE_FORMAT).to_string()
}

pub fn http_date_from_system_time(time: SystemTime) -> String {
    format_http_date(DateTime::<Utc>::from(time))
}

/// Parsea una fecha HTTP. Retorna `None` si no es válida.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// `true` si el recurso no cambió desde la fecha de `If-Modified-Since`.
///
/// Una coincidencia exacta de texto basta; si no, se comparan las fechas.
pub fn not_modified_since(if_modified_since: &str, last_modified: &str) -> bool {
    if if_modified_since.trim() == last_modified {
        return true;
    }
    match (parse_http_date(if_modified_since), parse_http_date(last_modified)) {
        (Some(since), Some(modified)) => modified <= since,
        _ => false,
    }
}
