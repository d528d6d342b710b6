//! # Handler de archivos estáticos
//! src/handlers/static_files.rs
//!
//! Sirve archivos de un `FileSystem` bajo un prefijo de URI, con:
//!
//! - negociación de variante precomprimida (`archivo.gz`) según
//!   `Accept-Encoding`
//! - peticiones condicionales (`If-None-Match`, `If-Modified-Since`) → 304
//! - plantillas `%NOMBRE%` opcionales para la variante plana
//!
//! ## Resolución de paths
//!
//! ```text
//! StaticHandler::new("/static", fs, "/www/", "max-age=600")
//!
//! GET /static/app.js    → /www/app.js(.gz)
//! GET /static           → /www/index.htm(.gz)      (modo directorio)
//! GET /static/docs/     → /www/docs/index.htm(.gz)
//! GET /static/docs      → /www/docs(.gz), si no /www/docs/index.htm(.gz)
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{uri_matches, NegotiationStats, RequestFilter, WebHandler};
use crate::cache::{
    etag_for, etag_matches, format_http_date, http_date_from_system_time, not_modified_since,
};
use crate::content::{FileContent, TemplateContent, TemplateProcessor};
use crate::error::HandlerError;
use crate::fs::{FileMeta, FileSystem};
use crate::http::{Request, Response, StatusCode};
use crate::mime::{content_type_for, GZIP_SUFFIX};

/// Archivo por defecto de un directorio
pub const DEFAULT_FILE: &str = "index.htm";

/// Variante de un recurso que existe en el filesystem
#[derive(Debug, Clone)]
struct Variant {
    path: String,
    meta: FileMeta,
    precompressed: bool,
}

impl Variant {
    /// Nombre lógico del recurso (sin el sufijo `.gz`)
    fn logical_path(&self) -> &str {
        if self.precompressed {
            self.path.strip_suffix(GZIP_SUFFIX).unwrap_or(&self.path)
        } else {
            &self.path
        }
    }
}

/// Handler de recursos estáticos
pub struct StaticHandler {
    uri: String,
    path: String,
    fs: Arc<dyn FileSystem>,
    default_file: String,
    cache_control: String,
    last_modified: String,
    template: Option<TemplateProcessor>,
    is_dir: bool,
    stats: NegotiationStats,
    filter: Option<RequestFilter>,
}

impl StaticHandler {
    /// Crea el handler que sirve `path` (dentro de `fs`) bajo `uri`.
    ///
    /// Un `path` terminado en `/` activa el modo directorio.
    pub fn new(uri: &str, fs: Arc<dyn FileSystem>, path: &str, cache_control: &str) -> Self {
        let mut uri = with_leading_slash(uri);
        let mut path = with_leading_slash(path);

        let is_dir = path.ends_with('/');

        // Sin la barra final para poder agregar el archivo por defecto
        if uri.ends_with('/') {
            uri.pop();
        }
        if path.ends_with('/') {
            path.pop();
        }

        Self {
            uri,
            path,
            fs,
            default_file: DEFAULT_FILE.to_string(),
            cache_control: cache_control.to_string(),
            last_modified: String::new(),
            template: None,
            is_dir,
            stats: NegotiationStats::new(),
            filter: None,
        }
    }

    pub fn set_is_dir(&mut self, is_dir: bool) -> &mut Self {
        self.is_dir = is_dir;
        self
    }

    /// Archivo que se sirve para un directorio (vacío = ninguno)
    pub fn set_default_file(&mut self, filename: &str) -> &mut Self {
        self.default_file = filename.to_string();
        self
    }

    pub fn set_cache_control(&mut self, cache_control: &str) -> &mut Self {
        self.cache_control = cache_control.to_string();
        self
    }

    /// Fija el Last-Modified como texto ya formateado
    pub fn set_last_modified(&mut self, last_modified: &str) -> &mut Self {
        self.last_modified = last_modified.to_string();
        self
    }

    /// Fija el Last-Modified desde una fecha de calendario
    pub fn set_last_modified_time(&mut self, date: DateTime<Utc>) -> &mut Self {
        self.set_last_modified(&format_http_date(date))
    }

    /// Fija el Last-Modified desde segundos desde epoch.
    ///
    /// Un timestamp fuera de rango deja el valor anterior.
    pub fn set_last_modified_timestamp(&mut self, secs: i64) -> &mut Self {
        match DateTime::<Utc>::from_timestamp(secs, 0) {
            Some(date) => self.set_last_modified_time(date),
            None => {
                warn!(secs, "last-modified timestamp out of range");
                self
            }
        }
    }

    /// Fija el Last-Modified a la hora actual
    pub fn set_last_modified_now(&mut self) -> &mut Self {
        self.set_last_modified(&http_date_from_system_time(SystemTime::now()))
    }

    /// Expande placeholders `%NOMBRE%` en la variante plana
    pub fn set_template_processor<F>(&mut self, processor: F) -> &mut Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.template = Some(Arc::new(processor));
        self
    }

    pub fn set_filter<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn base_path(&self) -> &str {
        &self.path
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn stats(&self) -> &NegotiationStats {
        &self.stats
    }

    /// Encuentra la variante a servir para el request
    fn resolve(&self, request: &Request) -> Result<Variant, HandlerError> {
        let relative = request.path().get(self.uri.len()..).unwrap_or("");
        if relative.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(HandlerError::PathTraversal(request.path().to_string()));
        }

        let accepts_gzip = request
            .header("Accept-Encoding")
            .is_some_and(|value| value.to_ascii_lowercase().contains("gzip"));

        // La raíz de un directorio o un path con '/' final van directo al
        // archivo por defecto
        let skip_direct = (self.is_dir && relative.is_empty()) || relative.ends_with('/');
        let mut candidate = format!("{}{}", self.path, relative);

        if !skip_direct {
            if let Some(variant) = self.lookup_variant(&candidate, accepts_gzip) {
                return Ok(variant);
            }
        }

        if self.default_file.is_empty() {
            return Err(HandlerError::NotFound(candidate));
        }
        if !candidate.ends_with('/') {
            candidate.push('/');
        }
        candidate.push_str(&self.default_file);

        self.lookup_variant(&candidate, accepts_gzip)
            .ok_or(HandlerError::NotFound(candidate))
    }

    /// Busca las variantes de `candidate`.
    ///
    /// Si el cliente acepta gzip y existe el `.gz`, se sirve el `.gz`. La
    /// estadística solo decide qué se busca primero.
    fn lookup_variant(&self, candidate: &str, accepts_gzip: bool) -> Option<Variant> {
        if !accepts_gzip {
            return self.lookup(candidate, false);
        }

        let gzip = format!("{}{}", candidate, GZIP_SUFFIX);
        let found = if self.stats.prefers_gzip() {
            self.lookup(&gzip, true)
                .or_else(|| self.lookup(candidate, false))
        } else {
            match self.lookup(candidate, false) {
                Some(plain) => Some(self.lookup(&gzip, true).unwrap_or(plain)),
                None => self.lookup(&gzip, true),
            }
        };

        if let Some(variant) = &found {
            self.stats.record(variant.precompressed);
        }
        found
    }

    fn lookup(&self, path: &str, precompressed: bool) -> Option<Variant> {
        self.fs.metadata(path).map(|meta| Variant {
            path: path.to_string(),
            meta,
            precompressed,
        })
    }

    /// Last-Modified configurado o, si no hay, la fecha del archivo
    fn last_modified_for(&self, variant: &Variant) -> Option<String> {
        if !self.last_modified.is_empty() {
            return Some(self.last_modified.clone());
        }
        variant.meta.modified.map(http_date_from_system_time)
    }

    fn is_not_modified(&self, request: &Request, etag: &str, last_modified: Option<&str>) -> bool {
        let etag_current = request
            .header("If-None-Match")
            .is_some_and(|value| etag_matches(value, etag));

        let date_current = match (request.header("If-Modified-Since"), last_modified) {
            (Some(since), Some(modified)) => not_modified_since(since, modified),
            _ => false,
        };

        etag_current || date_current
    }

    fn add_cache_headers(&self, response: &mut Response, etag: &str, last_modified: Option<&str>) {
        response.add_header("ETag", etag);
        if !self.cache_control.is_empty() {
            response.add_header("Cache-Control", &self.cache_control);
        }
        if let Some(last_modified) = last_modified {
            response.add_header("Last-Modified", last_modified);
        }
    }

    fn serve(&self, request: &Request) -> Result<Response, HandlerError> {
        let variant = self.resolve(request)?;
        let etag = etag_for(&variant.meta, variant.precompressed);
        let last_modified = self.last_modified_for(&variant);

        if self.is_not_modified(request, &etag, last_modified.as_deref()) {
            debug!(path = %variant.path, "not modified");
            let mut response = Response::new(StatusCode::NotModified);
            self.add_cache_headers(&mut response, &etag, last_modified.as_deref());
            return Ok(response);
        }

        let source = self.fs.open(&variant.path).map_err(|e| {
            warn!(path = %variant.path, error = %e, "could not open resolved file");
            HandlerError::NotFound(variant.path.clone())
        })?;

        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", content_type_for(variant.logical_path()));

        let mut response = match (&self.template, variant.precompressed) {
            (Some(processor), false) => response.with_content(
                Box::new(TemplateContent::new(source, Arc::clone(processor))),
                None,
            ),
            _ => response.with_content(
                Box::new(FileContent::new(source)),
                Some(variant.meta.size as usize),
            ),
        };

        if variant.precompressed {
            response.add_header("Content-Encoding", "gzip");
        }
        self.add_cache_headers(&mut response, &etag, last_modified.as_deref());

        debug!(
            path = %variant.path,
            gzip = variant.precompressed,
            size = variant.meta.size,
            "serving static file"
        );
        Ok(response)
    }
}

fn with_leading_slash(value: &str) -> String {
    if value.starts_with('/') {
        value.to_string()
    } else {
        format!("/{}", value)
    }
}

impl WebHandler for StaticHandler {
    fn filter(&self, request: &Request) -> bool {
        self.filter.as_ref().map_or(true, |f| f(request))
    }

    fn can_handle(&self, request: &mut Request) -> bool {
        if !uri_matches(&self.uri, request.path()) {
            return false;
        }
        request.add_interesting_header("Accept-Encoding");
        request.add_interesting_header("If-None-Match");
        request.add_interesting_header("If-Modified-Since");
        true
    }

    fn handle_request(&self, request: &mut Request) -> Response {
        self.serve(request).unwrap_or_else(HandlerError::into_response)
    }

    fn is_request_handler_trivial(&self) -> bool {
        false
    }
}
