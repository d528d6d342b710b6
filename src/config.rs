//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de ejemplo, desde argumentos CLI o variables
//! de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./http_handlers --port 8080 \
//!   --web-root ./www \
//!   --static-uri / \
//!   --cache-control "max-age=600" \
//!   --precompress
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 WEB_ROOT=./www ./http_handlers
//! ```

use clap::Parser;
use tracing::info;

use crate::handlers::json_body::DEFAULT_MAX_CONTENT_LENGTH;
use crate::handlers::static_files::DEFAULT_FILE;

/// Ventana de transmisión por defecto: un segmento TCP típico
pub const DEFAULT_WINDOW_SIZE: usize = 1460;

/// Configuración del servidor HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "http_handlers")]
#[command(about = "Servidor HTTP de archivos estáticos y API JSON con poca memoria")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    // === Archivos estáticos ===

    /// Directorio raíz de los archivos estáticos
    #[arg(long = "web-root", default_value = "./www", env = "WEB_ROOT")]
    pub web_root: String,

    /// Prefijo de URI bajo el que se sirven los archivos
    #[arg(long = "static-uri", default_value = "/", env = "STATIC_URI")]
    pub static_uri: String,

    /// Archivo que se sirve para un directorio
    #[arg(long = "default-file", default_value = DEFAULT_FILE, env = "DEFAULT_FILE")]
    pub default_file: String,

    /// Valor de Cache-Control (vacío = no se envía)
    #[arg(long = "cache-control", default_value = "max-age=600", env = "CACHE_CONTROL")]
    pub cache_control: String,

    /// Genera las variantes .gz de los archivos de texto al arrancar
    #[arg(long, env = "PRECOMPRESS")]
    pub precompress: bool,

    // === Límites ===

    /// Máximo de body JSON en bytes (413 si se excede)
    #[arg(long = "max-json-body", default_value_t = DEFAULT_MAX_CONTENT_LENGTH, env = "MAX_JSON_BODY")]
    pub max_json_body: usize,

    /// Tamaño de cada ventana que se escribe al socket
    #[arg(long = "window-size", default_value_t = DEFAULT_WINDOW_SIZE, env = "WINDOW_SIZE")]
    pub window_size: usize,

    // === Logging ===

    /// Nivel de log si RUST_LOG no está definido
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use http_handlers::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.web_root.trim().is_empty() {
            return Err("Web root must not be empty".to_string());
        }
        if self.window_size == 0 {
            return Err("Window size must be >= 1".to_string());
        }
        if self.max_json_body == 0 {
            return Err("Max JSON body must be >= 1".to_string());
        }
        if self.static_uri.split('/').any(|segment| segment == "..") {
            return Err("Static URI must not contain '..'".to_string());
        }
        if self.default_file.contains('/') {
            return Err("Default file must be a file name, not a path".to_string());
        }
        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            web_root = %self.web_root,
            static_uri = %self.static_uri,
            default_file = %self.default_file,
            cache_control = %self.cache_control,
            "static files"
        );
        info!(
            max_json_body = self.max_json_body,
            window_size = self.window_size,
            precompress = self.precompress,
            "limits"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            web_root: "./www".to_string(),
            static_uri: "/".to_string(),
            default_file: DEFAULT_FILE.to_string(),
            cache_control: "max-age=600".to_string(),
            precompress: false,
            max_json_body: DEFAULT_MAX_CONTENT_LENGTH,
            window_size: DEFAULT_WINDOW_SIZE,
            log_level: "info".to_string(),
        }
    }
}
