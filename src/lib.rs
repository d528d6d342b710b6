//! # HTTP Handlers
//! src/lib.rs
//!
//! Handlers HTTP pensados para servidores con poca memoria: ninguna
//! respuesta se arma completa en memoria, el transporte pide el body en
//! ventanas de tamaño fijo.
//!
//! ## Arquitectura
//!
//! El crate está dividido en módulos especializados:
//! - `http`: Request, Response, métodos, status y body pendiente
//! - `content`: productores de body por ventanas (bytes, archivo, plantilla)
//! - `json`: respuesta JSON serializada por ventanas
//! - `handlers`: archivos estáticos, body JSON y callbacks
//! - `fs`, `mime`, `cache`: filesystem, Content-Type, ETag y fechas HTTP
//! - `router`: despacho de requests a handlers
//! - `server`: servidor TCP de referencia (un thread por conexión)
//! - `config`, `precompress`: configuración CLI y variantes `.gz`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use std::sync::Arc;
//! use http_handlers::config::Config;
//! use http_handlers::fs::DiskFs;
//! use http_handlers::handlers::StaticHandler;
//! use http_handlers::router::Dispatcher;
//! use http_handlers::server::Server;
//!
//! let config = Config::default();
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.add(StaticHandler::new("/", Arc::new(DiskFs::new("./www")), "/", "max-age=600"));
//!
//! let mut server = Server::new(config, dispatcher);
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod fs;
pub mod handlers;
pub mod http;
pub mod json;
pub mod mime;
pub mod precompress;
pub mod router;
pub mod server;
