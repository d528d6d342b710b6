//! # HTTP Handlers - Entry Point
//! src/main.rs
//!
//! Servidor de ejemplo que arma los tres handlers:
//!
//! - `POST /api/echo`: devuelve el documento JSON recibido
//! - `GET /api/status`: estado del servidor en JSON
//! - todo lo demás: archivos estáticos bajo `--web-root`

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use http_handlers::config::Config;
use http_handlers::fs::DiskFs;
use http_handlers::handlers::{CallbackHandler, JsonBodyHandler, StaticHandler, WebHandler};
use http_handlers::http::{MethodMask, Request, Response, StatusCode};
use http_handlers::json::JsonResponse;
use http_handlers::precompress::precompress_dir;
use http_handlers::router::{Dispatcher, SERVER_NAME};
use http_handlers::server::Server;

/// Cuerpo de `GET /api/status`
#[derive(Debug, Serialize)]
struct ServerStatus {
    server: &'static str,
    uptime_secs: u64,
    gzip_hits_last_8: u32,
    gzip_first: bool,
}

fn main() {
    let config = Config::new();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        std::process::exit(2);
    }
    config.log_summary();

    if config.precompress {
        if let Err(e) = precompress_dir(Path::new(&config.web_root)) {
            warn!(error = %e, "precompression skipped");
        }
    }

    let dispatcher = build_dispatcher(&config);
    let mut server = Server::new(config, dispatcher);

    // Esto bloquea el thread principal
    if let Err(e) = server.run() {
        error!(error = %e, "fatal server error");
        std::process::exit(1);
    }
}

fn build_dispatcher(config: &Config) -> Dispatcher {
    let started = Instant::now();

    let mut static_files = StaticHandler::new(
        &config.static_uri,
        Arc::new(DiskFs::new(&config.web_root)),
        "/",
        &config.cache_control,
    );
    static_files.set_default_file(&config.default_file);
    let static_files = Arc::new(static_files);

    let mut echo = JsonBodyHandler::new("/api/echo");
    echo.set_max_content_length(config.max_json_body)
        .on_request(|_req: &mut Request, document: Value| {
            JsonResponse::from_value(document).into_response()
        });

    let mut status = CallbackHandler::new();
    let stats_source = Arc::clone(&static_files);
    status
        .set_uri("/api/status")
        .set_method(MethodMask::GET | MethodMask::HEAD)
        .on_request(move |_req: &mut Request| {
            let stats = stats_source.stats();
            let body = ServerStatus {
                server: SERVER_NAME,
                uptime_secs: started.elapsed().as_secs(),
                gzip_hits_last_8: stats.gzip_count(),
                gzip_first: stats.prefers_gzip(),
            };
            match serde_json::to_value(&body) {
                Ok(value) => {
                    let mut json = JsonResponse::pretty(false);
                    *json.root_mut() = value;
                    json.into_response()
                }
                Err(e) => Response::error(StatusCode::InternalServerError, &e.to_string()),
            }
        });

    let mut dispatcher = Dispatcher::new();
    // La API va antes que los estáticos: el primer handler no trivial gana
    dispatcher.add(echo);
    dispatcher.add(status);
    dispatcher.add_shared(static_files as Arc<dyn WebHandler>);

    info!(handlers = dispatcher.len(), "handlers registered");
    dispatcher
}
