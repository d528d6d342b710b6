//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Servidor que atiende cada conexión en su propio thread. Por conexión:
//!
//! ```text
//! leer cabecera → parse_head → Dispatcher::select
//!   → handle_body por cada trozo leído (index, total)
//!   → handle_request → cabecera → ventanas de `window_size` bytes
//! ```
//!
//! La conexión se cierra después de cada respuesta (HTTP/1.0).

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::http::{Method, ParseError, Request, Response, StatusCode};
use crate::router::Dispatcher;

/// Máximo de bytes de cabecera aceptados
const MAX_HEAD_SIZE: usize = 8192;

/// Tamaño de cada lectura del socket
const READ_CHUNK: usize = 1024;

/// Tiempo máximo esperando datos del cliente
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Servidor HTTP/1.0 concurrente
pub struct Server {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    listener: Option<TcpListener>,
}

impl Server {
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            dispatcher: Arc::new(dispatcher),
            listener: None,
        }
    }

    /// Abre el socket. Retorna la dirección real (útil con puerto 0).
    pub fn bind(&mut self) -> io::Result<SocketAddr> {
        let address = self.config.address();
        let listener = TcpListener::bind(&address)?;
        let local = listener.local_addr()?;
        info!(%local, "listening");
        self.listener = Some(listener);
        Ok(local)
    }

    /// Acepta conexiones hasta que el listener falle
    pub fn run(&mut self) -> io::Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let Some(listener) = self.listener.as_ref() else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "listener not bound"));
        };
        info!("concurrent mode: one thread per connection");

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let window_size = self.config.window_size;

                    let peer = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    debug!(%peer, "new connection");

                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(stream, &dispatcher, window_size) {
                            warn!(%peer, error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    warn!(error = %e, "accept failed");
                }
            }
        }

        Ok(())
    }

    /// Atiende un request completo sobre `stream`
    pub fn handle_connection(
        mut stream: TcpStream,
        dispatcher: &Dispatcher,
        window_size: usize,
    ) -> io::Result<()> {
        let start = Instant::now();
        stream.set_read_timeout(Some(READ_TIMEOUT))?;

        let mut buffer = Vec::with_capacity(READ_CHUNK);
        let (mut request, head_len) = match Self::read_head(&mut stream, &mut buffer)? {
            Some(Ok(parsed)) => parsed,
            Some(Err(e)) => {
                debug!(error = %e, "parse error");
                let mut response =
                    Response::error(StatusCode::BadRequest, &format!("Invalid: {}", e));
                Dispatcher::add_common_headers(&mut response);
                return Self::send(&mut stream, &mut response, true, window_size);
            }
            None => {
                debug!("connection closed before request");
                return Ok(());
            }
        };

        let method = request.method();
        let path = request.path().to_string();

        let mut response = match dispatcher.select(&mut request) {
            Some(handler) => {
                let total = request.content_length();
                let mut index = 0;

                let early = &buffer[head_len..];
                let early = &early[..early.len().min(total)];
                if !early.is_empty() {
                    handler.handle_body(&mut request, early, index, total);
                    index += early.len();
                }

                let mut chunk = [0u8; READ_CHUNK];
                while index < total {
                    let wanted = (total - index).min(READ_CHUNK);
                    let n = stream.read(&mut chunk[..wanted])?;
                    if n == 0 {
                        warn!(%path, received = index, total, "body truncated");
                        break;
                    }
                    handler.handle_body(&mut request, &chunk[..n], index, total);
                    index += n;
                }

                handler.handle_request(&mut request)
            }
            None => Dispatcher::not_found(&request),
        };
        Dispatcher::add_common_headers(&mut response);

        if !response.is_source_valid() {
            warn!(%path, "response has no producible body, closing");
            return Ok(());
        }

        Self::send(&mut stream, &mut response, method != Method::HEAD, window_size)?;

        info!(
            %method,
            %path,
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "request served"
        );
        Ok(())
    }

    /// Lee hasta el fin de la cabecera.
    ///
    /// `None` si el cliente cerró sin mandar nada.
    fn read_head(
        stream: &mut TcpStream,
        buffer: &mut Vec<u8>,
    ) -> io::Result<Option<Result<(Request, usize), ParseError>>> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = stream.read(&mut chunk)?;
            if n == 0 {
                if buffer.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(Request::parse_head(buffer)));
            }
            buffer.extend_from_slice(&chunk[..n]);

            match Request::parse_head(buffer) {
                Err(ParseError::IncompleteRequest) if buffer.len() < MAX_HEAD_SIZE => continue,
                result => return Ok(Some(result)),
            }
        }
    }

    /// Escribe la cabecera y, si corresponde, el body por ventanas
    fn send(
        stream: &mut TcpStream,
        response: &mut Response,
        with_body: bool,
        window_size: usize,
    ) -> io::Result<()> {
        stream.write_all(&response.head_bytes())?;

        if with_body {
            let mut window = vec![0u8; window_size.max(1)];
            let mut offset = 0;
            loop {
                let n = response.fill_window(offset, &mut window);
                if n == 0 {
                    break;
                }
                stream.write_all(&window[..n])?;
                offset += n;
            }
            debug!(bytes = offset, "body sent");
        }

        stream.flush()
    }
}

#[cfg(test)]
mod server_tests {
    use super::*;
    use crate::handlers::{CallbackHandler, JsonBodyHandler};
    use crate::json::JsonResponse;
    use serde_json::Value;
    use std::net::Shutdown;

    fn ephemeral_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").expect("bind")
    }

    /// Atiende una conexión con `dispatcher` y retorna lo que recibió el cliente
    fn round_trip(dispatcher: Dispatcher, raw: &[u8], window_size: usize) -> String {
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();

        let t = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            Server::handle_connection(stream, &dispatcher, window_size).unwrap();
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(raw).unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        t.join().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    fn hello_dispatcher() -> Dispatcher {
        let mut hello = CallbackHandler::new();
        hello.set_uri("/hello").on_request(|_req: &mut Request| {
            Response::new(StatusCode::Ok).with_body("hola desde el servidor")
        });
        let mut dispatcher = Dispatcher::new();
        dispatcher.add(hello);
        dispatcher
    }

    #[test]
    fn test_handle_connection_ok() {
        let text = round_trip(hello_dispatcher(), b"GET /hello HTTP/1.0\r\n\r\n", 4);

        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Connection: close"));
        assert!(text.ends_with("\r\n\r\nhola desde el servidor"));
    }

    #[test]
    fn test_head_has_no_body() {
        let text = round_trip(hello_dispatcher(), b"HEAD /hello HTTP/1.0\r\n\r\n", 64);

        assert!(text.contains("Content-Length: 22"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_handle_connection_not_found() {
        let text = round_trip(hello_dispatcher(), b"GET /nada HTTP/1.0\r\n\r\n", 64);

        assert!(text.contains("404 Not Found"));
        assert!(text.contains("Route not found: /nada"));
    }

    #[test]
    fn test_handle_connection_parse_error() {
        let text = round_trip(hello_dispatcher(), b"\x00\x01\x02\x03garbage", 64);

        assert!(text.contains("400 Bad Request"));
        assert!(text.contains("Invalid:"));
    }

    #[test]
    fn test_json_body_across_reads() {
        let mut echo = JsonBodyHandler::new("/api");
        echo.on_request(|_req: &mut Request, doc: Value| {
            let mut response = JsonResponse::new(false);
            *response.root_mut() = doc;
            response.into_response()
        });
        let mut dispatcher = Dispatcher::new();
        dispatcher.add(echo);

        let body = format!("{{\"items\":[{}]}}", vec!["1"; 700].join(","));
        let raw = format!(
            "POST /api HTTP/1.0\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );

        let text = round_trip(dispatcher, raw.as_bytes(), 100);
        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.ends_with(&body));
    }

    #[test]
    fn test_invalid_source_closes_without_response() {
        let mut broken = CallbackHandler::new();
        broken.on_request(|_req: &mut Request| {
            let mut response = Response::new(StatusCode::Ok);
            response.mark_source_invalid();
            response
        });
        let mut dispatcher = Dispatcher::new();
        dispatcher.add(broken);

        let text = round_trip(dispatcher, b"GET / HTTP/1.0\r\n\r\n", 64);
        assert!(text.is_empty());
    }

    #[test]
    fn test_handle_connection_peer_closed_immediately() {
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let dispatcher = hello_dispatcher();

        let t = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            // El read retorna 0 y la función debe terminar Ok(())
            Server::handle_connection(stream, &dispatcher, 64).unwrap();
        });

        drop(TcpStream::connect(addr).unwrap());
        t.join().unwrap();
    }

    #[test]
    fn test_bind_ephemeral_port() {
        let mut config = Config::default();
        config.port = 0;
        let mut server = Server::new(config, Dispatcher::new());
        let addr = server.bind().unwrap();
        assert_ne!(addr.port(), 0);
    }
}
