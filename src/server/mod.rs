//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Servidor TCP de referencia que maneja a los handlers:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes (un thread por conexión)
//! 3. Lee la cabecera y entrega el body al handler por partes
//! 4. Envía la respuesta en ventanas de tamaño fijo

pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::Server;
