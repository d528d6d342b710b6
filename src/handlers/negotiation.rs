//! Estadística de variantes gzip encontradas.
//!
//! Guarda las últimas 8 observaciones como bits (1 = se sirvió la variante
//! `.gz`). Si más de 4 de las 8 fueron gzip, se busca primero el `.gz`.
//!
//! Las actualizaciones son load + store con `Relaxed`, sin
//! read-modify-write: dos requests simultáneos pueden pisarse y perder una
//! observación. Solo afecta el orden de búsqueda, nunca qué variante se
//! sirve.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Historial inicial: 5 de 8 bits en 1
const INITIAL_HISTORY: u8 = 0xF8;

/// Umbral de bits en 1 para buscar primero la variante gzip
const GZIP_FIRST_THRESHOLD: u32 = 4;

#[derive(Debug)]
pub struct NegotiationStats {
    history: AtomicU8,
    gzip_first: AtomicBool,
}

impl NegotiationStats {
    pub fn new() -> Self {
        Self {
            history: AtomicU8::new(INITIAL_HISTORY),
            gzip_first: AtomicBool::new(is_gzip_majority(INITIAL_HISTORY)),
        }
    }

    /// `true` si conviene buscar primero la variante `.gz`
    pub fn prefers_gzip(&self) -> bool {
        self.gzip_first.load(Ordering::Relaxed)
    }

    /// Registra qué variante se sirvió
    pub fn record(&self, served_gzip: bool) {
        let history = (self.history.load(Ordering::Relaxed) << 1) | u8::from(served_gzip);
        self.history.store(history, Ordering::Relaxed);
        self.gzip_first
            .store(is_gzip_majority(history), Ordering::Relaxed);
    }

    /// Bits de las últimas 8 observaciones
    pub fn history(&self) -> u8 {
        self.history.load(Ordering::Relaxed)
    }

    /// Cuántas de las últimas 8 observaciones fueron gzip
    pub fn gzip_count(&self) -> u32 {
        self.history().count_ones()
    }
}

fn is_gzip_majority(history: u8) -> bool {
    history.count_ones() > GZIP_FIRST_THRESHOLD
}

impl Default for NegotiationStats {
    fn default() -> Self {
        Self::new()
    }
}
