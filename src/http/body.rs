//! # Body pendiente de un request
//! src/http/body.rs
//!
//! Buffer de tamaño fijo donde se acumula el body de un request antes de
//! parsearlo. Se reserva una sola vez, con el tamaño exacto declarado, y
//! vive dentro del `Request`: cuando el request termina (o la conexión se
//! cae) el buffer se libera con él.

use tracing::warn;

/// Body acumulado de un request
#[derive(Debug)]
pub struct PendingBody {
    /// Buffer de exactamente `total` bytes, o `None` si no se reservó
    buffer: Option<Vec<u8>>,

    /// Tamaño total declarado por el cliente
    total: usize,

    /// Máximo permitido por el handler que lo creó
    max: usize,
}

impl PendingBody {
    /// Crea el body pendiente, reservando `total` bytes solo si
    /// `0 < total < max`.
    ///
    /// Si la reserva falla el body queda sin buffer, igual que si nunca
    /// hubiera llegado nada.
    pub fn allocate(total: usize, max: usize) -> Self {
        let buffer = if total > 0 && total < max {
            let mut buf = Vec::new();
            match buf.try_reserve_exact(total) {
                Ok(()) => {
                    buf.resize(total, 0);
                    Some(buf)
                }
                Err(e) => {
                    warn!(total, error = %e, "body buffer allocation failed");
                    None
                }
            }
        } else {
            None
        };

        Self {
            buffer,
            total,
            max,
        }
    }

    /// Copia `data` en la posición `index` del buffer.
    ///
    /// Las escrituras son posicionales: el orden de llegada de los chunks no
    /// importa. Los bytes que caen fuera del buffer se ignoran.
    ///
    /// Retorna cuántos bytes se copiaron.
    pub fn write_at(&mut self, index: usize, data: &[u8]) -> usize {
        let Some(buffer) = self.buffer.as_mut() else {
            return 0;
        };
        if index >= buffer.len() {
            return 0;
        }
        let end = (index + data.len()).min(buffer.len());
        let n = end - index;
        buffer[index..end].copy_from_slice(&data[..n]);
        n
    }

    /// Contenido del buffer, si se reservó
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// El tamaño declarado supera el máximo permitido
    pub fn exceeds_limit(&self) -> bool {
        self.total > self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocates_exact_size() {
        let body = PendingBody::allocate(50, 100);
        assert_eq!(body.buffer().unwrap().len(), 50);
        assert!(!body.exceeds_limit());
    }

    #[test]
    fn test_no_buffer_for_zero_total() {
        let body = PendingBody::allocate(0, 100);
        assert!(!body.has_buffer());
    }

    #[test]
    fn test_no_buffer_at_or_above_max() {
        assert!(!PendingBody::allocate(100, 100).has_buffer());

        let too_big = PendingBody::allocate(101, 100);
        assert!(!too_big.has_buffer());
        assert!(too_big.exceeds_limit());
    }

    #[test]
    fn test_out_of_order_writes() {
        let mut body = PendingBody::allocate(7, 100);
        body.write_at(4, b"1}");
        body.write_at(0, b"{\"a\":");
        assert_eq!(body.buffer().unwrap(), b"{\"a\":1}");
    }

    #[test]
    fn test_retransmitted_chunk_is_idempotent() {
        let mut body = PendingBody::allocate(4, 100);
        body.write_at(0, b"ab");
        body.write_at(0, b"ab");
        body.write_at(2, b"cd");
        assert_eq!(body.buffer().unwrap(), b"abcd");
    }

    #[test]
    fn test_write_past_end_is_clamped() {
        let mut body = PendingBody::allocate(4, 100);
        assert_eq!(body.write_at(2, b"xyz"), 2);
        assert_eq!(body.write_at(9, b"q"), 0);
        assert_eq!(body.buffer().unwrap(), b"\0\0xy");
    }
}
