//! # Ventanas de transmisión
//! src/content/window.rs
//!
//! Un `ChunkWindow` describe una sola escritura acotada dentro de un stream
//! conceptualmente infinito:
//!
//! ```text
//! stream:   |---- to_skip ----|---- to_write ----|---- descartado ----|
//! buffer:                     [..................]
//! ```
//!
//! Implementa `std::io::Write`, así cualquier serializador puede escribir
//! el stream completo y solo la ventana pedida llega al buffer.

use std::io;

/// Una escritura acotada dentro de un stream secuencial
#[derive(Debug)]
pub struct ChunkWindow<'a> {
    destination: &'a mut [u8],
    to_skip: usize,
    to_write: usize,
    pos: usize,
}

impl<'a> ChunkWindow<'a> {
    /// Ventana que descarta `skip` bytes y llena `destination` completo
    pub fn new(destination: &'a mut [u8], skip: usize) -> Self {
        let to_write = destination.len();
        Self::with_limit(destination, skip, to_write)
    }

    /// Ventana que escribe como mucho `len` bytes (nunca más que el buffer)
    pub fn with_limit(destination: &'a mut [u8], skip: usize, len: usize) -> Self {
        let to_write = len.min(destination.len());
        Self {
            destination,
            to_skip: skip,
            to_write,
            pos: 0,
        }
    }

    /// Entrega bytes producidos al window.
    ///
    /// Retorna cuántos bytes se consumieron (descartados + copiados). Cuando
    /// la ventana está llena retorna 0.
    pub fn push(&mut self, data: &[u8]) -> usize {
        let skipped = self.to_skip.min(data.len());
        self.to_skip -= skipped;

        let rest = &data[skipped..];
        let n = rest.len().min(self.to_write);
        self.destination[self.pos..self.pos + n].copy_from_slice(&rest[..n]);
        self.pos += n;
        self.to_write -= n;

        skipped + n
    }

    /// Bytes copiados al buffer
    pub fn written(&self) -> usize {
        self.pos
    }

    /// Bytes que todavía faltan descartar
    pub fn remaining_skip(&self) -> usize {
        self.to_skip
    }

    pub fn is_full(&self) -> bool {
        self.to_write == 0
    }
}

impl io::Write for ChunkWindow<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Con la ventana llena retornamos 0: `write_all` lo convierte en
        // WriteZero y el serializador se detiene.
        Ok(self.push(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer que solo cuenta bytes (para medir una serialización)
#[derive(Debug, Default)]
pub struct ByteCounter {
    count: usize,
}

impl ByteCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.count += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_skip_then_write() {
        let mut buf = [0u8; 4];
        let mut window = ChunkWindow::new(&mut buf, 3);

        assert_eq!(window.push(b"abcdef"), 6);
        assert_eq!(window.written(), 3);
        assert_eq!(&buf[..3], b"def");
    }

    #[test]
    fn test_never_writes_past_limit() {
        let mut buf = [0u8; 8];
        let mut window = ChunkWindow::with_limit(&mut buf, 0, 3);

        assert_eq!(window.push(b"hello"), 3);
        assert!(window.is_full());
        assert_eq!(window.push(b"more"), 0);
        assert_eq!(window.written(), 3);
        assert_eq!(&buf, b"hel\0\0\0\0\0");
    }

    #[test]
    fn test_write_all_stops_when_full() {
        let mut buf = [0u8; 2];
        let mut window = ChunkWindow::new(&mut buf, 1);

        let err = window.write_all(b"xyz123").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert_eq!(window.written(), 2);
        assert_eq!(&buf, b"yz");
    }

    #[test]
    fn test_skip_spanning_several_pushes() {
        let mut buf = [0u8; 3];
        let mut window = ChunkWindow::new(&mut buf, 5);

        window.push(b"ab");
        window.push(b"cd");
        assert_eq!(window.remaining_skip(), 1);
        window.push(b"efgh");
        assert_eq!(&buf, b"fgh");
    }

    #[test]
    fn test_byte_counter() {
        let mut counter = ByteCounter::new();
        counter.write_all(b"12345").unwrap();
        write!(counter, "{}", 678).unwrap();
        assert_eq!(counter.count(), 8);
    }
}
