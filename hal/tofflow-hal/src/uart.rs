//! UART serial communication abstractions
//!
//! The console reads single bytes and writes formatted text; [`UartWriter`]
//! adapts any [`UartTx`] into a `core::fmt::Write` sink.

use core::fmt;

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
///
/// The console consumes one byte per event, so the receiver is polled
/// rather than drained.
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Take one received byte if any is waiting
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// `fmt::Write` adapter over a UART transmitter
pub struct UartWriter<'a, T: UartTx> {
    tx: &'a mut T,
}

impl<'a, T: UartTx> UartWriter<'a, T> {
    /// Wrap a transmitter
    pub fn new(tx: &'a mut T) -> Self {
        Self { tx }
    }

    /// Flush the underlying transmitter
    pub fn flush(&mut self) -> Result<(), T::Error> {
        self.tx.flush()
    }
}

impl<T: UartTx> fmt::Write for UartWriter<'_, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.tx.write_blocking(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    struct Capture {
        buf: [u8; 32],
        len: usize,
        fail: bool,
    }

    impl UartTx for Capture {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.buf[self.len..self.len + data.len()].copy_from_slice(data);
            self.len += data.len();
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_forwards_bytes() {
        let mut tx = Capture { buf: [0; 32], len: 0, fail: false };
        let mut w = UartWriter::new(&mut tx);
        write!(w, "> {}", 42).unwrap();
        assert_eq!(&tx.buf[..tx.len], b"> 42");
    }

    #[test]
    fn test_writer_maps_errors() {
        let mut tx = Capture { buf: [0; 32], len: 0, fail: true };
        let mut w = UartWriter::new(&mut tx);
        assert!(w.write_str("x").is_err());
    }
}
