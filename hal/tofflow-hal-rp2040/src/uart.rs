//! Console UART
//!
//! Transmit is blocking: replies are short and the dispatcher has nothing
//! better to do meanwhile. Receive runs in its own task, which pushes
//! bytes into a channel that the dispatcher polls through [`ConsoleRx`].

use embassy_rp::uart::{self, BufferedUartTx};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;

/// Console baud rate
pub const CONSOLE_BAUD: u32 = 115_200;

/// UART configuration for the console: 8N1 at [`CONSOLE_BAUD`]
pub fn console_config() -> uart::Config {
    let mut config = uart::Config::default();
    config.baudrate = CONSOLE_BAUD;
    config
}

/// Transmit half
pub struct ConsoleTx {
    tx: BufferedUartTx,
}

impl ConsoleTx {
    pub fn new(tx: BufferedUartTx) -> Self {
        Self { tx }
    }
}

impl tofflow_hal::UartTx for ConsoleTx {
    type Error = uart::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let mut rest = data;
        while !rest.is_empty() {
            let n = self.tx.blocking_write(rest)?;
            rest = &rest[n..];
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.tx.blocking_flush()
    }
}

/// Receive side as seen by the dispatcher
pub struct ConsoleRx<'a, M: RawMutex, const N: usize> {
    bytes: Receiver<'a, M, u8, N>,
}

impl<'a, M: RawMutex, const N: usize> ConsoleRx<'a, M, N> {
    pub fn new(bytes: Receiver<'a, M, u8, N>) -> Self {
        Self { bytes }
    }

    /// Wait for the next byte
    pub async fn read_byte(&mut self) -> u8 {
        self.bytes.receive().await
    }
}

impl<M: RawMutex, const N: usize> tofflow_hal::UartRx for ConsoleRx<'_, M, N> {
    type Error = core::convert::Infallible;

    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        Ok(self.bytes.try_receive().ok())
    }
}
