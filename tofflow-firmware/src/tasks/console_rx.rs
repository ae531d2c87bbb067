//! Console UART receive task
//!
//! Moves received bytes into the dispatcher's channel.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use crate::channels::CONSOLE_RX;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

#[embassy_executor::task]
pub async fn console_rx_task(mut rx: BufferedUartRx) {
    info!("Console RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) => {
                trace!("RX: {} bytes", n);
                for &byte in &buf[..n] {
                    // backpressure into the UART ring buffer
                    CONSOLE_RX.send(byte).await;
                }
            }
            Err(e) => {
                warn!("Console UART error: {:?}", e);
            }
        }
    }
}
