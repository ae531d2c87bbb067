//! Inter-task communication channels
//!
//! Everything funnels into the dispatcher in `main`; the tasks only turn
//! hardware activity into values on these statics.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

/// Channel capacity for received console bytes
pub const CONSOLE_RX_SIZE: usize = 64;

/// Bytes received on the console UART
pub static CONSOLE_RX: Channel<CriticalSectionRawMutex, u8, CONSOLE_RX_SIZE> = Channel::new();

/// Sample clock reprogramming from the board
///
/// `Some(period_us)` (re)starts the ticker, `None` stops it.
pub static SAMPLE_CLOCK: Signal<CriticalSectionRawMutex, Option<u64>> = Signal::new();

/// Host-mode sample tick
pub static SAMPLE_TICK: Signal<CriticalSectionRawMutex, ()> = Signal::new();
