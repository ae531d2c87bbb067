//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod console_rx;
pub mod sample_clock;

pub use console_rx::console_rx_task;
pub use sample_clock::sample_clock_task;
