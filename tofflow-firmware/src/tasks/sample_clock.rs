//! Host-mode sample clock
//!
//! Runs an embassy ticker at the period the board programmed and raises
//! [`SAMPLE_TICK`] on every expiry. A new period restarts the ticker, so
//! the first tick after a change arrives one full period later.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use crate::channels::{SAMPLE_CLOCK, SAMPLE_TICK};

#[embassy_executor::task]
pub async fn sample_clock_task() {
    info!("Sample clock task started");

    let mut period = None;

    loop {
        let Some(period_us) = period else {
            period = SAMPLE_CLOCK.wait().await;
            continue;
        };

        debug!("sample clock period {} us", period_us);
        let mut ticker = Ticker::every(Duration::from_micros(period_us));
        loop {
            match select(ticker.next(), SAMPLE_CLOCK.wait()).await {
                Either::First(()) => SAMPLE_TICK.signal(()),
                Either::Second(next) => {
                    period = next;
                    break;
                }
            }
        }
    }
}
