//! Board collaborator for the RP2040 + MAX35104 reference design
//!
//! Pin map:
//!
//! | Signal       | GPIO |
//! |--------------|------|
//! | UART0 TX/RX  | 0/1  |
//! | TOF LED      | 14   |
//! | TEMP LED     | 15   |
//! | SPI0 MISO    | 16   |
//! | TDC CS       | 17   |
//! | SPI0 SCK     | 18   |
//! | SPI0 MOSI    | 19   |
//! | TDC INT      | 20   |

use embassy_time::{block_for, Duration, Instant};
use tofflow_hal::{Board, FlashError, FlashStorage, Led, SampleClock, Timebase, Timestamp};
use tofflow_hal_rp2040::clock::tick_period;
use tofflow_hal_rp2040::flash::Rp2040Flash;
use tofflow_hal_rp2040::gpio::StatusLed;

use crate::channels::SAMPLE_CLOCK;

pub struct Rp2040Board {
    flash: Rp2040Flash<'static>,
    leds: [StatusLed<'static>; 2],
    period_us: Option<u64>,
    running: bool,
}

impl Rp2040Board {
    pub fn new(flash: Rp2040Flash<'static>, tof_led: StatusLed<'static>, temp_led: StatusLed<'static>) -> Self {
        Self {
            flash,
            leds: [tof_led, temp_led],
            period_us: None,
            running: false,
        }
    }

    fn publish_clock(&self) {
        SAMPLE_CLOCK.signal(if self.running { self.period_us } else { None });
    }
}

impl FlashStorage for Rp2040Board {
    fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<(), FlashError> {
        self.flash.read(offset, buffer)
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
        self.flash.write(offset, data)
    }

    fn capacity(&self) -> u32 {
        self.flash.capacity()
    }
}

impl SampleClock for Rp2040Board {
    fn clock_enable(&mut self, enable: bool) {
        self.running = enable;
        self.publish_clock();
    }

    fn clock_set(&mut self, hz: f32) -> f32 {
        let Some((period, actual)) = tick_period(hz) else {
            return 0.0;
        };
        self.period_us = Some(period);
        if self.running {
            self.publish_clock();
        }
        actual
    }
}

impl Timebase for Rp2040Board {
    fn timestamp(&self) -> Timestamp {
        Instant::now().as_micros()
    }
}

impl Board for Rp2040Board {
    fn set_led(&mut self, led: Led, on: bool) {
        self.leds[led as usize].set(on);
    }

    fn reset(&mut self) {
        cortex_m::peripheral::SCB::sys_reset();
    }

    fn wait_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(u64::from(ms)));
    }
}
