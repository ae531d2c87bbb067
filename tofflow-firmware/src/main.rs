//! tofflow - Ultrasonic Flow Meter Firmware
//!
//! Main firmware binary for an RP2040 driving a MAX35104 time-to-digital
//! converter. Two small tasks turn UART input and the host-mode sample
//! clock into signals; everything else runs in the dispatcher loop below,
//! one event at a time.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select3, Either3};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_rp::Peri;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tofflow_core::flow::FlowEvents;
use tofflow_core::traits::ChipVariant;
use tofflow_core::Instrument;
use tofflow_drivers::Max3510x;
use tofflow_hal::{UartRx, UartWriter};
use tofflow_hal_rp2040::flash::Rp2040Flash;
use tofflow_hal_rp2040::gpio::StatusLed;
use tofflow_hal_rp2040::spi::CsDevice;
use tofflow_hal_rp2040::uart::{console_config, ConsoleRx, ConsoleTx};

use crate::board::Rp2040Board;
use crate::channels::{CONSOLE_RX, SAMPLE_TICK};

mod board;
mod channels;
mod tasks;

/// TDC SPI clock
const SPI_FREQUENCY_HZ: u32 = 4_000_000;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("tofflow firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Console on UART0, 115200 8N1
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 64]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, console_config());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    let mut console_tx = ConsoleTx::new(tx);

    // MAX35104 on SPI0, mode 1
    let mut spi_config = spi::Config::default();
    spi_config.frequency = SPI_FREQUENCY_HZ;
    spi_config.phase = spi::Phase::CaptureOnSecondTransition;
    spi_config.polarity = spi::Polarity::IdleLow;
    let bus = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let device = CsDevice::new(bus, cs).unwrap();
    let chip = Max3510x::new(device, ChipVariant::Max35104);
    let mut tdc_int = Input::new(p.PIN_20, Pull::Up);

    let board = Rp2040Board::new(
        Rp2040Flash::new(p.FLASH),
        StatusLed::new(Peri::<AnyPin>::from(p.PIN_14), false),
        StatusLed::new(Peri::<AnyPin>::from(p.PIN_15), false),
    );

    spawner.spawn(tasks::console_rx_task(rx)).unwrap();
    spawner.spawn(tasks::sample_clock_task()).unwrap();

    let mut instrument = Instrument::new(chip, board);
    let mut out = UartWriter::new(&mut console_tx);
    let outcome = instrument.boot(&mut out);
    info!("Instrument running ({})", outcome);

    let mut console_rx = ConsoleRx::new(CONSOLE_RX.receiver());

    loop {
        match select3(tdc_int.wait_for_low(), SAMPLE_TICK.wait(), console_rx.read_byte()).await {
            Either3::First(()) => {
                let output = instrument.handle_event(FlowEvents::CHIP_INTERRUPT, &mut out);
                if output.timed_out {
                    debug!("timeout, {} bus errors", instrument.chip().bus_errors());
                }
            }
            Either3::Second(()) => {
                instrument.handle_event(FlowEvents::TICK, &mut out);
            }
            Either3::Third(byte) => {
                instrument.handle_byte(byte, &mut out);
                while let Ok(Some(byte)) = console_rx.try_read_byte() {
                    instrument.handle_byte(byte, &mut out);
                }
            }
        }
    }
}
