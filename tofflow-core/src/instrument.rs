//! Single-threaded dispatcher
//!
//! Owns one chip and one board together with the flow controller, the
//! configuration store and the console. The firmware main loop feeds it
//! chip interrupts, sample-clock ticks and received bytes; everything it
//! has to say goes to the supplied text sink.

use core::fmt;

use tofflow_hal::Board;

use crate::config::{ConfigStore, LoadOutcome};
use crate::console::Console;
use crate::flow::{FlowController, FlowEvents, FlowOutput, TemperatureSample};
use crate::traits::TdcChip;

pub struct Instrument<C: TdcChip, B: Board> {
    chip: C,
    board: B,
    flow: FlowController,
    config: ConfigStore,
    console: Console,
    temperature: Option<TemperatureSample>,
}

impl<C: TdcChip, B: Board> Instrument<C, B> {
    pub fn new(chip: C, board: B) -> Self {
        Self {
            chip,
            board,
            flow: FlowController::new(),
            config: ConfigStore::new(),
            console: Console::new(),
            temperature: None,
        }
    }

    /// Print the prompt, restore the stored configuration and start sampling
    pub fn boot(&mut self, out: &mut dyn fmt::Write) -> LoadOutcome {
        self.console.prompt(out);
        let outcome = self
            .config
            .load(&mut self.flow, &mut self.chip, &mut self.board);
        self.flow
            .init(self.config.registers(), &mut self.chip, &mut self.board);
        info!("boot: {}", outcome);
        outcome
    }

    /// Run the flow controller and route what it produced to the console
    pub fn handle_event(&mut self, events: FlowEvents, out: &mut dyn fmt::Write) -> FlowOutput {
        let output = self
            .flow
            .handle_event(events, &mut self.chip, &mut self.board);

        if let Some(result) = &output.measurement {
            self.console.report_results(result, out);
        }
        if let Some(sample) = output.temperature {
            self.temperature = Some(sample);
        }
        if let Some(status) = output.idle_status {
            self.console
                .report_status(status, &mut self.chip, &self.board, out);
        }
        output
    }

    /// Feed one byte received on the console UART
    pub fn handle_byte(&mut self, byte: u8, out: &mut dyn fmt::Write) {
        self.console.handle_byte(
            byte,
            &mut self.flow,
            &mut self.config,
            &mut self.chip,
            &mut self.board,
            out,
        );
    }

    pub fn chip(&self) -> &C {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut C {
        &mut self.chip
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn flow(&self) -> &FlowController {
        &self.flow
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Most recent thermistor reading
    pub fn temperature(&self) -> Option<TemperatureSample> {
        self.temperature
    }
}
