//! Serial command console
//!
//! Bytes arrive one at a time from the UART. Completed lines are matched
//! against the command table and run against the flow controller, the
//! configuration store and the chip. Replies are written to any
//! [`core::fmt::Write`] sink; write errors are dropped since the console
//! has nowhere else to report them.

use core::fmt;

use tofflow_hal::{Board, Timestamp};

use crate::config::ConfigStore;
use crate::flow::FlowController;
use crate::traits::{EventTimingMode, TdcChip};

macro_rules! emit {
    ($out:expr, $($arg:tt)*) => {
        $crate::console::print(&mut *$out, format_args!($($arg)*))
    };
}

pub mod actions;
pub mod commands;
pub mod fields;
pub mod line;
pub mod parse;
pub mod report;

pub use commands::{Command, COMMANDS};
pub use line::{History, Input, LineEditor, LINE_LEN};

pub(crate) fn print(out: &mut dyn fmt::Write, args: fmt::Arguments<'_>) {
    let _ = out.write_fmt(args);
}

/// Why a setter refused its argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArgError {
    /// Not a number, tag or list of the expected form
    Malformed,
    /// Outside the field's legal range
    OutOfRange,
    /// Not one of the accepted tags
    UnknownTag,
    /// Hit waves must rise strictly, starting after the t2 wave
    NotIncreasing,
}

/// Chip command the one-shot reporter decodes results for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LastCommand {
    #[default]
    None,
    TofUp,
    TofDown,
    TofDiff,
    Temperature,
    Event(EventTimingMode),
    Calibrate,
}

/// Console state that outlives a single line
#[derive(Debug, Default)]
pub struct Session {
    last_command: LastCommand,
    reporting: bool,
    /// A line is being typed; one-shot reports hold off
    typing: bool,
    /// Seconds accumulated by the report stream
    report_time: f32,
    first_event: bool,
    last_report: Timestamp,
}

impl Session {
    pub fn last_command(&self) -> LastCommand {
        self.last_command
    }

    /// The measurement stream is running
    pub fn reporting(&self) -> bool {
        self.reporting
    }
}

/// Everything a command can touch
pub struct Shell<'a> {
    pub session: &'a mut Session,
    pub flow: &'a mut FlowController,
    pub config: &'a mut ConfigStore,
    pub chip: &'a mut dyn TdcChip,
    pub board: &'a mut dyn Board,
    pub out: &'a mut dyn fmt::Write,
}

impl Shell<'_> {
    /// Run one command line; true if it belongs in the history
    pub fn execute(&mut self, line: &str) -> bool {
        let line = line.trim_start();
        let Some(cmd) = commands::lookup(line) else {
            if !line.is_empty() {
                emit!(self.out, "unknown command.  type 'help' for a command list.\r\n");
            }
            emit!(self.out, "> ");
            return false;
        };

        let rest = &line[cmd.name.len()..];
        if rest.starts_with('?') {
            if cmd.get(self) {
                emit!(self.out, "> ");
                return true;
            }
            emit!(self.out, "read not supported\r\n> ");
            return false;
        }

        match cmd.set(self, parse::argument(rest)) {
            None => {
                emit!(self.out, "assignment not supported\r\n> ");
                false
            }
            Some(Err(_e)) => {
                debug!("{}: {}", cmd.name, _e);
                emit!(self.out, "argument error:  {}\r\n> ", cmd.help);
                false
            }
            Some(Ok(())) => {
                if !self.session.reporting {
                    emit!(self.out, "> ");
                }
                true
            }
        }
    }
}

/// Line editor plus session state
#[derive(Debug, Default)]
pub struct Console {
    editor: LineEditor,
    session: Session,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn prompt(&self, out: &mut dyn fmt::Write) {
        emit!(out, "> ");
    }

    /// Feed one received byte
    pub fn handle_byte(
        &mut self,
        byte: u8,
        flow: &mut FlowController,
        config: &mut ConfigStore,
        chip: &mut dyn TdcChip,
        board: &mut dyn Board,
        out: &mut dyn fmt::Write,
    ) {
        self.session.typing = true;
        let input = self.editor.feed(byte);
        match input {
            Input::Swallowed => return,
            Input::Recalled => {
                emit!(out, "\x1b[2K\r> {}", self.editor.line());
                return;
            }
            Input::Edited | Input::Submit => {}
        }

        emit!(out, "{}", byte as char);
        if byte == b'\r' {
            emit!(out, "\n");
        }
        if self.session.reporting {
            self.session.reporting = false;
            emit!(out, "\x1b[2K\r> {}", byte as char);
        }
        if input != Input::Submit {
            return;
        }

        let mut line: heapless::String<LINE_LEN> = heapless::String::new();
        let _ = line.push_str(self.editor.line().trim_start());
        self.editor.clear();

        let mut shell = Shell {
            session: &mut self.session,
            flow,
            config,
            chip,
            board,
            out,
        };
        if shell.execute(&line) {
            self.editor.history_mut().record(&line);
        }
        self.session.typing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::field;
    use crate::testing::Harness;
    use crate::traits::TdcCommand;

    #[test]
    fn test_query_and_assign() {
        let mut h = Harness::new();
        h.type_str("pl?\r");
        assert_eq!(h.take_output().as_str(), "pl?\r\n15 pulses\r\n> ");
        h.type_str("pl = 20\r");
        assert_eq!(h.chip_field(field::PL), 20);
        assert_eq!(h.take_output().as_str(), "pl = 20\r\n> ");
    }

    #[test]
    fn test_out_of_range_rejected_without_write() {
        let mut h = Harness::new();
        let writes = h.chip.writes;
        h.type_str("pl=200\r");
        assert_eq!(h.chip.writes, writes);
        assert_eq!(h.chip_field(field::PL), 15);
        assert!(h
            .take_output()
            .ends_with("argument error:  pulse launch size:  0-127 pulses\r\n> "));
    }

    #[test]
    fn test_unknown_and_empty_lines() {
        let mut h = Harness::new();
        h.type_str("frob\r");
        assert!(h
            .take_output()
            .ends_with("unknown command.  type 'help' for a command list.\r\n> "));
        h.type_str("\r");
        assert_eq!(h.take_output().as_str(), "\r\n> ");
        h.type_str("   pl?\r");
        assert!(h.take_output().ends_with("15 pulses\r\n> "));
    }

    #[test]
    fn test_capability_errors() {
        let mut h = Harness::new();
        h.type_str("save?\r");
        assert!(h.take_output().ends_with("read not supported\r\n> "));
        assert!(h.chip.commands.is_empty());
        let cmd = commands::lookup("pl").unwrap();
        assert!(cmd.readable());
    }

    #[test]
    fn test_history_records_successes_only() {
        let mut h = Harness::new();
        h.type_str("pl=20\r");
        h.type_str("pl=999\r");
        h.take_output();
        h.type_str("\x1b[A");
        assert_eq!(h.take_output().as_str(), "\x1b[2K\r> pl=20");
        h.type_str("\r");
        assert_eq!(h.chip_field(field::PL), 20);
    }

    #[test]
    fn test_delete_edits_line() {
        let mut h = Harness::new();
        h.type_str("pl=129\x7f7\r");
        assert_eq!(h.chip_field(field::PL), 127);
    }

    #[test]
    fn test_key_stops_report_stream() {
        let mut h = Harness::new();
        h.type_str("report\r");
        assert_eq!(h.take_output().as_str(), "report\r\n");
        assert!(h.console.session().reporting());
        assert_eq!(h.console.session().report_time, 0.0);

        h.type_str("x");
        assert!(!h.console.session().reporting());
        assert_eq!(h.take_output().as_str(), "x\x1b[2K\r> x");
    }

    #[test]
    fn test_one_shot_round_trip() {
        let mut h = Harness::new();
        h.type_str("tof_up\r");
        assert_eq!(h.chip.last_command(), Some(TdcCommand::TofUp));
        assert_eq!(h.console.session().last_command(), LastCommand::TofUp);
        assert!(!h.console.session().typing);
    }

    #[test]
    fn test_typing_flag_tracks_partial_line() {
        let mut h = Harness::new();
        h.type_str("pl");
        assert!(h.console.session().typing);
        h.type_str("?\r");
        assert!(!h.console.session().typing);
    }
}
