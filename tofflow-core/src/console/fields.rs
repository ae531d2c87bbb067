//! Register-field commands
//!
//! Most console commands read or write one chip bitfield with a fixed
//! encoding. Those are described as data; the rest live in
//! [`super::actions`].

use super::{parse, ArgError, Shell};
use crate::chip::Field;

/// How a plain integer field is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountStyle {
    /// `12`
    Plain,
    /// `12 pulses`
    Suffix(&'static str),
    /// `wave 12`
    Prefix(&'static str),
    /// `hitcount = 3 (2)`, value then raw code
    WithCode(&'static str),
}

/// A console command bound to a single register field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCommand {
    /// `0`/`1`, shown with a label per state
    Binary {
        field: Field,
        labels: [&'static str; 2],
    },
    /// One of a fixed set of tags
    ///
    /// The unit is appended to numeric tags only.
    Tagged {
        field: Field,
        tags: &'static [(&'static str, u16)],
        unit: &'static str,
    },
    /// Integer in `min..=max`, stored as `value - bias`
    Count {
        field: Field,
        min: u16,
        max: u16,
        bias: u16,
        style: CountStyle,
        /// Print the applied value after a set
        echo: bool,
    },
    /// Signed 8-bit value stored as two's complement
    Signed { field: Field },
}

impl FieldCommand {
    pub fn get(&self, sh: &mut Shell<'_>) {
        match *self {
            FieldCommand::Binary { field, labels } => {
                let raw = sh.chip.read_field(field);
                let label = if raw == 0 { labels[0] } else { labels[1] };
                emit!(sh.out, "{} ({})\r\n", label, raw);
            }
            FieldCommand::Tagged { field, tags, unit } => {
                let raw = sh.chip.read_field(field);
                match parse::tag_of(raw, tags) {
                    Some(tag) if tag.starts_with(|c: char| c.is_ascii_digit()) => {
                        emit!(sh.out, "{}{} ({})\r\n", tag, unit, raw)
                    }
                    Some(tag) => emit!(sh.out, "{} ({})\r\n", tag, raw),
                    None => emit!(sh.out, "invalid ({})\r\n", raw),
                }
            }
            FieldCommand::Count {
                field, bias, style, ..
            } => {
                let raw = sh.chip.read_field(field);
                let value = raw + bias;
                match style {
                    CountStyle::Plain => emit!(sh.out, "{}\r\n", value),
                    CountStyle::Suffix(s) => emit!(sh.out, "{}{}\r\n", value, s),
                    CountStyle::Prefix(p) => emit!(sh.out, "{}{}\r\n", p, value),
                    CountStyle::WithCode(p) => emit!(sh.out, "{}{} ({})\r\n", p, value, raw),
                }
            }
            FieldCommand::Signed { field } => {
                let raw = sh.chip.read_field(field);
                emit!(sh.out, "{}\r\n", raw as u8 as i8);
            }
        }
    }

    pub fn set(&self, sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
        match *self {
            FieldCommand::Binary { field, .. } => {
                let value = parse::binary(arg)?;
                sh.chip.write_field(field, value);
            }
            FieldCommand::Tagged { field, tags, .. } => {
                let code = parse::tag(arg, tags)?;
                sh.chip.write_field(field, code);
            }
            FieldCommand::Count {
                field,
                min,
                max,
                bias,
                echo,
                ..
            } => {
                let value = parse::bounded(arg, min as u32, max as u32)? as u16;
                sh.chip.write_field(field, value - bias);
                if echo {
                    self.get(sh);
                }
            }
            FieldCommand::Signed { field } => {
                let value = parse::signed(arg)?;
                let value = i8::try_from(value).map_err(|_| ArgError::OutOfRange)?;
                sh.chip.write_field(field, value as u8 as u16);
            }
        }
        Ok(())
    }
}
