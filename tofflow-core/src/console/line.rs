//! Line editing and command history

use heapless::String;

/// Line buffer capacity in bytes
pub const LINE_LEN: usize = 32;

/// Number of remembered command lines
pub const HISTORY_DEPTH: usize = 4;

const ESC: u8 = 0x1B;
const DEL: u8 = 0x7F;
const CR: u8 = b'\r';

/// Progress through an ANSI cursor sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Escape {
    #[default]
    Normal,
    Escape,
    Bracket,
}

/// What a byte did to the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Input {
    /// Part of an escape sequence; not echoed
    Swallowed,
    /// Up-arrow replaced the line with a history entry
    Recalled,
    /// Echo the byte; the line may have changed
    Edited,
    /// Echo the byte, then run the line
    Submit,
}

/// Ring of recent command lines
#[derive(Debug, Default)]
pub struct History {
    entries: [String<LINE_LEN>; HISTORY_DEPTH],
    next: usize,
    read: usize,
}

impl History {
    /// Remember a line; recall restarts from it
    pub fn record(&mut self, line: &str) {
        let slot = &mut self.entries[self.next];
        slot.clear();
        let _ = slot.push_str(line);
        self.read = self.next;
        self.next = (self.next + 1) % HISTORY_DEPTH;
    }

    /// Walk one entry back, wrapping around the ring
    pub fn recall(&mut self) -> Option<&str> {
        let index = self.read;
        if self.entries[index].is_empty() {
            return None;
        }
        self.read = (self.read + HISTORY_DEPTH - 1) % HISTORY_DEPTH;
        Some(self.entries[index].as_str())
    }
}

/// Character-at-a-time line editor
#[derive(Debug, Default)]
pub struct LineEditor {
    line: String<LINE_LEN>,
    escape: Escape,
    history: History,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn clear(&mut self) {
        self.line.clear();
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Feed one input byte
    pub fn feed(&mut self, byte: u8) -> Input {
        match (self.escape, byte) {
            (Escape::Normal, ESC) => {
                self.escape = Escape::Escape;
                return Input::Swallowed;
            }
            (Escape::Escape, b'[') => {
                self.escape = Escape::Bracket;
                return Input::Swallowed;
            }
            (Escape::Bracket, b'A') => {
                self.escape = Escape::Normal;
                if let Some(entry) = self.history.recall() {
                    self.line.clear();
                    let _ = self.line.push_str(entry);
                    return Input::Recalled;
                }
                return Input::Swallowed;
            }
            (Escape::Bracket, _) => {
                // other cursor keys are ignored
                self.escape = Escape::Normal;
                return Input::Swallowed;
            }
            (Escape::Escape, _) => self.escape = Escape::Normal,
            (Escape::Normal, _) => {}
        }

        match byte {
            CR => Input::Submit,
            DEL => {
                self.line.pop();
                Input::Edited
            }
            b' '..=b'~' => {
                let _ = self.line.push(byte as char);
                if self.line.len() == LINE_LEN {
                    Input::Submit
                } else {
                    Input::Edited
                }
            }
            _ => Input::Edited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(editor: &mut LineEditor, text: &str) -> Input {
        let mut last = Input::Edited;
        for b in text.bytes() {
            last = editor.feed(b);
        }
        last
    }

    #[test]
    fn test_accumulates_until_cr() {
        let mut editor = LineEditor::new();
        assert_eq!(type_str(&mut editor, "pl=12"), Input::Edited);
        assert_eq!(editor.line(), "pl=12");
        assert_eq!(editor.feed(b'\r'), Input::Submit);
        assert_eq!(editor.line(), "pl=12");
    }

    #[test]
    fn test_delete_erases() {
        let mut editor = LineEditor::new();
        type_str(&mut editor, "pll");
        editor.feed(DEL);
        assert_eq!(editor.line(), "pl");
        editor.clear();
        editor.feed(DEL);
        assert_eq!(editor.line(), "");
    }

    #[test]
    fn test_full_buffer_submits() {
        let mut editor = LineEditor::new();
        for _ in 0..LINE_LEN - 1 {
            assert_eq!(editor.feed(b'x'), Input::Edited);
        }
        assert_eq!(editor.feed(b'x'), Input::Submit);
        assert_eq!(editor.line().len(), LINE_LEN);
    }

    #[test]
    fn test_control_bytes_ignored() {
        let mut editor = LineEditor::new();
        editor.feed(b'\n');
        editor.feed(0x07);
        assert_eq!(editor.line(), "");
    }

    #[test]
    fn test_up_arrow_recalls_newest_first() {
        let mut editor = LineEditor::new();
        editor.history_mut().record("pl?");
        editor.history_mut().record("stop?");

        assert_eq!(type_str(&mut editor, "\x1b[A"), Input::Recalled);
        assert_eq!(editor.line(), "stop?");
        assert_eq!(type_str(&mut editor, "\x1b[A"), Input::Recalled);
        assert_eq!(editor.line(), "pl?");
        // empty slots end the walk
        assert_eq!(type_str(&mut editor, "\x1b[A"), Input::Swallowed);
        assert_eq!(editor.line(), "pl?");
    }

    #[test]
    fn test_history_wraps() {
        let mut history = History::default();
        for line in ["a", "b", "c", "d", "e"] {
            history.record(line);
        }
        assert_eq!(history.recall(), Some("e"));
        assert_eq!(history.recall(), Some("d"));
        assert_eq!(history.recall(), Some("c"));
        assert_eq!(history.recall(), Some("b"));
        assert_eq!(history.recall(), Some("e"));
    }

    #[test]
    fn test_other_escapes_swallowed() {
        let mut editor = LineEditor::new();
        assert_eq!(type_str(&mut editor, "\x1b[B"), Input::Swallowed);
        assert_eq!(editor.line(), "");
        // a lone escape falls back to normal input
        editor.feed(ESC);
        assert_eq!(editor.feed(b'x'), Input::Edited);
        assert_eq!(editor.line(), "x");
    }
}
