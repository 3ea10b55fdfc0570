//! Colour and layout decisions for console output

use owo_colors::{OwoColorize, colors::css};
use requisition::Status;

/// Below this many columns the list is shown one requisition per block.
const NARROW_COLUMNS: u16 = 60;

/// Whether the requisition table would wrap on this terminal.
///
/// Output that is not a terminal is never narrow.
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < NARROW_COLUMNS)
}

/// Whether stdout accepts colour.
pub fn colour_enabled() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// What a message tells the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Something was saved or is done.
    Success,
    /// Input was dropped or a file is missing.
    Warning,
    /// Work still outstanding.
    Outstanding,
    /// Secondary detail.
    Muted,
}

impl Tone {
    fn paint(self, text: &str) -> String {
        match self {
            Self::Success => text.fg::<css::Green>().to_string(),
            Self::Warning => text.fg::<css::Orange>().to_string(),
            Self::Outstanding => text.fg::<css::Red>().to_string(),
            Self::Muted => text.dimmed().to_string(),
        }
    }

    /// Render `text` in this tone, or plainly if colour is off.
    pub fn apply(self, text: &str, colour: bool) -> String {
        if colour {
            self.paint(text)
        } else {
            text.to_string()
        }
    }
}

impl From<Status> for Tone {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => Self::Outstanding,
            Status::Completed => Self::Success,
        }
    }
}

/// A status word padded to `width`, coloured by how much work it leaves.
///
/// Padding is applied before colour so escape codes do not skew columns.
pub fn status_label(status: Status, width: usize, colour: bool) -> String {
    Tone::from(status).apply(&format!("{:<width$}", status.as_str()), colour)
}

/// Tone helpers for anything string-like.
pub trait Colorize {
    fn tone(&self, tone: Tone) -> String;

    fn success(&self) -> String {
        self.tone(Tone::Success)
    }

    fn warning(&self) -> String {
        self.tone(Tone::Warning)
    }

    fn dim(&self) -> String {
        self.tone(Tone::Muted)
    }
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn tone(&self, tone: Tone) -> String {
        tone.apply(self.as_ref(), colour_enabled())
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Status::Pending, 9, "Pending  "; "pending padded")]
    #[test_case(Status::Completed, 0, "Completed"; "no padding")]
    fn plain_status_label(status: Status, width: usize, expected: &str) {
        assert_eq!(status_label(status, width, false), expected);
    }

    #[test]
    fn coloured_label_keeps_padding_inside_escape_codes() {
        let label = status_label(Status::Pending, 10, true);

        assert!(label.starts_with('\u{1b}'));
        assert!(label.contains("Pending   "));
    }

    #[test]
    fn statuses_map_to_tones() {
        assert_eq!(Tone::from(Status::Pending), Tone::Outstanding);
        assert_eq!(Tone::from(Status::Completed), Tone::Success);
    }
}
