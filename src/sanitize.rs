//! Strips terminal escape sequences from inbound chat text.
//!
//! Inbound lines are sanitized before command detection so a client
//! cannot smuggle a command (or garbage) inside a color sequence.
//! Outbound frames are never sanitized; the server deliberately colors
//! its own announcements.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// ANSI escape grammar: an ESC or 8-bit CSI introducer followed by
/// parameter bytes and a final byte, or an OSC sequence ended by BEL.
/// Anything that doesn't complete a sequence passes through unchanged.
static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\x1B\x9B][\[\]()#;?]*(?:(?:(?:[a-zA-Z\d]*(?:;[a-zA-Z\d]*)*)?\x07)|(?:(?:\d{1,4}(?:;\d{0,4})*)?[\dA-PRZcf-ntqry=><~]))",
    )
    .expect("ANSI escape pattern is valid")
});

/// Remove all terminal control/escape sequences from `input`.
///
/// Pure and panic-free; returns the input unchanged (borrowed) when it
/// contains no sequences.
pub fn strip_ansi(input: &str) -> Cow<'_, str> {
    ANSI_RE.replace_all(input, "")
}
