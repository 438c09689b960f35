use serde::{Deserialize, Serialize};

use super::alu::decode_signed;
use super::observer::ObserverHandle;

/// Port number `IN` reads from.
pub const INPUT_PORT: u8 = 0x00;
/// Port number `OUT` writes to.
pub const OUTPUT_PORT: u8 = 0x01;

/// Handle passed to the front end when the program blocks on `IN`.
///
/// It answers exactly one `IN`. Delivering against it is rejected once that
/// `IN` was answered, the engine was woken some other way, a later `IN` asked
/// again, or the emulator was stopped or restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputRequest {
    pub(crate) generation: u64,
    pub(crate) sequence: u64,
}

/// Single output latch plus the indirection used to ask for input.
#[derive(Debug, Clone, Default)]
pub struct IoPort {
    output: i8,
    observer: ObserverHandle,
}

impl IoPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_observer(&mut self, observer: ObserverHandle) {
        self.observer = observer;
    }

    /// The last value written by `OUT`, as a signed number.
    pub fn output(&self) -> i8 {
        self.output
    }

    pub fn set_output(&mut self, raw: u8) -> i8 {
        self.output = decode_signed(u32::from(raw), 8) as i8;
        tracing::debug!(raw, value = self.output, "output updated");
        let value = self.output;
        self.observer.notify(|o| o.output_updated(value));
        value
    }

    pub fn request_input(&self, request: InputRequest) {
        tracing::debug!(
            generation = request.generation,
            sequence = request.sequence,
            "input requested"
        );
        self.observer.notify(|o| o.input_requested(request));
    }
}

/// Parses the text a user typed in answer to an [`InputRequest`].
///
/// Accepts an optional `0x`/`x` prefix and surrounding whitespace; the value
/// must fit a byte.
pub fn parse_hex_input(text: &str) -> Option<u8> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .or_else(|| trimmed.strip_prefix('x'))
        .or_else(|| trimmed.strip_prefix('X'))
        .unwrap_or(trimmed);
    u8::from_str_radix(digits, 16).ok()
}
