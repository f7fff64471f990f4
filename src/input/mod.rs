//! Controller input: button masks, launch-combo parsing and the per-frame
//! input snapshot.

pub mod poller;

use bitflags::bitflags;

pub use poller::{ButtonWatch, InputRig, InputSource, PollerConfig, SharedInput};

bitflags! {
    /// Controller button bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Keys: u64 {
        const A      = 1 << 0;
        const B      = 1 << 1;
        const X      = 1 << 2;
        const Y      = 1 << 3;
        const LSTICK = 1 << 4;
        const RSTICK = 1 << 5;
        const L      = 1 << 6;
        const R      = 1 << 7;
        const ZL     = 1 << 8;
        const ZR     = 1 << 9;
        const PLUS   = 1 << 10;
        const MINUS  = 1 << 11;
        const DLEFT  = 1 << 12;
        const DUP    = 1 << 13;
        const DRIGHT = 1 << 14;
        const DDOWN  = 1 << 15;
        const SL     = 1 << 16;
        const SR     = 1 << 17;
    }
}

impl Keys {
    /// Decodes a key name as it appears in the settings combo string.
    /// Unknown names decode to an empty mask.
    pub fn from_name(name: &str) -> Keys {
        match name.to_ascii_uppercase().as_str() {
            "A" => Keys::A,
            "B" => Keys::B,
            "X" => Keys::X,
            "Y" => Keys::Y,
            "LS" => Keys::LSTICK,
            "RS" => Keys::RSTICK,
            "L" => Keys::L,
            "R" => Keys::R,
            "ZL" => Keys::ZL,
            "ZR" => Keys::ZR,
            "PLUS" => Keys::PLUS,
            "MINUS" => Keys::MINUS,
            "DLEFT" => Keys::DLEFT,
            "DUP" => Keys::DUP,
            "DRIGHT" => Keys::DRIGHT,
            "DDOWN" => Keys::DDOWN,
            "SL" => Keys::SL,
            "SR" => Keys::SR,
            _ => Keys::empty(),
        }
    }
}

/// Most tokens a launch combo may hold.
pub const COMBO_MAX_KEYS: usize = 4;

/// Parses a `modifier+modifier+...` combo string into one OR-combined mask.
/// At most [`COMBO_MAX_KEYS`] tokens are consumed; unknown tokens contribute
/// nothing, so a fully malformed string yields an empty mask that can never
/// trigger.
pub fn parse_combo(value: &str) -> Keys {
    let mut combo = Keys::empty();
    for token in value.split('+').take(COMBO_MAX_KEYS) {
        combo |= Keys::from_name(token.trim());
    }
    combo
}

/// One touch sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchPoint {
    pub x: u32,
    pub y: u32,
}

/// One analog stick sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StickPos {
    pub x: i32,
    pub y: i32,
}

/// Raw sample read from the host input services by the poller.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSample {
    pub keys_down: Keys,
    pub keys_held: Keys,
    pub touch: Option<TouchPoint>,
    pub stick_left: StickPos,
    pub stick_right: StickPos,
}

/// Snapshot handed to the frame loop once per iteration. `keys_down` is the
/// OR-accumulation of every press since the previous frame, so a skipped
/// frame loses no input.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputFrame {
    pub keys_down: Keys,
    pub keys_held: Keys,
    pub touch: Option<TouchPoint>,
    pub stick_left: StickPos,
    pub stick_right: StickPos,
}
