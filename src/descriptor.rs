//! Pad descriptor decoding
//!
//! A Pad Descriptor is two little-endian 32-bit configuration words, DW0 and
//! DW1, read directly from a byte span. Keeping the bit-shift extraction in one
//! place (`decode_dw0`/`decode_dw1`) instead of scattering it through the
//! detector keeps the native-function isolation and buffer-consistency rules
//! in [`crate::validator`] expressible as plain field comparisons.
//!
//! Bit layout (self-contained; does not need to reproduce any particular
//! silicon stepping bit-for-bit, only to be internally consistent):
//!
//! DW0: `[1:0]` rx/tx latch state, `[9:8]` rx/tx disable, `[13:10]` mode,
//! `[20:17]` interrupt route, `[26:25]` trigger, `[31:30]` reset domain.
//! DW1: `[13:10]` termination.

use bitflags::bitflags;

/// Pad multiplexer selection: GPIO or one of seven native functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Pad operates as a plain GPIO line
    Gpio,
    /// Native function 1
    Nf1,
    /// Native function 2
    Nf2,
    /// Native function 3
    Nf3,
    /// Native function 4
    Nf4,
    /// Native function 5
    Nf5,
    /// Native function 6
    Nf6,
    /// Native function 7
    Nf7,
}

impl Mode {
    /// Decode the 4-bit mode field; `None` for the invalid range 8-15.
    pub fn decode(bits: u32) -> Option<Self> {
        match bits & 0xF {
            0 => Some(Mode::Gpio),
            1 => Some(Mode::Nf1),
            2 => Some(Mode::Nf2),
            3 => Some(Mode::Nf3),
            4 => Some(Mode::Nf4),
            5 => Some(Mode::Nf5),
            6 => Some(Mode::Nf6),
            7 => Some(Mode::Nf7),
            _ => None,
        }
    }

    /// Whether this mode is a native function (as opposed to plain GPIO)
    pub fn is_native_function(&self) -> bool {
        !matches!(self, Mode::Gpio)
    }
}

/// Reset domain whose reset returns a pad to its static default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResetDomain {
    /// Power-OK reset domain
    PwrOk,
    /// Deep sleep well reset domain
    Deep,
    /// Platform reset domain
    PltRst,
    /// Resume-well reset domain
    RsmRst,
}

impl ResetDomain {
    /// Decode the 2-bit reset domain field. Always succeeds: every 2-bit
    /// pattern names a domain in the enum.
    pub fn decode(bits: u32) -> Self {
        match bits & 0x3 {
            0 => ResetDomain::PwrOk,
            1 => ResetDomain::Deep,
            2 => ResetDomain::PltRst,
            _ => ResetDomain::RsmRst,
        }
    }
}

/// Receive/transmit buffer enable state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RxTxDisable {
    /// Both receive and transmit buffers are enabled
    BothEnabled,
    /// Receive buffer disabled, transmit enabled
    RxDisabled,
    /// Transmit buffer disabled, receive enabled
    TxDisabled,
    /// Both buffers disabled
    BothDisabled,
}

impl RxTxDisable {
    /// Decode from the 2-bit disable field: bit0 = tx disable, bit1 = rx disable.
    pub fn decode(bits: u32) -> Self {
        match bits & 0x3 {
            0b00 => RxTxDisable::BothEnabled,
            0b10 => RxTxDisable::RxDisabled,
            0b01 => RxTxDisable::TxDisabled,
            _ => RxTxDisable::BothDisabled,
        }
    }

    /// Whether the receive buffer is disabled
    pub fn rx_disabled(&self) -> bool {
        matches!(self, RxTxDisable::RxDisabled | RxTxDisable::BothDisabled)
    }

    /// Whether the transmit buffer is disabled
    pub fn tx_disabled(&self) -> bool {
        matches!(self, RxTxDisable::TxDisabled | RxTxDisable::BothDisabled)
    }
}

bitflags! {
    /// Interrupt controllers a pad may signal to. More than one bit may be set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct InterruptRoute: u8 {
        /// Route to the NMI controller
        const NMI  = 1 << 0;
        /// Route to SMI
        const SMI  = 1 << 1;
        /// Route to SCI
        const SCI  = 1 << 2;
        /// Route to the IO-APIC
        const APIC = 1 << 3;
    }
}

/// Interrupt trigger configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Trigger {
    /// No interrupt triggering
    Off,
    /// Level-triggered
    Level,
    /// Edge-triggered
    Edge,
    /// Both edges trigger
    EdgeBoth,
}

impl Trigger {
    /// Decode the 2-bit trigger field
    pub fn decode(bits: u32) -> Self {
        match bits & 0x3 {
            0 => Trigger::Off,
            1 => Trigger::Level,
            2 => Trigger::Edge,
            _ => Trigger::EdgeBoth,
        }
    }
}

/// Pull-up/pull-down termination configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// No pull resistor enabled
    None,
    /// Other / device-specific pull configuration
    Pull(u8),
}

impl Termination {
    /// Decode the 4-bit termination field
    pub fn decode(bits: u32) -> Self {
        let bits = (bits & 0xF) as u8;
        if bits == 0 {
            Termination::None
        } else {
            Termination::Pull(bits)
        }
    }

    /// Whether any pull resistor is enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Termination::None)
    }
}

/// GPIO-mode signal direction, derived from [`RxTxDisable`]. Only meaningful
/// for `Mode::Gpio` pads; native-function pads have no single "direction".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Pad drives an output (tx enabled, rx disabled)
    Output,
    /// Pad reads an input (rx enabled, tx disabled)
    Input,
    /// Both buffers enabled (bidirectional)
    InputOutput,
    /// Both buffers disabled (the pad is dead; never produced for a valid GPIO pad)
    Disabled,
}

impl Direction {
    /// Derive direction from the rx/tx disable state
    pub fn from_rx_tx(rx_tx: RxTxDisable) -> Self {
        match (rx_tx.rx_disabled(), rx_tx.tx_disabled()) {
            (false, false) => Direction::InputOutput,
            (true, false) => Direction::Output,
            (false, true) => Direction::Input,
            (true, true) => Direction::Disabled,
        }
    }
}

/// All fields decoded from DW0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedDw0 {
    /// Pad mode, or `None` if the 4-bit field is in the invalid 8-15 range
    pub mode: Option<Mode>,
    /// Reset domain
    pub reset: ResetDomain,
    /// Receive/transmit buffer enable state
    pub rx_tx: RxTxDisable,
    /// GPIO-mode output latch bit
    pub tx_state: bool,
    /// GPIO-mode input latch bit
    pub rx_state: bool,
    /// Interrupt routing bits
    pub interrupt_route: InterruptRoute,
    /// Trigger configuration
    pub trigger: Trigger,
}

/// Decode DW0 into its named fields
pub fn decode_dw0(dw0: u32) -> DecodedDw0 {
    DecodedDw0 {
        mode: Mode::decode(dw0 >> 10),
        reset: ResetDomain::decode(dw0 >> 30),
        rx_tx: RxTxDisable::decode(dw0 >> 8),
        tx_state: (dw0 & (1 << 1)) != 0,
        rx_state: (dw0 & (1 << 0)) != 0,
        interrupt_route: InterruptRoute::from_bits_truncate(((dw0 >> 17) & 0xF) as u8),
        trigger: Trigger::decode(dw0 >> 25),
    }
}

/// All fields decoded from DW1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedDw1 {
    /// Pull-up/pull-down termination configuration
    pub termination: Termination,
}

/// Decode DW1 into its named fields
pub fn decode_dw1(dw1: u32) -> DecodedDw1 {
    DecodedDw1 {
        termination: Termination::decode(dw1 >> 10),
    }
}

/// A single pad descriptor: two 32-bit configuration words read from flash.
///
/// Never mutated after construction (§3 invariant); all derived fields are
/// computed on demand from `dw0`/`dw1` rather than cached, so there is nothing
/// to keep in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PadDescriptor {
    /// Raw first configuration word, as stored little-endian on disk
    pub dw0: u32,
    /// Raw second configuration word, as stored little-endian on disk
    pub dw1: u32,
}

impl PadDescriptor {
    /// Read a descriptor from a little-endian byte slice. `bytes` must be at
    /// least 8 bytes; only the first 8 are consumed (entry sizes of 12/16/20
    /// carry extra trailing fields this crate does not need to decode).
    pub fn read(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 8 {
            return None;
        }
        let dw0 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let dw1 = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Some(Self { dw0, dw1 })
    }

    /// Decoded DW0 fields
    pub fn dw0_fields(&self) -> DecodedDw0 {
        decode_dw0(self.dw0)
    }

    /// Decoded DW1 fields
    pub fn dw1_fields(&self) -> DecodedDw1 {
        decode_dw1(self.dw1)
    }
}
