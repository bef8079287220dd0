//! Test-only helpers: synthetic descriptor/table builders and a small
//! deterministic PRNG for the property tests in §8 of the design notes.
//!
//! Kept as a shared module (rather than copy-pasted into each test module) so
//! every component's tests build descriptors the same way the detector itself
//! would encounter them on disk.

use crate::descriptor::{InterruptRoute, Mode, PadDescriptor, ResetDomain, Trigger};

/// Builds a [`PadDescriptor`] field-by-field using the same bit positions as
/// [`crate::descriptor::decode_dw0`]/[`crate::descriptor::decode_dw1`].
#[derive(Debug, Clone, Copy)]
pub struct PadBuilder {
    mode: Mode,
    reset: ResetDomain,
    rx_disable: bool,
    tx_disable: bool,
    tx_state: bool,
    rx_state: bool,
    interrupt_route: InterruptRoute,
    trigger: Trigger,
    termination: u8,
}

impl PadBuilder {
    /// Start a GPIO-mode pad, reset domain PLTRST, buffers enabled, no
    /// interrupt routing, termination disabled — the baseline "obviously
    /// valid" pad most tests mutate from.
    pub fn gpio() -> Self {
        Self {
            mode: Mode::Gpio,
            reset: ResetDomain::PltRst,
            rx_disable: false,
            tx_disable: false,
            tx_state: false,
            rx_state: false,
            interrupt_route: InterruptRoute::empty(),
            trigger: Trigger::Off,
            termination: 0,
        }
    }

    /// Start a native-function 1 pad with the same baseline defaults.
    pub fn nf1() -> Self {
        Self {
            mode: Mode::Nf1,
            ..Self::gpio()
        }
    }

    /// Set an arbitrary mode
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set reset domain to PLTRST (the physical signature's expected value)
    pub fn reset_pltrst(mut self) -> Self {
        self.reset = ResetDomain::PltRst;
        self
    }

    /// Set an arbitrary reset domain
    pub fn reset(mut self, reset: ResetDomain) -> Self {
        self.reset = reset;
        self
    }

    /// Disable both rx and tx buffers
    pub fn rx_tx_both_disabled(mut self) -> Self {
        self.rx_disable = true;
        self.tx_disable = true;
        self
    }

    /// Disable only the rx buffer (a partial, normally-invalid state)
    pub fn rx_tx_rx_disabled(mut self) -> Self {
        self.rx_disable = true;
        self.tx_disable = false;
        self
    }

    /// Disable only the tx buffer (a partial, normally-invalid state)
    pub fn rx_tx_tx_disabled(mut self) -> Self {
        self.rx_disable = false;
        self.tx_disable = true;
        self
    }

    /// Set the GPIO-mode output latch bit
    pub fn tx_state(mut self, state: bool) -> Self {
        self.tx_state = state;
        self
    }

    /// Set the GPIO-mode input latch bit
    pub fn rx_state(mut self, state: bool) -> Self {
        self.rx_state = state;
        self
    }

    /// Route this pad's interrupt to the IO-APIC
    pub fn interrupt_route_apic(mut self) -> Self {
        self.interrupt_route = InterruptRoute::APIC;
        self
    }

    /// Set the trigger to off
    pub fn trigger_off(mut self) -> Self {
        self.trigger = Trigger::Off;
        self
    }

    /// Set the trigger to level
    pub fn trigger_level(mut self) -> Self {
        self.trigger = Trigger::Level;
        self
    }

    /// Enable a (nonzero) pull termination
    pub fn termination_pull(mut self) -> Self {
        self.termination = 0b0001;
        self
    }

    /// Assemble the raw DW0/DW1 words
    pub fn build(self) -> PadDescriptor {
        let mode_bits: u32 = match self.mode {
            Mode::Gpio => 0,
            Mode::Nf1 => 1,
            Mode::Nf2 => 2,
            Mode::Nf3 => 3,
            Mode::Nf4 => 4,
            Mode::Nf5 => 5,
            Mode::Nf6 => 6,
            Mode::Nf7 => 7,
        };
        let reset_bits: u32 = match self.reset {
            ResetDomain::PwrOk => 0,
            ResetDomain::Deep => 1,
            ResetDomain::PltRst => 2,
            ResetDomain::RsmRst => 3,
        };
        let rx_tx_bits: u32 = (self.rx_disable as u32) << 1 | (self.tx_disable as u32);
        let trigger_bits: u32 = match self.trigger {
            Trigger::Off => 0,
            Trigger::Level => 1,
            Trigger::Edge => 2,
            Trigger::EdgeBoth => 3,
        };

        let mut dw0 = 0u32;
        dw0 |= mode_bits << 10;
        dw0 |= reset_bits << 30;
        dw0 |= rx_tx_bits << 8;
        dw0 |= (self.tx_state as u32) << 1;
        dw0 |= self.rx_state as u32;
        dw0 |= (self.interrupt_route.bits() as u32) << 17;
        dw0 |= trigger_bits << 25;

        let dw1 = (self.termination as u32 & 0xF) << 10;

        PadDescriptor { dw0, dw1 }
    }

    /// Serialize directly to little-endian bytes, as they would appear on disk
    pub fn build_bytes(self) -> [u8; 8] {
        let pad = self.build();
        let mut out = [0u8; 8];
        out[0..4].copy_from_slice(&pad.dw0.to_le_bytes());
        out[4..8].copy_from_slice(&pad.dw1.to_le_bytes());
        out
    }
}

/// Minimal deterministic xorshift32 PRNG used by property tests. Not
/// cryptographic; exists only so large random-input tests stay reproducible
/// without adding a `rand` dependency the rest of this crate has no other use
/// for.
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Seed the generator; seed 0 is remapped since xorshift cannot recover from it.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Generate the next pseudo-random u32
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
