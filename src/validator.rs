//! Pad descriptor semantic validation
//!
//! [`validate`] is a pure function, deterministic and side-effect free. It
//! rejects bit patterns that cannot represent a real pad, as opposed to merely
//! checking that fields fall in their declared ranges (mode and reset domain
//! always decode to *some* enum member once masked; that alone proves nothing
//! about whether the underlying bytes are a real descriptor).

use crate::descriptor::{Mode, PadDescriptor, Trigger};

/// Result of validating a single descriptor. `Ok(())` accepts; the variant
/// otherwise says which rule rejected it, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// DW0 == 0 && DW1 == 0 (empty slot)
    TrivialZero,
    /// DW0 == 0xFFFFFFFF or DW1 == 0xFFFFFFFF (erased flash)
    TrivialErased,
    /// The 4-bit mode field is in the invalid 8-15 range
    InvalidMode,
    /// mode == GPIO and both rx and tx are disabled
    DeadGpio,
    /// mode is a native function but a GPIO latch bit is set
    NativeFunctionLatchSet,
    /// mode is a native function but rx/tx disable is a partial (not all-same) state
    NativeFunctionPartialBuffer,
    /// an interrupt route is selected but trigger is off
    InterruptWithoutTrigger,
    /// mode == GPIO, tx is enabled, and termination is non-disabled
    DrivenLineTerminated,
}

/// Validate a single pad descriptor against all semantic rules.
///
/// Returns `Ok(())` if every rule accepts, `Err(Rejection)` naming the first
/// rule that rejects. Rules are checked in the order listed in the design so
/// that the rejection reason is stable and deterministic.
pub fn validate(pad: &PadDescriptor) -> Result<(), Rejection> {
    if pad.dw0 == 0 && pad.dw1 == 0 {
        return Err(Rejection::TrivialZero);
    }
    if pad.dw0 == 0xFFFF_FFFF || pad.dw1 == 0xFFFF_FFFF {
        return Err(Rejection::TrivialErased);
    }

    let dw0 = pad.dw0_fields();
    let dw1 = pad.dw1_fields();

    let mode = match dw0.mode {
        Some(mode) => mode,
        None => return Err(Rejection::InvalidMode),
    };

    if mode == Mode::Gpio && dw0.rx_tx.rx_disabled() && dw0.rx_tx.tx_disabled() {
        return Err(Rejection::DeadGpio);
    }

    if mode.is_native_function() {
        if dw0.tx_state || dw0.rx_state {
            return Err(Rejection::NativeFunctionLatchSet);
        }
        let both_enabled = !dw0.rx_tx.rx_disabled() && !dw0.rx_tx.tx_disabled();
        let both_disabled = dw0.rx_tx.rx_disabled() && dw0.rx_tx.tx_disabled();
        if !(both_enabled || both_disabled) {
            return Err(Rejection::NativeFunctionPartialBuffer);
        }
    }

    if !dw0.interrupt_route.is_empty() && dw0.trigger == Trigger::Off {
        return Err(Rejection::InterruptWithoutTrigger);
    }

    if mode == Mode::Gpio && !dw0.rx_tx.tx_disabled() && dw1.termination.is_enabled() {
        return Err(Rejection::DrivenLineTerminated);
    }

    Ok(())
}

/// Convenience boolean wrapper around [`validate`] for call sites that only
/// need accept/reject (run extension in the detector).
pub fn is_valid(pad: &PadDescriptor) -> bool {
    validate(pad).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{PadBuilder, XorShift32};

    #[test]
    fn rejects_all_zero() {
        let pad = PadDescriptor { dw0: 0, dw1: 0 };
        assert_eq!(validate(&pad), Err(Rejection::TrivialZero));
    }

    #[test]
    fn rejects_all_ones() {
        let pad = PadDescriptor {
            dw0: 0xFFFF_FFFF,
            dw1: 0x1234,
        };
        assert_eq!(validate(&pad), Err(Rejection::TrivialErased));
    }

    #[test]
    fn accepts_signature_gpio_pad() {
        let pad = PadBuilder::gpio().reset_pltrst().build();
        assert!(is_valid(&pad));
    }

    #[test]
    fn rejects_dead_gpio() {
        let pad = PadBuilder::gpio().rx_tx_both_disabled().build();
        assert_eq!(validate(&pad), Err(Rejection::DeadGpio));
    }

    #[test]
    fn rejects_native_function_with_latch_bits() {
        let pad = PadBuilder::nf1().tx_state(true).build();
        assert_eq!(validate(&pad), Err(Rejection::NativeFunctionLatchSet));
    }

    #[test]
    fn rejects_native_function_partial_buffer() {
        let pad = PadBuilder::nf1().rx_tx_rx_disabled().build();
        assert_eq!(validate(&pad), Err(Rejection::NativeFunctionPartialBuffer));
    }

    #[test]
    fn accepts_native_function_both_disabled() {
        let pad = PadBuilder::nf1().rx_tx_both_disabled().build();
        assert!(is_valid(&pad));
    }

    #[test]
    fn rejects_interrupt_route_without_trigger() {
        let pad = PadBuilder::gpio().interrupt_route_apic().trigger_off().build();
        assert_eq!(validate(&pad), Err(Rejection::InterruptWithoutTrigger));
    }

    #[test]
    fn accepts_trigger_without_route() {
        let pad = PadBuilder::gpio().trigger_level().build();
        assert!(is_valid(&pad));
    }

    #[test]
    fn rejects_driven_line_with_termination() {
        let pad = PadBuilder::gpio().tx_state(true).termination_pull().build();
        assert_eq!(validate(&pad), Err(Rejection::DrivenLineTerminated));
    }

    #[test]
    fn selectivity_on_random_inputs_is_bounded() {
        // P6: on 10_000 uniformly random 8-byte inputs the acceptance rate is <= 35%.
        let mut rng = XorShift32::new(0xC0FF_EE11);
        let mut accepted = 0usize;
        const N: usize = 10_000;
        for _ in 0..N {
            let dw0 = rng.next_u32();
            let dw1 = rng.next_u32();
            let pad = PadDescriptor { dw0, dw1 };
            if is_valid(&pad) {
                accepted += 1;
            }
        }
        let rate = accepted as f64 / N as f64;
        assert!(rate <= 0.35, "acceptance rate {rate} exceeded 35%");
    }
}
