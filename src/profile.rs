//! Platform profiles
//!
//! A [`PlatformProfile`] is plain data: entry sizes, the physical-table signature,
//! VGPIO size bands, pad-group layouts, and module-name patterns. Adding a new
//! platform (Raptor Lake, Meteor Lake, ...) means adding a new `PlatformProfile`
//! value, not touching the detector, validator, or calibrator.

use crate::descriptor::{Mode, ResetDomain};
use crate::error::{Error, Result};

/// One (mode, reset) constraint at a fixed position in the physical-table signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureEntry {
    /// Expected pad mode at this position
    pub mode: Mode,
    /// Expected reset domain at this position
    pub reset: ResetDomain,
}

impl SignatureEntry {
    const fn new(mode: Mode, reset: ResetDomain) -> Self {
        Self { mode, reset }
    }
}

/// An inclusive entry-count range used to classify a candidate table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountBand {
    /// Lower bound, inclusive
    pub min: usize,
    /// Upper bound, inclusive
    pub max: usize,
}

impl CountBand {
    const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Whether `count` falls within this band
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && count <= self.max
    }
}

/// A named group of physically adjacent pads, e.g. `GPP_A` with 25 pads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadGroup {
    /// Group name as it appears in the platform's pin diagram (`"GPP_A"`)
    pub name: &'static str,
    /// Number of pads in this group
    pub size: usize,
}

impl PadGroup {
    const fn new(name: &'static str, size: usize) -> Self {
        Self { name, size }
    }
}

/// Platform tag selecting a [`PlatformProfile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Platform {
    /// Intel Alder Lake PCH
    AlderLake,
}

impl Platform {
    /// Parse a CLI-style platform tag (e.g. `"alderlake"`)
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "alderlake" | "adl" => Ok(Platform::AlderLake),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Tag this platform is selected by, as surfaced in logs
    pub fn tag(&self) -> &'static str {
        match self {
            Platform::AlderLake => "alderlake",
        }
    }

    /// Resolve this platform to its profile data
    pub fn profile(&self) -> &'static PlatformProfile {
        match self {
            Platform::AlderLake => &ALDERLAKE,
        }
    }
}

/// Table classification derived from validated entry count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TableClass {
    /// The canonical physical GPIO pad table
    Physical,
    /// Generic virtual-GPIO table
    Vgpio,
    /// Virtual GPIO table describing USB sideband signaling
    VgpioUsb,
    /// Virtual GPIO table describing PCIe sideband signaling
    VgpioPcie,
}

impl TableClass {
    /// Human-readable name, also used as the pad-group prefix for naming
    pub fn label(&self) -> &'static str {
        match self {
            TableClass::Physical => "PHYSICAL",
            TableClass::Vgpio => "VGPIO",
            TableClass::VgpioUsb => "VGPIO_USB",
            TableClass::VgpioPcie => "VGPIO_PCIE",
        }
    }
}

/// Platform-specific data consumed by the enumerator, detector, and calibrator
#[derive(Debug, Clone, Copy)]
pub struct PlatformProfile {
    /// Platform this profile describes
    pub platform: Platform,
    /// Intel Flash Descriptor quirk: on 600-series-and-later descriptors the
    /// region-count (NR) field in FLMAP0 is not reliable, so the extractor
    /// must scan all `MAX_IFD_REGIONS` slots and rely on limit<base to detect
    /// unused ones, rather than trusting NR. Without selecting the right
    /// quirk for the platform, the BIOS region boundary can be computed from
    /// the wrong region-table slot: same length, wrong content.
    pub ifd_scan_all_regions: bool,
    /// Entry size in bytes used by the physical pad table
    pub physical_entry_size: usize,
    /// Entry sizes (bytes) tried by the VGPIO scanner, smallest candidates first
    pub vgpio_entry_sizes: &'static [usize],
    /// Ordered (mode, reset) constraints the physical table's first pads must match
    pub signature: &'static [SignatureEntry],
    /// Hard cap on how far a signature anchor may be extended
    pub physical_size_cap: usize,
    /// Ceiling on how long a single VGPIO run may grow before being discarded
    pub vgpio_run_ceiling: usize,
    /// Entry-count band that classifies a candidate as PHYSICAL
    pub physical_band: CountBand,
    /// Entry-count band that classifies a candidate as VGPIO_USB
    pub vgpio_usb_band: CountBand,
    /// Entry-count band that classifies a candidate as VGPIO
    pub vgpio_band: CountBand,
    /// Entry-count band that classifies a candidate as VGPIO_PCIE
    pub vgpio_pcie_band: CountBand,
    /// Ordered physical pad groups, used for positional pad naming
    pub physical_groups: &'static [PadGroup],
    /// Pad-naming group for the VGPIO class (single flat group, sized to the band's upper bound)
    pub vgpio_group: PadGroup,
    /// Pad-naming group for the VGPIO_USB class
    pub vgpio_usb_group: PadGroup,
    /// Pad-naming group for the VGPIO_PCIE class
    pub vgpio_pcie_group: PadGroup,
    /// Text substrings matched (case-insensitively) against UEFI section names.
    /// Verified against public documentation; unverified GUIDs are intentionally
    /// absent (see Open Questions in the design notes) since they would only add noise.
    pub module_name_patterns: &'static [&'static str],
}

impl PlatformProfile {
    /// Classify a validated candidate by its entry count.
    ///
    /// The signature anchor is classified PHYSICAL unconditionally by the caller
    /// (its origin is dispositive); this method only implements the count-band
    /// lookup used for every other candidate.
    pub fn classify_by_count(&self, count: usize) -> Option<TableClass> {
        if self.physical_band.contains(count) {
            Some(TableClass::Physical)
        } else if self.vgpio_usb_band.contains(count) {
            Some(TableClass::VgpioUsb)
        } else if self.vgpio_band.contains(count) {
            Some(TableClass::Vgpio)
        } else if self.vgpio_pcie_band.contains(count) {
            Some(TableClass::VgpioPcie)
        } else {
            None
        }
    }

    /// Positional pad name for the `index`-th descriptor (0-based) of a table
    /// classified as `class`.
    pub fn pad_name(&self, class: TableClass, index: usize) -> String {
        match class {
            TableClass::Physical => name_in_groups(self.physical_groups, index),
            TableClass::Vgpio => format!("{}_{}", self.vgpio_group.name, index),
            TableClass::VgpioUsb => format!("{}_{}", self.vgpio_usb_group.name, index),
            TableClass::VgpioPcie => format!("{}_{}", self.vgpio_pcie_group.name, index),
        }
    }
}

/// Walk an ordered list of pad groups and name the `index`-th pad positionally.
///
/// Falls back to `"PAD{index}"` if `index` runs past the declared groups —
/// this can only happen if a table's validated entry count exceeds the sum of
/// the profile's physical group sizes, which indicates a profile/detector
/// mismatch rather than a real pad.
fn name_in_groups(groups: &[PadGroup], index: usize) -> String {
    let mut remaining = index;
    for group in groups {
        if remaining < group.size {
            return format!("{}{}", group.name, remaining);
        }
        remaining -= group.size;
    }
    format!("PAD{}", index)
}

/// Total number of pads implied by `groups`
pub fn group_total(groups: &[PadGroup]) -> usize {
    groups.iter().map(|g| g.size).sum()
}

const SIG_ALDERLAKE: [SignatureEntry; 5] = [
    SignatureEntry::new(Mode::Gpio, ResetDomain::PltRst),
    SignatureEntry::new(Mode::Nf1, ResetDomain::PltRst),
    SignatureEntry::new(Mode::Nf1, ResetDomain::PltRst),
    SignatureEntry::new(Mode::Nf1, ResetDomain::PltRst),
    SignatureEntry::new(Mode::Nf1, ResetDomain::PltRst),
];

const PHYSICAL_GROUPS_ALDERLAKE: [PadGroup; 15] = [
    PadGroup::new("GPP_I", 11),
    PadGroup::new("GPP_R", 8),
    PadGroup::new("GPP_J", 12),
    PadGroup::new("GPP_B", 26),
    PadGroup::new("GPP_G", 8),
    PadGroup::new("GPP_H", 24),
    PadGroup::new("GPD", 12),
    PadGroup::new("GPP_A", 25),
    PadGroup::new("GPP_C", 24),
    PadGroup::new("GPP_S", 8),
    PadGroup::new("GPP_E", 13),
    PadGroup::new("GPP_F", 24),
    PadGroup::new("GPP_D", 21),
    PadGroup::new("GPP_T", 16),
    PadGroup::new("GPP_M", 20),
];

/// Module-name substrings considered indicative of GPIO pad-configuration
/// code in an Alder Lake BIOS region. These are plain text substrings only;
/// no GUIDs are carried for this platform since none have been independently
/// verified against public documentation (see design notes Open Questions).
const MODULE_PATTERNS_ALDERLAKE: [&str; 3] = ["GpioInit", "PchGpioInit", "GpioPreMem"];

/// The Alder Lake PCH platform profile
pub static ALDERLAKE: PlatformProfile = PlatformProfile {
    platform: Platform::AlderLake,
    ifd_scan_all_regions: true,
    physical_entry_size: 8,
    vgpio_entry_sizes: &[12, 16],
    signature: &SIG_ALDERLAKE,
    physical_size_cap: 350,
    vgpio_run_ceiling: 100,
    physical_band: CountBand::new(250, 260),
    vgpio_usb_band: CountBand::new(10, 15),
    vgpio_band: CountBand::new(35, 40),
    vgpio_pcie_band: CountBand::new(75, 85),
    physical_groups: &PHYSICAL_GROUPS_ALDERLAKE,
    vgpio_group: PadGroup::new("VGPIO", 40),
    vgpio_usb_group: PadGroup::new("VGPIO_USB", 15),
    vgpio_pcie_group: PadGroup::new("VGPIO_PCIE", 85),
    module_name_patterns: &MODULE_PATTERNS_ALDERLAKE,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_from_tag() {
        assert_eq!(Platform::from_tag("alderlake").unwrap(), Platform::AlderLake);
        assert_eq!(Platform::from_tag("ADL").unwrap(), Platform::AlderLake);
        assert!(Platform::from_tag("raptorlake").is_err());
    }

    #[test]
    fn physical_group_total_is_in_band() {
        let total = group_total(ALDERLAKE.physical_groups);
        assert!(ALDERLAKE.physical_band.contains(total));
    }

    #[test]
    fn classify_by_count_bands() {
        assert_eq!(ALDERLAKE.classify_by_count(253), Some(TableClass::Physical));
        assert_eq!(ALDERLAKE.classify_by_count(12), Some(TableClass::VgpioUsb));
        assert_eq!(ALDERLAKE.classify_by_count(38), Some(TableClass::Vgpio));
        assert_eq!(ALDERLAKE.classify_by_count(80), Some(TableClass::VgpioPcie));
        assert_eq!(ALDERLAKE.classify_by_count(200), None);
    }

    #[test]
    fn p4_count_bands_do_not_overlap() {
        // Every count maps to at most one class; the band lookup order in
        // classify_by_count must not matter for a well-formed profile.
        for count in 0..400 {
            let hits = [
                ALDERLAKE.physical_band.contains(count),
                ALDERLAKE.vgpio_usb_band.contains(count),
                ALDERLAKE.vgpio_band.contains(count),
                ALDERLAKE.vgpio_pcie_band.contains(count),
            ]
            .iter()
            .filter(|hit| **hit)
            .count();
            assert!(hits <= 1, "count {count} matched more than one band");
        }
    }

    #[test]
    fn pad_name_is_positional() {
        // First group GPP_I has 11 pads (indices 0..10), then GPP_R starts at 11.
        assert_eq!(ALDERLAKE.pad_name(TableClass::Physical, 0), "GPP_I0");
        assert_eq!(ALDERLAKE.pad_name(TableClass::Physical, 10), "GPP_I10");
        assert_eq!(ALDERLAKE.pad_name(TableClass::Physical, 11), "GPP_R0");
        assert_eq!(ALDERLAKE.pad_name(TableClass::VgpioUsb, 0), "VGPIO_USB_0");
    }
}
