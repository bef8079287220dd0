//! Table detection: exact-signature scan for the physical pad table, and a
//! targeted brute-offset scan for VGPIO tables.
//!
//! Both strategies only ever *discover* candidate (offset, entry_size,
//! entry_count) triples; classification, naming, and scoring happen later in
//! [`crate::calibrate`].

use std::collections::HashSet;

use crate::descriptor::PadDescriptor;
use crate::profile::PlatformProfile;
use crate::validator::is_valid;

/// A candidate pad table discovered by one of the two detection strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadTable {
    /// Byte offset of the first descriptor, relative to the scanned span
    pub offset: usize,
    /// Size in bytes of each descriptor in this table
    pub entry_size: usize,
    /// Number of descriptors in this table
    pub entry_count: usize,
    /// Whether this candidate originated from the signature scan (§4.C.1).
    /// A signature-scan anchor is classified PHYSICAL unconditionally,
    /// regardless of its entry count, since its origin is dispositive.
    pub from_signature: bool,
}

impl PadTable {
    /// Read the `index`-th descriptor of this table out of `data`, which must
    /// be the same byte span the table was detected in.
    pub fn descriptor_at(&self, data: &[u8], index: usize) -> Option<PadDescriptor> {
        if index >= self.entry_count {
            return None;
        }
        let start = self.offset + index * self.entry_size;
        data.get(start..start + self.entry_size)
            .and_then(PadDescriptor::read)
    }
}

/// Run both detection strategies over `data` and return the deduplicated
/// union of candidates. `data` is typically a [`crate::module::ModuleSpan`]'s
/// bytes, scanned independently for each span the enumerator yields.
pub fn detect(data: &[u8], profile: &PlatformProfile) -> Vec<PadTable> {
    let mut candidates = scan_signature(data, profile);
    candidates.extend(scan_vgpio(data, profile));
    dedup(candidates)
}

/// §4.C.1 — exact-signature scan for the physical pad table.
pub fn scan_signature(data: &[u8], profile: &PlatformProfile) -> Vec<PadTable> {
    let entry_size = profile.physical_entry_size;
    let sig = profile.signature;
    if sig.is_empty() || entry_size == 0 || data.len() < sig.len() * entry_size {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    let max_offset = data.len() - sig.len() * entry_size;
    let mut offset = 0usize;
    // Step by entry_size: a real table begins at an entry_size-aligned offset,
    // and smaller strides cost O(entry_size/step) more iterations for no gain (P8).
    while offset <= max_offset {
        if signature_matches(data, offset, entry_size, profile.signature) {
            let entry_count = extend_run(data, offset, entry_size, sig.len(), profile.physical_size_cap);
            candidates.push(PadTable {
                offset,
                entry_size,
                entry_count,
                from_signature: true,
            });
            log::debug!(
                "signature anchor at offset {offset:#x}, extended to {entry_count} entries"
            );
        }
        offset += entry_size;
    }
    candidates
}

fn signature_matches(
    data: &[u8],
    offset: usize,
    entry_size: usize,
    signature: &[crate::profile::SignatureEntry],
) -> bool {
    for (i, expected) in signature.iter().enumerate() {
        let start = offset + i * entry_size;
        let Some(bytes) = data.get(start..start + entry_size) else {
            return false;
        };
        let Some(pad) = PadDescriptor::read(bytes) else {
            return false;
        };
        let fields = pad.dw0_fields();
        if fields.mode != Some(expected.mode) || fields.reset != expected.reset {
            return false;
        }
    }
    true
}

/// Extend a run forward from `start_count` descriptors as long as the
/// validator accepts each new descriptor, stopping at the first rejection or
/// at `cap`.
fn extend_run(data: &[u8], offset: usize, entry_size: usize, start_count: usize, cap: usize) -> usize {
    let mut count = start_count;
    while count < cap {
        let start = offset + count * entry_size;
        let Some(bytes) = data.get(start..start + entry_size) else {
            break;
        };
        match PadDescriptor::read(bytes) {
            Some(pad) if is_valid(&pad) => count += 1,
            _ => break,
        }
    }
    count
}

/// §4.C.2 — targeted brute-offset scan for VGPIO tables.
pub fn scan_vgpio(data: &[u8], profile: &PlatformProfile) -> Vec<PadTable> {
    let mut candidates = Vec::new();
    for &entry_size in profile.vgpio_entry_sizes {
        candidates.extend(scan_vgpio_for_entry_size(data, entry_size, profile));
    }
    candidates
}

fn scan_vgpio_for_entry_size(data: &[u8], entry_size: usize, profile: &PlatformProfile) -> Vec<PadTable> {
    if entry_size == 0 {
        return Vec::new();
    }
    let mut candidates = Vec::new();
    let mut offset = 0usize;
    while offset + entry_size <= data.len() {
        let count = extend_run(data, offset, entry_size, 0, profile.vgpio_run_ceiling);
        let hit_ceiling = count >= profile.vgpio_run_ceiling;
        let in_band = !hit_ceiling && in_any_vgpio_band(profile, count);
        if in_band {
            candidates.push(PadTable {
                offset,
                entry_size,
                entry_count: count,
                from_signature: false,
            });
            offset += count * entry_size;
        } else {
            // Runs outside the known bands, and runs that stretch to the
            // ceiling, are the dominant false-positive source; discard and
            // resume the brute scan a few bytes later rather than at the
            // entry boundary. Per §4.C.2 this 4-byte resume is not aligned to
            // entry_size, so an accepted VGPIO run may start at an offset
            // that is not a multiple of entry_size; P1 (§8) is stated for the
            // entry_size-aligned signature scan and is not claimed here.
            offset += 4;
        }
    }
    candidates
}

fn in_any_vgpio_band(profile: &PlatformProfile, count: usize) -> bool {
    profile.vgpio_usb_band.contains(count)
        || profile.vgpio_band.contains(count)
        || profile.vgpio_pcie_band.contains(count)
}

/// §4.C.3 — drop duplicate (offset, entry_size) candidates, keeping the
/// signature-scan origin flag if any duplicate carried it.
fn dedup(candidates: Vec<PadTable>) -> Vec<PadTable> {
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut out: Vec<PadTable> = Vec::new();
    for candidate in candidates {
        let key = (candidate.offset, candidate.entry_size);
        if seen.insert(key) {
            out.push(candidate);
        } else if candidate.from_signature {
            if let Some(existing) = out.iter_mut().find(|c| (c.offset, c.entry_size) == key) {
                existing.from_signature = true;
            }
        }
    }
    out
}
