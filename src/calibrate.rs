//! §4.E Calibrator — turns detected candidates into the final, classified,
//! named, and (optionally) reference-scored output.
//!
//! Classification, naming, and reference scoring are each pure functions over
//! already-validated data; the only state this module owns is the tie-break
//! policy used to pick one winner per table class when more than one
//! candidate lands in the same band.

use crate::descriptor::{Direction, Mode, PadDescriptor, ResetDomain};
use crate::detector::PadTable;
use crate::profile::{Platform, PlatformProfile, TableClass};
use crate::reference::ReferenceHeader;

/// One named, decoded pad within a classified table
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PadRecord {
    /// Positional name assigned from the platform's pad-group layout
    pub name: String,
    /// Byte offset of this pad's descriptor within the scanned span
    pub offset: usize,
    /// Raw first configuration word
    pub dw0: u32,
    /// Raw second configuration word
    pub dw1: u32,
    /// Decoded pad mode
    pub mode: Mode,
    /// Decoded reset domain
    pub reset: ResetDomain,
    /// Decoded direction, for GPIO-mode pads
    pub direction: Option<Direction>,
    /// Whether this pad's (mode, reset, direction) matched the reference
    /// header's expectation for the same name. `None` if no reference header
    /// was supplied, or the reference carries no entry for this name.
    pub matches_reference: Option<bool>,
}

/// One classified, scored table, with every pad decoded and named
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableResult {
    /// Table classification
    pub class: TableClass,
    /// Byte offset of the table's first descriptor within the scanned span
    pub offset: usize,
    /// Descriptor size in bytes
    pub entry_size: usize,
    /// Number of descriptors
    pub entry_count: usize,
    /// Decoded, named pads in positional order
    pub pads: Vec<PadRecord>,
    /// Count of pads whose configuration matched the reference header, if one
    /// was supplied
    pub reference_score: Option<usize>,
}

/// Final pipeline output: one winning table per class, plus the platform it
/// was produced for
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineOutput {
    /// Platform this output was calibrated for
    pub platform: Platform,
    /// One winning table per class that produced any surviving candidate
    pub tables: Vec<TableResult>,
}

/// Classify a detected candidate into its [`TableClass`].
///
/// A signature-scan anchor is classified PHYSICAL unconditionally — its
/// origin is dispositive (§4.C.1) — regardless of what count-band its entry
/// count would otherwise fall into. Every other candidate is classified
/// purely by entry count.
pub fn classify(table: &PadTable, profile: &PlatformProfile) -> Option<TableClass> {
    if table.from_signature {
        Some(TableClass::Physical)
    } else {
        profile.classify_by_count(table.entry_count)
    }
}

/// Decode and positionally name every pad in `table`, scoring each against
/// `reference` if one is supplied.
pub fn build_pad_records(
    table: &PadTable,
    data: &[u8],
    class: TableClass,
    profile: &PlatformProfile,
    reference: Option<&ReferenceHeader>,
) -> Vec<PadRecord> {
    let mut pads = Vec::with_capacity(table.entry_count);
    for index in 0..table.entry_count {
        let Some(descriptor) = table.descriptor_at(data, index) else {
            break;
        };
        pads.push(build_pad_record(table, descriptor, index, class, profile, reference));
    }
    pads
}

fn build_pad_record(
    table: &PadTable,
    descriptor: PadDescriptor,
    index: usize,
    class: TableClass,
    profile: &PlatformProfile,
    reference: Option<&ReferenceHeader>,
) -> PadRecord {
    let name = profile.pad_name(class, index);
    let dw0 = descriptor.dw0_fields();
    let dw1 = descriptor.dw1_fields();
    let mode = dw0.mode.unwrap_or(Mode::Gpio);
    let direction = (mode == Mode::Gpio).then(|| Direction::from_rx_tx(dw0.rx_tx));

    let matches_reference = reference.and_then(|reference| {
        reference.get(&name).map(|expected| {
            expected.mode == mode && expected.reset == dw0.reset && expected.direction == direction
        })
    });

    PadRecord {
        name,
        offset: table.offset + index * table.entry_size,
        dw0: descriptor.dw0,
        dw1: descriptor.dw1,
        mode,
        reset: dw0.reset,
        direction,
        matches_reference,
    }
}

/// Score `pads` against the reference header: the count of pads whose
/// `matches_reference` is `Some(true)`. `None` if no reference header was
/// ever consulted (every pad's `matches_reference` is `None`).
fn reference_score(pads: &[PadRecord]) -> Option<usize> {
    if pads.iter().all(|pad| pad.matches_reference.is_none()) {
        return None;
    }
    Some(pads.iter().filter(|pad| pad.matches_reference == Some(true)).count())
}

/// Pick the single winning candidate among `candidates`, all already known to
/// share one [`TableClass`].
///
/// Tie-break order (§4.E): highest reference score first (candidates with no
/// reference score sort last), then larger entry count, then smaller offset.
fn pick_winner(candidates: Vec<TableResult>) -> Option<TableResult> {
    candidates.into_iter().max_by(|a, b| {
        let score_a = a.reference_score.unwrap_or(0);
        let score_b = b.reference_score.unwrap_or(0);
        score_a
            .cmp(&score_b)
            .then(a.entry_count.cmp(&b.entry_count))
            .then(b.offset.cmp(&a.offset))
    })
}

/// §4.E — classify, name, score, and select a winner per class from a set of
/// detected candidates over `data`.
pub fn calibrate(
    candidates: &[PadTable],
    data: &[u8],
    platform: Platform,
    reference: Option<&ReferenceHeader>,
) -> PipelineOutput {
    let profile = platform.profile();
    let mut by_class: Vec<(TableClass, TableResult)> = Vec::new();

    for table in candidates {
        let Some(class) = classify(table, profile) else {
            log::debug!(
                "candidate at offset {:#x} (entry_size {}, count {}) classified as none; dropped",
                table.offset,
                table.entry_size,
                table.entry_count
            );
            continue;
        };
        let pads = build_pad_records(table, data, class, profile, reference);
        let score = reference_score(&pads);
        by_class.push((
            class,
            TableResult {
                class,
                offset: table.offset,
                entry_size: table.entry_size,
                entry_count: table.entry_count,
                pads,
                reference_score: score,
            },
        ));
    }

    let mut tables = Vec::new();
    for class in [
        TableClass::Physical,
        TableClass::Vgpio,
        TableClass::VgpioUsb,
        TableClass::VgpioPcie,
    ] {
        let group: Vec<TableResult> = by_class
            .iter()
            .filter(|(c, _)| *c == class)
            .map(|(_, result)| result.clone())
            .collect();
        if let Some(winner) = pick_winner(group) {
            log::info!(
                "selected {} table at offset {:#x} ({} entries)",
                class.label(),
                winner.offset,
                winner.entry_count
            );
            tables.push(winner);
        }
    }

    PipelineOutput { platform, tables }
}
