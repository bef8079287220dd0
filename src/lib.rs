//! Detects and validates Intel PCH GPIO pad configuration tables inside UEFI
//! firmware images, and produces coreboot-compatible structured output.
//!
//! The pipeline runs five stages in strict order (§5):
//!
//! 1. [`region`] — locate the BIOS region via the Intel Flash Descriptor (§4.A)
//! 2. [`module`] — enumerate candidate module spans within it (§4.B)
//! 3. [`detector`] — find candidate pad tables in each span (§4.C)
//! 4. [`validator`] — reject descriptors that cannot be real pads (§4.D)
//! 5. [`calibrate`] — classify, name, score, and select winners (§4.E)
//!
//! [`run`] drives all five stages end to end. Callers who already have a BIOS
//! region in hand, or who want to swap in an external helper for region
//! splitting or volume unpacking, can call the stage modules directly instead.

pub mod calibrate;
pub mod descriptor;
pub mod detector;
pub mod error;
pub mod helpers;
pub mod module;
pub mod profile;
pub mod reference;
pub mod region;
pub mod validator;

#[cfg(test)]
mod testutil;

pub use calibrate::{PadRecord, PipelineOutput, TableResult};
pub use error::{Error, Result};
pub use profile::Platform;
pub use reference::ReferenceHeader;

use helpers::{InProcessSplitter, RegionSplitter};
use module::{enumerate_modules, NoUnpacker, VolumeUnpacker};

/// Run the full pipeline over a raw flash image using the in-process region
/// splitter and no UEFI volume unpacker (the whole-region fallback span only).
///
/// This is the entry point most callers want. For the external-subprocess
/// splitter/unpacker pair, or a pre-extracted BIOS region, use
/// [`run_with_collaborators`] instead.
pub fn run(image: &[u8], platform: Platform, reference: Option<&ReferenceHeader>) -> Result<PipelineOutput> {
    run_with_collaborators(image, platform, reference, &InProcessSplitter, &NoUnpacker)
}

/// Run the full pipeline with caller-supplied collaborators for region
/// splitting and UEFI volume unpacking.
///
/// Per §4.B, an unpacker that cannot run (for example, the external helper
/// binary is missing) degrades to the whole-region fallback span; it does not
/// fail the pipeline. Per §4.E, a run that selects no `Physical`-class winner
/// still yields its partial result: it returns
/// `Err(Error::NoPhysicalTableFound { partial })` with `partial` carrying
/// whatever VGPIO/VGPIO_USB/VGPIO_PCIE winners the calibrator did select,
/// rather than discarding them. Other stage failures (a malformed descriptor,
/// an external helper reporting a real failure) surface as ordinary `Err`
/// variants with no partial output attached.
pub fn run_with_collaborators(
    image: &[u8],
    platform: Platform,
    reference: Option<&ReferenceHeader>,
    splitter: &dyn RegionSplitter,
    unpacker: &dyn VolumeUnpacker,
) -> Result<PipelineOutput> {
    let profile = platform.profile();

    let region = splitter.split(image, platform)?;
    log::info!("BIOS region extracted: {} bytes", region.data.len());

    let spans = enumerate_modules(&region.data, profile, unpacker)?;
    log::info!("enumerated {} candidate module span(s)", spans.len());

    let mut candidates = Vec::new();
    for span in &spans {
        let bytes = span.bytes(&region.data);
        let found = detector::detect(bytes, profile);
        log::debug!(
            "span at offset {:#x} (len {}) yielded {} candidate(s)",
            span.offset,
            span.length,
            found.len()
        );
        for table in found {
            // Candidate offsets are scanned within the span's own byte slice;
            // rebase them to the BIOS region so downstream offsets are
            // meaningful regardless of which span they were found in.
            candidates.push(detector::PadTable {
                offset: table.offset + span.offset,
                ..table
            });
        }
    }

    let output = calibrate::calibrate(&candidates, &region.data, platform, reference);

    if !output.tables.iter().any(|t| t.class == profile::TableClass::Physical) {
        log::warn!("no physical pad table survived detection and validation");
        return Err(Error::NoPhysicalTableFound {
            partial: Box::new(output),
        });
    }

    Ok(output)
}
