//! §4.A Region Extractor — locates the BIOS region inside a flash image by
//! parsing its Intel Flash Descriptor.
//!
//! Modeled directly on the reference flashing toolchain's own IFD parser: the
//! same signature offset, the same FLMAP0/FRBA decoding, and the same
//! base/limit macros (`freg_base`/`freg_limit`). The one addition this
//! domain needs is the platform quirk (§9): newer descriptors cannot be
//! trusted to report their own region count, so the caller must say which
//! platform it is scanning for.

use crate::error::{Error, Result};
use crate::profile::Platform;

/// IFD signature at offset 0x10 ("0xA55A0FF0" read little-endian)
const IFD_SIGNATURE: u32 = 0x0FF0_A55A;

/// Maximum number of IFD regions ever defined
const MAX_IFD_REGIONS: usize = 16;

/// Index of the BIOS region within the descriptor's region table
const BIOS_REGION_INDEX: usize = 1;

/// Extract base address from a Flash Region register (FLREG).
///
/// The base address is stored in bits 14:0, representing address bits 26:12.
#[inline]
fn freg_base(flreg: u32) -> usize {
    ((flreg << 12) & 0x07FF_F000) as usize
}

/// Extract limit address from a Flash Region register (FLREG).
///
/// The limit address is stored in bits 30:16, representing address bits
/// 26:12; the result is ORed with 0xFFF to get the inclusive end address.
#[inline]
fn freg_limit(flreg: u32) -> usize {
    (((flreg >> 4) & 0x07FF_F000) | 0x0000_0FFF) as usize
}

/// A contiguous subrange of the flash image identified by the descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    /// Inclusive start address
    pub start: usize,
    /// Inclusive end address
    pub end: usize,
}

impl RegionBounds {
    /// Length of this region in bytes
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Whether this region is empty (defensive; a valid descriptor never
    /// produces one for the BIOS region)
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Locate the BIOS region's bounds within `image` for the given `platform`.
///
/// The platform argument is load-bearing, not cosmetic: without it there is
/// no way to select the right descriptor-quirk, and the extracted region
/// would have the right *length* but the wrong *content* (§4.A).
pub fn bios_region_bounds(image: &[u8], platform: Platform) -> Result<RegionBounds> {
    log::info!("extracting BIOS region for platform '{}'", platform.tag());

    if image.len() < 0x1000 {
        return Err(Error::NotDescriptorFormatted);
    }

    let sig = u32::from_le_bytes([image[0x10], image[0x11], image[0x12], image[0x13]]);
    if sig != IFD_SIGNATURE {
        return Err(Error::NotDescriptorFormatted);
    }

    let profile = platform.profile();

    let flmap0 = u32::from_le_bytes([image[0x14], image[0x15], image[0x16], image[0x17]]);
    let frba = ((flmap0 >> 12) & 0xFF0) as usize;
    let nr_field = ((flmap0 >> 24) & 0x7) as usize + 1;

    let num_regions = if profile.ifd_scan_all_regions {
        MAX_IFD_REGIONS
    } else {
        nr_field.min(MAX_IFD_REGIONS)
    };

    if frba + BIOS_REGION_INDEX * 4 + 4 > image.len() || BIOS_REGION_INDEX >= num_regions {
        return Err(Error::DescriptorPlatformMismatch);
    }

    let offset = frba + BIOS_REGION_INDEX * 4;
    let freg = u32::from_le_bytes([
        image[offset],
        image[offset + 1],
        image[offset + 2],
        image[offset + 3],
    ]);

    let start = freg_base(freg);
    let end = freg_limit(freg);
    if end < start || end >= image.len() {
        return Err(Error::DescriptorPlatformMismatch);
    }

    log::debug!("BIOS region bounds: {:#x}..={:#x}", start, end);
    Ok(RegionBounds { start, end })
}

/// The extracted BIOS region, owned so the in-process and external-subprocess
/// splitters (§6, [`crate::helpers::RegionSplitter`]) can share one contract
/// regardless of whether the bytes came from slicing the image in memory or
/// from reading a file a helper process wrote.
#[derive(Debug, Clone)]
pub struct BiosRegion {
    /// Raw bytes of the BIOS region
    pub data: Vec<u8>,
}

/// Extract the BIOS region directly from an in-memory flash image, with no
/// subprocess involved. This is the default, always-available extraction
/// path described in §4.A.
pub fn extract_bios_region(image: &[u8], platform: Platform) -> Result<BiosRegion> {
    let bounds = bios_region_bounds(image, platform)?;
    Ok(BiosRegion {
        data: image[bounds.start..=bounds.end].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_image() -> Vec<u8> {
        let mut data = vec![0u8; 1 << 20];
        data[0x10..0x14].copy_from_slice(&IFD_SIGNATURE.to_le_bytes());

        // FRBA = 0x40 (field value 0x04 << 16)
        let flmap0: u32 = (2 << 24) | (0x04 << 16);
        data[0x14..0x18].copy_from_slice(&flmap0.to_le_bytes());

        // Region 0 (descriptor): 0x000000 - 0x000FFF
        data[0x40..0x44].copy_from_slice(&0u32.to_le_bytes());

        // Region 1 (bios): 0x001000 - 0x0FFFFF (base field 0x001, limit field 0xFF)
        let freg1: u32 = (0x0FF << 16) | 0x001;
        data[0x44..0x48].copy_from_slice(&freg1.to_le_bytes());

        data[0x100000 - 1] = 0xAA; // last byte of BIOS region, to check inclusivity
        data
    }

    #[test]
    fn extracts_bios_region_bounds() {
        let image = make_test_image();
        let bounds = bios_region_bounds(&image, Platform::AlderLake).unwrap();
        assert_eq!(bounds.start, 0x001000);
        assert_eq!(bounds.end, 0x0FFFFF);
    }

    #[test]
    fn extracted_region_matches_bounds() {
        let image = make_test_image();
        let region = extract_bios_region(&image, Platform::AlderLake).unwrap();
        assert_eq!(region.data.len(), 0x0FFFFF - 0x001000 + 1);
        assert_eq!(*region.data.last().unwrap(), 0xAA);
    }

    #[test]
    fn rejects_missing_signature() {
        let image = vec![0u8; 1 << 16];
        assert!(matches!(
            bios_region_bounds(&image, Platform::AlderLake),
            Err(Error::NotDescriptorFormatted)
        ));
    }

    #[test]
    fn rejects_image_too_small() {
        let image = vec![0u8; 16];
        assert!(matches!(
            bios_region_bounds(&image, Platform::AlderLake),
            Err(Error::NotDescriptorFormatted)
        ));
    }
}
