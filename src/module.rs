//! Module enumeration: walks the BIOS region (or an unpacked UEFI volume) and
//! yields candidate byte spans for the table detector to scan.

use crate::profile::PlatformProfile;

/// A candidate byte span pointing into the BIOS Region (or into an unpacked
/// section). Read-only; references the parent buffer by offset and length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpan {
    /// Offset of this span within the BIOS Region
    pub offset: usize,
    /// Length of this span in bytes
    pub length: usize,
    /// Section UI name, if the unpacker (or section directory) provided one
    pub name: Option<String>,
    /// Section GUID, if known
    pub guid: Option<String>,
}

impl ModuleSpan {
    /// A span covering the entire region — always present as a fallback
    fn whole_region(length: usize) -> Self {
        Self {
            offset: 0,
            length,
            name: None,
            guid: None,
        }
    }

    /// Whether this span's name or GUID matches one of the profile's
    /// module-name patterns. Matching is a case-insensitive substring test;
    /// unverified GUIDs are never carried by a profile (see design notes), so
    /// only the name is actually compared today.
    pub fn matches_profile(&self, profile: &PlatformProfile) -> bool {
        let Some(name) = &self.name else {
            return false;
        };
        profile
            .module_name_patterns
            .iter()
            .any(|pattern| name.to_lowercase().contains(&pattern.to_lowercase()))
    }

    /// Slice `region` down to this span's bytes
    pub fn bytes<'a>(&self, region: &'a [u8]) -> &'a [u8] {
        let end = (self.offset + self.length).min(region.len());
        let start = self.offset.min(end);
        &region[start..end]
    }
}

/// A section discovered by an external UEFI-volume unpacker: a name/GUID and
/// the path to its extracted body, or inline bytes if the unpacker already
/// loaded them.
#[derive(Debug, Clone)]
pub struct UnpackedSection {
    /// Section UI name, if present
    pub name: Option<String>,
    /// Section GUID, if present
    pub guid: Option<String>,
    /// Byte offset of this section's body within the BIOS Region
    pub offset: usize,
    /// Length of this section's body in bytes
    pub length: usize,
}

/// Strategy for unpacking a UEFI firmware volume into its constituent
/// sections. The in-process default always degrades to "no sections found";
/// an external-subprocess implementation lives in [`crate::helpers`].
pub trait VolumeUnpacker {
    /// Attempt to unpack `region` into its sections. Returning an empty `Vec`
    /// (rather than an `Err`) is how "unpacker unavailable" is represented:
    /// per §4.B this degrades the enumerator to the whole-region fallback
    /// span, it does not fail the pipeline.
    fn unpack(&self, region: &[u8]) -> crate::error::Result<Vec<UnpackedSection>>;
}

/// Always-available default: no UEFI volume parsing, so no extra sections are
/// ever discovered. Enumeration still yields the whole-region fallback span.
pub struct NoUnpacker;

impl VolumeUnpacker for NoUnpacker {
    fn unpack(&self, _region: &[u8]) -> crate::error::Result<Vec<UnpackedSection>> {
        Ok(Vec::new())
    }
}

/// §4.B — enumerate candidate module spans in `region`.
///
/// The whole-region span is always first. Sections produced by `unpacker`
/// whose name or GUID matches one of `profile`'s patterns are appended after
/// it, preserving unpacker discovery order.
pub fn enumerate_modules(
    region: &[u8],
    profile: &PlatformProfile,
    unpacker: &dyn VolumeUnpacker,
) -> crate::error::Result<Vec<ModuleSpan>> {
    let mut spans = vec![ModuleSpan::whole_region(region.len())];

    let sections = unpacker.unpack(region)?;
    if sections.is_empty() {
        log::warn!("UEFI volume unpacker produced no sections; using whole-region span only");
    }

    for section in sections {
        let span = ModuleSpan {
            offset: section.offset,
            length: section.length,
            name: section.name,
            guid: section.guid,
        };
        if span.matches_profile(profile) {
            log::debug!(
                "module span '{}' at offset {:#x} matches profile pattern",
                span.name.as_deref().unwrap_or(""),
                span.offset
            );
            spans.push(span);
        }
    }

    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ALDERLAKE;

    #[test]
    fn whole_region_span_always_present() {
        let region = vec![0u8; 1024];
        let spans = enumerate_modules(&region, &ALDERLAKE, &NoUnpacker).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].offset, 0);
        assert_eq!(spans[0].length, 1024);
    }

    struct FakeUnpacker(Vec<UnpackedSection>);
    impl VolumeUnpacker for FakeUnpacker {
        fn unpack(&self, _region: &[u8]) -> crate::error::Result<Vec<UnpackedSection>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn matching_section_is_included() {
        let region = vec![0u8; 4096];
        let unpacker = FakeUnpacker(vec![UnpackedSection {
            name: Some("PchGpioInitDxe".to_string()),
            guid: None,
            offset: 128,
            length: 256,
        }]);
        let spans = enumerate_modules(&region, &ALDERLAKE, &unpacker).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].offset, 128);
    }

    #[test]
    fn non_matching_section_is_excluded() {
        let region = vec![0u8; 4096];
        let unpacker = FakeUnpacker(vec![UnpackedSection {
            name: Some("SomeUnrelatedDriver".to_string()),
            guid: None,
            offset: 128,
            length: 256,
        }]);
        let spans = enumerate_modules(&region, &ALDERLAKE, &unpacker).unwrap();
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn bytes_clamp_to_region_length() {
        let region = vec![7u8; 16];
        let span = ModuleSpan {
            offset: 10,
            length: 100,
            name: None,
            guid: None,
        };
        assert_eq!(span.bytes(&region).len(), 6);
    }
}
