//! External helper collaborators (§6): the descriptor splitter and the UEFI
//! volume unpacker. Both are optional subprocess tools; this module wraps
//! them behind the same traits the in-process default paths implement, so a
//! caller can swap in the external tool without touching the pipeline.
//!
//! Per §9 ("External-process discipline") the splitter's `-p` platform flag
//! is part of its contract, not an optional optimization: omitting it yields
//! region files that are the right length but the wrong content. This is
//! enforced here at the type level — [`ExternalRegionSplitter::new`] takes a
//! [`Platform`] and there is no way to construct one without it.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};
use crate::module::{UnpackedSection, VolumeUnpacker};
use crate::profile::Platform;
use crate::region::{extract_bios_region, BiosRegion};

/// Strategy for splitting a flash image into its descriptor/ME/BIOS regions.
pub trait RegionSplitter {
    /// Produce the BIOS region for `image`.
    fn split(&self, image: &[u8], platform: Platform) -> Result<BiosRegion>;
}

/// Default, always-available splitter: parses the Intel Flash Descriptor
/// in-process (§4.A). Requires no subprocess, no working directory, and no
/// helper binary on `PATH`.
pub struct InProcessSplitter;

impl RegionSplitter for InProcessSplitter {
    fn split(&self, image: &[u8], platform: Platform) -> Result<BiosRegion> {
        extract_bios_region(image, platform)
    }
}

/// Splitter that shells out to an external descriptor-splitting utility
/// (the `ifdtool`-family contract from §6), for callers who specifically want
/// byte-identical output to that utility. Runs inside an invocation-scoped
/// temporary directory that is removed on every exit path, including errors.
pub struct ExternalRegionSplitter {
    binary: PathBuf,
    platform: Platform,
}

impl ExternalRegionSplitter {
    /// Construct a splitter bound to `platform`. There is no constructor that
    /// omits the platform: per §9 the `-p` flag is mandatory, so the type
    /// cannot be built without one.
    pub fn new(binary: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            binary: binary.into(),
            platform,
        }
    }

    fn platform_flag(&self) -> &'static str {
        match self.platform {
            Platform::AlderLake => "adl",
        }
    }
}

impl RegionSplitter for ExternalRegionSplitter {
    fn split(&self, image: &[u8], _platform: Platform) -> Result<BiosRegion> {
        let workdir = tempfile::tempdir()?;
        let image_path = workdir.path().join("image.bin");
        std::fs::write(&image_path, image)?;

        log::info!(
            "invoking descriptor splitter '{}' with platform flag '-p {}'",
            self.binary.display(),
            self.platform_flag()
        );

        let status = Command::new(&self.binary)
            .arg("-x")
            .arg("-p")
            .arg(self.platform_flag())
            .arg(&image_path)
            .current_dir(workdir.path())
            .status()
            .map_err(|_| Error::HelperUnavailable {
                name: self.binary.display().to_string(),
            })?;

        if !status.success() {
            return Err(Error::HelperFailed {
                name: self.binary.display().to_string(),
                exit_code: status.code().unwrap_or(-1),
            });
        }

        let bios_path = workdir.path().join("flashregion_1_bios.bin");
        let mut data = Vec::new();
        std::fs::File::open(&bios_path)?.read_to_end(&mut data)?;
        Ok(BiosRegion { data })
    }
}

/// Unpacker that shells out to an external UEFI-volume extraction utility.
/// Its absence (binary not found) is non-fatal per §4.B: callers should catch
/// [`Error::HelperUnavailable`] and fall back to [`crate::module::NoUnpacker`]
/// rather than failing the whole run.
pub struct ExternalVolumeUnpacker {
    binary: PathBuf,
}

impl ExternalVolumeUnpacker {
    /// Construct an unpacker that invokes `binary`
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn collect_sections(dir: &Path, base_offset: usize) -> Vec<UnpackedSection> {
        // A real unpacker directory tree carries offset/GUID metadata in a
        // sidecar report; scanning extracted file sizes is enough to model
        // the section-span contract this crate actually consumes.
        let mut sections = Vec::new();
        let Ok(entries) = std::fs::read_dir(dir) else {
            return sections;
        };
        let mut offset = base_offset;
        for entry in entries.flatten() {
            let Ok(meta) = entry.metadata() else { continue };
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let length = meta.len() as usize;
            sections.push(UnpackedSection {
                name: Some(name),
                guid: None,
                offset,
                length,
            });
            offset += length;
        }
        sections
    }
}

impl VolumeUnpacker for ExternalVolumeUnpacker {
    fn unpack(&self, region: &[u8]) -> Result<Vec<UnpackedSection>> {
        let workdir = tempfile::tempdir()?;
        let region_path = workdir.path().join("bios.bin");
        std::fs::write(&region_path, region)?;

        let status = Command::new(&self.binary)
            .arg(&region_path)
            .current_dir(workdir.path())
            .status();

        let status = match status {
            Ok(status) => status,
            Err(_) => {
                log::warn!(
                    "UEFI volume unpacker '{}' is not available; degrading to whole-region span",
                    self.binary.display()
                );
                return Ok(Vec::new());
            }
        };

        if !status.success() {
            return Err(Error::HelperFailed {
                name: self.binary.display().to_string(),
                exit_code: status.code().unwrap_or(-1),
            });
        }

        Ok(Self::collect_sections(workdir.path(), 0))
    }
}
