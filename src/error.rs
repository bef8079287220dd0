//! Crate-wide error type
//!
//! Every fallible public entry point in this crate returns [`Result`]. Submodules
//! with their own narrower error types (the reference-header parser, the external
//! helper invoker) convert into this type via `#[from]`.

use thiserror::Error;

use crate::calibrate::PipelineOutput;

/// Errors produced while extracting, detecting, validating, or calibrating pad tables
#[derive(Debug, Error)]
pub enum Error {
    /// The flash image does not contain a recognizable Intel Flash Descriptor
    #[error("image does not start with an Intel Flash Descriptor signature")]
    NotDescriptorFormatted,

    /// The descriptor does not identify itself as the expected platform family
    #[error("flash descriptor does not identify as the requested platform")]
    DescriptorPlatformMismatch,

    /// The platform tag does not match any compiled-in `PlatformProfile`
    #[error("unsupported platform tag: {0}")]
    UnsupportedPlatform(String),

    /// A required external helper binary could not be located
    #[error("external helper '{name}' is not available")]
    HelperUnavailable {
        /// Name of the missing helper (e.g. "ifdtool", "UEFIExtract")
        name: String,
    },

    /// An external helper ran but returned a nonzero exit status
    #[error("external helper '{name}' failed with exit code {exit_code}")]
    HelperFailed {
        /// Name of the helper that failed
        name: String,
        /// Process exit code, or -1 if terminated by signal
        exit_code: i32,
    },

    /// The detection/validation/calibration pipeline completed but no physical
    /// pad table survived validation and scoring. Carries the partial output
    /// (§4.E) so any VGPIO/VGPIO_USB/VGPIO_PCIE winners the calibrator did
    /// select are not discarded along with the missing-physical report.
    #[error("no physical pad table survived detection and validation")]
    NoPhysicalTableFound {
        /// The partial pipeline output: whatever VGPIO-class winners were
        /// selected, with no `TableClass::Physical` entry among them.
        partial: Box<PipelineOutput>,
    },

    /// The reference header could not be parsed
    #[error("reference header parse error at line {0}")]
    ReferenceParseError(usize),

    /// Underlying I/O failure reading a file or spawning a helper process
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias used throughout this crate
pub type Result<T> = core::result::Result<T, Error>;
