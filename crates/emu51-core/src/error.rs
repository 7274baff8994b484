use thiserror::Error;

/// Closed set of sticky failure codes for the emulation core.
///
/// Every code maps to a stable negative `i8` value used by host-side
/// diagnostic transports; the mapping is part of the external contract and
/// must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(i8)]
pub enum CoreError {
    /// Generic emulation failure (for example an out-of-range register
    /// number passed to the general-purpose register accessors).
    #[error("general emulation failure")]
    General = -1,
    /// Missing core reference. Retained for parity with the stable
    /// diagnostic code space; safe API paths never produce it.
    #[error("core reference is null")]
    NullCore = -2,
    /// A code fetch addressed bytes beyond the code store's bound, or the
    /// next sequential instruction would start past the 16-bit code space.
    #[error("code address out of range")]
    CodeOutOfRange = -3,
    /// The fetched opcode has no defined descriptor.
    #[error("unknown instruction")]
    UnknownInstruction = -4,
    /// An external-data access addressed bytes beyond the configured
    /// buffer length.
    #[error("external data address out of range")]
    XdataOutOfRange = -5,
}

impl CoreError {
    /// Converts the error to its stable diagnostic code.
    #[must_use]
    pub const fn as_code(self) -> i8 {
        self as i8
    }

    /// Converts a stable diagnostic code back into an error.
    ///
    /// Returns `None` for `0` (success is the absence of an error) and for
    /// values outside the defined code space.
    #[must_use]
    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(Self::General),
            -2 => Some(Self::NullCore),
            -3 => Some(Self::CodeOutOfRange),
            -4 => Some(Self::UnknownInstruction),
            -5 => Some(Self::XdataOutOfRange),
            _ => None,
        }
    }

    /// Returns the stable uppercase name used by diagnostic dumps.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::General => "ERR",
            Self::NullCore => "ERR_CORE_NULL",
            Self::CodeOutOfRange => "ERR_CODE_OUT_OF_RANGE",
            Self::UnknownInstruction => "ERR_UNKNOWN_INST",
            Self::XdataOutOfRange => "ERR_XDATA_OUT_OF_RANGE",
        }
    }
}
