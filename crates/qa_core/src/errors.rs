//! Error and warning sets for core-domain validation & parsing.

use alloc::string::String;
use core::fmt;

/// Invalid lot/sampling configuration. Aborts an evaluation; never defaulted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    InvalidLotSize(i64),
    UnknownInspectionLevel(String),
    UnknownSamplingType(String),
    UnknownAqlValue(String),
    InvalidSetting(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidLotSize(n) => write!(f, "invalid lot size: {n} (must be > 0)"),
            ConfigError::UnknownInspectionLevel(s) => write!(f, "unknown inspection level: {s:?}"),
            ConfigError::UnknownSamplingType(s) => write!(f, "unknown sampling type: {s:?}"),
            ConfigError::UnknownAqlValue(s) => write!(f, "AQL value not in the preferred series: {s:?}"),
            ConfigError::InvalidSetting(k) => write!(f, "invalid setting: {k}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// What was wrong with a raw defect that was still classified.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum WarningKind {
    /// Severity text matched no known category; the record counts as Minor.
    UnrecognizedSeverity { raw: String },
    /// Quantity below zero; counted as 0.
    NegativeQuantity { raw: i64 },
    /// Quantity above `u32::MAX`; counted as `u32::MAX`.
    QuantityOverflow { raw: i64 },
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::UnrecognizedSeverity { raw } => {
                write!(f, "unrecognized severity {raw:?}, classified as minor")
            }
            WarningKind::NegativeQuantity { raw } => write!(f, "negative quantity {raw}, counted as 0"),
            WarningKind::QuantityOverflow { raw } => write!(f, "quantity {raw} exceeds u32, clamped"),
        }
    }
}

/// Non-fatal classification finding, indexed by input position.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassificationWarning {
    pub record_index: usize,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: WarningKind,
}

impl fmt::Display for ClassificationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "defect #{}: {}", self.record_index, self.kind)
    }
}
