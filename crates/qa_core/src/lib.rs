//! qa_core: Core types, domains, ordering helpers and integer rounding.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`qa_algo`, `qa_io`, `qa_pipeline`, `qa_cli`).
//!
//! - Defect data: `Category`, `RawDefect`, `DefectRecord`, `CategoryTally`
//! - Sampling configuration: `InspectionLevel`, `SamplingType`, `AqlValue`,
//!   `AqlPlan`, `LotConfig`, `EvalSettings`
//! - Decision outputs: `AqlLimits`, `Verdict`
//! - Natural (numeric-aware) ordering keys and integer percent rounding
//!
//! Serialization derives are gated behind the `serde` feature.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod determinism;
pub mod entities;
pub mod errors;
pub mod rounding;
pub mod variables;

pub use entities::{
    AqlLimit, AqlLimits, BuyerRule, Category, CategoryTally, CategoryVerdict, DefectRecord,
    GroupKey, MeasurementRecord, RawDefect, Status, Verdict, OVERALL_GROUP, UNASSIGNED_GROUP,
};
pub use errors::{ClassificationWarning, ConfigError, WarningKind};
pub use variables::{AqlPlan, AqlValue, CodeLetter, EvalSettings, InspectionLevel, LotConfig, SamplingType};
