//! Sampling-plan domains and evaluation settings.
//!
//! Notes:
//! - Wire tokens are parsed case-insensitively and never defaulted: an
//!   unknown level/sampling/AQL string is a `ConfigError`.
//! - `AqlValue` is integer-first (thousandths of a percent); floats seen on
//!   the wire are converted through their decimal text, not by arithmetic.

use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use crate::entities::Category;
use crate::errors::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/* -------------------------------------------------------------------------- */
/*                               Inspection level                             */
/* -------------------------------------------------------------------------- */

/// General inspection level (sample-size rigor).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InspectionLevel {
    I,
    II,
    III,
}

impl InspectionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            InspectionLevel::I => "I",
            InspectionLevel::II => "II",
            InspectionLevel::III => "III",
        }
    }
}

impl fmt::Display for InspectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InspectionLevel {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" | "1" | "GI" | "G-I" => Ok(InspectionLevel::I),
            "II" | "2" | "GII" | "G-II" => Ok(InspectionLevel::II),
            "III" | "3" | "GIII" | "G-III" => Ok(InspectionLevel::III),
            _ => Err(ConfigError::UnknownInspectionLevel(s.to_string())),
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                                Sampling type                               */
/* -------------------------------------------------------------------------- */

/// Switching state of the sampling scheme.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SamplingType {
    Normal,
    Tightened,
    Reduced,
}

impl SamplingType {
    pub fn as_str(self) -> &'static str {
        match self {
            SamplingType::Normal => "normal",
            SamplingType::Tightened => "tightened",
            SamplingType::Reduced => "reduced",
        }
    }
}

impl fmt::Display for SamplingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SamplingType {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "n" => Ok(SamplingType::Normal),
            "tightened" | "tight" | "t" => Ok(SamplingType::Tightened),
            "reduced" | "r" => Ok(SamplingType::Reduced),
            _ => Err(ConfigError::UnknownSamplingType(s.to_string())),
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                              Sample-size letter                            */
/* -------------------------------------------------------------------------- */

/// Sample-size code letter (I and O are not used by the tables).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CodeLetter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    J,
    K,
    L,
    M,
    N,
    P,
    Q,
    R,
}

impl CodeLetter {
    pub const ALL: [CodeLetter; 16] = [
        CodeLetter::A,
        CodeLetter::B,
        CodeLetter::C,
        CodeLetter::D,
        CodeLetter::E,
        CodeLetter::F,
        CodeLetter::G,
        CodeLetter::H,
        CodeLetter::J,
        CodeLetter::K,
        CodeLetter::L,
        CodeLetter::M,
        CodeLetter::N,
        CodeLetter::P,
        CodeLetter::Q,
        CodeLetter::R,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Letter at `idx`, clamped to `A..=R`.
    pub fn from_index_clamped(idx: isize) -> CodeLetter {
        let last = Self::ALL.len() as isize - 1;
        Self::ALL[idx.clamp(0, last) as usize]
    }

    pub fn as_str(self) -> &'static str {
        const NAMES: [&str; 16] = [
            "A", "B", "C", "D", "E", "F", "G", "H", "J", "K", "L", "M", "N", "P", "Q", "R",
        ];
        NAMES[self.index()]
    }
}

impl fmt::Display for CodeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* -------------------------------------------------------------------------- */
/*                                  AQL value                                 */
/* -------------------------------------------------------------------------- */

/// Preferred AQL series in thousandths of a percent, ascending.
const AQL_SERIES: [(u32, &str); 15] = [
    (10, "0.010"),
    (15, "0.015"),
    (25, "0.025"),
    (40, "0.040"),
    (65, "0.065"),
    (100, "0.10"),
    (150, "0.15"),
    (250, "0.25"),
    (400, "0.40"),
    (650, "0.65"),
    (1000, "1.0"),
    (1500, "1.5"),
    (2500, "2.5"),
    (4000, "4.0"),
    (6500, "6.5"),
];

/// Acceptance quality limit for one category: a value of the preferred
/// series, or zero acceptance.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct AqlValue(u32);

impl AqlValue {
    /// Zero acceptance: any defect rejects.
    pub const ZERO: AqlValue = AqlValue(0);

    /// Build from thousandths of a percent (e.g. 2500 for 2.5 %).
    pub fn from_thousandths(v: u32) -> Result<Self, ConfigError> {
        if v == 0 || AQL_SERIES.iter().any(|(m, _)| *m == v) {
            Ok(AqlValue(v))
        } else {
            Err(ConfigError::UnknownAqlValue(v.to_string()))
        }
    }

    pub fn thousandths(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Position in the preferred series (0 = 0.010); `None` for zero acceptance.
    pub fn series_index(self) -> Option<usize> {
        AQL_SERIES.iter().position(|(m, _)| *m == self.0)
    }
}

impl fmt::Display for AqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match AQL_SERIES.iter().find(|(m, _)| *m == self.0) {
            Some((_, label)) => f.write_str(label),
            None => f.write_str("0"),
        }
    }
}

impl FromStr for AqlValue {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().trim_end_matches('%');
        let milli = parse_decimal_thousandths(t).ok_or_else(|| ConfigError::UnknownAqlValue(s.to_string()))?;
        AqlValue::from_thousandths(milli).map_err(|_| ConfigError::UnknownAqlValue(s.to_string()))
    }
}

/// Parse a non-negative decimal with at most three significant fraction
/// digits into thousandths. Extra fraction digits must be zeros.
fn parse_decimal_thousandths(s: &str) -> Option<u32> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let int_val: u32 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };
    let (head, tail) = frac_part.split_at(frac_part.len().min(3));
    if !tail.bytes().all(|b| b == b'0') {
        return None;
    }
    let mut frac_val: u32 = 0;
    for (i, b) in head.bytes().enumerate() {
        frac_val += u32::from(b - b'0') * [100, 10, 1][i];
    }
    int_val.checked_mul(1000)?.checked_add(frac_val)
}

#[cfg(feature = "serde")]
impl Serialize for AqlValue {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for AqlValue {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct AqlVisitor;

        impl<'de> serde::de::Visitor<'de> for AqlVisitor {
            type Value = AqlValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an AQL percentage from the preferred series (0.010 .. 6.5) or 0")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<AqlValue, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<AqlValue, E> {
                let milli = u32::try_from(v)
                    .ok()
                    .and_then(|x| x.checked_mul(1000))
                    .ok_or_else(|| E::custom(ConfigError::UnknownAqlValue(v.to_string())))?;
                AqlValue::from_thousandths(milli).map_err(E::custom)
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<AqlValue, E> {
                let u = u64::try_from(v).map_err(|_| E::custom(ConfigError::UnknownAqlValue(v.to_string())))?;
                self.visit_u64(u)
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<AqlValue, E> {
                // Shortest round-trip text of the float, e.g. 0.065 -> "0.065".
                let text = alloc::format!("{v}");
                text.parse().map_err(E::custom)
            }
        }

        d.deserialize_any(AqlVisitor)
    }
}

/* -------------------------------------------------------------------------- */
/*                                  AQL plan                                  */
/* -------------------------------------------------------------------------- */

/// Severity-specific AQL percentages. `None` = category not evaluated.
///
/// Default (garment convention): critical zero acceptance, major 2.5,
/// minor 4.0. On the wire a missing key takes the default and an explicit
/// `null` disables the category.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct AqlPlan {
    pub critical: Option<AqlValue>,
    pub major: Option<AqlValue>,
    pub minor: Option<AqlValue>,
}

impl Default for AqlPlan {
    fn default() -> Self {
        Self {
            critical: Some(AqlValue::ZERO),
            major: Some(AqlValue(2500)),
            minor: Some(AqlValue(4000)),
        }
    }
}

impl AqlPlan {
    pub fn get(&self, category: Category) -> Option<AqlValue> {
        match category {
            Category::Minor => self.minor,
            Category::Major => self.major,
            Category::Critical => self.critical,
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                                 Lot config                                 */
/* -------------------------------------------------------------------------- */

/// Per-report lot/sampling configuration.
///
/// `lot_size` is signed so that malformed input reaches the resolver and is
/// rejected there (`ConfigError::InvalidLotSize`) instead of being coerced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LotConfig {
    pub lot_size: i64,
    pub inspection_level: InspectionLevel,
    pub sampling_type: SamplingType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub aql: AqlPlan,
}

impl LotConfig {
    pub fn new(lot_size: i64, inspection_level: InspectionLevel, sampling_type: SamplingType) -> Self {
        Self { lot_size, inspection_level, sampling_type, aql: AqlPlan::default() }
    }

    /// Build from wire strings. Unknown level/sampling tokens are errors.
    pub fn parse(lot_size: i64, inspection_level: &str, sampling_type: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(lot_size, inspection_level.parse()?, sampling_type.parse()?))
    }

    pub fn with_aql(mut self, aql: AqlPlan) -> Self {
        self.aql = aql;
        self
    }

    /// Lot size as an unsigned count, or `InvalidLotSize` when ≤ 0.
    pub fn checked_lot_size(&self) -> Result<u64, ConfigError> {
        if self.lot_size <= 0 {
            Err(ConfigError::InvalidLotSize(self.lot_size))
        } else {
            Ok(self.lot_size as u64)
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                               Eval settings                                */
/* -------------------------------------------------------------------------- */

/// Report-level knobs for the supplementary summaries.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct EvalSettings {
    /// Garments inspected per inspector; denominator of inspector defect rates.
    pub inspected_qty_per_inspector: u32,
    /// Width of one measurement-deviation histogram bucket.
    pub histogram_step: f64,
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self { inspected_qty_per_inspector: 20, histogram_step: 0.25 }
    }
}

impl EvalSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inspected_qty_per_inspector == 0 {
            return Err(ConfigError::InvalidSetting("inspected_qty_per_inspector must be > 0"));
        }
        if !(self.histogram_step.is_finite() && self.histogram_step > 0.0) {
            return Err(ConfigError::InvalidSetting("histogram_step must be a positive number"));
        }
        Ok(())
    }
}
