//! Defect records, tallies, limits and verdicts.
//!
//! All types here are plain data. Producing them is the job of `qa_algo`;
//! they carry no presentation hints (badge colors, icons, labels).

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

use crate::variables::{AqlValue, CodeLetter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Group key used by the tally aggregator.
pub type GroupKey = String;

/// Default single group produced when no grouping is requested.
pub const OVERALL_GROUP: &str = "overall";

/// Group for records lacking the grouped attribute.
pub const UNASSIGNED_GROUP: &str = "unassigned";

/* -------------------------------------------------------------------------- */
/*                                  Category                                  */
/* -------------------------------------------------------------------------- */

/// Defect severity. The derived order is the severity order:
/// `Minor < Major < Critical`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Category {
    Minor,
    Major,
    Critical,
}

impl Category {
    /// Ascending severity.
    pub const ALL: [Category; 3] = [Category::Minor, Category::Major, Category::Critical];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Minor => "minor",
            Category::Major => "major",
            Category::Critical => "critical",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Records                                  */
/* -------------------------------------------------------------------------- */

/// Defect as captured by the inspection collaborator, before classification.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawDefect {
    /// Free-text or coded severity ("Major", "MA", "3", ...).
    #[cfg_attr(feature = "serde", serde(alias = "category"))]
    pub severity: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub quantity: i64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub location_no: Option<u32>,
    /// Line/table/color composite key.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub config_key: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub inspector: Option<String>,
}

/// Classified defect. Immutable once produced.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DefectRecord {
    pub category: Category,
    pub name: String,
    pub quantity: u32,
    pub location_no: Option<u32>,
    pub config_key: Option<String>,
    pub inspector: Option<String>,
    /// True when the severity was not recognized and defaulted to Minor.
    pub unclassified: bool,
}

impl DefectRecord {
    /// Convenience constructor for a recognized record with no grouping attributes.
    pub fn new(category: Category, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            category,
            name: name.into(),
            quantity,
            location_no: None,
            config_key: None,
            inspector: None,
            unclassified: false,
        }
    }
}

/// One measured point of one garment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeasurementRecord {
    pub size: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub point: String,
    pub spec: f64,
    pub measured: f64,
    pub tolerance_minus: f64,
    pub tolerance_plus: f64,
}

/// Order-number prefix → buyer mapping entry.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BuyerRule {
    pub prefix: String,
    pub buyer: String,
}

/* -------------------------------------------------------------------------- */
/*                                   Tallies                                  */
/* -------------------------------------------------------------------------- */

/// Per-category defect counts for one scope. Every category is always present.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryTally {
    pub minor: u64,
    pub major: u64,
    pub critical: u64,
}

impl CategoryTally {
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Minor => self.minor,
            Category::Major => self.major,
            Category::Critical => self.critical,
        }
    }

    pub fn set(&mut self, category: Category, count: u64) {
        match category {
            Category::Minor => self.minor = count,
            Category::Major => self.major = count,
            Category::Critical => self.critical = count,
        }
    }

    /// Saturating add.
    pub fn add(&mut self, category: Category, quantity: u64) {
        let next = self.get(category).saturating_add(quantity);
        self.set(category, next);
    }

    pub fn total(&self) -> u64 {
        self.minor.saturating_add(self.major).saturating_add(self.critical)
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Limits                                   */
/* -------------------------------------------------------------------------- */

/// Single-sampling plan for one category.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AqlLimit {
    pub aql: AqlValue,
    pub sample_size: u32,
    pub accept_number: u32,
    pub reject_number: u32,
}

/// Resolved acceptance/rejection numbers per evaluated category.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AqlLimits {
    /// Sample-size code letter of the lot (before any arrow shifts).
    pub code_letter: CodeLetter,
    pub per_category: BTreeMap<Category, AqlLimit>,
}

impl AqlLimits {
    pub fn get(&self, category: Category) -> Option<&AqlLimit> {
        self.per_category.get(&category)
    }

    /// Largest per-category sample size; the number of units to draw.
    pub fn sample_size(&self) -> u32 {
        self.per_category.values().map(|l| l.sample_size).max().unwrap_or(0)
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Verdict                                  */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "pass",
            Status::Fail => "fail",
        }
    }

    pub fn is_fail(self) -> bool {
        matches!(self, Status::Fail)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryVerdict {
    pub status: Status,
    pub count: u64,
    pub accept_number: u32,
    pub reject_number: u32,
}

/// Computed decision; recomputed whenever tallies or limits change.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Verdict {
    pub overall: Status,
    /// Highest-severity failing category, if any.
    pub failing_category: Option<Category>,
    pub per_category: BTreeMap<Category, CategoryVerdict>,
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        self.overall == Status::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_order_is_severity_order() {
        assert!(Category::Minor < Category::Major);
        assert!(Category::Major < Category::Critical);
        assert_eq!(Category::ALL.iter().max(), Some(&Category::Critical));
    }

    #[test]
    fn tally_add_saturates() {
        let mut t = CategoryTally::default();
        t.add(Category::Major, u64::MAX);
        t.add(Category::Major, 5);
        assert_eq!(t.major, u64::MAX);
        assert_eq!(t.total(), u64::MAX);
    }
}
