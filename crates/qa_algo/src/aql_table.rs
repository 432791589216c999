//! AQL Table Resolver: `LotConfig` → per-category `AqlLimits`.
//!
//! Tables follow ISO 2859-1 / ANSI Z1.4 single sampling:
//! - Table I: lot-size bracket × general level → code letter.
//! - Table II-A (normal): along every AQL column the acceptance numbers walk
//!   a fixed ladder starting at the `0/1` cell, and that cell moves one code
//!   letter per AQL step. Arrows point to the nearest plan below/above; the
//!   plan's own sample size is used.
//! - Table II-B (tightened): same construction, `0/1` two letters later,
//!   tightened ladder. Letter S (3150) exists only here.
//! - Table II-C (reduced, 1999 revision, `Re = Ac + 1`): the normal plan
//!   two code letters lower.
//!
//! Sample sizes that exceed the lot size are capped at the lot size (100 %
//! inspection). The resolver holds no state; identical input, identical output.

use std::collections::BTreeMap;

use qa_core::{
    AqlLimit, AqlLimits, AqlValue, Category, CodeLetter, ConfigError, InspectionLevel, LotConfig,
    SamplingType,
};

/// Lower bounds of the lot-size brackets. A lot belongs to the last bracket
/// whose bound is ≤ its size, so a boundary value opens the higher bracket.
const LOT_BRACKET_LOWER: [u64; 15] = [
    2, 9, 16, 26, 51, 91, 151, 281, 501, 1_201, 3_201, 10_001, 35_001, 150_001, 500_001,
];

/// Code letter index per bracket for levels (I, II, III).
const TABLE_I: [[u8; 3]; 15] = [
    [0, 0, 1],    // 2–8        A A B
    [0, 1, 2],    // 9–15       A B C
    [1, 2, 3],    // 16–25      B C D
    [2, 3, 4],    // 26–50      C D E
    [2, 4, 5],    // 51–90      C E F
    [3, 5, 6],    // 91–150     D F G
    [4, 6, 7],    // 151–280    E G H
    [5, 7, 8],    // 281–500    F H J
    [6, 8, 9],    // 501–1200   G J K
    [7, 9, 10],   // 1201–3200  H K L
    [8, 10, 11],  // 3201–10000 J L M
    [9, 11, 12],  // 10001–35000
    [10, 12, 13], // 35001–150000
    [11, 13, 14], // 150001–500000
    [12, 14, 15], // 500001+
];

/// Sample size per code letter index (A..R, then S for tightened only).
const SAMPLE_SIZES: [u32; 17] = [
    2, 3, 5, 8, 13, 20, 32, 50, 80, 125, 200, 315, 500, 800, 1_250, 2_000, 3_150,
];

const LAST_NORMAL_LETTER: usize = 15;
const LAST_TIGHTENED_LETTER: usize = 16;

/// One cell of a ladder column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cell {
    Ac(u32),
    /// Use the first plan below.
    Down,
    /// Use the first plan above.
    Up,
}

/// Normal inspection, starting at the `0/1` cell.
const NORMAL_LADDER: [Cell; 11] = [
    Cell::Ac(0),
    Cell::Up,
    Cell::Down,
    Cell::Ac(1),
    Cell::Ac(2),
    Cell::Ac(3),
    Cell::Ac(5),
    Cell::Ac(7),
    Cell::Ac(10),
    Cell::Ac(14),
    Cell::Ac(21),
];

/// Tightened inspection, starting at the `0/1` cell.
const TIGHTENED_LADDER: [Cell; 9] = [
    Cell::Ac(0),
    Cell::Down,
    Cell::Ac(1),
    Cell::Ac(2),
    Cell::Ac(3),
    Cell::Ac(5),
    Cell::Ac(8),
    Cell::Ac(12),
    Cell::Ac(18),
];

/// Table I lookup. Lots of size 1 use the first bracket.
pub fn code_letter_for(lot_size: u64, level: InspectionLevel) -> CodeLetter {
    let bracket = LOT_BRACKET_LOWER
        .iter()
        .rposition(|&lower| lot_size >= lower)
        .unwrap_or(0);
    let col = match level {
        InspectionLevel::I => 0,
        InspectionLevel::II => 1,
        InspectionLevel::III => 2,
    };
    CodeLetter::from_index_clamped(TABLE_I[bracket][col] as isize)
}

/// Normal-inspection sample size for a code letter.
pub fn normal_sample_size(letter: CodeLetter) -> u32 {
    SAMPLE_SIZES[letter.index()]
}

/// Resolve acceptance/rejection numbers for every category the plan evaluates.
pub fn resolve_limits(cfg: &LotConfig) -> Result<AqlLimits, ConfigError> {
    let lot_size = cfg.checked_lot_size()?;
    let code_letter = code_letter_for(lot_size, cfg.inspection_level);

    let mut per_category = BTreeMap::new();
    for category in Category::ALL {
        let Some(aql) = cfg.aql.get(category) else { continue };
        let (letter_idx, accept_number) = plan_for(code_letter.index(), aql, cfg.sampling_type);
        let sample_size = cap_to_lot(SAMPLE_SIZES[letter_idx], lot_size);
        per_category.insert(
            category,
            AqlLimit { aql, sample_size, accept_number, reject_number: accept_number + 1 },
        );
    }

    Ok(AqlLimits { code_letter, per_category })
}

fn cap_to_lot(n: u32, lot_size: u64) -> u32 {
    u32::try_from(lot_size).map_or(n, |lot| n.min(lot))
}

/// Plan (sample-size letter index, Ac) for a lot letter, AQL and sampling type.
fn plan_for(letter: usize, aql: AqlValue, sampling: SamplingType) -> (usize, u32) {
    let letter = match sampling {
        SamplingType::Reduced => letter.saturating_sub(2),
        SamplingType::Normal | SamplingType::Tightened => letter,
    };

    // Zero acceptance: 0/1 at the lot's own sample size.
    let Some(aql_idx) = aql.series_index() else {
        return (letter, 0);
    };

    // `0/1` cell for the column; the preferred series has 15 values.
    let normal_zero = 14 - aql_idx;
    match sampling {
        SamplingType::Normal | SamplingType::Reduced => {
            walk_ladder(&NORMAL_LADDER, normal_zero, letter, LAST_NORMAL_LETTER)
        }
        SamplingType::Tightened => {
            walk_ladder(&TIGHTENED_LADDER, normal_zero + 2, letter, LAST_TIGHTENED_LETTER)
        }
    }
}

/// Follow arrows from `letter` until a plan is found.
///
/// Above the column's first plan every cell is a down-arrow; past the last
/// ladder entry every cell is an up-arrow. A down-arrow that would leave the
/// table resolves upwards instead.
fn walk_ladder(ladder: &[Cell], zero: usize, letter: usize, last_letter: usize) -> (usize, u32) {
    let max_k = ladder.len() - 1;
    let mut k = letter.saturating_sub(zero).min(max_k);
    let mut going_up = false;
    loop {
        let plan_letter = zero + k;
        match ladder[k] {
            Cell::Ac(ac) if plan_letter <= last_letter => return (plan_letter, ac),
            Cell::Down if !going_up && plan_letter < last_letter => k += 1,
            _ if k == 0 => return (zero.min(last_letter), 0),
            _ => {
                going_up = true;
                k -= 1;
            }
        }
    }
}
