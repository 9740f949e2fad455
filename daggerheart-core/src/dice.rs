//! Dice pools and advantage/disadvantage resolution.
//!
//! Daggerheart grants advantage and disadvantage as extra dice (d6 unless a
//! feature says otherwise) that add to or subtract from a roll's total.
//! Before anything is rolled, advantage and disadvantage dice of the same
//! size cancel pairwise; dice of different sizes never cancel each other.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Error type for strict pool validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Unknown die size: {0}")]
    UnknownDieSize(String),
    #[error("Negative count {count} for {size}")]
    NegativeCount { size: String, count: i64 },
}

/// Standard Daggerheart die sizes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DieSize {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieSize {
    /// All supported sizes, smallest first.
    pub const ALL: [DieSize; 6] = [
        DieSize::D4,
        DieSize::D6,
        DieSize::D8,
        DieSize::D10,
        DieSize::D12,
        DieSize::D20,
    ];

    pub fn sides(&self) -> u32 {
        match self {
            DieSize::D4 => 4,
            DieSize::D6 => 6,
            DieSize::D8 => 8,
            DieSize::D10 => 10,
            DieSize::D12 => 12,
            DieSize::D20 => 20,
        }
    }

    pub fn from_sides(sides: u32) -> Option<DieSize> {
        match sides {
            4 => Some(DieSize::D4),
            6 => Some(DieSize::D6),
            8 => Some(DieSize::D8),
            10 => Some(DieSize::D10),
            12 => Some(DieSize::D12),
            20 => Some(DieSize::D20),
            _ => None,
        }
    }

    /// Parse a die-size label like `d6` or `D12`.
    pub fn from_label(label: &str) -> Option<DieSize> {
        let label = label.trim();
        let rest = label.strip_prefix('d').or_else(|| label.strip_prefix('D'))?;
        rest.parse().ok().and_then(DieSize::from_sides)
    }
}

impl fmt::Display for DieSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// Whether an aggregate pool marker keeps the highest or lowest result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeepMode {
    Highest,
    Lowest,
}

impl KeepMode {
    pub fn suffix(self) -> &'static str {
        match self {
            KeepMode::Highest => "kh",
            KeepMode::Lowest => "kl",
        }
    }
}

/// A pool of dice keyed by size. Absent sizes count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DicePool(BTreeMap<DieSize, u32>);

impl DicePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool holding `count` dice of a single size.
    pub fn of(size: DieSize, count: u32) -> Self {
        let mut pool = Self::new();
        pool.set(size, count);
        pool
    }

    pub fn count(&self, size: DieSize) -> u32 {
        self.0.get(&size).copied().unwrap_or(0)
    }

    /// Set the count for a size. Zero counts are not stored.
    pub fn set(&mut self, size: DieSize, count: u32) {
        if count == 0 {
            self.0.remove(&size);
        } else {
            self.0.insert(size, count);
        }
    }

    pub fn add(&mut self, size: DieSize, count: u32) {
        self.set(size, self.count(size) + count);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of dice across all sizes.
    pub fn total_dice(&self) -> u32 {
        self.0.values().sum()
    }

    /// Iterate over (size, count) pairs, smallest size first.
    pub fn iter(&self) -> impl Iterator<Item = (DieSize, u32)> + '_ {
        self.0.iter().map(|(&size, &count)| (size, count))
    }

    /// Render the pool as additional rollable terms, e.g. `2d6+1d8`.
    ///
    /// Returns `None` for an empty pool (a fully cancelled pool contributes
    /// nothing to the roll). `mode` appends the aggregate `kh`/`kl` marker
    /// some hosts display on bonus-die groups; multi-size pools are wrapped
    /// in braces so the marker reads as a single aggregate effect. Totals
    /// computed by this crate always sum every die regardless of the marker.
    pub fn formula_fragment(&self, mode: KeepMode) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let terms: Vec<String> = self
            .iter()
            .map(|(size, count)| format!("{count}{size}"))
            .collect();
        if terms.len() == 1 {
            Some(format!("{}{}", terms[0], mode.suffix()))
        } else {
            Some(format!("{{{}}}{}", terms.join("+"), mode.suffix()))
        }
    }

    /// Roll every die in the pool.
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> PoolRoll {
        let mut groups = Vec::new();
        for (size, count) in self.iter() {
            let rolls: Vec<u32> = (0..count).map(|_| rng.gen_range(1..=size.sides())).collect();
            let subtotal = rolls.iter().sum();
            groups.push(PoolRollGroup {
                size,
                rolls,
                subtotal,
            });
        }
        let total = groups.iter().map(|g| g.subtotal).sum();
        PoolRoll { groups, total }
    }
}

impl FromIterator<(DieSize, u32)> for DicePool {
    fn from_iter<T: IntoIterator<Item = (DieSize, u32)>>(iter: T) -> Self {
        let mut pool = DicePool::new();
        for (size, count) in iter {
            pool.add(size, count);
        }
        pool
    }
}

/// Rolled results for one die size within a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRollGroup {
    pub size: DieSize,
    pub rolls: Vec<u32>,
    pub subtotal: u32,
}

/// Rolled results for a whole pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRoll {
    pub groups: Vec<PoolRollGroup>,
    pub total: u32,
}

/// Raw advantage or disadvantage input as the host hands it over: either a
/// bare count of d6s or a per-size map. Counts arrive as `i64` so negative
/// or garbage input can be observed and coerced rather than rejected at the
/// serde boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PoolInput {
    Count(i64),
    Pool(BTreeMap<String, i64>),
}

impl Default for PoolInput {
    fn default() -> Self {
        PoolInput::Count(0)
    }
}

impl From<u32> for PoolInput {
    fn from(count: u32) -> Self {
        PoolInput::Count(count as i64)
    }
}

impl From<DicePool> for PoolInput {
    fn from(pool: DicePool) -> Self {
        PoolInput::Pool(
            pool.iter()
                .map(|(size, count)| (size.to_string(), count as i64))
                .collect(),
        )
    }
}

impl PoolInput {
    /// Normalize to a validated pool. A bare count `n` means `n` d6s; zero
    /// or negative counts yield an empty pool. Map entries with unknown die
    /// labels are dropped and negative counts coerce to zero. Never fails.
    pub fn normalize(&self) -> DicePool {
        match self {
            PoolInput::Count(n) => {
                if *n <= 0 {
                    DicePool::new()
                } else {
                    DicePool::of(DieSize::D6, *n as u32)
                }
            }
            PoolInput::Pool(map) => {
                let mut pool = DicePool::new();
                for (label, &count) in map {
                    if let Some(size) = DieSize::from_label(label) {
                        if count > 0 {
                            pool.add(size, count as u32);
                        }
                    }
                }
                pool
            }
        }
    }

    /// Strict variant of [`normalize`](Self::normalize): unknown die labels
    /// and negative counts are errors instead of being coerced away.
    pub fn try_normalize(&self) -> Result<DicePool, PoolError> {
        match self {
            PoolInput::Count(n) => {
                if *n < 0 {
                    Err(PoolError::NegativeCount {
                        size: DieSize::D6.to_string(),
                        count: *n,
                    })
                } else {
                    Ok(self.normalize())
                }
            }
            PoolInput::Pool(map) => {
                let mut pool = DicePool::new();
                for (label, &count) in map {
                    let size = DieSize::from_label(label)
                        .ok_or_else(|| PoolError::UnknownDieSize(label.clone()))?;
                    if count < 0 {
                        return Err(PoolError::NegativeCount {
                            size: size.to_string(),
                            count,
                        });
                    }
                    pool.add(size, count as u32);
                }
                Ok(pool)
            }
        }
    }
}

/// Advantage and disadvantage pools after pairwise same-size cancellation.
///
/// For every die size, at most one of the two pools holds a non-zero count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPools {
    pub advantage: DicePool,
    pub disadvantage: DicePool,
}

impl NetPools {
    pub fn is_empty(&self) -> bool {
        self.advantage.is_empty() && self.disadvantage.is_empty()
    }

    /// The side holding more dice in aggregate, if the pools are uneven.
    /// Used when a single dominant pool must be picked for display.
    pub fn dominant_side(&self) -> Option<RollSide> {
        let adv = self.advantage.total_dice();
        let dis = self.disadvantage.total_dice();
        match adv.cmp(&dis) {
            std::cmp::Ordering::Greater => Some(RollSide::Advantage),
            std::cmp::Ordering::Less => Some(RollSide::Disadvantage),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Which side of a roll a bonus pool sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollSide {
    Advantage,
    Disadvantage,
}

/// Cancel advantage against disadvantage, one die against one die of the
/// same size. A d6 of advantage never cancels a d8 of disadvantage.
pub fn cancel(advantage: &DicePool, disadvantage: &DicePool) -> NetPools {
    let mut adv = advantage.clone();
    let mut dis = disadvantage.clone();
    for size in DieSize::ALL {
        let pairs = adv.count(size).min(dis.count(size));
        if pairs > 0 {
            adv.set(size, adv.count(size) - pairs);
            dis.set(size, dis.count(size) - pairs);
        }
    }
    NetPools {
        advantage: adv,
        disadvantage: dis,
    }
}
