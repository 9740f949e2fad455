//! Duality rolls: the two-die Hope/Fear mechanic.
//!
//! Every action roll in Daggerheart is a Hope die and a Fear die (d12s
//! unless a feature swaps one out) rolled together. Matching dice are a
//! critical success; otherwise the higher die decides whether the roll is
//! "with Hope" or "with Fear". Reaction rolls use the same dice but
//! generate neither Hope nor Fear. Net advantage dice add to the total and
//! net disadvantage dice subtract from it.

use crate::dice::{cancel, DieSize, NetPools, PoolInput, PoolRoll};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for outcome mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollError {
    /// An outcome admits exactly one reroll.
    #[error("outcome has already been rerolled")]
    AlreadyRerolled,
}

/// Which of the two duality dice to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DualityDie {
    Hope,
    Fear,
}

/// A duality roll under construction.
///
/// All context is explicit: a forced critical is a builder flag on the
/// single invocation it applies to, never ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualityRoll {
    hope_die: DieSize,
    fear_die: DieSize,
    advantage: PoolInput,
    disadvantage: PoolInput,
    modifier: i32,
    reaction: bool,
    forced_critical: bool,
}

impl Default for DualityRoll {
    fn default() -> Self {
        Self {
            hope_die: DieSize::D12,
            fear_die: DieSize::D12,
            advantage: PoolInput::default(),
            disadvantage: PoolInput::default(),
            modifier: 0,
            reaction: false,
            forced_critical: false,
        }
    }
}

impl DualityRoll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap out the Hope and Fear die sizes.
    pub fn with_dice(mut self, hope: DieSize, fear: DieSize) -> Self {
        self.hope_die = hope;
        self.fear_die = fear;
        self
    }

    pub fn with_advantage(mut self, advantage: impl Into<PoolInput>) -> Self {
        self.advantage = advantage.into();
        self
    }

    pub fn with_disadvantage(mut self, disadvantage: impl Into<PoolInput>) -> Self {
        self.disadvantage = disadvantage.into();
        self
    }

    /// Flat modifier added to the total, typically a trait or attack total.
    pub fn with_modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }

    /// Mark as a reaction roll: the outcome generates neither Hope nor Fear.
    pub fn as_reaction(mut self) -> Self {
        self.reaction = true;
        self
    }

    /// Force a critical: the Fear die is pinned to the Hope die's value.
    pub fn with_forced_critical(mut self) -> Self {
        self.forced_critical = true;
        self
    }

    /// The advantage and disadvantage pools after normalization and
    /// pairwise cancellation, exactly as the roll will use them.
    pub fn net_pools(&self) -> NetPools {
        cancel(&self.advantage.normalize(), &self.disadvantage.normalize())
    }

    pub fn roll(&self) -> DualityOutcome {
        self.roll_with_rng(&mut rand::thread_rng())
    }

    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> DualityOutcome {
        let net = self.net_pools();
        let hope = rng.gen_range(1..=self.hope_die.sides());
        let fear = if self.forced_critical {
            hope
        } else {
            rng.gen_range(1..=self.fear_die.sides())
        };
        let advantage = net.advantage.roll_with_rng(rng);
        let disadvantage = net.disadvantage.roll_with_rng(rng);

        let mut outcome = DualityOutcome {
            hope_die: self.hope_die,
            fear_die: self.fear_die,
            hope,
            fear,
            modifier: self.modifier,
            advantage,
            disadvantage,
            total: 0,
            is_crit: false,
            is_hope: false,
            is_fear: false,
            reaction: self.reaction,
            rerolled: false,
        };
        outcome.recompute();
        outcome
    }
}

/// The resolved result of a duality roll.
///
/// Exactly one of `is_crit`, `is_hope`, `is_fear` is set on a non-reaction
/// roll; reaction rolls set `is_crit` at most.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualityOutcome {
    pub hope_die: DieSize,
    pub fear_die: DieSize,
    pub hope: u32,
    pub fear: u32,
    pub modifier: i32,
    pub advantage: PoolRoll,
    pub disadvantage: PoolRoll,
    pub total: i32,
    pub is_crit: bool,
    pub is_hope: bool,
    pub is_fear: bool,
    reaction: bool,
    rerolled: bool,
}

impl DualityOutcome {
    pub fn is_reaction(&self) -> bool {
        self.reaction
    }

    /// Replace one die's value. Allowed once per outcome; the category
    /// flags and total are recomputed from the new values, so no stale
    /// flag survives.
    pub fn reroll(&mut self, die: DualityDie, new_value: u32) -> Result<(), RollError> {
        if self.rerolled {
            return Err(RollError::AlreadyRerolled);
        }
        match die {
            DualityDie::Hope => self.hope = new_value,
            DualityDie::Fear => self.fear = new_value,
        }
        self.rerolled = true;
        self.recompute();
        Ok(())
    }

    /// Reroll one die with fresh randomness, using the die size the
    /// outcome was rolled with.
    pub fn reroll_with_rng<R: Rng>(&mut self, die: DualityDie, rng: &mut R) -> Result<(), RollError> {
        let size = match die {
            DualityDie::Hope => self.hope_die,
            DualityDie::Fear => self.fear_die,
        };
        self.reroll(die, rng.gen_range(1..=size.sides()))
    }

    fn recompute(&mut self) {
        self.is_crit = self.hope == self.fear;
        self.is_hope = !self.reaction && !self.is_crit && self.hope > self.fear;
        self.is_fear = !self.reaction && !self.is_crit && self.hope < self.fear;
        self.total = self.hope as i32 + self.fear as i32 + self.modifier
            + self.advantage.total as i32
            - self.disadvantage.total as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DicePool;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_flags_consistent(outcome: &DualityOutcome) {
        assert_eq!(outcome.is_crit, outcome.hope == outcome.fear);
        if outcome.is_crit {
            assert!(!outcome.is_hope && !outcome.is_fear);
        } else if !outcome.is_reaction() {
            assert_eq!(outcome.is_hope, outcome.hope > outcome.fear);
            assert_eq!(outcome.is_fear, outcome.hope < outcome.fear);
        } else {
            assert!(!outcome.is_hope && !outcome.is_fear);
        }
    }

    #[test]
    fn test_plain_roll_flags_and_total() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let outcome = DualityRoll::new().with_modifier(3).roll_with_rng(&mut rng);
            assert!(outcome.hope >= 1 && outcome.hope <= 12);
            assert!(outcome.fear >= 1 && outcome.fear <= 12);
            assert_eq!(
                outcome.total,
                outcome.hope as i32 + outcome.fear as i32 + 3
            );
            assert_flags_consistent(&outcome);
        }
    }

    #[test]
    fn test_advantage_dice_add_to_total() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let outcome = DualityRoll::new()
                .with_advantage(2u32)
                .roll_with_rng(&mut rng);
            assert_eq!(outcome.advantage.groups.len(), 1);
            assert_eq!(outcome.advantage.groups[0].rolls.len(), 2);
            assert!(outcome.disadvantage.groups.is_empty());
            assert_eq!(
                outcome.total,
                outcome.hope as i32 + outcome.fear as i32 + outcome.advantage.total as i32
            );
        }
    }

    #[test]
    fn test_disadvantage_dice_subtract_from_total() {
        let mut rng = StdRng::seed_from_u64(9);
        let outcome = DualityRoll::new()
            .with_disadvantage(DicePool::of(DieSize::D8, 1))
            .roll_with_rng(&mut rng);
        assert_eq!(
            outcome.total,
            outcome.hope as i32 + outcome.fear as i32 - outcome.disadvantage.total as i32
        );
    }

    #[test]
    fn test_full_cancellation_rolls_plain() {
        let mut rng = StdRng::seed_from_u64(3);
        let roll = DualityRoll::new()
            .with_advantage(2u32)
            .with_disadvantage(2u32);
        assert!(roll.net_pools().is_empty());
        let outcome = roll.roll_with_rng(&mut rng);
        assert!(outcome.advantage.groups.is_empty());
        assert!(outcome.disadvantage.groups.is_empty());
        assert_eq!(outcome.total, outcome.hope as i32 + outcome.fear as i32);
    }

    #[test]
    fn test_partial_cancellation_leaves_net_side() {
        let roll = DualityRoll::new()
            .with_advantage(3u32)
            .with_disadvantage(1u32);
        let net = roll.net_pools();
        assert_eq!(net.advantage.count(DieSize::D6), 2);
        assert!(net.disadvantage.is_empty());
    }

    #[test]
    fn test_forced_critical() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let outcome = DualityRoll::new()
                .with_forced_critical()
                .roll_with_rng(&mut rng);
            assert!(outcome.is_crit);
            assert_eq!(outcome.hope, outcome.fear);
            assert!(!outcome.is_hope && !outcome.is_fear);
        }
    }

    #[test]
    fn test_reaction_roll_generates_neither() {
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..100 {
            let outcome = DualityRoll::new().as_reaction().roll_with_rng(&mut rng);
            assert!(!outcome.is_hope && !outcome.is_fear);
            assert_eq!(outcome.is_crit, outcome.hope == outcome.fear);
        }
    }

    #[test]
    fn test_mixed_die_sizes() {
        let mut rng = StdRng::seed_from_u64(21);
        let outcome = DualityRoll::new()
            .with_dice(DieSize::D20, DieSize::D12)
            .roll_with_rng(&mut rng);
        assert!(outcome.hope >= 1 && outcome.hope <= 20);
        assert!(outcome.fear >= 1 && outcome.fear <= 12);
        assert_flags_consistent(&outcome);
    }

    #[test]
    fn test_reroll_recomputes_everything() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut outcome = DualityRoll::new().with_modifier(2).roll_with_rng(&mut rng);
        let fear = outcome.fear;

        outcome.reroll(DualityDie::Hope, fear).unwrap();
        assert!(outcome.is_crit);
        assert!(!outcome.is_hope && !outcome.is_fear);
        assert_eq!(outcome.total, fear as i32 * 2 + 2);
    }

    #[test]
    fn test_reroll_only_once() {
        let mut rng = StdRng::seed_from_u64(19);
        let mut outcome = DualityRoll::new().roll_with_rng(&mut rng);
        outcome.reroll(DualityDie::Fear, 1).unwrap();
        assert_eq!(
            outcome.reroll(DualityDie::Fear, 12),
            Err(RollError::AlreadyRerolled)
        );
        assert_eq!(
            outcome.reroll_with_rng(DualityDie::Hope, &mut rng),
            Err(RollError::AlreadyRerolled)
        );
    }

    #[test]
    fn test_reroll_fear_die() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut outcome = DualityRoll::new().roll_with_rng(&mut rng);
        let hope = outcome.hope;
        let new_fear = if hope > 1 { hope - 1 } else { hope + 1 };
        outcome.reroll(DualityDie::Fear, new_fear).unwrap();
        assert_flags_consistent(&outcome);
        assert_eq!(outcome.is_hope, hope > new_fear);
        assert_eq!(outcome.is_fear, hope < new_fear);
    }
}
