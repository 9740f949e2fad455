//! Daggerheart duality dice and modifier resolution engine.
//!
//! This crate provides the rules math of a Daggerheart game system,
//! independent of any tabletop host:
//! - Advantage/disadvantage pool normalization and pairwise cancellation
//! - Duality (Hope/Fear) roll outcomes, rerolls, forced criticals
//! - Named, toggleable modifiers over numeric and dice-formula bases
//! - Weapon equip/unequip flows that can never stack the same bonus twice
//!
//! Everything is a pure function over plain data: state is passed in and
//! returned, never held. Rolling accepts any [`rand::Rng`] so results are
//! deterministic under test.
//!
//! # Quick Start
//!
//! ```
//! use daggerheart_core::{DualityRoll, Modifier, StructuredValue};
//!
//! let mut agility = StructuredValue::new(2);
//! agility.add_modifier(Modifier::new("Blessing", 1));
//!
//! let outcome = DualityRoll::new()
//!     .with_advantage(2u32)
//!     .with_disadvantage(1u32)
//!     .with_modifier(agility.value_int())
//!     .roll();
//!
//! assert_eq!(outcome.is_crit, outcome.hope == outcome.fear);
//! ```

pub mod dice;
pub mod duality;
pub mod equipment;
pub mod formula;
pub mod modifier;

// Primary public API
pub use dice::{cancel, DicePool, DieSize, KeepMode, NetPools, PoolInput, RollSide};
pub use duality::{DualityDie, DualityOutcome, DualityRoll, RollError};
pub use equipment::{get_weapon, Loadout, Slot, Weapon};
pub use modifier::{
    apply_named, remove, total_formula, total_numeric, upsert, Matcher, Modifier, ModifierValue,
    StructuredValue, Value,
};
