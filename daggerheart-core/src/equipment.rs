//! Weapons and the equip/unequip flow.
//!
//! A weapon carries the trait it attacks with, a damage formula held as a
//! structured value, and a flat attack bonus. Equipping routes the bonus
//! onto the character's attack value through the replace-by-name path, so
//! equipping twice (or equipping over a stale entry) can never stack the
//! same weapon's bonus.

use crate::modifier::{Matcher, Modifier, StructuredValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six character traits a weapon can attack with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterTrait {
    Agility,
    Strength,
    Finesse,
    Instinct,
    Presence,
    Knowledge,
}

impl fmt::Display for CharacterTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CharacterTrait::Agility => "Agility",
            CharacterTrait::Strength => "Strength",
            CharacterTrait::Finesse => "Finesse",
            CharacterTrait::Instinct => "Instinct",
            CharacterTrait::Presence => "Presence",
            CharacterTrait::Knowledge => "Knowledge",
        };
        write!(f, "{name}")
    }
}

/// How many hands the weapon occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Burden {
    OneHanded,
    TwoHanded,
}

/// Attack range band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Range {
    Melee,
    VeryClose,
    Close,
    Far,
}

/// A weapon with its dynamic damage value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub attack_trait: CharacterTrait,
    pub damage: StructuredValue,
    pub burden: Burden,
    pub range: Range,
    pub tier: u8,
    pub attack_bonus: i32,
}

impl Weapon {
    pub fn new(
        name: impl Into<String>,
        attack_trait: CharacterTrait,
        damage: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            attack_trait,
            damage: StructuredValue::new(damage.into()),
            burden: Burden::OneHanded,
            range: Range::Melee,
            tier: 1,
            attack_bonus: 0,
        }
    }

    pub fn with_burden(mut self, burden: Burden) -> Self {
        self.burden = burden;
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    pub fn with_tier(mut self, tier: u8) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_attack_bonus(mut self, attack_bonus: i32) -> Self {
        self.attack_bonus = attack_bonus;
        self
    }

    /// The modifier this weapon contributes to the wielder's attack value,
    /// named after the weapon so it replaces rather than stacks.
    pub fn attack_modifier(&self) -> Modifier {
        Modifier::new(self.name.clone(), self.attack_bonus)
    }
}

/// Weapon slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Primary,
    Secondary,
}

/// The weapons a character has equipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    primary: Option<Weapon>,
    secondary: Option<Weapon>,
}

impl Loadout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weapon(&self, slot: Slot) -> Option<&Weapon> {
        match slot {
            Slot::Primary => self.primary.as_ref(),
            Slot::Secondary => self.secondary.as_ref(),
        }
    }

    /// Equip a weapon, moving its attack bonus onto `attack`. Any weapon
    /// already in the slot is unequipped first; a same-named stale entry on
    /// `attack` is replaced, not duplicated. Returns the displaced weapon.
    pub fn equip(
        &mut self,
        slot: Slot,
        weapon: Weapon,
        attack: &mut StructuredValue,
    ) -> Option<Weapon> {
        let displaced = self.unequip(slot, attack);
        attack.apply_named_modifier(weapon.attack_modifier());
        match slot {
            Slot::Primary => self.primary = Some(weapon),
            Slot::Secondary => self.secondary = Some(weapon),
        }
        displaced
    }

    /// Remove the slot's weapon and strip its bonus from `attack`.
    pub fn unequip(&mut self, slot: Slot, attack: &mut StructuredValue) -> Option<Weapon> {
        let removed = match slot {
            Slot::Primary => self.primary.take(),
            Slot::Secondary => self.secondary.take(),
        };
        if let Some(weapon) = &removed {
            attack.remove_modifier(Matcher::Name(&weapon.name));
        }
        removed
    }
}

/// Look up a standard weapon by name, case-insensitively.
pub fn get_weapon(name: &str) -> Option<Weapon> {
    let name_lower = name.to_lowercase();
    STANDARD_WEAPONS
        .iter()
        .find(|w| w.name.to_lowercase() == name_lower)
        .cloned()
}

lazy_static::lazy_static! {
    /// The tier-1 weapon table.
    pub static ref STANDARD_WEAPONS: Vec<Weapon> = vec![
        Weapon::new("Broadsword", CharacterTrait::Agility, "d8"),
        Weapon::new("Longsword", CharacterTrait::Agility, "d8+3")
            .with_burden(Burden::TwoHanded),
        Weapon::new("Battleaxe", CharacterTrait::Strength, "d10+3")
            .with_burden(Burden::TwoHanded),
        Weapon::new("Greatsword", CharacterTrait::Strength, "d10+3")
            .with_burden(Burden::TwoHanded),
        Weapon::new("Mace", CharacterTrait::Strength, "d8+1"),
        Weapon::new("Warhammer", CharacterTrait::Strength, "d12+3")
            .with_burden(Burden::TwoHanded),
        Weapon::new("Dagger", CharacterTrait::Finesse, "d8+1"),
        Weapon::new("Quarterstaff", CharacterTrait::Instinct, "d10+3")
            .with_burden(Burden::TwoHanded),
        Weapon::new("Rapier", CharacterTrait::Presence, "d8"),
        Weapon::new("Halberd", CharacterTrait::Strength, "d10+2")
            .with_burden(Burden::TwoHanded),
        Weapon::new("Crossbow", CharacterTrait::Finesse, "d6+1")
            .with_range(Range::Far),
        Weapon::new("Longbow", CharacterTrait::Agility, "d8+3")
            .with_burden(Burden::TwoHanded)
            .with_range(Range::Far),
        Weapon::new("Shortsword", CharacterTrait::Agility, "d8"),
        Weapon::new("Round Shield", CharacterTrait::Strength, "d4"),
        Weapon::new("Small Dagger", CharacterTrait::Finesse, "d8")
            .with_range(Range::VeryClose),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::DiceTerm;
    use crate::modifier::ModifierValue;

    #[test]
    fn test_get_weapon_case_insensitive() {
        let longsword = get_weapon("Longsword").unwrap();
        assert_eq!(longsword.attack_trait, CharacterTrait::Agility);
        assert_eq!(longsword.burden, Burden::TwoHanded);

        let dagger = get_weapon("dagger").unwrap();
        assert_eq!(dagger.attack_trait, CharacterTrait::Finesse);

        assert!(get_weapon("Chair Leg").is_none());
    }

    #[test]
    fn test_standard_table_damage_parses() {
        for weapon in STANDARD_WEAPONS.iter() {
            let base = match weapon.damage.base_value() {
                ModifierValue::Text(text) => text.clone(),
                other => panic!("{}: non-formula damage {other:?}", weapon.name),
            };
            DiceTerm::parse(&base)
                .unwrap_or_else(|e| panic!("{}: bad damage formula: {e}", weapon.name));
        }
    }

    #[test]
    fn test_equip_applies_named_bonus() {
        let mut attack = StructuredValue::new(2);
        let mut loadout = Loadout::new();
        let sword = get_weapon("Mace").unwrap().with_attack_bonus(1);

        loadout.equip(Slot::Primary, sword, &mut attack);
        assert_eq!(attack.value_int(), 3);
        assert_eq!(attack.modifiers().len(), 1);
        assert_eq!(attack.modifiers()[0].name, "Mace");
    }

    #[test]
    fn test_reequip_never_stacks() {
        let mut attack = StructuredValue::new(0);
        let mut loadout = Loadout::new();
        let mace = get_weapon("Mace").unwrap().with_attack_bonus(1);

        loadout.equip(Slot::Primary, mace.clone(), &mut attack);
        loadout.equip(Slot::Primary, mace.clone(), &mut attack);
        loadout.equip(Slot::Primary, mace, &mut attack);
        assert_eq!(attack.modifiers().len(), 1);
        assert_eq!(attack.value_int(), 1);
    }

    #[test]
    fn test_equip_replaces_stale_entry() {
        // a stale same-named modifier left by an older document version
        let mut attack = StructuredValue::new(0);
        attack.add_modifier(Modifier::new("Mace", 5));

        let mut loadout = Loadout::new();
        loadout.equip(
            Slot::Primary,
            get_weapon("Mace").unwrap().with_attack_bonus(1),
            &mut attack,
        );
        assert_eq!(attack.modifiers().len(), 1);
        assert_eq!(attack.value_int(), 1);
    }

    #[test]
    fn test_swap_weapons_swaps_bonuses() {
        let mut attack = StructuredValue::new(1);
        let mut loadout = Loadout::new();

        loadout.equip(
            Slot::Primary,
            get_weapon("Mace").unwrap().with_attack_bonus(1),
            &mut attack,
        );
        let displaced = loadout.equip(
            Slot::Primary,
            get_weapon("Rapier").unwrap().with_attack_bonus(2),
            &mut attack,
        );
        assert_eq!(displaced.unwrap().name, "Mace");
        assert_eq!(attack.modifiers().len(), 1);
        assert_eq!(attack.modifiers()[0].name, "Rapier");
        assert_eq!(attack.value_int(), 3);
    }

    #[test]
    fn test_unequip_strips_bonus() {
        let mut attack = StructuredValue::new(2);
        let mut loadout = Loadout::new();
        loadout.equip(
            Slot::Primary,
            get_weapon("Longsword").unwrap().with_attack_bonus(1),
            &mut attack,
        );
        let removed = loadout.unequip(Slot::Primary, &mut attack);
        assert_eq!(removed.unwrap().name, "Longsword");
        assert!(attack.modifiers().is_empty());
        assert_eq!(attack.value_int(), 2);

        assert!(loadout.unequip(Slot::Primary, &mut attack).is_none());
    }

    #[test]
    fn test_weapon_damage_modifiers() {
        let mut weapon = get_weapon("Broadsword").unwrap();
        weapon
            .damage
            .apply_named_modifier(Modifier::new("Flaming", "1d4"));
        assert_eq!(
            weapon.damage.value(),
            &ModifierValue::Text("d8 +1d4".to_string())
        );
    }

    #[test]
    fn test_slots_are_independent() {
        let mut attack = StructuredValue::new(0);
        let mut loadout = Loadout::new();
        loadout.equip(
            Slot::Primary,
            get_weapon("Broadsword").unwrap().with_attack_bonus(1),
            &mut attack,
        );
        loadout.equip(
            Slot::Secondary,
            get_weapon("Round Shield").unwrap().with_attack_bonus(2),
            &mut attack,
        );
        assert_eq!(attack.modifiers().len(), 2);
        assert_eq!(attack.value_int(), 3);
        assert!(loadout.weapon(Slot::Primary).is_some());
        assert!(loadout.weapon(Slot::Secondary).is_some());
    }
}
