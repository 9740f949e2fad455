//! Demo of duality rolls with advantage, disadvantage, and weapon bonuses.

use daggerheart_core::dice::{DicePool, DieSize, KeepMode};
use daggerheart_core::duality::DualityRoll;
use daggerheart_core::equipment::{get_weapon, Loadout, Slot};
use daggerheart_core::modifier::{Modifier, StructuredValue};

fn main() {
    println!("=== Daggerheart duality rolls ===\n");

    roll_and_print("Plain roll", DualityRoll::new());
    roll_and_print("With +3 trait", DualityRoll::new().with_modifier(3));
    roll_and_print(
        "2 advantage, 1 disadvantage",
        DualityRoll::new().with_advantage(2u32).with_disadvantage(1u32),
    );
    roll_and_print(
        "Mixed-size disadvantage",
        DualityRoll::new().with_disadvantage(DicePool::of(DieSize::D8, 2)),
    );
    roll_and_print("Reaction roll", DualityRoll::new().as_reaction());

    println!("\n=== Weapon attack ===\n");

    let mut agility = StructuredValue::new(2);
    agility.add_modifier(Modifier::new("Blessing", 1));

    let mut attack = StructuredValue::new(agility.value_int());
    let mut loadout = Loadout::new();
    let weapon = get_weapon("Longsword").unwrap().with_attack_bonus(1);
    println!(
        "Equipping {} ({} {})",
        weapon.name, weapon.attack_trait, weapon.damage.value()
    );
    loadout.equip(Slot::Primary, weapon, &mut attack);

    roll_and_print(
        "Longsword attack",
        DualityRoll::new().with_modifier(attack.value_int()),
    );
}

fn roll_and_print(description: &str, roll: DualityRoll) {
    let net = roll.net_pools();
    let outcome = roll.roll();
    let category = if outcome.is_crit {
        "CRITICAL"
    } else if outcome.is_hope {
        "with Hope"
    } else if outcome.is_fear {
        "with Fear"
    } else {
        "(no Hope/Fear)"
    };
    let bonus = net
        .advantage
        .formula_fragment(KeepMode::Highest)
        .or_else(|| net.disadvantage.formula_fragment(KeepMode::Lowest))
        .unwrap_or_else(|| "none".to_string());
    println!(
        "{description}: Hope {} / Fear {} (bonus dice: {bonus}) => {} {category}",
        outcome.hope, outcome.fear, outcome.total
    );
}
