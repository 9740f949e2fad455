//! Named, toggleable modifiers and the structured values that carry them.
//!
//! Traits, to-hit bonuses, and damage formulas are all stored as a base
//! value plus an ordered list of named modifiers that can be toggled on and
//! off. Numeric attributes total by integer sum; damage attributes total by
//! formula concatenation. The list functions here are pure: they return new
//! lists and leave their inputs untouched, so callers keep copy-on-write
//! discipline over actor data.

use crate::formula::{coerce_int, signed};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A modifier's value: a flat number or a dice-formula fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModifierValue {
    Number(i32),
    Text(String),
}

impl ModifierValue {
    /// Coerce to an integer contribution. Unparsable text contributes zero.
    pub fn coerce_int(&self) -> i32 {
        match self {
            ModifierValue::Number(n) => *n,
            ModifierValue::Text(text) => coerce_int(text),
        }
    }

    /// Whether the value carries anything worth appending to a formula.
    /// Zero and blank text both read as absent, matching how the host's
    /// sheet leaves untouched modifier rows empty.
    pub fn is_present(&self) -> bool {
        match self {
            ModifierValue::Number(n) => *n != 0,
            ModifierValue::Text(text) => !text.trim().is_empty(),
        }
    }
}

impl Default for ModifierValue {
    fn default() -> Self {
        ModifierValue::Number(0)
    }
}

impl From<i32> for ModifierValue {
    fn from(n: i32) -> Self {
        ModifierValue::Number(n)
    }
}

impl From<&str> for ModifierValue {
    fn from(text: &str) -> Self {
        ModifierValue::Text(text.to_string())
    }
}

impl From<String> for ModifierValue {
    fn from(text: String) -> Self {
        ModifierValue::Text(text)
    }
}

impl fmt::Display for ModifierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierValue::Number(n) => write!(f, "{n}"),
            ModifierValue::Text(text) => write!(f, "{text}"),
        }
    }
}

fn default_name() -> String {
    "Modifier".to_string()
}

fn default_enabled() -> bool {
    true
}

/// A named, toggleable adjustment on top of a base value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub value: ModifierValue,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Modifier {
    pub fn new(name: impl Into<String>, value: impl Into<ModifierValue>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            value: value.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Default for Modifier {
    fn default() -> Self {
        Self::new(default_name(), 0)
    }
}

/// How [`remove`] selects entries: by id (all matches) or by exact name
/// (first match only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher<'a> {
    Id(Uuid),
    Name(&'a str),
}

/// Sum a numeric base with every enabled modifier. Text values coerce
/// through [`coerce_int`], so unparsable entries contribute nothing.
pub fn total_numeric(base: i32, modifiers: &[Modifier]) -> i32 {
    base + modifiers
        .iter()
        .filter(|m| m.enabled)
        .map(|m| m.value.coerce_int())
        .sum::<i32>()
}

/// Concatenate a damage formula from a base and every enabled, value-bearing
/// modifier, each normalized to carry an explicit sign. An empty base
/// defaults to `1d8`. List order is preserved, never sorted. Malformed terms
/// pass through unchanged.
pub fn total_formula(base: &str, modifiers: &[Modifier]) -> String {
    let base = base.trim();
    let mut out = if base.is_empty() {
        "1d8".to_string()
    } else {
        base.to_string()
    };
    for modifier in modifiers {
        if !modifier.enabled || !modifier.value.is_present() {
            continue;
        }
        let term = match &modifier.value {
            ModifierValue::Number(n) => format!("{n:+}"),
            ModifierValue::Text(text) => signed(text),
        };
        out.push(' ');
        out.push_str(&term);
    }
    out
}

/// Append a modifier, returning a new list. No deduplication happens here;
/// callers that must not stack a bonus twice go through [`apply_named`].
pub fn upsert(list: &[Modifier], modifier: Modifier) -> Vec<Modifier> {
    let mut out = list.to_vec();
    out.push(modifier);
    out
}

/// Remove matching entries, returning a new list with survivor order
/// preserved.
pub fn remove(list: &[Modifier], matcher: Matcher<'_>) -> Vec<Modifier> {
    match matcher {
        Matcher::Id(id) => list.iter().filter(|m| m.id != id).cloned().collect(),
        Matcher::Name(name) => {
            let mut removed = false;
            let mut out = Vec::with_capacity(list.len());
            for modifier in list {
                if !removed && modifier.name == name {
                    removed = true;
                    continue;
                }
                out.push(modifier.clone());
            }
            out
        }
    }
}

/// Apply a modifier under its name: replace an existing same-named entry in
/// place, append otherwise. This is the atomic path equip/apply flows must
/// use so the same bonus can never stack twice.
pub fn apply_named(list: &[Modifier], modifier: Modifier) -> Vec<Modifier> {
    let mut out = list.to_vec();
    match out.iter().position(|m| m.name == modifier.name) {
        Some(pos) => out[pos] = modifier,
        None => out.push(modifier),
    }
    out
}

/// A base value, its modifier list, and a cached total.
///
/// The cached total is recomputed before every mutating method returns, so
/// it can never observably diverge from its inputs. Hosts that deserialize
/// a stale document should call [`refresh`](Self::refresh) before trusting
/// the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredValue {
    base_value: ModifierValue,
    modifiers: Vec<Modifier>,
    value: ModifierValue,
}

impl StructuredValue {
    pub fn new(base_value: impl Into<ModifierValue>) -> Self {
        let mut sv = Self {
            base_value: base_value.into(),
            modifiers: Vec::new(),
            value: ModifierValue::Number(0),
        };
        sv.recompute();
        sv
    }

    pub fn base_value(&self) -> &ModifierValue {
        &self.base_value
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// The cached total.
    pub fn value(&self) -> &ModifierValue {
        &self.value
    }

    /// The total as an integer. Formula totals coerce to zero.
    pub fn value_int(&self) -> i32 {
        self.value.coerce_int()
    }

    pub fn set_base(&mut self, base_value: impl Into<ModifierValue>) {
        self.base_value = base_value.into();
        self.recompute();
    }

    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers = upsert(&self.modifiers, modifier);
        self.recompute();
    }

    pub fn apply_named_modifier(&mut self, modifier: Modifier) {
        self.modifiers = apply_named(&self.modifiers, modifier);
        self.recompute();
    }

    pub fn remove_modifier(&mut self, matcher: Matcher<'_>) {
        self.modifiers = remove(&self.modifiers, matcher);
        self.recompute();
    }

    pub fn set_modifier_enabled(&mut self, id: Uuid, enabled: bool) {
        if let Some(modifier) = self.modifiers.iter_mut().find(|m| m.id == id) {
            modifier.enabled = enabled;
        }
        self.recompute();
    }

    /// Recompute the cached total from the base and modifier list.
    pub fn refresh(&mut self) {
        self.recompute();
    }

    fn recompute(&mut self) {
        self.value = match &self.base_value {
            ModifierValue::Number(base) => {
                ModifierValue::Number(total_numeric(*base, &self.modifiers))
            }
            ModifierValue::Text(base) => {
                ModifierValue::Text(total_formula(base, &self.modifiers))
            }
        };
    }
}

/// A sheet value as the host stores it: a bare scalar on untouched fields,
/// or a structured value once modifiers exist. The explicit variants replace
/// the shape-sniffing the host's sheet code used to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Structured(StructuredValue),
    Scalar(ModifierValue),
}

impl Value {
    /// Upgrade to a structured value. A scalar becomes the base with an
    /// empty modifier list; an already-structured value is returned as is.
    pub fn to_structured(self) -> StructuredValue {
        match self {
            Value::Scalar(scalar) => StructuredValue::new(scalar),
            Value::Structured(sv) => sv,
        }
    }

    /// The effective total, however the value is stored.
    pub fn total_int(&self) -> i32 {
        match self {
            Value::Scalar(scalar) => scalar.coerce_int(),
            Value::Structured(sv) => sv.value_int(),
        }
    }
}
