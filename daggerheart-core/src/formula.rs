//! Shared helpers for numeric coercion and dice-formula text.
//!
//! The resolver layer is deliberately permissive: numeric coercion never
//! fails and formula concatenation passes malformed terms through unchanged.
//! [`parse_term`] is the strict entry point for callers that want to
//! validate a term at the boundary instead.

use crate::dice::DieSize;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for strict formula parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("Empty dice term")]
    Empty,
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
}

/// Coerce text to an integer. Unparsable input contributes zero.
pub fn coerce_int(text: &str) -> i32 {
    text.trim().parse().unwrap_or(0)
}

/// Ensure a formula term carries an explicit leading sign.
pub fn signed(term: &str) -> String {
    let term = term.trim();
    if term.starts_with('+') || term.starts_with('-') {
        term.to_string()
    } else {
        format!("+{term}")
    }
}

/// A single validated `NdS`, `NdS+k`, or `NdS-k` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceTerm {
    pub count: u32,
    pub size: DieSize,
    pub modifier: i32,
}

impl DiceTerm {
    /// Parse a term like `1d8`, `d12`, or `2d6+3`. A bare `dS` means one die.
    pub fn parse(term: &str) -> Result<Self, FormulaError> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Err(FormulaError::Empty);
        }

        let d_pos = term
            .find('d')
            .ok_or_else(|| FormulaError::InvalidNotation(term.clone()))?;

        let count_str = &term[..d_pos];
        let count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse()
                .map_err(|_| FormulaError::InvalidNotation(term.clone()))?
        };
        if count == 0 {
            return Err(FormulaError::InvalidNotation(term.clone()));
        }

        let rest = &term[d_pos + 1..];
        let (sides_str, modifier) = if let Some(plus_pos) = rest.find('+') {
            let modifier: i32 = rest[plus_pos + 1..]
                .parse()
                .map_err(|_| FormulaError::InvalidNotation(term.clone()))?;
            (&rest[..plus_pos], modifier)
        } else if let Some(minus_pos) = rest.find('-') {
            let modifier: i32 = rest[minus_pos + 1..]
                .parse()
                .map_err(|_| FormulaError::InvalidNotation(term.clone()))?;
            (&rest[..minus_pos], -modifier)
        } else {
            (rest, 0)
        };

        let sides: u32 = sides_str
            .parse()
            .map_err(|_| FormulaError::InvalidNotation(term.clone()))?;
        let size = DieSize::from_sides(sides).ok_or(FormulaError::InvalidDieSize(sides))?;

        Ok(DiceTerm {
            count,
            size,
            modifier,
        })
    }

    /// Roll the term and return the total.
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> i32 {
        let dice: u32 = (0..self.count)
            .map(|_| rng.gen_range(1..=self.size.sides()))
            .sum();
        dice as i32 + self.modifier
    }

    pub fn min_roll(&self) -> i32 {
        self.count as i32 + self.modifier
    }

    pub fn max_roll(&self) -> i32 {
        (self.count * self.size.sides()) as i32 + self.modifier
    }
}

impl FromStr for DiceTerm {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceTerm::parse(s)
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifier == 0 {
            write!(f, "{}{}", self.count, self.size)
        } else {
            write!(f, "{}{}{:+}", self.count, self.size, self.modifier)
        }
    }
}

/// Whether the text parses as a single dice term.
pub fn is_dice_term(text: &str) -> bool {
    DiceTerm::parse(text).is_ok()
}
