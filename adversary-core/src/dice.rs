//! Dice notation.
//!
//! Stat blocks only ever print one dice term with an optional flat bonus:
//! "2d6+3" for damage and "19d12+133" for hit dice. [`Dice`] holds exactly
//! that shape. Conversion never rolls, so dice are parsed, averaged, grown
//! by extra dice, and rendered back.

use crate::patterns;
use regex::Captures;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Empty dice notation")]
    Empty,
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
}

/// Die sizes that appear in stat blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieType {
    pub fn sides(&self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
        }
    }

    pub fn from_sides(sides: u32) -> Result<DieType, DiceError> {
        match sides {
            4 => Ok(DieType::D4),
            6 => Ok(DieType::D6),
            8 => Ok(DieType::D8),
            10 => Ok(DieType::D10),
            12 => Ok(DieType::D12),
            20 => Ok(DieType::D20),
            other => Err(DiceError::InvalidDieSize(other)),
        }
    }

    /// Average of one die, doubled to stay in integers (d6 = 7).
    pub fn doubled_average(&self) -> u32 {
        self.sides() + 1
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// One dice term plus a flat modifier, e.g. `2d6+3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    pub count: u32,
    pub die: DieType,
    #[serde(default)]
    pub modifier: i32,
}

impl Dice {
    pub fn new(count: u32, die: DieType, modifier: i32) -> Self {
        Self {
            count,
            die,
            modifier,
        }
    }

    /// Parse a whole string such as "2d8 + 4" or "1d6 − 1".
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        if notation.trim().is_empty() {
            return Err(DiceError::Empty);
        }
        let caps = patterns::DICE_NOTATION
            .captures(notation)
            .ok_or_else(|| DiceError::InvalidNotation(notation.to_string()))?;
        Self::from_captures(&caps)
    }

    /// Build dice from a match carrying `count`, `size`, and optionally
    /// `sign` and `flat` groups. The damage layers share these group names.
    pub fn from_captures(caps: &Captures) -> Result<Self, DiceError> {
        let invalid = || DiceError::InvalidNotation(caps[0].to_string());
        let count: u32 = caps
            .name("count")
            .ok_or_else(invalid)?
            .as_str()
            .parse()
            .map_err(|_| invalid())?;
        let sides: u32 = caps
            .name("size")
            .ok_or_else(invalid)?
            .as_str()
            .parse()
            .map_err(|_| invalid())?;
        let die = DieType::from_sides(sides)?;
        let flat: i32 = match caps.name("flat") {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 0,
        };
        // Anything but '+' is one of the minus glyphs
        let modifier = match caps.name("sign").map(|m| m.as_str()) {
            Some("+") | None => flat,
            Some(_) => -flat,
        };
        Ok(Self::new(count, die, modifier))
    }

    /// Average roll, doubled so comparisons stay integral.
    pub fn doubled_average(&self) -> i64 {
        i64::from(self.count) * i64::from(self.die.doubled_average()) + 2 * i64::from(self.modifier)
    }

    /// Average roll rounded down, as stat blocks print it.
    pub fn average(&self) -> i64 {
        self.doubled_average().div_euclid(2)
    }

    /// The same dice with `extra` more of the same size.
    pub fn with_extra_dice(&self, extra: u32) -> Self {
        Self {
            count: self.count.saturating_add(extra),
            ..*self
        }
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.die)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "-{}", m.unsigned_abs()),
        }
    }
}
