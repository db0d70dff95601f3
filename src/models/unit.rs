use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit of measure offered when adding an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Unit {
    #[default]
    #[serde(rename = "pièce(s)")]
    Piece,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "L")]
    Liter,
    #[serde(rename = "mL")]
    Milliliter,
    #[serde(rename = "paquet(s)")]
    Pack,
    #[serde(rename = "boîte(s)")]
    Tin,
    #[serde(rename = "bouteille(s)")]
    Bottle,
}

impl Unit {
    pub const ALL: [Unit; 8] = [
        Unit::Piece,
        Unit::Kilogram,
        Unit::Gram,
        Unit::Liter,
        Unit::Milliliter,
        Unit::Pack,
        Unit::Tin,
        Unit::Bottle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Unit::Piece => "pièce(s)",
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Liter => "L",
            Unit::Milliliter => "mL",
            Unit::Pack => "paquet(s)",
            Unit::Tin => "boîte(s)",
            Unit::Bottle => "bouteille(s)",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Unit {
    type Err = String;

    // "L" and "mL" differ from "l"/"ml" only by case, so matching is exact
    // first and case-insensitive second.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Unit::ALL
            .iter()
            .find(|u| u.label() == wanted)
            .or_else(|| {
                let lower = wanted.to_lowercase();
                Unit::ALL.iter().find(|u| u.label().to_lowercase() == lower)
            })
            .copied()
            .ok_or_else(|| {
                let valid: Vec<&str> = Unit::ALL.iter().map(|u| u.label()).collect();
                format!("Invalid unit '{}'. Valid options: {}", s, valid.join(", "))
            })
    }
}
