//! Fixed enumeration of purchasable fuel grades.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the fixed set of fuel grades sold at the site.
///
/// The set is closed: tanks, the price table, and per-grade statistics are
/// all keyed by it. Serialized as snake_case strings so it can key JSON maps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelGrade {
    Ai92,
    Ai95,
    Ai98,
    Diesel,
}

impl FuelGrade {
    /// Every grade the site knows about, in display order.
    pub const ALL: [FuelGrade; 4] = [
        FuelGrade::Ai92,
        FuelGrade::Ai95,
        FuelGrade::Ai98,
        FuelGrade::Diesel,
    ];

    /// Operator-facing label.
    pub fn label(self) -> &'static str {
        match self {
            FuelGrade::Ai92 => "AI-92",
            FuelGrade::Ai95 => "AI-95",
            FuelGrade::Ai98 => "AI-98",
            FuelGrade::Diesel => "Diesel",
        }
    }
}

impl core::fmt::Display for FuelGrade {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse failure for [`FuelGrade`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGrade(pub String);

impl core::fmt::Display for UnknownGrade {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown fuel grade: {}", self.0)
    }
}

impl std::error::Error for UnknownGrade {}

impl FromStr for FuelGrade {
    type Err = UnknownGrade;

    /// Accepts both the serialized form (`ai95`) and the label (`AI-95`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ai92" | "ai-92" | "92" => Ok(FuelGrade::Ai92),
            "ai95" | "ai-95" | "95" => Ok(FuelGrade::Ai95),
            "ai98" | "ai-98" | "98" => Ok(FuelGrade::Ai98),
            "diesel" | "dt" => Ok(FuelGrade::Diesel),
            other => Err(UnknownGrade(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_and_wire_forms() {
        assert_eq!("ai95".parse::<FuelGrade>().unwrap(), FuelGrade::Ai95);
        assert_eq!("AI-98".parse::<FuelGrade>().unwrap(), FuelGrade::Ai98);
        assert_eq!("Diesel".parse::<FuelGrade>().unwrap(), FuelGrade::Diesel);
        assert!("ai100".parse::<FuelGrade>().is_err());
    }

    #[test]
    fn serializes_as_snake_case_string() {
        let json = serde_json::to_string(&FuelGrade::Ai92).unwrap();
        assert_eq!(json, "\"ai92\"");
    }
}
