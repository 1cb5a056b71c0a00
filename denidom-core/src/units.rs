//! Measurement units used in Russian construction norms
//!
//! Units travel as their abbreviation (`"100 м²"`, `"чел-ч"`), so estimate
//! items stored as JSON keep the text the user typed. Anything that does not
//! parse becomes [`MeasureUnit::Other`] and round-trips verbatim.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MeasureUnit {
    // Linear
    Meter,
    Kilometer,
    LinearMeter,
    LinearMeter100,

    // Area
    SquareMeter,
    SquareMeter100,
    SquareMeter1000,
    Hectare,

    // Volume
    CubicMeter,
    CubicMeter100,
    CubicMeter1000,
    Liter,

    // Mass
    Kilogram,
    Kilogram100,
    Ton,

    // Piece
    Piece,
    Piece10,
    Piece100,
    Piece1000,
    Set,
    ConnectionPoint,
    Node,
    Opening,

    // Time
    ManHour,
    MachineHour,
    Shift,

    Other(String),
}

/// Coarse grouping used by feature extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitClass {
    Area,
    Volume,
    Piece,
    Other,
}

/// Known unit with its abbreviation, full name and accepted spellings
struct UnitEntry {
    unit: MeasureUnit,
    abbreviation: &'static str,
    full_name: &'static str,
    spellings: &'static [&'static str],
}

fn entry(
    unit: MeasureUnit,
    abbreviation: &'static str,
    full_name: &'static str,
    spellings: &'static [&'static str],
) -> UnitEntry {
    UnitEntry {
        unit,
        abbreviation,
        full_name,
        spellings,
    }
}

static UNIT_TABLE: Lazy<Vec<UnitEntry>> = Lazy::new(|| {
    vec![
        entry(MeasureUnit::Meter, "м", "метр", &["м", "м.", "метр"]),
        entry(MeasureUnit::Kilometer, "км", "километр", &["км", "км."]),
        entry(MeasureUnit::LinearMeter, "п.м", "погонный метр", &["п.м", "п.м.", "пм", "м.п."]),
        entry(MeasureUnit::LinearMeter100, "100 п.м", "100 погонных метров", &["100 п.м", "100 п.м.", "100пм", "100 м"]),
        entry(MeasureUnit::SquareMeter, "м²", "квадратный метр", &["м²", "м2", "кв.м", "кв.м.", "кв м", "m2"]),
        entry(MeasureUnit::SquareMeter100, "100 м²", "100 квадратных метров", &["100 м²", "100 м2", "100 кв.м", "100кв.м"]),
        entry(MeasureUnit::SquareMeter1000, "1000 м²", "1000 квадратных метров", &["1000 м²", "1000 м2", "1000 кв.м"]),
        entry(MeasureUnit::Hectare, "га", "гектар", &["га"]),
        entry(MeasureUnit::CubicMeter, "м³", "кубический метр", &["м³", "м3", "куб.м", "куб.м.", "куб м", "m3"]),
        entry(MeasureUnit::CubicMeter100, "100 м³", "100 кубических метров", &["100 м³", "100 м3", "100 куб.м"]),
        entry(MeasureUnit::CubicMeter1000, "1000 м³", "1000 кубических метров", &["1000 м³", "1000 м3", "1000 куб.м"]),
        entry(MeasureUnit::Liter, "л", "литр", &["л", "л.", "литр"]),
        entry(MeasureUnit::Kilogram, "кг", "килограмм", &["кг", "кг."]),
        entry(MeasureUnit::Kilogram100, "100 кг", "100 килограмм", &["100 кг", "100кг"]),
        entry(MeasureUnit::Ton, "т", "тонна", &["т", "т.", "тн", "тонна"]),
        entry(MeasureUnit::Piece, "шт", "штука", &["шт", "шт.", "штука"]),
        entry(MeasureUnit::Piece10, "10 шт", "10 штук", &["10 шт", "10шт"]),
        entry(MeasureUnit::Piece100, "100 шт", "100 штук", &["100 шт", "100шт"]),
        entry(MeasureUnit::Piece1000, "1000 шт", "1000 штук", &["1000 шт", "1000шт"]),
        entry(MeasureUnit::Set, "компл", "комплект", &["компл", "компл.", "комплект"]),
        entry(MeasureUnit::ConnectionPoint, "точка", "точка присоединения", &["точка", "точек"]),
        entry(MeasureUnit::Node, "узел", "узел", &["узел"]),
        entry(MeasureUnit::Opening, "проём", "проём", &["проём", "проем"]),
        entry(MeasureUnit::ManHour, "чел-ч", "человеко-час", &["чел-ч", "чел.ч", "чел-час", "человеко-час"]),
        entry(MeasureUnit::MachineHour, "маш-ч", "машино-час", &["маш-ч", "маш.ч", "маш-час", "машино-час"]),
        entry(MeasureUnit::Shift, "смена", "смена", &["смена", "см."]),
    ]
});

impl MeasureUnit {
    /// Parse a Russian abbreviation; `None` for unknown spellings
    pub fn parse_ru(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        UNIT_TABLE
            .iter()
            .find(|e| e.spellings.iter().any(|sp| *sp == needle))
            .map(|e| e.unit.clone())
    }

    fn table_entry(&self) -> Option<&'static UnitEntry> {
        UNIT_TABLE.iter().find(|e| e.unit == *self)
    }

    /// Short form printed in documents
    pub fn abbreviation(&self) -> &str {
        match self {
            Self::Other(s) => s,
            unit => unit.table_entry().map(|e| e.abbreviation).unwrap_or(""),
        }
    }

    pub fn full_name(&self) -> &str {
        match self {
            Self::Other(s) => s,
            unit => unit.table_entry().map(|e| e.full_name).unwrap_or(""),
        }
    }

    /// Number of base units per unit, e.g. 100 for `100 м²`
    pub fn factor(&self) -> f64 {
        match self {
            Self::LinearMeter100
            | Self::SquareMeter100
            | Self::CubicMeter100
            | Self::Kilogram100
            | Self::Piece100 => 100.0,
            Self::SquareMeter1000 | Self::CubicMeter1000 | Self::Piece1000 => 1000.0,
            Self::Piece10 => 10.0,
            Self::Hectare => 10_000.0,
            _ => 1.0,
        }
    }

    pub fn is_area(&self) -> bool {
        matches!(
            self,
            Self::SquareMeter | Self::SquareMeter100 | Self::SquareMeter1000 | Self::Hectare
        )
    }

    pub fn is_volume(&self) -> bool {
        matches!(
            self,
            Self::CubicMeter | Self::CubicMeter100 | Self::CubicMeter1000 | Self::Liter
        )
    }

    pub fn is_time(&self) -> bool {
        matches!(self, Self::ManHour | Self::MachineHour | Self::Shift)
    }

    pub fn is_piece(&self) -> bool {
        matches!(
            self,
            Self::Piece
                | Self::Piece10
                | Self::Piece100
                | Self::Piece1000
                | Self::Set
                | Self::ConnectionPoint
                | Self::Node
                | Self::Opening
        )
    }

    pub fn class(&self) -> UnitClass {
        if self.is_area() {
            UnitClass::Area
        } else if self.is_volume() {
            UnitClass::Volume
        } else if self.is_piece() {
            UnitClass::Piece
        } else {
            UnitClass::Other
        }
    }
}

impl Default for MeasureUnit {
    fn default() -> Self {
        Self::Piece
    }
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl From<&str> for MeasureUnit {
    fn from(s: &str) -> Self {
        Self::parse_ru(s).unwrap_or_else(|| Self::Other(s.trim().to_string()))
    }
}

impl From<String> for MeasureUnit {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<MeasureUnit> for String {
    fn from(unit: MeasureUnit) -> Self {
        unit.abbreviation().to_string()
    }
}
