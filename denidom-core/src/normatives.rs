//! Normative bases (ФЕР / ГЭСН / ТЕР / ТСН) and their collections
//!
//! Codes look like `ФЕР15-02-016-01`: base prefix, two-digit collection,
//! then section/table/row. Latin transliterations (`FER15-...`) are accepted.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormativeBase {
    FER,
    GESN,
    TER,
    TSN,
    /// ФЕРм: equipment installation
    FERm,
    /// ФЕРп: commissioning
    FERp,
    /// ФЕРр: repair works
    FERr,
}

/// Prefixes in match order; longer prefixes precede the ones they extend
const PREFIXES: &[(&str, &str, NormativeBase)] = &[
    ("ГЭСН", "GESN", NormativeBase::GESN),
    ("ФЕРМ", "FERM", NormativeBase::FERm),
    ("ФЕРП", "FERP", NormativeBase::FERp),
    ("ФЕРР", "FERR", NormativeBase::FERr),
    ("ФЕР", "FER", NormativeBase::FER),
    ("ТЕР", "TER", NormativeBase::TER),
    ("ТСН", "TSN", NormativeBase::TSN),
];

impl NormativeBase {
    pub const ALL: [NormativeBase; 7] = [
        NormativeBase::FER,
        NormativeBase::GESN,
        NormativeBase::TER,
        NormativeBase::TSN,
        NormativeBase::FERm,
        NormativeBase::FERp,
        NormativeBase::FERr,
    ];

    /// Cyrillic short name as printed in documents
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FER => "ФЕР",
            Self::GESN => "ГЭСН",
            Self::TER => "ТЕР",
            Self::TSN => "ТСН",
            Self::FERm => "ФЕРм",
            Self::FERp => "ФЕРп",
            Self::FERr => "ФЕРр",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            Self::FER => "Федеральные единичные расценки",
            Self::GESN => "Государственные элементные сметные нормы",
            Self::TER => "Территориальные единичные расценки",
            Self::TSN => "Территориальные сметные нормативы",
            Self::FERm => "ФЕР на монтаж оборудования",
            Self::FERp => "ФЕР на пусконаладочные работы",
            Self::FERr => "ФЕР на ремонтно-строительные работы",
        }
    }

    /// Storage form (`base_type` column)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FER => "FER",
            Self::GESN => "GESN",
            Self::TER => "TER",
            Self::TSN => "TSN",
            Self::FERm => "FERm",
            Self::FERp => "FERp",
            Self::FERr => "FERr",
        }
    }

    /// Detect the base from a normative code
    pub fn from_code_prefix(code: &str) -> Option<Self> {
        let upper = code.trim().to_uppercase();
        PREFIXES
            .iter()
            .find(|(cyrillic, latin, _)| upper.starts_with(cyrillic) || upper.starts_with(latin))
            .map(|(_, _, base)| *base)
    }
}

impl fmt::Display for NormativeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for NormativeBase {
    type Err = CoreError;

    /// Accepts the storage form or the Cyrillic display name, case-insensitively
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .find(|b| {
                b.as_str().eq_ignore_ascii_case(needle)
                    || b.display_name().to_lowercase() == needle.to_lowercase()
            })
            .copied()
            .ok_or_else(|| CoreError::Parse(format!("unknown normative base '{}'", s)))
    }
}

/// Collection prefix of a code: its first five characters (`ФЕР15`)
///
/// `None` for codes shorter than five characters.
pub fn collection(code: &str) -> Option<&str> {
    let mut indices = code.char_indices().map(|(i, _)| i).chain(std::iter::once(code.len()));
    indices.nth(5).map(|end| &code[..end])
}

/// Numbered collection of a normative base
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormativeCollection {
    pub code: &'static str,
    pub name: &'static str,
    pub base_type: NormativeBase,
}

const FER_COLLECTIONS: &[(&str, &str)] = &[
    ("01", "Земляные работы"),
    ("06", "Бетонные и железобетонные конструкции монолитные"),
    ("07", "Бетонные и железобетонные конструкции сборные"),
    ("08", "Конструкции из кирпича и блоков"),
    ("09", "Металлические конструкции"),
    ("10", "Деревянные конструкции"),
    ("11", "Полы"),
    ("12", "Кровли"),
    ("15", "Отделочные работы"),
    ("16", "Трубопроводы внутренние"),
    ("17", "Водопровод и канализация"),
    ("18", "Отопление"),
    ("20", "Вентиляция и кондиционирование"),
    ("26", "Теплоизоляционные работы"),
];

/// Predefined ФЕР collections
pub fn fer_collections() -> Vec<NormativeCollection> {
    FER_COLLECTIONS
        .iter()
        .map(|&(code, name)| NormativeCollection {
            code,
            name,
            base_type: NormativeBase::FER,
        })
        .collect()
}

/// Name of the ФЕР/ГЭСН/ТЕР collection a code belongs to, if predefined
pub fn collection_name(code: &str) -> Option<&'static str> {
    let number: String = code
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .chars()
        .take(2)
        .collect();
    FER_COLLECTIONS
        .iter()
        .find(|(c, _)| *c == number)
        .map(|(_, name)| *name)
}
