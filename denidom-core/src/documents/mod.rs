//! Russian construction reporting forms rendered as CSV
//!
//! - [`ks2`]: act of acceptance of completed works (КС-2)
//! - [`ks3`]: certificate of the cost of completed works (КС-3)
//! - [`m29`]: material consumption report (М-29)
//! - [`estimate`]: the plain estimate table
//!
//! Every renderer returns the whole document as a `String` produced by
//! [`csv::CsvWriter`].

pub mod csv;
pub mod estimate;
pub mod ks2;
pub mod ks3;
pub mod m29;

use crate::error::CoreError;
use chrono::NaiveDate;
use csv::CsvWriter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use estimate::export_estimate_csv;
pub use ks2::render_ks2;
pub use ks3::{render_ks3, PreviousAmounts};
pub use m29::{m29_rows, render_m29, M29Row};

/// Requisites printed above the table of every form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub number: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub contractor: String,
    #[serde(default)]
    pub period_from: Option<NaiveDate>,
    #[serde(default)]
    pub period_to: Option<NaiveDate>,
}

impl DocumentHeader {
    pub fn new(number: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            date,
            object: String::new(),
            customer: String::new(),
            contractor: String::new(),
            period_from: None,
            period_to: None,
        }
    }

    pub fn with_parties(mut self, object: &str, customer: &str, contractor: &str) -> Self {
        self.object = object.to_string();
        self.customer = customer.to_string();
        self.contractor = contractor.to_string();
        self
    }

    pub fn with_period(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.period_from = Some(from);
        self.period_to = Some(to);
        self
    }

    fn period_text(&self) -> String {
        match (self.period_from, self.period_to) {
            (Some(from), Some(to)) => format!("с {} по {}", ru_date(from), ru_date(to)),
            (Some(from), None) => format!("с {}", ru_date(from)),
            (None, Some(to)) => format!("по {}", ru_date(to)),
            (None, None) => String::new(),
        }
    }

    pub(crate) fn write(&self, w: &mut CsvWriter, title: &str) {
        w.row([title]);
        w.row(["Номер документа", self.number.as_str()]);
        w.row(["Дата составления".to_string(), ru_date(self.date)]);
        w.row(["Объект", self.object.as_str()]);
        w.row(["Заказчик", self.customer.as_str()]);
        w.row(["Подрядчик", self.contractor.as_str()]);
        w.row(["Отчетный период".to_string(), self.period_text()]);
        w.blank();
    }
}

pub(crate) fn ru_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Ks2,
    Ks3,
    M29,
    Csv,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [Self::Ks2, Self::Ks3, Self::M29, Self::Csv];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ks2 => "ks2",
            Self::Ks3 => "ks3",
            Self::M29 => "m29",
            Self::Csv => "csv",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Ks2 => "Акт о приемке выполненных работ (форма КС-2)",
            Self::Ks3 => "Справка о стоимости выполненных работ и затрат (форма КС-3)",
            Self::M29 => "Отчет о расходе основных материалов (форма М-29)",
            Self::Csv => "Смета",
        }
    }

    /// Download name such as `KS-2_12-A.csv`
    ///
    /// Characters outside `[A-Za-z0-9_-]` in the document number become `_`.
    pub fn file_name(&self, number: &str) -> String {
        let prefix = match self {
            Self::Ks2 => "KS-2",
            Self::Ks3 => "KS-3",
            Self::M29 => "M-29",
            Self::Csv => "estimate",
        };
        let safe: String = number
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        if safe.is_empty() {
            format!("{}.csv", prefix)
        } else {
            format!("{}_{}.csv", prefix, safe)
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "ks2" => Ok(Self::Ks2),
            "ks3" => Ok(Self::Ks3),
            "m29" => Ok(Self::M29),
            "csv" => Ok(Self::Csv),
            other => Err(CoreError::Parse(format!("unknown document kind: {}", other))),
        }
    }
}
