//! КС-3: certificate of the cost of completed works
//!
//! The period column comes from the current [`CalculationResult`]. The two
//! cumulative columns add the amounts already reported since the start of
//! works and since the start of the year (zero when not given).

use super::csv::{self, CsvWriter};
use super::{DocumentHeader, DocumentKind};
use crate::calculator::CalculationResult;
use serde::{Deserialize, Serialize};

pub const COLUMNS: [&str; 5] = [
    "№",
    "Наименование",
    "Стоимость с начала работ, руб.",
    "Стоимость с начала года, руб.",
    "В т.ч. за отчетный период, руб.",
];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PreviousAmounts {
    #[serde(default)]
    pub since_start: Option<CalculationResult>,
    #[serde(default)]
    pub since_year_start: Option<CalculationResult>,
}

type Amount = fn(&CalculationResult) -> f64;

const ROWS: [(&str, Amount); 6] = [
    ("Стоимость выполненных работ", |r| r.subtotal),
    ("Накладные расходы", |r| r.overhead),
    ("Сметная прибыль", |r| r.profit),
    ("Итого без НДС", |r| r.subtotal + r.overhead + r.profit),
    ("НДС", |r| r.vat),
    ("Всего с НДС", |r| r.total),
];

pub fn render_ks3(header: &DocumentHeader, period: &CalculationResult, previous: &PreviousAmounts) -> String {
    let mut w = CsvWriter::new();
    header.write(&mut w, DocumentKind::Ks3.title());
    w.row(COLUMNS);

    for (i, (label, amount)) in ROWS.iter().enumerate() {
        let current = amount(period);
        let before = |prev: Option<CalculationResult>| prev.as_ref().map(amount).unwrap_or(0.0);

        w.row([
            (i + 1).to_string(),
            label.to_string(),
            csv::money(before(previous.since_start) + current),
            csv::money(before(previous.since_year_start) + current),
            csv::money(current),
        ]);
    }

    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{calculate, CalculatorOptions};
    use crate::estimate::EstimateItem;
    use chrono::NaiveDate;

    fn header() -> DocumentHeader {
        DocumentHeader::new("3", NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
    }

    fn period() -> CalculationResult {
        calculate(
            &[EstimateItem::new("Штукатурка", "м²", 10.0, 100.0)],
            &CalculatorOptions::default(),
        )
    }

    #[test]
    fn test_without_previous_amounts() {
        let out = render_ks3(&header(), &period(), &PreviousAmounts::default());
        assert!(out.contains("№;Наименование;Стоимость с начала работ, руб.;Стоимость с начала года, руб.;В т.ч. за отчетный период, руб.\r\n"));
        assert!(out.contains("1;Стоимость выполненных работ;1000.00;1000.00;1000.00\r\n"));
        assert!(out.contains("4;Итого без НДС;1209.60;1209.60;1209.60\r\n"));
        assert!(out.contains("6;Всего с НДС;1451.52;1451.52;1451.52\r\n"));
    }

    #[test]
    fn test_cumulative_columns_add_previous() {
        let previous = PreviousAmounts {
            since_start: Some(CalculationResult {
                subtotal: 5000.0,
                overhead: 600.0,
                profit: 448.0,
                vat: 1209.6,
                total: 7257.6,
                items_count: 3,
            }),
            since_year_start: Some(CalculationResult {
                subtotal: 2000.0,
                ..Default::default()
            }),
        };
        let out = render_ks3(&header(), &period(), &previous);
        assert!(out.contains("1;Стоимость выполненных работ;6000.00;3000.00;1000.00\r\n"));
        assert!(out.contains("2;Накладные расходы;720.00;120.00;120.00\r\n"));
        assert!(out.contains("6;Всего с НДС;8709.12;1451.52;1451.52\r\n"));
    }
}
