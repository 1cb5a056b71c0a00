//! Plain estimate table: every item with its code, then the totals block

use super::csv::{self, CsvWriter};
use crate::calculator::{calculate, item_total, CalculatorOptions};
use crate::estimate::EstimateItem;

pub const COLUMNS: [&str; 8] = [
    "№",
    "Шифр",
    "Наименование",
    "Ед. изм.",
    "Количество",
    "Цена, руб.",
    "Коэффициент",
    "Сумма, руб.",
];

pub fn export_estimate_csv(title: &str, items: &[EstimateItem], options: &CalculatorOptions) -> String {
    let mut w = CsvWriter::new();
    w.row([title]);
    w.blank();
    w.row(COLUMNS);

    for (i, item) in items.iter().enumerate() {
        w.row([
            (i + 1).to_string(),
            item.code.clone().unwrap_or_default(),
            item.name.clone(),
            item.unit.clone(),
            csv::number(item.quantity),
            csv::money(item.price),
            csv::number(item.coefficient),
            csv::money(item_total(item.quantity, item.price, item.coefficient)),
        ]);
    }

    let totals = calculate(items, options);
    w.blank();
    for (label, value) in [
        ("Прямые затраты", totals.subtotal),
        ("Накладные расходы", totals.overhead),
        ("Сметная прибыль", totals.profit),
        ("Итого без НДС", totals.total_without_vat()),
        ("НДС", totals.vat),
        ("Итого", totals.total),
    ] {
        w.row([label.to_string(), csv::money(value)]);
    }

    w.finish()
}
