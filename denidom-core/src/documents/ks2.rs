//! КС-2: act of acceptance of completed works

use super::csv::{self, CsvWriter};
use super::{DocumentHeader, DocumentKind};
use crate::calculator::{calculate, item_total, CalculatorOptions};
use crate::estimate::EstimateItem;

pub const COLUMNS: [&str; 7] = [
    "№",
    "Наименование работ",
    "Ед. изм.",
    "Количество",
    "Цена за ед., руб.",
    "Коэффициент",
    "Стоимость, руб.",
];

pub fn render_ks2(header: &DocumentHeader, items: &[EstimateItem], options: &CalculatorOptions) -> String {
    let mut w = CsvWriter::new();
    header.write(&mut w, DocumentKind::Ks2.title());
    w.row(COLUMNS);

    for (i, item) in items.iter().enumerate() {
        w.row([
            (i + 1).to_string(),
            item.name.clone(),
            item.unit.clone(),
            csv::number(item.quantity),
            csv::money(item.price),
            csv::number(item.coefficient),
            csv::money(item_total(item.quantity, item.price, item.coefficient)),
        ]);
    }

    let totals = calculate(items, options);
    let vat_label = if options.include_vat {
        format!("НДС {}%", csv::number(options.vat_rate * 100.0))
    } else {
        "НДС".to_string()
    };

    w.blank();
    for (label, value) in [
        ("Итого".to_string(), totals.subtotal),
        ("Накладные расходы".to_string(), totals.overhead),
        ("Сметная прибыль".to_string(), totals.profit),
        (vat_label, totals.vat),
        ("Всего с НДС".to_string(), totals.total),
    ] {
        w.row([String::new(), label, String::new(), String::new(), String::new(), String::new(), csv::money(value)]);
    }

    w.finish()
}
