//! Rendered documents as a spreadsheet would read them

use chrono::NaiveDate;
use denidom_core::calculator::{calculate, CalculatorOptions};
use denidom_core::documents::{
    export_estimate_csv, render_ks2, render_ks3, render_m29, DocumentHeader, DocumentKind,
    PreviousAmounts,
};
use denidom_core::EstimateItem;
use std::collections::HashMap;

const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

fn header() -> DocumentHeader {
    DocumentHeader::new("15", NaiveDate::from_ymd_opt(2024, 9, 30).unwrap())
        .with_parties("ЖК «Северный», кв. 42", "Петров П.П.", "ООО \"ДениДом\"")
        .with_period(
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
        )
}

fn items() -> Vec<EstimateItem> {
    vec![
        EstimateItem::new("Штукатурка стен", "м²", 35.0, 470.0),
        EstimateItem::new("Окраска стен", "м²", 35.0, 300.0).with_coefficient(1.1),
        EstimateItem::new("Укладка ламината", "м²", 18.0, 560.0),
    ]
}

/// Splits the body (after the BOM) into lines, checking every line ends with CRLF
fn lines(doc: &str) -> Vec<&str> {
    assert!(doc.as_bytes().starts_with(BOM));
    let body = &doc[3..];
    assert!(body.ends_with("\r\n"));
    assert!(!body.replace("\r\n", "").contains('\n'));
    body.trim_end_matches("\r\n").split("\r\n").collect()
}

#[test]
fn test_every_document_has_bom_and_crlf() {
    let options = CalculatorOptions::default();
    let totals = calculate(&items(), &options);
    let docs = [
        render_ks2(&header(), &items(), &options),
        render_ks3(&header(), &totals, &PreviousAmounts::default()),
        render_m29(&header(), &items(), &HashMap::new()),
        export_estimate_csv("Смета", &items(), &options),
    ];
    for doc in &docs {
        lines(doc);
    }
}

#[test]
fn test_non_latin_text_and_quoting_preserved() {
    let doc = render_ks2(&header(), &items(), &CalculatorOptions::default());
    let lines = lines(&doc);
    assert_eq!(lines[0], DocumentKind::Ks2.title());
    assert!(lines.contains(&"Объект;ЖК «Северный», кв. 42"));
    assert!(lines.contains(&"Подрядчик;\"ООО \"\"ДениДом\"\"\""));
}

#[test]
fn test_ks2_item_totals() {
    let doc = render_ks2(&header(), &items(), &CalculatorOptions::default());
    let rows: Vec<Vec<&str>> = lines(&doc)
        .into_iter()
        .map(|l| l.split(';').collect::<Vec<_>>())
        .filter(|f| f.len() == 7 && f[0].parse::<usize>().is_ok())
        .collect();

    assert_eq!(rows.len(), 3);
    for (row, item) in rows.iter().zip(items()) {
        let expected = item.quantity * item.price * item.coefficient;
        let printed: f64 = row[6].parse().unwrap();
        assert!((printed - expected).abs() < 0.005, "{:?}", row);
    }
}

#[test]
fn test_ks3_period_matches_ks2_total() {
    let options = CalculatorOptions::default();
    let totals = calculate(&items(), &options);
    let ks2 = render_ks2(&header(), &items(), &options);
    let ks3 = render_ks3(&header(), &totals, &PreviousAmounts::default());

    let ks2_total = lines(&ks2)
        .into_iter()
        .find(|l| l.contains("Всего с НДС"))
        .and_then(|l| l.rsplit(';').next())
        .unwrap()
        .to_string();
    let ks3_row = lines(&ks3)
        .into_iter()
        .find(|l| l.starts_with("6;Всего с НДС"))
        .unwrap()
        .to_string();
    assert!(ks3_row.ends_with(&format!(";{}", ks2_total)));
}

#[test]
fn test_m29_only_categories_with_norms() {
    let doc = render_m29(&header(), &items(), &HashMap::new());
    // plaster: 2 norms, paint: 2 norms, flooring: underlay
    let data_rows = lines(&doc)
        .into_iter()
        .filter(|l| l.split(';').next().is_some_and(|n| n.parse::<usize>().is_ok()))
        .count();
    assert!(data_rows >= 4);
    assert!(doc.contains("Краска водоэмульсионная"));
}
