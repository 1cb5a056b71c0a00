//! М-29: material consumption against norms
//!
//! Items are mapped to reference categories; each category's material norms
//! give the normative consumption `quantity × ratio`. Rows are aggregated by
//! material name across items, in order of first appearance. Actual
//! consumption is looked up by material name and defaults to the normative
//! amount.

use super::csv::{self, CsvWriter};
use super::{DocumentHeader, DocumentKind};
use crate::estimate::EstimateItem;
use crate::reference;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const COLUMNS: [&str; 8] = [
    "№",
    "Материал",
    "Ед. изм.",
    "Норма расхода",
    "Объем работ",
    "Расход по норме",
    "Фактический расход",
    "Отклонение",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct M29Row {
    pub material: String,
    pub unit: String,
    /// Consumption per unit of work; for aggregated rows the effective
    /// ratio `normative / work_volume`
    pub ratio: f64,
    pub work_volume: f64,
    pub normative: f64,
    pub actual: f64,
    pub deviation: f64,
}

pub fn m29_rows(items: &[EstimateItem], actual: &HashMap<String, f64>) -> Vec<M29Row> {
    let mut rows: Vec<M29Row> = Vec::new();
    let mut index: HashMap<&'static str, usize> = HashMap::new();

    for item in items {
        let Some(category) = reference::resolve_category(item) else {
            continue;
        };
        for norm in category.material_norms {
            let normative = item.quantity * norm.ratio;
            match index.get(norm.name) {
                Some(&i) => {
                    rows[i].work_volume += item.quantity;
                    rows[i].normative += normative;
                }
                None => {
                    index.insert(norm.name, rows.len());
                    rows.push(M29Row {
                        material: norm.name.to_string(),
                        unit: norm.unit.to_string(),
                        ratio: norm.ratio,
                        work_volume: item.quantity,
                        normative,
                        actual: 0.0,
                        deviation: 0.0,
                    });
                }
            }
        }
    }

    for row in rows.iter_mut() {
        if row.work_volume > 0.0 {
            row.ratio = row.normative / row.work_volume;
        }
        row.actual = actual.get(&row.material).copied().unwrap_or(row.normative);
        row.deviation = row.actual - row.normative;
    }

    rows
}

pub fn render_m29(header: &DocumentHeader, items: &[EstimateItem], actual: &HashMap<String, f64>) -> String {
    let mut w = CsvWriter::new();
    header.write(&mut w, DocumentKind::M29.title());
    w.row(COLUMNS);

    for (i, row) in m29_rows(items, actual).iter().enumerate() {
        w.row([
            (i + 1).to_string(),
            row.material.clone(),
            row.unit.clone(),
            csv::number(row.ratio),
            csv::number(row.work_volume),
            csv::number(row.normative),
            csv::number(row.actual),
            csv::number(row.deviation),
        ]);
    }

    w.finish()
}
