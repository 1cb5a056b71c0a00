//! Prompt templates
//!
//! Both prompts demand a bare JSON reply so the answer can be parsed
//! without scraping prose.

use denidom_core::reference;
use denidom_core::EstimateItem;
use std::fmt::Write;

pub fn estimate_prompt(description: &str, area_m2: Option<f64>) -> String {
    let mut prompt = String::from(
        "Ты опытный сметчик по ремонту и строительству в России. \
         Составь предварительную смету по описанию работ.\n\n",
    );
    let _ = writeln!(prompt, "Описание: {}", description.trim());
    if let Some(area) = area_m2 {
        let _ = writeln!(prompt, "Площадь: {} м²", area);
    }

    prompt.push_str("\nОриентиры рыночных цен (руб. за единицу):\n");
    for category in reference::categories() {
        let _ = writeln!(
            prompt,
            "- {} ({}): {:.0}",
            category.name,
            category.unit,
            category.latest_price()
        );
    }

    prompt.push_str(
        "\nОтветь только JSON без пояснений в формате \
         {\"items\": [{\"name\": string, \"unit\": string, \"quantity\": number, \
         \"price\": number}]}. Единицы измерения пиши сокращенно (м², м³, шт, т, м).",
    );
    prompt
}

pub fn advice_prompt(items: &[EstimateItem]) -> String {
    let mut prompt = String::from(
        "Ты эксперт по оптимизации строительных смет. \
         Проанализируй позиции сметы и дай конкретные советы по снижению стоимости \
         без потери качества.\n\nПозиции:\n",
    );
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(
            prompt,
            "{}. {}: {} {} × {:.2} руб. (коэффициент {})",
            i + 1,
            item.name,
            item.quantity,
            item.unit,
            item.price,
            item.coefficient
        );
    }
    prompt.push_str(
        "\nОтветь только JSON без пояснений в формате {\"advice\": [string]}, \
         не более 7 советов.",
    );
    prompt
}
