//! AI flows with deterministic fallbacks
//!
//! A flow asks the model first. Any failure (no client configured, transport
//! or API error, unparsable or empty answer) is logged at `warn` and the
//! heuristic result is returned instead. Responses say which path produced
//! them.

use denidom_core::analytics::{detect_anomalies, optimize, recommend, OptimizeOptions};
use denidom_core::calculator::{round_to_cents, validate_items};
use denidom_core::{reference, EstimateItem};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::client::AiClient;
use super::prompts;

pub const MAX_ADVICE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Ai,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedEstimate {
    pub items: Vec<EstimateItem>,
    pub source: Source,
}

#[derive(Debug, Clone, Serialize)]
pub struct CostAdvice {
    pub advice: Vec<String>,
    pub source: Source,
}

pub async fn generate_estimate(
    client: Option<&AiClient>,
    description: &str,
    area_m2: Option<f64>,
) -> GeneratedEstimate {
    if let Some(client) = client {
        let prompt = prompts::estimate_prompt(description, area_m2);
        match client.generate(&prompt).await {
            Ok(text) => match parse_estimate_items(&text) {
                Ok(items) => {
                    info!("AI estimate generated with {} items", items.len());
                    return GeneratedEstimate {
                        items,
                        source: Source::Ai,
                    };
                }
                Err(e) => warn!("Unusable AI estimate, using template: {}", e),
            },
            Err(e) => warn!("AI estimate request failed, using template: {}", e),
        }
    }

    GeneratedEstimate {
        items: fallback_estimate(description, area_m2),
        source: Source::Fallback,
    }
}

pub async fn cost_advice(client: Option<&AiClient>, items: &[EstimateItem]) -> CostAdvice {
    if let Some(client) = client {
        let prompt = prompts::advice_prompt(items);
        match client.generate(&prompt).await {
            Ok(text) => match parse_advice(&text) {
                Ok(advice) => {
                    return CostAdvice {
                        advice,
                        source: Source::Ai,
                    }
                }
                Err(e) => warn!("Unusable AI advice, using heuristics: {}", e),
            },
            Err(e) => warn!("AI advice request failed, using heuristics: {}", e),
        }
    }

    CostAdvice {
        advice: fallback_advice(items),
        source: Source::Fallback,
    }
}

/// Models sometimes wrap JSON in a Markdown fence despite the instructions
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsReply {
    Wrapped { items: Vec<EstimateItem> },
    Bare(Vec<EstimateItem>),
}

pub fn parse_estimate_items(text: &str) -> Result<Vec<EstimateItem>, String> {
    let reply: ItemsReply = serde_json::from_str(strip_code_fence(text)).map_err(|e| e.to_string())?;
    let items = match reply {
        ItemsReply::Wrapped { items } | ItemsReply::Bare(items) => items,
    };
    if items.is_empty() {
        return Err("no items in reply".to_string());
    }
    validate_items(&items).map_err(|e| e.to_string())?;
    Ok(items)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AdviceReply {
    Wrapped { advice: Vec<String> },
    Bare(Vec<String>),
}

pub fn parse_advice(text: &str) -> Result<Vec<String>, String> {
    let reply: AdviceReply = serde_json::from_str(strip_code_fence(text)).map_err(|e| e.to_string())?;
    let advice: Vec<String> = match reply {
        AdviceReply::Wrapped { advice } | AdviceReply::Bare(advice) => advice,
    }
    .into_iter()
    .map(|a| a.trim().to_string())
    .filter(|a| !a.is_empty())
    .take(MAX_ADVICE)
    .collect();

    if advice.is_empty() {
        return Err("no advice in reply".to_string());
    }
    Ok(advice)
}

/// One item per reference category mentioned in the description
///
/// Without any match the three most popular starter categories are used.
/// Quantity is the area when given, otherwise 1.
pub fn fallback_estimate(description: &str, area_m2: Option<f64>) -> Vec<EstimateItem> {
    let text = description.to_lowercase();
    let quantity = area_m2.filter(|a| *a > 0.0).unwrap_or(1.0);

    let keys: Vec<&str> = reference::categories()
        .iter()
        .filter(|c| c.keywords.iter().any(|k| text.contains(k)))
        .map(|c| c.key)
        .collect();

    if keys.is_empty() {
        let starters = recommend(&[], 3);
        return starters
            .iter()
            .filter_map(|r| reference::category(&r.category))
            .map(|c| template_item(c, quantity))
            .collect();
    }

    keys.into_iter()
        .filter_map(reference::category)
        .map(|c| template_item(c, quantity))
        .collect()
}

fn template_item(category: &reference::MarketCategory, quantity: f64) -> EstimateItem {
    EstimateItem::new(category.name, category.unit, quantity, category.latest_price())
        .with_category(category.key)
}

/// Optimizer suggestions, anomaly messages and the top missing category
pub fn fallback_advice(items: &[EstimateItem]) -> Vec<String> {
    let mut advice = Vec::new();

    let optimization = optimize(items, &OptimizeOptions::default());
    for s in &optimization.suggestions {
        advice.push(format!(
            "Позиция «{}»: вариант «{}» по {:.2} руб. вместо {:.2} руб. сэкономит {:.2} руб.",
            s.item_name, s.alternative, s.alternative_price, s.current_price, s.savings
        ));
    }
    if optimization.savings > 0.0 {
        advice.push(format!(
            "Общая возможная экономия: {:.2} руб. ({:.2}% сметы)",
            optimization.savings,
            round_to_cents(optimization.savings_percent)
        ));
    }

    for anomaly in detect_anomalies(items).anomalies {
        advice.push(anomaly.message);
    }

    if let Some(rec) = recommend(items, 1).into_iter().next() {
        if !items.is_empty() {
            advice.push(format!("Проверьте, не забыты ли работы «{}». {}", rec.name, rec.reason));
        }
    }

    if advice.is_empty() {
        advice.push("Явных возможностей для экономии не найдено, цены в пределах рынка".to_string());
    }
    advice.truncate(MAX_ADVICE);
    advice
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wrapped_and_fenced_items() {
        let text = "```json\n{\"items\": [{\"name\": \"Укладка плитки\", \"unit\": \"м²\", \"quantity\": 6, \"price\": 1650}]}\n```";
        let items = parse_estimate_items(text).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].coefficient, 1.0);

        let bare = r#"[{"name": "Грунтовка", "unit": "м²", "quantity": 10, "price": 95}]"#;
        assert_eq!(parse_estimate_items(bare).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_rejects_empty_and_invalid() {
        assert!(parse_estimate_items(r#"{"items": []}"#).is_err());
        assert!(parse_estimate_items("Вот ваша смета: ...").is_err());
        assert!(parse_estimate_items(r#"[{"name": "x", "unit": "м²", "quantity": -1, "price": 10}]"#).is_err());
    }

    #[test]
    fn test_parse_advice() {
        let advice = parse_advice(r#"{"advice": ["  Купите оптом ", ""]}"#).unwrap();
        assert_eq!(advice, vec!["Купите оптом".to_string()]);
        assert!(parse_advice(r#"{"advice": []}"#).is_err());
    }

    #[test]
    fn test_fallback_estimate_matches_keywords() {
        let items = fallback_estimate("Штукатурка и покраска стен, укладка ламината", Some(40.0));
        let keys: Vec<&str> = items.iter().filter_map(|i| i.category.as_deref()).collect();
        assert_eq!(keys, vec!["plaster", "paint", "flooring"]);
        assert!(items.iter().all(|i| i.quantity == 40.0 && i.price > 0.0));
    }

    #[test]
    fn test_fallback_estimate_without_matches_uses_starters() {
        let items = fallback_estimate("Сделайте красиво", None);
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.quantity == 1.0));
    }

    #[test]
    fn test_fallback_advice_mentions_savings() {
        let items = vec![EstimateItem::new("Штукатурка стен", "м²", 100.0, 495.0)];
        let advice = fallback_advice(&items);
        assert!(advice[0].contains("Штукатурка стен"));
        assert!(advice.iter().any(|a| a.contains("Общая возможная экономия")));
        assert!(advice.len() <= MAX_ADVICE);
    }

    #[test]
    fn test_fallback_advice_for_empty_estimate() {
        let advice = fallback_advice(&[]);
        assert_eq!(advice.len(), 1);
    }

    #[tokio::test]
    async fn test_no_client_falls_back() {
        let generated = generate_estimate(None, "Покраска стен", Some(20.0)).await;
        assert_eq!(generated.source, Source::Fallback);
        assert_eq!(generated.items[0].category.as_deref(), Some("paint"));

        let advice = cost_advice(None, &generated.items).await;
        assert_eq!(advice.source, Source::Fallback);
        assert!(!advice.advice.is_empty());
    }
}
