//! Market reference tables
//!
//! Constant data the analytics run on: work categories with quarterly unit
//! price history, keywords for classifying free-text item names, cheaper
//! alternatives, material consumption norms, plus regional coefficients,
//! seasonal factors and category co-occurrence weights.
//!
//! Prices are roubles per unit of work (labor and materials included).

use crate::estimate::EstimateItem;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Cheaper substitute for a category's default material
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub name: &'static str,
    pub price: f64,
    /// Relative quality, 0..1 (1 = same as the default material)
    pub quality: f64,
}

/// Material consumed per unit of work
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialNorm {
    pub name: &'static str,
    pub unit: &'static str,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketCategory {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    /// Oldest first, one point per quarter
    pub quarterly_prices: &'static [f64],
    /// Lowercase stems matched against item names
    pub keywords: &'static [&'static str],
    /// 0..1, share of labor in the unit price
    pub labor_intensity: f64,
    /// 0..1, expected service life relative to the longest-lived category
    pub durability: f64,
    /// 0..1, how often the category appears in renovation estimates
    pub popularity: f64,
    pub alternatives: &'static [Alternative],
    pub material_norms: &'static [MaterialNorm],
}

impl MarketCategory {
    pub fn latest_price(&self) -> f64 {
        self.quarterly_prices.last().copied().unwrap_or(0.0)
    }
}

pub static CATEGORIES: &[MarketCategory] = &[
    MarketCategory {
        key: "plaster",
        name: "Штукатурные работы",
        unit: "м²",
        quarterly_prices: &[420.0, 428.0, 441.0, 450.0, 458.0, 470.0, 482.0, 495.0],
        keywords: &["штукатур"],
        labor_intensity: 0.65,
        durability: 0.8,
        popularity: 0.9,
        alternatives: &[
            Alternative { name: "Гипсовая штукатурка машинного нанесения", price: 410.0, quality: 0.9 },
            Alternative { name: "Цементно-песчаная штукатурка", price: 360.0, quality: 0.75 },
            Alternative { name: "Штукатурка эконом-класса", price: 300.0, quality: 0.55 },
        ],
        material_norms: &[
            MaterialNorm { name: "Штукатурная смесь гипсовая", unit: "кг", ratio: 9.0 },
            MaterialNorm { name: "Маяк штукатурный", unit: "м", ratio: 0.8 },
        ],
    },
    MarketCategory {
        key: "putty",
        name: "Шпатлевание",
        unit: "м²",
        quarterly_prices: &[210.0, 215.0, 218.0, 224.0, 230.0, 233.0, 240.0, 246.0],
        keywords: &["шпатл", "шпакл"],
        labor_intensity: 0.7,
        durability: 0.6,
        popularity: 0.8,
        alternatives: &[
            Alternative { name: "Полимерная шпатлевка отечественная", price: 190.0, quality: 0.85 },
            Alternative { name: "Гипсовая шпатлевка стартовая", price: 160.0, quality: 0.65 },
        ],
        material_norms: &[MaterialNorm { name: "Шпатлевка финишная", unit: "кг", ratio: 1.2 }],
    },
    MarketCategory {
        key: "primer",
        name: "Грунтование",
        unit: "м²",
        quarterly_prices: &[58.0, 60.0, 61.0, 63.0, 64.0, 66.0, 68.0, 70.0],
        keywords: &["грунтов"],
        labor_intensity: 0.5,
        durability: 0.5,
        popularity: 0.85,
        alternatives: &[Alternative { name: "Грунтовка акриловая универсальная", price: 52.0, quality: 0.8 }],
        material_norms: &[MaterialNorm { name: "Грунтовка глубокого проникновения", unit: "л", ratio: 0.2 }],
    },
    MarketCategory {
        key: "paint",
        name: "Окрасочные работы",
        unit: "м²",
        quarterly_prices: &[265.0, 270.0, 276.0, 281.0, 290.0, 296.0, 305.0, 312.0],
        keywords: &["окрас", "покраск", "краск"],
        labor_intensity: 0.55,
        durability: 0.45,
        popularity: 0.85,
        alternatives: &[
            Alternative { name: "Краска интерьерная отечественная", price: 230.0, quality: 0.8 },
            Alternative { name: "Водоэмульсионная краска эконом", price: 180.0, quality: 0.6 },
        ],
        material_norms: &[
            MaterialNorm { name: "Краска водоэмульсионная", unit: "л", ratio: 0.25 },
            MaterialNorm { name: "Грунтовка", unit: "л", ratio: 0.1 },
        ],
    },
    MarketCategory {
        key: "tile",
        name: "Облицовка плиткой",
        unit: "м²",
        quarterly_prices: &[1450.0, 1480.0, 1510.0, 1530.0, 1575.0, 1600.0, 1640.0, 1690.0],
        keywords: &["плитк", "облицов", "кафел", "керамогранит"],
        labor_intensity: 0.6,
        durability: 1.0,
        popularity: 0.75,
        alternatives: &[
            Alternative { name: "Плитка керамическая отечественная", price: 1320.0, quality: 0.85 },
            Alternative { name: "Плитка эконом-класса", price: 1100.0, quality: 0.6 },
        ],
        material_norms: &[
            MaterialNorm { name: "Плитка керамическая", unit: "м²", ratio: 1.08 },
            MaterialNorm { name: "Клей плиточный", unit: "кг", ratio: 5.0 },
            MaterialNorm { name: "Затирка для швов", unit: "кг", ratio: 0.5 },
        ],
    },
    MarketCategory {
        key: "flooring",
        name: "Устройство покрытий пола",
        unit: "м²",
        quarterly_prices: &[980.0, 995.0, 1010.0, 1025.0, 1040.0, 1070.0, 1090.0, 1120.0],
        keywords: &["ламинат", "линолеум", "паркет", "покрыт"],
        labor_intensity: 0.35,
        durability: 0.7,
        popularity: 0.7,
        alternatives: &[
            Alternative { name: "Ламинат 32 класс", price: 860.0, quality: 0.8 },
            Alternative { name: "Линолеум бытовой", price: 640.0, quality: 0.65 },
        ],
        material_norms: &[
            MaterialNorm { name: "Напольное покрытие", unit: "м²", ratio: 1.05 },
            MaterialNorm { name: "Подложка", unit: "м²", ratio: 1.02 },
        ],
    },
    MarketCategory {
        key: "screed",
        name: "Стяжка пола",
        unit: "м²",
        quarterly_prices: &[520.0, 530.0, 545.0, 552.0, 566.0, 580.0, 591.0, 610.0],
        keywords: &["стяжк", "наливн"],
        labor_intensity: 0.55,
        durability: 0.9,
        popularity: 0.6,
        alternatives: &[Alternative { name: "Полусухая стяжка", price: 470.0, quality: 0.85 }],
        material_norms: &[MaterialNorm { name: "Пескобетон М300", unit: "кг", ratio: 40.0 }],
    },
    MarketCategory {
        key: "masonry",
        name: "Кладочные работы",
        unit: "м³",
        quarterly_prices: &[5200.0, 5280.0, 5390.0, 5450.0, 5600.0, 5720.0, 5810.0, 5950.0],
        keywords: &["кладк", "кирпич", "блок"],
        labor_intensity: 0.5,
        durability: 1.0,
        popularity: 0.4,
        alternatives: &[
            Alternative { name: "Кладка из газобетонных блоков", price: 4300.0, quality: 0.8 },
            Alternative { name: "Кладка из пескобетонных блоков", price: 3900.0, quality: 0.65 },
        ],
        material_norms: &[
            MaterialNorm { name: "Кирпич керамический", unit: "шт", ratio: 394.0 },
            MaterialNorm { name: "Раствор кладочный", unit: "м³", ratio: 0.24 },
        ],
    },
    MarketCategory {
        key: "insulation",
        name: "Утепление",
        unit: "м²",
        quarterly_prices: &[610.0, 615.0, 630.0, 640.0, 648.0, 665.0, 680.0, 694.0],
        keywords: &["утепл", "изоляц", "теплоизол", "минват"],
        labor_intensity: 0.4,
        durability: 0.85,
        popularity: 0.45,
        alternatives: &[
            Alternative { name: "Пенополистирол ПСБ-С 25", price: 480.0, quality: 0.7 },
            Alternative { name: "Минвата эконом", price: 450.0, quality: 0.6 },
        ],
        material_norms: &[
            MaterialNorm { name: "Плита минераловатная", unit: "м²", ratio: 1.05 },
            MaterialNorm { name: "Дюбель тарельчатый", unit: "шт", ratio: 6.0 },
        ],
    },
    MarketCategory {
        key: "electrical",
        name: "Электромонтажные работы",
        unit: "шт",
        quarterly_prices: &[380.0, 390.0, 395.0, 410.0, 420.0, 428.0, 440.0, 455.0],
        keywords: &["электр", "кабел", "розет", "выключ", "проводк"],
        labor_intensity: 0.8,
        durability: 0.75,
        popularity: 0.65,
        alternatives: &[Alternative { name: "Фурнитура отечественного производства", price: 330.0, quality: 0.75 }],
        material_norms: &[MaterialNorm { name: "Кабель ВВГнг 3x2.5", unit: "м", ratio: 6.0 }],
    },
];

/// Regional price coefficients relative to the national average
const REGIONAL_COEFFICIENTS: &[(&str, f64)] = &[
    ("Москва", 1.35),
    ("Санкт-Петербург", 1.25),
    ("Московская область", 1.2),
    ("Ленинградская область", 1.1),
    ("Краснодарский край", 1.05),
    ("Свердловская область", 1.02),
    ("Новосибирская область", 1.0),
    ("Республика Татарстан", 0.98),
    ("Ростовская область", 0.95),
    ("Якутия", 1.45),
];

/// Price factor by month, January first
const SEASONAL_FACTORS: [f64; 12] = [
    0.95, 0.95, 0.98, 1.02, 1.05, 1.07, 1.08, 1.07, 1.04, 1.0, 0.97, 0.96,
];

/// Symmetric weights: how often two categories appear in the same estimate
const CO_OCCURRENCE: &[(&str, &str, f64)] = &[
    ("plaster", "putty", 0.9),
    ("plaster", "primer", 0.85),
    ("putty", "paint", 0.9),
    ("putty", "primer", 0.8),
    ("primer", "paint", 0.85),
    ("primer", "tile", 0.6),
    ("screed", "flooring", 0.9),
    ("screed", "tile", 0.55),
    ("screed", "insulation", 0.4),
    ("masonry", "plaster", 0.75),
    ("masonry", "insulation", 0.6),
    ("electrical", "plaster", 0.5),
    ("electrical", "putty", 0.35),
    ("tile", "flooring", 0.3),
];

static BY_KEY: Lazy<HashMap<&'static str, &'static MarketCategory>> =
    Lazy::new(|| CATEGORIES.iter().map(|c| (c.key, c)).collect());

pub fn categories() -> &'static [MarketCategory] {
    CATEGORIES
}

pub fn category(key: &str) -> Option<&'static MarketCategory> {
    BY_KEY.get(key.trim()).copied()
}

/// Category whose keyword occurs earliest in `name`
pub fn classify(name: &str) -> Option<&'static MarketCategory> {
    let lower = name.to_lowercase();
    CATEGORIES
        .iter()
        .filter_map(|c| {
            c.keywords
                .iter()
                .filter_map(|k| lower.find(k))
                .min()
                .map(|pos| (pos, c))
        })
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, c)| c)
}

/// Explicit category key when known, otherwise keyword classification
pub fn resolve_category(item: &EstimateItem) -> Option<&'static MarketCategory> {
    item.category
        .as_deref()
        .and_then(category)
        .or_else(|| classify(&item.name))
}

/// Regional coefficient, 1.0 for unknown or absent regions
pub fn regional_coefficient(region: Option<&str>) -> f64 {
    let Some(region) = region else {
        return 1.0;
    };
    let needle = region.trim().to_lowercase();
    REGIONAL_COEFFICIENTS
        .iter()
        .find(|(name, _)| name.to_lowercase() == needle)
        .map(|(_, k)| *k)
        .unwrap_or(1.0)
}

pub fn regions() -> impl Iterator<Item = (&'static str, f64)> {
    REGIONAL_COEFFICIENTS.iter().copied()
}

/// Seasonal factor for month 1..=12; `None` outside that range
pub fn seasonal_factor(month: u32) -> Option<f64> {
    month
        .checked_sub(1)
        .and_then(|i| SEASONAL_FACTORS.get(i as usize))
        .copied()
}

/// Co-occurrence weight in either order; 0 for unrelated categories
pub fn co_occurrence(a: &str, b: &str) -> f64 {
    CO_OCCURRENCE
        .iter()
        .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, _, w)| *w)
        .unwrap_or(0.0)
}
