//! Adjustment coefficients applied on top of base unit prices
//!
//! The combined coefficient is the product of the price index, every
//! present optional coefficient and every active custom coefficient.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    /// Conversion index from base-level to current prices
    #[serde(default = "default_index")]
    pub index: f64,
    /// Winter price increase
    #[serde(default)]
    pub winter: Option<f64>,
    /// Cramped working conditions (see [`cramped_conditions`])
    #[serde(default)]
    pub cramped: Option<f64>,
    #[serde(default)]
    pub regional: Option<f64>,
    /// Work at height
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub custom: Vec<CustomCoefficient>,
}

fn default_index() -> f64 {
    1.0
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            index: 1.0,
            winter: None,
            cramped: None,
            regional: None,
            height: None,
            custom: Vec::new(),
        }
    }
}

impl Coefficients {
    pub fn combined(&self) -> f64 {
        let optional = [self.winter, self.cramped, self.regional, self.height]
            .into_iter()
            .flatten()
            .product::<f64>();

        let custom = self
            .custom
            .iter()
            .filter(|c| c.is_active)
            .map(|c| c.value)
            .product::<f64>();

        self.index * optional * custom
    }

    pub fn add_custom(&mut self, name: &str, value: f64, justification: Option<&str>) {
        self.custom.push(CustomCoefficient {
            name: name.to_string(),
            value,
            justification: justification.map(str::to_string),
            is_active: true,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomCoefficient {
    pub name: String,
    pub value: f64,
    /// Document or order the coefficient is based on
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Cramped working condition (МДС 81-35.2004)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrampedCondition {
    pub code: &'static str,
    pub name: &'static str,
    pub coefficient: f64,
    pub description: &'static str,
}

/// Region with its winter temperature zone (1 = mildest, 8 = harshest)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureZone {
    pub region: &'static str,
    pub zone: u8,
}

const CRAMPED: &[CrampedCondition] = &[
    CrampedCondition {
        code: "К1",
        name: "Работа на действующем предприятии",
        coefficient: 1.15,
        description: "Без остановки производства",
    },
    CrampedCondition {
        code: "К2",
        name: "Работа в жилом здании",
        coefficient: 1.20,
        description: "Без выселения жильцов",
    },
    CrampedCondition {
        code: "К3",
        name: "Работа в стеснённых условиях",
        coefficient: 1.10,
        description: "Площадь рабочего места менее норматива",
    },
    CrampedCondition {
        code: "К4",
        name: "Работа на высоте более 3.5 м",
        coefficient: 1.08,
        description: "С подмостей и лесов",
    },
];

const ZONES: &[TemperatureZone] = &[
    TemperatureZone { region: "Краснодарский край", zone: 1 },
    TemperatureZone { region: "Ростовская область", zone: 2 },
    TemperatureZone { region: "Волгоградская область", zone: 3 },
    TemperatureZone { region: "Московская область", zone: 4 },
    TemperatureZone { region: "Москва", zone: 4 },
    TemperatureZone { region: "Нижегородская область", zone: 4 },
    TemperatureZone { region: "Ленинградская область", zone: 5 },
    TemperatureZone { region: "Санкт-Петербург", zone: 5 },
    TemperatureZone { region: "Свердловская область", zone: 5 },
    TemperatureZone { region: "Новосибирская область", zone: 6 },
    TemperatureZone { region: "Красноярский край", zone: 6 },
    TemperatureZone { region: "Иркутская область", zone: 7 },
    TemperatureZone { region: "Якутия", zone: 8 },
    TemperatureZone { region: "Чукотка", zone: 8 },
];

pub fn cramped_conditions() -> &'static [CrampedCondition] {
    CRAMPED
}

pub fn temperature_zones() -> &'static [TemperatureZone] {
    ZONES
}

/// Look up a cramped condition by code (`К1`..`К4`, Latin `K` accepted)
pub fn cramped_by_code(code: &str) -> Option<&'static CrampedCondition> {
    let normalized = code.trim().to_uppercase().replace('K', "К");
    CRAMPED.iter().find(|c| c.code == normalized)
}

/// Temperature zone of a region, matched case-insensitively
pub fn zone_for_region(region: &str) -> Option<u8> {
    let needle = region.trim().to_lowercase();
    ZONES
        .iter()
        .find(|z| z.region.to_lowercase() == needle)
        .map(|z| z.zone)
}
