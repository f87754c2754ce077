// src/config.rs
// JSON scenario configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::distribution::CountDistribution;
use crate::error::SimResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedDevelopmentConfig {
    /// "deterministic" or "stochastic".
    pub scheme: String,
    #[serde(default)]
    pub indicators: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessModelConfig {
    #[serde(default = "default_process_model")]
    pub model: String,
    #[serde(default = "default_adoption_threshold")]
    pub adoption_threshold: f64,
    #[serde(default = "default_price_sensitivity")]
    pub price_sensitivity: f64,
}

fn default_process_model() -> String {
    "need_driven".to_string()
}

fn default_adoption_threshold() -> f64 {
    0.0
}

fn default_price_sensitivity() -> f64 {
    0.1
}

impl Default for ProcessModelConfig {
    fn default() -> Self {
        Self {
            model: default_process_model(),
            adoption_threshold: default_adoption_threshold(),
            price_sensitivity: default_price_sensitivity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductGroupConfig {
    pub id: u32,
    pub name: String,
    pub needs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub id: u32,
    pub name: String,
    pub group: u32,
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
    #[serde(default)]
    pub lifetime_steps: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    pub count: u32,
    #[serde(default = "default_consumer_prefix")]
    pub name_prefix: String,
    /// First consumer id; later ones count up from here.
    #[serde(default = "default_first_consumer_id")]
    pub first_id: u32,
    #[serde(default)]
    pub preferences: BTreeMap<String, f64>,
}

fn default_consumer_prefix() -> String {
    "consumer".to_string()
}

fn default_first_consumer_id() -> u32 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceConfig {
    pub name: String,
    pub increase: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvertisementConfig {
    /// "empty", "default" or "uniform".
    pub scheme: String,
    #[serde(default)]
    pub targets: CountDistribution,
    #[serde(default)]
    pub noise: f64,
    #[serde(default)]
    pub preference: Option<PreferenceConfig>,
}

impl Default for AdvertisementConfig {
    fn default() -> Self {
        Self {
            scheme: "empty".to_string(),
            targets: CountDistribution::default(),
            noise: 0.0,
            preference: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyConfig {
    pub id: u32,
    pub name: String,
    pub portfolio: Vec<u32>,
    #[serde(default)]
    pub advertisement: AdvertisementConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub scenario_name: String,
    pub number_total_steps: u64,
    /// `false` selects the continuous-time model.
    #[serde(default = "default_synchronous")]
    pub synchronous: bool,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
    #[serde(default)]
    pub seed: Option<u64>,
    pub needs: Vec<String>,
    pub need_development: NeedDevelopmentConfig,
    #[serde(default)]
    pub process_model: ProcessModelConfig,
    pub product_groups: Vec<ProductGroupConfig>,
    pub products: Vec<ProductConfig>,
    pub consumers: ConsumerConfig,
    #[serde(default)]
    pub companies: Vec<CompanyConfig>,
}

fn default_synchronous() -> bool {
    true
}

fn default_logs_dir() -> String {
    "logs".to_string()
}

impl SimConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            scenario_name: "heating_market".to_string(),
            number_total_steps: 20,
            synchronous: true,
            logs_dir: default_logs_dir(),
            seed: Some(42),
            needs: vec!["warmth".to_string(), "comfort".to_string()],
            need_development: NeedDevelopmentConfig {
                scheme: "stochastic".to_string(),
                indicators: BTreeMap::from([
                    ("warmth".to_string(), 0.6),
                    ("comfort".to_string(), 0.3),
                ]),
            },
            process_model: ProcessModelConfig::default(),
            product_groups: vec![ProductGroupConfig {
                id: 1,
                name: "heating".to_string(),
                needs: vec!["warmth".to_string(), "comfort".to_string()],
            }],
            products: vec![
                ProductConfig {
                    id: 1,
                    name: "gas boiler".to_string(),
                    group: 1,
                    attributes: BTreeMap::from([
                        ("price".to_string(), 3.0),
                        ("quality".to_string(), 0.5),
                    ]),
                    lifetime_steps: Some(8),
                },
                ProductConfig {
                    id: 2,
                    name: "heat pump".to_string(),
                    group: 1,
                    attributes: BTreeMap::from([
                        ("price".to_string(), 6.0),
                        ("quality".to_string(), 0.9),
                        ("eco".to_string(), 1.0),
                    ]),
                    lifetime_steps: None,
                },
            ],
            consumers: ConsumerConfig {
                count: 50,
                name_prefix: default_consumer_prefix(),
                first_id: default_first_consumer_id(),
                preferences: BTreeMap::from([
                    ("quality".to_string(), 0.8),
                    ("eco".to_string(), 0.2),
                ]),
            },
            companies: vec![CompanyConfig {
                id: 1,
                name: "HeatCo".to_string(),
                portfolio: vec![1, 2],
                advertisement: AdvertisementConfig {
                    scheme: "default".to_string(),
                    targets: CountDistribution::Poisson { lambda: 5.0 },
                    noise: 0.1,
                    preference: Some(PreferenceConfig {
                        name: "eco".to_string(),
                        increase: 0.05,
                    }),
                },
            }],
        }
    }
}
