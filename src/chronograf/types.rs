#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// Links advertised by the Chronograf API for a source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub kapacitors: String,
    pub proxy: String,
}

/// InfluxDB source as known to Chronograf
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub default: bool,
    pub links: SourceLinks,
    /// Filled in by the store after `GET <links.kapacitors>`, never sent by the API
    #[serde(skip)]
    pub kapacitors: Vec<Kapacitor>,
}

/// Sources response from GET /chronograf/v1/sources
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesResponse {
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KapacitorLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub proxy: String,
    pub rules: String,
}

/// Kapacitor connection config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kapacitor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "insecureSkipVerify")]
    pub insecure_skip_verify: bool,
    pub active: bool,
    #[serde(skip_serializing)]
    pub links: KapacitorLinks,
}

pub const DEFAULT_KAPACITOR_NAME: &str = "My Kapacitor";
pub const DEFAULT_KAPACITOR_URL: &str = "http://localhost:9092";

impl Default for Kapacitor {
    fn default() -> Self {
        Self {
            id: None,
            name: DEFAULT_KAPACITOR_NAME.to_string(),
            url: DEFAULT_KAPACITOR_URL.to_string(),
            username: String::new(),
            password: String::new(),
            insecure_skip_verify: false,
            active: false,
            links: KapacitorLinks::default(),
        }
    }
}

impl Kapacitor {
    /// Whether the config already exists on the server
    pub fn exists(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Kapacitors response from GET <source.links.kapacitors>
#[derive(Debug, Clone, Deserialize)]
pub struct KapacitorsResponse {
    pub kapacitors: Vec<Kapacitor>,
}

/// Rule status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    #[default]
    Enabled,
    Disabled,
}

impl RuleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RuleStatus::Enabled => "enabled",
            RuleStatus::Disabled => "disabled",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            RuleStatus::Enabled => RuleStatus::Disabled,
            RuleStatus::Disabled => RuleStatus::Enabled,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuleLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub kapacitor: String,
}

/// Alert rule
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    pub trigger: String,
    pub message: String,
    pub alerts: Vec<String>,
    pub status: RuleStatus,
    pub links: RuleLinks,
}

/// Rules response from GET <kapacitor.links.rules>
#[derive(Debug, Clone, Deserialize)]
pub struct RulesResponse {
    pub rules: Vec<AlertRule>,
}
