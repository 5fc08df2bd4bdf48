//! Catalog records and validated request values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Request values
// =============================================================================

/// A US ZIP code: exactly five ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ZipCode(String);

impl ZipCode {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.len() == 5 && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationError::InvalidZip)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ZipCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Network medium of a provider's offering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Technology {
    Fiber,
    Cable,
    #[serde(rename = "DSL")]
    Dsl,
    #[serde(rename = "5G")]
    FiveG,
    Satellite,
    #[serde(rename = "Fixed Wireless")]
    FixedWireless,
}

impl Technology {
    pub const ALL: [Technology; 6] = [
        Technology::Fiber,
        Technology::Cable,
        Technology::Dsl,
        Technology::FiveG,
        Technology::Satellite,
        Technology::FixedWireless,
    ];

    /// Canonical spelling, as stored in the catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            Technology::Fiber => "Fiber",
            Technology::Cable => "Cable",
            Technology::Dsl => "DSL",
            Technology::FiveG => "5G",
            Technology::Satellite => "Satellite",
            Technology::FixedWireless => "Fixed Wireless",
        }
    }

    /// Ranking score, higher lists first.
    ///
    /// Fiber > Cable > 5G > Fixed Wireless > DSL > Satellite
    pub fn priority(&self) -> u8 {
        match self {
            Technology::Fiber => 100,
            Technology::Cable => 80,
            Technology::FiveG => 70,
            Technology::FixedWireless => 50,
            Technology::Dsl => 30,
            Technology::Satellite => 10,
        }
    }

    /// Priority of a free-form catalog string; unknown values score 0.
    pub fn priority_of(raw: &str) -> u8 {
        raw.parse::<Technology>().map(|t| t.priority()).unwrap_or(0)
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Technology {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Technology::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnsupportedTechnology(s.to_string()))
    }
}

// =============================================================================
// Catalog records
// =============================================================================

/// A company offering service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// Service-availability fact for a (provider, ZIP) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRow {
    pub provider_id: i64,
    pub zip_code: String,
    pub has_service: bool,
    #[serde(default)]
    pub technology: Option<String>,
    #[serde(default)]
    pub availability_percent: Option<f64>,
    /// Maximum advertised download speed in Mbps
    #[serde(default)]
    pub max_speed: Option<f64>,
}

/// A sellable offering from a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: i64,
    pub provider_id: i64,
    pub name: String,
    /// Typical download speed in Mbps
    pub download_speed: f64,
    #[serde(default)]
    pub upload_speed: Option<f64>,
    pub monthly_price: f64,
    #[serde(default)]
    pub promo_text: Option<String>,
    #[serde(default)]
    pub contract_months: Option<u32>,
    /// Monthly data allowance; `None` means unlimited
    #[serde(default)]
    pub data_cap_gb: Option<f64>,
}

impl Plan {
    pub fn is_unlimited(&self) -> bool {
        self.data_cap_gb.is_none()
    }
}

/// A plan as served over HTTP, with its derived flags
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    #[serde(flatten)]
    pub plan: Plan,
    pub is_unlimited: bool,
}

impl From<Plan> for PlanView {
    fn from(plan: Plan) -> Self {
        Self {
            is_unlimited: plan.is_unlimited(),
            plan,
        }
    }
}

/// A provider plus what its qualifying coverage rows say about one ZIP
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderWithCoverage {
    #[serde(flatten)]
    pub provider: Provider,
    /// Technologies this provider serves the ZIP with, highest priority first
    pub covered_technologies: Vec<String>,
    pub availability_percent: Option<f64>,
    pub max_speed: Option<f64>,
}

impl ProviderWithCoverage {
    /// Best priority across the technologies covering the ZIP
    pub fn best_priority(&self) -> u8 {
        self.covered_technologies
            .iter()
            .map(|t| Technology::priority_of(t))
            .max()
            .unwrap_or(0)
    }
}
