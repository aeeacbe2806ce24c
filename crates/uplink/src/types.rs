//! Response models for the Uplink v1 API.
//!
//! Only identifiers are required; descriptive fields vary by product and
//! firmware and are optional.

use serde::{Deserialize, Serialize};

/// One page of `GET /api/v1/systems`.
///
/// `numItems` is the total across all pages and sits next to `objects`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemsPage {
    pub page: u32,
    pub items_per_page: u32,
    pub num_items: u32,
    pub objects: Vec<System>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    pub system_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub security_level: Option<String>,
    #[serde(default)]
    pub connection_status: Option<String>,
    #[serde(default)]
    pub last_activity_date: Option<String>,
    #[serde(default)]
    pub has_alarmed: Option<bool>,
}

/// A master or slave unit connected to a system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUnit {
    pub system_unit_id: i64,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub software_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub parameter_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub display_value: Option<String>,
    #[serde(default)]
    pub raw_value: Option<i64>,
}

/// Systems with their units, categories and parameters.
#[derive(Debug, Clone, Serialize)]
pub struct SystemTree {
    pub system: System,
    pub units: Vec<UnitTree>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitTree {
    pub unit: SystemUnit,
    pub categories: Vec<CategoryTree>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTree {
    pub category: Category,
    pub parameters: Vec<Parameter>,
}
