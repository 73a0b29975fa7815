use serde::{Deserialize, Serialize};

use super::order::Order;
use crate::config::PackageDefaults;
use crate::error::ValidationError;
use crate::normalize::round2;

const DESCRIPTION_MAX_CHARS: usize = 250;
const DESCRIPTION_LISTED_ITEMS: usize = 3;
const MIN_PACKAGE_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// Parcel entered by an operator.
    Box,
    /// Parcel derived from an order line.
    Package,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub weight: f64,
    pub width: f64,
    pub height: f64,
    pub length: f64,
    pub package_type: PackageType,
}

/// Parcel dimensions supplied with custom expedition data. Missing values
/// default to 1 kg and 10 cm sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackageDimensions {
    #[serde(default = "default_custom_weight")]
    pub weight: f64,
    #[serde(default = "default_custom_side")]
    pub width: f64,
    #[serde(default = "default_custom_side")]
    pub height: f64,
    #[serde(default = "default_custom_side")]
    pub length: f64,
}

fn default_custom_weight() -> f64 {
    1.0
}

fn default_custom_side() -> f64 {
    10.0
}

/// Operator overrides for a quote request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomExpeditionData {
    pub packages: Vec<PackageDimensions>,
    pub content_description: Option<String>,
    pub cod_amount: Option<f64>,
    pub insurance_amount: Option<f64>,
    pub open_on_delivery: Option<bool>,
    pub saturday_delivery: Option<bool>,
}

impl CustomExpeditionData {
    /// Reject parcels without a positive size or weight and negative money
    /// amounts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (index, dims) in self.packages.iter().enumerate() {
            let sides = [
                ("weight", dims.weight),
                ("width", dims.width),
                ("height", dims.height),
                ("length", dims.length),
            ];
            if let Some((field, value)) = sides
                .into_iter()
                .find(|(_, value)| !value.is_finite() || *value <= 0.0)
            {
                return Err(invalid_custom_data(format!(
                    "package {} {field} must be positive, got {value}",
                    index + 1
                )));
            }
        }

        for (field, amount) in [
            ("cod_amount", self.cod_amount),
            ("insurance_amount", self.insurance_amount),
        ] {
            if let Some(amount) = amount.filter(|amount| !amount.is_finite() || *amount < 0.0) {
                return Err(invalid_custom_data(format!(
                    "{field} must not be negative, got {amount}"
                )));
            }
        }

        Ok(())
    }

    pub fn content_description(&self) -> Option<&str> {
        self.content_description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Parcels for a quote request.
///
/// Custom packages win. Otherwise each order line becomes one parcel whose
/// weight is the unit weight times the quantity, with missing product
/// attributes taken from `defaults`. An order without lines ships as one
/// default parcel.
pub fn build_packages(
    order: &Order,
    custom: Option<&CustomExpeditionData>,
    defaults: &PackageDefaults,
) -> Vec<Package> {
    if let Some(custom) = custom.filter(|custom| !custom.packages.is_empty()) {
        return custom
            .packages
            .iter()
            .map(|dims| Package {
                weight: dims.weight,
                width: dims.width,
                height: dims.height,
                length: dims.length,
                package_type: PackageType::Box,
            })
            .collect();
    }

    let mut packages: Vec<Package> = order
        .items
        .iter()
        .map(|item| {
            let weight = positive_or(item.weight, defaults.weight);
            Package {
                weight: round2(weight * f64::from(item.quantity)),
                width: round2(positive_or(item.width, defaults.width)),
                height: round2(positive_or(item.height, defaults.height)),
                length: round2(positive_or(item.length, defaults.length)),
                package_type: PackageType::Package,
            }
        })
        .collect();

    if packages.is_empty() {
        packages.push(Package {
            weight: round2(defaults.weight.max(MIN_PACKAGE_WEIGHT)),
            width: round2(defaults.width),
            height: round2(defaults.height),
            length: round2(defaults.length),
            package_type: PackageType::Package,
        });
    }

    packages
}

/// `WooCommerce Order #N: Name (xQ), ...` listing the first three lines, capped at 250
/// characters.
pub fn package_description(order: &Order) -> String {
    let mut description = format!("WooCommerce Order #{}", order.number());

    let items: Vec<String> = order
        .items
        .iter()
        .map(|item| format!("{} (x{})", item.name, item.quantity))
        .collect();

    if !items.is_empty() {
        description.push_str(": ");
        let listed = items.len().min(DESCRIPTION_LISTED_ITEMS);
        description.push_str(&items[..listed].join(", "));
        if items.len() > DESCRIPTION_LISTED_ITEMS {
            description.push_str(&format!(
                " and {} more items",
                items.len() - DESCRIPTION_LISTED_ITEMS
            ));
        }
    }

    description.chars().take(DESCRIPTION_MAX_CHARS).collect()
}

fn invalid_custom_data(reason: String) -> ValidationError {
    ValidationError::InvalidCustomData { reason }
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(default)
}
