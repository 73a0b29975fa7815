use serde::{Deserialize, Serialize};

/// Postal and contact fields of an order address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderAddress {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    /// County or region code.
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

/// Address fields that fall back from shipping to billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    FirstName,
    LastName,
    Address1,
    City,
    State,
    Postcode,
    Country,
}

impl OrderAddress {
    pub fn field(&self, field: AddressField) -> &str {
        match field {
            AddressField::FirstName => &self.first_name,
            AddressField::LastName => &self.last_name,
            AddressField::Address1 => &self.address_1,
            AddressField::City => &self.city,
            AddressField::State => &self.state,
            AddressField::Postcode => &self.postcode,
            AddressField::Country => &self.country,
        }
    }
}

/// One order line with the product's shipping attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub length: Option<f64>,
}

fn default_quantity() -> u32 {
    1
}

/// Order as handed over by the host platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    /// Display number; the id is used when absent.
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub payment_method_title: String,
    #[serde(default)]
    pub billing: OrderAddress,
    #[serde(default)]
    pub shipping: OrderAddress,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Private notes recorded against the order.
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Order {
    pub fn number(&self) -> String {
        self.number
            .as_deref()
            .map(str::trim)
            .filter(|number| !number.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Shipping value for `field`, or the billing value when the shipping one
    /// is blank.
    pub fn shipping_or_billing(&self, field: AddressField) -> &str {
        let shipping = self.shipping.field(field).trim();
        if shipping.is_empty() {
            self.billing.field(field).trim()
        } else {
            shipping
        }
    }
}
