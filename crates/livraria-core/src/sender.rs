//! Sender profile handling.
//!
//! The courier returns sender profiles in irregular shapes: a single object,
//! a bare array, or an array wrapped in `data`. Addresses may sit in an
//! `address` sub-object, directly on the profile, or in some other nested
//! object. Discovery runs an ordered list of extraction strategies and
//! completes any gaps from the locally configured [`SenderSettings`].

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::SenderSettings;
use crate::domain::quote::scalar_to_string;

const NESTED_SEARCH_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SenderAddressError {
    #[error("Sender address missing required field: {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },
}

/// One sender profile as returned by the courier API.
#[derive(Debug, Clone, PartialEq)]
pub struct SenderProfile(Value);

impl SenderProfile {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn id(&self) -> Option<String> {
        text_field(&self.0, &["id", "_id"])
    }

    /// Human-readable profile name: `name`, then `companyName`, then the
    /// company object (`company.name`, `company.companyName`) or a plain
    /// `company` string.
    pub fn display_name(&self) -> Option<String> {
        text_field(&self.0, &["name", "companyName"]).or_else(|| match self.0.get("company") {
            Some(company @ Value::Object(_)) => text_field(company, &["name", "companyName"]),
            Some(company) => scalar_to_string(company),
            None => None,
        })
    }

    /// IBAN that cash-on-delivery amounts are paid into.
    pub fn cod_iban(&self) -> Option<String> {
        text_field(&self.0, &["codIban"])
    }

    /// Sender identity, with local settings filling absent values.
    pub fn identity(&self, settings: &SenderSettings) -> SenderIdentity {
        SenderIdentity {
            name: self.display_name().unwrap_or_else(|| settings.name.clone()),
            email: text_field(&self.0, &["email"]).unwrap_or_else(|| settings.email.clone()),
            phone: text_field(&self.0, &["phone", "phoneNumber"])
                .unwrap_or_else(|| settings.phone.clone()),
            is_company: self.0.get("isCompany").is_some_and(|flag| match flag {
                Value::Bool(flag) => *flag,
                Value::Number(number) => number.as_i64().is_some_and(|n| n != 0),
                Value::String(text) => text == "1" || text.eq_ignore_ascii_case("true"),
                _ => false,
            }),
        }
    }

    /// Sender address from this profile, completed from `settings`.
    pub fn address(&self, settings: &SenderSettings) -> Result<PostalAddress, SenderAddressError> {
        let discovered = ADDRESS_STRATEGIES
            .iter()
            .find_map(|strategy| strategy(&self.0))
            .unwrap_or_default();

        discovered.completed_from(settings).validated()
    }
}

/// Name and contact details of the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub is_company: bool,
}

impl SenderIdentity {
    pub fn from_settings(settings: &SenderSettings) -> Self {
        Self {
            name: settings.name.clone(),
            email: settings.email.clone(),
            phone: settings.phone.clone(),
            is_company: false,
        }
    }
}

/// Postal address of a sender or recipient as sent to the courier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub country: String,
    pub county: String,
    pub city: String,
    pub postcode: String,
    pub street: String,
    pub street_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub block: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub staircase: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub floor: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub apartment: String,
}

impl PostalAddress {
    /// Address built from local settings alone.
    pub fn from_settings(settings: &SenderSettings) -> Result<Self, SenderAddressError> {
        Self::default().completed_from(settings).validated()
    }

    fn completed_from(self, settings: &SenderSettings) -> Self {
        let pick = |own: String, fallback: &str| {
            if own.trim().is_empty() {
                fallback.trim().to_owned()
            } else {
                own
            }
        };

        Self {
            country: pick(self.country, &settings.country),
            county: pick(self.county, &settings.county),
            city: pick(self.city, &settings.city),
            postcode: pick(self.postcode, &settings.postcode),
            street: pick(self.street, &settings.street),
            street_number: pick(self.street_number, &settings.street_number),
            block: pick(self.block, &settings.block),
            staircase: pick(self.staircase, &settings.staircase),
            floor: pick(self.floor, &settings.floor),
            apartment: pick(self.apartment, &settings.apartment),
        }
    }

    fn validated(self) -> Result<Self, SenderAddressError> {
        let required = [
            ("country", &self.country),
            ("county", &self.county),
            ("city", &self.city),
            ("postcode", &self.postcode),
            ("street", &self.street),
        ];
        let fields: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if fields.is_empty() {
            Ok(self)
        } else {
            Err(SenderAddressError::MissingFields { fields })
        }
    }
}

type AddressStrategy = fn(&Value) -> Option<PostalAddress>;

const ADDRESS_STRATEGIES: &[AddressStrategy] =
    &[address_sub_object, top_level_fields, nested_address_object];

fn address_sub_object(profile: &Value) -> Option<PostalAddress> {
    profile
        .get("address")
        .filter(|address| address.is_object())
        .and_then(address_from_object)
}

fn top_level_fields(profile: &Value) -> Option<PostalAddress> {
    let has_location = ["street", "city", "country"]
        .iter()
        .any(|key| profile.get(*key).and_then(scalar_to_string).is_some());
    if has_location {
        address_from_object(profile)
    } else {
        None
    }
}

fn nested_address_object(profile: &Value) -> Option<PostalAddress> {
    fn search(value: &Value, depth: usize) -> Option<PostalAddress> {
        if depth == 0 {
            return None;
        }
        let object = value.as_object()?;
        object
            .values()
            .filter(|child| child.is_object())
            .find_map(|child| {
                let shaped = child.get("street").is_some() || child.get("city").is_some();
                if shaped {
                    address_from_object(child)
                } else {
                    search(child, depth - 1)
                }
            })
    }

    search(profile, NESTED_SEARCH_DEPTH)
}

fn address_from_object(value: &Value) -> Option<PostalAddress> {
    let field = |keys: &[&str]| text_field(value, keys).unwrap_or_default();
    let address = PostalAddress {
        country: field(&["country", "countryName"]),
        county: field(&["county", "state", "region"]),
        city: field(&["city", "locality"]),
        postcode: field(&["postcode", "postalCode", "zipCode"]),
        street: field(&["street", "streetName"]),
        street_number: field(&["streetNumber", "number"]),
        block: field(&["block"]),
        staircase: field(&["staircase"]),
        floor: field(&["floor"]),
        apartment: field(&["apartment"]),
    };

    if address == PostalAddress::default() {
        None
    } else {
        Some(address)
    }
}

fn text_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(scalar_to_string))
}

/// Every profile found in a sender-profile response.
pub fn profiles_from_response(response: &Value) -> Vec<SenderProfile> {
    let entries = match response {
        Value::Array(entries) => entries.clone(),
        Value::Object(object) => match object.get("data") {
            Some(Value::Array(entries)) => entries.clone(),
            Some(entry @ Value::Object(_)) => vec![entry.clone()],
            _ => vec![response.clone()],
        },
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter(Value::is_object)
        .map(SenderProfile::new)
        .collect()
}

/// The profile with `preferred_id`, or the first profile when no preference
/// is configured or the preferred profile no longer exists.
pub fn select_profile(profiles: Vec<SenderProfile>, preferred_id: Option<&str>) -> Option<SenderProfile> {
    let position = preferred_id.and_then(|wanted| {
        profiles
            .iter()
            .position(|profile| profile.id().as_deref() == Some(wanted))
    });

    match position {
        Some(index) => profiles.into_iter().nth(index),
        None => {
            if let Some(wanted) = preferred_id {
                tracing::warn!(profile_id = wanted, "preferred sender profile not found, using first");
            }
            profiles.into_iter().next()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: Value) -> SenderProfile {
        SenderProfile::new(value)
    }

    #[test]
    fn identity_comes_from_profile() {
        let identity = profile(json!({
            "name": "Test Sender",
            "email": "sender@example.com",
            "phone": "+40123456789",
            "isCompany": true,
            "cui": "RO12345678"
        }))
        .identity(&SenderSettings::default());

        assert_eq!(identity.name, "Test Sender");
        assert_eq!(identity.email, "sender@example.com");
        assert_eq!(identity.phone, "+40123456789");
        assert!(identity.is_company);
    }

    #[test]
    fn address_is_read_from_address_sub_object() {
        let address = profile(json!({
            "name": "Test Sender",
            "address": {
                "street": "Test Street",
                "streetNumber": "123",
                "city": "Bucharest",
                "county": "Bucharest",
                "country": "Romania",
                "postcode": "010001"
            }
        }))
        .address(&SenderSettings::default())
        .expect("complete address");

        assert_eq!(address.street, "Test Street");
        assert_eq!(address.city, "Bucharest");
        assert_eq!(address.country, "Romania");
    }

    #[test]
    fn address_is_read_from_top_level_fields() {
        let address = profile(json!({
            "name": "Test Sender",
            "street": "Test Street",
            "streetNumber": "123",
            "city": "Bucharest",
            "county": "Bucharest",
            "country": "Romania",
            "postcode": "010001"
        }))
        .address(&SenderSettings::default())
        .expect("complete address");

        assert_eq!(address.street, "Test Street");
        assert_eq!(address.street_number, "123");
    }

    #[test]
    fn address_is_found_in_nested_object() {
        let address = profile(json!({
            "name": "Depot",
            "company": {"headquarters": {
                "street": "Str. Lunga", "city": "Cluj-Napoca", "county": "Cluj",
                "country": "Romania", "postalCode": "400001"
            }}
        }))
        .address(&SenderSettings::default())
        .expect("complete address");

        assert_eq!(address.postcode, "400001");
    }

    #[test]
    fn incomplete_profile_reports_missing_fields() {
        let error = profile(json!({"name": "Test Sender", "city": "Bucharest"}))
            .address(&SenderSettings::default())
            .expect_err("incomplete");

        assert!(error.to_string().contains("missing required field"));
        assert_eq!(
            error,
            SenderAddressError::MissingFields {
                fields: vec!["country", "county", "postcode", "street"],
            }
        );
    }

    #[test]
    fn local_settings_complete_partial_profile() {
        let settings = SenderSettings {
            country: String::from("Romania"),
            county: String::from("Ilfov"),
            postcode: String::from("077190"),
            street: String::from("Sos. Centurii"),
            ..SenderSettings::default()
        };

        let address = profile(json!({"city": "Voluntari"}))
            .address(&settings)
            .expect("completed");

        assert_eq!(address.city, "Voluntari");
        assert_eq!(address.county, "Ilfov");
    }

    #[test]
    fn display_name_falls_back_to_company() {
        assert_eq!(
            profile(json!({"companyName": "Carte SRL"})).display_name().as_deref(),
            Some("Carte SRL")
        );
        assert_eq!(
            profile(json!({"company": {"companyName": "Depozit SA"}})).display_name().as_deref(),
            Some("Depozit SA")
        );
        assert_eq!(
            profile(json!({"company": "Tipo SRL"})).display_name().as_deref(),
            Some("Tipo SRL")
        );
    }

    #[test]
    fn profile_list_accepts_every_response_shape() {
        assert_eq!(profiles_from_response(&json!({"id": "p1"})).len(), 1);
        assert_eq!(profiles_from_response(&json!([{"id": "p1"}, {"id": "p2"}])).len(), 2);
        assert_eq!(profiles_from_response(&json!({"data": [{"id": "p1"}]})).len(), 1);
        assert_eq!(profiles_from_response(&json!({"data": {"id": "p1"}})).len(), 1);
        assert!(profiles_from_response(&json!("nope")).is_empty());
    }

    #[test]
    fn preferred_profile_is_selected_by_id() {
        let profiles = profiles_from_response(&json!([{"id": "p1"}, {"id": "p2"}]));

        let chosen = select_profile(profiles.clone(), Some("p2")).expect("profile");
        assert_eq!(chosen.id().as_deref(), Some("p2"));

        let fallback = select_profile(profiles, Some("gone")).expect("profile");
        assert_eq!(fallback.id().as_deref(), Some("p1"));
    }
}
