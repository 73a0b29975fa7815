//! Transport configuration and business settings.
//!
//! [`CourierConfig`] describes how to reach the courier API. [`Settings`]
//! carries the business options read from the [`OptionStore`] on every
//! operation, so changes made between calls take effect immediately.

use std::env;

use livraria_store::{OptionStore, StoreError};
use thiserror::Error;

use crate::domain::SelectionPolicy;

/// Option names shared with the store.
pub mod option_names {
    pub const API_BASE_URL: &str = "courier_api_base_url";
    pub const API_USERNAME: &str = "courier_api_username";
    pub const API_PASSWORD: &str = "courier_api_password";
    pub const API_TOKEN: &str = "livraria_api_token";
    pub const TOKEN_EXPIRES_AT: &str = "livraria_token_expires_at";
    pub const REMEMBER_CREDENTIALS: &str = "livraria_remember_credentials";
    pub const DEFAULT_SENDER_PROFILE_ID: &str = "livraria_default_sender_profile_id";
    pub const AUTO_CREATE: &str = "courier_auto_create";
    pub const QUOTE_SELECTION: &str = "courier_quote_selection";
    pub const PICKUP_DAYS_OFFSET: &str = "courier_pickup_days_offset";
    pub const SKIP_WEEKENDS: &str = "courier_skip_weekends";
    pub const PACKAGE_WEIGHT: &str = "courier_default_package_weight";
    pub const PACKAGE_WIDTH: &str = "courier_default_package_width";
    pub const PACKAGE_HEIGHT: &str = "courier_default_package_height";
    pub const PACKAGE_LENGTH: &str = "courier_default_package_length";
    pub const SENDER_NAME: &str = "courier_default_sender_name";
    pub const SENDER_EMAIL: &str = "courier_default_sender_email";
    pub const SENDER_PHONE: &str = "courier_default_sender_phone";
    pub const SENDER_COUNTRY: &str = "courier_sender_country";
    pub const SENDER_COUNTY: &str = "courier_sender_county";
    pub const SENDER_CITY: &str = "courier_sender_city";
    pub const SENDER_POSTCODE: &str = "courier_sender_postcode";
    pub const SENDER_STREET: &str = "courier_sender_street";
    pub const SENDER_STREET_NUMBER: &str = "courier_sender_street_number";
    pub const SENDER_BLOCK: &str = "courier_sender_block";
    pub const SENDER_STAIRCASE: &str = "courier_sender_staircase";
    pub const SENDER_FLOOR: &str = "courier_sender_floor";
    pub const SENDER_APARTMENT: &str = "courier_sender_apartment";
    pub const OPEN_ON_DELIVERY: &str = "courier_default_open_on_delivery";
    pub const INSURANCE_AMOUNT: &str = "courier_default_insurance_amount";
    pub const SHOP_NAME: &str = "shop_name";
}

/// Options that may be changed one at a time from outside the settings
/// screen.
pub const UPDATABLE_OPTIONS: &[&str] = &[
    option_names::AUTO_CREATE,
    option_names::DEFAULT_SENDER_PROFILE_ID,
];

pub const DEFAULT_USER_AGENT: &str = concat!("livraria/", env!("CARGO_PKG_VERSION"));
pub const REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const CONNECTIVITY_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Option not allowed: {0}")]
    OptionNotAllowed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How to reach the courier API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourierConfig {
    /// Base URL without a trailing slash. Empty when not configured.
    pub base_url: String,
    pub verify_tls: bool,
    pub request_timeout_ms: u64,
    pub connectivity_timeout_ms: u64,
    pub user_agent: String,
}

impl CourierConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
            verify_tls: true,
            request_timeout_ms: REQUEST_TIMEOUT_MS,
            connectivity_timeout_ms: CONNECTIVITY_TIMEOUT_MS,
            user_agent: String::from(DEFAULT_USER_AGENT),
        }
    }

    /// Resolve the base URL from `LIVRARIA_API_BASE_URL`, falling back to the
    /// stored option. TLS verification is only relaxed in development mode.
    pub fn from_options(options: &dyn OptionStore) -> Result<Self, StoreError> {
        let base_url = match env::var("LIVRARIA_API_BASE_URL") {
            Ok(value) if !value.trim().is_empty() => value,
            _ => options
                .get_option(option_names::API_BASE_URL)?
                .unwrap_or_default(),
        };

        Ok(Self::new(base_url).with_verify_tls(!is_development_mode()))
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }
}

/// Development mode is opted into explicitly with `LIVRARIA_DEV_MODE`.
pub fn is_development_mode() -> bool {
    env::var("LIVRARIA_DEV_MODE")
        .map(|value| parse_flag(&value).unwrap_or(false))
        .unwrap_or(false)
}

/// Default package used when an order carries no usable line items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackageDefaults {
    pub weight: f64,
    pub width: f64,
    pub height: f64,
    pub length: f64,
}

impl Default for PackageDefaults {
    fn default() -> Self {
        Self {
            weight: 0.5,
            width: 20.0,
            height: 10.0,
            length: 30.0,
        }
    }
}

/// Locally configured sender identity and address, used wherever the
/// courier-side sender profile is absent or incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderSettings {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub county: String,
    pub city: String,
    pub postcode: String,
    pub street: String,
    pub street_number: String,
    pub block: String,
    pub staircase: String,
    pub floor: String,
    pub apartment: String,
}

/// Business options consulted by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub auto_create: bool,
    pub default_sender_profile_id: Option<String>,
    pub quote_selection: SelectionPolicy,
    pub pickup_days_offset: u32,
    pub skip_weekends: bool,
    pub package_defaults: PackageDefaults,
    pub sender: SenderSettings,
    pub open_on_delivery: bool,
    pub insurance_amount: f64,
    pub shop_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_create: false,
            default_sender_profile_id: None,
            quote_selection: SelectionPolicy::First,
            pickup_days_offset: 1,
            skip_weekends: true,
            package_defaults: PackageDefaults::default(),
            sender: SenderSettings::default(),
            open_on_delivery: false,
            insurance_amount: 0.0,
            shop_name: String::new(),
        }
    }
}

impl Settings {
    pub fn load(options: &dyn OptionStore) -> Result<Self, StoreError> {
        let defaults = Self::default();
        let text = |name: &str| -> Result<String, StoreError> {
            Ok(options
                .get_option(name)?
                .map(|value| value.trim().to_owned())
                .unwrap_or_default())
        };

        let quote_selection = match text(option_names::QUOTE_SELECTION)?.as_str() {
            "" => defaults.quote_selection,
            raw => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = raw, "unknown quote selection policy, using 'first'");
                SelectionPolicy::First
            }),
        };

        let package_defaults = PackageDefaults {
            weight: number_or(&text(option_names::PACKAGE_WEIGHT)?, defaults.package_defaults.weight),
            width: number_or(&text(option_names::PACKAGE_WIDTH)?, defaults.package_defaults.width),
            height: number_or(&text(option_names::PACKAGE_HEIGHT)?, defaults.package_defaults.height),
            length: number_or(&text(option_names::PACKAGE_LENGTH)?, defaults.package_defaults.length),
        };

        let sender = SenderSettings {
            name: text(option_names::SENDER_NAME)?,
            email: text(option_names::SENDER_EMAIL)?,
            phone: text(option_names::SENDER_PHONE)?,
            country: text(option_names::SENDER_COUNTRY)?,
            county: text(option_names::SENDER_COUNTY)?,
            city: text(option_names::SENDER_CITY)?,
            postcode: text(option_names::SENDER_POSTCODE)?,
            street: text(option_names::SENDER_STREET)?,
            street_number: text(option_names::SENDER_STREET_NUMBER)?,
            block: text(option_names::SENDER_BLOCK)?,
            staircase: text(option_names::SENDER_STAIRCASE)?,
            floor: text(option_names::SENDER_FLOOR)?,
            apartment: text(option_names::SENDER_APARTMENT)?,
        };

        let default_sender_profile_id = Some(text(option_names::DEFAULT_SENDER_PROFILE_ID)?)
            .filter(|value| !value.is_empty());

        Ok(Self {
            auto_create: flag_or(&text(option_names::AUTO_CREATE)?, defaults.auto_create),
            default_sender_profile_id,
            quote_selection,
            pickup_days_offset: text(option_names::PICKUP_DAYS_OFFSET)?
                .parse()
                .unwrap_or(defaults.pickup_days_offset),
            skip_weekends: flag_or(&text(option_names::SKIP_WEEKENDS)?, defaults.skip_weekends),
            package_defaults,
            sender,
            open_on_delivery: flag_or(
                &text(option_names::OPEN_ON_DELIVERY)?,
                defaults.open_on_delivery,
            ),
            insurance_amount: number_or(
                &text(option_names::INSURANCE_AMOUNT)?,
                defaults.insurance_amount,
            ),
            shop_name: text(option_names::SHOP_NAME)?,
        })
    }
}

/// Write one of the [`UPDATABLE_OPTIONS`].
pub fn update_allowed_option(
    options: &dyn OptionStore,
    name: &str,
    value: &str,
) -> Result<(), ConfigError> {
    if !UPDATABLE_OPTIONS.contains(&name) {
        return Err(ConfigError::OptionNotAllowed(name.to_owned()));
    }

    options.set_option(name, value.trim())?;
    tracing::info!(option = name, "option updated");
    Ok(())
}

/// Parse a stored boolean flag. Unrecognised text yields `None`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn flag_or(raw: &str, default: bool) -> bool {
    if raw.is_empty() {
        return default;
    }
    parse_flag(raw).unwrap_or(default)
}

fn number_or(raw: &str, default: f64) -> f64 {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}
