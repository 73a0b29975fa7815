//! Courier request bodies built from orders, sender profiles and settings.

use serde::Serialize;

use crate::config::Settings;
use crate::domain::{
    build_packages, package_description, pickup_date, AddressField, CustomExpeditionData, Order,
    Package, UtcDateTime,
};
use crate::normalize::{
    external_ref, normalize_locality, parse_phone, parse_recipient_phone, recipient_county,
    round2, PhoneNumber,
};
use crate::sender::{PostalAddress, SenderAddressError, SenderIdentity, SenderProfile};

pub const EARLIEST_PICKUP_TIME: &str = "09:00";
pub const LATEST_PICKUP_TIME: &str = "18:00";
pub const COD_COLLECTOR: &str = "CLIENT";
pub const COURIER_SERVICE_PAYER: &str = "THIRD_PARTY";

const COD_TITLE_MARKERS: &[&str] = &[
    "cash on delivery",
    "payment on delivery",
    "pay on delivery",
    "plata la livrare",
    "ramburs",
];

/// Validation labels in the order they are reported.
const REQUIRED_ORDER_FIELDS: &[(RequiredField, &str)] = &[
    (RequiredField::Address(AddressField::FirstName), "Shipping First Name"),
    (RequiredField::Address(AddressField::LastName), "Shipping Last Name"),
    (RequiredField::Address(AddressField::Address1), "Shipping Address"),
    (RequiredField::Address(AddressField::City), "Shipping City"),
    (RequiredField::Address(AddressField::Postcode), "Shipping Postal Code"),
    (RequiredField::Address(AddressField::Country), "Shipping Country"),
    (RequiredField::BillingEmail, "Email Address"),
    (RequiredField::BillingPhone, "Phone Number"),
];

#[derive(Debug, Clone, Copy)]
enum RequiredField {
    Address(AddressField),
    BillingEmail,
    BillingPhone,
}

/// Labels of every shipping field the order lacks. Shipping values fall back
/// to billing; email and phone are read from billing only.
pub fn missing_order_fields(order: &Order) -> Vec<&'static str> {
    REQUIRED_ORDER_FIELDS
        .iter()
        .filter(|(field, _)| {
            let value = match field {
                RequiredField::Address(field) => order.shipping_or_billing(*field),
                RequiredField::BillingEmail => order.billing.email.trim(),
                RequiredField::BillingPhone => order.billing.phone.trim(),
            };
            value.is_empty()
        })
        .map(|(_, label)| *label)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestPayload {
    pub create_quote_request_dto: QuoteRequestDto,
    pub courier_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestDto {
    pub sender: Party,
    pub recipient: Party,
    pub content: Content,
    pub package_description: String,
    pub shipment_note: String,
    pub external_ref: String,
    pub service: Service,
    pub payment_info: PaymentInfo,
}

/// Sender or recipient of a shipment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub phone: PhoneNumber,
    pub is_company: bool,
    pub address: PostalAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub pickup_date: String,
    pub earliest_pickup_time: String,
    pub latest_pickup_time: String,
    pub saturday_delivery: bool,
    pub open_on_delivery: bool,
    pub cod: Cod,
    pub insurance: Insurance,
}

/// Cash-on-delivery instructions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cod {
    pub amount: f64,
    pub collector: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insurance {
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub courier_service_payer: String,
}

/// `{quoteRequestId, courierQuoteId}` for selecting a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectQuotePayload {
    pub quote_request_id: String,
    pub courier_quote_id: String,
}

/// `{quoteRequestId, senderProfileId}` for attaching billing information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfoPayload {
    pub quote_request_id: String,
    pub sender_profile_id: String,
}

/// `{quoteRequestId, courierQuoteId, billingInfoId}` for creating an
/// expedition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpeditionPayload {
    pub quote_request_id: String,
    pub courier_quote_id: String,
    pub billing_info_id: String,
}

/// Expedition body of the one-shot flow, carrying billing inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineExpeditionPayload {
    pub quote_request_id: String,
    pub courier_quote_id: String,
    pub billing_info: InlineBillingInfo,
    pub notes: String,
    pub pickup_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineBillingInfo {
    pub name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub county: String,
}

impl InlineExpeditionPayload {
    pub fn new(
        order: &Order,
        quote_request_id: impl Into<String>,
        courier_quote_id: impl Into<String>,
        pickup: UtcDateTime,
    ) -> Self {
        let billing = &order.billing;
        Self {
            quote_request_id: quote_request_id.into(),
            courier_quote_id: courier_quote_id.into(),
            billing_info: InlineBillingInfo {
                name: format!("{} {}", billing.first_name.trim(), billing.last_name.trim())
                    .trim()
                    .to_owned(),
                email: billing.email.trim().to_owned(),
                street: billing.address_1.trim().to_owned(),
                city: billing.city.trim().to_owned(),
                county: billing.state.trim().to_owned(),
            },
            notes: format!("WooCommerce Order #{}", order.number()),
            pickup_date: pickup.format_millis(),
        }
    }
}

/// Everything a quote request is assembled from.
#[derive(Debug, Clone, Copy)]
pub struct QuoteInputs<'a> {
    pub order: &'a Order,
    pub custom: Option<&'a CustomExpeditionData>,
    pub settings: &'a Settings,
    pub profile: Option<&'a SenderProfile>,
    pub courier_ids: &'a [String],
    pub now: UtcDateTime,
}

/// Build the quote request body. Fails only when no complete sender address
/// can be assembled.
pub fn build_quote_request(inputs: QuoteInputs<'_>) -> Result<QuoteRequestPayload, SenderAddressError> {
    let QuoteInputs {
        order,
        custom,
        settings,
        profile,
        courier_ids,
        now,
    } = inputs;

    let sender = sender_party(profile, settings)?;
    let recipient = recipient_party(order);

    let description = custom
        .and_then(CustomExpeditionData::content_description)
        .map(str::to_owned)
        .unwrap_or_else(|| package_description(order));

    let shop = if settings.shop_name.is_empty() {
        "shop"
    } else {
        settings.shop_name.as_str()
    };

    let cod_amount = round2(cod_amount(order, custom));
    let insurance_amount = round2(
        custom
            .and_then(|custom| custom.insurance_amount)
            .unwrap_or(settings.insurance_amount),
    );
    let pickup = pickup_date(now, settings.pickup_days_offset, settings.skip_weekends);

    Ok(QuoteRequestPayload {
        create_quote_request_dto: QuoteRequestDto {
            sender,
            recipient,
            content: Content {
                packages: build_packages(order, custom, &settings.package_defaults),
            },
            package_description: description,
            shipment_note: format!("Order from {shop} - Order #{}", order.number()),
            external_ref: external_ref(&settings.shop_name, order.id),
            service: Service {
                pickup_date: pickup.format_millis(),
                earliest_pickup_time: String::from(EARLIEST_PICKUP_TIME),
                latest_pickup_time: String::from(LATEST_PICKUP_TIME),
                saturday_delivery: custom
                    .and_then(|custom| custom.saturday_delivery)
                    .unwrap_or(false),
                open_on_delivery: custom
                    .and_then(|custom| custom.open_on_delivery)
                    .unwrap_or(settings.open_on_delivery),
                cod: build_cod_object(cod_amount, profile),
                insurance: Insurance {
                    amount: insurance_amount,
                },
            },
            payment_info: PaymentInfo {
                courier_service_payer: String::from(COURIER_SERVICE_PAYER),
            },
        },
        courier_names: courier_ids.to_vec(),
    })
}

/// COD block. `bankAccount` is the profile's `codIban` and is only sent when
/// there is an amount to collect.
pub fn build_cod_object(amount: f64, profile: Option<&SenderProfile>) -> Cod {
    let bank_account = if amount > 0.0 {
        profile.and_then(SenderProfile::cod_iban)
    } else {
        None
    };

    Cod {
        amount,
        collector: String::from(COD_COLLECTOR),
        bank_account,
    }
}

/// Amount to collect on delivery: the custom amount when given, else the
/// order total for cash-on-delivery orders, else nothing.
pub fn cod_amount(order: &Order, custom: Option<&CustomExpeditionData>) -> f64 {
    if let Some(amount) = custom.and_then(|custom| custom.cod_amount) {
        return amount.max(0.0);
    }
    if is_cod_payment(order) {
        order.total.max(0.0)
    } else {
        0.0
    }
}

/// Payment method id `cod`, or a title naming cash on delivery.
pub fn is_cod_payment(order: &Order) -> bool {
    if order.payment_method.trim().eq_ignore_ascii_case("cod") {
        return true;
    }

    let title = order.payment_method_title.to_lowercase();
    COD_TITLE_MARKERS.iter().any(|marker| title.contains(marker))
}

fn sender_party(
    profile: Option<&SenderProfile>,
    settings: &Settings,
) -> Result<Party, SenderAddressError> {
    let (identity, address) = match profile {
        Some(profile) => (profile.identity(&settings.sender), profile.address(&settings.sender)?),
        None => (
            SenderIdentity::from_settings(&settings.sender),
            PostalAddress::from_settings(&settings.sender)?,
        ),
    };

    let name = if identity.name.trim().is_empty() {
        settings.shop_name.clone()
    } else {
        identity.name
    };

    Ok(Party {
        name,
        email: identity.email,
        phone: parse_phone(&identity.phone),
        is_company: identity.is_company || profile.is_none(),
        address: PostalAddress {
            county: normalize_locality(&address.county),
            city: normalize_locality(&address.city),
            ..address
        },
    })
}

fn recipient_party(order: &Order) -> Party {
    let first = order.shipping_or_billing(AddressField::FirstName);
    let last = order.shipping_or_billing(AddressField::LastName);
    let (street, street_number) = split_street_number(order.shipping_or_billing(AddressField::Address1));

    let state = order.shipping_or_billing(AddressField::State);
    let city = order.shipping_or_billing(AddressField::City);
    let county = if state.is_empty() {
        normalize_locality(city)
    } else {
        recipient_county(state)
    };

    Party {
        name: format!("{first} {last}").trim().to_owned(),
        email: order.billing.email.trim().to_owned(),
        phone: parse_recipient_phone(&order.billing.phone),
        is_company: !order.shipping.company.trim().is_empty(),
        address: PostalAddress {
            country: order.shipping_or_billing(AddressField::Country).to_owned(),
            county,
            city: normalize_locality(city),
            postcode: order.shipping_or_billing(AddressField::Postcode).to_owned(),
            street,
            street_number,
            ..PostalAddress::default()
        },
    }
}

/// Split a trailing house number off a street line: `Str. Lunga 12A` becomes
/// (`Str. Lunga`, `12A`). Lines without one keep number `1`.
fn split_street_number(line: &str) -> (String, String) {
    let line = line.trim();
    if let Some((street, number)) = line.rsplit_once(' ') {
        let number = number.trim_start_matches("nr.").trim_start_matches("Nr.");
        if number.starts_with(|ch: char| ch.is_ascii_digit()) && !street.trim().is_empty() {
            return (
                street.trim().trim_end_matches(',').to_owned(),
                number.to_owned(),
            );
        }
    }
    (line.to_owned(), String::from("1"))
}
