//! Text normalisation for courier payloads.
//!
//! The courier matches localities against an ASCII, upper-case nomenclature,
//! so counties and cities are stripped of Romanian diacritics and upper-cased
//! before they are sent.

use serde::Serialize;

/// Romanian county codes (ISO 3166-2:RO suffixes) and their names.
const ROMANIAN_REGIONS: &[(&str, &str)] = &[
    ("AB", "Alba"),
    ("AR", "Arad"),
    ("AG", "Argeș"),
    ("BC", "Bacău"),
    ("BH", "Bihor"),
    ("BN", "Bistrița-Năsăud"),
    ("BT", "Botoșani"),
    ("BV", "Brașov"),
    ("BR", "Brăila"),
    ("B", "București"),
    ("BZ", "Buzău"),
    ("CS", "Caraș-Severin"),
    ("CL", "Călărași"),
    ("CJ", "Cluj"),
    ("CT", "Constanța"),
    ("CV", "Covasna"),
    ("DB", "Dâmbovița"),
    ("DJ", "Dolj"),
    ("GL", "Galați"),
    ("GR", "Giurgiu"),
    ("GJ", "Gorj"),
    ("HR", "Harghita"),
    ("HD", "Hunedoara"),
    ("IL", "Ialomița"),
    ("IS", "Iași"),
    ("IF", "Ilfov"),
    ("MM", "Maramureș"),
    ("MH", "Mehedinți"),
    ("MS", "Mureș"),
    ("NT", "Neamț"),
    ("OT", "Olt"),
    ("PH", "Prahova"),
    ("SM", "Satu Mare"),
    ("SJ", "Sălaj"),
    ("SB", "Sibiu"),
    ("SV", "Suceava"),
    ("TR", "Teleorman"),
    ("TM", "Timiș"),
    ("TL", "Tulcea"),
    ("VS", "Vaslui"),
    ("VL", "Vâlcea"),
    ("VN", "Vrancea"),
];

const DEFAULT_COUNTRY_CODE: &str = "+40";
const EXTERNAL_REF_SLUG_MAX_CHARS: usize = 50;

/// Replace Romanian letters with diacritics by their ASCII base letter.
/// Every other character is kept as is.
pub fn remove_diacritics(input: &str) -> String {
    input
        .chars()
        .map(|ch| match ch {
            'ă' | 'â' => 'a',
            'Ă' | 'Â' => 'A',
            'î' => 'i',
            'Î' => 'I',
            'ș' | 'ş' => 's',
            'Ș' | 'Ş' => 'S',
            'ț' | 'ţ' => 't',
            'Ț' | 'Ţ' => 'T',
            other => other,
        })
        .collect()
}

/// Trimmed, diacritic-free, upper-case form of a county or city.
pub fn normalize_locality(input: &str) -> String {
    remove_diacritics(input.trim()).to_uppercase()
}

/// Region name for a Romanian county code, e.g. `CJ` to `Cluj`.
pub fn region_name(code: &str) -> Option<&'static str> {
    let code = code.trim();
    let code = code
        .get(..3)
        .filter(|prefix| prefix.eq_ignore_ascii_case("RO-"))
        .map_or(code, |_| &code[3..]);

    ROMANIAN_REGIONS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// County sent for a recipient: a known region code becomes the region
/// name, then the value is normalised.
pub fn recipient_county(state: &str) -> String {
    normalize_locality(region_name(state).unwrap_or(state))
}

/// Phone number split into an international prefix and national number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    pub phone_country_code: String,
    #[serde(rename = "phoneNSN")]
    pub phone_nsn: String,
}

/// Split `+` followed by one to three digits off the front of `raw`.
///
/// The prefix match is greedy, so `+40123456789` yields `+401` and
/// `23456789`. Without a leading `+` the whole number is the national part
/// and the country code is empty.
pub fn parse_phone(raw: &str) -> PhoneNumber {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();

    if let Some(rest) = compact.strip_prefix('+') {
        let digits = rest
            .chars()
            .take(3)
            .take_while(char::is_ascii_digit)
            .count();
        if digits > 0 {
            return PhoneNumber {
                phone_country_code: format!("+{}", &rest[..digits]),
                phone_nsn: rest[digits..].to_owned(),
            };
        }
    }

    PhoneNumber {
        phone_country_code: String::new(),
        phone_nsn: compact,
    }
}

/// Recipient phones default to the Romanian prefix.
pub fn parse_recipient_phone(raw: &str) -> PhoneNumber {
    let mut phone = parse_phone(raw);
    if phone.phone_country_code.is_empty() {
        phone.phone_country_code = String::from(DEFAULT_COUNTRY_CODE);
    }
    phone
}

/// `WP-<shop-slug>-<order id>`. The slug is capped at 50 characters; the
/// order id is always kept.
pub fn external_ref(shop_name: &str, order_id: u64) -> String {
    let mut slug = String::new();
    for ch in remove_diacritics(shop_name).to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug.chars().take(EXTERNAL_REF_SLUG_MAX_CHARS).collect();
    let slug = slug.trim_end_matches('-');
    let slug = if slug.is_empty() { "shop" } else { slug };

    format!("WP-{slug}-{order_id}")
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
