pub mod expedition;
pub mod order;
pub mod package;
pub mod quote;
pub mod timestamp;

pub use expedition::{Expedition, ExpeditionRecord, ExpeditionState};
pub use order::{AddressField, LineItem, Order, OrderAddress};
pub use package::{
    build_packages, package_description, CustomExpeditionData, Package, PackageDimensions,
    PackageType,
};
pub use quote::{quote_request_id_from_response, quotes_from_response, CourierQuote, SelectionPolicy};
pub use timestamp::{pickup_date, UtcDateTime};
