//! Record types for every back-office collection.
//!
//! Each type declares its route, envelope and auth policy through
//! `Collection`, and its form defaults and rules through `Form`.

pub mod catalog;
pub mod content;
pub mod customers;
pub mod orders;
pub mod promotions;
pub mod staff;

pub use catalog::{Category, Product};
pub use content::{CarouselSlide, HomeSection, Notification, SECTION_TYPES};
pub use customers::Customer;
pub use orders::{DeliveryFee, ORDER_STATUSES, Order, OrderStatus};
pub use promotions::{ComboOffer, Coupon, CouponFormOptions, DiscountType, Deal};
pub use staff::SubAdmin;

use serde_json::{Map, Value};

/// Object literal to field map; anything else is empty.
pub(crate) fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub(crate) fn default_true() -> bool {
    true
}
