//! Orders and delivery fee bands.

use chrono::{DateTime, Utc};
use grocerdesk_client::{AuthPolicy, Collection, Envelope};
use grocerdesk_console::{Draft, Form, Validator};
use grocerdesk_core::{FieldErrors, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{default_true, fields};

pub const ORDER_STATUSES: &[&str] = &[
    "pending",
    "confirmed",
    "processing",
    "shipped",
    "delivered",
    "cancelled",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Delivered and cancelled orders are final.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default)]
    pub customer_name: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }
}

impl Collection for Order {
    const BASE_PATH: &'static str = "/orders";
    const LABEL: &'static str = "order";
    const AUTH: AuthPolicy = AuthPolicy::Public;
    const LIST_ENVELOPE: Envelope = Envelope::Named("orders");
    const RECORD_ENVELOPE: Envelope = Envelope::Named("order");

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        self.order_number.as_deref().unwrap_or(self.id.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.display_name(),
            self.customer_name.as_str(),
            self.status.as_str(),
        ]
    }
}

/// Orders are created by the storefront; the back office only moves them
/// through their statuses.
impl Form for Order {
    fn template() -> Map<String, Value> {
        fields(json!({ "status": "pending" }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        Validator::new(draft)
            .required("status", "Select a status")
            .one_of("status", ORDER_STATUSES, "Unknown order status")
            .finish()
    }

    fn edit_values(&self) -> Map<String, Value> {
        fields(json!({ "status": self.status.as_str() }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFee {
    #[serde(alias = "_id")]
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    pub min_order_amount: f64,
    pub max_order_amount: f64,
    pub fee: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl DeliveryFee {
    /// Whether an order of `amount` falls in this band (`min` inclusive).
    pub fn applies_to(&self, amount: f64) -> bool {
        self.is_active && amount >= self.min_order_amount && amount < self.max_order_amount
    }
}

impl Collection for DeliveryFee {
    const BASE_PATH: &'static str = "/delivery-fees";
    const LABEL: &'static str = "delivery fee";
    const AUTH: AuthPolicy = AuthPolicy::Public;
    const LIST_ENVELOPE: Envelope = Envelope::Data;
    const RECORD_ENVELOPE: Envelope = Envelope::Data;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}

impl Form for DeliveryFee {
    fn template() -> Map<String, Value> {
        fields(json!({
            "name": "",
            "minOrderAmount": 0,
            "maxOrderAmount": "",
            "fee": "",
            "isActive": true,
        }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        Validator::new(draft)
            .required("minOrderAmount", "Minimum order amount is required")
            .non_negative("minOrderAmount", "Minimum order amount cannot be negative")
            .required("maxOrderAmount", "Maximum order amount is required")
            .greater_than(
                "maxOrderAmount",
                "minOrderAmount",
                "Maximum must be greater than the minimum",
            )
            .required("fee", "Delivery fee is required")
            .non_negative("fee", "Delivery fee cannot be negative")
            .finish()
    }
}
