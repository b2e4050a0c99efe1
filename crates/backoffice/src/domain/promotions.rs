//! Coupons, combo offers and deals.

use chrono::{DateTime, Utc};
use grocerdesk_client::{AuthPolicy, Collection, CollectionResource, Envelope};
use grocerdesk_console::{Draft, Form, ListState, Validator};
use grocerdesk_core::{FieldErrors, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::catalog::{Category, Product};
use super::{default_true, fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Category ids the coupon is limited to; empty means all.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Product ids the coupon is limited to; empty means all.
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Coupon {
    /// Active and inside its date window at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_date.is_none_or(|start| start <= now)
            && self.end_date.is_none_or(|end| now < end)
    }

    /// Discount this coupon gives on an order of `amount`.
    pub fn discount_for(&self, amount: f64) -> f64 {
        if self.min_order_amount.is_some_and(|min| amount < min) {
            return 0.0;
        }
        let discount = match self.discount_type {
            DiscountType::Percentage => amount * self.discount_value / 100.0,
            DiscountType::Fixed => self.discount_value,
        };
        discount.clamp(0.0, amount)
    }
}

impl Collection for Coupon {
    const BASE_PATH: &'static str = "/coupons";
    const LABEL: &'static str = "coupon";
    const AUTH: AuthPolicy = AuthPolicy::Bearer;
    const LIST_ENVELOPE: Envelope = Envelope::Named("coupons");
    const RECORD_ENVELOPE: Envelope = Envelope::Named("coupon");

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.code
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.code.as_str(), self.discount_type.as_str()];
        out.extend(self.description.as_deref());
        out
    }
}

impl Form for Coupon {
    fn template() -> Map<String, Value> {
        fields(json!({
            "code": "",
            "description": "",
            "discountType": "percentage",
            "discountValue": "",
            "minOrderAmount": "",
            "startDate": "",
            "endDate": "",
            "categories": [],
            "products": [],
            "isActive": true,
        }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        let percentage = draft.text("discountType") == Some(DiscountType::Percentage.as_str());
        let mut rules = Validator::new(draft)
            .required("code", "Coupon code is required")
            .check(
                "code",
                draft.text("code").is_none_or(|c| !c.contains(char::is_whitespace)),
                "Coupon code cannot contain spaces",
            )
            .required("discountType", "Select a discount type")
            .one_of("discountType", &["percentage", "fixed"], "Select a discount type")
            .required("discountValue", "Discount value is required")
            .positive("discountValue", "Discount must be greater than 0");
        if percentage {
            rules = rules.at_most("discountValue", 100.0, "Percentage discount cannot exceed 100");
        }
        if draft.text("minOrderAmount").is_some() {
            rules = rules.non_negative("minOrderAmount", "Minimum order amount cannot be negative");
        }
        rules
            .date_after("endDate", "startDate", "End date must be after the start date")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboOffer {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ids of the bundled products.
    #[serde(default)]
    pub products: Vec<String>,
    pub combo_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ComboOffer {
    pub fn savings(&self) -> Option<f64> {
        self.original_price
            .map(|original| original - self.combo_price)
            .filter(|saved| *saved > 0.0)
    }
}

impl Collection for ComboOffer {
    const BASE_PATH: &'static str = "/combo-offers";
    const LABEL: &'static str = "combo offer";
    const AUTH: AuthPolicy = AuthPolicy::Public;
    const LIST_ENVELOPE: Envelope = Envelope::Data;
    const RECORD_ENVELOPE: Envelope = Envelope::Data;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }
}

impl Form for ComboOffer {
    fn template() -> Map<String, Value> {
        fields(json!({
            "title": "",
            "description": "",
            "products": [],
            "comboPrice": "",
            "originalPrice": "",
            "startDate": "",
            "endDate": "",
            "isActive": true,
        }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        let rules = Validator::new(draft)
            .required("title", "Title is required")
            .min_items("products", 2, "Select at least two products")
            .required("comboPrice", "Combo price is required")
            .positive("comboPrice", "Combo price must be greater than 0")
            .date_after("endDate", "startDate", "End date must be after the start date");
        if draft.is_new() {
            rules.file_required("image", "Combo image is required").finish()
        } else {
            rules.finish()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub title: String,
    /// Id of the discounted product.
    #[serde(default)]
    pub product: String,
    pub discount_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Collection for Deal {
    const BASE_PATH: &'static str = "/deals";
    const LABEL: &'static str = "deal";
    const AUTH: AuthPolicy = AuthPolicy::Public;
    const LIST_ENVELOPE: Envelope = Envelope::Named("deals");
    const RECORD_ENVELOPE: Envelope = Envelope::Named("deal");

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }
}

impl Form for Deal {
    fn template() -> Map<String, Value> {
        fields(json!({
            "title": "",
            "product": "",
            "discountPercentage": "",
            "startDate": "",
            "endDate": "",
            "isActive": true,
        }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        Validator::new(draft)
            .required("title", "Title is required")
            .required("product", "Select a product")
            .required("discountPercentage", "Discount is required")
            .in_range("discountPercentage", 1.0, 100.0, "Discount must be between 1 and 100")
            .required("startDate", "Start date is required")
            .required("endDate", "End date is required")
            .date_after("endDate", "startDate", "End date must be after the start date")
            .finish()
    }
}

/// Pick lists for the coupon form.
///
/// Categories and products load concurrently and resolve independently: one
/// failing leaves the other usable.
#[derive(Debug, Clone, Default)]
pub struct CouponFormOptions {
    pub categories: ListState<Category>,
    pub products: ListState<Product>,
}

impl CouponFormOptions {
    pub async fn load(
        categories: &CollectionResource<Category>,
        products: &CollectionResource<Product>,
    ) -> Self {
        let mut options = Self::default();
        options.categories.begin_load();
        options.products.begin_load();

        let (category_result, product_result) = tokio::join!(categories.list(), products.list());

        if let Err(err) = options.categories.resolve(category_result) {
            tracing::warn!(error = %err, "coupon form: categories unavailable");
        }
        if let Err(err) = options.products.resolve(product_result) {
            tracing::warn!(error = %err, "coupon form: products unavailable");
        }
        options
    }
}
