//! Categories and products.

use chrono::{DateTime, Utc};
use grocerdesk_client::{AuthPolicy, Collection, Envelope};
use grocerdesk_console::{Draft, Form, Validator};
use grocerdesk_core::{FieldErrors, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{default_true, fields};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Collection for Category {
    const BASE_PATH: &'static str = "/categories";
    const LABEL: &'static str = "category";
    const AUTH: AuthPolicy = AuthPolicy::Public;
    const LIST_ENVELOPE: Envelope = Envelope::Data;
    const RECORD_ENVELOPE: Envelope = Envelope::Data;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str()];
        out.extend(self.description.as_deref());
        out
    }
}

impl Form for Category {
    fn template() -> Map<String, Value> {
        fields(json!({ "name": "", "description": "", "isActive": true }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        Validator::new(draft)
            .required("name", "Category name is required")
            .file_required("image", "Category image is required")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Id of the owning category.
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Product {
    /// Price after discount, if a discount is set.
    pub fn selling_price(&self) -> f64 {
        self.discount_price
            .filter(|d| *d > 0.0 && *d < self.price)
            .unwrap_or(self.price)
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

impl Collection for Product {
    const BASE_PATH: &'static str = "/products";
    const LABEL: &'static str = "product";
    const AUTH: AuthPolicy = AuthPolicy::Public;
    const LIST_ENVELOPE: Envelope = Envelope::Named("products");
    const RECORD_ENVELOPE: Envelope = Envelope::Named("product");

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str()];
        out.extend(self.description.as_deref());
        out.extend(self.unit.as_deref());
        out
    }
}

impl Form for Product {
    fn template() -> Map<String, Value> {
        fields(json!({
            "name": "",
            "description": "",
            "category": "",
            "price": "",
            "discountPrice": "",
            "stock": 0,
            "unit": "",
            "isActive": true,
        }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        let rules = Validator::new(draft)
            .required("name", "Product name is required")
            .required("category", "Select a category")
            .required("price", "Price is required")
            .positive("price", "Price must be greater than 0")
            .required("stock", "Stock is required")
            .non_negative("stock", "Stock cannot be negative")
            .check(
                "discountPrice",
                draft.text("discountPrice").is_none() || draft.number("discountPrice").is_some(),
                "Discount price must be a number",
            )
            .less_than("discountPrice", "price", "Discount price must be lower than the price");

        if draft.is_new() {
            rules.file_required("image", "Product image is required").finish()
        } else {
            rules.finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocerdesk_client::{Attachment, UploadPolicy};

    fn product_draft(values: Value) -> Draft {
        let mut draft = Draft::new(Product::template());
        for (key, value) in fields(values) {
            draft.set(key, value);
        }
        draft
    }

    #[test]
    fn category_requires_name_and_image() {
        let errors = Category::validate(&Draft::new(Category::template()));
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["image", "name"]);
    }

    #[test]
    fn product_reports_every_problem() {
        let draft = product_draft(json!({ "price": "0", "stock": -2, "discountPrice": "5" }));
        let errors = Product::validate(&draft);

        assert_eq!(errors.get("name"), Some("Product name is required"));
        assert_eq!(errors.get("category"), Some("Select a category"));
        assert_eq!(errors.get("price"), Some("Price must be greater than 0"));
        assert_eq!(errors.get("stock"), Some("Stock cannot be negative"));
        assert_eq!(
            errors.get("discountPrice"),
            Some("Discount price must be lower than the price")
        );
        assert_eq!(errors.get("image"), Some("Product image is required"));
    }

    #[test]
    fn valid_product_passes() {
        let mut draft = product_draft(json!({
            "name": "Bananas",
            "category": "cat-1",
            "price": "2.50",
            "discountPrice": "1.99",
            "stock": "40",
        }));
        draft
            .stage(
                "image",
                Attachment::new("bananas.jpg", "image/jpeg", vec![0xff, 0xd8]),
                &UploadPolicy::default(),
            )
            .unwrap();
        assert!(Product::validate(&draft).is_empty());
    }

    #[test]
    fn editing_a_product_does_not_require_a_new_image() {
        let product = Product {
            id: RecordId::new("p-1"),
            name: "Milk".into(),
            description: None,
            category: "dairy".into(),
            price: 1.2,
            discount_price: None,
            stock: 10,
            unit: Some("1 L".into()),
            image: None,
            is_active: true,
        };
        let draft = Draft::for_edit(product.edit_values());
        assert!(Product::validate(&draft).is_empty());
    }

    #[test]
    fn selling_price_ignores_nonsense_discounts() {
        let mut product: Product = serde_json::from_value(json!({
            "_id": "p-2", "name": "Eggs", "category": "dairy", "price": 3.0, "discountPrice": 2.5
        }))
        .unwrap();
        assert_eq!(product.selling_price(), 2.5);
        product.discount_price = Some(4.0);
        assert_eq!(product.selling_price(), 3.0);
        assert!(!product.in_stock());
    }
}
