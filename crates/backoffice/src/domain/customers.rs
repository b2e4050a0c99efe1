//! Customer accounts.

use chrono::{DateTime, Utc};
use grocerdesk_client::{AuthPolicy, Collection, Envelope};
use grocerdesk_console::{Draft, Form, Validator};
use grocerdesk_core::{FieldErrors, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::fields;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Collection for Customer {
    const BASE_PATH: &'static str = "/customers";
    const LABEL: &'static str = "customer";
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
        let mut out = vec![self.name.as_str(), self.email.as_str()];
        out.extend(self.phone.as_deref());
        out
    }
}

impl Form for Customer {
    fn template() -> Map<String, Value> {
        fields(json!({ "name": "", "email": "", "phone": "", "address": "", "isBlocked": false }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        Validator::new(draft)
            .required("name", "Name is required")
            .required("email", "Email is required")
            .email("email", "Enter a valid email address")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_is_checked() {
        let mut draft = Draft::new(Customer::template());
        draft.set("name", "Ravi");
        draft.set("email", "ravi@");
        assert_eq!(
            Customer::validate(&draft).get("email"),
            Some("Enter a valid email address")
        );

        draft.set("email", "ravi@grocer.test");
        assert!(Customer::validate(&draft).is_empty());
    }

    #[test]
    fn search_covers_phone() {
        let customer: Customer = serde_json::from_value(json!({
            "_id": "u-1", "name": "Mei", "email": "mei@grocer.test", "phone": "+65 5550 1234"
        }))
        .unwrap();
        assert!(customer.search_fields().contains(&"+65 5550 1234"));
    }
}
