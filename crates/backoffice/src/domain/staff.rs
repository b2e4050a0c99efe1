//! Sub-admin accounts.

use grocerdesk_auth::{Permission, Role};
use grocerdesk_client::{AuthPolicy, Collection, Envelope};
use grocerdesk_console::{Draft, Form, Validator};
use grocerdesk_core::{FieldErrors, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{default_true, fields};

const MIN_PASSWORD_LEN: usize = 8;

/// An operator with access to a subset of back-office sections.
///
/// The password is write-only: it is sent when set in a form and never read
/// back from the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAdmin {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default = "Role::sub_admin")]
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl SubAdmin {
    pub fn can(&self, section: &Permission) -> bool {
        self.is_active && self.permissions.iter().any(|p| p.grants(section))
    }
}

impl Collection for SubAdmin {
    const BASE_PATH: &'static str = "/sub-admins";
    const LABEL: &'static str = "sub-admin";
    const AUTH: AuthPolicy = AuthPolicy::Bearer;
    const LIST_ENVELOPE: Envelope = Envelope::Named("subAdmins");
    const RECORD_ENVELOPE: Envelope = Envelope::Named("subAdmin");

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }
}

impl Form for SubAdmin {
    fn template() -> Map<String, Value> {
        fields(json!({
            "name": "",
            "email": "",
            "password": "",
            "permissions": [],
            "isActive": true,
        }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        let password_ok = draft
            .text("password")
            .is_none_or(|p| p.chars().count() >= MIN_PASSWORD_LEN);

        let mut rules = Validator::new(draft)
            .required("name", "Name is required")
            .required("email", "Email is required")
            .email("email", "Enter a valid email address")
            .min_items("permissions", 1, "Grant at least one permission");
        if draft.is_new() {
            rules = rules.required("password", "Password is required");
        }
        rules
            .check(
                "password",
                password_ok,
                "Password must be at least 8 characters",
            )
            .finish()
    }

    fn edit_values(&self) -> Map<String, Value> {
        fields(json!({
            "name": self.name,
            "email": self.email,
            "permissions": self.permissions,
            "isActive": self.is_active,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub_admin() -> SubAdmin {
        serde_json::from_value(json!({
            "_id": "s-1",
            "name": "Lena",
            "email": "lena@grocer.test",
            "permissions": ["orders", "Coupons"]
        }))
        .unwrap()
    }

    #[test]
    fn new_sub_admin_needs_password_and_permission() {
        let mut draft = Draft::new(SubAdmin::template());
        draft.set("name", "Lena");
        draft.set("email", "lena@grocer.test");
        draft.set("password", "short");

        let errors = SubAdmin::validate(&draft);
        assert_eq!(errors.get("permissions"), Some("Grant at least one permission"));
        assert_eq!(errors.get("password"), Some("Password must be at least 8 characters"));

        draft.set("password", "");
        assert_eq!(
            SubAdmin::validate(&draft).get("password"),
            Some("Password is required")
        );
    }

    #[test]
    fn edit_leaves_password_out_unless_changed() {
        let admin = sub_admin();
        assert_eq!(admin.role, Role::sub_admin());

        let mut draft = Draft::for_edit(admin.edit_values());
        assert!(SubAdmin::validate(&draft).is_empty());

        draft.set("name", "Lena K");
        assert_eq!(Value::Object(draft.changed_fields()), json!({ "name": "Lena K" }));

        draft.set("password", "new-secret-1");
        assert!(draft.changed_fields().contains_key("password"));
    }

    #[test]
    fn permission_checks_are_case_insensitive() {
        let admin = sub_admin();
        assert!(admin.can(&Permission::new("coupons")));
        assert!(!admin.can(&Permission::new("sub-admins")));
    }
}
