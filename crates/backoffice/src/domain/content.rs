//! Storefront content: home sections, carousel slides and push notifications.

use chrono::{DateTime, Utc};
use grocerdesk_client::{AuthPolicy, Collection, Envelope};
use grocerdesk_console::{Draft, Form, Validator};
use grocerdesk_core::{FieldErrors, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{default_true, fields};

/// Kinds of home-page section the storefront can render.
pub const SECTION_TYPES: &[&str] = &["categories", "products", "deals", "combo-offers", "banner"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSection {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub title: String,
    pub section_type: String,
    #[serde(default)]
    pub position: i64,
    /// Ids of the records shown in the section, in display order.
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Collection for HomeSection {
    const BASE_PATH: &'static str = "/home-sections";
    const LABEL: &'static str = "home section";
    const AUTH: AuthPolicy = AuthPolicy::Public;
    const LIST_ENVELOPE: Envelope = Envelope::Data;
    const RECORD_ENVELOPE: Envelope = Envelope::Data;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.section_type.as_str()]
    }
}

impl Form for HomeSection {
    fn template() -> Map<String, Value> {
        fields(json!({
            "title": "",
            "sectionType": "",
            "position": 0,
            "items": [],
            "isActive": true,
        }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        Validator::new(draft)
            .required("title", "Title is required")
            .required("sectionType", "Select a section type")
            .one_of("sectionType", SECTION_TYPES, "Unknown section type")
            .required("position", "Position is required")
            .non_negative("position", "Position cannot be negative")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselSlide {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Where tapping the slide leads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub position: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Collection for CarouselSlide {
    const BASE_PATH: &'static str = "/carousel";
    const LABEL: &'static str = "carousel slide";
    const AUTH: AuthPolicy = AuthPolicy::Public;
    const LIST_ENVELOPE: Envelope = Envelope::Bare;
    const RECORD_ENVELOPE: Envelope = Envelope::Bare;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }
}

impl Form for CarouselSlide {
    fn template() -> Map<String, Value> {
        fields(json!({ "title": "", "link": "", "position": 0, "isActive": true }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        Validator::new(draft)
            .required("title", "Title is required")
            .file_required("image", "Slide image is required")
            .non_negative("position", "Position cannot be negative")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub title: String,
    pub message: String,
    /// Target group, e.g. "all" or a customer segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl Collection for Notification {
    const BASE_PATH: &'static str = "/notifications";
    const LABEL: &'static str = "notification";
    const AUTH: AuthPolicy = AuthPolicy::Bearer;
    const LIST_ENVELOPE: Envelope = Envelope::Data;
    const RECORD_ENVELOPE: Envelope = Envelope::Data;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.message.as_str()]
    }
}

impl Form for Notification {
    fn template() -> Map<String, Value> {
        fields(json!({ "title": "", "message": "", "audience": "all" }))
    }

    fn validate(draft: &Draft) -> FieldErrors {
        Validator::new(draft)
            .required("title", "Title is required")
            .required("message", "Message is required")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_section_type_must_be_known() {
        let mut draft = Draft::new(HomeSection::template());
        draft.set("title", "Fresh picks");
        draft.set("sectionType", "video");
        draft.set("position", -1);

        let errors = HomeSection::validate(&draft);
        assert_eq!(errors.get("sectionType"), Some("Unknown section type"));
        assert_eq!(errors.get("position"), Some("Position cannot be negative"));
    }

    #[test]
    fn carousel_slide_is_a_bare_record() {
        let slide: CarouselSlide = serde_json::from_value(json!({
            "_id": "s-1", "title": "Summer", "image": "https://cdn/s.png"
        }))
        .unwrap();
        assert_eq!(slide.position, 0);
        assert!(slide.is_active);

        let draft = Draft::for_edit(slide.edit_values());
        assert!(CarouselSlide::validate(&draft).is_empty());
    }

    #[test]
    fn notification_requires_title_and_message() {
        let errors = Notification::validate(&Draft::new(Notification::template()));
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["message", "title"]);
    }
}
