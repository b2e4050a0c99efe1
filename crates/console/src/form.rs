//! Locally staged form state and the rules that check it.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use grocerdesk_client::{Attachment, Collection, Payload, UploadPolicy, UploadRejected};
use grocerdesk_core::FieldErrors;
use serde_json::{Map, Value};
use uuid::Uuid;

/// A record type that can be added and edited through a `MutationModal`.
pub trait Form: Collection {
    /// Values a blank "add" form starts with.
    fn template() -> Map<String, Value>;

    /// Check a draft. Every violated field is reported, not only the first.
    fn validate(draft: &Draft) -> FieldErrors;

    /// Values an "edit" form starts with. Defaults to the serialized record
    /// minus its identifier.
    fn edit_values(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => {
                map.remove("id");
                map.remove("_id");
                map
            }
            _ => Map::new(),
        }
    }
}

/// A file chosen in the form but not yet uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedAttachment {
    pub attachment: Attachment,
    /// Local handle for rendering a preview before upload.
    pub preview_url: String,
}

impl StagedAttachment {
    fn new(attachment: Attachment) -> Self {
        Self {
            attachment,
            preview_url: format!("blob:grocerdesk/{}", Uuid::now_v7()),
        }
    }
}

/// Field values being edited, plus any staged files.
///
/// An edit draft remembers the values it was opened with so that only the
/// fields the user actually changed are sent back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    fields: Map<String, Value>,
    attachments: BTreeMap<String, StagedAttachment>,
    baseline: Option<Map<String, Value>>,
}

impl Draft {
    /// A draft for a record that does not exist yet.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// A draft for an existing record; `fields` doubles as the baseline.
    pub fn for_edit(fields: Map<String, Value>) -> Self {
        Self {
            baseline: Some(fields.clone()),
            fields,
            attachments: BTreeMap::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.baseline.is_none()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// String value with surrounding whitespace removed; blank reads as absent.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Numeric value. Text inputs hold numbers as strings, so those parse too.
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Accepts RFC 3339, `YYYY-MM-DDTHH:MM` and `YYYY-MM-DD`.
    pub fn date(&self, field: &str) -> Option<DateTime<Utc>> {
        let raw = self.text(field)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
            return Some(dt.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    pub fn list_len(&self, field: &str) -> usize {
        self.get(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter(|v| !v.is_null()).count())
            .unwrap_or(0)
    }

    /// Stage `attachment` under `field` after checking it against `policy`.
    /// Replaces any file already staged there.
    pub fn stage(
        &mut self,
        field: impl Into<String>,
        attachment: Attachment,
        policy: &UploadPolicy,
    ) -> Result<&StagedAttachment, UploadRejected> {
        policy.check(&attachment)?;
        let field = field.into();
        self.attachments
            .insert(field.clone(), StagedAttachment::new(attachment));
        Ok(&self.attachments[&field])
    }

    pub fn unstage(&mut self, field: &str) -> Option<StagedAttachment> {
        self.attachments.remove(field)
    }

    pub fn staged(&self, field: &str) -> Option<&StagedAttachment> {
        self.attachments.get(field)
    }

    /// A file is staged, or the record already has one stored under `field`.
    pub fn has_file(&self, field: &str) -> bool {
        self.attachments.contains_key(field) || self.text(field).is_some()
    }

    /// Values that differ from the baseline. Blank text stands for an input
    /// left empty: a new draft never sends it, and an edit only sends it to
    /// clear a value the record actually had.
    pub fn changed_fields(&self) -> Map<String, Value> {
        match &self.baseline {
            None => self
                .fields
                .iter()
                .filter(|(_, value)| !is_blank(value))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            Some(baseline) => self
                .fields
                .iter()
                .filter(|(key, value)| {
                    let before = baseline.get(key.as_str());
                    if is_blank(value) {
                        before.is_some_and(|before| !is_blank(before))
                    } else {
                        before != Some(*value)
                    }
                })
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.attachments.is_empty() || !self.changed_fields().is_empty()
    }

    /// Request body: changed fields plus every staged file.
    pub fn to_payload(&self) -> Payload {
        self.attachments.iter().fold(
            Payload::from_fields(self.changed_fields()),
            |payload, (field, staged)| payload.attach(field.clone(), staged.attachment.clone()),
        )
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Builder for a form's `FieldErrors`.
///
/// Rules run in order and the first message recorded for a field wins, so
/// put presence checks before range checks. Range rules skip absent values.
#[derive(Debug)]
pub struct Validator<'a> {
    draft: &'a Draft,
    errors: FieldErrors,
}

impl<'a> Validator<'a> {
    pub fn new(draft: &'a Draft) -> Self {
        Self {
            draft,
            errors: FieldErrors::new(),
        }
    }

    pub fn required(mut self, field: &str, message: &str) -> Self {
        let present = match self.draft.get(field) {
            None => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        };
        if !present {
            self.errors.insert(field, message);
        }
        self
    }

    pub fn file_required(mut self, field: &str, message: &str) -> Self {
        if !self.draft.has_file(field) {
            self.errors.insert(field, message);
        }
        self
    }

    /// Strictly greater than zero.
    pub fn positive(self, field: &str, message: &str) -> Self {
        self.number_rule(field, message, |n| n > 0.0)
    }

    pub fn non_negative(self, field: &str, message: &str) -> Self {
        self.number_rule(field, message, |n| n >= 0.0)
    }

    pub fn at_most(self, field: &str, max: f64, message: &str) -> Self {
        self.number_rule(field, message, |n| n <= max)
    }

    pub fn in_range(self, field: &str, min: f64, max: f64, message: &str) -> Self {
        self.number_rule(field, message, |n| (min..=max).contains(&n))
    }

    /// `field` must be below `other` when both are set.
    pub fn less_than(mut self, field: &str, other: &str, message: &str) -> Self {
        if let (Some(a), Some(b)) = (self.draft.number(field), self.draft.number(other)) {
            if a >= b {
                self.errors.insert(field, message);
            }
        }
        self
    }

    /// `field` must be above `other` when both are set.
    pub fn greater_than(mut self, field: &str, other: &str, message: &str) -> Self {
        if let (Some(a), Some(b)) = (self.draft.number(field), self.draft.number(other)) {
            if a <= b {
                self.errors.insert(field, message);
            }
        }
        self
    }

    /// `later` must be strictly after `earlier` when both are set.
    pub fn date_after(mut self, later: &str, earlier: &str, message: &str) -> Self {
        if self.draft.text(later).is_some() && self.draft.date(later).is_none() {
            self.errors.insert(later, "Enter a valid date");
            return self;
        }
        if let (Some(end), Some(start)) = (self.draft.date(later), self.draft.date(earlier)) {
            if end <= start {
                self.errors.insert(later, message);
            }
        }
        self
    }

    pub fn email(mut self, field: &str, message: &str) -> Self {
        if let Some(value) = self.draft.text(field) {
            let valid = value.split_once('@').is_some_and(|(local, domain)| {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !value.contains(char::is_whitespace)
            });
            if !valid {
                self.errors.insert(field, message);
            }
        }
        self
    }

    pub fn min_items(mut self, field: &str, min: usize, message: &str) -> Self {
        if self.draft.list_len(field) < min {
            self.errors.insert(field, message);
        }
        self
    }

    pub fn one_of(mut self, field: &str, allowed: &[&str], message: &str) -> Self {
        if let Some(value) = self.draft.text(field) {
            if !allowed.contains(&value) {
                self.errors.insert(field, message);
            }
        }
        self
    }

    /// Record `message` against `field` unless `ok`.
    pub fn check(mut self, field: &str, ok: bool, message: &str) -> Self {
        if !ok {
            self.errors.insert(field, message);
        }
        self
    }

    pub fn finish(self) -> FieldErrors {
        self.errors
    }

    fn number_rule(mut self, field: &str, message: &str, ok: impl Fn(f64) -> bool) -> Self {
        if self.draft.get(field).is_some() {
            match self.draft.number(field) {
                Some(n) if ok(n) => {}
                _ => self.errors.insert(field, message),
            }
        }
        self
    }
}
