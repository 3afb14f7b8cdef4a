//! Template domain model.
//!
//! # Responsibility
//! - Define the record persisted under `custom_templates` and listed to callers.
//! - Provide constructors that uphold the built-in/custom source split.
//!
//! # Invariants
//! - `id` is stable and never reused for another template.
//! - Built-in templates carry `file_url` and never `file_data`.
//! - Custom templates carry `file_data` and never `file_url`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every template, built-in or custom.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TemplateId = String;

const CUSTOM_ID_PREFIX: &str = "custom-";
const SPREADSHEET_SUFFIX: &str = ".xlsx";

/// Template record in the wire shape used by durable storage.
///
/// Field names serialize in camelCase so previously stored lists stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    /// Display name shown in template pickers.
    pub name: String,
    /// Fixed at construction; decides which binary source is valid.
    pub is_built_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    /// Resource locator, built-in only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Encoded payload (see `codec`), custom only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
}

/// Where the binary content of a template comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource<'a> {
    /// Network resource locator.
    Remote(&'a str),
    /// Self-contained encoded payload.
    Embedded(&'a str),
    /// Neither source populated; the record is malformed.
    Missing,
}

/// Source invariant violations detected by `Template::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValidationError {
    EmptyId,
    BuiltInWithFileData(TemplateId),
    CustomWithFileUrl(TemplateId),
    MissingSource(TemplateId),
}

impl Display for TemplateValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "template id cannot be empty"),
            Self::BuiltInWithFileData(id) => {
                write!(f, "built-in template `{id}` must not carry file data")
            }
            Self::CustomWithFileUrl(id) => {
                write!(f, "custom template `{id}` must not carry a file url")
            }
            Self::MissingSource(id) => {
                write!(f, "template `{id}` has neither a file url nor file data")
            }
        }
    }
}

impl Error for TemplateValidationError {}

impl Template {
    /// Creates a built-in template backed by a network resource.
    pub fn built_in(
        id: impl Into<TemplateId>,
        name: impl Into<String>,
        preview_url: Option<&str>,
        file_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_built_in: true,
            preview_url: preview_url.map(str::to_string),
            file_url: Some(file_url.into()),
            file_data: None,
        }
    }

    /// Creates a custom template with a freshly generated id.
    ///
    /// # Invariants
    /// - The id is `custom-` followed by a random v4 UUID, so back-to-back
    ///   ingestions never collide.
    pub fn custom(name: impl Into<String>, file_data: impl Into<String>) -> Self {
        Self::custom_with_id(new_custom_id(), name, file_data)
    }

    /// Creates a custom template with a caller-provided id.
    ///
    /// Used by re-upload paths that replace an existing entry in place.
    pub fn custom_with_id(
        id: impl Into<TemplateId>,
        name: impl Into<String>,
        file_data: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_built_in: false,
            preview_url: None,
            file_url: None,
            file_data: Some(file_data.into()),
        }
    }

    /// Returns the binary source the export pipeline should use.
    ///
    /// Mirrors resolution order: a built-in locator wins, then any payload.
    pub fn source(&self) -> TemplateSource<'_> {
        match (self.is_built_in, &self.file_url, &self.file_data) {
            (true, Some(url), _) => TemplateSource::Remote(url.as_str()),
            (_, _, Some(data)) => TemplateSource::Embedded(data.as_str()),
            _ => TemplateSource::Missing,
        }
    }

    /// Checks the built-in/custom source invariant.
    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        if self.id.trim().is_empty() {
            return Err(TemplateValidationError::EmptyId);
        }
        if self.is_built_in {
            if self.file_data.is_some() {
                return Err(TemplateValidationError::BuiltInWithFileData(
                    self.id.clone(),
                ));
            }
            if self.file_url.is_none() {
                return Err(TemplateValidationError::MissingSource(self.id.clone()));
            }
        } else {
            if self.file_url.is_some() {
                return Err(TemplateValidationError::CustomWithFileUrl(self.id.clone()));
            }
            if self.file_data.is_none() {
                return Err(TemplateValidationError::MissingSource(self.id.clone()));
            }
        }
        Ok(())
    }
}

/// Derives a display name from an uploaded file name.
///
/// Strips the first `.xlsx` occurrence, matching how names were derived for
/// templates already sitting in user storage.
pub fn display_name_from_file_name(file_name: &str) -> String {
    file_name.replacen(SPREADSHEET_SUFFIX, "", 1)
}

fn new_custom_id() -> TemplateId {
    format!("{CUSTOM_ID_PREFIX}{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::{display_name_from_file_name, Template, TemplateSource, TemplateValidationError};

    #[test]
    fn custom_ids_are_prefixed_and_unique() {
        let first = Template::custom("a", "data:;base64,");
        let second = Template::custom("a", "data:;base64,");
        assert!(first.id.starts_with("custom-"));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn serializes_with_camel_case_and_omits_absent_fields() {
        let template = Template::custom_with_id("custom-1", "Weekly", "data:x;base64,AA==");
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["isBuiltIn"], false);
        assert_eq!(json["fileData"], "data:x;base64,AA==");
        assert!(json.get("fileUrl").is_none());
        assert!(json.get("previewUrl").is_none());
    }

    #[test]
    fn deserializes_records_written_without_optional_fields() {
        let raw = r#"{"id":"custom-9","name":"n","isBuiltIn":false,"fileData":"d"}"#;
        let template: Template = serde_json::from_str(raw).unwrap();
        assert_eq!(template.source(), TemplateSource::Embedded("d"));
        assert!(template.validate().is_ok());
    }

    #[test]
    fn validate_rejects_mixed_sources() {
        let mut template = Template::built_in("template-9", "n", None, "/t.xlsx");
        template.file_data = Some("d".to_string());
        assert_eq!(
            template.validate(),
            Err(TemplateValidationError::BuiltInWithFileData("template-9".to_string()))
        );

        let mut custom = Template::custom_with_id("custom-1", "n", "d");
        custom.file_data = None;
        assert_eq!(
            custom.validate(),
            Err(TemplateValidationError::MissingSource("custom-1".to_string()))
        );
    }

    #[test]
    fn display_name_strips_spreadsheet_suffix() {
        assert_eq!(display_name_from_file_name("timetable.xlsx"), "timetable");
        assert_eq!(display_name_from_file_name("plain"), "plain");
    }
}
