//! Template use-case service.
//!
//! # Responsibility
//! - Provide the full template lifecycle: list, ingest, upsert, delete,
//!   select active, resolve active.
//! - Combine the built-in registry with custom templates from the store.
//!
//! # Invariants
//! - Built-ins always come first in registry order, customs follow in store
//!   order.
//! - Built-in templates are never written to the store.
//! - Deleting the active custom template moves the pointer back to the first
//!   built-in; deletes that remove nothing leave the pointer alone.
//! - `get_active_id` does not check existence; `set_active` does.

use crate::codec;
use crate::model::template::{
    display_name_from_file_name, Template, TemplateId, TemplateValidationError,
};
use crate::registry::{built_in_templates, first_built_in_id, is_built_in_id};
use crate::store::{
    read_json, write_json, KeyValueStore, StoreError, ACTIVE_TEMPLATE_KEY, CUSTOM_TEMPLATES_KEY,
};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for template use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Persistence-layer failure.
    Store(StoreError),
    /// Uploaded file could not be read.
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Target template does not exist.
    NotFound(TemplateId),
    /// Built-in templates cannot be written or replaced.
    BuiltInImmutable(TemplateId),
    InvalidTemplate(TemplateValidationError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::FileRead { path, source } => write!(
                f,
                "failed to read template file `{}`: {source}",
                path.display()
            ),
            Self::NotFound(id) => write!(f, "template not found: {id}"),
            Self::BuiltInImmutable(id) => write!(f, "built-in template `{id}` cannot be modified"),
            Self::InvalidTemplate(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::FileRead { source, .. } => Some(source),
            Self::NotFound(_) | Self::BuiltInImmutable(_) => None,
            Self::InvalidTemplate(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<TemplateValidationError> for ServiceError {
    fn from(value: TemplateValidationError) -> Self {
        Self::InvalidTemplate(value)
    }
}

/// Template manager bound to one injected store.
///
/// Two services over different stores never observe each other's state.
pub struct TemplateService<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> TemplateService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn list_built_in(&self) -> &'static [Template] {
        built_in_templates()
    }

    /// Lists built-ins followed by custom templates.
    ///
    /// No deduplication; ids are unique by construction.
    pub fn list_all(&self) -> Vec<Template> {
        let mut templates = built_in_templates().to_vec();
        templates.extend(self.list_custom());
        templates
    }

    /// Lists custom templates in insertion order.
    ///
    /// Returns an empty list when the stored value is missing or unreadable.
    pub fn list_custom(&self) -> Vec<Template> {
        read_json(&self.store, CUSTOM_TEMPLATES_KEY).unwrap_or_default()
    }

    /// Finds one template by id across built-ins and customs.
    pub fn find(&self, id: &str) -> Option<Template> {
        self.list_all().into_iter().find(|template| template.id == id)
    }

    /// Inserts a custom template or replaces the entry with the same id.
    ///
    /// # Contract
    /// - Existing id: replaced at its current position.
    /// - New id: appended.
    /// - The full list is persisted on every call.
    ///
    /// # Errors
    /// - `BuiltInImmutable` for built-in templates or built-in ids.
    /// - `InvalidTemplate` when the source invariant does not hold.
    pub fn upsert_custom(&self, template: Template) -> ServiceResult<()> {
        if template.is_built_in || is_built_in_id(&template.id) {
            return Err(ServiceError::BuiltInImmutable(template.id));
        }
        template.validate()?;

        let mut templates = self.list_custom();
        let action = match templates.iter().position(|existing| existing.id == template.id) {
            Some(index) => {
                templates[index] = template;
                "replace"
            }
            None => {
                templates.push(template);
                "append"
            }
        };

        write_json(&self.store, CUSTOM_TEMPLATES_KEY, &templates)?;
        info!(
            "event=template_upsert module=service status=ok action={} custom_count={}",
            action,
            templates.len()
        );
        Ok(())
    }

    /// Deletes a custom template by id.
    ///
    /// Returns whether an entry was removed. Removing the active template
    /// resets the pointer to the first built-in; a miss changes nothing.
    pub fn delete_custom(&self, id: &str) -> ServiceResult<bool> {
        let mut templates = self.list_custom();
        let before = templates.len();
        templates.retain(|template| template.id != id);
        let removed = templates.len() != before;

        if !removed {
            info!("event=template_delete module=service status=ok removed=false template_id={id}");
            return Ok(false);
        }

        write_json(&self.store, CUSTOM_TEMPLATES_KEY, &templates)?;
        if self.get_active_id() == id {
            self.write_active_id(first_built_in_id())?;
            info!(
                "event=active_reset module=service status=ok reason=deleted_active template_id={}",
                first_built_in_id()
            );
        }

        info!("event=template_delete module=service status=ok removed=true template_id={id}");
        Ok(true)
    }

    /// Returns the stored active id, or the first built-in id when unset.
    ///
    /// The returned id may not resolve; use `get_active` for that.
    pub fn get_active_id(&self) -> TemplateId {
        let stored = match self.store.get_raw(ACTIVE_TEMPLATE_KEY) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=store_read module=service status=error key={} error_code=backend_read_failed error={}",
                    ACTIVE_TEMPLATE_KEY, err
                );
                None
            }
        };

        stored
            .map(|raw| parse_active_id(&raw))
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| first_built_in_id().to_string())
    }

    /// Selects the active template.
    ///
    /// # Errors
    /// - `NotFound` when `id` is not in `list_all()`; the pointer is unchanged.
    pub fn set_active(&self, id: &str) -> ServiceResult<()> {
        if self.find(id).is_none() {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        self.write_active_id(id)?;
        info!("event=active_select module=service status=ok template_id={id}");
        Ok(())
    }

    /// Resolves the active pointer against the full template set.
    ///
    /// Returns `None` when the stored pointer is stale.
    pub fn get_active(&self) -> Option<Template> {
        self.find(&self.get_active_id())
    }

    /// Reads an uploaded file and stores it as a new custom template.
    ///
    /// # Errors
    /// - `FileRead` when the file cannot be read; nothing is persisted.
    pub fn ingest_file(&self, path: impl AsRef<Path>) -> ServiceResult<Template> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| {
            error!(
                "event=template_ingest module=service status=error error_code=file_read_failed error={}",
                source
            );
            ServiceError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.ingest_bytes(&file_name, &bytes)
    }

    /// Encodes already-loaded bytes and stores them as a new custom template.
    pub fn ingest_bytes(&self, file_name: &str, bytes: &[u8]) -> ServiceResult<Template> {
        let template = Template::custom(
            display_name_from_file_name(file_name),
            codec::encode(bytes),
        );
        self.upsert_custom(template.clone())?;
        info!(
            "event=template_ingest module=service status=ok template_id={} bytes={}",
            template.id,
            bytes.len()
        );
        Ok(template)
    }

    fn write_active_id(&self, id: &str) -> ServiceResult<()> {
        write_json(&self.store, ACTIVE_TEMPLATE_KEY, id)?;
        Ok(())
    }
}

/// Accepts a JSON string or bare text, since older sessions stored the id raw.
fn parse_active_id(raw: &str) -> TemplateId {
    serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::parse_active_id;

    #[test]
    fn parse_active_id_accepts_json_and_bare_values() {
        assert_eq!(parse_active_id("\"custom-1\""), "custom-1");
        assert_eq!(parse_active_id("template-2"), "template-2");
        assert_eq!(parse_active_id(""), "");
    }
}
