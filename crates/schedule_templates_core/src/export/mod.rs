//! Export-time binary reconstruction for templates.
//!
//! # Responsibility
//! - Produce the spreadsheet bytes for any template, built-in or custom.
//! - Keep network access behind the `TemplateFetcher` seam.
//!
//! # Invariants
//! - Built-ins with a locator are fetched once per call, never retried.
//! - Custom payloads are decoded locally with no I/O.
//! - Every artifact carries `SPREADSHEET_CONTENT_TYPE`.

use crate::codec::{self, CodecError, SPREADSHEET_CONTENT_TYPE};
use crate::model::template::{Template, TemplateId, TemplateSource};
use crate::service::template_service::TemplateService;
use crate::store::KeyValueStore;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

mod http;

pub use http::HttpTemplateFetcher;

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    /// Network read failed or returned a non-success status.
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
    },
    /// Template has neither a locator nor a payload.
    TemplateUnavailable(TemplateId),
    Decode(CodecError),
    /// Active pointer does not resolve to a template.
    NotFound(TemplateId),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch {
                url,
                status,
                message,
            } => match status {
                Some(status) => write!(
                    f,
                    "failed to fetch template file `{url}` (status {status}): {message}"
                ),
                None => write!(f, "failed to fetch template file `{url}`: {message}"),
            },
            Self::TemplateUnavailable(id) => write!(f, "template file not available: {id}"),
            Self::Decode(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "template not found: {id}"),
            Self::Io { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Fetch { .. } | Self::TemplateUnavailable(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<CodecError> for ExportError {
    fn from(value: CodecError) -> Self {
        Self::Decode(value)
    }
}

/// Network read of a built-in template resource.
pub trait TemplateFetcher {
    fn fetch(&self, locator: &str) -> ExportResult<Vec<u8>>;
}

impl<F: TemplateFetcher + ?Sized> TemplateFetcher for &F {
    fn fetch(&self, locator: &str) -> ExportResult<Vec<u8>> {
        (**self).fetch(locator)
    }
}

/// Reconstructed template binary ready for the spreadsheet writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

impl TemplateFile {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: SPREADSHEET_CONTENT_TYPE,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Writes the bytes to `path`, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> ExportResult<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.bytes).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolves templates to their binary content.
pub struct ExportResolver<F: TemplateFetcher> {
    fetcher: F,
}

impl<F: TemplateFetcher> ExportResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Returns the binary content of `template`.
    ///
    /// # Errors
    /// - `Fetch` when a built-in resource cannot be read.
    /// - `Decode` when a custom payload is corrupt.
    /// - `TemplateUnavailable` when no source is populated.
    pub fn resolve(&self, template: &Template) -> ExportResult<TemplateFile> {
        let result = match template.source() {
            TemplateSource::Remote(locator) => self.fetcher.fetch(locator),
            TemplateSource::Embedded(payload) => codec::decode(payload).map_err(ExportError::from),
            TemplateSource::Missing => Err(ExportError::TemplateUnavailable(template.id.clone())),
        };

        match result {
            Ok(bytes) => {
                info!(
                    "event=template_resolve module=export status=ok template_id={} built_in={} bytes={}",
                    template.id,
                    template.is_built_in,
                    bytes.len()
                );
                Ok(TemplateFile::new(bytes))
            }
            Err(err) => {
                error!(
                    "event=template_resolve module=export status=error template_id={} error={}",
                    template.id, err
                );
                Err(err)
            }
        }
    }

    /// Resolves the currently active template of `service`.
    ///
    /// # Errors
    /// - `NotFound` when the active pointer is stale.
    pub fn resolve_active<S: KeyValueStore>(
        &self,
        service: &TemplateService<S>,
    ) -> ExportResult<TemplateFile> {
        let active_id = service.get_active_id();
        let template = service
            .find(&active_id)
            .ok_or(ExportError::NotFound(active_id))?;
        self.resolve(&template)
    }
}
