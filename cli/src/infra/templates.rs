//! Provisioning templates compiled into the binary.

use anyhow::Result;
use include_dir::{Dir, include_dir};

use crate::application::ports::TemplateSource;
use crate::domain::bootstrap::{TemplateSet, names};
use crate::domain::error::TemplateError;

static TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// `TemplateSource` backed by the embedded `templates/` directory.
pub struct EmbeddedTemplates;

impl EmbeddedTemplates {
    /// Raw contents of one embedded template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::NotFound` if no such file is embedded or it is
    /// not UTF-8.
    pub fn get(name: &str) -> Result<&'static str, TemplateError> {
        TEMPLATES
            .get_file(name)
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }
}

impl TemplateSource for EmbeddedTemplates {
    fn templates(&self) -> Result<TemplateSet> {
        Ok(TemplateSet {
            user_data: Self::get(names::USER_DATA)?.to_string(),
            docker_compose: Self::get(names::DOCKER_COMPOSE)?.to_string(),
            nginx_conf: Self::get(names::NGINX_CONF)?.to_string(),
            init_cert: Self::get(names::INIT_CERT)?.to_string(),
        })
    }
}
