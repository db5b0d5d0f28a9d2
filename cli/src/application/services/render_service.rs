//! Application service — boot payload rendering for inspection.

use anyhow::Result;

use crate::application::ports::TemplateSource;
use crate::domain::bootstrap::{self, BootParams, RenderedBoot};
use crate::domain::config::StackConfig;
use crate::domain::stack::FILE_SYSTEM_ID_TOKEN;

/// Render the user data and the files it writes.
///
/// Without `file_system_id` the ID stays as the deploy-time token.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a template fails to
/// render.
pub fn render(
    config: &StackConfig,
    source: &impl TemplateSource,
    file_system_id: Option<&str>,
) -> Result<RenderedBoot> {
    config.validate()?;
    let templates = source.templates()?;
    let domain = config.domain_name();
    let boot = bootstrap::render_boot(
        &templates,
        &BootParams {
            domain_name: &domain,
            certbot_email: &config.certificate.email,
            file_system_id: file_system_id.unwrap_or(FILE_SYSTEM_ID_TOKEN),
            region: &config.env.region,
            timezone: &config.app.timezone,
            n8n_image: &config.app.image,
        },
    )?;
    Ok(boot)
}
