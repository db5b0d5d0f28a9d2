//! Boot provisioning payload — renders the instance user data and the three
//! files it materializes on the host.
//!
//! The user data embeds each rendered file in a quoted heredoc, so nothing in
//! the embedded files is expanded by the boot shell.

use crate::domain::error::TemplateError;
use crate::domain::template::{self, Vars};

/// POSIX identity owning the n8n data directory and running the container.
pub const POSIX_UID: &str = "1000";
pub const POSIX_GID: &str = "1000";

/// Internal n8n port; only exposed on the compose network.
pub const APP_PORT: u16 = 5678;

/// Template file names as embedded in the binary.
pub mod names {
    pub const USER_DATA: &str = "user-data.sh";
    pub const DOCKER_COMPOSE: &str = "docker-compose.yml";
    pub const NGINX_CONF: &str = "nginx.conf";
    pub const INIT_CERT: &str = "init-cert.sh";
}

/// Heredoc delimiters used by `user-data.sh` for each embedded file.
const EMBEDDED: &[(&str, &str, &str)] = &[
    ("DOCKER_COMPOSE", names::DOCKER_COMPOSE, "COMPOSE_EOF"),
    ("NGINX_CONF", names::NGINX_CONF, "NGINX_CONF_EOF"),
    ("INIT_CERT", names::INIT_CERT, "INIT_CERT_EOF"),
];

/// Raw template sources.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub user_data: String,
    pub docker_compose: String,
    pub nginx_conf: String,
    pub init_cert: String,
}

/// Inputs substituted into the templates.
#[derive(Debug, Clone)]
pub struct BootParams<'a> {
    pub domain_name: &'a str,
    pub certbot_email: &'a str,
    /// Literal ID, or a placeholder token resolved by the template assembler.
    pub file_system_id: &'a str,
    pub region: &'a str,
    pub timezone: &'a str,
    pub n8n_image: &'a str,
}

/// Fully rendered boot payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBoot {
    pub user_data: String,
    pub docker_compose: String,
    pub nginx_conf: String,
    pub init_cert: String,
}

impl RenderedBoot {
    /// `(file name, content)` for every rendered file, user data first.
    #[must_use]
    pub fn files(&self) -> [(&'static str, &str); 4] {
        [
            (names::USER_DATA, self.user_data.as_str()),
            (names::DOCKER_COMPOSE, self.docker_compose.as_str()),
            (names::NGINX_CONF, self.nginx_conf.as_str()),
            (names::INIT_CERT, self.init_cert.as_str()),
        ]
    }
}

/// Render the three host files, then the user data that writes them.
///
/// # Errors
///
/// Returns a `TemplateError` when a placeholder has no value or a rendered
/// file would terminate its heredoc early.
pub fn render_boot(templates: &TemplateSet, params: &BootParams<'_>) -> Result<RenderedBoot, TemplateError> {
    let mut vars: Vars<'_> = Vars::from([
        ("DOMAIN_NAME", params.domain_name.to_string()),
        ("CERTBOT_EMAIL", params.certbot_email.to_string()),
        ("FILE_SYSTEM_ID", params.file_system_id.to_string()),
        ("REGION", params.region.to_string()),
        ("TIMEZONE", params.timezone.to_string()),
        ("N8N_IMAGE", params.n8n_image.to_string()),
        ("APP_PORT", APP_PORT.to_string()),
        ("POSIX_UID", POSIX_UID.to_string()),
        ("POSIX_GID", POSIX_GID.to_string()),
    ]);

    let docker_compose =
        template::render(names::DOCKER_COMPOSE, &templates.docker_compose, &vars)?;
    let nginx_conf = template::render(names::NGINX_CONF, &templates.nginx_conf, &vars)?;
    let init_cert = template::render(names::INIT_CERT, &templates.init_cert, &vars)?;

    for (placeholder, file, delimiter) in EMBEDDED {
        let content = match *file {
            names::DOCKER_COMPOSE => &docker_compose,
            names::NGINX_CONF => &nginx_conf,
            _ => &init_cert,
        };
        if content.lines().any(|line| line == *delimiter) {
            return Err(TemplateError::DelimiterCollision {
                template: (*file).to_string(),
                delimiter: (*delimiter).to_string(),
            });
        }
        vars.insert(*placeholder, content.trim_end_matches('\n').to_string());
    }

    let user_data = template::render(names::USER_DATA, &templates.user_data, &vars)?;

    Ok(RenderedBoot {
        user_data,
        docker_compose,
        nginx_conf,
        init_cert,
    })
}
