//! Name and identifier validation for stack inputs.
//!
//! Pure functions only — no I/O, no async.

use std::sync::LazyLock;

use regex::Regex;

/// One DNS label: 1–63 chars, alphanumeric at both ends, hyphens inside.
static DNS_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").expect("valid regex")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$").expect("valid regex")
});

static REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z]{2}(-gov|-iso[a-z]?)?-[a-z]+-\d$").expect("valid regex")
});

static ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^\d{12}$").expect("valid regex")
});

/// `<family>.<size>`, e.g. `t3.nano`, `m6gd.large`.
static INSTANCE_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^([a-z]+)(\d+)([a-z-]*)\.([a-z0-9]+)$").expect("valid regex")
});

/// CloudFormation stack names.
static STACK_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,127}$").expect("valid regex")
});

/// EC2 key pair names: printable ASCII, no leading/trailing spaces.
static KEY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9._-]{1,255}$").expect("valid regex")
});

/// Lowercase and strip a single trailing dot.
#[must_use]
pub fn normalize_domain(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Validate a fully-qualified domain name (at least two labels).
///
/// # Errors
///
/// Returns a human-readable reason when the name is not a valid FQDN.
pub fn validate_domain_name(name: &str) -> Result<(), String> {
    let name = normalize_domain(name);
    if name.len() > 253 {
        return Err("domain names are at most 253 characters".to_string());
    }
    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() < 2 {
        return Err("expected a fully-qualified name such as n8n.example.com".to_string());
    }
    if let Some(bad) = labels.iter().find(|l| !DNS_LABEL_RE.is_match(l)) {
        return Err(format!("'{bad}' is not a valid DNS label"));
    }
    Ok(())
}

/// # Errors
///
/// Returns a reason when the address is malformed.
pub fn validate_email(email: &str) -> Result<(), String> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err("expected an address such as admin@example.com".to_string())
    }
}

/// # Errors
///
/// Returns a reason when the region code is malformed.
pub fn validate_region(region: &str) -> Result<(), String> {
    if REGION_RE.is_match(region) {
        Ok(())
    } else {
        Err("expected a region code such as us-east-1".to_string())
    }
}

/// # Errors
///
/// Returns a reason when the account ID is not 12 digits.
pub fn validate_account(account: &str) -> Result<(), String> {
    if ACCOUNT_RE.is_match(account) {
        Ok(())
    } else {
        Err("expected a 12-digit AWS account ID".to_string())
    }
}

/// # Errors
///
/// Returns a reason when the instance type is malformed.
pub fn validate_instance_type(instance_type: &str) -> Result<(), String> {
    if INSTANCE_TYPE_RE.is_match(instance_type) {
        Ok(())
    } else {
        Err("expected an instance type such as t3.nano".to_string())
    }
}

/// # Errors
///
/// Returns a reason when the name is not a valid CloudFormation stack name.
pub fn validate_stack_name(name: &str) -> Result<(), String> {
    if STACK_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err("stack names start with a letter and contain only letters, digits, and hyphens"
            .to_string())
    }
}

/// # Errors
///
/// Returns a reason when the key pair name is not accepted.
pub fn validate_key_name(name: &str) -> Result<(), String> {
    if KEY_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err("key pair names use letters, digits, '.', '_', and '-'".to_string())
    }
}

/// Everything after the first label: `n8n.aws.example.com` → `aws.example.com`.
#[must_use]
pub fn parent_domain(name: &str) -> Option<String> {
    let name = normalize_domain(name);
    let (_, parent) = name.split_once('.')?;
    parent.contains('.').then(|| parent.to_string())
}

/// The part of `domain` in front of `zone`, or `None` when `domain` is not a
/// strict subdomain of `zone`.
#[must_use]
pub fn record_label(domain: &str, zone: &str) -> Option<String> {
    let domain = normalize_domain(domain);
    let zone = normalize_domain(zone);
    let label = domain.strip_suffix(&zone)?.strip_suffix('.')?;
    (!label.is_empty()).then(|| label.to_string())
}

/// Absolute form with a trailing dot, as Route 53 stores record names.
#[must_use]
pub fn fqdn(name: &str) -> String {
    format!("{}.", normalize_domain(name))
}

/// Whether the instance type runs on Graviton (arm64) hardware.
///
/// The processor suffix follows the generation digit: `t4g`, `m6gd`, `c7gn`.
/// The first-generation `a1` family carries no suffix.
#[must_use]
pub fn is_arm64_instance_type(instance_type: &str) -> bool {
    INSTANCE_TYPE_RE.captures(instance_type).is_some_and(|c| {
        let family = c.get(1).map_or("", |m| m.as_str());
        let suffix = c.get(3).map_or("", |m| m.as_str());
        family == "a" || suffix.contains('g')
    })
}
