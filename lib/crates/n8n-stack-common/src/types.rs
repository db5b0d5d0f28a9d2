use serde::{Deserialize, Serialize};

/// Logical IDs of the stack outputs surfaced to the operator.
pub mod outputs {
    pub const INSTANCE_ID: &str = "InstanceId";
    pub const PUBLIC_IP: &str = "PublicIP";
    pub const APP_URL: &str = "N8nUrl";
    pub const SSH_COMMAND: &str = "SSHCommand";

    pub const ALL: &[&str] = &[INSTANCE_ID, PUBLIC_IP, APP_URL, SSH_COMMAND];
}

/// Resolved outputs of a deployed stack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StackOutputs {
    pub instance_id: Option<String>,
    pub public_ip: Option<String>,
    pub url: Option<String>,
    pub ssh_command: Option<String>,
}

impl StackOutputs {
    /// Build from `(OutputKey, OutputValue)` pairs. Unknown keys are ignored.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut out = Self::default();
        for (key, value) in pairs {
            let slot = match key {
                outputs::INSTANCE_ID => &mut out.instance_id,
                outputs::PUBLIC_IP => &mut out.public_ip,
                outputs::APP_URL => &mut out.url,
                outputs::SSH_COMMAND => &mut out.ssh_command,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        out
    }

    /// Output keys that have no value.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (outputs::INSTANCE_ID, &self.instance_id),
            (outputs::PUBLIC_IP, &self.public_ip),
            (outputs::APP_URL, &self.url),
            (outputs::SSH_COMMAND, &self.ssh_command),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| k)
        .collect()
    }
}
