//! Environment identity, persisted attributes, and settings inspection.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::facade::types::{OptionSetting, SettingsDescription, SettingsTarget};

/// Namespace holding the legacy "JVM Options" parameter.
pub const JVM_OPTIONS_NAMESPACE: &str = "aws:cloudformation:template:parameter";

/// Namespace holding the launch configuration (security groups, key pair).
pub const LAUNCH_CONFIGURATION_NAMESPACE: &str = "aws:autoscaling:launchconfiguration";

const JVM_OPTIONS_NAME: &str = "JVM Options";
const SECURITY_GROUPS_NAME: &str = "SecurityGroups";

static JDWP_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-Xrunjdwp:\S*address=(\d+)").expect("jdwp address regex"));

/// Identity under which a configuration model is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct EnvironmentId {
    pub account_id: String,
    pub region_endpoint: String,
    pub environment_name: String,
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}/{}",
            self.account_id, self.region_endpoint, self.environment_name
        )
    }
}

/// Attributes remembered for an environment between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentRecord {
    pub account_id: String,
    pub region_endpoint: String,
    pub application_name: String,
    pub application_description: Option<String>,
    pub environment_name: String,
    pub environment_description: Option<String>,
    pub key_pair_name: Option<String>,
    pub cname: Option<String>,
    pub healthcheck_url: Option<String>,
    pub ssl_cert_id: Option<String>,
    pub sns_endpoint: Option<String>,
    pub solution_stack: Option<String>,
}

impl EnvironmentRecord {
    /// Registry key for this environment.
    pub fn id(&self) -> EnvironmentId {
        EnvironmentId {
            account_id: self.account_id.clone(),
            region_endpoint: self.region_endpoint.clone(),
            environment_name: self.environment_name.clone(),
        }
    }

    /// Settings target for either the running environment or a named template.
    pub fn settings_target(&self, template_name: Option<&str>) -> SettingsTarget {
        match template_name {
            Some(template) => SettingsTarget::Template {
                application_name: self.application_name.clone(),
                template_name: template.to_string(),
            },
            None => SettingsTarget::Environment {
                environment_name: self.environment_name.clone(),
            },
        }
    }

    /// Public URL of the environment, derived from its CNAME.
    pub fn environment_url(&self) -> Option<String> {
        self.cname.as_ref().map(|cname| format!("http://{}", cname))
    }
}

/// Statuses of environments that are gone or going away.
const RETIRED_STATUSES: [&str; 2] = ["Terminated", "Terminating"];

/// One environment as listed by the control plane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentSummary {
    pub environment_name: String,
    pub application_name: String,
    /// Lifecycle status, e.g. `Ready`, `Launching`, `Terminated`.
    pub status: String,
    pub description: Option<String>,
    pub cname: Option<String>,
    pub solution_stack: Option<String>,
    pub date_updated: Option<String>,
}

impl EnvironmentSummary {
    /// False for terminated and terminating environments.
    pub fn is_active(&self) -> bool {
        !RETIRED_STATUSES.contains(&self.status.as_str())
    }

    /// Record to register this environment under `account_id` and `region_endpoint`.
    pub fn to_record(&self, account_id: &str, region_endpoint: &str) -> EnvironmentRecord {
        EnvironmentRecord {
            account_id: account_id.to_string(),
            region_endpoint: region_endpoint.to_string(),
            application_name: self.application_name.clone(),
            environment_name: self.environment_name.clone(),
            environment_description: self.description.clone(),
            cname: self.cname.clone(),
            solution_stack: self.solution_stack.clone(),
            ..Default::default()
        }
    }
}

fn find_setting<'a>(
    settings: &'a [SettingsDescription],
    namespace: &str,
    option_name: &str,
) -> Option<&'a OptionSetting> {
    settings
        .iter()
        .flat_map(|desc| desc.option_settings.iter())
        .find(|opt| opt.namespace == namespace && opt.option_name == option_name)
}

/// Returns the "JVM Options" setting, if present.
pub fn jvm_options(settings: &[SettingsDescription]) -> Option<&OptionSetting> {
    find_setting(settings, JVM_OPTIONS_NAMESPACE, JVM_OPTIONS_NAME)
}

/// Returns the remote debugging port configured through the JVM options.
pub fn debug_port(settings: &[SettingsDescription]) -> Option<String> {
    jvm_options(settings).and_then(|opt| debug_port_from_jvm_options(&opt.value))
}

/// Extracts the JDWP port from a JVM options string.
///
/// Both `-Xdebug` and `-Xrunjdwp:` must be present.
pub fn debug_port_from_jvm_options(jvm_options: &str) -> Option<String> {
    if !jvm_options.contains("-Xdebug") || !jvm_options.contains("-Xrunjdwp:") {
        return None;
    }
    JDWP_ADDRESS
        .captures(jvm_options)
        .and_then(|caps| caps.get(1))
        .map(|port| port.as_str().to_string())
}

/// Returns the security group(s) of the launch configuration.
pub fn security_group(settings: &[SettingsDescription]) -> Option<&str> {
    find_setting(settings, LAUNCH_CONFIGURATION_NAMESPACE, SECURITY_GROUPS_NAME)
        .map(|opt| opt.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(opts: Vec<OptionSetting>) -> Vec<SettingsDescription> {
        vec![SettingsDescription {
            option_settings: opts,
            ..Default::default()
        }]
    }

    #[test]
    fn test_debug_port_requires_both_flags() {
        let opts = "-Xdebug -Xrunjdwp:transport=dt_socket,server=y,suspend=n,address=8000";
        assert_eq!(debug_port_from_jvm_options(opts).as_deref(), Some("8000"));
        assert_eq!(
            debug_port_from_jvm_options("-Xrunjdwp:transport=dt_socket,address=8000"),
            None
        );
        assert_eq!(debug_port_from_jvm_options("-Xdebug -Xmx512m"), None);
    }

    #[test]
    fn test_settings_lookups() {
        let all = settings(vec![
            OptionSetting::new(
                JVM_OPTIONS_NAMESPACE,
                "JVM Options",
                "-Xdebug -Xrunjdwp:address=5005",
            ),
            OptionSetting::new(LAUNCH_CONFIGURATION_NAMESPACE, "SecurityGroups", "web-sg"),
        ]);
        assert_eq!(debug_port(&all).as_deref(), Some("5005"));
        assert_eq!(security_group(&all), Some("web-sg"));
        assert!(jvm_options(&settings(vec![])).is_none());
    }

    #[test]
    fn test_record_helpers() {
        let record = EnvironmentRecord {
            account_id: "123".into(),
            region_endpoint: "eb.us-east-1".into(),
            application_name: "shop".into(),
            application_description: Some("storefront".into()),
            environment_name: "shop-prod".into(),
            cname: Some("shop-prod.elasticbeanstalk.com".into()),
            ..Default::default()
        };
        assert_eq!(
            record.environment_url().as_deref(),
            Some("http://shop-prod.elasticbeanstalk.com")
        );
        assert_eq!(record.application_description.as_deref(), Some("storefront"));
        assert_eq!(
            record.settings_target(Some("base")),
            SettingsTarget::Template {
                application_name: "shop".into(),
                template_name: "base".into()
            }
        );
        assert_eq!(record.id().to_string(), "123@eb.us-east-1/shop-prod");
    }

    #[test]
    fn test_retired_environments_are_inactive() {
        let summary = |status: &str| EnvironmentSummary {
            environment_name: "shop-prod".into(),
            status: status.into(),
            ..Default::default()
        };
        assert!(summary("Ready").is_active());
        assert!(summary("Launching").is_active());
        assert!(!summary("Terminating").is_active());
        assert!(!summary("Terminated").is_active());

        let record = summary("Ready").to_record("123", "eb.us-east-1");
        assert_eq!(record.id().to_string(), "123@eb.us-east-1/shop-prod");
    }
}
