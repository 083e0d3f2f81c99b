//! Control-plane data types.
//!
//! Mirrors the shapes returned by the Elastic Beanstalk configuration APIs.
//! All types derive Serde traits so snapshots can be loaded from disk.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire type of a configuration option.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Scalar,
    Boolean,
    List,
    /// Any type this crate does not decode (kept in the schema, never valued).
    Other(String),
}

impl ValueType {
    pub fn as_str(&self) -> &str {
        match self {
            ValueType::Scalar => "Scalar",
            ValueType::Boolean => "Boolean",
            ValueType::List => "List",
            ValueType::Other(other) => other,
        }
    }
}

impl From<&str> for ValueType {
    fn from(raw: &str) -> Self {
        match raw {
            "Scalar" => ValueType::Scalar,
            "Boolean" => ValueType::Boolean,
            "List" => ValueType::List,
            other => ValueType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ValueType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ValueType::from(raw.as_str()))
    }
}

/// Describes one configurable option in the remote schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OptionDescriptor {
    /// Grouping namespace (e.g. `aws:autoscaling:launchconfiguration`).
    pub namespace: String,

    /// Option name within the namespace.
    pub name: String,

    /// How the option's string value is decoded.
    pub value_type: ValueType,

    /// Default value advertised by the control plane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Impact of changing the option (`NoInterruption`, `RestartEnvironment`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_severity: Option<String>,

    #[serde(default)]
    pub user_defined: bool,

    /// Allowed values for enumerated options.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    /// Validation pattern for scalar values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl OptionDescriptor {
    /// Create a descriptor with no schema metadata.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            value_type,
            default_value: None,
            change_severity: None,
            user_defined: false,
            value_options: Vec::new(),
            min_value: None,
            max_value: None,
            max_length: None,
            regex: None,
        }
    }
}

/// One (namespace, option name, value) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct OptionSetting {
    pub namespace: String,
    pub option_name: String,
    pub value: String,
}

impl OptionSetting {
    pub fn new(
        namespace: impl Into<String>,
        option_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            option_name: option_name.into(),
            value: value.into(),
        }
    }
}

/// A bundle of settings for an environment or a saved template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SettingsDescription {
    pub application_name: Option<String>,
    pub template_name: Option<String>,
    pub environment_name: Option<String>,
    pub option_settings: Vec<OptionSetting>,
}

/// What a settings fetch is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SettingsTarget {
    /// The running settings of a live environment.
    Environment { environment_name: String },
    /// A saved configuration template of an application.
    Template {
        application_name: String,
        template_name: String,
    },
}

impl fmt::Display for SettingsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsTarget::Environment { environment_name } => {
                write!(f, "environment {}", environment_name)
            }
            SettingsTarget::Template {
                application_name,
                template_name,
            } => write!(f, "template {}/{}", application_name, template_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_parsing() {
        assert_eq!(ValueType::from("List"), ValueType::List);
        assert_eq!(ValueType::from("Boolean"), ValueType::Boolean);
        assert_eq!(
            ValueType::from("CommaSeparatedList"),
            ValueType::Other("CommaSeparatedList".into())
        );
    }

    #[test]
    fn test_descriptor_deserializes_with_defaults() {
        let json = r#"{"namespace":"ns1","name":"Tags","value_type":"List"}"#;
        let desc: OptionDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(desc, OptionDescriptor::new("ns1", "Tags", ValueType::List));

        let back = serde_json::to_string(&desc).unwrap();
        assert!(back.contains(r#""value_type":"List""#));
    }
}
