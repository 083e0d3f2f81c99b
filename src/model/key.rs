//! Option identity.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::facade::{OptionDescriptor, OptionSetting};

/// Identity of a model entry: the (namespace, name) pair.
///
/// Field order makes the derived `Ord` compare namespace first, then name,
/// both byte-wise. Byte order of UTF-8 matches code-point order, so it differs
/// from UTF-16 code-unit order only for characters above U+FFFF; that
/// difference is intended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct OptionKey {
    pub namespace: String,
    pub name: String,
}

impl OptionKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl From<&OptionDescriptor> for OptionKey {
    fn from(desc: &OptionDescriptor) -> Self {
        Self::new(&desc.namespace, &desc.name)
    }
}

impl From<&OptionSetting> for OptionKey {
    fn from(setting: &OptionSetting) -> Self {
        Self::new(&setting.namespace, &setting.option_name)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Schema ordering: namespace, then name.
pub fn compare_descriptors(a: &OptionDescriptor, b: &OptionDescriptor) -> Ordering {
    a.namespace
        .cmp(&b.namespace)
        .then_with(|| a.name.cmp(&b.name))
}

/// Sort a schema in place by namespace, then name.
pub fn sort_descriptors(options: &mut [OptionDescriptor]) {
    options.sort_by(compare_descriptors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::ValueType;
    use std::collections::HashSet;

    #[test]
    fn test_key_equality_ignores_value_type() {
        let a = OptionDescriptor::new("ns1", "Tags", ValueType::List);
        let b = OptionDescriptor::new("ns1", "Tags", ValueType::Scalar);
        let keys: HashSet<OptionKey> = [OptionKey::from(&a), OptionKey::from(&b)].into();
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_sort_namespace_then_name_case_sensitive() {
        let mut options = vec![
            OptionDescriptor::new("ns2", "A", ValueType::Scalar),
            OptionDescriptor::new("ns1", "b", ValueType::Scalar),
            OptionDescriptor::new("ns1", "B", ValueType::Scalar),
            OptionDescriptor::new("Ns3", "a", ValueType::Scalar),
        ];
        sort_descriptors(&mut options);
        let order: Vec<String> = options
            .iter()
            .map(|o| OptionKey::from(o).to_string())
            .collect();
        assert_eq!(order, vec!["Ns3/a", "ns1/B", "ns1/b", "ns2/A"]);
    }

    #[test]
    fn test_supplementary_characters_sort_by_code_point() {
        let bmp = OptionKey::new("ns1", "\u{FFFD}");
        let astral = OptionKey::new("ns1", "\u{1F600}");
        assert!(bmp < astral);
    }
}
