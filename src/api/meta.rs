use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub generate_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_owner_deletion: Option<bool>,
}

impl OwnerReference {
    /// Reference with both `controller` and `blockOwnerDeletion` enabled.
    pub fn controller(api_version: &str, kind: &str, name: &str, uid: &str) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            uid: uid.to_string(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        }
    }

    pub fn is_controller(&self) -> bool {
        self.controller == Some(true)
    }
}

impl ObjectMeta {
    /// Sets `key` unless it already exists and `overwrite` is false.
    /// Returns whether the label was written.
    pub fn add_label(&mut self, key: &str, value: &str, overwrite: bool) -> bool {
        if !overwrite && self.labels.contains_key(key) {
            return false;
        }
        self.labels.insert(key.to_string(), value.to_string());
        true
    }

    /// Records `owner`, replacing an existing reference with the same uid.
    /// Other references are left in place.
    pub fn set_owner_reference(&mut self, owner: OwnerReference) {
        match self
            .owner_references
            .iter_mut()
            .find(|existing| existing.uid == owner.uid)
        {
            Some(existing) => *existing = owner,
            None => self.owner_references.push(owner),
        }
    }

    pub fn controller_reference(&self) -> Option<&OwnerReference> {
        self.owner_references.iter().find(|r| r.is_controller())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_label_respects_overwrite_flag() {
        let mut meta = ObjectMeta::default();
        assert!(meta.add_label("team", "a", false));
        assert!(!meta.add_label("team", "b", false));
        assert_eq!(meta.labels["team"], "a");

        assert!(meta.add_label("team", "c", true));
        assert_eq!(meta.labels["team"], "c");
    }

    #[test]
    fn owner_with_same_uid_is_replaced_not_duplicated() {
        let mut meta = ObjectMeta::default();
        meta.owner_references.push(OwnerReference {
            api_version: "v1".to_string(),
            kind: "ConfigMap".to_string(),
            name: "unrelated".to_string(),
            uid: "u-0".to_string(),
            ..Default::default()
        });

        meta.set_owner_reference(OwnerReference::controller("g/v1", "JobDefinition", "old", "u-1"));
        meta.set_owner_reference(OwnerReference::controller("g/v1", "JobDefinition", "new", "u-1"));

        assert_eq!(meta.owner_references.len(), 2);
        assert_eq!(meta.owner_references[0].name, "unrelated");
        assert_eq!(meta.controller_reference().map(|r| r.name.as_str()), Some("new"));
    }

    #[test]
    fn empty_fields_are_omitted_on_the_wire() {
        let meta = ObjectMeta {
            name: "run-1".to_string(),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&meta).unwrap(), r#"{"name":"run-1"}"#);
    }
}
