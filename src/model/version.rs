//! Version descriptors, used for ordering only.

use serde::{Deserialize, Serialize};

/// Where a version comes from in the tenant's repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    #[default]
    Branch,
    Tag,
    /// Pull/merge request previews.
    External,
}

/// A version of a tenant's documentation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionDescriptor {
    pub slug: String,
    #[serde(default)]
    pub verbose_name: String,
    #[serde(default = "default_true")]
    pub built: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub kind: VersionKind,
    #[serde(default)]
    pub identifier: String,
}

fn default_true() -> bool {
    true
}

impl VersionDescriptor {
    /// An active, built branch version named after its slug.
    pub fn new(slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            verbose_name: slug.clone(),
            identifier: slug.clone(),
            slug,
            built: true,
            active: true,
            hidden: false,
            kind: VersionKind::Branch,
        }
    }

    /// Whether the version belongs in a public version picker.
    pub fn is_listed(&self) -> bool {
        self.active && self.built && !self.hidden && self.kind != VersionKind::External
    }
}
