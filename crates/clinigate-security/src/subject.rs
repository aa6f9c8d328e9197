//! ---
//! cg_section: "02-authorization-core"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Subject records supplied by the identity collaborator."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// The entity being authorized: assigned role ids plus direct grants.
///
/// Both sequences default to empty. Decoding is lenient: `null`, a missing
/// field or a value that is not a sequence all become an empty sequence, and
/// non-string elements are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Optional label for diagnostics; never used in decisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Role identifiers as assigned by the identity system.
    #[serde(default, deserialize_with = "lenient_ids")]
    pub roles: Vec<String>,
    /// Permission identifiers granted directly, bypassing roles.
    #[serde(default, deserialize_with = "lenient_ids")]
    pub permissions: Vec<String>,
}

impl Subject {
    /// Subject holding the given roles and no direct grants.
    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: None,
            roles: roles.into_iter().map(Into::into).collect(),
            permissions: Vec::new(),
        }
    }

    /// Add direct permission grants.
    pub fn granting<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Attach a diagnostic label.
    pub fn labelled(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Label used in log events.
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("anonymous")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientId {
    Id(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientIds {
    List(Vec<LenientId>),
    Other(IgnoredAny),
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LenientIds::deserialize(deserializer)? {
        LenientIds::List(items) => items
            .into_iter()
            .filter_map(|item| match item {
                LenientId::Id(id) => Some(id),
                LenientId::Other(_) => None,
            })
            .collect(),
        LenientIds::Other(_) => Vec::new(),
    })
}
