use crate::types::TypeTag;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Configured equivalence classes of interchangeable kinds.
///
/// Maps a kind to every kind treated as substitutable for it, itself included.
/// Kinds missing from the table form a group of one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct CompatibilityTable {
    groups: BTreeMap<TypeTag, Vec<TypeTag>>,
}

// Loaded groups always contain their own kind, so `group` and `compatible` agree.
impl<'de> Deserialize<'de> for CompatibilityTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<TypeTag, Vec<TypeTag>>::deserialize(deserializer)?;
        Ok(Self::from_groups(raw))
    }
}

impl Default for CompatibilityTable {
    fn default() -> Self {
        Self::artifacts()
    }
}

impl CompatibilityTable {
    /// A table with no groups: every kind is only compatible with itself.
    pub fn empty() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    /// Builds a table from a `kind -> [kinds]` map.
    ///
    /// Each entry is listed as given, with its key prepended when missing and
    /// duplicates dropped. Entries are not mirrored onto the other kinds.
    pub fn from_groups(groups: impl IntoIterator<Item = (TypeTag, Vec<TypeTag>)>) -> Self {
        let groups = groups
            .into_iter()
            .map(|(kind, listed)| {
                let mut members: Vec<TypeTag> = Vec::new();
                for member in listed {
                    if !members.contains(&member) {
                        members.push(member);
                    }
                }
                if !members.contains(&kind) {
                    members.insert(0, kind.clone());
                }
                (kind, members)
            })
            .collect();
        Self { groups }
    }

    /// Artifacts and their URL-backed counterparts.
    pub fn artifacts() -> Self {
        let mut table = Self::empty();
        for base in ["ImageArtifact", "AudioArtifact", "VideoArtifact"] {
            let url = base.replace("Artifact", "UrlArtifact");
            table.add_group([TypeTag::new(base), TypeTag::new(url)]);
        }
        table
    }

    /// Registers `kinds` as mutually interchangeable.
    ///
    /// Every member maps to the full group, so lookup is symmetric.
    pub fn add_group(&mut self, kinds: impl IntoIterator<Item = TypeTag>) -> &mut Self {
        let mut members: Vec<TypeTag> = Vec::new();
        for kind in kinds {
            if !members.contains(&kind) {
                members.push(kind);
            }
        }
        for member in &members {
            self.groups.insert(member.clone(), members.clone());
        }
        self
    }

    /// All kinds compatible with `kind`, including itself.
    pub fn group(&self, kind: &TypeTag) -> Vec<TypeTag> {
        match self.groups.get(kind) {
            Some(group) => group.clone(),
            None => vec![kind.clone()],
        }
    }

    /// Whether `candidate` may stand in for `kind`.
    pub fn compatible(&self, kind: &TypeTag, candidate: &TypeTag) -> bool {
        kind == candidate
            || self
                .groups
                .get(kind)
                .is_some_and(|group| group.contains(candidate))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
