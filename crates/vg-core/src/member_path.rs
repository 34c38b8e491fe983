//! Member paths — a chain of members rooted at an extent

use serde::{Deserialize, Serialize};
use std::fmt;

/// A path from an extent through zero or more members, e.g. `People.Address.City`.
///
/// The path with no members denotes the extent row itself. In plan documents a
/// path is written as a dotted string whose first component is the extent;
/// [`with_extent`](Self::with_extent) re-splits it for extent names that
/// contain dots, such as `Model.People`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberPath {
    extent: String,
    members: Vec<String>,
}

impl MemberPath {
    /// Create a path from an extent name and a member chain.
    pub fn new<I, S>(extent: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extent: extent.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Path denoting the extent row itself.
    pub fn extent_root(extent: impl Into<String>) -> Self {
        Self {
            extent: extent.into(),
            members: Vec::new(),
        }
    }

    /// Parse a dotted path such as `People.Address.City`.
    ///
    /// Returns `None` when the text is empty or has an empty component.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split('.');
        let extent = parts.next().filter(|p| !p.is_empty())?;
        let members: Vec<&str> = parts.collect();
        if members.iter().any(|m| m.is_empty()) {
            return None;
        }
        Some(Self::new(extent, members))
    }

    /// Re-split the path so that its extent is `extent`.
    ///
    /// `Model.People.Name` parsed with extent `Model` becomes extent
    /// `Model.People` with member `Name`. Returns `None` when the dotted text
    /// of the path does not start with `extent`.
    pub fn with_extent(&self, extent: &str) -> Option<Self> {
        if self.extent == extent {
            return Some(self.clone());
        }
        let mut parts =
            std::iter::once(self.extent.as_str()).chain(self.members.iter().map(String::as_str));
        for expected in extent.split('.') {
            if parts.next() != Some(expected) {
                return None;
            }
        }
        Some(Self::new(extent, parts))
    }

    /// Extend this path by one member.
    pub fn child(&self, member: impl Into<String>) -> Self {
        let mut members = self.members.clone();
        members.push(member.into());
        Self {
            extent: self.extent.clone(),
            members,
        }
    }

    /// Name of the extent at the root of the path
    pub fn extent(&self) -> &str {
        &self.extent
    }

    /// Members below the extent, outermost first
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Whether the path has no members
    pub fn is_extent_root(&self) -> bool {
        self.members.is_empty()
    }

    /// Last member of the path, or the unqualified extent name for the
    /// extent root (`People` for `Model.People`).
    pub fn leaf_name(&self) -> &str {
        match self.members.last() {
            Some(member) => member.as_str(),
            None => self.extent.rsplit('.').next().unwrap_or(&self.extent),
        }
    }

    /// Column alias under which a block projects this member.
    ///
    /// Members are joined with `_`, so `People.Address.City` is projected as
    /// `Address_City`. The extent root is projected under its unqualified
    /// extent name.
    pub fn cql_field_alias(&self) -> String {
        if self.members.is_empty() {
            self.leaf_name().to_string()
        } else {
            self.members.join("_")
        }
    }

    /// Property access from a row variable, e.g. `T.Address.City`.
    pub fn path_text(&self, alias: &str) -> String {
        let mut out = alias.to_string();
        for member in &self.members {
            out.push('.');
            out.push_str(member);
        }
        out
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_text(&self.extent))
    }
}

impl TryFrom<String> for MemberPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MemberPath::parse(&value).ok_or_else(|| format!("invalid member path '{value}'"))
    }
}

impl From<MemberPath> for String {
    fn from(path: MemberPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "member_path_test.rs"]
mod tests;
