//! Identifier registry for generated aliases
//!
//! Block aliases (`T1`, `T2`, ...) and boolean "from" slot aliases (`_from0`,
//! ...) are generated from numbers. The registry remembers every member and
//! extent name seen in the plan so a generated alias never shadows one of
//! them. Comparisons are case-insensitive because eSQL identifiers are.

use crate::config::IdentifierConfig;
use std::collections::HashSet;

/// Default prefix for block aliases
pub const DEFAULT_BLOCK_PREFIX: &str = "T";

/// Default prefix for boolean slot aliases
pub const DEFAULT_FROM_PREFIX: &str = "_from";

/// Registry that hands out collision-free aliases for one render pass.
#[derive(Debug, Clone)]
pub struct CqlIdentifiers {
    block_prefix: String,
    from_prefix: String,
    identifiers: HashSet<String>,
}

impl Default for CqlIdentifiers {
    fn default() -> Self {
        Self::new()
    }
}

impl CqlIdentifiers {
    /// Create a registry with the default `T` / `_from` prefixes.
    pub fn new() -> Self {
        Self {
            block_prefix: DEFAULT_BLOCK_PREFIX.to_string(),
            from_prefix: DEFAULT_FROM_PREFIX.to_string(),
            identifiers: HashSet::new(),
        }
    }

    /// Create a registry from configuration; reserved names are registered up front.
    pub fn from_config(config: &IdentifierConfig) -> Self {
        let mut identifiers = Self {
            block_prefix: config.block_prefix.clone(),
            from_prefix: config.from_prefix.clone(),
            identifiers: HashSet::new(),
        };
        for name in &config.reserved {
            identifiers.add_identifier(name);
        }
        identifiers
    }

    /// Register a name that generated aliases must not collide with.
    pub fn add_identifier(&mut self, name: &str) {
        self.identifiers.insert(name.to_lowercase());
    }

    /// Whether `name` has been registered (case-insensitive)
    pub fn contains(&self, name: &str) -> bool {
        self.identifiers.contains(&name.to_lowercase())
    }

    /// Alias for the block numbered `num`, e.g. `T3`.
    pub fn block_alias(&self, num: usize) -> String {
        self.non_conflicting_name(&self.block_prefix, Some(num))
    }

    /// Alias bound to extent rows inside a leaf block, e.g. `T`.
    pub fn extent_row_alias(&self) -> String {
        self.non_conflicting_name(&self.block_prefix, None)
    }

    /// Alias for the boolean slot numbered `num`, e.g. `_from0`.
    pub fn from_variable(&self, num: usize) -> String {
        self.non_conflicting_name(&self.from_prefix, Some(num))
    }

    /// `prefix` followed by `num`, with `_` prepended until the name is free.
    ///
    /// Prepending the same character to every candidate keeps the mapping
    /// injective: stripping the leading underscores recovers `prefix + num`.
    fn non_conflicting_name(&self, prefix: &str, num: Option<usize>) -> String {
        let mut name = match num {
            Some(n) => format!("{prefix}{n}"),
            None => prefix.to_string(),
        };
        while self.contains(&name) {
            name.insert(0, '_');
        }
        name
    }
}

#[cfg(test)]
#[path = "identifiers_test.rs"]
mod tests;
