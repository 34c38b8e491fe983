//! Command-tree wrappers handed to the provider pipeline

use super::expr::DbExpression;
use crate::error::PlanResult;
use crate::ir::block::CqlBlock;
use serde::Serialize;

/// A query command tree: the root of a rendered view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbQueryCommandTree {
    query: DbExpression,
}

impl DbQueryCommandTree {
    /// Wrap a rendered query
    pub fn new(query: DbExpression) -> Self {
        Self { query }
    }

    /// Render `block` as a top-level query and wrap it
    pub fn from_block(block: &CqlBlock) -> PlanResult<Self> {
        Ok(Self::new(block.render_structural(true)?))
    }

    /// Root expression of the query
    pub fn query(&self) -> &DbExpression {
        &self.query
    }
}

/// Captures information about a single provider command.
///
/// The downstream compiler treats the command tree as an opaque payload.
#[derive(Debug, Clone)]
pub struct ProviderCommandInfo {
    command_tree: DbQueryCommandTree,
}

impl ProviderCommandInfo {
    /// Create command info for a command tree
    pub fn new(command_tree: DbQueryCommandTree) -> Self {
        Self { command_tree }
    }

    /// The command tree for the provider command
    pub fn command_tree(&self) -> &DbQueryCommandTree {
        &self.command_tree
    }
}
