//! Renderers over the block tree
//!
//! `text` appends eSQL to a string buffer; `tree` builds a command tree. They
//! are independent walks of the same tree and take the same decisions from
//! [`CqlBlock`]: which slots to project and whether to filter.

use crate::ir::block::CqlBlock;

pub(crate) mod text;
pub(crate) mod tree;

/// Shape of the row a block's projection and filter are evaluated over.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RowShape<'a> {
    /// An extent row; members are reached by dotted property paths
    Extent,
    /// A row projected by the single child; members are reached by field alias
    Child,
    /// A joined row; columns are reached through the child that projects them
    Join {
        block: &'a str,
        children: &'a [CqlBlock],
    },
}
