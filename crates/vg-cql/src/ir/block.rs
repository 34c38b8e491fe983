//! CQL blocks — the nodes of the IR tree
//!
//! A block is one relational step: it reads rows from an extent or from its
//! children, optionally filters them, and projects an ordered list of slots.
//! The kinds form a closed set; the projection and filter decisions that must
//! agree between renderers (which slots are projected, whether a WHERE clause
//! is needed) live here, and each renderer only decides how to spell them.

use super::bool_expr::BoolExpr;
use super::slot::{SlotInfo, SlotValue};
use crate::cqt::expr::DbExpression;
use crate::error::{PlanError, PlanResult};
use crate::render::{text, tree};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use vg_core::CqlIdentifiers;

/// Join type between consecutive children of a join block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    /// Inner join
    Inner,
    /// Left outer join
    LeftOuter,
    /// Full outer join
    FullOuter,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::LeftOuter => write!(f, "LEFT OUTER JOIN"),
            JoinKind::FullOuter => write!(f, "FULL OUTER JOIN"),
        }
    }
}

/// A column projected by one child of a join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Index of the child in the join
    pub child: usize,
    /// Field alias of the column in that child
    pub field: String,
}

impl ColumnRef {
    /// Reference column `field` of child `child`
    pub fn new(child: usize, field: impl Into<String>) -> Self {
        Self {
            child,
            field: field.into(),
        }
    }
}

/// Equality condition `left = right` between two join inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCondition {
    /// Left column
    pub left: ColumnRef,
    /// Right column
    pub right: ColumnRef,
}

/// How child `i + 1` of a join block is joined to the children before it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinClause {
    /// Join type
    pub kind: JoinKind,
    /// Conjunction of equality conditions; empty means `ON True`
    #[serde(default)]
    pub on: Vec<JoinCondition>,
}

/// Kind-specific part of a block
#[derive(Debug, Clone)]
pub enum BlockKind {
    /// Leaf block reading rows of an extent
    Extent {
        /// Extent name, e.g. `Model.People`
        extent: String,
        /// Variable bound to each extent row
        row_alias: String,
    },
    /// Block constructing one slot with a case statement over a single child
    Case {
        /// The only input
        child: Box<CqlBlock>,
        /// Index into the block's slots of the constructed slot
        case_slot: usize,
    },
    /// Left-deep join of two or more children
    Join {
        /// Inputs in join order
        children: Vec<CqlBlock>,
        /// One clause per child after the first
        clauses: Vec<JoinClause>,
    },
    /// `UNION ALL` of two or more children
    Union {
        /// Inputs in union order
        children: Vec<CqlBlock>,
    },
}

impl BlockKind {
    /// Name of the kind, used in errors and logs
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Extent { .. } => "extent",
            BlockKind::Case { .. } => "case",
            BlockKind::Join { .. } => "join",
            BlockKind::Union { .. } => "union",
        }
    }
}

/// One node of the immutable block tree.
///
/// Every node exclusively owns its children. The alias is resolved from the
/// identifier registry when the block is built and never changes afterwards,
/// so a tree can be rendered any number of times, from any thread.
#[derive(Debug, Clone)]
pub struct CqlBlock {
    slots: Vec<SlotInfo>,
    where_clause: BoolExpr,
    alias: String,
    kind: BlockKind,
}

impl CqlBlock {
    /// Leaf block: `SELECT <slots> FROM <extent> AS T [WHERE ...]`.
    pub fn extent(
        slots: Vec<SlotInfo>,
        extent: impl Into<String>,
        where_clause: BoolExpr,
        identifiers: &CqlIdentifiers,
        block_alias_num: usize,
    ) -> PlanResult<Self> {
        let alias = identifiers.block_alias(block_alias_num);
        reject_slot_values(&alias, "extent", &slots, |v| {
            matches!(v, SlotValue::Qualified { .. })
        })?;
        Ok(Self::finish(
            slots,
            where_clause,
            alias,
            BlockKind::Extent {
                extent: extent.into(),
                row_alias: identifiers.extent_row_alias(),
            },
        ))
    }

    /// Block constructing `slots[case_slot]` over exactly one child; every
    /// other slot passes through from the child.
    ///
    /// Fails when the case slot does not exist or is a boolean slot: only
    /// member slots can be constructed.
    pub fn case(
        slots: Vec<SlotInfo>,
        case_slot: usize,
        child: CqlBlock,
        where_clause: BoolExpr,
        identifiers: &CqlIdentifiers,
        block_alias_num: usize,
    ) -> PlanResult<Self> {
        let alias = identifiers.block_alias(block_alias_num);
        let slot = slots
            .get(case_slot)
            .ok_or_else(|| PlanError::SlotIndexOutOfRange {
                block: alias.clone(),
                index: case_slot,
                len: slots.len(),
            })?;
        if slot.output_member().is_none() {
            return Err(PlanError::CaseSlotWithoutMember {
                block: alias,
                slot: case_slot,
            });
        }
        reject_slot_values(&alias, "case", &slots, |v| {
            matches!(v, SlotValue::Qualified { .. })
        })?;
        check_unique_aliases(&alias, std::slice::from_ref(&child))?;
        Ok(Self::finish(
            slots,
            where_clause,
            alias,
            BlockKind::Case {
                child: Box::new(child),
                case_slot,
            },
        ))
    }

    /// Left-deep join: `clauses[i]` joins `children[i + 1]` to the children
    /// before it. Slots must be qualified columns or constants. A join never
    /// filters, so its where clause is `True`.
    pub fn join(
        slots: Vec<SlotInfo>,
        children: Vec<CqlBlock>,
        clauses: Vec<JoinClause>,
        identifiers: &CqlIdentifiers,
        block_alias_num: usize,
    ) -> PlanResult<Self> {
        let alias = identifiers.block_alias(block_alias_num);
        if children.len() < 2 {
            return Err(PlanError::ChildArity {
                block: alias,
                kind: "join",
                expected: "at least 2",
                found: children.len(),
            });
        }
        if clauses.len() != children.len() - 1 {
            return Err(PlanError::JoinClauseCount {
                block: alias,
                children: children.len(),
                expected: children.len() - 1,
                found: clauses.len(),
            });
        }
        reject_slot_values(&alias, "join", &slots, |v| {
            !matches!(v, SlotValue::Qualified { .. } | SlotValue::Constant(_))
        })?;
        for slot in &slots {
            if let SlotValue::Qualified { child, .. } = slot.value() {
                check_child_index(&alias, *child, children.len())?;
            }
        }
        for (i, clause) in clauses.iter().enumerate() {
            // Only the inputs joined so far are visible to this clause
            let visible = i + 2;
            for condition in &clause.on {
                check_child_index(&alias, condition.left.child, visible)?;
                check_child_index(&alias, condition.right.child, visible)?;
            }
        }
        check_unique_aliases(&alias, &children)?;
        Ok(Self::finish(
            slots,
            BoolExpr::True,
            alias,
            BlockKind::Join { children, clauses },
        ))
    }

    /// `UNION ALL` of the children. Each child must project the same
    /// columns, by field alias and in order, as this block's slots.
    pub fn union(
        slots: Vec<SlotInfo>,
        children: Vec<CqlBlock>,
        identifiers: &CqlIdentifiers,
        block_alias_num: usize,
    ) -> PlanResult<Self> {
        let alias = identifiers.block_alias(block_alias_num);
        if children.len() < 2 {
            return Err(PlanError::ChildArity {
                block: alias,
                kind: "union",
                expected: "at least 2",
                found: children.len(),
            });
        }
        let expected = required_aliases(&slots);
        for (i, child) in children.iter().enumerate() {
            let found = required_aliases(child.slots());
            if found != expected {
                return Err(PlanError::UnionMismatch {
                    block: alias,
                    child: i,
                    expected: expected.join(", "),
                    found: found.join(", "),
                });
            }
        }
        check_unique_aliases(&alias, &children)?;
        Ok(Self::finish(
            slots,
            BoolExpr::True,
            alias,
            BlockKind::Union { children },
        ))
    }

    fn finish(slots: Vec<SlotInfo>, where_clause: BoolExpr, alias: String, kind: BlockKind) -> Self {
        log::debug!(
            "Built {} block {} with {} slots and {} children",
            kind.name(),
            alias,
            slots.len(),
            match &kind {
                BlockKind::Extent { .. } => 0,
                BlockKind::Case { .. } => 1,
                BlockKind::Join { children, .. } | BlockKind::Union { children } => children.len(),
            }
        );
        Self {
            slots,
            where_clause,
            alias,
            kind,
        }
    }

    /// Output columns in projection order
    pub fn slots(&self) -> &[SlotInfo] {
        &self.slots
    }

    /// Filter applied to the input rows
    pub fn where_clause(&self) -> &BoolExpr {
        &self.where_clause
    }

    /// Alias under which parents refer to this block's rows
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Kind-specific part of the block
    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    /// Child blocks in order (empty for extent blocks)
    pub fn children(&self) -> &[CqlBlock] {
        match &self.kind {
            BlockKind::Extent { .. } => &[],
            BlockKind::Case { child, .. } => std::slice::from_ref(child.as_ref()),
            BlockKind::Join { children, .. } | BlockKind::Union { children } => children,
        }
    }

    /// The slot a case block constructs
    pub fn case_slot(&self) -> Option<&SlotInfo> {
        match &self.kind {
            BlockKind::Case { case_slot, .. } => self.slots.get(*case_slot),
            _ => None,
        }
    }

    /// Whether a filter must be rendered. A where clause equivalent to
    /// `True` is omitted by both renderers.
    pub fn has_filter(&self) -> bool {
        !self.where_clause.is_true()
    }

    /// Slots the block projects, in order.
    ///
    /// A nested block projects every slot its parent requires. A top-level
    /// block projects its single required member slot as a bare value;
    /// boolean slots are bookkeeping and are never a top-level value. A
    /// top-level case block must project the slot it constructs.
    pub fn projected_slots(&self, is_top_level: bool) -> PlanResult<Vec<&SlotInfo>> {
        let required = self.slots.iter().filter(|s| s.is_required_by_parent());
        if !is_top_level {
            return Ok(required.collect());
        }
        let values: Vec<&SlotInfo> = required.filter(|s| !s.is_boolean_slot()).collect();
        if values.len() != 1 {
            return Err(PlanError::TopLevelProjection {
                block: self.alias.clone(),
                found: values.len(),
            });
        }
        if let BlockKind::Case { case_slot, .. } = &self.kind {
            let projects_case_slot = self
                .slots
                .get(*case_slot)
                .is_some_and(|slot| std::ptr::eq(slot, values[0]));
            if !projects_case_slot {
                return Err(PlanError::TopLevelCaseSlot {
                    block: self.alias.clone(),
                    case_slot: *case_slot,
                });
            }
        }
        Ok(values)
    }

    /// Append the eSQL text of this block and its subtree to `builder`.
    ///
    /// `is_top_level` selects `SELECT VALUE` with a single bare value instead
    /// of a row of aliased columns. Returns `builder` for chaining.
    pub fn render_text<'b>(
        &self,
        builder: &'b mut String,
        is_top_level: bool,
        indent_level: usize,
    ) -> PlanResult<&'b mut String> {
        text::render_block(self, builder, is_top_level, indent_level)?;
        Ok(builder)
    }

    /// Build the command tree equivalent to [`render_text`](Self::render_text).
    pub fn render_structural(&self, is_top_level: bool) -> PlanResult<DbExpression> {
        tree::render_block(self, is_top_level)
    }

    /// Render the eSQL text of the whole tree into a fresh string.
    pub fn to_esql(&self, is_top_level: bool) -> PlanResult<String> {
        let mut builder = String::new();
        self.render_text(&mut builder, is_top_level, 0)?;
        Ok(builder.trim_start().to_string())
    }

    /// Aliases of this block and every block below it, in pre-order
    pub fn aliases(&self) -> Vec<&str> {
        let mut out = vec![self.alias.as_str()];
        for child in self.children() {
            out.extend(child.aliases());
        }
        out
    }
}

fn required_aliases(slots: &[SlotInfo]) -> Vec<&str> {
    slots
        .iter()
        .filter(|s| s.is_required_by_parent())
        .map(|s| s.field_alias())
        .collect()
}

fn reject_slot_values(
    block: &str,
    kind: &'static str,
    slots: &[SlotInfo],
    rejected: impl Fn(&SlotValue) -> bool,
) -> PlanResult<()> {
    match slots.iter().position(|s| rejected(s.value())) {
        Some(slot) => Err(PlanError::UnsupportedSlot {
            block: block.to_string(),
            kind,
            slot,
            value: slots[slot].value().kind_name(),
        }),
        None => Ok(()),
    }
}

/// Reject a subtree that reuses `block` or an alias already taken by an
/// earlier child.
fn check_unique_aliases(block: &str, children: &[CqlBlock]) -> PlanResult<()> {
    let mut seen = HashSet::from([block]);
    for alias in children.iter().flat_map(CqlBlock::aliases) {
        if !seen.insert(alias) {
            return Err(PlanError::DuplicateAlias {
                block: block.to_string(),
                alias: alias.to_string(),
            });
        }
    }
    Ok(())
}

fn check_child_index(block: &str, index: usize, children: usize) -> PlanResult<()> {
    if index < children {
        Ok(())
    } else {
        Err(PlanError::ChildIndexOutOfRange {
            block: block.to_string(),
            index,
            children,
        })
    }
}

#[cfg(test)]
#[path = "block_test.rs"]
mod tests;
