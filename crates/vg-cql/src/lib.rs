//! vg-cql: CQL block IR for mapping-view generation
//!
//! This crate provides the block tree a view generator assembles bottom-up,
//! and two renderers over it: one producing eSQL text, one producing an
//! in-memory command tree. Both walk the same immutable tree and share the
//! slot-selection and filter-elision decisions so their outputs agree.

pub mod cqt;
pub(crate) mod error;
pub mod ir;
pub mod plan_document;
pub(crate) mod render;

pub use cqt::command::{DbQueryCommandTree, ProviderCommandInfo};
pub use cqt::expr::{DbExpression, DbExpressionBinding, DbJoinClause};
pub use error::{PlanError, PlanResult};
pub use ir::block::{BlockKind, ColumnRef, CqlBlock, JoinClause, JoinCondition, JoinKind};
pub use ir::bool_expr::{BoolExpr, CompareOp};
pub use ir::case_statement::{CaseStatement, CaseValue, WhenThen};
pub use ir::slot::{SlotInfo, SlotValue};
pub use plan_document::{BlockDocument, PlanDocument, SlotDocument, SlotSource};
