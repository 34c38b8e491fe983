//! Error types for vg-cql
//!
//! Every variant describes a malformed plan: a block tree the view generator
//! should never have produced. They are reported with the `P` prefix so they
//! are not confused with configuration (`E`) errors.

use thiserror::Error;
use vg_core::CoreError;

/// Malformed-plan error type
#[derive(Error, Debug)]
pub enum PlanError {
    /// P001: The case slot of a case block is a boolean slot
    #[error("[P001] Malformed plan: case slot {slot} of block '{block}' has no output member; only member slots can be constructed")]
    CaseSlotWithoutMember { block: String, slot: usize },

    /// P002: A slot index does not exist in the block
    #[error("[P002] Malformed plan: slot index {index} is out of range for block '{block}' with {len} slots")]
    SlotIndexOutOfRange {
        block: String,
        index: usize,
        len: usize,
    },

    /// P003: A block kind was given the wrong number of children
    #[error("[P003] Malformed plan: {kind} block '{block}' requires {expected} children, found {found}")]
    ChildArity {
        block: String,
        kind: &'static str,
        expected: &'static str,
        found: usize,
    },

    /// P004: A column reference names a child the block does not have
    #[error("[P004] Malformed plan: block '{block}' references child {index} but has {children} children")]
    ChildIndexOutOfRange {
        block: String,
        index: usize,
        children: usize,
    },

    /// P005: A top-level render must project exactly one value slot
    #[error("[P005] Malformed plan: top-level block '{block}' must project exactly one member slot, found {found}")]
    TopLevelProjection { block: String, found: usize },

    /// P006: A slot value kind is not allowed in this block kind
    #[error("[P006] Malformed plan: slot {slot} of {kind} block '{block}' cannot hold a {value} value")]
    UnsupportedSlot {
        block: String,
        kind: &'static str,
        slot: usize,
        value: &'static str,
    },

    /// P007: An unqualified member was referenced over a join's row
    #[error("[P007] Malformed plan: member '{member}' must be qualified with a child index inside a join")]
    UnqualifiedMember { member: String },

    /// P008: A qualified column was referenced outside a join
    #[error("[P008] Malformed plan: qualified column '{field}' used outside a join block")]
    QualifiedOutsideJoin { field: String },

    /// P009: Union children disagree with the union's columns
    #[error("[P009] Malformed plan: child {child} of union block '{block}' projects [{found}], expected [{expected}]")]
    UnionMismatch {
        block: String,
        child: usize,
        expected: String,
        found: String,
    },

    /// P010: Join clause count does not match the children
    #[error("[P010] Malformed plan: join block '{block}' has {children} children and needs {expected} join clauses, found {found}")]
    JoinClauseCount {
        block: String,
        children: usize,
        expected: usize,
        found: usize,
    },

    /// P011: Plan document could not be interpreted
    #[error("[P011] Malformed plan document: {message}")]
    Document { message: String },

    /// P012: Core error propagation
    #[error("[P012] Malformed plan input: {0}")]
    Core(#[from] CoreError),

    /// P013: Two blocks of one tree share an alias
    #[error("[P013] Malformed plan: alias '{alias}' is used by more than one block under '{block}'")]
    DuplicateAlias { block: String, alias: String },

    /// P014: A top-level case block must project the slot it constructs
    #[error("[P014] Malformed plan: top-level case block '{block}' must project its case slot {case_slot}")]
    TopLevelCaseSlot { block: String, case_slot: usize },
}

/// Result type alias for PlanError
pub type PlanResult<T> = Result<T, PlanError>;
