//! Slot descriptors — one output column of a block

use super::bool_expr::BoolExpr;
use super::case_statement::CaseStatement;
use serde::Serialize;
use vg_core::{CqlIdentifiers, Literal, MemberPath};

/// What a slot projects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotValue {
    /// A member read from the block's input row
    Member(MemberPath),
    /// A column projected by one child of a join
    Qualified {
        /// Index of the child in the join
        child: usize,
        /// Field alias of the column in that child
        field: String,
    },
    /// A constant
    Constant(Literal),
    /// A boolean discriminator column
    Boolean(BoolExpr),
    /// A value produced by a case statement
    Case(CaseStatement),
}

impl SlotValue {
    /// Short name of the value kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            SlotValue::Member(_) => "member",
            SlotValue::Qualified { .. } => "qualified",
            SlotValue::Constant(_) => "constant",
            SlotValue::Boolean(_) => "boolean",
            SlotValue::Case(_) => "case",
        }
    }
}

/// Describes one output column of a block.
///
/// A slot either carries an output member (a value slot) or is a boolean
/// discriminator slot without one. The field alias is the column name under
/// which the block projects the slot and by which parents refer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotInfo {
    value: SlotValue,
    output_member: Option<MemberPath>,
    field_alias: String,
    required_by_parent: bool,
}

impl SlotInfo {
    /// Project `path` from the input row under its own field alias.
    pub fn member(path: MemberPath) -> Self {
        Self {
            field_alias: path.cql_field_alias(),
            value: SlotValue::Member(path.clone()),
            output_member: Some(path),
            required_by_parent: true,
        }
    }

    /// Project a constant as the value of `output_member`.
    pub fn constant(output_member: MemberPath, value: impl Into<Literal>) -> Self {
        Self {
            field_alias: output_member.cql_field_alias(),
            value: SlotValue::Constant(value.into()),
            output_member: Some(output_member),
            required_by_parent: true,
        }
    }

    /// Project the result of a case statement as the value of its member.
    pub fn case(statement: CaseStatement) -> Self {
        let output_member = statement.member().clone();
        Self {
            field_alias: output_member.cql_field_alias(),
            value: SlotValue::Case(statement),
            output_member: Some(output_member),
            required_by_parent: true,
        }
    }

    /// Boolean discriminator slot numbered `num`, aliased through the registry.
    pub fn boolean(expr: BoolExpr, num: usize, identifiers: &CqlIdentifiers) -> Self {
        Self {
            field_alias: identifiers.from_variable(num),
            value: SlotValue::Boolean(expr),
            output_member: None,
            required_by_parent: true,
        }
    }

    /// Pass a boolean slot of the input row through unchanged.
    pub fn boolean_column(num: usize, identifiers: &CqlIdentifiers) -> Self {
        let alias = identifiers.from_variable(num);
        Self::boolean(BoolExpr::Flag(alias), num, identifiers)
    }

    /// Project member `output_member` from child `child` of a join.
    pub fn qualified(child: usize, output_member: MemberPath) -> Self {
        let field = output_member.cql_field_alias();
        Self {
            value: SlotValue::Qualified {
                child,
                field: field.clone(),
            },
            field_alias: field,
            output_member: Some(output_member),
            required_by_parent: true,
        }
    }

    /// Project boolean slot `num` from child `child` of a join.
    pub fn qualified_boolean(child: usize, num: usize, identifiers: &CqlIdentifiers) -> Self {
        let field = identifiers.from_variable(num);
        Self {
            value: SlotValue::Qualified {
                child,
                field: field.clone(),
            },
            field_alias: field,
            output_member: None,
            required_by_parent: true,
        }
    }

    /// Mark the slot as not needed by the parent block; it is not projected.
    pub fn not_required(mut self) -> Self {
        self.required_by_parent = false;
        self
    }

    /// What the slot projects
    pub fn value(&self) -> &SlotValue {
        &self.value
    }

    /// Member this slot produces, `None` for boolean slots
    pub fn output_member(&self) -> Option<&MemberPath> {
        self.output_member.as_ref()
    }

    /// Whether this is a boolean discriminator slot
    pub fn is_boolean_slot(&self) -> bool {
        self.output_member.is_none()
    }

    /// Column name under which the slot is projected
    pub fn field_alias(&self) -> &str {
        &self.field_alias
    }

    /// Whether the parent block reads this slot
    pub fn is_required_by_parent(&self) -> bool {
        self.required_by_parent
    }
}
