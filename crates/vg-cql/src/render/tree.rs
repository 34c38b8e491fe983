//! Command-tree renderer

use super::RowShape;
use crate::cqt::expr::{DbExpression, DbJoinClause};
use crate::error::{PlanError, PlanResult};
use crate::ir::block::{BlockKind, CqlBlock, JoinClause};
use crate::ir::bool_expr::{BoolExpr, CompareOp};
use crate::ir::case_statement::{CaseStatement, CaseValue};
use crate::ir::slot::SlotValue;
use vg_core::MemberPath;

/// Build the command tree for `block` and its subtree.
pub(crate) fn render_block(block: &CqlBlock, is_top_level: bool) -> PlanResult<DbExpression> {
    match block.kind() {
        BlockKind::Extent { extent, row_alias } => {
            let mut cqt = DbExpression::scan(extent.as_str());
            if block.has_filter() {
                cqt = cqt.try_filter(row_alias, |row| {
                    bool_tree(&block.where_clause().simplify(), row, RowShape::Extent)
                })?;
            }
            cqt.try_select(row_alias, |row| {
                generate_projection_tree(block, row, RowShape::Extent, is_top_level)
            })
        }
        BlockKind::Case { child, case_slot } => {
            if block
                .slots()
                .get(*case_slot)
                .and_then(|slot| slot.output_member())
                .is_none()
            {
                return Err(PlanError::CaseSlotWithoutMember {
                    block: block.alias().to_string(),
                    slot: *case_slot,
                });
            }

            let child_alias = child.alias();
            let mut cqt = render_block(child, false)?;
            // Filter only when the where clause is not simply True
            if block.has_filter() {
                cqt = cqt.try_filter(child_alias, |row| {
                    bool_tree(&block.where_clause().simplify(), row, RowShape::Child)
                })?;
            }
            cqt.try_select(child_alias, |row| {
                generate_projection_tree(block, row, RowShape::Child, is_top_level)
            })
        }
        BlockKind::Join { children, clauses } => {
            let inputs = children
                .iter()
                .map(|child| Ok(render_block(child, false)?.bind_as(child.alias())))
                .collect::<PlanResult<Vec<_>>>()?;
            let clauses = clauses
                .iter()
                .map(|clause| {
                    Ok(DbJoinClause {
                        kind: clause.kind,
                        condition: join_condition_tree(clause, block.alias(), children)?,
                    })
                })
                .collect::<PlanResult<Vec<_>>>()?;
            let shape = RowShape::Join {
                block: block.alias(),
                children,
            };
            DbExpression::Join { inputs, clauses }.try_select(block.alias(), |row| {
                generate_projection_tree(block, row, shape, is_top_level)
            })
        }
        BlockKind::Union { children } => {
            let mut rendered = children.iter().map(|child| render_block(child, is_top_level));
            let first = rendered.next().ok_or_else(|| PlanError::ChildArity {
                block: block.alias().to_string(),
                kind: "union",
                expected: "at least 2",
                found: 0,
            })??;
            rendered.try_fold(first, |acc, next| -> PlanResult<DbExpression> {
                Ok(acc.union_all(next?))
            })
        }
    }
}

/// Build the projection of `block` over `row`.
///
/// Nested blocks produce a row whose columns are the projected slots' field
/// aliases; a top-level block produces its single value bare.
pub(crate) fn generate_projection_tree(
    block: &CqlBlock,
    row: &DbExpression,
    shape: RowShape<'_>,
    is_top_level: bool,
) -> PlanResult<DbExpression> {
    let slots = block.projected_slots(is_top_level)?;
    if is_top_level {
        if let [slot] = slots.as_slice() {
            return slot_value_tree(slot.value(), row, shape);
        }
        return Err(PlanError::TopLevelProjection {
            block: block.alias().to_string(),
            found: slots.len(),
        });
    }
    let columns = slots
        .into_iter()
        .map(|slot| {
            Ok((
                slot.field_alias().to_string(),
                slot_value_tree(slot.value(), row, shape)?,
            ))
        })
        .collect::<PlanResult<Vec<_>>>()?;
    Ok(DbExpression::NewRow { columns })
}

fn slot_value_tree(
    value: &SlotValue,
    row: &DbExpression,
    shape: RowShape<'_>,
) -> PlanResult<DbExpression> {
    match value {
        SlotValue::Member(path) => member_tree(path, row, shape),
        SlotValue::Qualified { child, field } => qualified_tree(*child, field, row, shape),
        SlotValue::Constant(literal) => Ok(DbExpression::constant(literal.clone())),
        SlotValue::Boolean(expr) => bool_tree(&expr.simplify(), row, shape),
        SlotValue::Case(statement) => case_statement_tree(statement, row, shape),
    }
}

fn case_statement_tree(
    statement: &CaseStatement,
    row: &DbExpression,
    shape: RowShape<'_>,
) -> PlanResult<DbExpression> {
    let statement = statement.simplified();
    if let Some(value) = statement.unconditional_value() {
        return case_value_tree(&value, row, shape);
    }

    let mut whens = Vec::with_capacity(statement.clauses().len());
    let mut thens = Vec::with_capacity(statement.clauses().len());
    for clause in statement.clauses() {
        whens.push(bool_tree(&clause.condition, row, shape)?);
        thens.push(case_value_tree(&clause.value, row, shape)?);
    }
    let else_expression = match statement.else_value() {
        Some(value) => case_value_tree(value, row, shape)?,
        None => DbExpression::null(),
    };
    Ok(DbExpression::Case {
        whens,
        thens,
        else_expression: Box::new(else_expression),
    })
}

fn case_value_tree(
    value: &CaseValue,
    row: &DbExpression,
    shape: RowShape<'_>,
) -> PlanResult<DbExpression> {
    match value {
        CaseValue::Constant(literal) => Ok(DbExpression::constant(literal.clone())),
        CaseValue::Column(path) => member_tree(path, row, shape),
        CaseValue::Construct { type_name, args } => Ok(DbExpression::NewInstance {
            type_name: type_name.clone(),
            arguments: args
                .iter()
                .map(|arg| member_tree(arg, row, shape))
                .collect::<PlanResult<Vec<_>>>()?,
        }),
    }
}

/// Build `expr` evaluated over `row`.
pub(crate) fn bool_tree(
    expr: &BoolExpr,
    row: &DbExpression,
    shape: RowShape<'_>,
) -> PlanResult<DbExpression> {
    Ok(match expr {
        BoolExpr::True => DbExpression::constant(true),
        BoolExpr::False => DbExpression::constant(false),
        BoolExpr::Comparison { member, op, value } => DbExpression::Comparison {
            op: *op,
            left: Box::new(member_tree(member, row, shape)?),
            right: Box::new(DbExpression::constant(value.clone())),
        },
        BoolExpr::IsNull { member, negated } => {
            let test = DbExpression::IsNull {
                argument: Box::new(member_tree(member, row, shape)?),
            };
            if *negated {
                DbExpression::Not {
                    argument: Box::new(test),
                }
            } else {
                test
            }
        }
        BoolExpr::IsOf {
            member,
            type_name,
            only,
        } => DbExpression::IsOf {
            argument: Box::new(member_tree(member, row, shape)?),
            type_name: type_name.clone(),
            only: *only,
        },
        BoolExpr::Flag(field) => match shape {
            RowShape::Extent | RowShape::Child => row.clone().property(field.as_str()),
            RowShape::Join { .. } => {
                return Err(PlanError::UnqualifiedMember {
                    member: field.clone(),
                })
            }
        },
        BoolExpr::Not(inner) => DbExpression::Not {
            argument: Box::new(bool_tree(inner, row, shape)?),
        },
        BoolExpr::And(operands) => DbExpression::And {
            operands: bool_trees(operands, row, shape)?,
        },
        BoolExpr::Or(operands) => DbExpression::Or {
            operands: bool_trees(operands, row, shape)?,
        },
    })
}

fn bool_trees(
    operands: &[BoolExpr],
    row: &DbExpression,
    shape: RowShape<'_>,
) -> PlanResult<Vec<DbExpression>> {
    operands
        .iter()
        .map(|operand| bool_tree(operand, row, shape))
        .collect()
}

fn member_tree(path: &MemberPath, row: &DbExpression, shape: RowShape<'_>) -> PlanResult<DbExpression> {
    match shape {
        RowShape::Extent => Ok(path
            .members()
            .iter()
            .fold(row.clone(), |instance, member| instance.property(member.as_str()))),
        RowShape::Child => Ok(row.clone().property(path.cql_field_alias())),
        RowShape::Join { .. } => Err(PlanError::UnqualifiedMember {
            member: path.to_string(),
        }),
    }
}

fn qualified_tree(
    child: usize,
    field: &str,
    row: &DbExpression,
    shape: RowShape<'_>,
) -> PlanResult<DbExpression> {
    match shape {
        RowShape::Join { block, children } => {
            let child_block = children
                .get(child)
                .ok_or_else(|| PlanError::ChildIndexOutOfRange {
                    block: block.to_string(),
                    index: child,
                    children: children.len(),
                })?;
            Ok(row.clone().property(child_block.alias()).property(field))
        }
        RowShape::Extent | RowShape::Child => Err(PlanError::QualifiedOutsideJoin {
            field: field.to_string(),
        }),
    }
}

/// Join conditions compare columns of the input variables directly.
fn join_condition_tree(
    clause: &JoinClause,
    block: &str,
    children: &[CqlBlock],
) -> PlanResult<DbExpression> {
    let column = |child: usize, field: &str| -> PlanResult<DbExpression> {
        let child_block = children
            .get(child)
            .ok_or_else(|| PlanError::ChildIndexOutOfRange {
                block: block.to_string(),
                index: child,
                children: children.len(),
            })?;
        Ok(DbExpression::variable(child_block.alias()).property(field))
    };

    let mut equalities = clause
        .on
        .iter()
        .map(|condition| {
            Ok(DbExpression::Comparison {
                op: CompareOp::Eq,
                left: Box::new(column(condition.left.child, &condition.left.field)?),
                right: Box::new(column(condition.right.child, &condition.right.field)?),
            })
        })
        .collect::<PlanResult<Vec<_>>>()?;

    Ok(match equalities.len() {
        0 => DbExpression::constant(true),
        1 => equalities.remove(0),
        _ => DbExpression::And {
            operands: equalities,
        },
    })
}
