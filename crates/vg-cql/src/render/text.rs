//! eSQL text renderer

use super::RowShape;
use crate::error::{PlanError, PlanResult};
use crate::ir::block::{BlockKind, CqlBlock, JoinClause};
use crate::ir::bool_expr::BoolExpr;
use crate::ir::case_statement::{CaseStatement, CaseValue};
use crate::ir::slot::SlotValue;
use vg_core::text_utils::{bracket_type_name, indent_new_line};
use vg_core::MemberPath;

/// Append `block` and its subtree to `builder`.
pub(crate) fn render_block(
    block: &CqlBlock,
    builder: &mut String,
    is_top_level: bool,
    indent_level: usize,
) -> PlanResult<()> {
    match block.kind() {
        BlockKind::Extent { extent, row_alias } => {
            select_keyword(builder, is_top_level, indent_level);
            generate_projection_text(builder, block, row_alias, RowShape::Extent, indent_level, is_top_level)?;
            builder.push_str("FROM ");
            builder.push_str(extent);
            builder.push_str(" AS ");
            builder.push_str(row_alias);
            where_text(builder, block, row_alias, RowShape::Extent, indent_level)
        }
        BlockKind::Case { child, case_slot } => {
            let member = block
                .slots()
                .get(*case_slot)
                .and_then(|slot| slot.output_member())
                .ok_or_else(|| PlanError::CaseSlotWithoutMember {
                    block: block.alias().to_string(),
                    slot: *case_slot,
                })?;

            select_keyword(builder, is_top_level, indent_level);
            builder.push_str(" -- Constructing ");
            builder.push_str(member.leaf_name());

            let child_alias = child.alias();
            generate_projection_text(builder, block, child_alias, RowShape::Child, indent_level, is_top_level)?;

            // FROM (child) AS alias
            builder.push_str("FROM (");
            render_block(child, builder, false, indent_level + 1)?;
            indent_new_line(builder, indent_level);
            builder.push_str(") AS ");
            builder.push_str(child_alias);

            where_text(builder, block, child_alias, RowShape::Child, indent_level)
        }
        BlockKind::Join { children, clauses } => {
            let shape = RowShape::Join {
                block: block.alias(),
                children,
            };
            select_keyword(builder, is_top_level, indent_level);
            generate_projection_text(builder, block, block.alias(), shape, indent_level, is_top_level)?;

            for (i, child) in children.iter().enumerate() {
                let clause = match i {
                    0 => {
                        builder.push_str("FROM (");
                        None
                    }
                    _ => {
                        let clause = &clauses[i - 1];
                        indent_new_line(builder, indent_level);
                        builder.push_str(&clause.kind.to_string());
                        builder.push_str(" (");
                        Some(clause)
                    }
                };
                render_block(child, builder, false, indent_level + 1)?;
                indent_new_line(builder, indent_level);
                builder.push_str(") AS ");
                builder.push_str(child.alias());
                if let Some(clause) = clause {
                    builder.push_str(" ON ");
                    join_condition_text(builder, clause, block.alias(), children)?;
                }
            }
            Ok(())
        }
        BlockKind::Union { children } => {
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    indent_new_line(builder, indent_level);
                    builder.push_str("UNION ALL");
                }
                indent_new_line(builder, indent_level);
                builder.push('(');
                render_block(child, builder, is_top_level, indent_level + 1)?;
                indent_new_line(builder, indent_level);
                builder.push(')');
            }
            Ok(())
        }
    }
}

fn select_keyword(builder: &mut String, is_top_level: bool, indent_level: usize) {
    indent_new_line(builder, indent_level);
    builder.push_str("SELECT");
    if is_top_level {
        builder.push_str(" VALUE");
    }
}

/// Emit the column list of `block`, one slot per line, reading from `row_alias`.
///
/// Nested blocks name every column with `AS <field alias>`; a top-level
/// block emits its single value bare. Leaves the builder on a fresh line at
/// `indent_level`.
pub(crate) fn generate_projection_text(
    builder: &mut String,
    block: &CqlBlock,
    row_alias: &str,
    shape: RowShape<'_>,
    indent_level: usize,
    is_top_level: bool,
) -> PlanResult<()> {
    for (i, slot) in block.projected_slots(is_top_level)?.into_iter().enumerate() {
        if i > 0 {
            builder.push(',');
        }
        indent_new_line(builder, indent_level + 1);
        slot_value_text(builder, slot.value(), row_alias, shape, indent_level + 1)?;
        if !is_top_level {
            builder.push_str(" AS ");
            builder.push_str(slot.field_alias());
        }
    }
    indent_new_line(builder, indent_level);
    Ok(())
}

fn slot_value_text(
    builder: &mut String,
    value: &SlotValue,
    row_alias: &str,
    shape: RowShape<'_>,
    indent_level: usize,
) -> PlanResult<()> {
    match value {
        SlotValue::Member(path) => builder.push_str(&member_text(path, row_alias, shape)?),
        SlotValue::Qualified { child, field } => {
            builder.push_str(&qualified_text(*child, field, shape)?)
        }
        SlotValue::Constant(literal) => builder.push_str(&literal.to_esql()),
        SlotValue::Boolean(expr) => bool_text(builder, &expr.simplify(), row_alias, shape)?,
        SlotValue::Case(statement) => {
            case_statement_text(builder, statement, row_alias, shape, indent_level)?
        }
    }
    Ok(())
}

fn case_statement_text(
    builder: &mut String,
    statement: &CaseStatement,
    row_alias: &str,
    shape: RowShape<'_>,
    indent_level: usize,
) -> PlanResult<()> {
    let statement = statement.simplified();
    if let Some(value) = statement.unconditional_value() {
        return case_value_text(builder, &value, row_alias, shape);
    }

    builder.push_str("CASE");
    for clause in statement.clauses() {
        indent_new_line(builder, indent_level + 1);
        builder.push_str("WHEN ");
        bool_text(builder, &clause.condition, row_alias, shape)?;
        builder.push_str(" THEN ");
        case_value_text(builder, &clause.value, row_alias, shape)?;
    }
    if let Some(value) = statement.else_value() {
        indent_new_line(builder, indent_level + 1);
        builder.push_str("ELSE ");
        case_value_text(builder, value, row_alias, shape)?;
    }
    indent_new_line(builder, indent_level);
    builder.push_str("END");
    Ok(())
}

fn case_value_text(
    builder: &mut String,
    value: &CaseValue,
    row_alias: &str,
    shape: RowShape<'_>,
) -> PlanResult<()> {
    match value {
        CaseValue::Constant(literal) => builder.push_str(&literal.to_esql()),
        CaseValue::Column(path) => builder.push_str(&member_text(path, row_alias, shape)?),
        CaseValue::Construct { type_name, args } => {
            builder.push_str(&bracket_type_name(type_name));
            builder.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    builder.push_str(", ");
                }
                builder.push_str(&member_text(arg, row_alias, shape)?);
            }
            builder.push(')');
        }
    }
    Ok(())
}

fn where_text(
    builder: &mut String,
    block: &CqlBlock,
    row_alias: &str,
    shape: RowShape<'_>,
    indent_level: usize,
) -> PlanResult<()> {
    // Only emit WHERE when the filter is not simply True
    if !block.has_filter() {
        log::debug!("Block {} filter is True, omitting WHERE", block.alias());
        return Ok(());
    }
    indent_new_line(builder, indent_level);
    builder.push_str("WHERE ");
    bool_text(builder, &block.where_clause().simplify(), row_alias, shape)
}

/// Append `expr` evaluated over the row bound to `row_alias`.
pub(crate) fn bool_text(
    builder: &mut String,
    expr: &BoolExpr,
    row_alias: &str,
    shape: RowShape<'_>,
) -> PlanResult<()> {
    match expr {
        BoolExpr::True => builder.push_str("True"),
        BoolExpr::False => builder.push_str("False"),
        BoolExpr::Comparison { member, op, value } => {
            builder.push_str(&member_text(member, row_alias, shape)?);
            builder.push_str(&format!(" {op} "));
            builder.push_str(&value.to_esql());
        }
        BoolExpr::IsNull { member, negated } => {
            builder.push_str(&member_text(member, row_alias, shape)?);
            builder.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
        }
        BoolExpr::IsOf {
            member,
            type_name,
            only,
        } => {
            builder.push_str(&member_text(member, row_alias, shape)?);
            builder.push_str(" IS OF (");
            if *only {
                builder.push_str("ONLY ");
            }
            builder.push_str(&bracket_type_name(type_name));
            builder.push(')');
        }
        BoolExpr::Flag(field) => builder.push_str(&flag_text(field, row_alias, shape)?),
        BoolExpr::Not(inner) => {
            builder.push_str("NOT(");
            bool_text(builder, inner, row_alias, shape)?;
            builder.push(')');
        }
        BoolExpr::And(operands) => connective_text(builder, operands, " AND ", row_alias, shape)?,
        BoolExpr::Or(operands) => connective_text(builder, operands, " OR ", row_alias, shape)?,
    }
    Ok(())
}

fn connective_text(
    builder: &mut String,
    operands: &[BoolExpr],
    separator: &str,
    row_alias: &str,
    shape: RowShape<'_>,
) -> PlanResult<()> {
    builder.push('(');
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            builder.push_str(separator);
        }
        bool_text(builder, operand, row_alias, shape)?;
    }
    builder.push(')');
    Ok(())
}

fn member_text(path: &MemberPath, row_alias: &str, shape: RowShape<'_>) -> PlanResult<String> {
    match shape {
        RowShape::Extent => Ok(path.path_text(row_alias)),
        RowShape::Child => Ok(format!("{row_alias}.{}", path.cql_field_alias())),
        RowShape::Join { .. } => Err(PlanError::UnqualifiedMember {
            member: path.to_string(),
        }),
    }
}

fn flag_text(field: &str, row_alias: &str, shape: RowShape<'_>) -> PlanResult<String> {
    match shape {
        RowShape::Extent | RowShape::Child => Ok(format!("{row_alias}.{field}")),
        RowShape::Join { .. } => Err(PlanError::UnqualifiedMember {
            member: field.to_string(),
        }),
    }
}

fn qualified_text(child: usize, field: &str, shape: RowShape<'_>) -> PlanResult<String> {
    match shape {
        RowShape::Join { block, children } => {
            let child_block = children
                .get(child)
                .ok_or_else(|| PlanError::ChildIndexOutOfRange {
                    block: block.to_string(),
                    index: child,
                    children: children.len(),
                })?;
            Ok(format!("{}.{field}", child_block.alias()))
        }
        RowShape::Extent | RowShape::Child => Err(PlanError::QualifiedOutsideJoin {
            field: field.to_string(),
        }),
    }
}

fn join_condition_text(
    builder: &mut String,
    clause: &JoinClause,
    block: &str,
    children: &[CqlBlock],
) -> PlanResult<()> {
    if clause.on.is_empty() {
        builder.push_str("True");
        return Ok(());
    }
    let shape = RowShape::Join { block, children };
    for (i, condition) in clause.on.iter().enumerate() {
        if i > 0 {
            builder.push_str(" AND ");
        }
        builder.push_str(&qualified_text(condition.left.child, &condition.left.field, shape)?);
        builder.push_str(" = ");
        builder.push_str(&qualified_text(condition.right.child, &condition.right.field, shape)?);
    }
    Ok(())
}
