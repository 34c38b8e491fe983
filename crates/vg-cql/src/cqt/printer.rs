//! Compact one-line dump of a command tree
//!
//! `Select(Where(Scan(People) AS T, (T.Age > 18)) AS T, Row(T.Name AS Name))`

use super::expr::{DbExpression, DbExpressionBinding};
use std::fmt;
use vg_core::text_utils::bracket_type_name;

impl fmt::Display for DbExpressionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS {}", self.expression, self.variable_name)
    }
}

impl fmt::Display for DbExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbExpression::Scan { extent } => write!(f, "Scan({extent})"),
            DbExpression::VariableReference { name } => f.write_str(name),
            DbExpression::Property { instance, property } => write!(f, "{instance}.{property}"),
            DbExpression::Constant { value } => write!(f, "{value}"),
            DbExpression::Comparison { op, left, right } => write!(f, "({left} {op} {right})"),
            DbExpression::And { operands } => write_call(f, "And", operands),
            DbExpression::Or { operands } => write_call(f, "Or", operands),
            DbExpression::Not { argument } => write!(f, "Not({argument})"),
            DbExpression::IsNull { argument } => write!(f, "IsNull({argument})"),
            DbExpression::IsOf {
                argument,
                type_name,
                only,
            } => {
                let only = if *only { "ONLY " } else { "" };
                write!(f, "IsOf({argument}, {only}{})", bracket_type_name(type_name))
            }
            DbExpression::Case {
                whens,
                thens,
                else_expression,
            } => {
                f.write_str("Case(")?;
                for (when, then) in whens.iter().zip(thens) {
                    write!(f, "When({when}, {then}), ")?;
                }
                write!(f, "Else({else_expression}))")
            }
            DbExpression::NewInstance {
                type_name,
                arguments,
            } => write_call(f, &format!("New {}", bracket_type_name(type_name)), arguments),
            DbExpression::NewRow { columns } => {
                f.write_str("Row(")?;
                for (i, (name, value)) in columns.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value} AS {name}")?;
                }
                f.write_str(")")
            }
            DbExpression::Filter { input, predicate } => write!(f, "Where({input}, {predicate})"),
            DbExpression::Project { input, projection } => {
                write!(f, "Select({input}, {projection})")
            }
            DbExpression::Join { inputs, clauses } => {
                f.write_str("Join(")?;
                for (i, input) in inputs.iter().enumerate() {
                    if i == 0 {
                        write!(f, "{input}")?;
                    } else {
                        match clauses.get(i - 1) {
                            Some(clause) => {
                                write!(f, ", {} {input} ON {}", clause.kind, clause.condition)?
                            }
                            None => write!(f, ", INNER JOIN {input} ON True")?,
                        }
                    }
                }
                f.write_str(")")
            }
            DbExpression::UnionAll { left, right } => write!(f, "UnionAll({left}, {right})"),
        }
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, args: &[DbExpression]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(")")
}
