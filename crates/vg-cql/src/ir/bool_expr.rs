//! Boolean expressions used for filters, discriminator slots and case conditions

use serde::de::{self, IntoDeserializer, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use vg_core::{Literal, MemberPath};

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Equality (=)
    Eq,
    /// Inequality (<>)
    NotEq,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    LtEq,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    GtEq,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::NotEq => write!(f, "<>"),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::LtEq => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::GtEq => write!(f, ">="),
        }
    }
}

/// Immutable predicate over the rows of a block's input.
///
/// Members are resolved against whatever row the predicate is rendered over:
/// dotted property paths for extent rows, projected field aliases for rows
/// produced by a child block.
///
/// In documents an expression is a single-key map such as
/// `{is_null: {member: People.Name}}`; `True` and `False` may be written as
/// plain booleans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "snake_case")]
pub enum BoolExpr {
    /// Always true; a filter equal to this renders no WHERE clause
    True,
    /// Always false
    False,
    /// `member op value`
    Comparison {
        member: MemberPath,
        op: CompareOp,
        value: Literal,
    },
    /// `member IS [NOT] NULL`
    IsNull {
        member: MemberPath,
        #[serde(default)]
        negated: bool,
    },
    /// Type test: `member IS OF ([ONLY] type)`
    IsOf {
        member: MemberPath,
        type_name: String,
        #[serde(default)]
        only: bool,
    },
    /// Boolean column produced by the input, e.g. a `_from0` slot
    Flag(String),
    /// Logical NOT
    Not(Box<BoolExpr>),
    /// Logical AND of all operands
    And(Vec<BoolExpr>),
    /// Logical OR of all operands
    Or(Vec<BoolExpr>),
}

impl BoolExpr {
    /// `member op value`
    pub fn compare(member: MemberPath, op: CompareOp, value: impl Into<Literal>) -> Self {
        BoolExpr::Comparison {
            member,
            op,
            value: value.into(),
        }
    }

    /// Logical negation (not simplified)
    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: BoolExpr) -> Self {
        BoolExpr::Not(Box::new(expr))
    }

    /// Simplify the expression.
    ///
    /// Folds constants, flattens nested AND/OR, removes duplicate operands,
    /// collapses complementary pairs (`x AND NOT x`), removes double
    /// negation and pushes NOT into IS NULL tests. The result never contains
    /// a `True`/`False` operand below the root.
    pub fn simplify(&self) -> BoolExpr {
        match self {
            BoolExpr::True
            | BoolExpr::False
            | BoolExpr::Comparison { .. }
            | BoolExpr::IsNull { .. }
            | BoolExpr::IsOf { .. }
            | BoolExpr::Flag(_) => self.clone(),
            BoolExpr::Not(inner) => inner.simplify().complement(),
            BoolExpr::And(operands) => simplify_connective(operands, Connective::And),
            BoolExpr::Or(operands) => simplify_connective(operands, Connective::Or),
        }
    }

    /// Simplified form with AND/OR operands in a canonical order.
    pub fn canonical(&self) -> BoolExpr {
        canonical_order(self.simplify())
    }

    /// Structural equality comparer: equal after simplification, ignoring
    /// the order of AND/OR operands.
    pub fn equivalent(&self, other: &BoolExpr) -> bool {
        self.canonical() == other.canonical()
    }

    /// Whether the expression is always true
    pub fn is_true(&self) -> bool {
        self.equivalent(&BoolExpr::True)
    }

    /// Whether the expression is always false
    pub fn is_false(&self) -> bool {
        self.equivalent(&BoolExpr::False)
    }

    /// Every member path mentioned by the expression
    pub fn members(&self) -> Vec<&MemberPath> {
        let mut out = Vec::new();
        self.collect_members(&mut out);
        out
    }

    /// Copy of the expression with every member path replaced by `f(path)`
    pub fn map_members(&self, f: &impl Fn(&MemberPath) -> MemberPath) -> BoolExpr {
        match self {
            BoolExpr::Comparison { member, op, value } => BoolExpr::Comparison {
                member: f(member),
                op: *op,
                value: value.clone(),
            },
            BoolExpr::IsNull { member, negated } => BoolExpr::IsNull {
                member: f(member),
                negated: *negated,
            },
            BoolExpr::IsOf {
                member,
                type_name,
                only,
            } => BoolExpr::IsOf {
                member: f(member),
                type_name: type_name.clone(),
                only: *only,
            },
            BoolExpr::Not(inner) => BoolExpr::not(inner.map_members(f)),
            BoolExpr::And(operands) => {
                BoolExpr::And(operands.iter().map(|op| op.map_members(f)).collect())
            }
            BoolExpr::Or(operands) => {
                BoolExpr::Or(operands.iter().map(|op| op.map_members(f)).collect())
            }
            BoolExpr::True | BoolExpr::False | BoolExpr::Flag(_) => self.clone(),
        }
    }

    fn collect_members<'a>(&'a self, out: &mut Vec<&'a MemberPath>) {
        match self {
            BoolExpr::Comparison { member, .. }
            | BoolExpr::IsNull { member, .. }
            | BoolExpr::IsOf { member, .. } => out.push(member),
            BoolExpr::Not(inner) => inner.collect_members(out),
            BoolExpr::And(operands) | BoolExpr::Or(operands) => {
                for op in operands {
                    op.collect_members(out);
                }
            }
            BoolExpr::True | BoolExpr::False | BoolExpr::Flag(_) => {}
        }
    }

    /// Negation of an already simplified expression, simplified.
    fn complement(self) -> BoolExpr {
        match self {
            BoolExpr::True => BoolExpr::False,
            BoolExpr::False => BoolExpr::True,
            BoolExpr::Not(inner) => *inner,
            BoolExpr::IsNull { member, negated } => BoolExpr::IsNull {
                member,
                negated: !negated,
            },
            other => BoolExpr::Not(Box::new(other)),
        }
    }
}

impl Serialize for BoolExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BoolExpr::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for BoolExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BoolExprVisitor)
    }
}

struct BoolExprVisitor;

impl<'de> Visitor<'de> for BoolExprVisitor {
    type Value = BoolExpr;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean or a boolean expression")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<BoolExpr, E> {
        Ok(if value { BoolExpr::True } else { BoolExpr::False })
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<BoolExpr, E> {
        BoolExpr::deserialize(value.into_deserializer())
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<BoolExpr, A::Error> {
        BoolExpr::deserialize(de::value::MapAccessDeserializer::new(map))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

impl Connective {
    /// Operand that can be dropped (`x AND True == x`)
    fn identity(self) -> BoolExpr {
        match self {
            Connective::And => BoolExpr::True,
            Connective::Or => BoolExpr::False,
        }
    }

    /// Operand that decides the result (`x AND False == False`)
    fn absorbing(self) -> BoolExpr {
        match self {
            Connective::And => BoolExpr::False,
            Connective::Or => BoolExpr::True,
        }
    }

    fn build(self, operands: Vec<BoolExpr>) -> BoolExpr {
        match self {
            Connective::And => BoolExpr::And(operands),
            Connective::Or => BoolExpr::Or(operands),
        }
    }
}

fn simplify_connective(operands: &[BoolExpr], connective: Connective) -> BoolExpr {
    let identity = connective.identity();
    let absorbing = connective.absorbing();
    let mut flat: Vec<BoolExpr> = Vec::with_capacity(operands.len());

    for operand in operands {
        let simplified = operand.simplify();
        if simplified == absorbing {
            return absorbing;
        }
        if simplified == identity {
            continue;
        }
        let nested = match (connective, simplified) {
            (Connective::And, BoolExpr::And(inner)) => inner,
            (Connective::Or, BoolExpr::Or(inner)) => inner,
            (_, other) => vec![other],
        };
        for expr in nested {
            if !flat.contains(&expr) {
                flat.push(expr);
            }
        }
    }

    if flat
        .iter()
        .any(|expr| flat.contains(&expr.clone().complement()))
    {
        return absorbing;
    }

    match flat.len() {
        0 => identity,
        1 => flat.remove(0),
        _ => connective.build(flat),
    }
}

fn canonical_order(expr: BoolExpr) -> BoolExpr {
    match expr {
        BoolExpr::Not(inner) => BoolExpr::Not(Box::new(canonical_order(*inner))),
        BoolExpr::And(operands) => {
            let mut sorted: Vec<BoolExpr> = operands.into_iter().map(canonical_order).collect();
            sorted.sort();
            BoolExpr::And(sorted)
        }
        BoolExpr::Or(operands) => {
            let mut sorted: Vec<BoolExpr> = operands.into_iter().map(canonical_order).collect();
            sorted.sort();
            BoolExpr::Or(sorted)
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "bool_expr_test.rs"]
mod tests;
