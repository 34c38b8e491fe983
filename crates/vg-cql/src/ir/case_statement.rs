//! Case statements — conditional construction of a member's value

use super::bool_expr::BoolExpr;
use serde::{Deserialize, Serialize};
use vg_core::{Literal, MemberPath};

/// Value produced by one branch of a case statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseValue {
    /// A scalar constant, e.g. a discriminator value or NULL
    Constant(Literal),
    /// A column of the input row
    Column(MemberPath),
    /// Construction of an entity or complex type from input columns
    Construct {
        /// Qualified type name, e.g. `Model.Person`
        type_name: String,
        /// Constructor arguments in member order
        args: Vec<MemberPath>,
    },
}

impl CaseValue {
    /// Member paths this value reads from the input row
    pub fn members(&self) -> Vec<&MemberPath> {
        match self {
            CaseValue::Constant(_) => Vec::new(),
            CaseValue::Column(path) => vec![path],
            CaseValue::Construct { args, .. } => args.iter().collect(),
        }
    }

    /// Copy of the value with every member path replaced by `f(path)`
    pub fn map_members(&self, f: &impl Fn(&MemberPath) -> MemberPath) -> CaseValue {
        match self {
            CaseValue::Constant(_) => self.clone(),
            CaseValue::Column(path) => CaseValue::Column(f(path)),
            CaseValue::Construct { type_name, args } => CaseValue::Construct {
                type_name: type_name.clone(),
                args: args.iter().map(f).collect(),
            },
        }
    }
}

/// `WHEN condition THEN value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhenThen {
    /// Branch condition
    #[serde(rename = "when")]
    pub condition: BoolExpr,
    /// Branch value
    #[serde(rename = "then")]
    pub value: CaseValue,
}

/// Conditional construction of `member`: the first branch whose condition
/// holds supplies the value, otherwise the else value (NULL when absent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStatement {
    member: MemberPath,
    #[serde(default)]
    clauses: Vec<WhenThen>,
    #[serde(default, rename = "else")]
    else_value: Option<CaseValue>,
}

impl CaseStatement {
    /// Create a case statement constructing `member`.
    pub fn new(member: MemberPath, clauses: Vec<WhenThen>, else_value: Option<CaseValue>) -> Self {
        Self {
            member,
            clauses,
            else_value,
        }
    }

    /// Member whose value this statement constructs
    pub fn member(&self) -> &MemberPath {
        &self.member
    }

    /// Branches in evaluation order
    pub fn clauses(&self) -> &[WhenThen] {
        &self.clauses
    }

    /// Value used when no branch matches
    pub fn else_value(&self) -> Option<&CaseValue> {
        self.else_value.as_ref()
    }

    /// Simplify branch conditions and drop unreachable branches.
    ///
    /// Branches whose condition is always false are removed. The first branch
    /// whose condition is always true ends the statement and becomes its else
    /// value. Both renderers emit the simplified statement.
    pub fn simplified(&self) -> CaseStatement {
        let mut clauses = Vec::with_capacity(self.clauses.len());
        let mut else_value = self.else_value.clone();

        for clause in &self.clauses {
            let condition = clause.condition.simplify();
            if condition == BoolExpr::False {
                continue;
            }
            if condition == BoolExpr::True {
                else_value = Some(clause.value.clone());
                break;
            }
            clauses.push(WhenThen {
                condition,
                value: clause.value.clone(),
            });
        }

        if clauses.is_empty() && else_value.is_none() && !self.clauses.is_empty() {
            log::warn!(
                "Every branch constructing '{}' is unreachable; it will be NULL",
                self.member
            );
        }

        CaseStatement {
            member: self.member.clone(),
            clauses,
            else_value,
        }
    }

    /// The value of a statement without branches: its else value, or NULL.
    ///
    /// Returns `None` when branches remain and a CASE expression is needed.
    pub fn unconditional_value(&self) -> Option<CaseValue> {
        if self.clauses.is_empty() {
            Some(
                self.else_value
                    .clone()
                    .unwrap_or(CaseValue::Constant(Literal::Null)),
            )
        } else {
            None
        }
    }

    /// Copy of the statement with every member path, including the
    /// constructed member, replaced by `f(path)`
    pub fn map_members(&self, f: &impl Fn(&MemberPath) -> MemberPath) -> CaseStatement {
        CaseStatement {
            member: f(&self.member),
            clauses: self
                .clauses
                .iter()
                .map(|clause| WhenThen {
                    condition: clause.condition.map_members(f),
                    value: clause.value.map_members(f),
                })
                .collect(),
            else_value: self.else_value.as_ref().map(|value| value.map_members(f)),
        }
    }

    /// Every member path read by conditions and values
    pub fn referenced_members(&self) -> Vec<&MemberPath> {
        let mut out = Vec::new();
        for clause in &self.clauses {
            out.extend(clause.condition.members());
            out.extend(clause.value.members());
        }
        if let Some(value) = &self.else_value {
            out.extend(value.members());
        }
        out
    }
}

#[cfg(test)]
#[path = "case_statement_test.rs"]
mod tests;
