//! Command-tree expressions
//!
//! A small expression model: row sources (scan, filter, project, join,
//! union) and the scalar expressions evaluated over their rows. Relational
//! operators bind their input to a named variable; the builder methods take a
//! callback that receives a reference to that variable.

use crate::ir::block::JoinKind;
use crate::ir::bool_expr::CompareOp;
use serde::Serialize;
use vg_core::Literal;

/// An input of a relational operator bound to a row variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbExpressionBinding {
    /// The row source
    pub expression: Box<DbExpression>,
    /// Name of the variable bound to each row
    pub variable_name: String,
}

impl DbExpressionBinding {
    /// Reference to the bound row variable
    pub fn variable(&self) -> DbExpression {
        DbExpression::variable(&self.variable_name)
    }
}

/// How input `i + 1` of a join is combined with the inputs before it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbJoinClause {
    /// Join type
    pub kind: JoinKind,
    /// Join condition over the input variables
    pub condition: DbExpression,
}

/// Command-tree expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DbExpression {
    /// All rows of an extent
    Scan { extent: String },
    /// Reference to a bound row variable
    VariableReference { name: String },
    /// Property of a row or structured value
    Property {
        instance: Box<DbExpression>,
        property: String,
    },
    /// Scalar constant
    Constant { value: Literal },
    /// Binary comparison
    Comparison {
        op: CompareOp,
        left: Box<DbExpression>,
        right: Box<DbExpression>,
    },
    /// Conjunction
    And { operands: Vec<DbExpression> },
    /// Disjunction
    Or { operands: Vec<DbExpression> },
    /// Negation
    Not { argument: Box<DbExpression> },
    /// NULL test
    IsNull { argument: Box<DbExpression> },
    /// Type test
    IsOf {
        argument: Box<DbExpression>,
        type_name: String,
        only: bool,
    },
    /// Conditional value; `whens[i]` selects `thens[i]`
    Case {
        whens: Vec<DbExpression>,
        thens: Vec<DbExpression>,
        else_expression: Box<DbExpression>,
    },
    /// Construction of an entity or complex type
    NewInstance {
        type_name: String,
        arguments: Vec<DbExpression>,
    },
    /// Construction of a row of named columns
    NewRow { columns: Vec<(String, DbExpression)> },
    /// Rows of the input satisfying the predicate
    Filter {
        input: DbExpressionBinding,
        predicate: Box<DbExpression>,
    },
    /// The projection evaluated for each input row
    Project {
        input: DbExpressionBinding,
        projection: Box<DbExpression>,
    },
    /// Left-deep join; the joined row has one property per input variable
    Join {
        inputs: Vec<DbExpressionBinding>,
        clauses: Vec<DbJoinClause>,
    },
    /// Bag union of two inputs
    UnionAll {
        left: Box<DbExpression>,
        right: Box<DbExpression>,
    },
}

impl DbExpression {
    /// Scan of `extent`
    pub fn scan(extent: impl Into<String>) -> Self {
        DbExpression::Scan {
            extent: extent.into(),
        }
    }

    /// Reference to row variable `name`
    pub fn variable(name: impl Into<String>) -> Self {
        DbExpression::VariableReference { name: name.into() }
    }

    /// Constant expression
    pub fn constant(value: impl Into<Literal>) -> Self {
        DbExpression::Constant {
            value: value.into(),
        }
    }

    /// The NULL constant
    pub fn null() -> Self {
        DbExpression::Constant {
            value: Literal::Null,
        }
    }

    /// Property `name` of this expression
    pub fn property(self, name: impl Into<String>) -> Self {
        DbExpression::Property {
            instance: Box::new(self),
            property: name.into(),
        }
    }

    /// Bind this expression to row variable `variable_name`
    pub fn bind_as(self, variable_name: impl Into<String>) -> DbExpressionBinding {
        DbExpressionBinding {
            expression: Box::new(self),
            variable_name: variable_name.into(),
        }
    }

    /// Keep the rows for which `predicate(row)` holds.
    pub fn filter<F>(self, variable_name: &str, predicate: F) -> Self
    where
        F: FnOnce(&DbExpression) -> DbExpression,
    {
        let input = self.bind_as(variable_name);
        let predicate = predicate(&input.variable());
        DbExpression::Filter {
            input,
            predicate: Box::new(predicate),
        }
    }

    /// Fallible form of [`filter`](Self::filter).
    pub fn try_filter<F, E>(self, variable_name: &str, predicate: F) -> Result<Self, E>
    where
        F: FnOnce(&DbExpression) -> Result<DbExpression, E>,
    {
        let input = self.bind_as(variable_name);
        let predicate = predicate(&input.variable())?;
        Ok(DbExpression::Filter {
            input,
            predicate: Box::new(predicate),
        })
    }

    /// Evaluate `projection(row)` for every row.
    pub fn select<F>(self, variable_name: &str, projection: F) -> Self
    where
        F: FnOnce(&DbExpression) -> DbExpression,
    {
        let input = self.bind_as(variable_name);
        let projection = projection(&input.variable());
        DbExpression::Project {
            input,
            projection: Box::new(projection),
        }
    }

    /// Fallible form of [`select`](Self::select).
    pub fn try_select<F, E>(self, variable_name: &str, projection: F) -> Result<Self, E>
    where
        F: FnOnce(&DbExpression) -> Result<DbExpression, E>,
    {
        let input = self.bind_as(variable_name);
        let projection = projection(&input.variable())?;
        Ok(DbExpression::Project {
            input,
            projection: Box::new(projection),
        })
    }

    /// `self UNION ALL other`
    pub fn union_all(self, other: DbExpression) -> Self {
        DbExpression::UnionAll {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Column names of a `NewRow`, in order; empty for any other expression
    pub fn row_columns(&self) -> Vec<&str> {
        match self {
            DbExpression::NewRow { columns } => columns.iter().map(|(n, _)| n.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether this is a relational operator (produces a collection of rows)
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            DbExpression::Scan { .. }
                | DbExpression::Filter { .. }
                | DbExpression::Project { .. }
                | DbExpression::Join { .. }
                | DbExpression::UnionAll { .. }
        )
    }
}
