//! Scalar literal values that appear in predicates and projections

use crate::text_utils::escape_string_literal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// NULL
    Null,
    /// Boolean literal
    Boolean(bool),
    /// Integer literal
    Integer(i64),
    /// String literal
    String(String),
}

impl Literal {
    /// eSQL text for this literal.
    pub fn to_esql(&self) -> String {
        match self {
            Literal::Null => "NULL".to_string(),
            Literal::Boolean(true) => "True".to_string(),
            Literal::Boolean(false) => "False".to_string(),
            Literal::Integer(i) => i.to_string(),
            Literal::String(s) => format!("'{}'", escape_string_literal(s)),
        }
    }

    /// Whether this is the NULL literal
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_esql())
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Integer(i64::from(value))
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_esql() {
        assert_eq!(Literal::Null.to_esql(), "NULL");
        assert_eq!(Literal::Boolean(true).to_esql(), "True");
        assert_eq!(Literal::Integer(-18).to_esql(), "-18");
        assert_eq!(Literal::from("O'Brien").to_esql(), "'O''Brien'");
    }

    #[test]
    fn test_deserialize_untagged() {
        let lits: Vec<Literal> = serde_yaml::from_str("[~, true, 18, Manager]").unwrap();
        assert_eq!(
            lits,
            vec![
                Literal::Null,
                Literal::Boolean(true),
                Literal::Integer(18),
                Literal::String("Manager".to_string()),
            ]
        );
    }
}
