//! CQL block IR — the tree a view generator assembles and the renderers walk

pub mod block;
pub mod bool_expr;
pub mod case_statement;
pub mod slot;
