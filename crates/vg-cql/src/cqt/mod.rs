//! Command trees — the structural render target

pub mod command;
pub mod expr;
mod printer;
