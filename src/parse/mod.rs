//! Hand-rolled SQL lexer and recursive-descent parser (spec.md §4.11).
//! `planner` turns the AST produced here into a `plan`/`query` tree.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{
    CreateIndexData, CreateTableData, CreateViewData, DeleteData, FieldDef, InsertData, ModifyData, QueryData,
    SelectItem, Statement,
};
pub use parser::Parser;
