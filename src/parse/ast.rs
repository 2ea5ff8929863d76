//! AST produced by the parser (spec.md §4.11), consumed by `planner`.

use std::fmt;

use crate::query::{AggregateSpec, Predicate, SortField};
use crate::record::{FieldType, Value};

/// One entry of a `SELECT` list: a bare field or an aggregate function call.
#[derive(Debug, Clone)]
pub enum SelectItem {
    Field(String),
    Aggregate(AggregateSpec),
}

#[derive(Debug, Clone, Default)]
pub struct QueryData {
    pub select_list: Vec<SelectItem>,
    pub tables: Vec<String>,
    pub pred: Predicate,
    pub group_by: Vec<String>,
    pub having: Option<Predicate>,
    pub order_by: Vec<SortField>,
}

impl QueryData {
    /// The plain (non-aggregate) fields named in the select list, in order.
    pub fn fields(&self) -> Vec<String> {
        self.select_list
            .iter()
            .filter_map(|item| match item {
                SelectItem::Field(f) => Some(f.clone()),
                SelectItem::Aggregate(_) => None,
            })
            .collect()
    }

    pub fn aggregates(&self) -> Vec<AggregateSpec> {
        self.select_list
            .iter()
            .filter_map(|item| match item {
                SelectItem::Aggregate(a) => Some(a.clone()),
                SelectItem::Field(_) => None,
            })
            .collect()
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty() || !self.aggregates().is_empty()
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::Field(name) => write!(f, "{}", name),
            SelectItem::Aggregate(spec) => write!(f, "{}", spec),
        }
    }
}

/// Reconstructs a canonical SQL string for this query (spec.md §8 "Parser
/// round-trip"), used as stored view definitions so a view can be
/// re-parsed on demand.
impl fmt::Display for QueryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let select_list: Vec<String> = self.select_list.iter().map(|item| item.to_string()).collect();
        write!(f, "select {} from {}", select_list.join(", "), self.tables.join(", "))?;
        if !self.pred.is_empty() {
            write!(f, " where {}", self.pred)?;
        }
        if !self.group_by.is_empty() {
            write!(f, " group by {}", self.group_by.join(", "))?;
        }
        if let Some(having) = &self.having {
            write!(f, " having {}", having)?;
        }
        if !self.order_by.is_empty() {
            let order: Vec<String> = self.order_by.iter().map(|sf| sf.to_string()).collect();
            write!(f, " order by {}", order.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct InsertData {
    pub table: String,
    pub fields: Vec<String>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct DeleteData {
    pub table: String,
    pub pred: Predicate,
}

#[derive(Debug, Clone)]
pub struct ModifyData {
    pub table: String,
    pub field: String,
    pub new_value: crate::query::Expr,
    pub pred: Predicate,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ftype: FieldType,
}

#[derive(Debug, Clone)]
pub struct CreateTableData {
    pub table: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone)]
pub struct CreateViewData {
    pub view: String,
    pub query: QueryData,
}

#[derive(Debug, Clone)]
pub struct CreateIndexData {
    pub index: String,
    pub table: String,
    pub field: String,
}

/// A parsed statement, tagged by the AST node it carries (spec.md §4.11
/// `UpdateCmd := Insert | Delete | Modify | Create`, plus bare `Query`).
#[derive(Debug, Clone)]
pub enum Statement {
    Query(QueryData),
    Insert(InsertData),
    Delete(DeleteData),
    Modify(ModifyData),
    CreateTable(CreateTableData),
    CreateView(CreateViewData),
    CreateIndex(CreateIndexData),
}
