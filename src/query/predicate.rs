//! Predicates and terms (spec.md §4.12): a predicate is a conjunction of
//! terms, each comparing two expressions with a single comparison op.

use std::fmt;

use crate::error::Result;
use crate::plan::Plan;
use crate::record::{Schema, Value};
use crate::scan::Scan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    pub fn from_str(s: &str) -> Option<Op> {
        match s {
            "=" => Some(Op::Eq),
            "<>" | "!=" => Some(Op::Ne),
            "<" => Some(Op::Lt),
            "<=" => Some(Op::Le),
            ">" => Some(Op::Gt),
            ">=" => Some(Op::Ge),
            _ => None,
        }
    }

    fn apply(&self, lhs: &Value, rhs: &Value) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Op::Eq => lhs == rhs,
            Op::Ne => lhs != rhs,
            Op::Lt => lhs.partial_cmp(rhs) == Some(Less),
            Op::Le => matches!(lhs.partial_cmp(rhs), Some(Less) | Some(Equal)),
            Op::Gt => lhs.partial_cmp(rhs) == Some(Greater),
            Op::Ge => matches!(lhs.partial_cmp(rhs), Some(Greater) | Some(Equal)),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

/// A field reference or a literal constant (spec.md §4.12 `Expr := Field |
/// Constant | Agg`; aggregate expressions are handled separately by
/// `GroupByScan`, so this only ever holds the other two variants).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Field(String),
    Constant(Value),
}

impl Expr {
    pub fn is_field_name(&self) -> bool {
        matches!(self, Expr::Field(_))
    }

    pub fn as_field_name(&self) -> Option<&str> {
        match self {
            Expr::Field(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expr::Constant(v) => Some(v),
            _ => None,
        }
    }

    pub fn applies_to(&self, schema: &Schema) -> bool {
        match self {
            Expr::Field(name) => schema.has_field(name),
            Expr::Constant(_) => true,
        }
    }

    /// Resolves this expression against the current row of `scan` (used by
    /// `UPDATE ... SET field = expr` to compute the new value).
    pub fn evaluate(&self, scan: &mut dyn Scan) -> Result<Value> {
        match self {
            Expr::Field(name) => scan.get_val(name),
            Expr::Constant(v) => Ok(v.clone()),
        }
    }
}

/// Round-trips a constant back into the literal syntax the parser accepts
/// (spec.md §8 "Parser round-trip").
fn constant_to_sql(v: &Value) -> String {
    match v {
        Value::Varchar(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Boolean(b) => b.to_string(),
        Value::Date(ms) => crate::record::format_epoch_millis(*ms),
        Value::Int(_) | Value::Short(_) | Value::Long(_) => v.to_string(),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Field(name) => write!(f, "{}", name),
            Expr::Constant(v) => write!(f, "{}", constant_to_sql(v)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    lhs: Expr,
    rhs: Expr,
    op: Op,
}

impl Term {
    pub fn new(lhs: Expr, op: Op, rhs: Expr) -> Self {
        Self { lhs, op, rhs }
    }

    pub fn is_satisfied(&self, scan: &mut dyn Scan) -> Result<bool> {
        let lval = self.lhs.evaluate(scan)?;
        let rval = self.rhs.evaluate(scan)?;
        Ok(self.op.apply(&lval, &rval))
    }

    pub fn applies_to(&self, schema: &Schema) -> bool {
        self.lhs.applies_to(schema) && self.rhs.applies_to(schema)
    }

    /// If this term equates `field` with a constant, that constant;
    /// otherwise `None`.
    pub fn equates_with_constant(&self, field: &str) -> Option<&Value> {
        if self.op != Op::Eq {
            return None;
        }
        match (&self.lhs, &self.rhs) {
            (Expr::Field(f), Expr::Constant(v)) if f == field => Some(v),
            (Expr::Constant(v), Expr::Field(f)) if f == field => Some(v),
            _ => None,
        }
    }

    /// If this term equates `field` with another field, that field's name.
    pub fn equates_with_field(&self, field: &str) -> Option<&str> {
        if self.op != Op::Eq {
            return None;
        }
        match (&self.lhs, &self.rhs) {
            (Expr::Field(f), Expr::Field(g)) if f == field => Some(g),
            (Expr::Field(f), Expr::Field(g)) if g == field => Some(f),
            _ => None,
        }
    }

    pub fn compares_with_constant(&self, field: &str) -> bool {
        match (&self.lhs, &self.rhs) {
            (Expr::Field(f), Expr::Constant(_)) | (Expr::Constant(_), Expr::Field(f)) => f == field,
            _ => false,
        }
    }

    pub fn op(&self) -> Op {
        self.op
    }

    /// Estimated selectivity divisor used by `SelectPlan::records_output`
    /// (spec.md §4.13): equality narrows to one match in `distinctValues`,
    /// other ops get coarser heuristics.
    pub fn reduction_factor(&self, plan: &dyn Plan) -> u64 {
        match (&self.lhs, &self.rhs) {
            (Expr::Field(f), Expr::Field(g)) if self.op == Op::Eq => plan.distinct_values(f).max(plan.distinct_values(g)),
            (Expr::Field(f), Expr::Constant(_)) | (Expr::Constant(_), Expr::Field(f)) => {
                let dv = plan.distinct_values(f);
                match self.op {
                    Op::Eq => dv.max(1),
                    Op::Ne => (dv.saturating_sub(1)).max(1),
                    Op::Lt | Op::Le | Op::Gt | Op::Ge => (dv / 2).max(1),
                }
            }
            _ => 1,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Predicate {
    terms: Vec<Term>,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.terms.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", rendered.join(" and "))
    }
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(term: Term) -> Self {
        Self { terms: vec![term] }
    }

    pub fn conjoin_with(&mut self, other: Predicate) {
        self.terms.extend(other.terms);
    }

    pub fn is_satisfied(&self, scan: &mut dyn Scan) -> Result<bool> {
        for term in &self.terms {
            if !term.is_satisfied(scan)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn reduction_factor(&self, plan: &dyn Plan) -> u64 {
        self.terms.iter().map(|t| t.reduction_factor(plan)).product::<u64>().max(1)
    }

    /// The constant `field` is equated with somewhere in this predicate.
    pub fn equates_with_constant(&self, field: &str) -> Option<&Value> {
        self.terms.iter().find_map(|t| t.equates_with_constant(field))
    }

    pub fn equates_with_field(&self, field: &str) -> Option<&str> {
        self.terms.iter().find_map(|t| t.equates_with_field(field))
    }

    /// The sub-predicate made up of terms referencing only fields in
    /// `schema` (spec.md §4.12 `selectSubPredicate`) — pushed down to a
    /// TablePlan's SelectPlan rather than evaluated after a join.
    pub fn select_sub_predicate(&self, schema: &Schema) -> Option<Predicate> {
        let terms: Vec<Term> = self.terms.iter().filter(|t| t.applies_to(schema)).cloned().collect();
        if terms.is_empty() {
            None
        } else {
            Some(Predicate { terms })
        }
    }

    /// The sub-predicate usable to join `schema_l` and `schema_r` (spec.md
    /// §4.12 `joinSubPredicate`): every term must resolve fully against the
    /// combined schema, and reference at least one field on each side.
    pub fn join_sub_predicate(&self, schema_l: &Schema, schema_r: &Schema) -> Option<Predicate> {
        let mut combined = schema_l.clone();
        combined.add_all(schema_r);
        let terms: Vec<Term> = self
            .terms
            .iter()
            .filter(|t| t.applies_to(&combined) && !t.applies_to(schema_l) && !t.applies_to(schema_r))
            .cloned()
            .collect();
        if terms.is_empty() {
            None
        } else {
            Some(Predicate { terms })
        }
    }
}
