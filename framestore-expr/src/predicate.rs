//! Disjunctive-normal-form predicate model.
//!
//! A [`Predicate`] is an OR of AND-groups of [`Clause`]s. The model is
//! untyped at construction; [`Predicate::coerce`] resolves every clause
//! against a concrete Arrow schema exactly once per query, producing a
//! [`CoercedPredicate`] that both the row-group pruner and the row filter
//! evaluate.

use std::fmt;
use std::str::FromStr;

use arrow::datatypes::Schema;
use framestore_result::{Error, Result};

use crate::coerce::{coerce, TypedValue};
use crate::literal::Literal;

/// Comparison operator legal inside a predicate clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl FromStr for CompareOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "==" => Ok(CompareOp::Eq),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::LtEq),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::GtEq),
            other => Err(Error::InvalidArgumentError(format!(
                "unknown predicate operator {other:?} (expected ==, <, <=, >, >=)"
            ))),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "==",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        };
        f.write_str(s)
    }
}

/// Single `(column, operator, literal)` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub column: String,
    pub op: CompareOp,
    pub value: Literal,
}

impl Clause {
    pub fn new(column: impl Into<String>, op: CompareOp, value: impl Into<Literal>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Build a clause from the string operator form used by the external
    /// predicate interface (`"=="`, `"<"`, `"<="`, `">"`, `">="`).
    pub fn parse(
        column: impl Into<String>,
        op: &str,
        value: impl Into<Literal>,
    ) -> Result<Self> {
        Ok(Self::new(column, op.parse()?, value))
    }
}

/// OR of AND-groups of clauses. Rows match when every clause of at least one
/// group holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    groups: Vec<Vec<Clause>>,
}

impl Predicate {
    /// Validate and wrap a DNF clause list.
    ///
    /// An empty OR-list or an empty AND-group has no defined meaning and is
    /// rejected; "select all rows" is expressed by passing no predicate at
    /// all.
    pub fn from_dnf(groups: Vec<Vec<Clause>>) -> Result<Self> {
        if groups.is_empty() {
            return Err(Error::InvalidArgumentError(
                "empty predicate list; omit the predicate to select all rows".to_string(),
            ));
        }
        if groups.iter().any(|g| g.is_empty()) {
            return Err(Error::InvalidArgumentError(
                "predicate contains an empty conjunction group".to_string(),
            ));
        }
        Ok(Self { groups })
    }

    /// Convenience constructor for a single AND-group.
    pub fn all_of(clauses: Vec<Clause>) -> Result<Self> {
        Self::from_dnf(vec![clauses])
    }

    pub fn groups(&self) -> &[Vec<Clause>] {
        &self.groups
    }

    /// Column names referenced anywhere in the predicate, deduplicated,
    /// first-reference order.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for group in &self.groups {
            for clause in group {
                if !out.contains(&clause.column.as_str()) {
                    out.push(clause.column.as_str());
                }
            }
        }
        out
    }

    /// Resolve columns and coerce every literal against `schema`.
    ///
    /// Runs once per query, before any chunk is read, so type and value
    /// errors surface synchronously.
    pub fn coerce(&self, schema: &Schema) -> Result<CoercedPredicate> {
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let mut coerced = Vec::with_capacity(group.len());
            for clause in group {
                let (column_index, field) =
                    schema.column_with_name(&clause.column).ok_or_else(|| {
                        Error::InvalidArgumentError(format!(
                            "predicate references unknown column {:?}",
                            clause.column
                        ))
                    })?;
                let value = coerce(field.data_type(), &clause.value)?;
                coerced.push(CoercedClause {
                    column: clause.column.clone(),
                    column_index,
                    op: clause.op,
                    value,
                });
            }
            groups.push(coerced);
        }
        Ok(CoercedPredicate { groups })
    }
}

/// Clause whose literal has been coerced to the column's comparison domain.
#[derive(Debug, Clone)]
pub struct CoercedClause {
    pub column: String,
    /// Index of the column in the schema the predicate was coerced against.
    pub column_index: usize,
    pub op: CompareOp,
    pub value: TypedValue,
}

/// Fully typed predicate, ready for pruning and row filtering.
#[derive(Debug, Clone)]
pub struct CoercedPredicate {
    groups: Vec<Vec<CoercedClause>>,
}

impl CoercedPredicate {
    pub fn groups(&self) -> &[Vec<CoercedClause>] {
        &self.groups
    }
}
