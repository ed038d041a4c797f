//! Predicate model and literal coercion for framestore.
//!
//! A filter arrives as a disjunction of conjunctions of
//! `(column, operator, literal)` clauses. Literals are a tagged variant type
//! ([`Literal`]) so type inference is deferred until the target column's
//! Arrow type is known; [`coerce`] then pattern-matches the literal against
//! the column type and either produces a [`TypedValue`] in the column's
//! comparison domain or rejects the clause with a type- or value-level error.

pub mod coerce;
pub mod literal;
pub mod predicate;

pub use coerce::{coerce, nanos_per, TypedValue};
pub use literal::Literal;
pub use predicate::{Clause, CoercedClause, CoercedPredicate, CompareOp, Predicate};
