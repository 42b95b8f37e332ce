//! AST foundation types and the structured query representation.

mod query;
mod span;

// Re-export span types
pub use span::{Span, Spanned};

pub use query::{
    Arity, Condition, DateRange, Direction, FieldName, Literal, Operator, Ordering, Parameter,
    Query, Value, split_field,
};
