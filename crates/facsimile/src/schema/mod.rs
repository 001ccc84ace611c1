//! Schema representation: types, constraints, and the schema tree.

mod constraints;
mod node;
mod types;

pub use constraints::{LengthBounds, NumericConstraint, StringConstraint};
pub use node::{
    OptionalSchema, PrimitiveSchema, RecordSchema, Schema, SequenceSchema, UnionSchema,
};
pub use types::{CharClass, PrimitiveKind, StringPattern};
