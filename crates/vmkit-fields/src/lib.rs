#![forbid(unsafe_code)]

//! Field view-models: typed values with display metadata.
//!
//! - [`Field<T>`]: one observable value plus display name, description,
//!   and the `is_hidden`/`is_read_only` flags.
//! - [`NumericField<T>`]: a field with observable `minimum`/`maximum`.
//! - [`RadioField<T>`]: a field constrained to an observable option list.

pub mod field;
pub mod numeric;
pub mod radio;

pub use field::{Field, FieldFlags};
pub use numeric::{Numeric, NumericField};
pub use radio::{RadioField, RadioOption};

pub type BoolField = Field<bool>;
pub type StringField = Field<String>;
pub type IntField = NumericField<i32>;
pub type UIntField = NumericField<u32>;
pub type LongField = NumericField<i64>;
pub type ULongField = NumericField<u64>;
pub type FloatField = NumericField<f32>;
pub type DoubleField = NumericField<f64>;
