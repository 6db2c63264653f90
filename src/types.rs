pub mod element;
pub mod value_type;
pub mod values;

// Re-export types for convenience.
pub use crate::types::element::Element;
pub use crate::types::value_type::ValueType;
pub use crate::types::values::{Values, ValuesMut, ValuesRef};
