//! Wire formats of portable values.
//!
//! - [`scalar`]: tag-prefixed scalars written by the fallback connector
//! - [`grid`]: the grid layout document walked by the grid connector

pub mod grid;
pub mod scalar;

pub use grid::{GridArea, GridControl, GridEditor, GridRow, GridSection, GridValue, GridVisitor};
pub use scalar::TypedScalar;
