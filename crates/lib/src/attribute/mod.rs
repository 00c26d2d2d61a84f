//! Configurable attribute values.
//!
//! Attributes are lists whose value may differ per configuration. They are
//! built up as [`ConfigurableList`]s and handed to the emitter as
//! [`ResolvedList`]s.

mod label;
mod list;

pub use label::Label;
pub use list::{AxisValues, ConfigurableList, ResolvedList};

/// A configurable list of labels (sources, dependencies).
pub type LabelListAttribute<'r> = ConfigurableList<'r, Label>;

/// A configurable list of plain strings (flags, names).
pub type StringListAttribute<'r> = ConfigurableList<'r, String>;
