//! Emission of generated targets as Starlark.
//!
//! Converters produce [`BazelTarget`]s holding [`ResolvedList`] attributes;
//! this module decomposes them into `select()` expressions and renders BUILD
//! file text.
//!
//! [`ResolvedList`]: crate::attribute::ResolvedList

mod select;
mod starlark;
mod target;

pub use select::{SelectClause, SelectExpr, decompose};
pub use starlark::{StarlarkValue, load_statements, quote, render_build_file, render_target, render_value};
pub use target::{AttrValue, BazelTarget, BuildFiles, RenderedTarget};
