mod axes;
mod convert;
mod query;

pub use axes::cmd_axes;
pub use convert::{ConvertOptions, cmd_convert};
pub use query::{RequestKind, cmd_query};
