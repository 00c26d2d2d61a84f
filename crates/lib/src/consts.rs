/// Config value naming the fallback branch of every axis.
///
/// Mirrors the `conditions_default` key module authors write next to
/// per-arch and per-variable blocks.
pub const CONDITIONS_DEFAULT_CONFIG_KEY: &str = "conditions_default";

/// Select key of the fallback branch in a rendered `select()`.
pub const CONDITIONS_DEFAULT_SELECT_KEY: &str = "//conditions:default";

pub const ARCH_CONSTRAINT_PACKAGE: &str = "//build/bazel/platforms/arch";
pub const OS_CONSTRAINT_PACKAGE: &str = "//build/bazel/platforms/os";
pub const OS_ARCH_CONSTRAINT_PACKAGE: &str = "//build/bazel/platforms/os_arch";
pub const PRODUCT_VARIABLE_PACKAGE: &str = "//build/bazel/product_variables";

/// Directory key for the top of the source tree in availability configs.
pub const TOPLEVEL_DIR: &str = ".";

/// `apex_available` entry that admits a module into every apex.
pub const ANY_APEX: &str = "//apex_available:anyapex";

/// Separates positional fields of a query response line.
pub const ITEM_DELIMITER: &str = "|";

/// Separates list elements within a query response field.
pub const LIST_DELIMITER: &str = ", ";
