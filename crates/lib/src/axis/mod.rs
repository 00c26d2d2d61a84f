//! Configuration axes.
//!
//! An axis is an independent dimension along which an attribute may vary:
//! target architecture, operating system, the OS+arch pair, libc flavor, or
//! one named product variable. Values never overlap between axes, so each
//! axis renders as its own `select()` clause.
//!
//! The valid configuration values of each axis live in the
//! [`registry::AxisRegistry`], not on the axis itself.

pub mod registry;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use registry::{AxisError, AxisRegistry, Vocabulary};

/// The kind of an axis.
///
/// Declaration order is the emission order of axes on one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigurationType {
  NoConfig,
  Arch,
  Os,
  OsArch,
  Bionic,
  ProductVariables,
}

impl ConfigurationType {
  pub const ALL: [ConfigurationType; 6] = [
    Self::NoConfig,
    Self::Arch,
    Self::Os,
    Self::OsArch,
    Self::Bionic,
    Self::ProductVariables,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::NoConfig => "no_config",
      Self::Arch => "arch",
      Self::Os => "os",
      Self::OsArch => "arch_os",
      Self::Bionic => "bionic",
      Self::ProductVariables => "product_variables",
    }
  }
}

impl fmt::Display for ConfigurationType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for ConfigurationType {
  type Err = AxisError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|kind| kind.as_str() == s)
      .ok_or_else(|| AxisError::UnknownKind(s.to_string()))
  }
}

/// An independent axis of configuration.
///
/// Product variables share one [`ConfigurationType`] but each variable is its
/// own axis, told apart by `subtype`.
///
/// # Text Form
///
/// `arch`, `os`, `arch_os`, `bionic`, `no_config`, or
/// `product_variables:<name>` for a product variable. This is also the serde
/// representation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfigurationAxis {
  kind: ConfigurationType,
  subtype: String,
}

impl ConfigurationAxis {
  /// No configuration: values set on this axis are the base value.
  pub const NO_CONFIG: Self = Self::of(ConfigurationType::NoConfig);
  pub const ARCH: Self = Self::of(ConfigurationType::Arch);
  pub const OS: Self = Self::of(ConfigurationType::Os);
  pub const OS_ARCH: Self = Self::of(ConfigurationType::OsArch);
  pub const BIONIC: Self = Self::of(ConfigurationType::Bionic);

  const fn of(kind: ConfigurationType) -> Self {
    Self {
      kind,
      subtype: String::new(),
    }
  }

  /// The axis of a single named product variable.
  pub fn product_variable(name: impl Into<String>) -> Self {
    Self {
      kind: ConfigurationType::ProductVariables,
      subtype: name.into(),
    }
  }

  pub fn kind(&self) -> ConfigurationType {
    self.kind
  }

  pub fn subtype(&self) -> &str {
    &self.subtype
  }
}

impl fmt::Display for ConfigurationAxis {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.subtype.is_empty() {
      write!(f, "{}", self.kind)
    } else {
      write!(f, "{}:{}", self.kind, self.subtype)
    }
  }
}

impl FromStr for ConfigurationAxis {
  type Err = AxisError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.split_once(':') {
      Some((kind, name)) => match kind.parse()? {
        ConfigurationType::ProductVariables if !name.is_empty() => Ok(Self::product_variable(name)),
        _ => Err(AxisError::UnknownKind(s.to_string())),
      },
      None => match s.parse()? {
        ConfigurationType::ProductVariables => Err(AxisError::UnknownKind(s.to_string())),
        kind => Ok(Self::of(kind)),
      },
    }
  }
}

impl TryFrom<String> for ConfigurationAxis {
  type Error = AxisError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<ConfigurationAxis> for String {
  fn from(axis: ConfigurationAxis) -> Self {
    axis.to_string()
  }
}
