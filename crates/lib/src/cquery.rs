//! Requests to an external configured-query process and decoding of its
//! replies.
//!
//! Each request type carries the Starlark body the query tool evaluates for
//! a target, and a parser for the single line of text it prints back.
//!
//! # Wire Format
//!
//! A reply is one line made of a fixed number of fields separated by `|`.
//! A field holds a list whose elements are separated by `", "`. There is no
//! escaping, so neither delimiter may appear inside an element.
//!
//! ```
//! use selectgen_lib::cquery::{GetCcInfo, RequestType};
//!
//! let info = GetCcInfo.parse_result("out.a||||||").unwrap();
//! assert_eq!(info.output_files, vec!["out.a".to_string()]);
//! assert!(info.includes.is_empty());
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::consts::{ITEM_DELIMITER, LIST_DELIMITER};

/// Errors from decoding a query reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  /// The reply did not have the number of fields the request defines.
  #[error("expected {expected} items, got {actual:?}")]
  Arity { expected: usize, actual: Vec<String> },
}

/// A kind of query the external tool can answer for a target.
pub trait RequestType {
  type Output;

  /// Identifier of the request, unique among request types.
  fn name(&self) -> &'static str;

  /// Body of the Starlark function `format(target)` that produces the reply.
  fn starlark_function_body(&self) -> String;

  /// Decode one reply line.
  fn parse_result(&self, raw: &str) -> Result<Self::Output, ParseError>;
}

/// Files produced by the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOutputFiles;

/// Executable of a python binary target.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetPythonBinary;

/// Compilation and linking facts of a C/C++ target.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetCcInfo;

/// Decoded reply of [`GetCcInfo`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CcInfo {
  pub output_files: Vec<String>,
  pub cc_object_files: Vec<String>,
  pub cc_static_library_files: Vec<String>,
  pub includes: Vec<String>,
  pub system_includes: Vec<String>,
  /// Static archives owned by the queried target itself.
  pub root_static_archives: Vec<String>,
  /// Shared libraries owned by the queried target itself.
  pub root_dynamic_libraries: Vec<String>,
}

impl RequestType for GetOutputFiles {
  type Output = Vec<String>;

  fn name(&self) -> &'static str {
    "getOutputFiles"
  }

  fn starlark_function_body(&self) -> String {
    "return ', '.join([f.path for f in target.files.to_list()])".to_string()
  }

  fn parse_result(&self, raw: &str) -> Result<Self::Output, ParseError> {
    let mut fields = split_fields(raw, 1)?;
    Ok(fields.remove(0))
  }
}

impl RequestType for GetPythonBinary {
  type Output = String;

  fn name(&self) -> &'static str {
    "getPythonBinary"
  }

  fn starlark_function_body(&self) -> String {
    "return providers(target)['FilesToRunProvider'].executable.path".to_string()
  }

  fn parse_result(&self, raw: &str) -> Result<Self::Output, ParseError> {
    let groups = split_groups(raw, 1)?;
    Ok(groups[0].trim().to_string())
  }
}

impl RequestType for GetCcInfo {
  type Output = CcInfo;

  fn name(&self) -> &'static str {
    "getCcInfo"
  }

  fn starlark_function_body(&self) -> String {
    r#"outputFiles = [f.path for f in target.files.to_list()]
cc_info = providers(target)["CcInfo"]

includes = cc_info.compilation_context.includes.to_list()
system_includes = cc_info.compilation_context.system_includes.to_list()

ccObjectFiles = []
staticLibraries = []
rootStaticArchives = []
rootDynamicLibraries = []
for linker_input in cc_info.linking_context.linker_inputs.to_list():
  for library in linker_input.libraries:
    for object in library.objects:
      ccObjectFiles += [object.path]
    if library.static_library:
      staticLibraries.append(library.static_library.path)
      if linker_input.owner == target.label:
        rootStaticArchives.append(library.static_library.path)
    if library.dynamic_library and linker_input.owner == target.label:
      rootDynamicLibraries.append(library.dynamic_library.path)

returns = [
  outputFiles,
  staticLibraries,
  ccObjectFiles,
  includes,
  system_includes,
  rootStaticArchives,
  rootDynamicLibraries,
]

return "|".join([", ".join(r) for r in returns])"#
      .to_string()
  }

  fn parse_result(&self, raw: &str) -> Result<Self::Output, ParseError> {
    let mut fields = split_fields(raw, 7)?.into_iter();
    let mut next = || fields.next().unwrap_or_default();
    Ok(CcInfo {
      output_files: next(),
      cc_static_library_files: next(),
      cc_object_files: next(),
      includes: next(),
      system_includes: next(),
      root_static_archives: next(),
      root_dynamic_libraries: next(),
    })
  }
}

/// Split `raw` into exactly `arity` fields, each split into a list.
///
/// An entirely empty line is the reply of a query that found nothing and
/// yields `arity` empty lists.
pub fn split_fields(raw: &str, arity: usize) -> Result<Vec<Vec<String>>, ParseError> {
  Ok(split_groups(raw, arity)?.into_iter().map(split_list).collect())
}

fn split_groups(raw: &str, arity: usize) -> Result<Vec<&str>, ParseError> {
  if raw.is_empty() {
    return Ok(vec![""; arity]);
  }
  let groups: Vec<&str> = raw.split(ITEM_DELIMITER).collect();
  if groups.len() != arity {
    return Err(ParseError::Arity {
      expected: arity,
      actual: groups.into_iter().map(str::to_string).collect(),
    });
  }
  Ok(groups)
}

fn split_list(group: &str) -> Vec<String> {
  if group.trim().is_empty() {
    return Vec::new();
  }
  group.split(LIST_DELIMITER).map(|item| item.trim().to_string()).collect()
}
