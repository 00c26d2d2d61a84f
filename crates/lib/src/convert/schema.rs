//! Module converters and the declarative rule schemas behind the built-in
//! ones.
//!
//! A [`RuleSchema`] maps module properties onto target attributes. List
//! attributes are configurable: the base value comes from the module's
//! properties and every variant snapshot adds an override (and exclusions)
//! for its (axis, config) pair.

use std::collections::BTreeMap;

use crate::attribute::{ConfigurableList, Label, ResolvedList};
use crate::axis::ConfigurationAxis;
use crate::emit::{AttrValue, BazelTarget};

use super::ModuleContext;
use super::types::{ConvertError, ModuleSnapshot, PropertyValue, list_of};

/// Turns one module into zero or more targets.
pub trait ModuleConverter: Send + Sync {
  fn convert(&self, ctx: &ModuleContext<'_>, module: &ModuleSnapshot) -> Result<Vec<BazelTarget>, ConvertError>;

  /// Properties naming modules this module depends on.
  fn dependency_properties(&self) -> &[String] {
    &[]
  }
}

/// How a property becomes an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
  /// Bool, integer or string, emitted literally.
  Scalar,
  /// Source path relative to the module directory.
  Path,
  /// Name of another module, emitted as its label.
  ModuleRef,
  /// Configurable list of plain strings.
  StringList,
  /// Configurable list of source paths, with an optional property of paths
  /// to exclude.
  PathList { exclude: Option<&'static str> },
  /// Configurable list of module names, emitted as labels.
  ModuleRefList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSpec {
  pub property: String,
  pub attribute: String,
  pub kind: AttrKind,
}

/// Declarative mapping from a module type to a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSchema {
  pub rule_class: String,
  pub bzl_load_location: Option<String>,
  pub attrs: Vec<AttrSpec>,
  pub dependencies: Vec<String>,
}

impl RuleSchema {
  pub fn new(rule_class: impl Into<String>) -> Self {
    Self {
      rule_class: rule_class.into(),
      bzl_load_location: None,
      attrs: Vec::new(),
      dependencies: Vec::new(),
    }
  }

  pub fn with_load_location(mut self, location: impl Into<String>) -> Self {
    self.bzl_load_location = Some(location.into());
    self
  }

  /// Map `property` to the attribute of the same name.
  pub fn attr(self, property: impl Into<String>, kind: AttrKind) -> Self {
    let property = property.into();
    self.renamed(property.clone(), property, kind)
  }

  /// Map `property` to an attribute with a different name.
  pub fn renamed(mut self, property: impl Into<String>, attribute: impl Into<String>, kind: AttrKind) -> Self {
    self.attrs.push(AttrSpec {
      property: property.into(),
      attribute: attribute.into(),
      kind,
    });
    self
  }

  /// Declare `property` as naming dependencies.
  pub fn dependency(mut self, property: impl Into<String>) -> Self {
    self.dependencies.push(property.into());
    self
  }

  pub fn filegroup() -> Self {
    Self::new("filegroup").attr(
      "srcs",
      AttrKind::PathList {
        exclude: Some("exclude_srcs"),
      },
    )
  }

  pub fn prebuilt_etc() -> Self {
    Self::new("prebuilt_etc")
      .with_load_location("//build/bazel/rules:prebuilt_etc.bzl")
      .attr("src", AttrKind::Path)
      .attr("filename", AttrKind::Scalar)
      .attr("sub_dir", AttrKind::Scalar)
      .attr("installable", AttrKind::Scalar)
  }

  pub fn apex() -> Self {
    Self::new("apex")
      .with_load_location("//build/bazel/rules:apex.bzl")
      .attr("manifest", AttrKind::Path)
      .renamed("androidManifest", "android_manifest", AttrKind::Path)
      .attr("file_contexts", AttrKind::ModuleRef)
      .attr("min_sdk_version", AttrKind::Scalar)
      .attr("key", AttrKind::ModuleRef)
      .attr("certificate", AttrKind::ModuleRef)
      .attr("updatable", AttrKind::Scalar)
      .attr("installable", AttrKind::Scalar)
      .attr("native_shared_libs", AttrKind::ModuleRefList)
      .attr("binaries", AttrKind::StringList)
      .attr("prebuilts", AttrKind::ModuleRefList)
      .attr("java_libs", AttrKind::ModuleRefList)
      .attr("systemserverclasspath_fragments", AttrKind::ModuleRefList)
      .dependency("native_shared_libs")
      .dependency("binaries")
      .dependency("prebuilts")
      .dependency("java_libs")
      .dependency("systemserverclasspath_fragments")
  }

  pub fn systemserverclasspath_fragment() -> Self {
    Self::new("systemserverclasspath_fragment")
      .with_load_location("//build/bazel/rules/apex:systemserverclasspath_fragment.bzl")
      .attr("contents", AttrKind::ModuleRefList)
      .dependency("contents")
  }
}

/// Converter driven by a [`RuleSchema`]. Produces a single target named
/// after the module.
#[derive(Debug, Clone)]
pub struct SchemaConverter {
  schema: RuleSchema,
}

impl SchemaConverter {
  pub fn new(schema: RuleSchema) -> Self {
    Self { schema }
  }

  pub fn schema(&self) -> &RuleSchema {
    &self.schema
  }
}

impl From<RuleSchema> for SchemaConverter {
  fn from(schema: RuleSchema) -> Self {
    Self::new(schema)
  }
}

impl ModuleConverter for SchemaConverter {
  fn convert(&self, ctx: &ModuleContext<'_>, module: &ModuleSnapshot) -> Result<Vec<BazelTarget>, ConvertError> {
    let mut target = BazelTarget::new(&module.name, &self.schema.rule_class, &module.dir);
    if let Some(location) = &self.schema.bzl_load_location {
      target = target.with_load_location(location);
    }
    for spec in &self.schema.attrs {
      if let Some(value) = convert_attr(ctx, module, spec)? {
        target.set_attr(&spec.attribute, value);
      }
    }
    Ok(vec![target])
  }

  fn dependency_properties(&self) -> &[String] {
    &self.schema.dependencies
  }
}

fn convert_attr(
  ctx: &ModuleContext<'_>,
  module: &ModuleSnapshot,
  spec: &AttrSpec,
) -> Result<Option<AttrValue>, ConvertError> {
  let property = spec.property.as_str();
  let value = match spec.kind {
    AttrKind::Scalar => match module.property(property) {
      None => None,
      Some(PropertyValue::Bool(b)) => Some(AttrValue::Bool(*b)),
      Some(PropertyValue::Int(n)) => Some(AttrValue::Int(*n)),
      Some(PropertyValue::String(s)) => Some(AttrValue::String(s.clone())),
      Some(PropertyValue::List(_)) => return Err(invalid(module, property, "a bool, integer or string")),
    },
    AttrKind::Path => string_property(module, property)?.map(|path| AttrValue::Label(Label::new(path))),
    AttrKind::ModuleRef => {
      string_property(module, property)?.map(|name| AttrValue::Label(ctx.label_for(name, &module.dir)))
    }
    AttrKind::StringList => configurable(ctx, module, property, None, String::clone)?.map(AttrValue::StringList),
    AttrKind::PathList { exclude } => {
      configurable(ctx, module, property, exclude, |path| Label::new(path.as_str()))?.map(AttrValue::LabelList)
    }
    AttrKind::ModuleRefList => {
      configurable(ctx, module, property, None, |name| ctx.label_for(name, &module.dir))?.map(AttrValue::LabelList)
    }
  };
  Ok(value)
}

fn invalid(module: &ModuleSnapshot, property: &str, expected: &'static str) -> ConvertError {
  ConvertError::InvalidProperty {
    module: module.name.clone(),
    property: property.to_string(),
    expected,
  }
}

fn string_property<'m>(module: &'m ModuleSnapshot, property: &str) -> Result<Option<&'m str>, ConvertError> {
  match module.property(property) {
    None => Ok(None),
    Some(PropertyValue::String(s)) => Ok(Some(s)),
    Some(_) => Err(invalid(module, property, "a string")),
  }
}

/// Build a configurable list from the base property and every variant.
///
/// Returns `None` when the list is empty in every branch.
fn configurable<T, F>(
  ctx: &ModuleContext<'_>,
  module: &ModuleSnapshot,
  property: &str,
  exclude: Option<&str>,
  map: F,
) -> Result<Option<ResolvedList<T>>, ConvertError>
where
  T: Clone + Eq + std::hash::Hash,
  F: Fn(&String) -> T,
{
  let convert = |items: &[String]| -> Vec<T> { items.iter().map(&map).collect() };

  let mut list = ConfigurableList::new(ctx.registry);
  if let Some(items) = module.list_property(property)? {
    list.set_value(convert(items));
  }
  if let Some(exclude) = exclude
    && let Some(items) = module.list_property(exclude)?
  {
    list.set_select_excludes(&ConfigurationAxis::NO_CONFIG, "", convert(items));
  }

  for variant in &module.variants {
    if let Some(items) = list_of(&module.name, property, variant.properties.get(property))? {
      list.set_select_value(&variant.axis, &variant.config, convert(items));
    }
    if let Some(exclude) = exclude
      && let Some(items) = list_of(&module.name, exclude, variant.properties.get(exclude))?
    {
      list.set_select_excludes(&variant.axis, &variant.config, convert(items));
    }
  }

  let resolved = list.resolve();
  Ok((!resolved.is_empty()).then_some(resolved))
}

/// Converters by module type.
#[derive(Default)]
pub struct ConverterRegistry {
  converters: BTreeMap<String, Box<dyn ModuleConverter>>,
}

impl ConverterRegistry {
  pub fn empty() -> Self {
    Self::default()
  }

  /// Converters for `filegroup`, `prebuilt_etc`, `apex` and
  /// `systemserverclasspath_fragment`.
  pub fn builtin() -> Self {
    let mut registry = Self::empty();
    registry.register_schema("filegroup", RuleSchema::filegroup());
    registry.register_schema("prebuilt_etc", RuleSchema::prebuilt_etc());
    registry.register_schema("apex", RuleSchema::apex());
    registry.register_schema("systemserverclasspath_fragment", RuleSchema::systemserverclasspath_fragment());
    registry
  }

  /// Register `converter` for `module_type`, replacing any previous one.
  pub fn register(&mut self, module_type: impl Into<String>, converter: impl ModuleConverter + 'static) {
    self.converters.insert(module_type.into(), Box::new(converter));
  }

  pub fn register_schema(&mut self, module_type: impl Into<String>, schema: RuleSchema) {
    self.register(module_type, SchemaConverter::new(schema));
  }

  pub fn get(&self, module_type: &str) -> Option<&dyn ModuleConverter> {
    self.converters.get(module_type).map(|converter| &**converter)
  }

  pub fn module_types(&self) -> impl Iterator<Item = &str> {
    self.converters.keys().map(String::as_str)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::axis::AxisRegistry;
  use crate::convert::{ConversionConfig, ModuleIndex};

  fn list(items: &[&str]) -> PropertyValue {
    PropertyValue::List(items.iter().map(|s| s.to_string()).collect())
  }

  fn convert_one(
    schema: RuleSchema,
    module: &ModuleSnapshot,
    others: &[ModuleSnapshot],
  ) -> Result<BazelTarget, ConvertError> {
    let mut modules = others.to_vec();
    modules.push(module.clone());
    let index = ModuleIndex::new(&modules);
    let config = ConversionConfig::default();
    let ctx = ModuleContext::new(AxisRegistry::global(), &config, &index);
    let mut targets = SchemaConverter::new(schema).convert(&ctx, module)?;
    Ok(targets.remove(0))
  }

  #[test]
  fn scalars_paths_and_refs() {
    let module = ModuleSnapshot::new("app", "apex")
      .in_dir("system/app")
      .with_property("manifest", PropertyValue::String("manifest.json".to_string()))
      .with_property("key", PropertyValue::String("app.key".to_string()))
      .with_property("certificate", PropertyValue::String("shared.cert".to_string()))
      .with_property("min_sdk_version", PropertyValue::String("29".to_string()))
      .with_property("updatable", PropertyValue::Bool(false));
    let cert = ModuleSnapshot::new("shared.cert", "android_app_certificate").in_dir("certs");

    let target = convert_one(RuleSchema::apex(), &module, &[cert]).unwrap();
    assert_eq!(target.dir, "system/app");
    assert_eq!(target.attrs["manifest"], AttrValue::Label(Label::new("manifest.json")));
    assert_eq!(target.attrs["key"], AttrValue::Label(Label::new(":app.key")));
    assert_eq!(target.attrs["certificate"], AttrValue::Label(Label::new("//certs:shared.cert")));
    assert_eq!(target.attrs["min_sdk_version"], AttrValue::String("29".to_string()));
    assert_eq!(target.attrs["updatable"], AttrValue::Bool(false));
    assert!(!target.attrs.contains_key("installable"));
  }

  #[test]
  fn renamed_property() {
    let module = ModuleSnapshot::new("app", "apex")
      .with_property("androidManifest", PropertyValue::String("AndroidManifest.xml".to_string()));
    let target = convert_one(RuleSchema::apex(), &module, &[]).unwrap();
    assert!(target.attrs.contains_key("android_manifest"));
    assert!(!target.attrs.contains_key("androidManifest"));
  }

  #[test]
  fn path_list_with_variants_and_excludes() {
    let module = ModuleSnapshot::new("fg", "filegroup")
      .with_property("srcs", list(&["a.c", "generic.c"]))
      .with_variant(
        ConfigurationAxis::ARCH,
        "arm",
        BTreeMap::from([
          ("srcs".to_string(), list(&["arm.c"])),
          ("exclude_srcs".to_string(), list(&["generic.c"])),
        ]),
      );

    let target = convert_one(RuleSchema::filegroup(), &module, &[]).unwrap();
    let AttrValue::LabelList(srcs) = &target.attrs["srcs"] else {
      panic!("srcs is not a label list");
    };
    assert_eq!(srcs.value(), [Label::new("a.c"), Label::new("generic.c")]);
    assert_eq!(
      srcs.select_value(&ConfigurationAxis::ARCH, "arm").unwrap(),
      [Label::new("a.c"), Label::new("arm.c")]
    );
  }

  #[test]
  fn base_excludes_apply_to_the_base() {
    let module = ModuleSnapshot::new("fg", "filegroup")
      .with_property("srcs", list(&["a.c", "b.c"]))
      .with_property("exclude_srcs", list(&["b.c"]));
    let target = convert_one(RuleSchema::filegroup(), &module, &[]).unwrap();
    assert_eq!(target.attrs["srcs"], AttrValue::LabelList(ResolvedList::from_value(vec![Label::new("a.c")])));
  }

  #[test]
  fn empty_lists_are_dropped() {
    let module = ModuleSnapshot::new("fg", "filegroup").with_property("srcs", list(&[]));
    let target = convert_one(RuleSchema::filegroup(), &module, &[]).unwrap();
    assert!(target.attrs.is_empty());
  }

  #[test]
  fn wrong_property_shape_is_an_error() {
    let module = ModuleSnapshot::new("fg", "filegroup").with_property("srcs", PropertyValue::String("a.c".to_string()));
    let err = convert_one(RuleSchema::filegroup(), &module, &[]).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidProperty { ref property, .. } if property == "srcs"));

    let module = ModuleSnapshot::new("etc", "prebuilt_etc").with_property("installable", list(&["x"]));
    let err = convert_one(RuleSchema::prebuilt_etc(), &module, &[]).unwrap_err();
    assert_eq!(err.to_string(), "module etc: property installable must be a bool, integer or string");
  }

  #[test]
  fn builtin_registry_contents() {
    let registry = ConverterRegistry::builtin();
    assert_eq!(
      registry.module_types().collect::<Vec<_>>(),
      ["apex", "filegroup", "prebuilt_etc", "systemserverclasspath_fragment"]
    );
    assert_eq!(
      registry.get("systemserverclasspath_fragment").unwrap().dependency_properties(),
      ["contents".to_string()]
    );
    assert!(registry.get("cc_library").is_none());
  }
}
