//! Integration tests for `selectgen convert`.

use predicates::prelude::*;

use super::common::{TestEnv, fixture_path, selectgen_cmd};

const APOGEE_BUILD: &str = r#"# system/apogee/BUILD.bazel
load("//build/bazel/rules:apex.bzl", "apex")

apex(
    name = "com.android.apogee",
    installable = False,
    key = ":com.android.apogee.key",
    manifest = "apogee_manifest.json",
    prebuilts = ["//system/timezone:apex_tz_version"],
)
"#;

const TIMEZONE_BUILD: &str = r#"# system/timezone/BUILD.bazel
load("//build/bazel/rules:prebuilt_etc.bzl", "prebuilt_etc")

prebuilt_etc(
    name = "apex_tz_version",
    filename = "tz_version",
    installable = False,
    src = "version/tz_version",
    sub_dir = "tz",
)
"#;

#[test]
fn converts_every_directory() {
  selectgen_cmd()
    .arg("convert")
    .arg(fixture_path("apex_modules.json"))
    .assert()
    .success()
    .stdout(format!("{}\n{}", APOGEE_BUILD, TIMEZONE_BUILD));
}

#[test]
fn dir_filter_prints_one_build_file() {
  selectgen_cmd()
    .arg("convert")
    .arg(fixture_path("apex_modules.json"))
    .args(["--dir", "system/timezone"])
    .assert()
    .success()
    .stdout(TIMEZONE_BUILD);
}

#[test]
fn dir_filter_without_targets_fails() {
  selectgen_cmd()
    .arg("convert")
    .arg(fixture_path("apex_modules.json"))
    .args(["--dir", "nowhere"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("No targets generated in directory: nowhere"));
}

#[test]
fn multi_axis_attribute_renders_one_select_per_axis() {
  selectgen_cmd()
    .arg("convert")
    .arg(fixture_path("multi_axis_modules.json"))
    .assert()
    .success()
    .stdout(
      r#"# BUILD.bazel
filegroup(
    name = "srcs",
    srcs = ["common.c"] + select({
        "//build/bazel/platforms/arch:arm64": ["arm64.c"],
        "//conditions:default": ["generic.c"],
    }) + select({
        "//build/bazel/platforms/os:android": ["android.c"],
        "//conditions:default": [],
    }) + select({
        "//build/bazel/product_variables:malloc_not_svelte": ["malloc.c"],
        "//conditions:default": [],
    }),
)
"#,
    );
}

#[test]
fn config_file_controls_availability() {
  let env = TestEnv::new();
  let config = env.copy_fixture("vendor_config.json");

  selectgen_cmd()
    .arg("convert")
    .arg(fixture_path("apex_modules.json"))
    .arg("--config")
    .arg(&config)
    .assert()
    .success()
    .stdout(predicate::str::contains("# system/apogee/BUILD.bazel"))
    .stdout(predicate::str::contains("system/timezone/BUILD.bazel").not());
}

#[test]
fn invalid_variant_is_reported_not_panicked() {
  selectgen_cmd()
    .arg("convert")
    .arg(fixture_path("bad_variant_modules.json"))
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("module broken: unknown arch: riscv64"))
    .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn apex_available_check_is_opt_in() {
  selectgen_cmd()
    .arg("convert")
    .arg(fixture_path("apex_modules.json"))
    .arg("--check-apex-available")
    .assert()
    .failure()
    .stderr(predicate::str::contains(
      r#""com.android.apogee" requires "apex_tz_version" that doesn't list the APEX under 'apex_available'."#,
    ));
}

#[test]
fn apex_available_check_passes_when_listed() {
  let env = TestEnv::new();
  let modules = env.write_file(
    "modules.json",
    r#"[
      { "name": "app", "module_type": "apex", "properties": { "prebuilts": ["etc"] } },
      { "name": "etc", "module_type": "prebuilt_etc",
        "properties": { "src": "etc.txt", "apex_available": ["app"] } }
    ]"#,
  );

  selectgen_cmd()
    .arg("convert")
    .arg(&modules)
    .arg("--check-apex-available")
    .assert()
    .success()
    .stdout(predicate::str::contains(r#"prebuilts = [":etc"],"#));
}

#[test]
fn json_output_lists_rendered_targets() {
  let output = selectgen_cmd()
    .arg("convert")
    .arg(fixture_path("apex_modules.json"))
    .args(["--output", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let files: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let files = files.as_array().unwrap();
  assert_eq!(files.len(), 2);
  assert_eq!(files[0]["dir"], "system/apogee");
  assert_eq!(files[0]["path"], "system/apogee/BUILD.bazel");
  assert_eq!(files[0]["targets"][0]["rule_class"], "apex");
  assert_eq!(files[0]["targets"][0]["attributes"]["key"], r#"":com.android.apogee.key""#);
  assert_eq!(files[1]["targets"][0]["bzl_load_location"], "//build/bazel/rules:prebuilt_etc.bzl");
}
