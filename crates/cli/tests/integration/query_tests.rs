//! Integration tests for `selectgen query`.

use predicates::prelude::*;

use super::common::selectgen_cmd;

#[test]
fn cc_info_text_lists_fields_in_wire_order() {
  selectgen_cmd()
    .args([
      "query",
      "cc-info",
      "out1, out2|static_lib1|object1, object2|., dir/subdir|system/dir|root.a|root.so",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("output_files: out1, out2"))
    .stdout(predicate::str::contains("cc_static_library_files: static_lib1"))
    .stdout(predicate::str::contains("cc_object_files: object1, object2"))
    .stdout(predicate::str::contains("includes: ., dir/subdir"))
    .stdout(predicate::str::contains("root_dynamic_libraries: root.so"));
}

#[test]
fn cc_info_json() {
  let output = selectgen_cmd()
    .args(["query", "cc-info", "out.a||obj.o||||", "--output", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(info["output_files"], serde_json::json!(["out.a"]));
  assert_eq!(info["cc_object_files"], serde_json::json!(["obj.o"]));
  assert_eq!(info["includes"], serde_json::json!([]));
}

#[test]
fn empty_reply_is_an_empty_record() {
  let output = selectgen_cmd().args(["query", "cc-info", "", "-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  for field in ["output_files", "system_includes", "root_static_archives"] {
    assert_eq!(info[field], serde_json::json!([]), "{}", field);
  }
}

#[test]
fn too_many_fields_fail() {
  selectgen_cmd()
    .args(["query", "output-files", "a|b"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to parse getOutputFiles reply"))
    .stderr(predicate::str::contains(r#"expected 1 items, got ["a", "b"]"#));
}
