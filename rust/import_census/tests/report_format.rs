mod common;

use common::{write_target, FakeModule, ScriptedHost};
use import_census::report::{render, render_json, render_text, sections};
use import_census::{run_census, ReportFormat, TargetProgram};
use serde_json::Value;

fn census_report(
    dir: &std::path::Path,
) -> import_census::CensusReport<FakeModule> {
    let (path, module) = write_target(dir, "import os\nimport _json\n", None);
    let mut host = ScriptedHost::new(module)
        .loads_on_import("os", FakeModule::file("/usr/lib/python3/os.py"))
        .loads_on_import("_json", FakeModule::builtin())
        .loads_on_input("json", FakeModule::file("/usr/lib/python3/json/__init__.py"));
    host.user_supplies_input = true;
    let target = TargetProgram::from_path(&path, Vec::new()).expect("target");
    run_census(&mut host, &target).expect("census")
}

#[test]
fn text_report_lists_sections_in_order_with_sorted_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report = census_report(dir.path());
    let target = report.target.display_name();
    let text = render_text(&report);

    let expected = format!(
        "\n==== Essential base modules ====\n\n\
         builtins (builtin)\n\
         codecs /usr/lib/python3/codecs.py\n\
         marshal (builtin)\n\
         site /usr/lib/python3/site.py\n\
         sys (builtin)\n\
         \n==== Static imports by script {target} ====\n\n\
         _json (builtin)\n\
         os /usr/lib/python3/os.py\n\
         t {target}\n\
         \n==== Modules added by executing script {target} ====\n\n\
         json /usr/lib/python3/json/__init__.py\n"
    );
    assert_eq!(text, expected);
}

#[test]
fn builtin_modules_never_render_blank() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report = census_report(dir.path());
    for section in sections(&report) {
        for entry in section.entries {
            assert!(!entry.origin.to_string().is_empty(), "{} has a blank origin", entry.name);
            assert_eq!(entry.builtin, entry.origin.to_string() == "(builtin)");
        }
    }
}

#[test]
fn json_report_carries_the_same_populations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report = census_report(dir.path());
    let rendered = render_json(&report).expect("json");
    let value: Value = serde_json::from_str(&rendered).expect("parse json");

    let names = |key: &str| -> Vec<String> {
        value[key]
            .as_array()
            .expect("array")
            .iter()
            .map(|entry| entry["name"].as_str().expect("name").to_string())
            .collect()
    };
    assert_eq!(names("static_imports"), vec!["_json", "os", "t"]);
    assert_eq!(names("dynamic_imports"), vec!["json"]);
    assert_eq!(value["static_imports"][0]["origin"], Value::Null);
    assert_eq!(value["static_imports"][0]["builtin"], Value::Bool(true));
    assert_eq!(value["provenance"]["kind"], "source");
    assert_eq!(value["completion"]["kind"], "returned");
    assert_eq!(value["suppressed"], serde_json::json!(["functools", "importlib", "importlib.util"]));
}

#[test]
fn render_dispatches_on_format() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report = census_report(dir.path());
    let text = render(&report, ReportFormat::Text).expect("text");
    assert!(text.starts_with("\n==== Essential base modules ===="));
    let json = render(&report, ReportFormat::Json).expect("json");
    assert!(json.trim_start().starts_with('{'));
}
