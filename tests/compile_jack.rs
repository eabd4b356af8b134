//! End-to-end CLI-level scenarios: batch compilation over a directory,
//! the `--emit-xml`-equivalent config flag, and the exit-code-relevant
//! partial-failure handling.

use std::fs;

use jackc::{compile_path, CompilerConfig};

fn write(dir: &std::path::Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn compiles_every_jack_file_in_a_directory_in_sorted_order() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Main.jack", "class Main { function void main() { do Util.run(); return; } }");
    write(dir.path(), "Util.jack", "class Util { function void run() { return; } }");

    let reports = compile_path(dir.path(), &CompilerConfig::default()).unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.result.is_ok()));

    let names: Vec<_> = reports.iter().map(|r| r.input.file_name().unwrap().to_str().unwrap()).collect();
    assert_eq!(names, vec!["Main.jack", "Util.jack"]);

    let main_vm = fs::read_to_string(dir.path().join("Main.vm")).unwrap();
    assert!(main_vm.contains("call Util.run 0"));
}

#[test]
fn one_bad_file_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Good.jack", "class Good { function void run() { return; } }");
    write(dir.path(), "Bad.jack", "class Bad { function void run() { let; } }");

    let reports = compile_path(dir.path(), &CompilerConfig::default()).unwrap();
    assert_eq!(reports.len(), 2);

    let good = reports.iter().find(|r| r.input.ends_with("Good.jack")).unwrap();
    let bad = reports.iter().find(|r| r.input.ends_with("Bad.jack")).unwrap();
    assert!(good.result.is_ok());
    assert!(bad.result.is_err());
    assert!(dir.path().join("Good.vm").exists());
    assert!(!dir.path().join("Bad.vm").exists());
}

#[test]
fn emit_xml_config_produces_a_parse_tree_next_to_the_vm_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Main.jack", "class Main { function void main() { return; } }");

    let config = CompilerConfig { emit_xml: true, ..CompilerConfig::default() };
    let reports = compile_path(dir.path(), &config).unwrap();
    assert!(reports[0].result.is_ok());

    let xml = fs::read_to_string(dir.path().join("Main.xml")).unwrap();
    assert!(xml.starts_with("<class>"));
    assert!(xml.contains("<keyword> class </keyword>"));
}

#[test]
fn output_dir_override_redirects_compiled_files() {
    let src_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write(src_dir.path(), "Main.jack", "class Main { function void main() { return; } }");

    let config = CompilerConfig {
        output_dir: Some(out_dir.path().to_path_buf()),
        ..CompilerConfig::default()
    };
    let reports = compile_path(src_dir.path(), &config).unwrap();
    assert!(reports[0].result.is_ok());
    assert!(out_dir.path().join("Main.vm").exists());
    assert!(!src_dir.path().join("Main.vm").exists());
}

#[test]
fn custom_os_names_from_config_file_are_honored() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Main.jack", "class Main { function void main() { do Util.run(1, 2); return; } }");
    write(dir.path(), "Util.jack", "class Util { function void run(int a, int b) { return; } }");
    let config_path = dir.path().join("jackc.toml");
    write(dir.path(), "jackc.toml", "[os_names]\nmemory_alloc = \"Sys.alloc\"\n");

    let config = CompilerConfig::from_file(&config_path).unwrap();
    let reports = compile_path(dir.path(), &config).unwrap();
    assert!(reports.iter().all(|r| r.result.is_ok()));

    let write_program = "class P { field int x; constructor P new() { return this; } }";
    write(dir.path(), "P.jack", write_program);
    let reports = compile_path(dir.path(), &config).unwrap();
    let p_report = reports.iter().find(|r| r.input.ends_with("P.jack")).unwrap();
    assert!(p_report.result.is_ok());
    let p_vm = fs::read_to_string(dir.path().join("P.vm")).unwrap();
    assert!(p_vm.contains("call Sys.alloc 1"));
}
