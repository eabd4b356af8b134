//! Path resolution and per-file orchestration for the CLI.
//!
//! [`compile_path`] is the one entry point the binary calls: given a file or
//! a directory, it builds the worklist, drives an [`Engine`] over each
//! input, and writes `.vm` (and, if requested, `.xml`) output next to the
//! source or under the configured output directory.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::CompilerConfig;
use crate::engine::Engine;
use crate::error::{CompileError, CompileResult};

/// Outcome of compiling one `.jack` file.
#[derive(Debug)]
pub struct CompileUnitReport {
    pub input: PathBuf,
    pub result: Result<(), CompileError>,
}

/// Resolve `path` to a sorted worklist of `.jack` files. A single file must
/// already carry the `.jack` extension; a directory is scanned non-recursively.
fn worklist(path: &Path) -> CompileResult<Vec<PathBuf>> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)
            .map_err(|source| CompileError::Io { path: path.to_path_buf(), source })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jack"))
            .collect();
        files.sort();
        Ok(files)
    } else {
        if !matches!(path.extension(), Some(ext) if ext == "jack") {
            return Err(CompileError::BadExtension { path: path.to_path_buf() });
        }
        Ok(vec![path.to_path_buf()])
    }
}

fn output_path(input: &Path, config: &CompilerConfig, ext: &str) -> PathBuf {
    let file_name = input.with_extension(ext);
    match &config.output_dir {
        Some(dir) => dir.join(file_name.file_name().expect("input has a file name")),
        None => file_name,
    }
}

/// Compile a single `.jack` file, writing `.vm` (and, if `config.emit_xml`,
/// `.xml`) output. On any error, partially written output files are removed
/// rather than left truncated.
fn compile_file(input: &Path, config: &CompilerConfig) -> CompileResult<()> {
    tracing::info!(file = %input.display(), "compiling");

    let source = fs::read_to_string(input)
        .map_err(|source| CompileError::Io { path: input.to_path_buf(), source })?;

    let vm_path = output_path(input, config, "vm");
    let xml_path = config.emit_xml.then(|| output_path(input, config, "xml"));

    let result = compile_one(&source, input, config, &vm_path, xml_path.as_deref());
    if result.is_err() {
        let _ = fs::remove_file(&vm_path);
        if let Some(xml_path) = &xml_path {
            let _ = fs::remove_file(xml_path);
        }
    } else {
        tracing::info!(file = %input.display(), out = %vm_path.display(), "compiled");
    }
    result
}

fn compile_one(
    source: &str,
    input: &Path,
    config: &CompilerConfig,
    vm_path: &Path,
    xml_path: Option<&Path>,
) -> CompileResult<()> {
    let vm_out = fs::File::create(vm_path)
        .map_err(|source| CompileError::Io { path: vm_path.to_path_buf(), source })?;
    let xml_out = xml_path
        .map(|p| fs::File::create(p).map_err(|source| CompileError::Io { path: p.to_path_buf(), source }))
        .transpose()?;

    let mut engine = Engine::new(
        source,
        input,
        BufWriter::new(vm_out),
        xml_out.map(BufWriter::new),
        config.os_names.clone(),
    )?;
    engine.compile_class()?;
    let (vm, xml) = engine.into_writers();
    drop(vm);
    drop(xml);
    Ok(())
}

/// Compile every `.jack` file reachable from `path`, returning a report per
/// file in worklist order. Always returns `Ok` at the batch level - failures
/// are carried per-file in each [`CompileUnitReport`]; the caller decides the
/// process exit code (nonzero iff any report's `result` is `Err`).
pub fn compile_path(path: &Path, config: &CompilerConfig) -> CompileResult<Vec<CompileUnitReport>> {
    let files = worklist(path)?;
    Ok(files
        .into_iter()
        .map(|input| {
            let result = compile_file(&input, config);
            CompileUnitReport { input, result }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_jack(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn single_file_without_jack_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_jack(dir.path(), "Main.txt", "class Main {}");
        let err = compile_path(&path, &CompilerConfig::default()).unwrap_err();
        assert!(matches!(err, CompileError::BadExtension { .. }));
    }

    #[test]
    fn compiles_single_file_next_to_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_jack(dir.path(), "Main.jack", "class Main { function void run() { return; } }");
        let reports = compile_path(&path, &CompilerConfig::default()).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].result.is_ok());
        assert!(dir.path().join("Main.vm").exists());
    }

    #[test]
    fn directory_worklist_is_sorted_and_non_recursive() {
        let dir = tempfile::tempdir().unwrap();
        write_jack(dir.path(), "Zeta.jack", "class Zeta { function void run() { return; } }");
        write_jack(dir.path(), "Alpha.jack", "class Alpha { function void run() { return; } }");
        fs::create_dir(dir.path().join("sub")).unwrap();
        write_jack(&dir.path().join("sub"), "Nested.jack", "class Nested {}");

        let reports = compile_path(dir.path(), &CompilerConfig::default()).unwrap();
        let names: Vec<_> = reports.iter().map(|r| r.input.file_name().unwrap().to_str().unwrap().to_string()).collect();
        assert_eq!(names, vec!["Alpha.jack", "Zeta.jack"]);
    }

    #[test]
    fn failed_compilation_leaves_no_partial_vm_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_jack(dir.path(), "Broken.jack", "class Broken { function void run() { let } }");
        let reports = compile_path(&path, &CompilerConfig::default()).unwrap();
        assert!(reports[0].result.is_err());
        assert!(!dir.path().join("Broken.vm").exists());
    }

    #[test]
    fn emit_xml_writes_sibling_xml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_jack(dir.path(), "Main.jack", "class Main { function void run() { return; } }");
        let config = CompilerConfig { emit_xml: true, ..CompilerConfig::default() };
        let reports = compile_path(&path, &config).unwrap();
        assert!(reports[0].result.is_ok());
        assert!(dir.path().join("Main.xml").exists());
    }
}
