//! Jack Compiler Library
//!
//! Translates Jack source files into Nand2Tetris VM code. Compilation is a
//! single recursive-descent pass: there is no intermediate AST, and no
//! optimization or linking stage - each `.jack` file becomes exactly one
//! `.vm` file, one class per file, by construction of the language.
//!
//! # Compiling a single file
//!
//! ```rust,ignore
//! use jackc::{compile_source, CompilerConfig};
//!
//! let vm_code = compile_source(source, Path::new("Main.jack"), &CompilerConfig::default())?;
//! ```
//!
//! # Compiling a file or directory on disk
//!
//! The [`driver`] module handles path resolution (single file vs. directory
//! of `.jack` files) and output file placement; [`driver::compile_path`] is
//! what the CLI binary calls.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod symbol_table;
pub mod token;
pub mod tokenizer;
pub mod vm_writer;
pub mod xml_writer;

pub use config::{CompilerConfig, OsNames};
pub use driver::{compile_path, CompileUnitReport};
pub use engine::Engine;
pub use error::{CompileError, CompileResult, Position};

use std::path::Path;

/// Compile one class's source text to VM code, returning it as a string.
/// Does not touch the filesystem; callers that have `.jack` files on disk
/// should use [`driver::compile_path`] instead, which also handles output
/// placement and the optional XML diagnostic view.
pub fn compile_source(source: &str, file: &Path, config: &CompilerConfig) -> CompileResult<String> {
    let mut engine: Engine<Vec<u8>, Vec<u8>> =
        Engine::new(source, file, Vec::new(), None, config.os_names.clone())?;
    engine.compile_class()?;
    let (vm_bytes, _) = engine.into_writers();
    Ok(String::from_utf8(vm_bytes).expect("VmWriter only ever writes ASCII VM mnemonics"))
}

/// Compile one class's source text to both VM code and the diagnostic XML
/// parse-tree view.
pub fn compile_source_with_xml(
    source: &str,
    file: &Path,
    config: &CompilerConfig,
) -> CompileResult<(String, String)> {
    let mut engine: Engine<Vec<u8>, Vec<u8>> =
        Engine::new(source, file, Vec::new(), Some(Vec::new()), config.os_names.clone())?;
    engine.compile_class()?;
    let (vm_bytes, xml_bytes) = engine.into_writers();
    let vm = String::from_utf8(vm_bytes).expect("VmWriter only ever writes ASCII VM mnemonics");
    let xml = String::from_utf8(xml_bytes.expect("xml_out was Some")).expect("XmlWriter only ever writes escaped text");
    Ok((vm, xml))
}
