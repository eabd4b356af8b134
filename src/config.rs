//! Compiler configuration, loaded from an optional `jackc.toml`.
//!
//! A downstream VM that renamed its OS classes would otherwise force a
//! compiler fork just to change four call targets; instead those names are
//! configurable here, with CLI flags taking precedence over the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CompileError, CompileResult};

/// Names of the OS subroutines the engine emits `call` instructions against.
/// None of these are implemented by this crate - see the crate-level docs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsNames {
    pub math_multiply: String,
    pub math_divide: String,
    pub memory_alloc: String,
    pub string_new: String,
    pub string_append_char: String,
}

impl Default for OsNames {
    fn default() -> Self {
        OsNames {
            math_multiply: "Math.multiply".to_string(),
            math_divide: "Math.divide".to_string(),
            memory_alloc: "Memory.alloc".to_string(),
            string_new: "String.new".to_string(),
            string_append_char: "String.appendChar".to_string(),
        }
    }
}

/// Resolved compiler configuration for one run of the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Where to write `.vm` (and, if enabled, `.xml`) output. `None` means
    /// alongside each input file.
    pub output_dir: Option<PathBuf>,
    pub emit_xml: bool,
    pub os_names: OsNames,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            output_dir: None,
            emit_xml: false,
            os_names: OsNames::default(),
        }
    }
}

/// On-disk shape of `jackc.toml`. Every field is optional; absent fields
/// fall back to [`CompilerConfig::default`].
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    output_dir: Option<PathBuf>,
    emit_xml: Option<bool>,
    os_names: Option<OsNamesFile>,
}

#[derive(Debug, Default, Deserialize)]
struct OsNamesFile {
    math_multiply: Option<String>,
    math_divide: Option<String>,
    memory_alloc: Option<String>,
    string_new: Option<String>,
    string_append_char: Option<String>,
}

impl CompilerConfig {
    pub fn from_file(path: &Path) -> CompileResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&text).map_err(|e| CompileError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
        })?;

        let mut config = CompilerConfig::default();
        if let Some(dir) = file.output_dir {
            config.output_dir = Some(dir);
        }
        if let Some(emit_xml) = file.emit_xml {
            config.emit_xml = emit_xml;
        }
        if let Some(names) = file.os_names {
            if let Some(v) = names.math_multiply {
                config.os_names.math_multiply = v;
            }
            if let Some(v) = names.math_divide {
                config.os_names.math_divide = v;
            }
            if let Some(v) = names.memory_alloc {
                config.os_names.memory_alloc = v;
            }
            if let Some(v) = names.string_new {
                config.os_names.string_new = v;
            }
            if let Some(v) = names.string_append_char {
                config.os_names.string_append_char = v;
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_os_names_match_the_spec() {
        let names = OsNames::default();
        assert_eq!(names.math_multiply, "Math.multiply");
        assert_eq!(names.string_append_char, "String.appendChar");
    }

    #[test]
    fn parses_partial_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jackc.toml");
        std::fs::write(&path, "emit_xml = true\n[os_names]\nmemory_alloc = \"Sys.alloc\"\n")
            .unwrap();

        let config = CompilerConfig::from_file(&path).unwrap();
        assert!(config.emit_xml);
        assert_eq!(config.os_names.memory_alloc, "Sys.alloc");
        assert_eq!(config.os_names.math_multiply, "Math.multiply");
    }
}
