//! Recursive-descent parser + code generator.
//!
//! There is no AST: parsing and VM emission are interleaved in a single
//! top-down pass, driven from [`Engine::compile_class`]. Each `compile_*`
//! method consumes exactly the non-terminal it's named for and advances the
//! tokenizer past it, mirroring the grammar in the language specification.
//! The engine is a set of mutually recursive methods sharing this struct as
//! their context record: tokenizer, symbol table, VM writer, optional XML
//! writer, the class name under compilation, and the per-subroutine label
//! counters.
//!
//! Split across submodules by grammar area, matching the non-terminal
//! groupings in the spec:
//! - `class`: classVarDec, subroutineDec, parameterList, varDec, subroutineBody
//! - `statements`: let/if/while/do/return
//! - `expressions`: expression, term, subroutineCall, expressionList

mod class;
mod expressions;
mod statements;

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::OsNames;
use crate::error::{CompileError, CompileResult, Position};
use crate::symbol_table::SymbolTable;
use crate::token::Token;
use crate::tokenizer::Tokenizer;
use crate::vm_writer::VmWriter;
use crate::xml_writer::XmlWriter;

pub struct Engine<W: Write, X: Write> {
    file: PathBuf,
    tokenizer: Tokenizer,
    symbols: SymbolTable,
    vm: VmWriter<W>,
    xml: Option<XmlWriter<X>>,
    class_name: String,
    if_count: usize,
    while_count: usize,
}

impl<W: Write, X: Write> Engine<W, X> {
    pub fn new(
        source: &str,
        file: &Path,
        vm_out: W,
        xml_out: Option<X>,
        os_names: OsNames,
    ) -> CompileResult<Self> {
        let tokenizer = Tokenizer::new(source, file)?;
        Ok(Engine {
            file: file.to_path_buf(),
            tokenizer,
            symbols: SymbolTable::new(),
            vm: VmWriter::with_os_names(vm_out, os_names),
            xml: xml_out.map(XmlWriter::new),
            class_name: String::new(),
            if_count: 0,
            while_count: 0,
        })
    }

    pub fn into_writers(self) -> (W, Option<X>) {
        (self.vm.into_inner(), self.xml.map(|x| x.into_inner()))
    }

    // --- shared low-level helpers -------------------------------------

    fn pos(&self) -> Position {
        self.tokenizer.pos()
    }

    fn parse_err(&self, message: impl Into<String>) -> CompileError {
        CompileError::Parse {
            file: self.file.clone(),
            pos: self.pos(),
            message: message.into(),
        }
    }

    fn semantic_err(&self, message: impl Into<String>) -> CompileError {
        CompileError::Semantic {
            file: self.file.clone(),
            pos: self.pos(),
            message: message.into(),
        }
    }

    fn current_token(&self) -> CompileResult<Token> {
        self.tokenizer
            .current()
            .cloned()
            .ok_or_else(|| self.parse_err("unexpected end of input"))
    }

    fn xml_terminal(&mut self) -> CompileResult<()> {
        let result = if let (Some(xml), Some(tok)) = (self.xml.as_mut(), self.tokenizer.current())
        {
            xml.terminal(tok)
        } else {
            Ok(())
        };
        self.io(result)
    }

    fn open_tag(&mut self, tag: &'static str) -> CompileResult<()> {
        let result = if let Some(xml) = self.xml.as_mut() {
            xml.open(tag)
        } else {
            Ok(())
        };
        self.io(result)
    }

    fn close_tag(&mut self) -> CompileResult<()> {
        let result = if let Some(xml) = self.xml.as_mut() {
            xml.close()
        } else {
            Ok(())
        };
        self.io(result)
    }

    /// Consume the current token as a keyword matching `word`, emit it to
    /// the XML view, and advance.
    fn eat_keyword(&mut self, word: &str) -> CompileResult<()> {
        let tok = self.current_token()?;
        if !tok.is_keyword(word) {
            return Err(self.parse_err(format!("expected '{word}', got '{}'", tok.lexeme)));
        }
        self.xml_terminal()?;
        self.tokenizer.advance()?;
        Ok(())
    }

    /// Consume the current token as one of several allowed keywords,
    /// returning which one matched.
    fn eat_one_of_keywords(&mut self, words: &[&str]) -> CompileResult<String> {
        let tok = self.current_token()?;
        if !words.iter().any(|w| tok.is_keyword(w)) {
            return Err(self.parse_err(format!(
                "expected one of {words:?}, got '{}'",
                tok.lexeme
            )));
        }
        self.xml_terminal()?;
        self.tokenizer.advance()?;
        Ok(tok.lexeme)
    }

    fn eat_symbol(&mut self, c: char) -> CompileResult<()> {
        let tok = self.current_token()?;
        if !tok.is_symbol(c) {
            return Err(self.parse_err(format!("expected '{c}', got '{}'", tok.lexeme)));
        }
        self.xml_terminal()?;
        self.tokenizer.advance()?;
        Ok(())
    }

    fn eat_any_symbol(&mut self) -> CompileResult<char> {
        let c = self.tokenizer.symbol()?;
        self.xml_terminal()?;
        self.tokenizer.advance()?;
        Ok(c)
    }

    /// Lift an I/O failure from a writer into a [`CompileError::Io`] tagged
    /// with this compilation unit's source file.
    fn io<T>(&self, result: std::io::Result<T>) -> CompileResult<T> {
        result.map_err(|source| CompileError::Io {
            path: self.file.clone(),
            source,
        })
    }

    /// Run a VM-writer operation and lift any I/O failure.
    fn vm<T>(&mut self, f: impl FnOnce(&mut VmWriter<W>) -> std::io::Result<T>) -> CompileResult<T> {
        let result = f(&mut self.vm);
        self.io(result)
    }

    fn current_is_symbol(&self, c: char) -> bool {
        self.tokenizer.current().map(|t| t.is_symbol(c)).unwrap_or(false)
    }

    fn current_is_keyword(&self, word: &str) -> bool {
        self.tokenizer.current().map(|t| t.is_keyword(word)).unwrap_or(false)
    }

    /// `'int' | 'char' | 'boolean' | className`
    fn eat_type(&mut self) -> CompileResult<String> {
        let tok = self.current_token()?;
        if tok.is_keyword("int") || tok.is_keyword("char") || tok.is_keyword("boolean") {
            self.xml_terminal()?;
            self.tokenizer.advance()?;
            Ok(tok.lexeme)
        } else {
            self.eat_class_name_use()
        }
    }

    fn current_identifier(&self) -> CompileResult<Token> {
        let tok = self.current_token()?;
        if tok.kind != crate::token::TokenKind::Identifier {
            return Err(self.parse_err(format!("expected an identifier, got '{}'", tok.lexeme)));
        }
        Ok(tok)
    }

    fn eat_annotated_identifier(
        &mut self,
        category: &str,
        status: &str,
        segment_index: Option<(&str, usize)>,
    ) -> CompileResult<Token> {
        let tok = self.current_identifier()?;
        let result = if let Some(xml) = self.xml.as_mut() {
            xml.annotated_identifier(&tok, category, status, segment_index)
        } else {
            Ok(())
        };
        self.io(result)?;
        self.tokenizer.advance()?;
        Ok(tok)
    }

    fn eat_class_name_use(&mut self) -> CompileResult<String> {
        Ok(self.eat_annotated_identifier("class", "usage", None)?.lexeme)
    }

    fn eat_class_name_def(&mut self) -> CompileResult<String> {
        Ok(self.eat_annotated_identifier("class", "definition", None)?.lexeme)
    }

    fn eat_subroutine_name(&mut self, status: &'static str) -> CompileResult<String> {
        Ok(self.eat_annotated_identifier("subroutine", status, None)?.lexeme)
    }

    /// Define `name` as a fresh `kind`/`ty` binding and consume it from the
    /// token stream, annotating the XML view with the resulting segment and
    /// index. Used by classVarDec, parameterList, and varDec, which are the
    /// only three productions that introduce a new variable name.
    fn define_and_eat_var_name(&mut self, kind: crate::symbol_table::Kind, ty: &str) -> CompileResult<usize> {
        let tok = self.current_identifier()?;
        let index = self
            .symbols
            .define(&tok.lexeme, ty, kind)
            .ok_or_else(|| self.semantic_err(format!("'{}' is already defined in this scope", tok.lexeme)))?;
        let segment = kind.segment();
        let result = if let Some(xml) = self.xml.as_mut() {
            xml.annotated_identifier(&tok, "var", "definition", Some((segment, index)))
        } else {
            Ok(())
        };
        self.io(result)?;
        self.tokenizer.advance()?;
        Ok(index)
    }

    /// Resolve a variable-use identifier already consumed as `tok`, annotate
    /// it in the XML view with its resolved segment/index, and return its
    /// kind/type. Returns a semantic error if `name` is not bound in either
    /// scope - callers in subroutine-call position should check
    /// `self.symbols.contains(name)` themselves first and fall back to
    /// treating the identifier as a class name instead of calling this.
    fn annotate_var_use(&mut self, tok: &Token) -> CompileResult<()> {
        let name = &tok.lexeme;
        let kind = self
            .symbols
            .kind_of(name)
            .ok_or_else(|| self.semantic_err(format!("undeclared identifier '{name}'")))?;
        let index = self.symbols.index_of(name).expect("kind_of succeeded");
        let segment = kind.segment();
        let result = if let Some(xml) = self.xml.as_mut() {
            xml.annotated_identifier(tok, "var", "usage", Some((segment, index)))
        } else {
            Ok(())
        };
        self.io(result)
    }

    fn next_if_label(&mut self) -> usize {
        let id = self.if_count;
        self.if_count += 1;
        id
    }

    fn next_while_label(&mut self) -> usize {
        let id = self.while_count;
        self.while_count += 1;
        id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerConfig;
    use std::path::Path;

    fn compile(source: &str) -> String {
        crate::compile_source(source, Path::new("Test.jack"), &CompilerConfig::default()).unwrap()
    }

    #[test]
    fn identity_expression() {
        let vm = compile("class A { function void f() { return; } }");
        assert_eq!(vm, "function A.f 0\npush constant 0\nreturn\n");
    }

    #[test]
    fn constructor_allocates_and_returns_this() {
        let vm = compile("class P { field int x, y; constructor P new() { return this; } }");
        assert_eq!(
            vm,
            "function P.new 0\n\
             push constant 2\n\
             call Memory.alloc 1\n\
             pop pointer 0\n\
             push pointer 0\n\
             return\n"
        );
    }

    #[test]
    fn method_call_on_self_pushes_implicit_this() {
        let vm = compile(
            "class C { method void m() { do g(); return; } method void g() { return; } }",
        );
        assert!(vm.contains("push pointer 0\ncall C.g 1\npop temp 0\n"));
    }

    #[test]
    fn left_to_right_arithmetic_ignores_precedence() {
        let vm = compile("class A { function void f() { do f2(2+3*4); return; } function void f2(int x) { return; } }");
        assert!(vm.contains("push constant 2\npush constant 3\nadd\npush constant 4\ncall Math.multiply 2\n"));
    }

    #[test]
    fn while_with_unary_emits_double_not() {
        let vm = compile("class A { function void f(int x) { while (~x) { let x = 0; } return; } }");
        assert_eq!(
            vm,
            "function A.f 0\n\
             label WHILE_EXP0\n\
             push argument 0\n\
             not\n\
             not\n\
             if-goto WHILE_END0\n\
             push constant 0\n\
             pop argument 0\n\
             goto WHILE_EXP0\n\
             label WHILE_END0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn sibling_if_statements_get_independent_label_suffixes() {
        let vm = compile(
            "class A { function void f(boolean b) { if (b) { let b = false; } if (b) { let b = true; } return; } }",
        );
        assert!(vm.contains("IF_FALSE0"));
        assert!(vm.contains("IF_FALSE1"));
        assert!(!vm.contains("IF_FALSE2"));
    }

    #[test]
    fn if_else_dispatches_via_true_false_end_labels() {
        let vm = compile("class A { function void f(boolean b) { if (b) { let b = false; } else { let b = true; } return; } }");
        assert_eq!(
            vm,
            "function A.f 0\n\
             push argument 0\n\
             if-goto IF_TRUE0\n\
             goto IF_FALSE0\n\
             label IF_TRUE0\n\
             push constant 0\n\
             pop argument 0\n\
             goto IF_END0\n\
             label IF_FALSE0\n\
             push constant 0\n\
             not\n\
             pop argument 0\n\
             label IF_END0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn array_rvalue_ends_with_pointer_and_that() {
        let vm = compile(
            "class A { function void f(Array a, int i) { do f2(a[i]); return; } function void f2(int x) { return; } }",
        );
        assert!(vm.contains("pop pointer 1\npush that 0\n"));
    }

    #[test]
    fn array_assignment_with_nested_subscript() {
        let vm = compile(
            "class A { function void f(Array a, Array b, int i, int j) { let a[i] = b[j]; return; } }",
        );
        assert!(vm.contains(
            "push argument 0\n\
             push argument 2\n\
             add\n\
             push argument 1\n\
             push argument 3\n\
             add\n\
             pop pointer 1\n\
             push that 0\n\
             pop temp 0\n\
             pop pointer 1\n\
             push temp 0\n\
             pop that 0\n"
        ));
    }

    #[test]
    fn undeclared_identifier_is_a_semantic_error() {
        let err = crate::compile_source(
            "class A { function void f() { let x = 1; return; } }",
            Path::new("Test.jack"),
            &CompilerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::CompileError::Semantic { .. }));
    }

    #[test]
    fn string_constant_escapes_control_characters() {
        let vm = compile("class A { function void f() { do f2(\"a\tb\"); return; } function void f2(String s) { return; } }");
        assert!(vm.contains("push constant 4\ncall String.new 1"));
    }
}
