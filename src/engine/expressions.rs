//! `expression`, `term`, `subroutineCall`, `expressionList`.

use std::io::Write;

use crate::error::CompileResult;
use crate::grammar::{BINARY_OPS, UNARY_OPS};

use super::Engine;

/// A literal control character inside a string constant is re-expressed as
/// its two-character escape text before `String.new`/`String.appendChar`
/// calls are emitted, matching what the reference compiler's string
/// constant handling does with raw tab/newline/carriage-return bytes.
fn correct_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

impl<W: Write, X: Write> Engine<W, X> {
    /// `term (op term)*`, compiled strictly left to right: Jack has no
    /// operator precedence, so each `op term` pair emits its binary
    /// instruction immediately after the second operand.
    pub(super) fn compile_expression(&mut self) -> CompileResult<()> {
        self.open_tag("expression")?;
        self.compile_term()?;
        while let Some(&op) = self.current_symbol_char().filter(|c| BINARY_OPS.contains(c)).as_ref() {
            self.eat_symbol(op)?;
            self.compile_term()?;
            self.vm(|w| w.write_binary(op))?;
        }
        self.close_tag()?;
        Ok(())
    }

    fn current_symbol_char(&self) -> Option<char> {
        match self.tokenizer.current() {
            Some(t) if t.kind == crate::token::TokenKind::Symbol => t.lexeme.chars().next(),
            _ => None,
        }
    }

    /// Disambiguates entirely on the current token (and, for identifiers,
    /// one token of lookahead): `(expr)`, `unaryOp term`, the three literal
    /// kinds, a keyword constant, a bare variable, an array read, or a
    /// subroutine call.
    fn compile_term(&mut self) -> CompileResult<()> {
        self.open_tag("term")?;

        if self.current_is_symbol('(') {
            self.eat_symbol('(')?;
            self.compile_expression()?;
            self.eat_symbol(')')?;
        } else if let Some(op) = self.current_symbol_char().filter(|c| UNARY_OPS.contains(c)) {
            self.eat_any_symbol()?;
            self.compile_term()?;
            self.vm(|w| w.write_unary(op))?;
        } else if self.tokenizer.token_type()? == crate::token::TokenKind::IntegerConstant {
            let value = self.tokenizer.int_val()?;
            self.xml_terminal()?;
            self.tokenizer.advance()?;
            self.vm(|w| w.write_push("constant", value as usize))?;
        } else if self.tokenizer.token_type()? == crate::token::TokenKind::StringConstant {
            let text = self.tokenizer.string_val()?.to_string();
            self.xml_terminal()?;
            self.tokenizer.advance()?;
            self.compile_string_constant(&text)?;
        } else if self.current_is_keyword("true")
            || self.current_is_keyword("false")
            || self.current_is_keyword("null")
            || self.current_is_keyword("this")
        {
            let which = self.eat_one_of_keywords(&["true", "false", "null", "this"])?;
            match which.as_str() {
                "true" => {
                    self.vm(|w| w.write_push("constant", 0))?;
                    self.vm(|w| w.write_unary('~'))?;
                }
                "false" | "null" => {
                    self.vm(|w| w.write_push("constant", 0))?;
                }
                "this" => {
                    self.vm(|w| w.write_push("pointer", 0))?;
                }
                _ => unreachable!(),
            }
        } else {
            let tok = self.current_identifier()?;
            match self.tokenizer.lookahead() {
                "[" => {
                    self.annotate_var_use(&tok)?;
                    self.tokenizer.advance()?;
                    let segment = self
                        .symbols
                        .segment_of(&tok.lexeme)
                        .ok_or_else(|| self.semantic_err(format!("undeclared identifier '{}'", tok.lexeme)))?;
                    let index = self.symbols.index_of(&tok.lexeme).expect("segment_of succeeded");
                    self.vm(|w| w.write_push(segment, index))?;

                    self.eat_symbol('[')?;
                    self.compile_expression()?;
                    self.eat_symbol(']')?;

                    self.vm(|w| w.write_binary('+'))?;
                    self.vm(|w| w.write_pop("pointer", 1))?;
                    self.vm(|w| w.write_push("that", 0))?;
                }
                "(" | "." => {
                    self.compile_subroutine_call()?;
                }
                _ => {
                    self.annotate_var_use(&tok)?;
                    self.tokenizer.advance()?;
                    let segment = self
                        .symbols
                        .segment_of(&tok.lexeme)
                        .ok_or_else(|| self.semantic_err(format!("undeclared identifier '{}'", tok.lexeme)))?;
                    let index = self.symbols.index_of(&tok.lexeme).expect("segment_of succeeded");
                    self.vm(|w| w.write_push(segment, index))?;
                }
            }
        }

        self.close_tag()?;
        Ok(())
    }

    fn compile_string_constant(&mut self, text: &str) -> CompileResult<()> {
        let corrected = correct_string(text);
        self.vm(|w| w.write_push("constant", corrected.chars().count()))?;
        let new_name = self.vm.os_names().string_new.clone();
        self.vm(|w| w.write_call(&new_name, 1))?;
        let append_name = self.vm.os_names().string_append_char.clone();
        for ch in corrected.chars() {
            self.vm(|w| w.write_push("constant", ch as usize))?;
            self.vm(|w| w.write_call(&append_name, 2))?;
        }
        Ok(())
    }

    /// `subroutineName '(' expressionList ')' | (className|varName) '.'
    /// subroutineName '(' expressionList ')'`
    ///
    /// Three call shapes, distinguished by whether the leading identifier
    /// names a known variable (method call on that object), or is absent a
    /// `.` entirely (method call on `this`, within the same class), or
    /// names another class (a `function`/`constructor` call with no
    /// implicit receiver).
    pub(super) fn compile_subroutine_call(&mut self) -> CompileResult<()> {
        let tok = self.current_identifier()?;

        if self.tokenizer.lookahead() == "(" {
            let name = self.eat_subroutine_name("usage")?;
            self.eat_symbol('(')?;
            self.vm(|w| w.write_push("pointer", 0))?;
            let n_args = self.compile_expression_list()?;
            self.eat_symbol(')')?;
            let full_name = format!("{}.{name}", self.class_name);
            self.vm(|w| w.write_call(&full_name, n_args + 1))?;
            return Ok(());
        }

        if self.symbols.contains(&tok.lexeme) {
            self.annotate_var_use(&tok)?;
            self.tokenizer.advance()?;
            let segment = self.symbols.segment_of(&tok.lexeme).expect("contains succeeded");
            let index = self.symbols.index_of(&tok.lexeme).expect("contains succeeded");
            let ty = self.symbols.type_of(&tok.lexeme).expect("contains succeeded").to_string();

            self.eat_symbol('.')?;
            let sub = self.eat_subroutine_name("usage")?;
            self.eat_symbol('(')?;
            self.vm(|w| w.write_push(segment, index))?;
            let n_args = self.compile_expression_list()?;
            self.eat_symbol(')')?;
            let full_name = format!("{ty}.{sub}");
            self.vm(|w| w.write_call(&full_name, n_args + 1))?;
        } else {
            let class = self.eat_class_name_use()?;
            self.eat_symbol('.')?;
            let sub = self.eat_subroutine_name("usage")?;
            self.eat_symbol('(')?;
            let n_args = self.compile_expression_list()?;
            self.eat_symbol(')')?;
            let full_name = format!("{class}.{sub}");
            self.vm(|w| w.write_call(&full_name, n_args))?;
        }
        Ok(())
    }

    /// `(expression (',' expression)*)?`. Returns the argument count so the
    /// caller can compute the right `call` arity.
    fn compile_expression_list(&mut self) -> CompileResult<usize> {
        self.open_tag("expressionList")?;
        let mut count = 0;
        if !self.current_is_symbol(')') {
            self.compile_expression()?;
            count += 1;
            while self.current_is_symbol(',') {
                self.eat_symbol(',')?;
                self.compile_expression()?;
                count += 1;
            }
        }
        self.close_tag()?;
        Ok(count)
    }
}
