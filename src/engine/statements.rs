//! `statements`, `letStatement`, `ifStatement`, `whileStatement`,
//! `doStatement`, `returnStatement`.

use std::io::Write;

use crate::error::CompileResult;

use super::Engine;

impl<W: Write, X: Write> Engine<W, X> {
    /// `statement*`
    pub(super) fn compile_statements(&mut self) -> CompileResult<()> {
        self.open_tag("statements")?;
        loop {
            if self.current_is_keyword("let") {
                self.compile_let()?;
            } else if self.current_is_keyword("if") {
                self.compile_if()?;
            } else if self.current_is_keyword("while") {
                self.compile_while()?;
            } else if self.current_is_keyword("do") {
                self.compile_do()?;
            } else if self.current_is_keyword("return") {
                self.compile_return()?;
            } else {
                break;
            }
        }
        self.close_tag()?;
        Ok(())
    }

    /// `'let' varName ('[' expression ']')? '=' expression ';'`
    ///
    /// The array form evaluates the index, stashes the computed base+offset
    /// address in `that` via the `pointer`/`temp` shuffle, evaluates the RHS
    /// last (so a subroutine call in the RHS can't clobber the saved
    /// address), then completes the indirect store.
    fn compile_let(&mut self) -> CompileResult<()> {
        self.open_tag("letStatement")?;
        self.eat_keyword("let")?;
        let tok = self.current_identifier()?;
        self.annotate_var_use(&tok)?;
        self.tokenizer.advance()?;

        let is_array = self.current_is_symbol('[');
        if is_array {
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
        }

        self.eat_symbol('=')?;
        self.compile_expression()?;
        self.eat_symbol(';')?;

        if is_array {
            self.vm(|w| w.write_pop("temp", 0))?;
            self.vm(|w| w.write_pop("pointer", 1))?;
            self.vm(|w| w.write_push("temp", 0))?;
            self.vm(|w| w.write_pop("that", 0))?;
        } else {
            let segment = self
                .symbols
                .segment_of(&tok.lexeme)
                .ok_or_else(|| self.semantic_err(format!("undeclared identifier '{}'", tok.lexeme)))?;
            let index = self.symbols.index_of(&tok.lexeme).expect("segment_of succeeded");
            self.vm(|w| w.write_pop(segment, index))?;
        }

        self.close_tag()?;
        Ok(())
    }

    /// `'if' '(' expression ')' '{' statements '}' ('else' '{' statements '}')?`
    ///
    /// Three labels, not two: the truth value is dispatched with
    /// `if-goto T; goto F; label T`, so the then-branch needs no negation of
    /// its own - only an absent else clause can collapse to skip `IF_END`.
    fn compile_if(&mut self) -> CompileResult<()> {
        self.open_tag("ifStatement")?;
        let label_id = self.next_if_label();
        let l_true = format!("IF_TRUE{label_id}");
        let l_false = format!("IF_FALSE{label_id}");
        let l_end = format!("IF_END{label_id}");

        self.eat_keyword("if")?;
        self.eat_symbol('(')?;
        self.compile_expression()?;
        self.eat_symbol(')')?;

        self.vm(|w| w.write_if_goto(&l_true))?;
        self.vm(|w| w.write_goto(&l_false))?;
        self.vm(|w| w.write_label(&l_true))?;

        self.eat_symbol('{')?;
        self.compile_statements()?;
        self.eat_symbol('}')?;

        let has_else = self.current_is_keyword("else");
        if has_else {
            self.vm(|w| w.write_goto(&l_end))?;
        }
        self.vm(|w| w.write_label(&l_false))?;

        if has_else {
            self.eat_keyword("else")?;
            self.eat_symbol('{')?;
            self.compile_statements()?;
            self.eat_symbol('}')?;
            self.vm(|w| w.write_label(&l_end))?;
        }

        self.close_tag()?;
        Ok(())
    }

    /// `'while' '(' expression ')' '{' statements '}'`
    fn compile_while(&mut self) -> CompileResult<()> {
        self.open_tag("whileStatement")?;
        let label_id = self.next_while_label();
        let l_exp = format!("WHILE_EXP{label_id}");
        let l_end = format!("WHILE_END{label_id}");

        self.vm(|w| w.write_label(&l_exp))?;
        self.eat_keyword("while")?;
        self.eat_symbol('(')?;
        self.compile_expression()?;
        self.eat_symbol(')')?;

        self.vm(|w| w.write_unary('~'))?;
        self.vm(|w| w.write_if_goto(&l_end))?;

        self.eat_symbol('{')?;
        self.compile_statements()?;
        self.eat_symbol('}')?;

        self.vm(|w| w.write_goto(&l_exp))?;
        self.vm(|w| w.write_label(&l_end))?;

        self.close_tag()?;
        Ok(())
    }

    /// `'do' subroutineCall ';'`
    ///
    /// The call's return value is always discarded, even for a `void`
    /// subroutine, which is why every call leaves exactly one value on the
    /// stack that a plain `do` pops into `temp 0`.
    fn compile_do(&mut self) -> CompileResult<()> {
        self.open_tag("doStatement")?;
        self.eat_keyword("do")?;
        self.compile_subroutine_call()?;
        self.eat_symbol(';')?;
        self.vm(|w| w.write_pop("temp", 0))?;
        self.close_tag()?;
        Ok(())
    }

    /// `'return' expression? ';'`
    fn compile_return(&mut self) -> CompileResult<()> {
        self.open_tag("returnStatement")?;
        self.eat_keyword("return")?;

        let void = self.current_is_symbol(';');
        if !void {
            self.compile_expression()?;
        }
        self.eat_symbol(';')?;
        self.vm(|w| w.write_return(void))?;

        self.close_tag()?;
        Ok(())
    }
}
