//! `class`, `classVarDec`, `subroutineDec`, `parameterList`, `subroutineBody`.

use std::io::Write;

use crate::symbol_table::Kind;

use super::Engine;

impl<W: Write, X: Write> Engine<W, X> {
    /// `'class' className '{' classVarDec* subroutineDec* '}'`
    ///
    /// Entry point for a single compilation unit. The class name is recorded
    /// for use as a call-target prefix by every subroutine inside it.
    pub fn compile_class(&mut self) -> crate::error::CompileResult<()> {
        self.open_tag("class")?;
        self.eat_keyword("class")?;
        self.class_name = self.eat_class_name_def()?;
        self.eat_symbol('{')?;

        while self.current_is_keyword("static") || self.current_is_keyword("field") {
            self.compile_class_var_dec()?;
        }
        while self.current_is_keyword("constructor")
            || self.current_is_keyword("function")
            || self.current_is_keyword("method")
        {
            self.compile_subroutine()?;
        }

        self.eat_symbol('}')?;
        self.close_tag()?;
        Ok(())
    }

    /// `('static' | 'field') type varName (',' varName)* ';'`
    fn compile_class_var_dec(&mut self) -> crate::error::CompileResult<()> {
        self.open_tag("classVarDec")?;
        let keyword = self.eat_one_of_keywords(&["static", "field"])?;
        let kind = if keyword == "static" { Kind::Static } else { Kind::Field };
        let ty = self.eat_type()?;

        self.define_and_eat_var_name(kind, &ty)?;
        while self.current_is_symbol(',') {
            self.eat_symbol(',')?;
            self.define_and_eat_var_name(kind, &ty)?;
        }
        self.eat_symbol(';')?;
        self.close_tag()?;
        Ok(())
    }

    /// `('constructor' | 'function' | 'method') ('void' | type) subroutineName
    /// '(' parameterList ')' subroutineBody`
    ///
    /// Resets both label counters and the subroutine scope of the symbol
    /// table. A `method` pre-binds `this` as `argument 0` before the
    /// parameter list is read, since the caller always passes the receiver
    /// as the first VM argument.
    fn compile_subroutine(&mut self) -> crate::error::CompileResult<()> {
        self.open_tag("subroutineDec")?;
        self.if_count = 0;
        self.while_count = 0;
        self.symbols.start_subroutine();

        let kind = self.eat_one_of_keywords(&["constructor", "function", "method"])?;
        if kind == "method" {
            self.symbols.define("this", &self.class_name.clone(), Kind::Arg);
        }

        if self.current_is_keyword("void") {
            self.eat_keyword("void")?;
        } else {
            self.eat_type()?;
        }
        let name = self.eat_subroutine_name("definition")?;

        self.eat_symbol('(')?;
        self.compile_parameter_list()?;
        self.eat_symbol(')')?;

        self.compile_subroutine_body(&kind, &name)?;
        self.close_tag()?;
        Ok(())
    }

    /// `((type varName) (',' type varName)*)?`
    fn compile_parameter_list(&mut self) -> crate::error::CompileResult<()> {
        self.open_tag("parameterList")?;
        if !self.current_is_symbol(')') {
            let ty = self.eat_type()?;
            self.define_and_eat_var_name(Kind::Arg, &ty)?;
            while self.current_is_symbol(',') {
                self.eat_symbol(',')?;
                let ty = self.eat_type()?;
                self.define_and_eat_var_name(Kind::Arg, &ty)?;
            }
        }
        self.close_tag()?;
        Ok(())
    }

    /// `'{' varDec* statements '}'`
    ///
    /// `function <Class>.<name> <nLocals>` can only be emitted once every
    /// local has been counted, so the VM header is written after the
    /// `varDec*` loop rather than before it.
    fn compile_subroutine_body(&mut self, kind: &str, name: &str) -> crate::error::CompileResult<()> {
        self.open_tag("subroutineBody")?;
        self.eat_symbol('{')?;

        while self.current_is_keyword("var") {
            self.compile_var_dec()?;
        }

        let n_locals = self.symbols.var_count(Kind::Var);
        let full_name = format!("{}.{}", self.class_name, name);
        self.vm(|w| w.write_function(&full_name, n_locals))?;

        match kind {
            "method" => {
                self.vm(|w| w.write_push("argument", 0))?;
                self.vm(|w| w.write_pop("pointer", 0))?;
            }
            "constructor" => {
                let n_fields = self.symbols.var_count(Kind::Field);
                self.vm(|w| w.write_push("constant", n_fields))?;
                let alloc = self.vm.os_names().memory_alloc.clone();
                self.vm(|w| w.write_call(&alloc, 1))?;
                self.vm(|w| w.write_pop("pointer", 0))?;
            }
            _ => {}
        }

        self.compile_statements()?;
        self.eat_symbol('}')?;
        self.close_tag()?;
        Ok(())
    }

    /// `'var' type varName (',' varName)* ';'`
    fn compile_var_dec(&mut self) -> crate::error::CompileResult<()> {
        self.open_tag("varDec")?;
        self.eat_keyword("var")?;
        let ty = self.eat_type()?;

        self.define_and_eat_var_name(Kind::Var, &ty)?;
        while self.current_is_symbol(',') {
            self.eat_symbol(',')?;
            self.define_and_eat_var_name(Kind::Var, &ty)?;
        }
        self.eat_symbol(';')?;
        self.close_tag()?;
        Ok(())
    }
}
