//! Stateless VM instruction emitter.
//!
//! Every method writes exactly one LF-terminated line to the underlying
//! sink. This module has no knowledge of the grammar or the symbol table; it
//! only knows how to format the eight VM segments and the arithmetic/branch/
//! call instruction shapes.

use std::io::{self, Write};

use crate::config::OsNames;
use crate::grammar::{binary_opcode, unary_opcode, BinaryOpCode};

/// Error writing to the underlying sink is the only failure mode.
pub struct VmWriter<W: Write> {
    out: W,
    os_names: OsNames,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        Self::with_os_names(out, OsNames::default())
    }

    pub fn with_os_names(out: W, os_names: OsNames) -> Self {
        VmWriter { out, os_names }
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    pub fn write_push(&mut self, segment: &str, index: usize) -> io::Result<()> {
        self.line(&format!("push {segment} {index}"))
    }

    /// Emits `pop <segment> <index>`. `constant` is not a valid pop target;
    /// callers (the engine) never construct one, so this takes the segment
    /// on faith rather than re-validating it here.
    pub fn write_pop(&mut self, segment: &str, index: usize) -> io::Result<()> {
        debug_assert_ne!(segment, "constant", "cannot pop into constant segment");
        self.line(&format!("pop {segment} {index}"))
    }

    pub fn write_binary(&mut self, op: char) -> io::Result<()> {
        match binary_opcode(op) {
            Some(BinaryOpCode::Arithmetic(instr)) => self.line(instr),
            Some(BinaryOpCode::MathCall(which)) => {
                let name = match which {
                    "multiply" => self.os_names.math_multiply.clone(),
                    "divide" => self.os_names.math_divide.clone(),
                    _ => unreachable!(),
                };
                self.write_call(&name, 2)
            }
            None => panic!("not a binary operator: {op}"),
        }
    }

    pub fn os_names(&self) -> &OsNames {
        &self.os_names
    }

    pub fn write_unary(&mut self, op: char) -> io::Result<()> {
        let instr = unary_opcode(op).unwrap_or_else(|| panic!("not a unary operator: {op}"));
        self.line(instr)
    }

    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        self.line(&format!("label {label}"))
    }

    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        self.line(&format!("goto {label}"))
    }

    pub fn write_if_goto(&mut self, label: &str) -> io::Result<()> {
        self.line(&format!("if-goto {label}"))
    }

    pub fn write_call(&mut self, name: &str, n_args: usize) -> io::Result<()> {
        self.line(&format!("call {name} {n_args}"))
    }

    pub fn write_function(&mut self, name: &str, n_locals: usize) -> io::Result<()> {
        self.line(&format!("function {name} {n_locals}"))
    }

    /// `return;` in Jack always compiles to a VM `return`, but a void
    /// subroutine must push a dummy value first since VM `return` always
    /// hands one value back to the caller.
    pub fn write_return(&mut self, void: bool) -> io::Result<()> {
        if void {
            self.write_push("constant", 0)?;
        }
        self.line("return")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(f: impl FnOnce(&mut VmWriter<Vec<u8>>) -> io::Result<()>) -> String {
        let mut w = VmWriter::new(Vec::new());
        f(&mut w).unwrap();
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn push_pop_format() {
        assert_eq!(rendered(|w| w.write_push("local", 3)), "push local 3\n");
        assert_eq!(rendered(|w| w.write_pop("argument", 0)), "pop argument 0\n");
    }

    #[test]
    fn multiply_and_divide_lower_to_math_calls() {
        assert_eq!(rendered(|w| w.write_binary('*')), "call Math.multiply 2\n");
        assert_eq!(rendered(|w| w.write_binary('/')), "call Math.divide 2\n");
    }

    #[test]
    fn void_return_pushes_constant_zero_first() {
        assert_eq!(rendered(|w| w.write_return(true)), "push constant 0\nreturn\n");
    }

    #[test]
    fn non_void_return_is_bare() {
        assert_eq!(rendered(|w| w.write_return(false)), "return\n");
    }

    #[test]
    fn branch_instructions() {
        assert_eq!(rendered(|w| w.write_if_goto("IF_TRUE0")), "if-goto IF_TRUE0\n");
        assert_eq!(rendered(|w| w.write_goto("WHILE_EXP0")), "goto WHILE_EXP0\n");
        assert_eq!(rendered(|w| w.write_label("IF_END0")), "label IF_END0\n");
    }
}
