//! Diagnostic XML view of the parse tree.
//!
//! Structurally parallel to [`crate::vm_writer::VmWriter`]: every
//! `compileXxx` in the engine that opens a non-terminal also opens a tag
//! here, and every terminal token gets written as a leaf. This is never
//! consumed by the VM - it exists for teaching/debugging and is only
//! produced when `--emit-xml` is passed.

use std::io::{self, Write};

use crate::token::{Token, TokenKind};

pub struct XmlWriter<W: Write> {
    out: W,
    stack: Vec<&'static str>,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        XmlWriter {
            out,
            stack: Vec::new(),
        }
    }

    fn indent(&mut self) -> io::Result<()> {
        for _ in 0..self.stack.len() {
            write!(self.out, "  ")?;
        }
        Ok(())
    }

    pub fn open(&mut self, tag: &'static str) -> io::Result<()> {
        self.indent()?;
        writeln!(self.out, "<{tag}>")?;
        self.stack.push(tag);
        Ok(())
    }

    pub fn close(&mut self) -> io::Result<()> {
        let tag = self.stack.pop().expect("close() without matching open()");
        self.indent()?;
        writeln!(self.out, "</{tag}>")
    }

    pub fn terminal(&mut self, token: &Token) -> io::Result<()> {
        self.indent()?;
        let tag = token.kind.xml_tag();
        writeln!(self.out, "<{0}> {1} </{0}>", tag, escape(&token.lexeme))
    }

    /// A token written with the identifier usage/definition annotation the
    /// original reference compiler produces (category, definition/usage,
    /// and - for locals - segment and index). VM code generation never
    /// reads this; it is purely descriptive.
    pub fn annotated_identifier(
        &mut self,
        token: &Token,
        category: &str,
        status: &str,
        segment_index: Option<(&str, usize)>,
    ) -> io::Result<()> {
        debug_assert_eq!(token.kind, TokenKind::Identifier);
        self.indent()?;
        let mut info = format!("{category} {status}");
        if let Some((segment, index)) = segment_index {
            info.push_str(&format!(" {segment} {index}"));
        }
        writeln!(
            self.out,
            "<identifier> [{info}] {} </identifier>",
            escape(&token.lexeme)
        )
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(escape("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn open_close_are_balanced_and_indented() {
        let mut w = XmlWriter::new(Vec::new());
        w.open("class").unwrap();
        w.terminal(&Token::new(TokenKind::Keyword, "class", 1, 1)).unwrap();
        w.close().unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(text, "<class>\n  <keyword> class </keyword>\n</class>\n");
    }

    #[test]
    fn annotated_identifier_carries_segment_and_index() {
        let mut w = XmlWriter::new(Vec::new());
        w.annotated_identifier(
            &Token::new(TokenKind::Identifier, "x", 1, 1),
            "var",
            "definition",
            Some(("local", 0)),
        )
        .unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(text, "<identifier> [var definition local 0] x </identifier>\n");
    }
}
