//! Structured statement parsing: `IF`, `WHILE`, `DO`, `BREAK`,
//! `CONTINUE`.

use exat_asm::{Instr, Value};

use crate::ast::{Cond, Do, If, While};
use crate::error::{Context, ParseError};
use crate::Parser;

impl Parser {
    /// Parses `IF cond … [ELSE IF cond …]* [ELSE …] END`.
    pub(crate) fn parse_if_expr(&mut self) -> Result<If, ParseError> {
        let label = self.next_label("IF");

        self.expect("IF")?;
        let cond = self.parse_cond_expr().context("error parsing condition")?;
        self.expect("EOL")?;
        let body = self.parse_body().context("error parsing body")?;

        let mut else_if = Vec::new();
        while self.current().value == "ELSE" && self.peek_value() == "IF" {
            else_if.push(
                self.parse_else_if_expr()
                    .context("error parsing ELSE IF clause")?,
            );
        }

        let mut else_body = Vec::new();
        if self.current().value == "ELSE" {
            self.expect("ELSE")?;
            self.expect("EOL")?;
            else_body = self.parse_body().context("error parsing ELSE clause")?;
        }

        self.expect("END")?;

        Ok(If {
            label,
            cond,
            body,
            else_if,
            else_body,
        })
    }

    /// Parses one `ELSE IF cond …` clause of an `IF` chain.
    pub(crate) fn parse_else_if_expr(&mut self) -> Result<If, ParseError> {
        let label = self.next_label("ELSEIF");

        self.expect("ELSE")?;
        self.expect("IF")?;
        let cond = self.parse_cond_expr().context("error parsing condition")?;
        self.expect("EOL")?;
        let body = self.parse_body().context("error parsing body")?;

        Ok(If {
            label,
            cond,
            body,
            else_if: Vec::new(),
            else_body: Vec::new(),
        })
    }

    /// Parses `WHILE [cond] … LOOP`. The loop label is pushed for
    /// `BREAK`/`CONTINUE` before the body is parsed.
    pub(crate) fn parse_while_expr(&mut self) -> Result<While, ParseError> {
        let label = self.next_label("WHILE");
        self.label_stack.push(label.clone());

        self.expect("WHILE")?;

        let mut endless = true;
        let mut cond = Cond::default();
        if !self.is_eol() && !self.is_start_of_comment() {
            endless = false;
            cond = self.parse_cond_expr().context("error parsing condition")?;
        }

        self.expect("EOL")?;
        let body = self.parse_body().context("error parsing body")?;
        self.expect("LOOP")?;

        Ok(While {
            label,
            cond,
            body,
            endless,
        })
    }

    /// Parses `DO … LOOP [WHILE cond]`. The loop label is pushed for
    /// `BREAK`/`CONTINUE` before the body is parsed.
    pub(crate) fn parse_do_expr(&mut self) -> Result<Do, ParseError> {
        let label = self.next_label("DO");
        self.label_stack.push(label.clone());

        self.expect("DO")?;
        self.expect("EOL")?;
        let body = self.parse_body().context("error parsing body")?;
        self.expect("LOOP")?;

        let mut endless = true;
        let mut cond = Cond::default();
        if self.current().value == "WHILE" {
            endless = false;
            self.expect("WHILE")?;
            cond = self.parse_cond_expr().context("error parsing condition")?;
        }

        Ok(Do {
            label,
            cond,
            body,
            endless,
        })
    }

    /// Parses `BREAK [IFTRUE|IFFALSE]` into a jump to the enclosing
    /// loop's end label.
    ///
    /// BREAK consumes the label from the stack rather than peeking it.
    pub(crate) fn parse_break(&mut self) -> Result<Instr, ParseError> {
        let token = self.pop()?;
        let Some(label) = self.label_stack.pop() else {
            return Err(ParseError::BreakOutsideLoop(token.line));
        };

        let target = Value::literal(format!("{label}_END"));
        let jump = self.parse_jump_suffix()?;

        let mut instr = Instr::new(jump, vec![target]);
        instr.comment = vec![Value::literal("BREAK")];
        Ok(instr)
    }

    /// Parses `CONTINUE [IFTRUE|IFFALSE]` into a jump back to the
    /// enclosing loop's head label.
    pub(crate) fn parse_continue(&mut self) -> Result<Instr, ParseError> {
        let token = self.pop()?;
        let Some(label) = self.label_stack.last() else {
            return Err(ParseError::ContinueOutsideLoop(token.line));
        };

        let target = Value::literal(label.clone());
        let jump = self.parse_jump_suffix()?;

        let mut instr = Instr::new(jump, vec![target]);
        instr.comment = vec![Value::literal("CONTINUE")];
        Ok(instr)
    }

    /// Maps an optional `IFTRUE`/`IFFALSE` suffix to the jump mnemonic.
    fn parse_jump_suffix(&mut self) -> Result<&'static str, ParseError> {
        if self.current().value == "IFTRUE" {
            self.expect("IFTRUE")?;
            Ok("TJMP")
        } else if self.current().value == "IFFALSE" {
            self.expect("IFFALSE")?;
            Ok("FJMP")
        } else {
            Ok("JUMP")
        }
    }
}
