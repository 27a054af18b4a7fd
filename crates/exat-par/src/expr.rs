//! Operand, argument, assignment, and condition parsing.

use exat_asm::{Instr, Value};

use crate::ast::Cond;
use crate::error::{Context, ParseError};
use crate::Parser;

impl Parser {
    /// Parses operands until end of line or start of a trailing comment.
    ///
    /// `want` enforces a fixed arity; `None` accepts any count (used for
    /// comment bodies).
    pub(crate) fn parse_arguments(&mut self, want: Option<usize>) -> Result<Vec<Value>, ParseError> {
        let mut args = Vec::new();
        while !self.is_eol() && !self.is_start_of_comment() {
            let token = self
                .expect_not_empty()
                .context("error parsing argument")?;
            args.push(Value::literal(token.value));
        }
        if let Some(want) = want {
            if args.len() != want {
                return Err(ParseError::ArgCount {
                    want,
                    got: args.len(),
                });
            }
        }
        Ok(args)
    }

    /// Parses a single operand.
    pub(crate) fn parse_value(&mut self) -> Result<Value, ParseError> {
        let token = self.expect_not_empty().context("error parsing value")?;
        Ok(Value::literal(token.value))
    }

    /// Parses a single operator.
    pub(crate) fn parse_operator(&mut self) -> Result<Value, ParseError> {
        let token = self.expect_not_empty().context("error parsing value")?;
        Ok(Value::operator(token.value))
    }

    /// Parses `to = left [op right]`.
    ///
    /// Without an operator this is a plain copy. With one, the infix form
    /// maps onto the three-argument arithmetic instructions.
    pub(crate) fn parse_assign_expr(&mut self) -> Result<Instr, ParseError> {
        let to = self
            .parse_value()
            .context("error parsing assign register")?;
        self.expect("=")?;
        let left = self.parse_value().context("error parsing assign value")?;

        if self.is_eol() {
            return Ok(Instr::new("COPY", vec![left, to]));
        }

        let op = self
            .parse_operator()
            .context("error parsing assign operator")?;

        // "X = RAND 1 10" puts the mnemonic in operand position.
        let (op, left) = if left.text == "RAND" {
            (left, op)
        } else {
            (op, left)
        };

        let mnemonic = match op.text.as_str() {
            "+" => "ADDI".to_string(),
            "-" => "SUBI".to_string(),
            "*" => "MULI".to_string(),
            "/" => "DIVI".to_string(),
            "%" => "MODI".to_string(),
            "SWIZ" | "RAND" => op.text.clone(),
            _ => return Err(ParseError::InvalidOperator(op.text)),
        };

        let right = self
            .parse_value()
            .context("error parsing assign operand")?;
        Ok(Instr::new(mnemonic, vec![left, right, to]))
    }

    /// Parses `to op= right` compound assignment.
    pub(crate) fn parse_short_assign_expr(&mut self) -> Result<Instr, ParseError> {
        let to = self
            .parse_value()
            .context("error parsing short assign register")?;
        let op = self
            .parse_operator()
            .context("error parsing short assign operator")?;

        let mnemonic = match op.text.as_str() {
            "+=" => "ADDI",
            "-=" => "SUBI",
            "*=" => "MULI",
            "/=" => "DIVI",
            "%=" => "MODI",
            _ => return Err(ParseError::InvalidOperator(op.text)),
        };

        let right = self
            .parse_value()
            .context("error parsing short assign value")?;
        Ok(Instr::new(mnemonic, vec![to.clone(), right, to]))
    }

    /// Parses a condition: `[NOT] left [op right]`.
    pub(crate) fn parse_cond_expr(&mut self) -> Result<Cond, ParseError> {
        let mut negate = false;
        if self.current().value == "NOT" {
            self.expect("NOT")?;
            negate = true;
        }

        let left = self.parse_value().context("error parsing left operand")?;

        // Unary forms reading hardware state directly.
        if left.text == "EOF" || left.text == "MRD" {
            return Ok(Cond {
                test: Some(Instr::new("TEST", vec![left])),
                negate,
            });
        }
        // ISTRUE/ISFALSE trust the T register as-is; no test is emitted.
        if left.text == "ISTRUE" {
            return Ok(Cond { test: None, negate });
        }
        if left.text == "ISFALSE" {
            return Ok(Cond {
                test: None,
                negate: !negate,
            });
        }

        let mut op = self.parse_operator().context("error parsing operator")?;
        let right = self.parse_value().context("error parsing right operand")?;

        // TEST only knows =, <, > in hardware; the richer comparisons
        // lower to the complementary test with a flipped branch sense.
        match op.text.as_str() {
            "=" | ">" | "<" => {}
            "!=" => {
                op.text = "=".to_string();
                negate = !negate;
            }
            ">=" => {
                op.text = "<".to_string();
                negate = !negate;
            }
            "<=" => {
                op.text = ">".to_string();
                negate = !negate;
            }
            _ => return Err(ParseError::InvalidOperator(op.text)),
        }

        Ok(Cond {
            test: Some(Instr::new("TEST", vec![left, op, right])),
            negate,
        })
    }
}
