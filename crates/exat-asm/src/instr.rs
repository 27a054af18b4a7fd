//! Instruction and operand types, plus the text serializer.

use std::fmt;

use crate::mnemonic::is_comment_mnemonic;

/// What kind of lexeme an operand came from.
///
/// The transpiler passes operands through verbatim, so there is no finer
/// distinction (register vs. number vs. label) at this layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// A plain word: register, number, label, or hardware name.
    Literal,
    /// An infix or comparison operator.
    Operator,
}

/// A leaf operand of an instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Value {
    /// Lexeme classification.
    pub kind: ValueKind,
    /// The raw uppercased text.
    pub text: String,
}

impl Value {
    /// Creates a literal operand.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Literal,
            text: text.into(),
        }
    }

    /// Creates an operator operand.
    pub fn operator(text: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Operator,
            text: text.into(),
        }
    }
}

/// A single line of the flat program.
///
/// An empty `mnemonic` denotes a preserved blank line. `comment` holds the
/// operands of a trailing `;` comment attached to this instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instr {
    pub mnemonic: String,
    pub args: Vec<Value>,
    pub comment: Vec<Value>,
}

impl Instr {
    /// Creates an instruction with the given arguments and no comment.
    pub fn new(mnemonic: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            args,
            comment: Vec::new(),
        }
    }

    /// Creates a preserved blank line.
    pub fn blank() -> Self {
        Self::new("", Vec::new())
    }

    /// Returns true for preserved blank lines.
    pub fn is_blank(&self) -> bool {
        self.mnemonic.is_empty()
    }

    /// Returns true for comment-like instructions (`NOTE`, `;`, `@REP`,
    /// `@END`).
    pub fn is_comment(&self) -> bool {
        is_comment_mnemonic(&self.mnemonic)
    }

    /// The first argument's text, when present. For `MARK` and the jump
    /// family this is the label.
    pub fn first_arg(&self) -> Option<&str> {
        self.args.first().map(|arg| arg.text.as_str())
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mnemonic)?;
        for arg in &self.args {
            write!(f, " {}", arg.text)?;
        }
        if !self.comment.is_empty() {
            f.write_str(" ;")?;
            for arg in &self.comment {
                write!(f, " {}", arg.text)?;
            }
        }
        Ok(())
    }
}

/// The flat instruction list every phase exchanges.
pub type Program = Vec<Instr>;

/// Renders the program as text, one instruction per line, with a trailing
/// newline after the final line.
pub fn serialize(program: &[Instr]) -> String {
    let mut out = String::new();
    for instr in program {
        out.push_str(&instr.to_string());
        out.push('\n');
    }
    out
}

/// Counts lines of code in rendered output: lines that are non-blank and
/// do not start with a comment-like mnemonic.
///
/// This is the in-game scoring metric, so blank lines, `NOTE`, `;`,
/// `@REP`, and `@END` are free.
pub fn count_loc(rendered: &str) -> usize {
    rendered
        .split('\n')
        .filter(|line| {
            !(line.is_empty()
                || line.starts_with("NOTE")
                || line.starts_with(';')
                || line.starts_with("@REP")
                || line.starts_with("@END"))
        })
        .count()
}
