//! Structured control-flow nodes.
//!
//! These exist only between parsing and lowering: the parser builds one
//! node per structured construct, immediately flattens it to base
//! instructions, and never returns it to callers.

use exat_asm::Instr;

/// A parsed condition.
///
/// `test` is the `TEST` instruction to emit, or `None` when the condition
/// reads the truth register directly (`ISTRUE`/`ISFALSE`). `negate` tells
/// the lowerer to branch on the opposite sense of `T`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Cond {
    pub test: Option<Instr>,
    pub negate: bool,
}

/// An `IF` construct, including any `ELSE IF` chain and `ELSE` body.
#[derive(Debug)]
pub(crate) struct If {
    pub label: String,
    pub cond: Cond,
    pub body: Vec<Instr>,
    pub else_if: Vec<If>,
    pub else_body: Vec<Instr>,
}

/// A `WHILE … LOOP` construct. `endless` when no condition was written.
#[derive(Debug)]
pub(crate) struct While {
    pub label: String,
    pub cond: Cond,
    pub body: Vec<Instr>,
    pub endless: bool,
}

/// A `DO … LOOP [WHILE …]` construct. `endless` when no trailing
/// condition was written.
#[derive(Debug)]
pub(crate) struct Do {
    pub label: String,
    pub cond: Cond,
    pub body: Vec<Instr>,
    pub endless: bool,
}
