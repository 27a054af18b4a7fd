//! exat-asm - Core Data Model and Foundation Types
//!
//! ============================================================================
//! MODULE OVERVIEW
//! ============================================================================
//!
//! This crate holds the types every phase of the transpiler exchanges:
//! operand values, instructions, the flat program representation, the
//! mnemonic classification tables, and the text serializer. The lexer,
//! parser, optimizer, and driver crates all build on these types, and
//! nothing in here depends on any of them.
//!
//! DESIGN PRINCIPLES:
//! ------------------
//! 1. PLAIN DATA
//!    Instructions are inert structs with public fields. No phantom
//!    types, no interning, no arena. A whole program is a Vec. At
//!    game scale (programs of a few dozen lines) the simplest possible
//!    representation wins every trade against a clever one: cloning a
//!    program per optimizer pass is cheaper than reasoning about
//!    shared mutation.
//!
//! 2. PASS-THROUGH FIDELITY
//!    Operands are never interpreted. A register, a number, a label,
//!    and an unknown hardware name are all the same Value carrying raw
//!    uppercased text. What the pipeline does not model, it cannot
//!    mangle, so source constructs it has never heard of arrive in the
//!    output byte-identical.
//!
//! 3. ONE CLASSIFICATION TABLE
//!    Two questions recur in every phase: "is this line a comment?"
//!    and "does this instruction reference a label?". Both are
//!    answered in exactly one place (the mnemonic module), so the
//!    optimizer's reachability analysis and the LOC metric can never
//!    drift apart on what counts as a comment.
//!
//! 4. TEXT IS THE INTERCHANGE FORMAT
//!    The serialized form is the canonical one: it is what the game
//!    accepts, what the golden corpus pins, and what round-trips
//!    through the parser. The in-memory form is just a convenience for
//!    transforming it.
//!
//! ============================================================================
//! DATA MODEL
//! ============================================================================
//!
//! ```text
//! Instr
//! ┌──────────┬──────────────────┬──────────────────────┐
//! │ mnemonic │ args: Vec<Value> │ comment: Vec<Value>  │
//! └──────────┴──────────────────┴──────────────────────┘
//!
//! "COPY 1 X ; seed"   →  { "COPY", [1, X],   [SEED] }
//! "MARK LOOP_TOP"     →  { "MARK", [LOOP_TOP], [] }
//! ""                  →  { "",     [],       [] }      (blank line)
//! "; note to self"    →  { ";",    [NOTE TO SELF], [] }
//! ```
//!
//! The empty mnemonic encodes a preserved blank line. Comment-like
//! mnemonics (NOTE, ";", @REP, @END) are ordinary instructions that
//! the optimizer refuses to touch and the LOC metric refuses to count.
//!
//! ============================================================================
//! SERIALIZED FORM
//! ============================================================================
//!
//! One instruction per line, joined by single newlines, trailing
//! newline after the last:
//!
//! ```text
//! rendered = mnemonic { " " arg-text } [ " ;" { " " comment-text } ]
//! ```
//!
//! A blank-line instruction renders as a bare line. Rendering is total
//! and allocation-straightforward; parsing the rendered text back
//! reproduces the same instruction list.
//!
//! ============================================================================
//! THE LOC METRIC
//! ============================================================================
//!
//! Lines of code is the game's scoring metric, so the transpiler
//! reports it the way the game counts it: the number of rendered lines
//! that are non-blank and do not start with NOTE, ";", @REP, or @END.
//! Comments and blank lines are free; everything else costs one.

mod instr;
mod mnemonic;

pub use instr::{count_loc, serialize, Instr, Program, Value, ValueKind};
pub use mnemonic::{is_comment_mnemonic, is_jump, COMMENT_MNEMONICS};
