//! exat-par - Syntax Analyzer (Parser) and Lowering
//!
//! ============================================================================
//! PARSING THEORY
//! ============================================================================
//!
//! Parsing is the second phase of the pipeline. It consumes the token
//! stream and produces the flat instruction list.
//!
//! FORMAL DEFINITION:
//! ------------------
//! Let T be the token alphabet and I the set of flat instructions.
//!
//! The parser is a partial function:
//!   P: T* → I*
//! undefined exactly on the inputs it rejects with a positioned error.
//! Unlike the lexer, partiality is the point: this is the one phase
//! that knows the grammar, so this is the one phase allowed to fail.
//!
//! GRAMMAR:
//! --------
//! The surface language is line-oriented and LL(1) over the token
//! stream: one token of lookahead (plus a peek at the token after it,
//! for assignment detection) decides every production. In EBNF:
//!
//! ```text
//! program      = body EOF ;
//! body         = { line } ;                    (stops before END, ELSE, LOOP, EOF)
//! line         = [ statement ] [ trailing ] EOL ;
//! statement    = plain | test | assign | aug-assign
//!              | if | while | do | break | continue ;
//! plain        = MNEMONIC { LITERAL } ;        (arity fixed per mnemonic)
//! test         = "TEST" condition ;
//! assign       = LITERAL "=" LITERAL [ operator LITERAL ] ;
//! aug-assign   = LITERAL aug-op LITERAL ;
//! aug-op       = "+=" | "-=" | "*=" | "/=" | "%=" ;
//! condition    = [ "NOT" ] ( "EOF" | "MRD" | "ISTRUE" | "ISFALSE"
//!              | LITERAL comparator LITERAL ) ;
//! comparator   = "=" | "<" | ">" | "!=" | "<=" | ">=" ;
//! if           = "IF" condition EOL body
//!                { "ELSE" "IF" condition EOL body }
//!                [ "ELSE" EOL body ] "END" ;
//! while        = "WHILE" [ condition ] EOL body "LOOP" ;
//! do           = "DO" EOL body "LOOP" [ "WHILE" condition ] ;
//! break        = "BREAK" [ "IFTRUE" | "IFFALSE" ] ;
//! continue     = "CONTINUE" [ "IFTRUE" | "IFFALSE" ] ;
//! trailing     = ";" { LITERAL } ;
//! ```
//!
//! DISPATCH:
//! ---------
//! The body loop dispatches on the first word of each line. Known
//! mnemonics group by arity; an unknown word is assumed to start an
//! assignment and confirmed by peeking at the next token:
//!
//! ```text
//! arity 0:   HALT KILL MODE MAKE DROP WIPE NOOP @END
//! arity 1:   LINK GRAB MARK JUMP TJMP FJMP FILE SEEK VOID REPL HOST @REP
//! arity 2:   COPY
//! arity 3:   ADDI SUBI MULI DIVI MODI SWIZ RAND
//! variadic:  NOTE ;
//! special:   TEST IF WHILE DO BREAK CONTINUE
//! default:   peek == "="       → assignment
//!            peek ends in "="  → compound assignment
//!            otherwise         → unexpected token
//! ```
//!
//! LANGUAGE CLASS:
//! ---------------
//! Where does this language sit in the Chomsky hierarchy?
//!
//! ```text
//! Type 3 (regular)           tokens, single lines
//! Type 2 (context-free)      the whole surface language
//! Type 1 (context-sensitive) not needed
//! Type 0 (unrestricted)      not needed
//! ```
//!
//! Individual lines are regular: a line is a flat word sequence that a
//! finite automaton recognizes. Nesting is what pushes the whole
//! language up to context-free: IF and the loops contain bodies, which
//! contain IFs and loops, so matching IF/END and WHILE/LOOP pairs
//! requires a stack. That stack is exactly the call stack of the
//! recursive-descent functions below; no other machinery is needed.
//!
//! Two things look context-sensitive but are not part of the grammar
//! at all. BREAK/CONTINUE needing an enclosing loop is enforced by the
//! loop-label stack, a semantic check that happens to run during
//! parsing. And the output language is flat by construction: lowering
//! removes every nested construct, so what leaves this crate is
//! regular again.
//!
//! TECHNIQUE: RECURSIVE DESCENT
//! ----------------------------
//! One function per construct, calling each other exactly the way the
//! grammar productions reference each other. `parse_body` is the single
//! reentry point: the program is a body, and so is the inside of every
//! IF arm and loop. A handful of primitives (`current`, `peek_value`,
//! `pop`, `expect`, `expect_not_empty`) are the whole parsing substrate.
//!
//! ADVANTAGES:
//! - The code is the grammar; a production and its function read alike
//! - Trivial to attach per-construct error context
//!
//! DISADVANTAGES:
//! - Left recursion must be avoided (this grammar has none)
//! - Deeply nested input consumes call stack (bounded in practice by
//!   how much nesting a human writes into a game-sized program)
//!
//! ============================================================================
//! LOWERING
//! ============================================================================
//!
//! Structured constructs do not survive parsing. Each one is parsed
//! into a transient node and immediately flattened to base instructions
//! plus MARK labels and jumps, inline, in source order. Callers only
//! ever see the flat form.
//!
//! WHY NOT A FULL AST?
//! -------------------
//! A conventional compiler parses to a tree, then walks the tree in a
//! separate lowering phase:
//!
//! ```text
//! tokens → AST → (semantic analysis) → IR → ...
//! ```
//!
//! That split earns its keep when multiple consumers need the tree
//! (type checkers, formatters, linters). Here there is exactly one
//! consumer and the target IS the source language minus the structured
//! forms, so the tree would be built only to be flattened one call
//! later. The transient nodes (Cond, If, While, Do) exist just long
//! enough to collect a construct's parts before expansion; they are
//! private to this crate and no API exposes them.
//!
//! EXPANSION SKELETONS:
//! --------------------
//! ```text
//! IF c … END                    WHILE c … LOOP            DO … LOOP WHILE c
//! ─────────────────             ─────────────────         ─────────────────
//! MARK IF_n                     MARK WHILE_n              MARK DO_n
//! <test for c>                  <test for c>              <body>
//! FJMP IF_n_NEXT                FJMP WHILE_n_END          <test for c>
//! <body>                        <body>                    TJMP DO_n
//! JUMP IF_n_END                 JUMP WHILE_n              MARK DO_n_END
//! MARK IF_n_NEXT                MARK WHILE_n_END
//! <else-if chain, else body>
//! MARK IF_n_END
//! ```
//!
//! A negated condition swaps the jump sense (TJMP for FJMP and vice
//! versa). A condition-less loop is endless and emits no test at all.
//! An ELSE IF clause lowers like an IF whose taken branch jumps to the
//! whole chain's end label. The expansion is deliberately naive: the
//! optimizer exists to clean up the labels and jumps it leaves behind.
//!
//! LABEL ALLOCATION:
//! -----------------
//! One monotone counter per compilation numbers every structured
//! construct (IF_0, ELSEIF_1, WHILE_2, ...). Counters never reset and
//! never repeat, so generated labels are unique across the program and
//! sub-labels (_NEXT, _END) cannot collide either.
//!
//! LOOP-LABEL STACK:
//! -----------------
//! WHILE and DO push their label before parsing their body, which is
//! how BREAK and CONTINUE inside the body know their target:
//!
//!   CONTINUE  peeks the stack, jumps to <label>      (loop head)
//!   BREAK     POPS the stack, jumps to <label>_END   (loop exit)
//!
//! Both error when the stack is empty. Note the asymmetry: BREAK
//! consumes the label, and loop parsing never pops on LOOP. Programs
//! relying on either quirk parse accordingly, and the behavior is
//! pinned by tests rather than smoothed over.
//!
//! CONDITION REWRITING:
//! --------------------
//! The TEST instruction knows three comparators: =, <, >. The richer
//! surface comparators lower to a complemented test:
//!
//! ```text
//! !=  →  =   (negated)        >=  →  <   (negated)
//! <=  →  >   (negated)
//! ```
//!
//! Inside IF/WHILE/DO the negation folds into the jump sense for free.
//! A bare negated TEST statement has no jump to fold into, so it costs
//! one instruction: SUBI 1 T T, which complements the truth register.
//! ISTRUE and ISFALSE emit no test at all; they just select the sense
//! applied to the existing value of T.
//!
//! ============================================================================
//! ERROR HANDLING STRATEGY
//! ============================================================================
//!
//! Fail fast, no recovery. The first error aborts the parse and
//! surfaces with the source line and a trail of context prefixes, read
//! top-down from construct to primitive:
//!
//! ```text
//! error parsing IF on line 3: error parsing condition:
//! error parsing right operand: error parsing value: unexpected EOL
//! ```
//!
//! Error recovery (skip to a sync point, keep collecting diagnostics)
//! earns its complexity in compilers for large codebases. Inputs here
//! are game-sized, a few dozen lines, and the fix-compile loop is
//! seconds long. One precise error at a time is the better trade.
//!
//! ============================================================================
//! PARSER STATE
//! ============================================================================
//!
//! Two pieces of state thread through a parse: the monotone label
//! counter and the loop-label stack. Both live on the `Parser` struct
//! next to the token vector and cursor; nothing is global, so parses
//! are independent and the counter starts at zero for each compilation.

mod ast;
mod error;
mod expr;
mod lower;
mod stmt;

pub use error::ParseError;

use exat_asm::{Instr, Program, Value};
use exat_lex::Token;

use crate::error::Context;
use crate::lower::{lower_do, lower_if, lower_while};

/// One-shot parser over a token stream.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    label_id: u32,
    label_stack: Vec<String>,
}

impl Parser {
    /// Creates a parser. The stream is expected to be terminated by an
    /// `EOF` token, as [`exat_lex::tokenize`] guarantees; a missing
    /// terminator is supplied rather than assumed.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::eof(1));
        }
        Self {
            tokens,
            position: 0,
            label_id: 0,
            label_stack: Vec::new(),
        }
    }

    /// Parses the whole stream into a flat program.
    pub fn parse(mut self) -> Result<Program, ParseError> {
        let body = self.parse_body()?;
        self.expect("EOF")?;
        Ok(body)
    }

    /// Parses statements until an end-of-body keyword (`END`, `ELSE`,
    /// `LOOP`) or the end of the stream.
    ///
    /// This is the body both of the whole program and of every structured
    /// construct; the construct parsers consume their own terminators.
    pub(crate) fn parse_body(&mut self) -> Result<Vec<Instr>, ParseError> {
        let mut nodes: Vec<Instr> = Vec::new();

        while !self.is_end_of_body() {
            let token = self.current().clone();
            match token.value.as_str() {
                "EOL" => {
                    self.pop()?;
                    // Preserve blank lines.
                    nodes.push(Instr::blank());
                    continue;
                }
                "HALT" | "KILL" | "MODE" | "MAKE" | "DROP" | "WIPE" | "NOOP" | "@END" => {
                    let token = self.pop()?;
                    nodes.push(Instr::new(token.value, Vec::new()));
                }
                "BREAK" => {
                    let instr = self.parse_break()?;
                    nodes.push(instr);
                }
                "CONTINUE" => {
                    let instr = self.parse_continue()?;
                    nodes.push(instr);
                }
                "NOTE" | ";" => {
                    let token = self.pop()?;
                    let args = self
                        .parse_arguments(None)
                        .with_context(|| format!("invalid arguments on line {}", token.line))?;
                    nodes.push(Instr::new(token.value, args));
                }
                "LINK" | "GRAB" | "MARK" | "JUMP" | "TJMP" | "FJMP" | "FILE" | "SEEK" | "VOID"
                | "REPL" | "HOST" | "@REP" => {
                    let token = self.pop()?;
                    let args = self
                        .parse_arguments(Some(1))
                        .with_context(|| format!("invalid arguments on line {}", token.line))?;
                    nodes.push(Instr::new(token.value, args));
                }
                "COPY" => {
                    let token = self.pop()?;
                    let args = self
                        .parse_arguments(Some(2))
                        .with_context(|| format!("invalid arguments on line {}", token.line))?;
                    nodes.push(Instr::new(token.value, args));
                }
                "TEST" => {
                    let token = self.pop()?;
                    let cond = self
                        .parse_cond_expr()
                        .with_context(|| format!("syntax error on line {}", token.line))?;
                    if let Some(test) = cond.test {
                        nodes.push(test);
                        if cond.negate {
                            // Complement the truth register: T = 1 - T.
                            nodes.push(Instr::new(
                                "SUBI",
                                vec![Value::literal("1"), Value::literal("T"), Value::literal("T")],
                            ));
                        }
                    }
                }
                "ADDI" | "SUBI" | "MULI" | "DIVI" | "MODI" | "SWIZ" | "RAND" => {
                    let token = self.pop()?;
                    let args = self
                        .parse_arguments(Some(3))
                        .with_context(|| format!("invalid arguments on line {}", token.line))?;
                    nodes.push(Instr::new(token.value, args));
                }
                "IF" => {
                    let node = self
                        .parse_if_expr()
                        .with_context(|| format!("error parsing IF on line {}", token.line))?;
                    nodes.extend(lower_if(node, None));
                }
                "WHILE" => {
                    let node = self
                        .parse_while_expr()
                        .with_context(|| format!("error parsing WHILE on line {}", token.line))?;
                    nodes.extend(lower_while(node));
                }
                "DO" => {
                    let node = self
                        .parse_do_expr()
                        .with_context(|| format!("error parsing DO on line {}", token.line))?;
                    nodes.extend(lower_do(node));
                }
                _ => {
                    // Anything else must start an assignment.
                    if self.peek_value() == "=" {
                        let instr = self.parse_assign_expr().with_context(|| {
                            format!("invalid assignment expression on line {}", token.line)
                        })?;
                        nodes.push(instr);
                    } else if self.peek_value().ends_with('=') {
                        let instr = self.parse_short_assign_expr().with_context(|| {
                            format!("invalid short assignment expression on line {}", token.line)
                        })?;
                        nodes.push(instr);
                    } else {
                        return Err(ParseError::UnexpectedToken {
                            line: token.line,
                            token: token.value,
                        });
                    }
                }
            }

            // Optional trailing comment attaches to the newest
            // instruction.
            if self.is_start_of_comment() {
                let token = self.expect(";")?;
                let args = self
                    .parse_arguments(None)
                    .with_context(|| format!("invalid arguments on line {}", token.line))?;
                if let Some(last) = nodes.last_mut() {
                    last.comment = args;
                }
            }

            self.expect("EOL")?;
        }

        Ok(nodes)
    }

    /// Allocates the next structured-construct label for the given root.
    pub(crate) fn next_label(&mut self, root: &str) -> String {
        let label = format!("{root}_{}", self.label_id);
        self.label_id += 1;
        label
    }

    /// The token under the cursor. Clamped to the final (`EOF`) token
    /// once the stream is exhausted.
    pub(crate) fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.position.min(last)]
    }

    /// The value of the token after the cursor, or `""` past the end.
    pub(crate) fn peek_value(&self) -> &str {
        self.tokens
            .get(self.position + 1)
            .map_or("", |token| token.value.as_str())
    }

    /// Consumes and returns the current token.
    pub(crate) fn pop(&mut self) -> Result<Token, ParseError> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or(ParseError::UnexpectedEnd)?;
        self.position += 1;
        Ok(token)
    }

    /// Consumes the current token, requiring an exact value.
    pub(crate) fn expect(&mut self, value: &str) -> Result<Token, ParseError> {
        let token = self.pop()?;
        if token.value != value {
            return Err(ParseError::Expected {
                want: value.to_string(),
                got: token.value,
                line: token.line,
            });
        }
        Ok(token)
    }

    /// Consumes the current token, requiring it not to be an end of
    /// line.
    pub(crate) fn expect_not_empty(&mut self) -> Result<Token, ParseError> {
        let token = self.pop()?;
        if token.value == "EOL" {
            return Err(ParseError::UnexpectedEol);
        }
        Ok(token)
    }

    pub(crate) fn is_end_of_body(&self) -> bool {
        let current = self.current();
        current.value == "END"
            || current.value == "ELSE"
            || current.value == "LOOP"
            || current.is_eof()
    }

    pub(crate) fn is_eol(&self) -> bool {
        self.current().is_eol() || self.current().is_eof()
    }

    pub(crate) fn is_start_of_comment(&self) -> bool {
        self.current().value == ";"
    }
}
