//! exat-lex - Lexical Analyzer (Tokenizer)
//!
//! ============================================================================
//! LEXICAL ANALYSIS THEORY
//! ============================================================================
//!
//! Lexical analysis is the first phase of the pipeline. It transforms a
//! stream of characters into a stream of tokens, discarding the details
//! of spacing while preserving everything the parser needs.
//!
//! FORMAL DEFINITION:
//! ------------------
//! Let Σ be the alphabet (the set of all valid characters).
//! Let Σ* be the set of all strings over Σ.
//!
//! The lexer is a function:
//!   L: Σ* → T*
//! where T is the set of tokens.
//!
//! L is TOTAL: every input string, well formed or not, produces a token
//! stream. There is no "lexical error" in this language. A word the
//! grammar has no use for is still a perfectly good LITERAL token, and
//! all rejection happens in the parser, which can say which construct
//! on which line went wrong. Totality keeps the pipeline's failure
//! surface in exactly one phase.
//!
//! PROPERTIES:
//! -----------
//! - Linear time: O(n) where n = input length
//! - Single pass, no backtracking
//! - Context-free: a token never depends on surrounding tokens
//!
//! ============================================================================
//! TOKEN CATEGORIES
//! ============================================================================
//!
//! The token alphabet T is unusually small. Three kinds cover the whole
//! language:
//!
//! 1. LITERAL
//!    Any word: mnemonics (COPY, ADDI), operands (X, #NERV, 9999),
//!    operators (=, +=, !=), and comment bodies. The lexer does not
//!    distinguish these; classification by position is the parser's
//!    job. This is what makes pass-through of unknown hardware names
//!    possible.
//!
//! 2. EOL
//!    End of a source line. Statements are line-delimited, so line
//!    boundaries are significant tokens, not skippable whitespace.
//!    Blank lines matter too: they must survive all the way to the
//!    serialized output.
//!
//! 3. EOF
//!    End of the token stream. Emitted exactly once, after the final
//!    line's EOL, so the parser can demand it explicitly.
//!
//! Example:
//! ```text
//! Source: "COPY 1 X ; seed value"
//!
//! Tokens: [LITERAL "COPY"] [LITERAL "1"] [LITERAL "X"]
//!         [LITERAL ";"] [LITERAL "SEED VALUE"] [EOL] [EOF]
//! ```
//!
//! ============================================================================
//! TOKENIZATION TECHNIQUES
//! ============================================================================
//!
//! TECHNIQUE 1: CHARACTER-DRIVEN SCANNING
//! --------------------------------------
//! The classical approach walks the input one character at a time,
//! maintaining a cursor and a partial-token state:
//!
//! ```text
//!         letter  digit   ';'    '\n'   space
//! S0      S_word  S_word  S_cmt  EOL    S0
//! S_word  S_word  S_word  accept accept accept
//! S_cmt   S_cmt   S_cmt   S_cmt  accept S_cmt
//! ```
//!
//! ADVANTAGES:
//! - Handles languages where tokens span lines (strings, block comments)
//! - Precise column tracking for diagnostics
//!
//! DISADVANTAGES:
//! - Cursor state and partial-token states to get right
//! - Totality is a theorem, not an obvious property of the code
//!
//! TECHNIQUE 2: LINE SPLITTING
//! ---------------------------
//! This is what we use. Because the grammar is line-oriented and every
//! token is a whitespace-delimited word, each line can be processed as
//! a unit:
//!
//! ```text
//! for each line (1-indexed):
//!   split off the comment at the FIRST ';'
//!   split the code prefix on whitespace
//!   emit one LITERAL per word
//!   if a comment was present: emit LITERAL ";" then ONE literal
//!     holding the whole trimmed comment text
//!   emit EOL
//! emit EOF
//! ```
//!
//! ADVANTAGES:
//! - No cursor, no state machine, no partial tokens
//! - Totality is visible by inspection
//! - The comment split needs no whitespace around ';'
//!
//! DISADVANTAGES:
//! - Would not scale to multi-line or quoted constructs (this language
//!   has neither)
//!
//! ============================================================================
//! CASE FOLDING
//! ============================================================================
//!
//! The language is case-insensitive. Folding happens once, on the whole
//! input, before any splitting. Every downstream comparison can then
//! use uppercase literals without ever thinking about case again, and
//! the serialized output is uniformly uppercase regardless of how the
//! source was typed.
//!
//! ============================================================================
//! COMMENT GRANULARITY
//! ============================================================================
//!
//! Everything after the first ';' on a line is ONE token, trimmed at
//! both ends but with interior spacing preserved:
//!
//! ```text
//! "NOOP ; grab  the   file"  →  [";"] ["GRAB  THE   FILE"]
//! "NOOP ; a ; b"             →  [";"] ["A ; B"]
//! ```
//!
//! The comment body is opaque. It is carried, rendered, and never
//! parsed. Splitting it into words would normalize spacing the author
//! may have aligned deliberately.
//!
//! ============================================================================
//! INPUT ENCODING
//! ============================================================================
//!
//! Input is UTF-8 text, but only ASCII is meaningful: the instruction
//! set, the operators, and the register names are all ASCII, and the
//! case fold plus whitespace split treat anything else as just another
//! word character. Non-ASCII input therefore tokenizes fine and flows
//! through as opaque LITERAL text, exactly like an unknown hardware
//! name. There is no BOM handling and no normalization; what the file
//! contains is what the tokens contain, uppercased.
//!
//! ============================================================================
//! SOURCE LOCATION TRACKING
//! ============================================================================
//!
//! Every token carries its 1-based line number. That is the whole
//! location model: diagnostics in this language are line-granular
//! ("unexpected token on line 7"), so byte offsets and column numbers
//! would be dead weight. The EOL/EOF tokens carry line numbers too, so
//! even "your program ended too early" errors can point somewhere.
//!
//! ============================================================================
//! COMPLEXITY AND ALLOCATION
//! ============================================================================
//!
//! One pass over the input, O(n) time. The case fold allocates one
//! copy of the whole source; each word and comment body then allocates
//! its own token string. A zero-copy lexer would slice the folded
//! source instead, threading a lifetime through every downstream type.
//! For inputs measured in dozens of lines the allocation cost is
//! unmeasurable, and owned tokens keep the parser and optimizer free
//! to rewrite text in place (label renaming depends on exactly that).

/// Token classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// A word from the source: mnemonic, operand, operator, or comment
    /// body.
    Literal,
    /// End of a source line.
    Eol,
    /// End of the token stream. Emitted exactly once, last.
    Eof,
}

/// A single token with its 1-based source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: u32,
}

impl Token {
    /// Creates a literal token.
    pub fn literal(value: impl Into<String>, line: u32) -> Self {
        Self {
            kind: TokenKind::Literal,
            value: value.into(),
            line,
        }
    }

    /// Creates an end-of-line token.
    pub fn eol(line: u32) -> Self {
        Self {
            kind: TokenKind::Eol,
            value: "EOL".to_string(),
            line,
        }
    }

    /// Creates the end-of-stream token.
    pub fn eof(line: u32) -> Self {
        Self {
            kind: TokenKind::Eof,
            value: "EOF".to_string(),
            line,
        }
    }

    /// Returns true for end-of-line tokens.
    pub fn is_eol(&self) -> bool {
        self.kind == TokenKind::Eol
    }

    /// Returns true for the end-of-stream token.
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// Tokenizes a source string. Cannot fail.
///
/// Every line contributes its words, then an [`TokenKind::Eol`] token; the
/// stream always ends with a single [`TokenKind::Eof`]. Comment bodies
/// arrive as a `";"` literal followed by one literal holding the entire
/// trimmed comment text.
pub fn tokenize(input: &str) -> Vec<Token> {
    let input = input.to_uppercase();
    let mut tokens = Vec::new();
    let mut line_num: u32 = 1;

    for line in input.split('\n') {
        let (code, comment) = match line.split_once(';') {
            Some((code, comment)) => (code, Some(comment)),
            None => (line, None),
        };

        for word in code.split_whitespace() {
            tokens.push(Token::literal(word, line_num));
        }

        if let Some(comment) = comment {
            tokens.push(Token::literal(";", line_num));
            tokens.push(Token::literal(comment.trim(), line_num));
        }

        tokens.push(Token::eol(line_num));
        line_num += 1;
    }

    tokens.push(Token::eof(line_num));
    tokens
}
