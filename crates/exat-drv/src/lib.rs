//! exat-drv - Transpilation pipeline driver.
//!
//! Gathers the phase crates into one call: tokenize, parse (which lowers
//! structured constructs inline), optimize to fixed point, serialize, and
//! compute the output statistics the CLI reports.

use exat_asm::{count_loc, serialize};
use exat_lex::tokenize;
use exat_opt::optimize;
use exat_par::{ParseError, Parser};
use thiserror::Error;
use tracing::debug;

/// Pipeline failure. Tokenization is total and the optimizer cannot
/// fail, so only the parser contributes variants.
#[derive(Debug, Error)]
pub enum TranspileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A finished transpilation.
#[derive(Debug)]
pub struct Transpiled {
    /// The serialized program, one instruction per line, trailing
    /// newline included.
    pub program: String,
    /// Lines of code in the output: non-blank, non-comment lines. This
    /// is the in-game scoring metric.
    pub loc: usize,
    /// Productive optimizer passes.
    pub passes: usize,
}

/// Runs the whole pipeline on a source string.
pub fn transpile(source: &str) -> Result<Transpiled, TranspileError> {
    let tokens = tokenize(source);
    debug!(tokens = tokens.len(), "tokenized");

    let nodes = Parser::new(tokens).parse()?;
    debug!(instructions = nodes.len(), "parsed and lowered");

    let (nodes, passes) = optimize(nodes);
    debug!(instructions = nodes.len(), passes, "optimized");

    let program = serialize(&nodes);
    let loc = count_loc(&program);
    Ok(Transpiled {
        program,
        loc,
        passes,
    })
}
