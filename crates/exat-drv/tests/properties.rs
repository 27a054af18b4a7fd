//! Pipeline property tests.
//!
//! Two generators drive these: flat programs (base instructions,
//! comments, and blank lines, with no structured constructs), for which
//! parsing is a pure normalization, and structured programs, for which
//! the optimizer must converge to a stable fixed point.

use proptest::prelude::*;

use exat_asm::{is_jump, serialize, Program};
use exat_lex::tokenize;
use exat_opt::{optimize, MAX_PASSES};
use exat_par::Parser;

fn parse(source: &str) -> Program {
    Parser::new(tokenize(source))
        .parse()
        .expect("generated source must parse")
}

/// Uppercases and whitespace-normalizes a flat source the way the
/// serializer renders it: words single-spaced, comments trimmed and
/// re-attached as ` ; <text>`.
fn normalize(source: &str) -> String {
    let mut out = String::new();
    for line in source.to_uppercase().split('\n') {
        let (code, comment) = match line.split_once(';') {
            Some((code, rest)) => (code, Some(rest)),
            None => (line, None),
        };
        let words: Vec<&str> = code.split_whitespace().collect();
        out.push_str(&words.join(" "));
        if let Some(comment) = comment {
            if !words.is_empty() {
                out.push(' ');
            }
            out.push_str("; ");
            out.push_str(comment.trim());
        }
        out.push('\n');
    }
    out
}

fn operand() -> impl Strategy<Value = String> {
    "[A-Z0-9#]{1,4}".prop_filter("the literal EOL cannot be an operand", |s| s != "EOL")
}

/// One flat source line: a base instruction of correct arity, a NOTE, or
/// a blank line, optionally with a trailing comment.
fn flat_line() -> impl Strategy<Value = String> {
    let zero = prop_oneof![Just("HALT"), Just("NOOP"), Just("WIPE"), Just("MAKE")]
        .prop_map(str::to_string);
    let one = (
        prop_oneof![Just("LINK"), Just("GRAB"), Just("VOID"), Just("HOST")],
        operand(),
    )
        .prop_map(|(m, a)| format!("{m} {a}"));
    let two = (operand(), operand()).prop_map(|(a, b)| format!("COPY {a} {b}"));
    let three = (
        prop_oneof![Just("ADDI"), Just("SUBI"), Just("SWIZ"), Just("RAND")],
        operand(),
        operand(),
        operand(),
    )
        .prop_map(|(m, a, b, c)| format!("{m} {a} {b} {c}"));
    let note = proptest::collection::vec(operand(), 0..3).prop_map(|args| {
        if args.is_empty() {
            "NOTE".to_string()
        } else {
            format!("NOTE {}", args.join(" "))
        }
    });
    let blank = Just(String::new());

    let line = prop_oneof![zero, one, two, three, note, blank];
    let comment = "[A-Z0-9 ]{0,8}"
        .prop_filter("a comment reading exactly EOL is unparseable", |s| {
            s.trim() != "EOL"
        });
    (line, proptest::option::of(comment)).prop_map(|(line, comment)| match comment {
        Some(comment) => format!("{line} ; {comment}"),
        None => line,
    })
}

fn flat_program() -> impl Strategy<Value = String> {
    proptest::collection::vec(flat_line(), 0..12).prop_map(|lines| lines.join("\n"))
}

fn condition() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("X = 1"),
        Just("X != Y"),
        Just("X <= 3"),
        Just("NOT X > 0"),
        Just("ISTRUE"),
        Just("ISFALSE"),
        Just("NOT EOF"),
        Just("MRD"),
    ]
}

/// One statement of a structured source: either a plain instruction or a
/// whole well-formed construct.
fn structured_stmt() -> impl Strategy<Value = String> {
    let simple = prop_oneof![
        Just("X += 1".to_string()),
        Just("COPY 1 X".to_string()),
        Just("NOOP".to_string()),
        Just("LINK 800".to_string()),
        Just("X = A + B".to_string()),
    ];
    let if_stmt = (condition(), any::<bool>()).prop_map(|(cond, has_else)| {
        if has_else {
            format!("IF {cond}\nNOOP\nELSE\nHALT\nEND")
        } else {
            format!("IF {cond}\nNOOP\nEND")
        }
    });
    let if_chain = (condition(), condition())
        .prop_map(|(a, b)| format!("IF {a}\nNOOP\nELSE IF {b}\nKILL\nELSE\nHALT\nEND"));
    let while_stmt = condition().prop_map(|cond| format!("WHILE {cond}\nX += 1\nLOOP"));
    let endless_while = Just("WHILE\nLINK 800\nBREAK IFTRUE\nLOOP".to_string());
    let do_stmt = condition().prop_map(|cond| format!("DO\nX += 1\nLOOP WHILE {cond}"));

    prop_oneof![simple, if_stmt, if_chain, while_stmt, endless_while, do_stmt]
}

fn structured_program() -> impl Strategy<Value = String> {
    proptest::collection::vec(structured_stmt(), 0..5).prop_map(|stmts| stmts.join("\n"))
}

proptest! {
    /// Parsing a flat program is exactly whitespace-and-case
    /// normalization.
    #[test]
    fn prop_flat_round_trip(source in flat_program()) {
        let rendered = serialize(&parse(&source));
        prop_assert_eq!(rendered, normalize(&source));
    }

    /// Flat programs give the optimizer nothing to do.
    #[test]
    fn prop_flat_programs_are_already_optimal(source in flat_program()) {
        let (out, passes) = optimize(parse(&source));
        prop_assert_eq!(serialize(&out), normalize(&source));
        prop_assert_eq!(passes, 0);
    }

    /// Comment and blank-line instructions survive optimization.
    #[test]
    fn prop_flat_comments_and_blanks_preserved(source in flat_program()) {
        let nodes = parse(&source);
        let trivia_before = nodes
            .iter()
            .filter(|n| n.is_blank() || n.is_comment())
            .count();
        let (out, _) = optimize(nodes);
        let trivia_after = out
            .iter()
            .filter(|n| n.is_blank() || n.is_comment())
            .count();
        prop_assert_eq!(trivia_before, trivia_after);
    }

    /// Optimization reaches a fixed point: a second run changes nothing.
    #[test]
    fn prop_optimize_idempotent(source in structured_program()) {
        let (once, _) = optimize(parse(&source));
        let (twice, passes) = optimize(once.clone());
        prop_assert_eq!(serialize(&twice), serialize(&once));
        prop_assert_eq!(passes, 0);
    }

    /// Optimization converges well inside the pass cap.
    #[test]
    fn prop_optimize_terminates(source in structured_program()) {
        let (_, passes) = optimize(parse(&source));
        prop_assert!(passes < MAX_PASSES);
    }

    /// Optimized output is itself valid input, and every surviving jump
    /// targets exactly one surviving MARK.
    #[test]
    fn prop_optimized_output_is_valid(source in structured_program()) {
        let (out, _) = optimize(parse(&source));

        let reparsed = Parser::new(tokenize(&serialize(&out))).parse();
        prop_assert!(reparsed.is_ok());

        let mut mark_counts = std::collections::HashMap::new();
        for node in &out {
            if node.mnemonic == "MARK" {
                if let Some(label) = node.first_arg() {
                    *mark_counts.entry(label.to_string()).or_insert(0usize) += 1;
                }
            }
        }
        for node in &out {
            if is_jump(&node.mnemonic) {
                if let Some(label) = node.first_arg() {
                    prop_assert_eq!(
                        mark_counts.get(label).copied().unwrap_or(0),
                        1,
                        "dangling or duplicated label {} in:\n{}",
                        label,
                        serialize(&out)
                    );
                }
            }
        }
    }
}
