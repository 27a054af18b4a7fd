//! exat-opt - Whole-program peephole optimizer.
//!
//! The lowering step leaves generated label/jump scaffolding behind:
//! labels nothing jumps to, label pairs on adjacent lines, jumps straight
//! into the mark they target. Each pass rebuilds the program with four
//! rewrites and the driver's loop runs passes until one changes nothing.
//!
//! Comment-like instructions and blank lines are copied through untouched
//! and are invisible to the rewrites: "adjacent" marks may be separated
//! by any number of them.

use exat_asm::{is_jump, Instr, Program};
use rustc_hash::FxHashMap;

/// Hard cap on optimization passes. Well-formed programs converge far
/// earlier; the cap bounds pathological inputs.
pub const MAX_PASSES: usize = 100;

/// Optimizes the program to fixed point.
///
/// Returns the rewritten program and the number of productive passes (the
/// final, unchanged pass is not counted).
pub fn optimize(mut nodes: Program) -> (Program, usize) {
    let mut passes = 0;
    let mut label_id: u32 = 0;

    while passes < MAX_PASSES {
        let mut changed = false;
        let mut out: Program = Vec::with_capacity(nodes.len());

        // Per-pass indexes. Coalescing mutates reference counts as labels
        // are renamed; mark positions are left stale until the next pass
        // recomputes them, so a renamed label never collapses in the pass
        // that created it.
        let mut mark_index: FxHashMap<String, usize> = FxHashMap::default();
        let mut jump_refs: FxHashMap<String, usize> = FxHashMap::default();
        for (i, node) in nodes.iter().enumerate() {
            if let Some(label) = node.first_arg() {
                if is_jump(&node.mnemonic) {
                    *jump_refs.entry(label.to_string()).or_insert(0) += 1;
                } else if node.mnemonic == "MARK" {
                    mark_index.insert(label.to_string(), i);
                }
            }
        }

        let mut i = 0;
        while i < nodes.len() {
            let node = nodes[i].clone();

            // Comments and blank lines are never optimization targets.
            if node.is_blank() || node.is_comment() {
                out.push(node);
                i += 1;
                continue;
            }

            // Drop MARKs that nothing jumps to.
            if node.mnemonic == "MARK" {
                let label = node.first_arg().unwrap_or("");
                if jump_refs.get(label).copied().unwrap_or(0) == 0 {
                    changed = true;
                    i += 1;
                    continue;
                }
            }

            // Fuse MARKs on adjacent lines under a fresh label, pointing
            // every referencing jump (already emitted or still pending)
            // at the new name.
            if node.mnemonic == "MARK" {
                if let Some(next) = next_code_index(&nodes, i + 1) {
                    if nodes[next].mnemonic == "MARK" {
                        let label1 = node.first_arg().unwrap_or("").to_string();
                        let label2 = nodes[next].first_arg().unwrap_or("").to_string();

                        let new_label = format!("L{label_id}");
                        label_id += 1;

                        let merged = jump_refs.get(&label1).copied().unwrap_or(0)
                            + jump_refs.get(&label2).copied().unwrap_or(0);
                        jump_refs.insert(new_label.clone(), merged);
                        jump_refs.insert(label1.clone(), 0);
                        jump_refs.insert(label2.clone(), 0);

                        if let Some(arg) = nodes[next].args.first_mut() {
                            arg.text = new_label.clone();
                        }
                        retarget_jumps(&mut nodes, &label1, &label2, &new_label);
                        retarget_jumps(&mut out, &label1, &label2, &new_label);

                        changed = true;
                        i += 1;
                        continue;
                    }
                }
            }

            // Drop instructions that follow an unconditional JUMP; only a
            // MARK or REPL makes the line reachable again.
            if let Some(last) = last_code_index(&out) {
                if out[last].mnemonic == "JUMP" && node.mnemonic != "MARK" && node.mnemonic != "REPL"
                {
                    changed = true;
                    i += 1;
                    continue;
                }
            }

            // A JUMP that reaches its own MARK with no landing site in
            // between is a no-op; drop it and everything up to the MARK.
            if node.mnemonic == "JUMP" {
                let target = node.first_arg().unwrap_or("");
                if let Some(&mark) = mark_index.get(target) {
                    if mark > i {
                        let mut j = i + 1;
                        while j < mark {
                            if nodes[j].mnemonic == "MARK" || nodes[j].mnemonic == "REPL" {
                                break;
                            }
                            j += 1;
                        }
                        if j == mark {
                            i = j;
                            changed = true;
                            continue;
                        }
                    }
                }
            }

            out.push(node);
            i += 1;
        }

        if !changed {
            break;
        }
        nodes = out;
        passes += 1;
    }

    (nodes, passes)
}

/// Rewrites every jump targeting `from1` or `from2` to target `to`.
fn retarget_jumps(nodes: &mut [Instr], from1: &str, from2: &str, to: &str) {
    for node in nodes {
        if !is_jump(&node.mnemonic) {
            continue;
        }
        if let Some(arg) = node.args.first_mut() {
            if arg.text == from1 || arg.text == from2 {
                arg.text = to.to_string();
            }
        }
    }
}

/// Index of the last non-blank, non-comment instruction, if any.
fn last_code_index(nodes: &[Instr]) -> Option<usize> {
    nodes
        .iter()
        .rposition(|node| !node.is_blank() && !node.is_comment())
}

/// Index of the first non-blank, non-comment instruction at or after
/// `start`, if any.
fn next_code_index(nodes: &[Instr], start: usize) -> Option<usize> {
    nodes[start.min(nodes.len())..]
        .iter()
        .position(|node| !node.is_blank() && !node.is_comment())
        .map(|offset| start + offset)
}

#[cfg(test)]
mod tests {
    use exat_asm::{serialize, Value};
    use exat_lex::tokenize;
    use exat_par::Parser;

    use super::*;

    fn parse(source: &str) -> Program {
        Parser::new(tokenize(source)).parse().unwrap()
    }

    fn optimize_text(source: &str) -> (String, usize) {
        let (nodes, passes) = optimize(parse(source));
        (serialize(&nodes), passes)
    }

    #[test]
    fn test_plain_code_untouched() {
        let (text, passes) = optimize_text("COPY 1 X\nADDI X 1 X");
        assert_eq!(text, "COPY 1 X\nADDI X 1 X\n");
        assert_eq!(passes, 0);
    }

    #[test]
    fn test_drops_unreferenced_mark() {
        let (text, passes) = optimize_text("MARK UNUSED\nCOPY 1 X");
        assert_eq!(text, "COPY 1 X\n");
        assert_eq!(passes, 1);
    }

    #[test]
    fn test_keeps_mark_referenced_by_repl() {
        let (text, passes) = optimize_text("MARK CLONE\nREPL CLONE");
        assert_eq!(text, "MARK CLONE\nREPL CLONE\n");
        assert_eq!(passes, 0);
    }

    #[test]
    fn test_coalesces_adjacent_marks() {
        let (text, _) = optimize_text("JUMP A\nMARK B\nNOOP\nJUMP B\nMARK A\nMARK B2");
        // A and B2 survive only through their fused fresh name.
        assert!(!text.contains("MARK A\n"));
        assert!(!text.contains("MARK B2\n"));
        assert!(text.contains("MARK L0\n"));
        assert!(text.contains("JUMP L0\n"));
    }

    #[test]
    fn test_coalesce_rewrites_both_directions() {
        // FJMP sits before the pair, JUMP after: both must be renamed.
        let nodes = parse("FJMP A\nNOOP\nMARK A\nMARK B\nJUMP B");
        let (out, _) = optimize(nodes);
        let text = serialize(&out);
        assert_eq!(text, "FJMP L0\nNOOP\nMARK L0\nJUMP L0\n");
    }

    #[test]
    fn test_drops_unreachable_after_jump() {
        let (text, passes) = optimize_text("MARK TOP\nLINK 800\nJUMP TOP\nCOPY 1 X\nHALT");
        assert_eq!(text, "MARK TOP\nLINK 800\nJUMP TOP\n");
        assert_eq!(passes, 1);
    }

    #[test]
    fn test_repl_is_reachable_after_jump() {
        let (text, passes) = optimize_text("MARK TOP\nJUMP TOP\nREPL TOP\nHALT");
        assert_eq!(text, "MARK TOP\nJUMP TOP\nREPL TOP\nHALT\n");
        assert_eq!(passes, 0);
    }

    #[test]
    fn test_collapses_forward_jump_to_own_mark() {
        let (text, _) = optimize_text("TJMP KEEP\nJUMP FWD\nMARK FWD\nNOOP\nMARK KEEP");
        assert_eq!(text, "TJMP KEEP\nNOOP\nMARK KEEP\n");
    }

    #[test]
    fn test_forward_jump_blocked_by_landing_site() {
        let (text, passes) =
            optimize_text("JUMP FWD\nMARK MID\nTJMP MID\nMARK FWD\nJUMP MID");
        // MARK MID between the jump and its target keeps the jump alive.
        assert!(text.starts_with("JUMP FWD\n"));
        assert_eq!(passes, 0);
    }

    #[test]
    fn test_forward_jump_collapse_consumes_intervening_lines() {
        // The collapse advances the cursor to the target MARK, so
        // everything in between goes with the jump, comments included.
        // All of it was unreachable.
        let (text, _) = optimize_text("JUMP FWD\nNOTE GONE\nHALT\nMARK FWD\nTJMP FWD");
        assert_eq!(text, "MARK FWD\nTJMP FWD\n");
    }

    #[test]
    fn test_comments_and_blanks_survive_passes() {
        let (text, _) = optimize_text("NOTE KEEP ME\n\nMARK UNUSED\n; ALSO ME\nCOPY 1 X");
        assert_eq!(text, "NOTE KEEP ME\n\n; ALSO ME\nCOPY 1 X\n");
    }

    #[test]
    fn test_marks_separated_by_comment_still_coalesce() {
        let nodes = parse("TJMP A\nHALT\nMARK A\nNOTE BETWEEN\nMARK B\nJUMP B");
        let (out, _) = optimize(nodes);
        let text = serialize(&out);
        assert_eq!(
            text,
            "TJMP L0\nHALT\nNOTE BETWEEN\nMARK L0\nJUMP L0\n"
        );
    }

    #[test]
    fn test_fresh_labels_are_monotone_within_a_run() {
        let source = "JUMP A\nMARK A\nMARK B\nTJMP B\nJUMP C\nMARK C\nMARK D\nTJMP D";
        let nodes = parse(source);
        let (out, _) = optimize(nodes);
        let text = serialize(&out);
        assert!(text.contains("L0"));
        assert!(text.contains("L1"));
    }

    #[test]
    fn test_idempotent() {
        let sources = [
            "IF X = 1\nCOPY 1 Y\nELSE\nCOPY 2 Y\nEND",
            "WHILE\nWHILE\nBREAK\nLOOP\nBREAK\nLOOP",
            "DO\nX += 1\nLOOP WHILE X < 10",
            "MARK TOP\nJUMP TOP\nCOPY 1 X",
        ];
        for source in sources {
            let (once, _) = optimize(parse(source));
            let (twice, passes) = optimize(once.clone());
            assert_eq!(serialize(&twice), serialize(&once), "input: {source}");
            assert_eq!(passes, 0, "input: {source}");
        }
    }

    #[test]
    fn test_terminates_within_pass_cap() {
        // A deep chain of nested IFs produces long runs of adjacent marks.
        let mut source = String::new();
        for _ in 0..20 {
            source.push_str("IF X = 1\n");
        }
        source.push_str("NOOP\n");
        for _ in 0..20 {
            source.push_str("END\n");
        }
        let (_, passes) = optimize(parse(&source));
        assert!(passes < MAX_PASSES);
    }

    #[test]
    fn test_empty_program() {
        let (out, passes) = optimize(Vec::new());
        assert!(out.is_empty());
        assert_eq!(passes, 0);
    }

    #[test]
    fn test_attached_comment_travels_with_instruction() {
        let mut jump = Instr::new("JUMP", vec![Value::literal("TOP")]);
        jump.comment = vec![Value::literal("BREAK")];
        let nodes = vec![Instr::new("MARK", vec![Value::literal("TOP")]), jump];
        let (out, _) = optimize(nodes);
        assert_eq!(serialize(&out), "MARK TOP\nJUMP TOP ; BREAK\n");
    }
}
