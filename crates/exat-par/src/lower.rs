//! Lowering of structured constructs to marks and jumps.
//!
//! Each construct expands to a fixed skeleton of `MARK`/`JUMP`/`TJMP`/
//! `FJMP` instructions around its already-flat body. Redundant labels and
//! jumps left behind by the expansion are the optimizer's problem, not
//! ours.

use exat_asm::{Instr, Value};

use crate::ast::{Do, If, While};

/// Flattens an `IF` chain.
///
/// ```text
/// MARK <label>
/// <test>                     omitted for ISTRUE/ISFALSE conditions
/// TJMP <label>_NEXT          when negated, else FJMP <label>_NEXT
/// <body>
/// JUMP <parent end | <label>_END>
/// MARK <label>_NEXT
/// <ELSE IF chain, each jumping to this construct's end>
/// <else body>
/// MARK <label>_END
/// ```
///
/// `parent_end` is set when this node is an `ELSE IF` clause, so that a
/// taken clause skips the rest of the chain.
pub(crate) fn lower_if(node: If, parent_end: Option<&Value>) -> Vec<Instr> {
    let label = Value::literal(node.label.clone());
    let next_label = Value::literal(format!("{}_NEXT", node.label));
    let end_label = Value::literal(format!("{}_END", node.label));

    let mut out = Vec::new();
    out.push(Instr::new("MARK", vec![label]));

    if let Some(test) = node.cond.test {
        out.push(test);
    }

    if node.cond.negate {
        out.push(Instr::new("TJMP", vec![next_label.clone()]));
    } else {
        out.push(Instr::new("FJMP", vec![next_label.clone()]));
    }

    out.extend(node.body);

    let jump_target = parent_end.unwrap_or(&end_label).clone();
    out.push(Instr::new("JUMP", vec![jump_target]));
    out.push(Instr::new("MARK", vec![next_label]));

    for else_if in node.else_if {
        out.extend(lower_if(else_if, Some(&end_label)));
    }

    out.extend(node.else_body);
    out.push(Instr::new("MARK", vec![end_label]));
    out
}

/// Flattens a `WHILE … LOOP`.
///
/// The test sits at the top; endless loops skip it entirely and rely on
/// `BREAK` to get out.
pub(crate) fn lower_while(node: While) -> Vec<Instr> {
    let label = Value::literal(node.label.clone());
    let end_label = Value::literal(format!("{}_END", node.label));

    let mut out = Vec::new();
    out.push(Instr::new("MARK", vec![label.clone()]));

    if !node.endless {
        if let Some(test) = node.cond.test {
            out.push(test);
        }
        if node.cond.negate {
            out.push(Instr::new("TJMP", vec![end_label.clone()]));
        } else {
            out.push(Instr::new("FJMP", vec![end_label.clone()]));
        }
    }

    out.extend(node.body);
    out.push(Instr::new("JUMP", vec![label]));
    out.push(Instr::new("MARK", vec![end_label]));
    out
}

/// Flattens a `DO … LOOP [WHILE …]`.
///
/// The body runs at least once; the test (when present) sits at the
/// bottom and jumps back on the continuing sense.
pub(crate) fn lower_do(node: Do) -> Vec<Instr> {
    let label = Value::literal(node.label.clone());
    let end_label = Value::literal(format!("{}_END", node.label));

    let mut out = Vec::new();
    out.push(Instr::new("MARK", vec![label.clone()]));
    out.extend(node.body);

    if node.endless {
        out.push(Instr::new("JUMP", vec![label]));
    } else {
        if let Some(test) = node.cond.test {
            out.push(test);
        }
        if node.cond.negate {
            out.push(Instr::new("FJMP", vec![label]));
        } else {
            out.push(Instr::new("TJMP", vec![label]));
        }
    }

    out.push(Instr::new("MARK", vec![end_label]));
    out
}
