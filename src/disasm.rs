// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Disassembler-related functionality
//!
//! See [disassemble] for documentation

use itertools::Itertools;

use super::{Interpreter, OpCode, Operand, ParamMode};

/// Decode `i` as an instruction, but only if it has no digits the decoder would ignore
fn parse_op_strict(i: i64) -> Option<(OpCode, [ParamMode; 3])> {
    let (opcode, modes) = Interpreter::parse_op(i).ok()?;
    let rebuilt = modes
        .iter()
        .take(opcode.arity())
        .zip([100, 1000, 10000])
        .fold(opcode as i64, |acc, (&mode, place)| acc + mode as i64 * place);
    (rebuilt == i).then_some((opcode, modes))
}

/// Create a listing of the memory, one line per instruction.
///
/// Each line starts with the address of its first int. Parameters are shown with `#` for
/// immediate mode and `@` for relative mode, and positional parameters are shown bare.
///
/// # Example
///
/// ```
/// use intcode::disasm::disassemble;
/// let listing = disassemble([109, 5, 204, 0, 1105, 1, 7, 99, 21299, 3]);
/// assert_eq!(
///     listing,
///     concat!(
///         "   0: RBO #5\n",
///         "   2: OUT @0\n",
///         "   4: JNZ #1, #7\n",
///         "   7: HALT\n",
///         "   8: DATA 21299, 3\n",
///     )
/// );
/// ```
///
/// # Caveats
///
/// Due to the ability to jump to any index, it's ambiguous where an instruction begins. The
/// approach this function uses is to start at the beginning of `mem_iter`, and treat the first
/// valid opcode that doesn't have ignored digits as the start of an instruction. Anything else,
/// including an instruction cut short by the end of memory, is shown as `DATA`.
///
/// Because Intcode programs can modify themselves, the listing only reflects their code as it
/// exists at a specific point in time.
pub fn disassemble(mem_iter: impl IntoIterator<Item = i64>) -> String {
    let mem: Vec<i64> = mem_iter.into_iter().collect();
    let mut lines = Vec::new();
    let mut offset = 0;
    let mut data_start = None;

    let flush_data = |lines: &mut Vec<String>, data_start: &mut Option<usize>, end: usize| {
        if let Some(start) = data_start.take() {
            lines.push(format!("{start:>4}: DATA {}", mem[start..end].iter().join(", ")));
        }
    };

    while offset < mem.len() {
        let instr = parse_op_strict(mem[offset])
            .filter(|(opcode, _)| offset + opcode.arity() < mem.len());
        let Some((opcode, modes)) = instr else {
            data_start.get_or_insert(offset);
            offset += 1;
            continue;
        };
        flush_data(&mut lines, &mut data_start, offset);

        let params = mem[offset + 1..=offset + opcode.arity()]
            .iter()
            .zip(modes)
            .map(|(&raw, mode)| Operand { raw, mode })
            .join(", ");
        if params.is_empty() {
            lines.push(format!("{offset:>4}: {opcode}"));
        } else {
            lines.push(format!("{offset:>4}: {opcode} {params}"));
        }
        offset += opcode.arity() + 1;
    }
    flush_data(&mut lines, &mut data_start, mem.len());

    lines.into_iter().map(|line| format!("{line}\n")).collect()
}
