// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Structured tracing of executed instructions
//!
//! See [Interpreter::start_trace]
use std::fmt::{self, Display};

use super::{Interpreter, OpCode, Operand, ParamMode};

const UNUSED: (Operand, i64) = (
    Operand {
        raw: 0,
        mode: ParamMode::Positional,
    },
    0,
);

/// A record of one executed instruction, with each operand paired with the value it resolved to.
///
/// For an operand that was written to, the paired value is the value that was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedInstr {
    instr_ptr: u64,
    rel_base: i64,
    op_int: i64,
    opcode: OpCode,
    params: [(Operand, i64); 3],
}

impl TracedInstr {
    pub(crate) fn new(
        instr_ptr: u64,
        rel_base: i64,
        op_int: i64,
        opcode: OpCode,
        resolved: &[(Operand, i64)],
    ) -> Self {
        debug_assert_eq!(resolved.len(), opcode.arity());
        let mut params = [UNUSED; 3];
        params
            .iter_mut()
            .zip(resolved)
            .for_each(|(slot, &param)| *slot = param);
        Self {
            instr_ptr,
            rel_base,
            op_int,
            opcode,
            params,
        }
    }

    /// The relative base before the instruction ran
    pub fn rel_base(&self) -> i64 {
        self.rel_base
    }

    /// The address of the instruction
    pub fn instr_ptr(&self) -> u64 {
        self.instr_ptr
    }

    /// The instruction's int, including its parameter modes
    pub fn op_int(&self) -> i64 {
        self.op_int
    }

    #[allow(missing_docs, reason = "trivial")]
    pub fn op_code(&self) -> OpCode {
        self.opcode
    }

    /// The instruction's operands, each with the value it resolved to
    pub fn params(&self) -> &[(Operand, i64)] {
        &self.params[..self.opcode.arity()]
    }

    fn stores(&self) -> bool {
        matches!(
            self.opcode,
            OpCode::Add | OpCode::Mul | OpCode::Lt | OpCode::Eq | OpCode::In
        )
    }

    /// If the instruction stored a value, return that value
    pub fn stored_val(&self) -> Option<i64> {
        self.stores()
            .then(|| self.params().last().map(|&(_, v)| v))
            .flatten()
    }

    /// The parameter modes, with unused parameters reported as [ParamMode::Positional]
    pub fn param_modes(&self) -> [ParamMode; 3] {
        self.params.map(|(operand, _)| operand.mode)
    }

    fn jumped(&self) -> bool {
        match self.opcode {
            OpCode::Jnz => self.params[0].1 != 0,
            OpCode::Jz => self.params[0].1 == 0,
            _ => false,
        }
    }
}

impl Display for TracedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}: {:<5} | {}", self.instr_ptr, self.op_int, self.opcode)?;
        let params = self.params();
        for (n, (operand, value)) in params.iter().enumerate() {
            let sep = if n == 0 { " " } else { ", " };
            let arrow = if self.stores() && n + 1 == params.len() {
                "<-"
            } else {
                "=>"
            };
            write!(f, "{sep}{operand} {arrow} {value}")?;
        }
        match self.opcode {
            OpCode::Jnz | OpCode::Jz if self.jumped() => f.write_str(" (jumped)"),
            OpCode::Jnz | OpCode::Jz => f.write_str(" (no jump)"),
            OpCode::Rbo => write!(
                f,
                " (base {} -> {})",
                self.rel_base,
                self.rel_base.wrapping_add(self.params[0].1)
            ),
            _ => Ok(()),
        }
    }
}

/// A log of instructions that an [Interpreter] has executed since a call to
/// [Interpreter::start_trace]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Trace(pub Vec<TracedInstr>);

impl Interpreter {
    /// Begin a [Trace] of executed instructions. If a trace is already running, this replaces that
    /// trace and returns in a [`Some`], otherwise, it returns [`None`].
    ///
    /// Instructions that fail or wait for input are not recorded.
    ///
    /// # Example
    /// ```
    /// use intcode::prelude::*;
    /// let mut interp = Interpreter::new([1101, 90, 9, 5, 104, 0, 99]);
    /// interp.start_trace();
    /// assert_eq!(interp.run_through_inputs(empty()).unwrap(), (vec![99], State::Halted));
    /// let trace = interp.end_trace().unwrap();
    /// assert_eq!(trace.0.len(), 3);
    /// assert_eq!(trace.0[0].stored_val(), Some(99));
    /// ```
    pub fn start_trace(&mut self) -> Option<Trace> {
        self.trace.replace(Trace::default())
    }

    /// Stop tracing, returning the trace if one was running
    pub fn end_trace(&mut self) -> Option<Trace> {
        self.trace.take()
    }

    /// Get a view of the current trace
    pub fn show_trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter::empty;

    #[test]
    fn traced_rbo_and_jump() {
        let mut interp = Interpreter::new([109, 7, 1205, 0, 6, 99, 204, -7, 99]);
        interp.start_trace();
        let (outputs, _) = interp.run_through_inputs(empty()).unwrap();
        assert_eq!(outputs, vec![109]);
        let Trace(trace) = interp.end_trace().unwrap();
        let rendered: Vec<String> = trace.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "   0: 109   | RBO #7 => 7 (base 0 -> 7)",
                "   2: 1205  | JNZ @0 => -7, #6 => 6 (jumped)",
                "   6: 204   | OUT @-7 => 109",
                "   8: 99    | HALT",
            ]
        );
        assert_eq!(trace[3].stored_val(), None);
        assert!(trace[3].params().is_empty());
        assert_eq!(trace[2].rel_base(), 7);
        assert!(interp.show_trace().is_none());
    }

    #[test]
    fn stores_are_traced() {
        // IN @11; LT #4, 11, 10; JZ 10, #12; HALT
        let mut interp = Interpreter::new([203, 11, 107, 4, 11, 10, 1006, 10, 12, 99, 0, 0]);
        interp.start_trace();
        assert_eq!(
            interp.run_through_inputs([9]).unwrap(),
            (vec![], crate::State::Halted)
        );
        let Trace(trace) = interp.end_trace().unwrap();
        let stored: Vec<_> = trace.iter().map(TracedInstr::stored_val).collect();
        assert_eq!(stored, [Some(9), Some(1), None, None]);
        assert_eq!(
            trace[1].param_modes(),
            [
                ParamMode::Immediate,
                ParamMode::Positional,
                ParamMode::Positional
            ]
        );
        assert_eq!(trace[0].to_string(), "   0: 203   | IN @11 <- 9");
        assert_eq!(trace[1].to_string(), "   2: 107   | LT #4 => 4, 11 => 9, 10 <- 1");
        assert_eq!(trace[2].to_string(), "   6: 1006  | JZ 10 => 1, #12 => 12 (no jump)");
        assert_eq!(trace[3].instr_ptr(), 9);
    }

    #[test]
    fn failed_instructions_are_not_traced() {
        let mut interp = Interpreter::new([3, 5, 77]);
        interp.start_trace();
        assert_eq!(interp.run_through_inputs(empty()), Ok((vec![], crate::State::Awaiting)));
        assert!(interp.show_trace().is_some_and(|t| t.0.is_empty()));
        assert!(interp.run_through_inputs([1]).is_err());
        assert_eq!(interp.end_trace().map(|t| t.0.len()), Some(1));
    }
}
