// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use super::*;
use crate::trace::TracedInstr;

/// A single parameter of an instruction: the raw int stored in memory, and how to interpret it
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Operand {
    /// The int as it appears in memory
    pub raw: i64,
    /// The parameter mode it's to be interpreted with
    pub mode: ParamMode,
}

impl Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mode, self.raw)
    }
}

fn address(i: i64) -> Result<u64, InterpreterError> {
    u64::try_from(i).map_err(|_| InterpreterError::NegativeAddress(i))
}

impl ParamMode {
    /// Extract the modes of an instruction's parameters from its int.
    ///
    /// Only the digits that belong to one of `arity` parameters are checked, and the modes of any
    /// remaining parameters are reported as [ParamMode::Positional].
    pub(crate) fn extract(op: i64, arity: usize) -> Result<[ParamMode; 3], InterpreterError> {
        let mut modes = [ParamMode::Positional; 3];
        let mut digits = op / 100;
        for mode in modes.iter_mut().take(arity) {
            *mode = ParamMode::try_from(digits % 10)?;
            digits /= 10;
        }
        Ok(modes)
    }
}

impl Interpreter {
    // Given a 5 digit number, digits ABCDE are used as follows:
    // DE is the two-digit opcode
    // C is the 1st parameter's mode
    // B is the 2nd parameter's mode
    // A is the 3rd parameter's mode
    //
    // So *0*1202 would be parsed as follows:
    //
    // Opcode 02 is multiply
    // C=2: 1st parameter is in relative mode
    // B=1: 2nd parameter is in immediate mode
    // A=0: 3rd parameter is in positional mode
    /// Decode an instruction's int into its [OpCode] and the [ParamMode]s of its parameters
    ///
    /// ```
    /// use intcode::{Interpreter, OpCode, ParamMode};
    /// assert_eq!(
    ///     Interpreter::parse_op(1202),
    ///     Ok((OpCode::Mul, [ParamMode::Relative, ParamMode::Immediate, ParamMode::Positional]))
    /// );
    /// ```
    pub fn parse_op(op: i64) -> Result<(OpCode, [ParamMode; 3]), InterpreterError> {
        let opcode =
            OpCode::try_from(op % 100).map_err(|_| InterpreterError::UnknownOpcode(op))?;
        Ok((opcode, ParamMode::extract(op, opcode.arity())?))
    }

    /// The `n`th parameter (starting at 1) of the instruction at the instruction pointer
    pub(crate) fn operand(&self, modes: [ParamMode; 3], n: u64) -> Operand {
        Operand {
            raw: self.code[self.index + n],
            mode: modes[(n - 1) as usize],
        }
    }

    fn relative(&self, raw: i64) -> Result<u64, InterpreterError> {
        self.rel_offset
            .checked_add(raw)
            .ok_or(InterpreterError::RelativeBaseOverflow(raw))
            .and_then(address)
    }

    /// Processes `operand` into a concrete value using the method appropriate for its mode.
    pub fn resolve_value(&self, operand: Operand) -> Result<i64, InterpreterError> {
        match operand.mode {
            ParamMode::Positional => Ok(self.code[address(operand.raw)?]),
            ParamMode::Immediate => Ok(operand.raw),
            ParamMode::Relative => Ok(self.code[self.relative(operand.raw)?]),
        }
    }

    /// Processes `operand` into the address an instruction should write to.
    ///
    /// Immediate-mode operands can't be written to.
    pub fn resolve_address(&self, operand: Operand) -> Result<u64, InterpreterError> {
        match operand.mode {
            ParamMode::Positional => address(operand.raw),
            ParamMode::Immediate => Err(InterpreterError::InvalidWriteTarget(operand.raw)),
            ParamMode::Relative => self.relative(operand.raw),
        }
    }

    fn record(&mut self, op_int: i64, opcode: OpCode, params: &[(Operand, i64)]) {
        if let Some(trace) = self.trace.as_mut() {
            trace.0.push(TracedInstr::new(
                self.index,
                self.rel_offset,
                op_int,
                opcode,
                params,
            ));
        }
    }

    /// common logic of all 4 instructions that take 3 parameters
    fn op3(
        &mut self,
        op_int: i64,
        opcode: OpCode,
        modes: [ParamMode; 3],
        operation: impl Fn(i64, i64) -> i64,
    ) -> Result<StepOutcome, InterpreterError> {
        let (a, b, c) = (
            self.operand(modes, 1),
            self.operand(modes, 2),
            self.operand(modes, 3),
        );
        let va = self.resolve_value(a)?;
        let vb = self.resolve_value(b)?;
        let dest = self.resolve_address(c)?;
        let val = operation(va, vb);
        self.record(op_int, opcode, &[(a, va), (b, vb), (c, val)]);
        self.code.set(dest, val);
        self.index += 4;
        Ok(StepOutcome::Running)
    }

    fn jump(
        &mut self,
        op_int: i64,
        opcode: OpCode,
        modes: [ParamMode; 3],
        func: impl Fn(i64) -> bool,
    ) -> Result<StepOutcome, InterpreterError> {
        let (a, b) = (self.operand(modes, 1), self.operand(modes, 2));
        let expr = self.resolve_value(a)?;
        let dest = self.resolve_value(b)?;
        let target = if func(expr) { Some(address(dest)?) } else { None };
        self.record(op_int, opcode, &[(a, expr), (b, dest)]);
        self.index = target.unwrap_or(self.index + 3);
        Ok(StepOutcome::Running)
    }

    pub(crate) fn dispatch(
        &mut self,
        op_int: i64,
        opcode: OpCode,
        modes: [ParamMode; 3],
        inputs: &mut impl Iterator<Item = i64>,
    ) -> Result<StepOutcome, InterpreterError> {
        match opcode {
            OpCode::Add => self.op3(op_int, opcode, modes, i64::wrapping_add),
            OpCode::Mul => self.op3(op_int, opcode, modes, i64::wrapping_mul),
            OpCode::Lt => self.op3(op_int, opcode, modes, |a, b| i64::from(a < b)),
            OpCode::Eq => self.op3(op_int, opcode, modes, |a, b| i64::from(a == b)),
            OpCode::In => {
                let dest_operand = self.operand(modes, 1);
                let dest = self.resolve_address(dest_operand)?;
                let Some(input) = inputs.next() else {
                    return Ok(StepOutcome::Awaiting);
                };
                self.record(op_int, opcode, &[(dest_operand, input)]);
                self.code.set(dest, input);
                self.index += 2;
                Ok(StepOutcome::Running)
            }
            OpCode::Out => {
                let operand = self.operand(modes, 1);
                let val = self.resolve_value(operand)?;
                self.record(op_int, opcode, &[(operand, val)]);
                self.index += 2;
                Ok(StepOutcome::Output(val))
            }
            OpCode::Jnz => self.jump(op_int, opcode, modes, |i| i != 0),
            OpCode::Jz => self.jump(op_int, opcode, modes, |i| i == 0),
            OpCode::Rbo => {
                let operand = self.operand(modes, 1);
                let val = self.resolve_value(operand)?;
                let rel_offset = self
                    .rel_offset
                    .checked_add(val)
                    .ok_or(InterpreterError::RelativeBaseOverflow(val))?;
                self.record(op_int, opcode, &[(operand, val)]);
                self.rel_offset = rel_offset;
                self.index += 2;
                Ok(StepOutcome::Running)
            }
            OpCode::Halt => {
                self.record(op_int, opcode, &[]);
                Ok(StepOutcome::Halted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
use crate::trace::TracedInstr;

    #[test]
    fn decode_modes() {
        assert_eq!(
            Interpreter::parse_op(1002),
            Ok((
                OpCode::Mul,
                [
                    ParamMode::Positional,
                    ParamMode::Immediate,
                    ParamMode::Positional
                ]
            ))
        );
        assert_eq!(
            Interpreter::parse_op(21107),
            Ok((
                OpCode::Lt,
                [
                    ParamMode::Immediate,
                    ParamMode::Immediate,
                    ParamMode::Relative
                ]
            ))
        );
        // modes absent from an instruction default to positional
        assert_eq!(
            Interpreter::parse_op(5),
            Ok((OpCode::Jnz, [ParamMode::Positional; 3]))
        );
        assert_eq!(
            Interpreter::parse_op(204),
            Ok((
                OpCode::Out,
                [
                    ParamMode::Relative,
                    ParamMode::Positional,
                    ParamMode::Positional
                ]
            ))
        );
    }

    #[test]
    fn decode_rejects_bad_modes() {
        assert_eq!(
            Interpreter::parse_op(3001),
            Err(InterpreterError::InvalidAddressingMode(3))
        );
        assert_eq!(
            Interpreter::parse_op(90002),
            Err(InterpreterError::InvalidAddressingMode(9))
        );
        // digits past the last parameter have nothing to apply to
        assert_eq!(Interpreter::parse_op(21299), Ok((OpCode::Halt, [ParamMode::Positional; 3])));
        assert_eq!(
            Interpreter::parse_op(100),
            Err(InterpreterError::UnknownOpcode(100))
        );
        assert_eq!(
            Interpreter::parse_op(-99),
            Err(InterpreterError::UnknownOpcode(-99))
        );
    }

    #[test]
    fn resolution() {
        let mut interp = Interpreter::new([10, 20, 30, 40]);
        interp.rel_offset = 2;
        macro_rules! operand {
            ($raw: expr, $mode: ident) => {
                Operand {
                    raw: $raw,
                    mode: ParamMode::$mode,
                }
            };
        }
        assert_eq!(interp.resolve_value(operand!(1, Positional)), Ok(20));
        assert_eq!(interp.resolve_value(operand!(1, Immediate)), Ok(1));
        assert_eq!(interp.resolve_value(operand!(1, Relative)), Ok(40));
        assert_eq!(interp.resolve_value(operand!(-2, Relative)), Ok(10));
        assert_eq!(interp.resolve_value(operand!(99, Positional)), Ok(0));
        assert_eq!(
            interp.resolve_value(operand!(-3, Relative)),
            Err(InterpreterError::NegativeAddress(-1))
        );
        assert_eq!(interp.resolve_address(operand!(5, Positional)), Ok(5));
        assert_eq!(interp.resolve_address(operand!(5, Relative)), Ok(7));
        assert_eq!(
            interp.resolve_address(operand!(5, Immediate)),
            Err(InterpreterError::InvalidWriteTarget(5))
        );
        interp.rel_offset = i64::MIN;
        assert_eq!(
            interp.resolve_address(operand!(-1, Relative)),
            Err(InterpreterError::RelativeBaseOverflow(-1))
        );
        assert_eq!(format!("{}", operand!(-3, Relative)), "@-3");
        assert_eq!(format!("{}", operand!(4, Immediate)), "#4");
    }
}
