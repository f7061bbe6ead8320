// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD
#![warn(missing_docs)]

//! Library providing an Intcode virtual machine with pull-based I/O, and helpers for wiring
//! several machines together.
//!
//! The interpreter is fully functional, with all of the [Opcodes] and [Parameter Modes] defined in
//! the completed Intcode computer for [Day 9].
//!
//! # Example
//!
//! ```rust
//! use intcode::prelude::*;
//! let mut interpreter = Interpreter::new(vec![104, 1024, 99]);
//!
//! assert_eq!(
//!     interpreter.run_through_inputs(empty()).unwrap(),
//!     (vec![1024], State::Halted)
//! );
//! ```
//!
//! Execution can also be driven one output at a time, with the machine suspending whenever it
//! wants input that isn't available yet:
//!
//! ```rust
//! use intcode::prelude::*;
//! // echo a single input, then halt
//! let mut interpreter = Interpreter::new([3, 0, 4, 0, 99]);
//!
//! assert_eq!(interpreter.run_until_event(&mut empty()), Ok(Event::NeedsInput));
//! assert_eq!(interpreter.run_until_event(&mut [7].into_iter()), Ok(Event::Output(7)));
//! assert_eq!(interpreter.run_until_event(&mut empty()), Ok(Event::Halted));
//! ```
//!
//! The [amplifier] and [network] modules build chains, feedback loops and packet networks out of
//! several interpreters.
//!
//! [Opcodes]: https://esolangs.org/wiki/Intcode#Opcodes
//! [Parameter Modes]: https://esolangs.org/wiki/Intcode#Parameter_Modes
//! [Day 9]: https://adventofcode.com/2019/day/9

/// A module providing a sort of logical memory management unit, using a hashmap to split memory
/// into pages, which are each contiguous in memory.
mod mmu;

mod internals;

pub mod amplifier;
pub mod ascii;
pub mod disasm;
pub mod network;
pub mod program;
pub mod trace;

use std::borrow::BorrowMut;
use std::error::Error;
use std::fmt::{self, Display};
use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

use log::{debug, trace, warn};

pub use internals::Operand;
pub use mmu::Memory;
use trace::Trace;

/// A small module that re-exports items needed when working with the Intcode interpreter
pub mod prelude {
    pub use crate::{Event, Interpreter, State, StepOutcome};
    pub use std::iter::empty;
}

/// The execution state of an [Interpreter].
///
/// [Running](State::Running) is the state of a fresh interpreter, and of one that has been given
/// input after waiting for it.
///
/// [Awaiting](State::Awaiting) means that there are more instructions to execute, but all input
/// has been consumed and the next instruction requires input.
///
/// [Halted](State::Halted) means that a `HALT` instruction has been executed. Once it's been
/// reached, no more instructions will be executed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum State {
    /// More instructions can be executed
    Running,
    /// Execution is awaiting input
    Awaiting,
    /// Execution has halted
    Halted,
}

/// The result of executing a single instruction with [Interpreter::exec_instruction]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StepOutcome {
    /// The instruction ran and produced no output
    Running,
    /// An `OUT` instruction ran, producing the contained value
    Output(i64),
    /// An `IN` instruction could not get input, so it was not executed
    Awaiting,
    /// A `HALT` instruction was reached
    Halted,
}

/// The reason [Interpreter::run_until_event] handed control back to its caller
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Event {
    /// An `OUT` instruction produced the contained value
    Output(i64),
    /// The program has halted
    Halted,
    /// The next instruction is `IN`, and the input source had nothing to give
    NeedsInput,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// An error occured when executing an intcode instruction
pub enum InterpreterError {
    /// An invalid opcode was encountered
    UnknownOpcode(i64),
    /// A parameter mode other than 0, 1, or 2 was encountered
    InvalidAddressingMode(i64),
    /// An instruction tried to write to an immediate destination
    InvalidWriteTarget(i64),
    /// A negative memory address was computed
    NegativeAddress(i64),
    /// Adding the contained value to the relative base overflowed
    RelativeBaseOverflow(i64),
    /// The program wanted input, but its input source was exhausted
    InputExhausted,
    /// The interpreter was driven again after a fatal error
    Poisoned,
}

impl InterpreterError {
    /// Whether the error reflects a defect in the running program.
    ///
    /// Fatal errors poison the interpreter. [InputExhausted] and [Poisoned] are not fatal: the
    /// former means the caller's wiring ran dry, and the latter reports an earlier fatal error.
    ///
    /// [InputExhausted]: InterpreterError::InputExhausted
    /// [Poisoned]: InterpreterError::Poisoned
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::InputExhausted | Self::Poisoned)
    }
}

impl Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOpcode(n) => write!(f, "encountered unrecognized opcode {n}"),
            Self::InvalidAddressingMode(mode) => {
                write!(f, "encountered unknown parameter mode {mode}")
            }
            Self::InvalidWriteTarget(i) => write!(f, "code attempted to write to immediate {i}"),
            Self::NegativeAddress(i) => write!(f, "code attempted to access negative address {i}"),
            Self::RelativeBaseOverflow(i) => {
                write!(f, "adding {i} to the relative base overflowed")
            }
            Self::InputExhausted => write!(f, "program requested input, but none was available"),
            Self::Poisoned => write!(f, "interpreter was used after a fatal error"),
        }
    }
}

impl Error for InterpreterError {}

/// An intcode interpreter, which can optionally keep a [Trace] of the instructions it executes.
#[derive(Clone, Debug)]
pub struct Interpreter {
    index: u64,
    rel_offset: i64,
    code: Memory,
    state: State,
    poisoned: bool,
    trace: Option<Trace>,
}

// ignore the trace field
impl PartialEq for Interpreter {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.rel_offset == other.rel_offset
            && self.state == other.state
            && self.poisoned == other.poisoned
            && self.code == other.code
    }
}

impl Index<u64> for Interpreter {
    type Output = i64;

    fn index(&self, i: u64) -> &Self::Output {
        self.code.index(i)
    }
}

impl IndexMut<u64> for Interpreter {
    fn index_mut(&mut self, i: u64) -> &mut Self::Output {
        self.code.index_mut(i)
    }
}

/// Parameter mode for Intcode instruction
///
/// Intcode instruction parameters each have a mode:  [positional], [immediate], or [relative].
///
/// When executing an intcode instruction, the instruction's parameters are interpreted in
/// accordance with their associated modes.
///
/// [positional]: ParamMode::Positional
/// [immediate]: ParamMode::Immediate
/// [relative]: ParamMode::Relative
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ParamMode {
    /// Positional Mode
    ///
    /// A parameter in positional mode evaluates to the value at the address specified by the
    /// parameter.
    Positional = 0,
    /// Immediate Mode
    ///
    /// A parameter in immediate mode evaluates directly to the value specified. Instructions which
    /// write to memory may not use immediate mode for their destinations.
    #[doc(alias = "#")]
    Immediate = 1,
    /// Relative Mode
    ///
    /// A parameter in relative mode evaluates to the value at the address specified by the
    /// parameter, added to the [Relative Base], which starts out as `0` but can be modified
    /// throughout the program's execution.
    ///
    /// [Relative Base]: https://adventofcode.com/2019/day/9
    #[doc(alias = "@")]
    Relative = 2,
}

impl Display for ParamMode {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamMode::Positional => Ok(()),
            ParamMode::Immediate => write!(fmt, "#"),
            ParamMode::Relative => write!(fmt, "@"),
        }
    }
}

impl TryFrom<i64> for ParamMode {
    type Error = InterpreterError;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(ParamMode::Positional),
            1 => Ok(ParamMode::Immediate),
            2 => Ok(ParamMode::Relative),
            _ => Err(Self::Error::InvalidAddressingMode(i)),
        }
    }
}

/// An Intcode opcode, without its parameter modes
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(missing_docs, reason = "trivial")]
pub enum OpCode {
    Add = 1,
    Mul = 2,
    In = 3,
    Out = 4,
    Jnz = 5,
    Jz = 6,
    Lt = 7,
    Eq = 8,
    Rbo = 9,
    Halt = 99,
}

impl OpCode {
    /// The number of parameters an instruction with this opcode takes
    pub const fn arity(self) -> usize {
        match self {
            OpCode::Add | OpCode::Mul | OpCode::Lt | OpCode::Eq => 3,
            OpCode::Jnz | OpCode::Jz => 2,
            OpCode::In | OpCode::Out | OpCode::Rbo => 1,
            OpCode::Halt => 0,
        }
    }
}

impl TryFrom<i64> for OpCode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            1 => Ok(OpCode::Add),
            2 => Ok(OpCode::Mul),
            3 => Ok(OpCode::In),
            4 => Ok(OpCode::Out),
            5 => Ok(OpCode::Jnz),
            6 => Ok(OpCode::Jz),
            7 => Ok(OpCode::Lt),
            8 => Ok(OpCode::Eq),
            9 => Ok(OpCode::Rbo),
            99 => Ok(OpCode::Halt),
            _ => Err(i),
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpCode::Add => "ADD",
            OpCode::Mul => "MUL",
            OpCode::In => "IN",
            OpCode::Out => "OUT",
            OpCode::Jnz => "JNZ",
            OpCode::Jz => "JZ",
            OpCode::Lt => "LT",
            OpCode::Eq => "EQ",
            OpCode::Rbo => "RBO",
            OpCode::Halt => "HALT",
        })
    }
}

impl Interpreter {
    /// Create a new interpreter. Collects `code` into the starting memory state.
    pub fn new(code: impl IntoIterator<Item = i64>) -> Self {
        Self {
            index: 0,
            rel_offset: 0,
            code: code.into_iter().collect(),
            state: State::Running,
            poisoned: false,
            trace: None,
        }
    }

    /// Manually set a memory location
    #[doc(alias("poke", "write"))]
    pub fn mem_override(&mut self, location: u64, value: i64) {
        self.code.set(location, value);
    }

    /// Get the memory at `address`
    #[doc(alias = "peek")]
    pub fn mem_get(&self, address: u64) -> i64 {
        self.code[address]
    }

    /// A view of the interpreter's whole memory
    pub fn memory(&self) -> &Memory {
        &self.code
    }

    /// The address of the next instruction to execute
    pub fn instr_ptr(&self) -> u64 {
        self.index
    }

    /// The current relative base
    pub fn rel_base(&self) -> i64 {
        self.rel_offset
    }

    /// The current execution state
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether a fatal error has occured. A poisoned interpreter refuses to run.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Execute a single instruction, pulling from `inputs` only if it's an `IN` instruction.
    ///
    /// If `inputs` has nothing to give, the `IN` instruction is not executed, and
    /// [StepOutcome::Awaiting] is returned. The next call will retry the same instruction.
    ///
    /// Once halted, no more instructions are executed, and [StepOutcome::Halted] is returned for
    /// every call. A fatal error poisons the interpreter, so every later call returns
    /// [InterpreterError::Poisoned].
    pub fn exec_instruction(
        &mut self,
        inputs: &mut impl Iterator<Item = i64>,
    ) -> Result<StepOutcome, InterpreterError> {
        if self.poisoned {
            return Err(InterpreterError::Poisoned);
        }
        if self.state == State::Halted {
            return Ok(StepOutcome::Halted);
        }

        let instruction = self.code[self.index];
        trace!(
            "ip: {:>8} | rbo: {:>5} | {instruction:05}",
            self.index, self.rel_offset
        );
        let outcome = Self::parse_op(instruction)
            .and_then(|(opcode, modes)| self.dispatch(instruction, opcode, modes, inputs));

        match outcome {
            Ok(StepOutcome::Awaiting) => {
                if self.state != State::Awaiting {
                    debug!("awaiting input at {}", self.index);
                }
                self.state = State::Awaiting;
            }
            Ok(StepOutcome::Halted) => {
                debug!("halted at {}", self.index);
                self.state = State::Halted;
            }
            Ok(_) => self.state = State::Running,
            Err(e) => {
                warn!("interpreter poisoned at {}: {e}", self.index);
                self.poisoned = true;
            }
        }
        outcome
    }

    /// Execute until the program outputs a value, halts, or needs input it can't get from
    /// `inputs`, and report which of those happened.
    pub fn run_until_event(
        &mut self,
        inputs: &mut impl Iterator<Item = i64>,
    ) -> Result<Event, InterpreterError> {
        loop {
            match self.exec_instruction(inputs)? {
                StepOutcome::Running => (),
                StepOutcome::Output(value) => break Ok(Event::Output(value)),
                StepOutcome::Awaiting => break Ok(Event::NeedsInput),
                StepOutcome::Halted => break Ok(Event::Halted),
            }
        }
    }

    /// Execute until either the program halts, or it tries to read nonexistent input.
    /// If the interpreter stopped, returns `Ok((v, s))`, where `v` is a [`Vec<i64>`] containing
    /// all outputs that it found, and `s` is the [`State`] at the time it stopped.
    ///
    /// On error, it will return an [`InterpreterError`] that reflects the error.
    pub fn run_through_inputs(
        &mut self,
        inputs: impl IntoIterator<Item = i64>,
    ) -> Result<(Vec<i64>, State), InterpreterError> {
        let mut outputs = Vec::new();
        let mut inputs = inputs.into_iter();
        loop {
            match self.run_until_event(&mut inputs)? {
                Event::Output(value) => outputs.push(value),
                Event::NeedsInput => break Ok((outputs, State::Awaiting)),
                Event::Halted => break Ok((outputs, State::Halted)),
            }
        }
    }

    /// Lazily run the program, yielding each output as it's produced.
    ///
    /// # Example
    ///
    /// ```
    /// use intcode::prelude::*;
    /// // add the two inputs, then halt
    /// let mut interp = Interpreter::new([3, 11, 3, 12, 1, 11, 12, 11, 4, 11, 99]);
    /// let outputs: Result<Vec<i64>, _> = interp.outputs([40, 2]).collect();
    /// assert_eq!(outputs.unwrap(), vec![42]);
    /// assert_eq!(interp.state(), State::Halted);
    /// ```
    pub fn outputs<I: IntoIterator<Item = i64>>(
        &mut self,
        inputs: I,
    ) -> Outputs<&mut Self, I::IntoIter> {
        Outputs::new(self, inputs.into_iter())
    }

    /// Like [Interpreter::outputs], but takes ownership of the interpreter, so that the returned
    /// sequence can be stored or passed around on its own.
    pub fn into_outputs<I: IntoIterator<Item = i64>>(self, inputs: I) -> Outputs<Self, I::IntoIter> {
        Outputs::new(self, inputs.into_iter())
    }
}

/// A lazily-produced sequence of an [Interpreter]'s outputs
///
/// Each call to [next](Iterator::next) runs the interpreter until it produces an output, halts,
/// or fails. Halting ends the sequence. Needing input that `inputs` can't provide is reported as
/// [InterpreterError::InputExhausted], after which the sequence ends, but the interpreter remains
/// usable.
#[derive(Debug)]
pub struct Outputs<B, I> {
    interp: B,
    inputs: I,
    done: bool,
}

impl<B: BorrowMut<Interpreter>, I: Iterator<Item = i64>> Outputs<B, I> {
    fn new(interp: B, inputs: I) -> Self {
        Self {
            interp,
            inputs,
            done: false,
        }
    }

    /// Split back into the interpreter and the remaining inputs
    pub fn into_parts(self) -> (B, I) {
        (self.interp, self.inputs)
    }
}

impl<B: BorrowMut<Interpreter>, I: Iterator<Item = i64>> Iterator for Outputs<B, I> {
    type Item = Result<i64, InterpreterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.interp.borrow_mut().run_until_event(&mut self.inputs) {
            Ok(Event::Output(value)) => Some(Ok(value)),
            Ok(Event::Halted) => {
                self.done = true;
                None
            }
            Ok(Event::NeedsInput) => {
                self.done = true;
                Some(Err(InterpreterError::InputExhausted))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<B: BorrowMut<Interpreter>, I: Iterator<Item = i64>> FusedIterator for Outputs<B, I> {}
