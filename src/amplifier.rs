// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Amplifier chains: several interpreters running the same program, each feeding its outputs to
//! the next one's input.
//!
//! Every amplifier first receives its phase setting, and the first amplifier then receives an
//! initial signal of `0`. In a [feedback loop](run_feedback_loop), the last amplifier's outputs
//! are fed back into the first amplifier.
//!
//! ```
//! use intcode::amplifier::{max_signal, Wiring};
//! let code = [3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0];
//! let (signal, phases) = max_signal(&code, &[0, 1, 2, 3, 4], Wiring::Chain).unwrap();
//! assert_eq!(signal, 43210);
//! assert_eq!(phases, vec![4, 3, 2, 1, 0]);
//! ```

use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display};
use std::iter::{from_fn, once};

use itertools::Itertools;
use log::debug;

use crate::{Event, Interpreter, InterpreterError, State};

/// How amplifiers are connected
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Wiring {
    /// Each amplifier feeds the next, and the last one's output is the result
    Chain,
    /// Like [Chain](Wiring::Chain), but the last amplifier also feeds the first
    FeedbackLoop,
}

/// An error running amplifiers
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AmplifierError {
    /// One of the amplifiers failed
    Interpreter {
        /// Index of the failing amplifier
        amp: usize,
        /// What went wrong
        source: InterpreterError,
    },
    /// Every amplifier that hasn't halted is waiting for input that will never come
    Deadlock,
    /// The last amplifier halted without outputting a signal
    NoSignal,
}

impl Display for AmplifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interpreter { amp, source } => write!(f, "amplifier {amp} failed: {source}"),
            Self::Deadlock => write!(f, "every running amplifier is waiting for input"),
            Self::NoSignal => write!(f, "the last amplifier never produced a signal"),
        }
    }
}

impl Error for AmplifierError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Interpreter { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Run a chain of amplifiers, one per phase setting, passing `signal` to the first one, and
/// return the last amplifier's final output.
pub fn run_chain(code: &[i64], phases: &[i64], signal: i64) -> Result<i64, AmplifierError> {
    let mut signals = vec![signal];
    for (amp, &phase) in phases.iter().enumerate() {
        let mut interp = Interpreter::new(code.iter().copied());
        signals = interp
            .outputs(once(phase).chain(signals))
            .collect::<Result<_, _>>()
            .map_err(|source| AmplifierError::Interpreter { amp, source })?;
        debug!("amplifier {amp} (phase {phase}) produced {signals:?}");
    }
    signals.last().copied().ok_or(AmplifierError::NoSignal)
}

/// Run a feedback loop of amplifiers, one per phase setting, until the last amplifier halts, and
/// return the last signal it produced.
///
/// The amplifiers are scheduled round-robin: each one runs until it needs input its inbox can't
/// provide, or until it halts, then the next one gets a turn.
pub fn run_feedback_loop(code: &[i64], phases: &[i64]) -> Result<i64, AmplifierError> {
    let count = phases.len();
    let Some(last) = count.checked_sub(1) else {
        return Err(AmplifierError::NoSignal);
    };
    let mut amps: Vec<Interpreter> = (0..count)
        .map(|_| Interpreter::new(code.iter().copied()))
        .collect();
    let mut inboxes: Vec<VecDeque<i64>> = phases.iter().map(|&p| VecDeque::from([p])).collect();
    inboxes[0].push_back(0);
    let mut last_signal = None;

    loop {
        let mut progressed = false;
        for amp in 0..count {
            if amps[amp].state() == State::Halted {
                continue;
            }
            let next = (amp + 1) % count;
            loop {
                let mut inbox = std::mem::take(&mut inboxes[amp]);
                let event = amps[amp].run_until_event(&mut from_fn(|| inbox.pop_front()));
                inboxes[amp] = inbox;
                match event.map_err(|source| AmplifierError::Interpreter { amp, source })? {
                    Event::Output(signal) => {
                        debug!("amplifier {amp} sent {signal} to amplifier {next}");
                        inboxes[next].push_back(signal);
                        if amp == last {
                            last_signal = Some(signal);
                        }
                        progressed = true;
                    }
                    Event::NeedsInput => break,
                    Event::Halted => {
                        if amp == last {
                            return last_signal.ok_or(AmplifierError::NoSignal);
                        }
                        progressed = true;
                        break;
                    }
                }
            }
        }
        if !progressed {
            return Err(AmplifierError::Deadlock);
        }
    }
}

/// Try every ordering of `phase_settings`, and return the strongest final signal along with the
/// phase ordering that produced it.
pub fn max_signal(
    code: &[i64],
    phase_settings: &[i64],
    wiring: Wiring,
) -> Result<(i64, Vec<i64>), AmplifierError> {
    let mut best: Option<(i64, Vec<i64>)> = None;
    for phases in phase_settings.iter().copied().permutations(phase_settings.len()) {
        let signal = match wiring {
            Wiring::Chain => run_chain(code, &phases, 0)?,
            Wiring::FeedbackLoop => run_feedback_loop(code, &phases)?,
        };
        if best.as_ref().is_none_or(|(strongest, _)| signal > *strongest) {
            best = Some((signal, phases));
        }
    }
    best.ok_or(AmplifierError::NoSignal)
}
