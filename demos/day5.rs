// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 5 built using the `intcode` library.

use intcode::prelude::*;
use intcode::program::parse_program;

/// Run the diagnostic program for `system`, checking that every test before the final diagnostic
/// code passed
fn diagnose(i: Interpreter, system: i64) -> i64 {
    let mut outputs = i.into_outputs([system]);
    let mut diagnostic = None;
    for output in outputs.by_ref() {
        if let Some(previous) = diagnostic.replace(output.unwrap()) {
            assert_eq!(previous, 0, "diagnostic failed");
        }
    }
    let (i, _) = outputs.into_parts();
    assert_eq!(i.state(), State::Halted);
    diagnostic.expect("no diagnostic code")
}

fn main() {
    use std::env::args_os;
    use std::fs::read_to_string;
    let input =
        read_to_string(args_os().nth(1).expect("missing file name")).expect("failed to read file");
    let code = parse_program(&input).unwrap_or_else(|e| panic!("{e}"));
    let interpreter = Interpreter::new(code);
    println!("part 1: {}", diagnose(interpreter.clone(), 1));
    println!("part 2: {}", diagnose(interpreter, 5));
}
