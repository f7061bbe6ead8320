// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 7 built using the `intcode` library.

use intcode::amplifier::{Wiring, max_signal};
use intcode::program::parse_program;

fn main() {
    use std::env::args_os;
    use std::fs::read_to_string;
    let input =
        read_to_string(args_os().nth(1).expect("missing file name")).expect("failed to read file");
    let code = parse_program(&input).unwrap_or_else(|e| panic!("{e}"));

    let (signal, phases) = max_signal(&code, &[0, 1, 2, 3, 4], Wiring::Chain).unwrap();
    println!("part 1: {signal} (phases {phases:?})");
    let (signal, phases) = max_signal(&code, &[5, 6, 7, 8, 9], Wiring::FeedbackLoop).unwrap();
    println!("part 2: {signal} (phases {phases:?})");
}
