// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 23 built using the `intcode` library.

use intcode::network::{Network, NetworkConfig};
use intcode::program::parse_program;

fn main() {
    use std::env::args_os;
    use std::fs::read_to_string;
    env_logger::init();
    let input =
        read_to_string(args_os().nth(1).expect("missing file name")).expect("failed to read file");
    let code = parse_program(&input).unwrap_or_else(|e| panic!("{e}"));

    let mut network = Network::new(&code, NetworkConfig::default());
    let first = network.first_nat_packet().unwrap();
    println!("part 1: {} (after {} ticks)", first.y, network.ticks());

    let mut network = Network::new(&code, NetworkConfig::default());
    println!("part 2: {}", network.first_repeated_wake().unwrap());
}
