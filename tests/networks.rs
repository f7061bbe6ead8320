//! Test packet networks built from several interpreters
// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use intcode::network::{Network, NetworkConfig, Packet};
use intcode::prelude::*;

/// Reads its address, then forwards every `(x, y)` it receives to the NAT, skipping idle reads
const RELAY_TO_NAT: [i64; 22] = [
    3, 100, // IN 100
    3, 101, // IN 101
    1008, 101, -1, 102, // EQ 101, #-1, 102
    1005, 102, 2, // JNZ 102, #2
    3, 103, // IN 103
    104, 255, // OUT #255
    4, 101, // OUT 101
    4, 103, // OUT 103
    1105, 1, 2, // JNZ #1, #2
];

fn packet(dest: i64, x: i64, y: i64) -> Packet {
    Packet { dest, x, y }
}

fn config(nodes: usize) -> NetworkConfig {
    NetworkConfig {
        nodes,
        ..NetworkConfig::default()
    }
}

#[test]
fn inbox_is_first_in_first_out() {
    let mut network = Network::new(&RELAY_TO_NAT, config(2));
    network.send(packet(1, 10, 11)).unwrap();
    network.send(packet(1, 20, 21)).unwrap();
    let mut delivered = Vec::new();
    while delivered.len() < 2 && network.ticks() < 200 {
        delivered.extend(network.tick().unwrap());
    }
    assert_eq!(delivered, vec![packet(255, 10, 11), packet(255, 20, 21)]);
    assert_eq!(network.nat_packet(), Some(packet(255, 20, 21)));
}

#[test]
fn nat_repeats_last_packet() {
    let mut network = Network::new(&RELAY_TO_NAT, config(3));
    network.send(packet(2, 1, 5)).unwrap();
    network.send(packet(1, 2, 8)).unwrap();
    // both packets reach the NAT on the same tick, and node 2 sends after node 1
    assert_eq!(network.first_repeated_wake(), Ok(5));
    assert_eq!(network.nat_packet(), Some(packet(255, 1, 5)));
}

#[test]
fn idle_network_keeps_running_without_nat_packet() {
    let mut network = Network::new(&RELAY_TO_NAT, config(4));
    network.tick().unwrap();
    network.tick().unwrap();
    assert!(network.is_idle());
    assert_eq!(network.wake(), Ok(None));
    // a packet arriving later still gets through
    network.send(packet(3, 4, 5)).unwrap();
    assert!(!network.is_idle());
    assert_eq!(network.first_nat_packet(), Ok(packet(255, 4, 5)));
}

#[test]
fn node_can_send_after_reading_idle_value() {
    // reads its address and one idle value, then sends (1, 2) to the NAT
    let code = [3, 100, 3, 101, 104, 255, 104, 1, 104, 2, 99];
    let mut network = Network::new(&code, config(2));
    assert_eq!(network.first_nat_packet(), Ok(packet(255, 1, 2)));
    assert_eq!(network.ticks(), 5);
}

#[test]
fn nodes_are_booted_with_their_address() {
    let mut network = Network::new(&RELAY_TO_NAT, config(3));
    network.tick().unwrap();
    for address in 0..3 {
        let node = network.node(address).unwrap();
        assert_eq!(node.mem_get(100), address as i64);
        assert_eq!(node.state(), State::Running);
    }
    assert!(network.node(3).is_none());
}

#[test]
fn custom_nat_address_and_idle_value() {
    // reads its address, then outputs whatever it reads next to address 9
    let code = [3, 50, 3, 51, 104, 9, 4, 50, 4, 51, 99];
    let config = NetworkConfig {
        nodes: 2,
        nat_address: 9,
        idle_value: -7,
    };
    let mut network = Network::new(&code, config);
    assert_eq!(network.first_nat_packet(), Ok(packet(9, 0, -7)));
}
