// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A packet network of interpreters, scheduled round-robin one instruction at a time.
//!
//! Every node runs the same program, and is booted with its own address as its first input. A
//! node sends a packet by outputting three ints: the destination address, then `x`, then `y`.
//! Packets are delivered into the destination's inbox, which is read in first-in, first-out
//! order. A node that reads from an empty inbox gets [NetworkConfig::idle_value] instead of
//! waiting.
//!
//! Packets sent to [NetworkConfig::nat_address] go to the NAT, which only remembers the most
//! recent one. Once the network is [idle](Network::is_idle), the NAT can [wake](Network::wake)
//! it up by sending that packet to node 0. A node that looks idle may still be computing, so an
//! idle network is left running while the NAT has nothing to send.

use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display};
use std::iter::from_fn;

use log::debug;

use crate::{Interpreter, InterpreterError, State, StepOutcome};

/// Runtime parameters of a [Network]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct NetworkConfig {
    /// Number of nodes, addressed from `0`
    pub nodes: usize,
    /// Address of the NAT. It takes priority over a node with the same address.
    pub nat_address: i64,
    /// Value a node reads when its inbox is empty
    pub idle_value: i64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            nodes: 50,
            nat_address: 255,
            idle_value: -1,
        }
    }
}

/// A packet sent between nodes
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Packet {
    /// Destination address
    pub dest: i64,
    #[allow(missing_docs, reason = "trivial")]
    pub x: i64,
    #[allow(missing_docs, reason = "trivial")]
    pub y: i64,
}

/// An error running a [Network]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NetworkError {
    /// One of the nodes failed
    Interpreter {
        /// Address of the failing node
        node: usize,
        /// What went wrong
        source: InterpreterError,
    },
    /// A packet was sent to an address with no node and no NAT
    UnknownDestination {
        /// Address of the sending node, or [`None`] if it was sent with [Network::send]
        node: Option<usize>,
        /// The address it sent to
        dest: i64,
    },
    /// Every node has halted
    AllHalted,
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interpreter { node, source } => write!(f, "node {node} failed: {source}"),
            Self::UnknownDestination {
                node: Some(node),
                dest,
            } => write!(f, "node {node} sent a packet to unknown address {dest}"),
            Self::UnknownDestination { node: None, dest } => {
                write!(f, "packet sent to unknown address {dest}")
            }
            Self::AllHalted => write!(f, "every node has halted"),
        }
    }
}

impl Error for NetworkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Interpreter { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    interp: Interpreter,
    inbox: VecDeque<i64>,
    outbox: Vec<i64>,
    /// set when the node reads from an empty inbox, and cleared when it outputs or any packet is
    /// routed
    starved: bool,
}

/// A network of interpreters, see the [module documentation](self)
#[derive(Debug, Clone)]
pub struct Network {
    nodes: Vec<Node>,
    config: NetworkConfig,
    nat: Option<Packet>,
    last_wake: Option<Packet>,
    ticks: u64,
}

impl Network {
    /// Boot a network of [NetworkConfig::nodes] nodes all running `code`
    pub fn new(code: &[i64], config: NetworkConfig) -> Self {
        let nodes = (0..config.nodes)
            .map(|address| Node {
                interp: Interpreter::new(code.iter().copied()),
                inbox: VecDeque::from([address as i64]),
                outbox: Vec::with_capacity(3),
                starved: false,
            })
            .collect();
        Self {
            nodes,
            config,
            nat: None,
            last_wake: None,
            ticks: 0,
        }
    }

    /// The number of ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The packet the NAT is currently holding
    pub fn nat_packet(&self) -> Option<Packet> {
        self.nat
    }

    /// The interpreter of node `address`
    pub fn node(&self, address: usize) -> Option<&Interpreter> {
        self.nodes.get(address).map(|node| &node.interp)
    }

    /// Deliver `packet` to its destination
    pub fn send(&mut self, packet: Packet) -> Result<(), NetworkError> {
        self.route(None, packet)
    }

    fn route(&mut self, from: Option<usize>, packet: Packet) -> Result<(), NetworkError> {
        debug!("routing {packet:?} from {from:?}");
        for node in &mut self.nodes {
            node.starved = false;
        }
        if packet.dest == self.config.nat_address {
            self.nat = Some(packet);
            return Ok(());
        }
        let node = usize::try_from(packet.dest)
            .ok()
            .and_then(|dest| self.nodes.get_mut(dest))
            .ok_or(NetworkError::UnknownDestination {
                node: from,
                dest: packet.dest,
            })?;
        node.inbox.extend([packet.x, packet.y]);
        Ok(())
    }

    /// Execute one instruction on every node that hasn't halted, in address order, then deliver
    /// any packets that were completed. Returns the delivered packets in the order they were
    /// sent.
    ///
    /// If a node fails, the nodes after it are not stepped this tick. Packets completed before
    /// the failure, and packets to valid destinations when another one is misaddressed, are
    /// still delivered before the first error is returned.
    pub fn tick(&mut self) -> Result<Vec<Packet>, NetworkError> {
        self.ticks += 1;
        let idle_value = self.config.idle_value;
        let mut sent = Vec::new();
        let mut failure = None;
        for (address, node) in self.nodes.iter_mut().enumerate() {
            let Node {
                interp,
                inbox,
                outbox,
                starved,
            } = node;
            if interp.state() == State::Halted {
                continue;
            }
            let outcome = {
                let mut input = from_fn(|| {
                    Some(inbox.pop_front().unwrap_or_else(|| {
                        *starved = true;
                        idle_value
                    }))
                });
                interp.exec_instruction(&mut input)
            };
            match outcome {
                Ok(StepOutcome::Output(value)) => {
                    *starved = false;
                    outbox.push(value);
                    if let &[dest, x, y] = outbox.as_slice() {
                        sent.push((address, Packet { dest, x, y }));
                        outbox.clear();
                    }
                }
                Ok(_) => (),
                Err(source) => {
                    failure = Some(NetworkError::Interpreter {
                        node: address,
                        source,
                    });
                    break;
                }
            }
        }
        let mut delivered = Vec::with_capacity(sent.len());
        for (address, packet) in sent {
            match self.route(Some(address), packet) {
                Ok(()) => delivered.push(packet),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        failure.map_or(Ok(delivered), Err)
    }

    /// Whether every node's inbox and outbox is empty, and every node has read from its empty
    /// inbox since it last output anything and since the last packet was routed. Halted nodes
    /// count as idle.
    pub fn is_idle(&self) -> bool {
        self.nodes.iter().all(|node| {
            node.interp.state() == State::Halted
                || (node.inbox.is_empty() && node.outbox.is_empty() && node.starved)
        })
    }

    fn all_halted(&self) -> bool {
        self.nodes
            .iter()
            .all(|node| node.interp.state() == State::Halted)
    }

    /// Send the NAT's packet to node 0, returning it. Returns [`None`] if the NAT has no packet.
    ///
    /// The NAT keeps its packet, so it can send it again if the network goes idle again before
    /// anything new is sent to the NAT.
    pub fn wake(&mut self) -> Result<Option<Packet>, NetworkError> {
        let Some(packet) = self.nat else {
            return Ok(None);
        };
        let wake = Packet { dest: 0, ..packet };
        debug!("NAT waking node 0 with {wake:?} after {} ticks", self.ticks);
        self.route(None, wake)?;
        self.last_wake = Some(wake);
        Ok(Some(wake))
    }

    /// Run until a packet is sent to the NAT, and return that packet
    pub fn first_nat_packet(&mut self) -> Result<Packet, NetworkError> {
        loop {
            let nat_address = self.config.nat_address;
            if let Some(packet) = self.tick()?.into_iter().find(|p| p.dest == nat_address) {
                return Ok(packet);
            }
            if self.all_halted() {
                return Err(NetworkError::AllHalted);
            }
        }
    }

    /// Run, waking the network through the NAT whenever it goes idle while the NAT holds a
    /// packet, until the NAT delivers the same `y` value twice in a row, and return that value
    pub fn first_repeated_wake(&mut self) -> Result<i64, NetworkError> {
        loop {
            self.tick()?;
            if self.all_halted() {
                return Err(NetworkError::AllHalted);
            }
            if !self.is_idle() {
                continue;
            }
            let previous = self.last_wake;
            if let Some(wake) = self.wake()? {
                if previous.is_some_and(|p| p.y == wake.y) {
                    return Ok(wake.y);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// reads its address `a`, sends `(a, 10 * a)` to the NAT, then reads forever
    const REPORT_TO_NAT: [i64; 17] = [
        3, 100, 104, 255, 4, 100, 1002, 100, 10, 101, 4, 101, 3, 102, 1105, 1, 12,
    ];

    fn config(nodes: usize) -> NetworkConfig {
        NetworkConfig {
            nodes,
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn first_packet_to_nat() {
        let mut network = Network::new(&REPORT_TO_NAT, config(3));
        assert_eq!(
            network.first_nat_packet(),
            Ok(Packet {
                dest: 255,
                x: 0,
                y: 0
            })
        );
        // every node finished its packet on the same tick, and the NAT kept the last one
        assert_eq!(network.ticks(), 5);
        assert_eq!(
            network.nat_packet(),
            Some(Packet {
                dest: 255,
                x: 2,
                y: 20
            })
        );
    }

    #[test]
    fn nat_wakes_idle_network() {
        let mut network = Network::new(&REPORT_TO_NAT, config(3));
        assert_eq!(network.first_repeated_wake(), Ok(20));
        assert_eq!(network.nat_packet().map(|p| p.x), Some(2));
    }

    #[test]
    fn not_idle_until_every_node_starves() {
        let mut network = Network::new(&REPORT_TO_NAT, config(2));
        for _ in 0..5 {
            network.tick().unwrap();
            assert!(!network.is_idle());
        }
        // each node reads once more from its now-empty inbox
        network.tick().unwrap();
        assert!(network.is_idle());
        assert_eq!(network.wake(), Ok(Some(Packet { dest: 0, x: 1, y: 10 })));
        assert!(!network.is_idle());
    }

    #[test]
    fn partial_packet_keeps_network_busy() {
        // reads its address and one idle value, computes a while, then sends (a, 7) to the NAT
        let code = [3, 100, 3, 101, 1101, 0, 0, 102, 104, 255, 4, 100, 104, 7, 99];
        let mut network = Network::new(&code, config(2));
        network.tick().unwrap();
        network.tick().unwrap();
        assert!(network.is_idle());
        network.tick().unwrap();
        assert!(network.is_idle());
        network.tick().unwrap();
        assert!(!network.is_idle());
        network.tick().unwrap();
        assert!(!network.is_idle());
        assert_eq!(
            network.first_nat_packet(),
            Ok(Packet {
                dest: 255,
                x: 0,
                y: 7
            })
        );
    }

    #[test]
    fn packets_survive_failing_node() {
        // node 0 sends (1, 2) to the NAT, node 1 fails on the same tick that packet completes
        let code = [
            3, 100, 1005, 100, 12, 104, 255, 104, 1, 104, 2, 99, 1101, 0, 0, 200, 1101, 0, 0, 200,
            77,
        ];
        let mut network = Network::new(&code, config(2));
        for _ in 0..4 {
            assert_eq!(network.tick(), Ok(vec![]));
        }
        assert_eq!(
            network.tick(),
            Err(NetworkError::Interpreter {
                node: 1,
                source: InterpreterError::UnknownOpcode(77)
            })
        );
        assert_eq!(
            network.nat_packet(),
            Some(Packet {
                dest: 255,
                x: 1,
                y: 2
            })
        );
    }

    #[test]
    fn errors() {
        let mut network = Network::new(&[104, 7, 104, 1, 104, 2, 99], config(2));
        network.tick().unwrap();
        network.tick().unwrap();
        assert_eq!(
            network.tick(),
            Err(NetworkError::UnknownDestination {
                node: Some(0),
                dest: 7
            })
        );
        assert_eq!(
            network.send(Packet { dest: -1, x: 0, y: 0 }),
            Err(NetworkError::UnknownDestination { node: None, dest: -1 })
        );

        assert_eq!(
            Network::new(&[99], config(4)).first_nat_packet(),
            Err(NetworkError::AllHalted)
        );
        assert_eq!(
            Network::new(&[3, 50, 77], config(1)).first_nat_packet(),
            Err(NetworkError::Interpreter {
                node: 0,
                source: InterpreterError::UnknownOpcode(77)
            })
        );
    }
}
