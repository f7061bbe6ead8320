// SPDX-FileCopyrightText: 2025 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Run, disassemble, or network Intcode programs

use intcode::InterpreterError;
use intcode::amplifier::{Wiring, max_signal};
use intcode::ascii::{decode, encode_line, split_trailer};
use intcode::disasm::disassemble;
use intcode::network::{Network, NetworkConfig};
use intcode::prelude::*;
use intcode::program::parse_program;
use std::error::Error;
use std::fs::read_to_string;
use std::io::{self, Write, stdin};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

const VERSION: &str = concat!(env!("CARGO_CRATE_NAME"), '-', env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = VERSION)]
#[command(about = "Intcode virtual machine", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program, printing its outputs
    Run {
        #[arg(help = "File containing comma-separated intcode")]
        source: PathBuf,
        #[arg(short, long = "input", allow_negative_numbers = true)]
        #[arg(help = "Input to provide, in order (may be repeated)")]
        inputs: Vec<i64>,
        #[arg(short, long)]
        #[arg(help = "Treat I/O as ASCII text, reading further input from stdin")]
        ascii: bool,
        #[arg(short, long)]
        #[arg(help = "Print each executed instruction to stderr")]
        trace: bool,
    },
    /// Print a listing of a program
    Disasm {
        #[arg(help = "File containing comma-separated intcode")]
        source: PathBuf,
    },
    /// Find the strongest signal from a series of amplifiers
    Amplify {
        #[arg(help = "File containing comma-separated intcode")]
        source: PathBuf,
        #[arg(short, long)]
        #[arg(help = "Wire the amplifiers in a feedback loop, with phases 5 through 9")]
        feedback: bool,
    },
    /// Run a packet network, reporting what reaches the NAT
    Network {
        #[arg(help = "File containing comma-separated intcode")]
        source: PathBuf,
        #[arg(short, long, default_value_t = NetworkConfig::default().nodes)]
        #[arg(help = "Number of nodes in the network")]
        nodes: usize,
        #[arg(long, default_value_t = NetworkConfig::default().nat_address)]
        #[arg(help = "Address of the NAT")]
        nat_address: i64,
        #[arg(long, allow_negative_numbers = true)]
        #[arg(default_value_t = NetworkConfig::default().idle_value)]
        #[arg(help = "Value read by a node with an empty inbox")]
        idle_value: i64,
    },
}

fn read_program(path: &Path) -> Result<Vec<i64>, Box<dyn Error>> {
    let source =
        read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    Ok(parse_program(&source)?)
}

fn print_ascii(output: &[i64]) -> Result<(), Box<dyn Error>> {
    let (text, trailer) = split_trailer(output);
    print!("{}", decode(text)?);
    if let Some(trailer) = trailer {
        println!("{trailer}");
    }
    io::stdout().flush()?;
    Ok(())
}

fn interactive_run(interp: &mut Interpreter, inputs: Vec<i64>) -> Result<(), Box<dyn Error>> {
    let (output, mut state) = interp.run_through_inputs(inputs)?;
    print_ascii(&output)?;
    while state != State::Halted {
        let mut buf = String::new();
        if stdin().read_line(&mut buf)? == 0 {
            return Err(InterpreterError::InputExhausted.into());
        }
        let (output, new_state) = interp.run_through_inputs(encode_line(&buf)?)?;
        print_ascii(&output)?;
        state = new_state;
    }
    Ok(())
}

fn run(source: &Path, inputs: Vec<i64>, ascii: bool, trace: bool) -> Result<(), Box<dyn Error>> {
    let mut interp = Interpreter::new(read_program(source)?);
    if trace {
        interp.start_trace();
    }
    let result = if ascii {
        interactive_run(&mut interp, inputs)
    } else {
        interp
            .outputs(inputs)
            .try_for_each(|output| output.map(|o| println!("{o}")))
            .map_err(Box::from)
    };
    if let Some(trace) = interp.end_trace() {
        let mut stderr = io::stderr().lock();
        for instr in trace.0 {
            writeln!(stderr, "{instr}")?;
        }
    }
    result
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Run {
            source,
            inputs,
            ascii,
            trace,
        } => run(&source, inputs, ascii, trace)?,
        Command::Disasm { source } => print!("{}", disassemble(read_program(&source)?)),
        Command::Amplify { source, feedback } => {
            let code = read_program(&source)?;
            let (signal, phases) = if feedback {
                max_signal(&code, &[5, 6, 7, 8, 9], Wiring::FeedbackLoop)?
            } else {
                max_signal(&code, &[0, 1, 2, 3, 4], Wiring::Chain)?
            };
            println!("{signal} (phases {phases:?})");
        }
        Command::Network {
            source,
            nodes,
            nat_address,
            idle_value,
        } => {
            let code = read_program(&source)?;
            let config = NetworkConfig {
                nodes,
                nat_address,
                idle_value,
            };
            let first = Network::new(&code, config).first_nat_packet()?;
            println!("first packet to NAT: {}", first.y);
            let repeated = Network::new(&code, config).first_repeated_wake()?;
            println!("first repeated NAT wake: {repeated}");
        }
    }
    Ok(())
}
