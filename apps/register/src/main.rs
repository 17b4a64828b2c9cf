//! # Balcão Register Entry Point
//!
//! Terminal register: one command per line on stdin, one JSON response per
//! line on stdout. See [`balcao_register::cli`] for the command grammar.

use std::process::ExitCode;

fn main() -> ExitCode {
    match balcao_register::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("balcao-register: {}", err);
            ExitCode::FAILURE
        }
    }
}
