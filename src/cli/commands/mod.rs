//! Command implementations for the CLI.
//!
//! Each command returns the exit code for the process instead of exiting.

pub mod init;
pub mod load;
pub mod parse;

use crate::io::Envelope;
use serde::Serialize;

fn print_envelope<T: Serialize>(envelope: &Envelope<T>, pretty: bool) {
    match envelope.to_json(pretty) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing output: {e}"),
    }
}
