//! Runs a bytecode image.
//!
//! # Usage
//! ```text
//! hybrid-vm <image> [OPTIONS]
//! ```
//!
//! # Arguments
//! - `image`: Code image to execute
//!
//! # Options
//! - `--trace`: Log every fetched instruction at debug level
//! - `--no-timestamp`: Omit timestamps from log lines
//!
//! `IN` reads whitespace-separated numbers from stdin and `OUT` prints one
//! number per line to stdout. Exit status is 0 on success, 2 when the image
//! cannot be read, and 3 when it is malformed. Stack faults abort.

use hybrid_vm::utils::log::{SHOW_DEBUG, SHOW_TIMESTAMP};
use hybrid_vm::virtual_machine::io::StdIo;
use hybrid_vm::{error, process};
use std::env;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("hybrid-vm");

    let mut image: Option<&str> = None;
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage(program);
                return ExitCode::SUCCESS;
            }
            "--trace" => SHOW_DEBUG.store(true, Ordering::Relaxed),
            "--no-timestamp" => SHOW_TIMESTAMP.store(false, Ordering::Relaxed),
            flag if flag.starts_with('-') => {
                error!("Unknown option: {}\n", flag);
                print_usage(program);
                return ExitCode::FAILURE;
            }
            path if image.is_none() => image = Some(path),
            other => {
                error!("Unexpected argument: {}\n", other);
                print_usage(program);
                return ExitCode::FAILURE;
            }
        }
    }

    let Some(image) = image else {
        print_usage(program);
        return ExitCode::FAILURE;
    };

    let res = process(image, &mut StdIo::stdio());
    ExitCode::from(res.exit_code())
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} <image> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --trace          Log every fetched instruction");
    eprintln!("  --no-timestamp   Omit timestamps from log lines");
    eprintln!("  -h, --help       Show this message");
}
