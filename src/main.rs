use std::process::ExitCode;

use clap::Parser;

use env_logger::Env;

mod args;
mod cli;
mod depfile;
mod rsp;
mod rustc;
mod wrapper;

use crate::cli::Args;
use crate::wrapper::Wrapper;

/// Logging is off unless this variable holds an `env_logger` filter, e.g.
/// `debug`. The log goes to stderr, alongside the compiler's own diagnostics.
const LOG_ENV: &str = "RUSTC_WRAPPER_LOG";

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().filter_or(LOG_ENV, "off")).init();

    match Wrapper::from_args(Args::parse()).and_then(Wrapper::run) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("rustc-wrapper: {e:#}");
            ExitCode::FAILURE
        }
    }
}
