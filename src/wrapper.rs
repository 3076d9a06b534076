use std::collections::HashSet;
use std::path::PathBuf;
use std::process::{ExitCode, ExitStatus};

use log::debug;

use crate::args::CompileArgs;
use crate::cli::Args;
use crate::depfile;
use crate::rsp::ResponseFile;
use crate::rustc::Rustc;

/// One wrapped compilation: the rule's argument triple split and folded,
/// ready to normalize the response file, run the compiler, and clean the
/// depfile.
pub struct Wrapper {
    rustc: PathBuf,
    depfile: Option<PathBuf>,
    rsp: Option<PathBuf>,
    compile: CompileArgs,
}

impl Wrapper {
    pub fn from_args(args: Args) -> anyhow::Result<Self> {
        let Args {
            rustc,
            depfile,
            rsp,
            args,
        } = args;
        let compile = CompileArgs::parse(args)?;

        Ok(Self {
            rustc,
            depfile,
            rsp,
            compile,
        })
    }

    /// Runs the pipeline: normalize the response file, invoke the compiler,
    /// strip the depfile. Returns the exit code to report to the build graph.
    pub fn run(self) -> anyhow::Result<ExitCode> {
        let mut rustc_args = self.compile.to_rustc_args();

        if let Some(path) = self.rsp {
            let rsp = ResponseFile::load(path)?;
            rsp.rewrite()?;
            rustc_args.push(rsp.to_rustc_arg());
        }

        debug!("{} compiler arguments", rustc_args.len());
        let status = Rustc::new(&self.rustc)
            .args(rustc_args)
            .envs(self.compile.env())
            .status()?;

        if !status.success() {
            // The depfile may be stale or truncated; rewriting it would hide
            // the failure from the build graph.
            return Ok(exit_code(status));
        }

        if let Some(depfile) = &self.depfile {
            let fixed: HashSet<String> = self.compile.env_keys().map(str::to_owned).collect();
            depfile::strip_env_deps(depfile, &fixed)?;
        }

        Ok(ExitCode::SUCCESS)
    }
}

/// Maps the compiler's exit status onto this process' exit code, as-is where
/// possible. A signal-killed or out-of-range status becomes a generic failure.
fn exit_code(status: ExitStatus) -> ExitCode {
    status
        .code()
        .and_then(|code| u8::try_from(code).ok())
        .map_or(ExitCode::FAILURE, ExitCode::from)
}
