use std::path::PathBuf;

#[derive(clap::Parser)]
#[command(name = "rustc-wrapper", version, author, about, long_about)]
pub struct Args {
    /// Path to the rustc executable to invoke
    #[clap(long, value_name = "PATH")]
    pub rustc: PathBuf,

    /// Depfile to post-process once the compiler has succeeded
    #[clap(long, value_name = "PATH")]
    pub depfile: Option<PathBuf>,

    /// Response file to normalize in place and pass to the compiler as `@<PATH>`
    #[clap(long, value_name = "PATH")]
    pub rsp: Option<PathBuf>,

    /// Arguments given to rustc, followed by `LDFLAGS <ldflags...> RUSTENV <KEY=VALUE...>`
    #[clap(raw = true, required = true)]
    pub args: Vec<String>,
}
