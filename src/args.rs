use anyhow::Context;

const LDFLAGS: &str = "LDFLAGS";
const RUSTENV: &str = "RUSTENV";

/// The three argument lists a build rule flattens onto one command line,
/// separated by the literal `LDFLAGS` and `RUSTENV` sentinel tokens.
///
/// ninja cannot quote nested lists, so the rule emits
/// `<rustc args...> LDFLAGS <ldflags...> RUSTENV <KEY=VALUE...>` and leaves
/// the splitting to us.
#[derive(Debug)]
pub struct CompileArgs {
    rustc_args: Vec<String>,
    ldflags: Vec<String>,
    env: Vec<(String, String)>,
}

impl CompileArgs {
    /// Splits the positional arguments on the two sentinels.
    ///
    /// Both sentinels must be present, in that order, even when the list they
    /// introduce is empty. Tokens before `LDFLAGS` belong to the rustc
    /// arguments verbatim, even when they look like a sentinel.
    pub fn parse(args: Vec<String>) -> anyhow::Result<Self> {
        let ldflags_at = args
            .iter()
            .position(|arg| arg == LDFLAGS)
            .with_context(|| format!("No `{LDFLAGS}` sentinel in the argument list"))?;
        let rustenv_at = args
            .iter()
            .skip(ldflags_at)
            .position(|arg| arg == RUSTENV)
            .map(|at| at + ldflags_at)
            .with_context(|| format!("No `{RUSTENV}` sentinel after `{LDFLAGS}`"))?;

        let mut rustc_args = args;
        let mut env_tokens = rustc_args.split_off(rustenv_at);
        env_tokens.remove(0);
        let mut ldflags = rustc_args.split_off(ldflags_at);
        ldflags.remove(0);

        let env = env_tokens
            .iter()
            .map(|token| assignment(token))
            .collect::<anyhow::Result<_>>()?;

        Ok(Self {
            rustc_args,
            ldflags,
            env,
        })
    }

    /// Returns the full compiler argument list, with every ldflag folded into
    /// its own `-Clink-arg=` option after the rustc arguments.
    ///
    /// The build rule escapes each ldflag as a standalone shell argument while
    /// rustc takes linker arguments inside a string option; one `-Clink-arg=`
    /// per flag keeps the per-flag boundaries without re-quoting. Order is
    /// preserved.
    pub fn to_rustc_args(&self) -> Vec<String> {
        self.rustc_args
            .iter()
            .cloned()
            .chain(self.ldflags.iter().map(|flag| format!("-Clink-arg={flag}")))
            .collect()
    }

    /// The `KEY=VALUE` pairs to overlay onto the compiler's environment.
    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    /// The environment variable names fixed by this invocation.
    pub fn env_keys(&self) -> impl Iterator<Item = &str> {
        self.env.iter().map(|(key, _)| key.as_str())
    }
}

/// Splits a `KEY=VALUE` token on its first `=`; the value may contain `=` itself.
fn assignment(token: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = token.split_once('=').with_context(|| {
        format!("Malformed environment assignment `{token}` (expected KEY=VALUE)")
    })?;
    if key.is_empty() {
        anyhow::bail!("Empty key in environment assignment `{token}`");
    }

    Ok((key.to_owned(), value.to_owned()))
}
