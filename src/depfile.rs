use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;

use log::debug;

use tempfile::NamedTempFile;

const ENV_DEP_PREFIX: &str = "# env-dep:";

/// Removes the `# env-dep:KEY=VALUE` lines of the `fixed` variables from the
/// depfile at `path`.
///
/// rustc records an env-dep line for every environment variable it read
/// during the build. The variables the build rule sets on its own command
/// line are already inputs of the node, so their lines would only re-dirty it
/// on every run. Lines for other variables, and everything else in the file,
/// are preserved byte-for-byte.
///
/// A clean depfile is left untouched so its mtime survives.
pub fn strip_env_deps(path: &Path, fixed: &HashSet<String>) -> anyhow::Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read the depfile `{}`", path.display()))?;

    let Some(kept) = filter_env_deps(&contents, fixed) else {
        debug!("no fixed env-dep lines in depfile `{}`", path.display());
        return Ok(());
    };

    debug!("rewriting depfile `{}`", path.display());
    write_atomically(path, kept.as_bytes())
        .with_context(|| format!("Failed to rewrite the depfile `{}`", path.display()))
}

/// Returns the depfile contents without the env-dep lines of `fixed`
/// variables, or [`None`] when no line has to go.
///
/// Only lines starting exactly with `# env-dep:` are candidates; the key is
/// the text up to the first `=`, matched case-sensitively. Kept lines retain
/// their original terminators.
fn filter_env_deps(contents: &str, fixed: &HashSet<String>) -> Option<String> {
    let mut dirty = false;
    let kept = contents
        .split_inclusive('\n')
        .filter(|line| {
            if env_dep_key(line).is_some_and(|key| fixed.contains(key)) {
                dirty = true;
                false
            } else {
                true
            }
        })
        .collect();

    dirty.then_some(kept)
}

/// The variable name of an env-dep line, or [`None`] for any other line.
fn env_dep_key(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(ENV_DEP_PREFIX)?;

    rest.split_once('=').map(|(key, _)| key)
}

/// Write-temp-then-rename in the destination's own directory, so the rename
/// stays on one filesystem and a reader never observes a partial depfile.
/// The temporary file is removed if anything fails before the rename.
fn write_atomically(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.persist(path).map_err(|e| e.error)?;

    Ok(())
}
