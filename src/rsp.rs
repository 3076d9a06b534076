use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use log::debug;

/// A response file: compiler arguments stored on disk and referenced on the
/// command line as `@<path>`.
///
/// The build graph writes it whitespace-separated; rustc wants exactly one
/// argument per line. Loading tokenizes the file, rewriting stores the
/// normalized form back in place.
pub struct ResponseFile {
    path: PathBuf,
    tokens: Vec<String>,
}

impl ResponseFile {
    /// Reads and tokenizes a response file, applying the Windows fix-ups on
    /// Windows hosts.
    pub fn load(path: PathBuf) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read the response file `{}`", path.display()))?;
        let tokens = normalize(&contents, cfg!(windows));
        debug!(
            "{} tokens in response file `{}`",
            tokens.len(),
            path.display()
        );

        Ok(Self { path, tokens })
    }

    /// Rewrites the file in place, one token per line.
    ///
    /// A plain in-place write is enough here: if it fails, the compile step
    /// fails with it and the build graph reruns the node from scratch.
    pub fn rewrite(&self) -> anyhow::Result<()> {
        fs::write(&self.path, self.tokens.join("\n")).with_context(|| {
            format!(
                "Failed to rewrite the response file `{}`",
                self.path.display()
            )
        })
    }

    /// The `@<path>` argument that makes rustc read this file.
    pub fn to_rustc_arg(&self) -> String {
        format!("@{}", self.path.display())
    }
}

/// Splits response-file contents on any whitespace, dropping empty tokens.
///
/// On Windows, two build-generator defects are patched up: tokens of exactly
/// `-Bdynamic` are dropped, and tokens starting with `-l` lose a trailing
/// `.lib` (the linker resolves `-lfoo`, not `-lfoo.lib`). Both fix-ups are
/// idempotent.
fn normalize(contents: &str, windows: bool) -> Vec<String> {
    contents
        .split_whitespace()
        .filter(|token| !(windows && *token == "-Bdynamic"))
        .map(|token| {
            if windows {
                if let Some(lib) = token
                    .strip_prefix("-l")
                    .and_then(|rest| rest.strip_suffix(".lib"))
                {
                    return format!("-l{lib}");
                }
            }

            token.to_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{ResponseFile, normalize};

    #[test]
    fn splits_on_any_whitespace() {
        assert_eq!(
            normalize("a\tb\nc  d\n", false),
            ["a", "b", "c", "d"]
        );
    }

    #[test]
    fn empty_contents_yield_no_tokens() {
        assert!(normalize("", false).is_empty());
        assert!(normalize(" \n\t", false).is_empty());
    }

    #[test]
    fn windows_fixups() {
        assert_eq!(
            normalize("-Bdynamic -lfoo.lib -lbar -Ldir\\sub", true),
            ["-lfoo", "-lbar", "-Ldir\\sub"]
        );
    }

    #[test]
    fn non_windows_keeps_everything() {
        assert_eq!(
            normalize("-Bdynamic -lfoo.lib -lbar -Ldir\\sub", false),
            ["-Bdynamic", "-lfoo.lib", "-lbar", "-Ldir\\sub"]
        );
    }

    #[test]
    fn only_bare_bdynamic_is_dropped() {
        assert_eq!(normalize("x-Bdynamic", true), ["x-Bdynamic"]);
        assert_eq!(normalize("-Bdynamic.lib", true), ["-Bdynamic.lib"]);
    }

    #[test]
    fn lib_suffix_needs_the_l_prefix() {
        assert_eq!(normalize("foo.lib", true), ["foo.lib"]);
        assert_eq!(normalize("-lfoo", true), ["-lfoo"]);
        assert_eq!(normalize("-l.lib", true), ["-l"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize("-Bdynamic  -lfoo.lib\n-lbar", true);
        let twice = normalize(&once.join("\n"), true);

        assert_eq!(once, twice);
    }

    #[test]
    fn load_and_rewrite_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("args.rsp");
        std::fs::write(&path, "--edition=2021\t-Copt-level=2  a.rs\n").unwrap();

        let rsp = ResponseFile::load(path.clone()).unwrap();
        rsp.rewrite().unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "--edition=2021\n-Copt-level=2\na.rs"
        );
        assert_eq!(rsp.to_rustc_arg(), format!("@{}", path.display()));
    }
}
