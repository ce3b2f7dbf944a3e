//! Build metadata baked in by `build.rs`.

/// Package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short commit hash, or `unknown` outside a git checkout.
pub const GIT_COMMIT: &str = env!("DEVMATE_BUILD_GIT_HASH");

/// UTC build timestamp.
pub const BUILD_TIMESTAMP: &str = env!("DEVMATE_BUILD_TIMESTAMP");

/// Trailer appended to `devmate --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("DEVMATE_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("DEVMATE_BUILD_TIMESTAMP")
);

/// One-line banner shown when the interactive session starts.
pub fn banner_line() -> String {
    format!("devmate v{VERSION} ({GIT_COMMIT})")
}

/// Text printed by `devmate --version`.
pub fn cli_version_text() -> String {
    format!("devmate {VERSION}\ncommit: {GIT_COMMIT}\nbuilt: {BUILD_TIMESTAMP}")
}
