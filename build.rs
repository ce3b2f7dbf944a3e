//! Injects build metadata (commit hash, build time) for `devmate --version`.
//!
//! Missing git or `date` tooling degrades to "unknown" markers instead of
//! failing the build.

use std::env;
use std::fs;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

const HASH_VAR: &str = "DEVMATE_BUILD_GIT_HASH";
const TIMESTAMP_VAR: &str = "DEVMATE_BUILD_TIMESTAMP";

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    watch_branch_ref();
    println!("cargo:rerun-if-env-changed={HASH_VAR}");
    println!("cargo:rerun-if-env-changed={TIMESTAMP_VAR}");

    let git_hash = env::var(HASH_VAR).unwrap_or_else(|_| short_commit());
    let built_at = env::var(TIMESTAMP_VAR).unwrap_or_else(|_| utc_timestamp());

    println!("cargo:rustc-env={HASH_VAR}={git_hash}");
    println!("cargo:rustc-env={TIMESTAMP_VAR}={built_at}");
}

fn watch_branch_ref() {
    let Ok(head) = fs::read_to_string(".git/HEAD") else {
        return;
    };
    if let Some(reference) = head.trim().strip_prefix("ref: ") {
        println!("cargo:rerun-if-changed=.git/{reference}");
    }
}

fn short_commit() -> String {
    capture("git", &["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".to_string())
}

fn utc_timestamp() -> String {
    capture("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]).unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("unix:{secs}")
    })
}

fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
