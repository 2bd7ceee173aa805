//! Build script for cev-api
//!
//! Embeds build identification for the startup log line and
//! `GET /api/buildinfo`:
//! - `GIT_HASH`: short commit hash, or "unknown" outside a git checkout
//! - `BUILD_TIMESTAMP`: UTC build time, RFC 3339 to the second
//! - `BUILD_PROFILE`: cargo profile (debug/release)

use std::process::Command;

/// Short hash of HEAD; None when git is missing or this is not a checkout
fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;

    // A failed rev-parse still prints to stderr; ignore its stdout
    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn main() {
    let git_hash = git_short_hash().unwrap_or_else(|| "unknown".to_string());

    // Seconds precision is enough to tell two builds apart in the log
    let build_timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    // Set by cargo for build scripts
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    // Exposed to the crate as env!("GIT_HASH") etc.
    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);

    // No rerun-if-changed lines: cargo reruns this script on every build,
    // keeping the hash and timestamp current
}
