//! Compile-time inputs for `BuildInfo`
//!
//! Emits `DOORWAY_GIT_HASH`, `DOORWAY_BUILD_TIMESTAMP` and
//! `DOORWAY_BUILD_PROFILE`, and forwards a non-blank `DOORWAY_BUILD_STAMP`
//! from the build environment so a release pipeline can bake in its stamp.

use std::env;
use std::process::Command;

const STAMP_VAR: &str = "DOORWAY_BUILD_STAMP";

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn emit(name: &str, value: &str) {
    println!("cargo:rustc-env={}={}", name, value);
}

fn main() {
    emit(
        "DOORWAY_GIT_HASH",
        git_short_hash().as_deref().unwrap_or("unknown"),
    );
    emit(
        "DOORWAY_BUILD_TIMESTAMP",
        &chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    );
    emit(
        "DOORWAY_BUILD_PROFILE",
        &env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
    );

    if let Some(stamp) = env::var(STAMP_VAR).ok().filter(|s| !s.trim().is_empty()) {
        emit(STAMP_VAR, stamp.trim());
    }

    // No rerun-if directives: the script runs on every build so the
    // timestamp and hash stay current.
}
