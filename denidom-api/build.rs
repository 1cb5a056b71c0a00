//! Embeds GIT_HASH, BUILD_TIMESTAMP and BUILD_PROFILE for the startup log line

use std::env;
use std::process::Command;

fn short_commit() -> Option<String> {
    let output = Command::new("git").args(["rev-parse", "--short=8", "HEAD"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_owned())
}

fn main() {
    let vars = [
        ("GIT_HASH", short_commit().unwrap_or_else(|| "unknown".into())),
        (
            "BUILD_TIMESTAMP",
            chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
        ),
        ("BUILD_PROFILE", env::var("PROFILE").unwrap_or_else(|_| "unknown".into())),
    ];

    for (name, value) in vars {
        println!("cargo:rustc-env={}={}", name, value);
    }
}
