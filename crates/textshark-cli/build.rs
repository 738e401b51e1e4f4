//! Embeds the commit and commit date reported by `textshark --version`.

use std::env;
use std::path::Path;
use std::process::Command;

const UNKNOWN: &str = "unknown";
const SHORT_COMMIT_LEN: usize = 7;

/// Commit overrides, checked in order before asking git.
const COMMIT_VARS: [&str; 3] = ["TEXTSHARK_COMMIT", "GITHUB_SHA", "CI_COMMIT_SHA"];

struct BuildInfo {
    commit: Option<String>,
    date: Option<String>,
}

impl BuildInfo {
    fn collect() -> Self {
        let commit = COMMIT_VARS
            .iter()
            .find_map(|name| non_empty(env::var(name).ok()))
            .or_else(|| git(&["rev-parse", "HEAD"]));
        // Committer date of HEAD.
        let date = git(&["log", "-1", "--format=%cs"]);
        Self { commit, date }
    }

    fn short_commit(&self) -> &str {
        match self.commit.as_deref() {
            Some(commit) => commit.get(..SHORT_COMMIT_LEN).unwrap_or(commit),
            None => UNKNOWN,
        }
    }

    fn emit(&self) {
        set_env("TEXTSHARK_BUILD_COMMIT", self.short_commit());
        set_env(
            "TEXTSHARK_BUILD_COMMIT_FULL",
            self.commit.as_deref().unwrap_or(UNKNOWN),
        );
        set_env("TEXTSHARK_BUILD_DATE", self.date.as_deref().unwrap_or(UNKNOWN));
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    for name in COMMIT_VARS {
        println!("cargo:rerun-if-env-changed={name}");
    }
    let head = Path::new("../../.git/HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }

    BuildInfo::collect().emit();
}

fn set_env(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    non_empty(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
