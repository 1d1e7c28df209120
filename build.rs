use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let commit = run_capture("git", &["rev-parse", "--short", "HEAD"])
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let tree = match run_capture("git", &["status", "--porcelain"]) {
        Some(status) if status.is_empty() => "clean",
        Some(_) => "dirty",
        None => "unknown",
    };
    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let rustc = run_capture("rustc", &["--version"]).unwrap_or_else(|| "unknown".to_string());

    emit("EXPENSE_CORE_BUILD_HASH", &commit);
    emit("EXPENSE_CORE_BUILD_STATUS", tree);
    emit("EXPENSE_CORE_BUILD_TIMESTAMP", &built_at);
    emit("EXPENSE_CORE_BUILD_TARGET", &env_or_unknown("TARGET"));
    emit("EXPENSE_CORE_BUILD_PROFILE", &env_or_unknown("PROFILE"));
    emit("EXPENSE_CORE_BUILD_RUSTC", &rustc);
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}

fn env_or_unknown(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| "unknown".to_string())
}

/// Runs a tool and returns its trimmed stdout, or `None` when it is missing or fails.
fn run_capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}
