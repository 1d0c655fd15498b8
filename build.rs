// Embeds commit and target information for `fbk --version`

use std::process::Command;

fn git_output(args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}

fn main() {
    let commit = git_output(&["rev-parse", "--short", "HEAD"]);
    let commit_date = git_output(&["log", "-1", "--format=%cs"]);
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=FBK_COMMIT={commit}");
    println!("cargo:rustc-env=FBK_COMMIT_DATE={commit_date}");
    println!("cargo:rustc-env=FBK_TARGET={target}");

    println!("cargo:rerun-if-changed=.git/HEAD");
}
