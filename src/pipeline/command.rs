use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Run `program` to completion in `cwd`, echoing its output to stderr with
/// a `[stage]` prefix on every line.
///
/// Only a failure to start the process is an error; a non-zero exit is
/// returned as the status.
pub fn run_command(
    stage: &str,
    program: &str,
    args: &[String],
    cwd: &Path,
    env: &BTreeMap<String, String>,
) -> Result<ExitStatus> {
    eprintln!("[{}] $ {} {}", stage, program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("Failed to spawn '{}' in {}", program, cwd.display()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        eprintln!("[{}] {}", stage, line);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines() {
        eprintln!("[{}] {}", stage, line);
    }

    Ok(output.status)
}
