//! External command execution for probe strategies.

use tokio::process::Command;

use crate::probe::ProbeError;

/// Runs a command and returns trimmed stdout.
///
/// Non-zero exit and empty output are strategy failures. Stderr is
/// ignored; the legacy inventory tools print localized noise there even
/// on success.
pub(crate) async fn run(program: &str, args: &[&str]) -> Result<String, ProbeError> {
    // The chain runner drops this future on timeout; the child must not
    // outlive it.
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ProbeError::Launch {
            command: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ProbeError::Exit {
            command: program.to_string(),
            status: output.status,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        return Err(ProbeError::Empty);
    }
    Ok(stdout)
}

/// Runs a PowerShell expression without profile scripts or prompts.
pub(crate) async fn powershell(expression: &str) -> Result<String, ProbeError> {
    run(
        "powershell",
        &["-NoProfile", "-NonInteractive", "-Command", expression],
    )
    .await
}

/// First non-empty value among the given environment variables.
pub(crate) fn env_any(vars: &[&str], label: &'static str) -> Result<String, ProbeError> {
    for var in vars {
        if let Ok(value) = std::env::var(var) {
            let value = value.trim().to_string();
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }
    Err(ProbeError::MissingEnv(label))
}
