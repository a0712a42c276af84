use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use maven_fetch::{Fetcher, Platform};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::cli::FlywayCommand;
use crate::config::FlywayConfig;
use crate::error::{AppError, Result};

/// `-key=value` for every entry of `flywayArgs`, in file order
pub fn flyway_args(config: &FlywayConfig) -> Vec<String> {
    config
        .flyway_args
        .iter()
        .map(|(key, value)| format!("-{key}={value}"))
        .collect()
}

/// Full argument list: configured arguments followed by the sub-command
pub fn build_args(config: &FlywayConfig, command: FlywayCommand) -> Vec<String> {
    let mut args = flyway_args(config);
    args.push(command.name().to_string());
    args
}

/// How the launcher gets started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnPlan {
    /// Run the launcher directly, no shell involved
    Direct { program: PathBuf, args: Vec<String> },
    /// Hand a single pre-quoted line to `cmd`
    Shell { command_line: String },
}

impl SpawnPlan {
    pub fn new(executable: &Path, args: Vec<String>, platform: Platform) -> Self {
        let has_whitespace = executable
            .to_string_lossy()
            .chars()
            .any(char::is_whitespace);

        if platform.is_windows() && has_whitespace {
            let mut command_line = format!("\"{}\"", executable.display());
            for arg in &args {
                command_line.push(' ');
                command_line.push_str(arg);
            }
            Self::Shell { command_line }
        } else {
            Self::Direct {
                program: executable.to_path_buf(),
                args,
            }
        }
    }
}

impl From<SpawnPlan> for Command {
    fn from(plan: SpawnPlan) -> Self {
        match plan {
            SpawnPlan::Direct { program, args } => {
                let mut command = Command::new(program);
                command.args(args);
                command
            }
            SpawnPlan::Shell { command_line } => {
                let mut command = Command::new("cmd");
                command.arg("/S").arg("/C");
                // cmd strips the outer quotes and keeps the quoted path intact
                #[cfg(windows)]
                command.raw_arg(format!("\"{command_line}\""));
                #[cfg(not(windows))]
                command.arg(command_line);
                command
            }
        }
    }
}

/// Refuse to start anything that is not a regular file
pub async fn ensure_is_file(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(AppError::SpawnSetup(format!(
            "Flyway bin was not found at \"{}\"",
            path.display()
        ))),
    }
}

/// Make Flyway available, run `command` and return its exit code
pub async fn run(
    config: &FlywayConfig,
    command: FlywayCommand,
    fetcher: &Fetcher,
    platform: Platform,
) -> Result<i32> {
    let executable = fetcher
        .ensure_artifacts(&config.artifacts_config(platform))
        .await?;
    ensure_is_file(&executable).await?;

    let args = build_args(config, command);
    info!(command = command.name(), path = ?executable, "Running Flyway");

    let plan = SpawnPlan::new(&executable, args, platform);
    spawn(plan, &config.env_vars()).await
}

/// Start the plan with inherited stdio and wait for it to finish.
///
/// Interrupts are left to the child, which receives them from the terminal
/// as well; the wrapper keeps waiting so the final exit code is reported.
pub async fn spawn(plan: SpawnPlan, env: &[(String, String)]) -> Result<i32> {
    let cwd = std::env::current_dir()?;
    debug!(?plan, cwd = ?cwd, env = env.len(), "Spawning");

    let mut command = Command::from(plan);
    command
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let mut child = command
        .spawn()
        .map_err(|e| AppError::SpawnSetup(format!("Unable to start Flyway: {e}")))?;

    let status = loop {
        tokio::select! {
            status = child.wait() => break status?,
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Unable to listen for interrupts");
                    break child.wait().await?;
                }
                debug!("Interrupt received, waiting for Flyway to exit");
            }
        }
    };

    let code = exit_code(status);
    debug!(code, "Flyway exited");
    Ok(code)
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
