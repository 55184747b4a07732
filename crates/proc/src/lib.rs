//! Thin wrapper around external process invocation.
//!
//! Every other component that shells out (the git-backed worktree, the
//! compiler driver, the symbol extractor) goes through [`ProcessRunner`]
//! rather than calling `std::process::Command` directly, so timeouts,
//! lossy-UTF8 decoding and process-tree kill-on-timeout are implemented once.

use std::{
    collections::HashMap,
    io::Read,
    path::PathBuf,
    process::Stdio,
    thread,
    time::{Duration, Instant},
};

use command_group::{CommandGroup, GroupChild};
use thiserror::Error;

/// A single invocation: argv, working directory, environment and timeout.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: HashMap<String, String>,
    pub timeout: Duration,
}

impl RunRequest {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: HashMap::new(),
            timeout: Duration::from_secs(300),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Captured result of a completed invocation. A non-zero `status` is not an
/// error at this layer; the caller decides what a non-zero exit means.
#[derive(Debug, Clone)]
pub struct Output {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// The only two fail kinds the runner itself distinguishes: the process
/// never started, or it did not finish within its timeout. A non-zero exit
/// is a normal [`Output`], not an error here.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn `{program}`: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

/// Stateless; safe to share across threads and call concurrently.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run `req` to completion, blocking the calling thread. Kills the whole
    /// process group (not just the leader) if the timeout elapses.
    pub fn run(&self, req: &RunRequest) -> Result<Output, ProcessError> {
        let program = req.program.display().to_string();
        let span = tracing::debug_span!("subprocess", program = %program, argv = ?req.args);
        let _enter = span.enter();

        let mut command = std::process::Command::new(&req.program);
        command
            .args(&req.args)
            .current_dir(&req.cwd)
            .envs(&req.env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut group = command.group_spawn().map_err(|source| ProcessError::SpawnFailed {
            program: program.clone(),
            source,
        })?;

        let stdout_pipe = group.inner().stdout.take();
        let stderr_pipe = group.inner().stderr.take();
        let stdout_reader = thread::spawn(move || read_to_string_lossy(stdout_pipe));
        let stderr_reader = thread::spawn(move || read_to_string_lossy(stderr_pipe));

        let start = Instant::now();
        let status = loop {
            match group.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    return Err(ProcessError::SpawnFailed { program, source });
                }
            }
            if start.elapsed() > req.timeout {
                tracing::warn!(%program, timeout = ?req.timeout, "subprocess timed out, killing process tree");
                kill_tree(&mut group);
                let _ = stdout_reader.join();
                let _ = stderr_reader.join();
                return Err(ProcessError::TimedOut {
                    program,
                    timeout: req.timeout,
                });
            }
            thread::sleep(Duration::from_millis(25));
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();
        let exit_code = status.code().unwrap_or(-1);
        if exit_code != 0 {
            tracing::debug!(%program, exit_code, "subprocess exited non-zero");
        }

        Ok(Output {
            status: exit_code,
            stdout,
            stderr,
        })
    }
}

fn read_to_string_lossy(pipe: Option<impl Read>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Escalate SIGINT -> SIGTERM -> SIGKILL across the whole process group,
/// falling back to killing just the leader on platforms without process
/// groups or if the group's pid can't be resolved.
fn kill_tree(group: &mut GroupChild) {
    #[cfg(unix)]
    {
        use nix::{
            sys::signal::{Signal, killpg},
            unistd::{Pid, getpgid},
        };

        if let Some(pid) = group.inner().id() {
            if let Ok(pgid) = getpgid(Some(Pid::from_raw(pid as i32))) {
                for sig in [Signal::SIGINT, Signal::SIGTERM, Signal::SIGKILL] {
                    if let Err(e) = killpg(pgid, sig) {
                        tracing::warn!("failed to send {:?} to process group {}: {}", sig, pgid, e);
                    }
                    thread::sleep(Duration::from_secs(2));
                    if matches!(group.try_wait(), Ok(Some(_))) {
                        return;
                    }
                }
            }
        }
    }
    let _ = group.kill();
    let _ = group.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_exit_code() {
        let runner = ProcessRunner::new();
        let req = RunRequest::new("/bin/echo", std::env::temp_dir()).arg("hello");
        let out = runner.run(&req).expect("echo should spawn");
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn nonzero_exit_is_not_an_error() {
        let runner = ProcessRunner::new();
        let req = RunRequest::new("/bin/sh", std::env::temp_dir())
            .args(["-c", "exit 7"]);
        let out = runner.run(&req).expect("sh should spawn");
        assert!(!out.success());
        assert_eq!(out.status, 7);
    }

    #[test]
    fn missing_binary_is_spawn_failure() {
        let runner = ProcessRunner::new();
        let req = RunRequest::new("/no/such/binary-levelup", std::env::temp_dir());
        let err = runner.run(&req).unwrap_err();
        assert!(matches!(err, ProcessError::SpawnFailed { .. }));
    }

    #[test]
    fn timeout_kills_the_process() {
        let runner = ProcessRunner::new();
        let req = RunRequest::new("/bin/sleep", std::env::temp_dir())
            .arg("5")
            .timeout(Duration::from_millis(100));
        let err = runner.run(&req).unwrap_err();
        assert!(matches!(err, ProcessError::TimedOut { .. }));
    }
}
