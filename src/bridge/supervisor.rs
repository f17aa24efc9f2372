use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// How long output is still drained once the engine has exited.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// What happened to one engine process.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The process ran to exit. `code` is `None` when it was ended by a signal.
    Exited {
        code: Option<i32>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
        elapsed: Duration,
    },
    /// The deadline passed; the process was killed and reaped.
    TimedOut { elapsed: Duration },
    /// The process could not be started.
    LaunchFailed(io::Error),
    /// The process started but its exit could not be observed.
    Lost(io::Error),
}

/// Launches the engine and owns its lifetime for the duration of one call.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    program: PathBuf,
    leading_args: Vec<String>,
}

impl ProcessSupervisor {
    pub fn new(program: impl Into<PathBuf>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the engine as `program [leading_args..] <request> <channel_path>`.
    ///
    /// Races process exit against `timeout`, measured from spawn. The engine
    /// leads its own process group, and the whole group is killed before
    /// returning: on timeout, and after a clean exit for anything it left
    /// running.
    pub async fn run(
        &self,
        encoded_request: &str,
        channel_path: &Path,
        timeout: Duration,
    ) -> ProcessOutcome {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .arg(encoded_request)
            .arg(channel_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let started = Instant::now();
        let deadline = started + timeout;

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                log::error!("Failed to spawn {}: {}", self.program.display(), e);
                return ProcessOutcome::LaunchFailed(e);
            }
        };
        let group = child.id();
        log::debug!(
            "Spawned {} (pid {:?}), channel {}",
            self.program.display(),
            group,
            channel_path.display()
        );

        let mut stdout_task = spawn_reader(child.stdout.take());
        let mut stderr_task = spawn_reader(child.stderr.take());

        let status = match time::timeout_at(deadline, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                terminate(&mut child, group).await;
                stdout_task.abort();
                stderr_task.abort();
                return ProcessOutcome::Lost(e);
            }
            Err(_) => {
                log::warn!(
                    "{} exceeded {:.1}s, killing it",
                    self.program.display(),
                    timeout.as_secs_f64()
                );
                terminate(&mut child, group).await;
                stdout_task.abort();
                stderr_task.abort();
                return ProcessOutcome::TimedOut {
                    elapsed: started.elapsed(),
                };
            }
        };

        if kill_group(group) {
            log::debug!("Killed processes left behind by {}", self.program.display());
        }

        // Anything that escaped the group can still hold the pipes open.
        let drain_deadline = deadline.min(Instant::now() + DRAIN_GRACE);
        let stdout = collect(&mut stdout_task, drain_deadline).await;
        let stderr = collect(&mut stderr_task, drain_deadline).await;

        for line in String::from_utf8_lossy(&stderr).lines() {
            log::debug!("[engine] {}", line);
        }

        ProcessOutcome::Exited {
            code: status.code(),
            stdout,
            stderr,
            elapsed: started.elapsed(),
        }
    }
}

fn spawn_reader<R>(stream: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            if let Err(e) = stream.read_to_end(&mut buf).await {
                log::debug!("Engine output stream closed with error: {}", e);
            }
        }
        buf
    })
}

async fn collect(task: &mut JoinHandle<Vec<u8>>, deadline: Instant) -> Vec<u8> {
    match time::timeout_at(deadline, &mut *task).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            log::debug!("Engine output reader failed: {}", e);
            Vec::new()
        }
        Err(_) => {
            task.abort();
            Vec::new()
        }
    }
}

async fn terminate(child: &mut Child, group: Option<u32>) {
    kill_group(group);
    // kill() sends SIGKILL to the leader and reaps it.
    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill engine process: {}", e);
    }
}

/// SIGKILL every process in the engine's group. Returns whether any was signalled.
#[cfg(unix)]
fn kill_group(group: Option<u32>) -> bool {
    let pgid = match group.and_then(|id| libc::pid_t::try_from(id).ok()) {
        Some(pgid) => pgid,
        None => return false,
    };
    // SAFETY: killpg has no memory effects; the group was created for this child.
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
        return true;
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() != Some(libc::ESRCH) {
        log::warn!("Failed to kill engine process group {}: {}", pgid, err);
    }
    false
}

#[cfg(not(unix))]
fn kill_group(_group: Option<u32>) -> bool {
    false
}
