use std::{
    fs::File,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use tokio::{sync::Mutex, task};
use tracing::{error, info};

pub const STATUS_FILE: &str = "status.json";
pub const LOG_FILE: &str = "pipeline.log";
const PIPELINE_SCRIPT: &str = "run_pipeline.sh";

/// Outcome of a start request. A second start while a job is outstanding is
/// reported, never queued or deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Owns the single process-wide "job running" flag and launches the external
/// processing pipeline. The state machine is Idle -> Running -> Idle; the
/// flag is reset when the job finishes, whatever its exit status.
#[derive(Clone)]
pub struct JobSupervisor {
    processing_dir: PathBuf,
    running: Arc<Mutex<bool>>,
}

impl JobSupervisor {
    pub fn new(processing_dir: impl Into<PathBuf>) -> Self {
        Self {
            processing_dir: processing_dir.into(),
            running: Arc::new(Mutex::new(false)),
        }
    }

    /// Test-and-set on the running flag. Returns immediately after the
    /// transition; the pipeline itself runs on its own task.
    pub async fn start(&self) -> StartOutcome {
        {
            let mut running = self.running.lock().await;
            if *running {
                return StartOutcome::AlreadyRunning;
            }
            *running = true;
        }

        let supervisor = self.clone();
        tokio::spawn(async move {
            info!("starting processing pipeline");
            match supervisor.run_pipeline().await {
                Ok(()) => info!("pipeline completed successfully"),
                Err(err) => error!(?err, "pipeline run failed"),
            }

            let mut running = supervisor.running.lock().await;
            *running = false;
        });

        StartOutcome::Started
    }

    pub async fn is_running(&self) -> bool {
        *self.running.lock().await
    }

    /// Raw bytes of the status artifact the pipeline maintains, if any.
    /// The supervisor relays the file without interpreting it.
    pub async fn read_status(&self) -> Option<Vec<u8>> {
        tokio::fs::read(self.processing_dir.join(STATUS_FILE))
            .await
            .ok()
    }

    /// Raw bytes of the combined stdout/stderr log of the last run.
    pub async fn read_log(&self) -> Option<Vec<u8>> {
        tokio::fs::read(self.processing_dir.join(LOG_FILE)).await.ok()
    }

    async fn run_pipeline(&self) -> Result<()> {
        let processing_dir = self.processing_dir.clone();
        task::spawn_blocking(move || run_pipeline_blocking(&processing_dir))
            .await
            .context("pipeline task failed")?
    }
}

fn run_pipeline_blocking(processing_dir: &Path) -> Result<()> {
    let script = processing_dir.join(PIPELINE_SCRIPT);
    let log_path = processing_dir.join(LOG_FILE);

    // Each run discards the previous log.
    let log = File::create(&log_path)
        .with_context(|| format!("failed to create log file at {}", log_path.display()))?;
    let log_err = log.try_clone().context("failed to clone log handle")?;

    let status = Command::new("/bin/bash")
        .arg(&script)
        .current_dir(processing_dir)
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err))
        .status()
        .context("failed to execute pipeline script")?;

    if !status.success() {
        bail!("pipeline exited with status {:?}", status.code());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::time::sleep;

    fn write_script(dir: &Path, body: &str) {
        fs::write(dir.join(PIPELINE_SCRIPT), body).expect("write pipeline script");
    }

    async fn wait_until_idle(supervisor: &JobSupervisor) {
        for _ in 0..100 {
            if !supervisor.is_running().await {
                return;
            }
            sleep(Duration::from_millis(50)).await;
        }
        panic!("supervisor never returned to idle");
    }

    #[tokio::test]
    async fn concurrent_starts_admit_exactly_one() {
        let dir = tempdir().expect("temp dir");
        write_script(dir.path(), "sleep 0.4\n");
        let supervisor = JobSupervisor::new(dir.path());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let supervisor = supervisor.clone();
                tokio::spawn(async move { supervisor.start().await })
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.expect("join start task"));
        }

        let started = outcomes
            .iter()
            .filter(|outcome| **outcome == StartOutcome::Started)
            .count();
        assert_eq!(started, 1);
        assert_eq!(outcomes.len() - started, 7);

        wait_until_idle(&supervisor).await;
    }

    #[tokio::test]
    async fn start_succeeds_again_after_completion() {
        let dir = tempdir().expect("temp dir");
        write_script(dir.path(), "exit 0\n");
        let supervisor = JobSupervisor::new(dir.path());

        assert_eq!(supervisor.start().await, StartOutcome::Started);
        wait_until_idle(&supervisor).await;
        assert_eq!(supervisor.start().await, StartOutcome::Started);
        wait_until_idle(&supervisor).await;
    }

    #[tokio::test]
    async fn failed_script_still_resets_the_flag_and_leaves_a_log() {
        let dir = tempdir().expect("temp dir");
        write_script(dir.path(), "echo kaputt >&2\nexit 3\n");
        let supervisor = JobSupervisor::new(dir.path());

        assert_eq!(supervisor.start().await, StartOutcome::Started);
        wait_until_idle(&supervisor).await;

        let log = supervisor.read_log().await.expect("log file present");
        assert!(String::from_utf8_lossy(&log).contains("kaputt"));
    }

    #[tokio::test]
    async fn flag_resets_when_log_cannot_be_created() {
        let dir = tempdir().expect("temp dir");
        let missing = dir.path().join("does-not-exist");
        let supervisor = JobSupervisor::new(&missing);

        assert_eq!(supervisor.start().await, StartOutcome::Started);
        wait_until_idle(&supervisor).await;
        assert!(supervisor.read_log().await.is_none());
    }

    #[tokio::test]
    async fn artifacts_are_relayed_verbatim() {
        let dir = tempdir().expect("temp dir");
        let supervisor = JobSupervisor::new(dir.path());

        assert!(supervisor.read_status().await.is_none());

        fs::write(dir.path().join(STATUS_FILE), br#"{"status":"running"}"#)
            .expect("write status artifact");
        let bytes = supervisor.read_status().await.expect("status present");
        assert_eq!(bytes, br#"{"status":"running"}"#);
    }
}
