//! Runs the driver script and turns its output into build results.

use super::error::{Context, Error, Result};
use super::events::{BuildEvent, parse_event};
use super::settings::{BundleSettings, ConfigTransform};
use super::template::write_driver;
use super::tool_detection::node_path;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Most recent stderr lines kept for a failure report. A watching bundler
/// writes to stderr for as long as the session lasts.
const STDERR_TAIL_LINES: usize = 200;

/// Result of a bundler invocation.
#[derive(Debug)]
pub enum BundleOutcome {
    /// One-shot build finished without errors.
    Built(BuildEvent),
    /// First build finished without errors; the bundler keeps watching.
    Watching(WatchSession),
}

/// A bundler process in watch mode.
///
/// Dropping the session kills the process without waiting for it.
#[derive(Debug)]
pub struct WatchSession {
    initial: BuildEvent,
    events: mpsc::UnboundedReceiver<BuildEvent>,
    cancel: DropGuard,
    task: JoinHandle<()>,
}

impl WatchSession {
    /// The successful build the session started with.
    pub fn initial_build(&self) -> &BuildEvent {
        &self.initial
    }

    /// Waits for the next rebuild. Returns `None` once the bundler has exited.
    pub async fn next_build(&mut self) -> Option<BuildEvent> {
        self.events.recv().await
    }

    /// Kills the bundler process and waits for the session to wind down.
    pub async fn stop(self) {
        let Self { cancel, task, .. } = self;
        drop(cancel);
        if let Err(e) = task.await {
            log::warn!("Watch task ended abnormally: {}", e);
        }
    }
}

/// Runs webpack through the generated driver script.
///
/// By default the driver runs under the `node` found on `PATH`. A different
/// command can be configured; the driver path is always appended as the last
/// argument.
pub struct WebpackRunner {
    program: Option<PathBuf>,
    args: Vec<String>,
    transform: Option<ConfigTransform>,
}

impl Default for WebpackRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WebpackRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebpackRunner")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl WebpackRunner {
    pub fn new() -> Self {
        Self {
            program: None,
            args: Vec::new(),
            transform: None,
        }
    }

    /// Runs the driver with `program args.. <driver>` instead of `node <driver>`.
    pub fn with_command(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: Some(program.into()),
            args,
            transform: None,
        }
    }

    /// Rewrites the settings before the driver script is rendered.
    pub fn with_transform(mut self, transform: ConfigTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Builds the bundle described by `settings` from `working_dir`.
    ///
    /// Resolves after the first complete build. In watch mode the returned
    /// session reports later builds.
    ///
    /// # Errors
    ///
    /// [`Error::BuildFailed`] with the bundler diagnostics when the build has
    /// errors or the process exits without reporting a successful build.
    pub async fn invoke(&self, settings: BundleSettings, working_dir: &Path) -> Result<BundleOutcome> {
        let settings = match &self.transform {
            Some(transform) => transform(settings)?,
            None => settings,
        };
        let driver = write_driver(&settings, &settings.output_path).await?;

        log::info!(
            "Bundling {} into {}",
            settings.entry.display(),
            settings.output_file().display()
        );

        if settings.watch {
            self.watch(&driver, working_dir).await.map(BundleOutcome::Watching)
        } else {
            let result = self.run(&driver, working_dir).await;
            remove_driver(&driver).await;
            result.map(BundleOutcome::Built)
        }
    }

    fn spawn(&self, driver: &Path, working_dir: &Path) -> Result<Child> {
        let program = match &self.program {
            Some(program) => program.clone(),
            None => node_path()?,
        };
        log::debug!("Running {} {}", program.display(), driver.display());

        Command::new(&program)
            .args(&self.args)
            .arg(driver)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: program.display().to_string(),
                source,
            })
    }

    async fn run(&self, driver: &Path, working_dir: &Path) -> Result<BuildEvent> {
        let mut child = self.spawn(driver, working_dir)?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both streams must be drained before the exit status is meaningful.
        let (event, stderr_lines) = tokio::join!(
            async move {
                let mut event = None;
                if let Some(stdout) = stdout {
                    let mut lines = BufReader::new(stdout).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        match parse_event(&line) {
                            Some(Ok(parsed)) => {
                                event.get_or_insert(parsed);
                            }
                            Some(Err(e)) => log::warn!("Unreadable bundler event: {}", e),
                            None => log::debug!("webpack: {}", line),
                        }
                    }
                }
                event
            },
            collect_stderr(stderr)
        );

        let status = child.wait().await.map_err(|e| {
            Error::GenericError(format!("Failed to wait for the bundler: {}", e))
        })?;

        match event {
            Some(event) if !event.success => Err(Error::BuildFailed(event.diagnostics)),
            Some(event) if status.success() => {
                log::info!("Bundle built");
                Ok(event)
            }
            _ => Err(Error::BuildFailed(failure_text(&stderr_lines, status))),
        }
    }

    async fn watch(&self, driver: &Path, working_dir: &Path) -> Result<WatchSession> {
        let mut child = self.spawn(driver, working_dir)?;
        let stdout = child.stdout.take().context("bundler stdout was not captured")?;
        let stderr = tokio::spawn(collect_stderr(child.stderr.take()));
        let mut lines = BufReader::new(stdout).lines();

        let initial = match next_event(&mut lines).await {
            Some(event) if event.success => event,
            Some(event) => {
                stop_child(&mut child).await;
                remove_driver(driver).await;
                return Err(Error::BuildFailed(event.diagnostics));
            }
            None => {
                let status = child.wait().await.map_err(|e| {
                    Error::GenericError(format!("Failed to wait for the bundler: {}", e))
                })?;
                let stderr_lines = stderr.await.unwrap_or_default();
                remove_driver(driver).await;
                return Err(Error::BuildFailed(failure_text(&stderr_lines, status)));
            }
        };
        log::info!("Initial bundle built, watching for changes");

        let (sender, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(forward_builds(
            child,
            lines,
            sender,
            cancel.clone(),
            driver.to_path_buf(),
        ));

        Ok(WatchSession {
            initial,
            events,
            cancel: cancel.drop_guard(),
            task,
        })
    }
}

async fn next_event(lines: &mut Lines<BufReader<ChildStdout>>) -> Option<BuildEvent> {
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_event(&line) {
            Some(Ok(event)) => return Some(event),
            Some(Err(e)) => log::warn!("Unreadable bundler event: {}", e),
            None => log::debug!("webpack: {}", line),
        }
    }
    None
}

async fn forward_builds(
    mut child: Child,
    mut lines: Lines<BufReader<ChildStdout>>,
    sender: mpsc::UnboundedSender<BuildEvent>,
    cancel: CancellationToken,
    driver: PathBuf,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                log::debug!("Watch session cancelled");
                break;
            }
            event = next_event(&mut lines) => match event {
                Some(event) => {
                    if event.success {
                        log::info!("Bundle rebuilt");
                    } else {
                        log::warn!("Rebuild failed");
                    }
                    if sender.send(event).is_err() {
                        break;
                    }
                }
                None => {
                    log::debug!("Bundler output closed");
                    break;
                }
            }
        }
    }

    stop_child(&mut child).await;
    remove_driver(&driver).await;
}

async fn collect_stderr(stderr: Option<tokio::process::ChildStderr>) -> Vec<String> {
    let mut captured = VecDeque::with_capacity(STDERR_TAIL_LINES);
    if let Some(stderr) = stderr {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            log::debug!("webpack stderr: {}", line);
            if captured.len() == STDERR_TAIL_LINES {
                captured.pop_front();
            }
            captured.push_back(line);
        }
    }
    captured.into()
}

async fn stop_child(child: &mut Child) {
    if let Err(e) = child.kill().await {
        log::debug!("Bundler process already gone: {}", e);
    }
}

async fn remove_driver(driver: &Path) {
    if let Err(e) = tokio::fs::remove_file(driver).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        log::warn!("Could not remove {}: {}", driver.display(), e);
    }
}

fn failure_text(stderr_lines: &[String], status: std::process::ExitStatus) -> String {
    if stderr_lines.is_empty() {
        format!("Bundler exited with {} without reporting a build", status)
    } else {
        stderr_lines.join("\n")
    }
}
