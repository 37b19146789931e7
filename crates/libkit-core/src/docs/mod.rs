//! API documentation generation
//!
//! The doc generator itself is an external program. This module feeds it the
//! entry points discovered in the source tree and re-runs it while watching
//! the project for changes.

pub mod watcher;

use crate::entries;
use crate::lifecycle::RunContext;
use crate::project::Project;
use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use watcher::{ChangeFilter, DocsWatcher};

/// How a generation run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    Finished,
    Cancelled,
}

/// Build the doc generator invocation for the project's current entry points
async fn doc_command(project: &Project) -> Result<Command> {
    let config = &project.config().docs;
    let (program, fixed_args) = config
        .command
        .split_first()
        .context("docs.command must name a program")?;

    let name = project.library_name().await?;
    let entries =
        entries::build_entry_map(&project.src_dir(), &name, &project.config().extensions)
            .await
            .context("Failed to build entry map")?;
    if entries.is_empty() {
        anyhow::bail!(
            "No module tags found in {}; nothing to document",
            project.src_dir().display()
        );
    }

    println!(
        "{} API docs for {} entry point(s)...",
        "Generating".cyan().bold(),
        entries.len()
    );

    let mut command = Command::new(program);
    command
        .args(fixed_args)
        .arg("--name")
        .arg(&name)
        .arg("--out")
        .arg(project.root().join(&config.out_dir))
        .args(entries.values())
        .current_dir(project.root())
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    // npx and friends run the real generator as a grandchild
    #[cfg(unix)]
    command.process_group(0);

    Ok(command)
}

/// Run the doc generator once, killing it if `cancel` fires
pub async fn generate(project: &Project, cancel: CancellationToken) -> Result<Generation> {
    let mut command = doc_command(project).await?;
    let program = project.config().docs.command.join(" ");

    let mut child = command
        .spawn()
        .with_context(|| format!("Failed to start doc generator: {}", program))?;

    tokio::select! {
        status = child.wait() => {
            let status = status.with_context(|| format!("Failed to wait for {}", program))?;
            if !status.success() {
                anyhow::bail!("Doc generator exited with {}", status);
            }
            Ok(Generation::Finished)
        }
        _ = cancel.cancelled() => {
            kill_generator(&mut child).await;
            Ok(Generation::Cancelled)
        }
    }
}

/// Kill the generator together with every process it started
async fn kill_generator(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
    }

    let _ = child.kill().await;
}

/// A scheduled generation that can be cancelled before or while it runs
struct GenerationJob {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl GenerationJob {
    fn spawn(project: Project, parent: &CancellationToken, delay: Duration) -> Self {
        let token = parent.child_token();
        let job_token = token.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = job_token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            match generate(&project, job_token).await {
                Ok(Generation::Finished) => println!("{}", "API docs updated".green()),
                Ok(Generation::Cancelled) => {}
                Err(e) => eprintln!("{} {:#}", "Error:".red(), e),
            }
        });

        Self { token, handle }
    }

    async fn cancel(self) {
        self.token.cancel();
        let _ = self.handle.await;
    }
}

/// Generate the docs, then regenerate on every relevant change until the run
/// context is cancelled
pub async fn watch(ctx: &RunContext, project: &Project) -> Result<()> {
    let mut watcher = DocsWatcher::new(project)?;
    let restart_delay = Duration::from_millis(project.config().docs.restart_delay_ms);
    let parent = ctx.token();

    println!("{}", "Documentation process has started".green());
    for path in watcher.watched() {
        println!("  {} watching {}", "->".blue(), path.display());
    }

    let mut job = GenerationJob::spawn(project.clone(), &parent, Duration::ZERO);

    loop {
        tokio::select! {
            _ = parent.cancelled() => break,
            batch = watcher.next_batch() => {
                let Some(paths) = batch else { break };
                let names: Vec<String> = paths
                    .iter()
                    .map(|p| p.strip_prefix(project.root()).unwrap_or(p).display().to_string())
                    .collect();
                println!("{} {}", "Regenerating due to:".yellow(), names.join(", "));

                job.cancel().await;
                job = GenerationJob::spawn(project.clone(), &parent, restart_delay);
            }
        }
    }

    job.cancel().await;
    println!("{}", "Documentation process has quit".red());
    Ok(())
}
