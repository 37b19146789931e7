//! libkit CLI - packaging, docs and customization for TypeScript libraries

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use libkit_core::tui::CustomizeArgs;
use libkit_core::{docs, entries, Project, RunContext};
use std::future::Future;
use std::path::PathBuf;

/// Exit status after a termination signal
const SIGNAL_EXIT_CODE: i32 = 255;

#[derive(Parser, Debug)]
#[command(name = "libkit")]
#[command(about = "Developer tooling for packaging, documenting and customizing TypeScript libraries")]
#[command(version)]
pub struct Args {
    /// Project root (the directory containing package.json)
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Config file relative to the project root (default: libkit.yaml, or $LIBKIT_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the entry map discovered from module tags, as JSON
    Entries(EntriesArgs),
    /// Write a publishable package.json into the dist directory
    Package,
    /// Generate API docs and regenerate them when the project changes
    Docs(DocsArgs),
    /// Rename the library created from this template
    Customize(CliCustomizeArgs),
}

#[derive(Parser, Debug)]
pub struct EntriesArgs {
    /// Print bundler entry points (with output artifacts) instead of the plain map
    #[arg(long)]
    pub bundle: bool,
}

#[derive(Parser, Debug)]
pub struct DocsArgs {
    /// Generate once and exit instead of watching
    #[arg(long)]
    pub once: bool,
}

#[derive(Parser, Debug)]
pub struct CliCustomizeArgs {
    /// New package name, including the namespace (e.g. @scope/name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// New short description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Apply without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCustomizeArgs> for CustomizeArgs {
    fn from(args: CliCustomizeArgs) -> Self {
        CustomizeArgs {
            name: args.name,
            description: args.description,
            yes: args.yes,
        }
    }
}

#[tokio::main]
async fn main() {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    let ctx = RunContext::new();
    ctx.on_cleanup(|| {
        let _ = console::Term::stderr().show_cursor();
    });

    // First signal shuts the run down gracefully, a second one exits at once
    let signal_ctx = ctx.clone();
    ctrlc::set_handler(move || {
        if !signal_ctx.shutdown() {
            std::process::exit(SIGNAL_EXIT_CODE);
        }
    })
    .ok();

    let args = Args::parse();
    let result = run(&ctx, args).await;
    let interrupted = ctx.is_cancelled();

    // Ensure cursor is visible on normal exit
    ctx.shutdown();

    match result {
        Ok(()) if interrupted => std::process::exit(SIGNAL_EXIT_CODE),
        Ok(()) => {}
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(if interrupted { SIGNAL_EXIT_CODE } else { 1 });
        }
    }
}

async fn run(ctx: &RunContext, args: Args) -> Result<()> {
    let project = Project::open(&args.root, args.config.as_deref())?;

    match args.command {
        Command::Entries(entries_args) => {
            until_cancelled(ctx, print_entries(&project, entries_args.bundle)).await
        }
        Command::Package => {
            until_cancelled(ctx, async {
                libkit_core::write_dist_manifest(&project).await.map(|_| ())
            })
            .await
        }
        Command::Docs(docs_args) if docs_args.once => {
            match docs::generate(&project, ctx.token()).await? {
                docs::Generation::Finished => println!("{}", "API docs generated".green().bold()),
                docs::Generation::Cancelled => {}
            }
            Ok(())
        }
        // The watch loop observes the run context itself so it can stop cleanly
        Command::Docs(_) => docs::watch(ctx, &project).await,
        Command::Customize(customize_args) => {
            until_cancelled(
                ctx,
                libkit_core::run_customize(&project, customize_args.into()),
            )
            .await
        }
    }
}

/// Run `task` unless the run context is cancelled first
async fn until_cancelled<F>(ctx: &RunContext, task: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::select! {
        result = task => result,
        _ = ctx.cancelled() => anyhow::bail!("Interrupted"),
    }
}

async fn print_entries(project: &Project, bundle: bool) -> Result<()> {
    let name = project.library_name().await?;
    let map =
        entries::build_entry_map(&project.src_dir(), &name, &project.config().extensions).await?;

    let json = if bundle {
        let points = libkit_core::entry_points(&map, &project.config().bundle.formats);
        serde_json::to_string_pretty(&points)?
    } else {
        serde_json::to_string_pretty(&map)?
    };
    println!("{}", json);

    Ok(())
}
