mod assessment;
mod session;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use med_content::{resolve_content, FileStorage, Page};
use med_core::{AppStore, Dka, Sepsis};
use session::{run_session, RunOptions};
use std::io::BufRead;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "med_cli", about = "Multisystem Master clinical training CLI")]
struct Cli {
    /// Persisted snapshot file.
    #[arg(
        long,
        global = true,
        default_value = "./multisystem-master-storage.json"
    )]
    store: PathBuf,
    /// Load content from this directory instead of the built-in set.
    #[arg(long, global = true)]
    content_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SessionArgs {
    #[arg(long, default_value_t = 60)]
    ticks: u64,
    /// Follow the guideline protocol. Mutually exclusive with --script.
    #[arg(long, conflicts_with = "script")]
    autopilot: bool,
    /// Timed actions, e.g. "0:fluid,0:antibiotics,30:vasopressor".
    #[arg(long, conflicts_with = "autopilot")]
    script: Option<String>,
    #[arg(long, default_value_t = 10)]
    print_every: u64,
    /// Write the chart history to this CSV file when done.
    #[arg(long)]
    chart_csv: Option<PathBuf>,
    /// Deliver ticks on the 1-second wall clock instead of back to back.
    #[arg(long)]
    realtime: bool,
    /// Reset the simulator before running instead of resuming the stored state.
    #[arg(long)]
    fresh: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sepsis simulator.
    Sepsis(SessionArgs),
    /// Run the DKA simulator.
    Dka(SessionArgs),
    /// Take the assessment. Reads one option number per line from stdin
    /// unless --answers is given.
    Quiz {
        /// Option numbers in question order, e.g. "2,1,3".
        #[arg(long)]
        answers: Option<String>,
    },
    /// List cases, or reveal one case's diagnosis.
    Cases {
        #[arg(long)]
        reveal: Option<String>,
    },
    /// Show learner progress.
    Progress,
    /// List the navigation pages.
    Pages,
    /// Print the persisted snapshot as JSON.
    Snapshot,
    /// Mark a learning module as completed.
    CompleteModule { module_id: String },
    ToggleDarkMode,
}

impl SessionArgs {
    fn options(&self) -> RunOptions<'_> {
        RunOptions {
            ticks: self.ticks,
            autopilot: self.autopilot,
            script: self.script.as_deref(),
            print_every: self.print_every,
            chart_csv: self.chart_csv.as_deref(),
            realtime: self.realtime,
            fresh: self.fresh,
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn stdin_answers() -> impl Iterator<Item = Result<usize>> {
    std::io::stdin().lock().lines().map(|line| {
        let line = line.context("reading answer from stdin")?;
        assessment::parse_answers(&line)?
            .first()
            .copied()
            .context("expected an option number")
    })
}

fn print_progress(store: &AppStore) {
    let progress = store.progress();
    println!("Last accessed: {}", progress.last_accessed.to_rfc3339());
    println!("Dark mode: {}", store.dark_mode());
    println!("Completed cases ({}):", progress.completed_cases.len());
    for case_id in &progress.completed_cases {
        println!("  {case_id}");
    }
    println!("Assessment scores ({}):", progress.assessment_scores.len());
    for (question_id, score) in &progress.assessment_scores {
        println!("  {question_id:<20} {score:3}");
    }
    match progress.average_score() {
        Some(avg) => println!("Average score: {avg:.1}"),
        None => println!("Average score: -"),
    }
    println!("Modules completed: {}", progress.modules_completed.join(", "));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut store = AppStore::open(Box::new(FileStorage::new(&cli.store)));

    match cli.command {
        Commands::Sepsis(args) => run_session::<Sepsis>(&mut store, &args.options())?,
        Commands::Dka(args) => run_session::<Dka>(&mut store, &args.options())?,
        Commands::Quiz { answers } => {
            let content = resolve_content(cli.content_dir.as_deref())?;
            match answers {
                Some(raw) => {
                    let mut answers = assessment::parse_answers(&raw)?
                        .into_iter()
                        .map(Ok::<usize, anyhow::Error>);
                    assessment::run_quiz(content.questions, &mut store, &mut answers)?;
                }
                None => {
                    assessment::run_quiz(content.questions, &mut store, &mut stdin_answers())?;
                }
            }
        }
        Commands::Cases { reveal } => {
            let content = resolve_content(cli.content_dir.as_deref())?;
            match reveal {
                Some(case_id) => assessment::reveal_case(&content, &mut store, &case_id)?,
                None => assessment::list_cases(&content, &store),
            }
        }
        Commands::Progress => print_progress(&store),
        Commands::Pages => {
            for page in Page::ALL {
                println!("{page}");
            }
        }
        Commands::Snapshot => {
            let json = serde_json::to_string_pretty(store.snapshot())
                .context("serializing snapshot")?;
            println!("{json}");
        }
        Commands::CompleteModule { module_id } => {
            store.complete_module(&module_id);
            println!("Module '{module_id}' completed.");
        }
        Commands::ToggleDarkMode => {
            store.toggle_dark_mode();
            println!("Dark mode: {}", store.dark_mode());
        }
    }
    Ok(())
}
