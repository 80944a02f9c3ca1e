//! tweet-optimizer command-line interface.
//!
//! # Environment Variables
//!
//! - `OPENROUTER_API_KEY`: required for `openrouter/...` models
//! - `OLLAMA_BASE_URL`: Ollama server (default: `http://localhost:11434`)
//! - `RUST_LOG`: tracing filter (default: `info,tweet_optimizer=debug`)
//! - `NO_COLOR`: disable coloured output
//!
//! # Usage
//!
//! ```bash
//! tweet-optimizer optimize "We just shipped async closures in stable Rust"
//! tweet-optimizer optimize --from-history 1 --iterations 5
//! tweet-optimizer categories add "Humor - how funny the tweet is"
//! tweet-optimizer settings set --model ollama/gemma3:4b --patience 3
//! ```

use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use tweet_optimizer::adapters::{LlmTweetEvaluator, LlmTweetGenerator};
use tweet_optimizer::constants::{AVAILABLE_MODELS, HISTORY_TRUNCATE_LENGTH};
use tweet_optimizer::utilities::printer::{ColoredText, Printer, PrinterColor};
use tweet_optimizer::utilities::text::{short_category, truncate_category_display, tweet_length};
use tweet_optimizer::{
    create_llm, HillClimbingSearch, LlmOverrides, OptimizationSession, SearchStatus, Settings,
    StopReason, Store,
};

#[derive(Parser)]
#[command(name = "tweet-optimizer")]
#[command(about = "Optimise a tweet by LLM hill climbing", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding categories.json, settings.json and input_history.json
    #[arg(long, global = true, default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimise a text into a tweet
    Optimize {
        /// Text to optimise (read from stdin when omitted)
        text: Option<String>,

        /// Reuse input number N from `history list`
        #[arg(long, conflicts_with = "text")]
        from_history: Option<usize>,

        /// Override the iteration cap for this run
        #[arg(long)]
        iterations: Option<usize>,

        /// Override the patience threshold for this run
        #[arg(long)]
        patience: Option<usize>,

        /// Override the model (`provider/model`) for this run
        #[arg(long)]
        model: Option<String>,

        /// Also print each candidate and the feedback the generator received
        #[arg(long)]
        verbose: bool,
    },

    /// Manage evaluation categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Show or change persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Show or clear the input history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// List the model catalogue
    Models,
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List,
    /// Add a category description
    Add { description: String },
    /// Remove category number N
    Remove { number: usize },
    /// Restore the default categories
    Reset,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print current settings
    Show,
    /// Persist new values
    Set {
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        iterations: Option<usize>,
        #[arg(long)]
        patience: Option<usize>,
        #[arg(long)]
        use_cache: Option<bool>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List previous inputs, most recent first
    List,
    /// Forget every previous input
    Clear,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tweet_optimizer=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = Store::new(cli.data_dir.clone());
    let printer = Printer::new();

    match cli.command {
        Commands::Optimize {
            text,
            from_history,
            iterations,
            patience,
            model,
            verbose,
        } => {
            let text = resolve_input(&store, text, from_history)?;
            let mut settings = store.load_settings().context("failed to load settings")?;
            if let Some(iterations) = iterations {
                settings.iterations = iterations;
            }
            if let Some(patience) = patience {
                settings.patience = patience;
            }
            if let Some(model) = model {
                settings.selected_model = model;
            }
            optimize(&store, &printer, &settings, &text, verbose)
        }
        Commands::Categories { action } => categories(&store, &printer, action),
        Commands::Settings { action } => settings(&store, &printer, action),
        Commands::History { action } => history(&store, &printer, action),
        Commands::Models => {
            let selected = store.load_settings()?.selected_model;
            for (name, id) in AVAILABLE_MODELS {
                let marker = if *id == selected { "*" } else { " " };
                printer.print(&format!("{} {:<24} {}", marker, name, id), PrinterColor::White);
            }
            Ok(())
        }
    }
}

fn resolve_input(store: &Store, text: Option<String>, from_history: Option<usize>) -> Result<String> {
    if let Some(number) = from_history {
        let history = store.load_history()?;
        return number
            .checked_sub(1)
            .and_then(|i| history.get(i).cloned())
            .with_context(|| format!("no history entry {} ({} stored)", number, history.len()));
    }
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read text from stdin")?;
            Ok(buffer)
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    /// Let the current iteration finish, then cancel the run.
    Stop,
    /// A second Ctrl-C while a request is still in flight.
    Exit,
}

fn interrupt(cancelled: &AtomicBool) -> Interrupt {
    if cancelled.swap(true, Ordering::SeqCst) {
        Interrupt::Exit
    } else {
        Interrupt::Stop
    }
}

fn optimize(
    store: &Store,
    printer: &Printer,
    settings: &Settings,
    text: &str,
    verbose: bool,
) -> Result<()> {
    settings.validate().context("invalid settings")?;
    let categories = store.load_categories().context("failed to load categories")?;

    let llm = create_llm(&settings.selected_model, &LlmOverrides::default())?;
    let search = HillClimbingSearch::new(
        LlmTweetGenerator::new(Arc::clone(&llm)),
        LlmTweetEvaluator::new(Arc::clone(&llm)),
        categories,
        settings.iterations,
        settings.patience,
    )?;
    let mut run = search.run(text)?;
    store.add_to_history(text).context("failed to record input history")?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    ctrlc::set_handler(move || match interrupt(&flag) {
        Interrupt::Stop => {
            eprintln!("\nStopping after the current iteration (Ctrl-C again to quit)");
        }
        Interrupt::Exit => {
            eprintln!("\nInterrupted");
            std::process::exit(130);
        }
    })
    .context("failed to install Ctrl-C handler")?;

    tracing::info!(
        run_id = %run.run_id(),
        model = %settings.selected_model,
        iterations = settings.iterations,
        patience = settings.patience,
        "Starting optimisation"
    );

    let mut session = OptimizationSession::new(settings.iterations, settings.patience);
    let mut best_total = 0;
    loop {
        if cancelled.load(Ordering::SeqCst) {
            run.cancel();
        }
        let record = match run.next() {
            None => break,
            Some(Ok(record)) => record,
            Some(Err(e)) => {
                tracing::error!(run_id = %run.run_id(), "Initial candidate failed: {}", e);
                return Err(anyhow::Error::new(e).context("could not produce a first tweet"));
            }
        };

        let total = record.evaluation.total();
        let color = PrinterColor::for_outcome(record.is_improvement, total, best_total);
        if record.is_improvement {
            best_total = total;
        }
        session.observe(&record);

        printer.print(&session.status_line(), color);
        if record.is_improvement || verbose {
            printer.print(&format!("    {}", record.candidate_text), PrinterColor::BoldWhite);
        }
        if let Some(failure) = &record.failure {
            printer.print(&format!("    skipped: {}", failure), PrinterColor::Yellow);
        }
        if verbose && !record.generator_inputs.feedback.is_empty() {
            for line in record.generator_inputs.feedback.lines() {
                printer.print(&format!("    feedback: {}", line), PrinterColor::Cyan);
            }
        }
    }

    if let SearchStatus::Terminated(reason) = run.status() {
        session.finish(reason);
        if reason == StopReason::UserCancelled {
            printer.print("Stopped by user.", PrinterColor::Yellow);
        }
    }

    let Some(best) = session.best_tweet() else {
        bail!("optimisation produced no tweet");
    };
    println!();
    printer.print_colored(&[
        ColoredText::new("Best tweet ", PrinterColor::BoldGreen),
        ColoredText::new(format!("({} chars):", tweet_length(best)), PrinterColor::White),
    ]);
    printer.print(best, PrinterColor::BoldWhite);

    println!();
    for trend in session.category_trends() {
        let color = match trend.delta() {
            d if d > 0 => PrinterColor::Green,
            d if d < 0 => PrinterColor::Red,
            _ => PrinterColor::White,
        };
        printer.print(
            &format!(
                "  {:<33} {} -> {} ({:+})",
                short_category(&trend.category),
                trend.initial,
                trend.latest,
                trend.delta()
            ),
            color,
        );
    }

    println!();
    printer.print(&session.completion_line(), PrinterColor::BoldCyan);
    tracing::info!(
        run_id = %run.run_id(),
        elapsed_ms = session.elapsed().num_milliseconds(),
        failures = session.failures(),
        usage = %llm.get_token_usage_summary(),
        "Optimisation finished"
    );
    Ok(())
}

fn categories(store: &Store, printer: &Printer, action: CategoryAction) -> Result<()> {
    match action {
        CategoryAction::List => {
            for (i, category) in store.load_categories()?.iter().enumerate() {
                printer.print(&format!("{:>3}. {}", i + 1, category), PrinterColor::White);
            }
        }
        CategoryAction::Add { description } => {
            if store.add_category(&description)? {
                printer.print("Category added.", PrinterColor::Green);
            } else {
                printer.print("Blank or duplicate category, nothing added.", PrinterColor::Yellow);
            }
        }
        CategoryAction::Remove { number } => {
            let removed = match number.checked_sub(1) {
                Some(index) => store.remove_category(index)?,
                None => None,
            };
            match removed {
                Some(category) => printer.print(&format!("Removed: {}", category), PrinterColor::Green),
                None => bail!("no category number {}", number),
            }
        }
        CategoryAction::Reset => {
            let categories = store.reset_categories()?;
            printer.print(
                &format!("Restored {} default categories.", categories.len()),
                PrinterColor::Green,
            );
        }
    }
    Ok(())
}

fn settings(store: &Store, printer: &Printer, action: SettingsAction) -> Result<()> {
    let mut settings = store.load_settings()?;
    match action {
        SettingsAction::Show => {}
        SettingsAction::Set {
            model,
            iterations,
            patience,
            use_cache,
        } => {
            if let Some(model) = model {
                settings.selected_model = model;
            }
            if let Some(iterations) = iterations {
                settings.iterations = iterations;
            }
            if let Some(patience) = patience {
                settings.patience = patience;
            }
            if let Some(use_cache) = use_cache {
                settings.use_cache = use_cache;
            }
            settings.validate()?;
            store.save_settings(&settings)?;
            printer.print("Settings saved.", PrinterColor::Green);
        }
    }

    let model = match settings.model_display_name() {
        Some(name) => format!("{} ({})", settings.selected_model, name),
        None => settings.selected_model.clone(),
    };
    printer.print(&format!("model:      {}", model), PrinterColor::White);
    printer.print(&format!("iterations: {}", settings.iterations), PrinterColor::White);
    printer.print(&format!("patience:   {}", settings.patience), PrinterColor::White);
    printer.print(&format!("use_cache:  {}", settings.use_cache), PrinterColor::White);
    Ok(())
}

fn history(store: &Store, printer: &Printer, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List => {
            let history = store.load_history()?;
            if history.is_empty() {
                printer.print("No history yet.", PrinterColor::White);
            }
            for (i, item) in history.iter().enumerate() {
                let line = item.replace('\n', " ");
                printer.print(
                    &format!("{:>3}. {}", i + 1, truncate_category_display(&line, HISTORY_TRUNCATE_LENGTH)),
                    PrinterColor::White,
                );
            }
        }
        HistoryAction::Clear => {
            store.clear_history()?;
            printer.print("History cleared.", PrinterColor::Green);
        }
    }
    Ok(())
}
