//! CLI for movie-agent: analyze a movie's lead cast and their recent films.
//!
//! Loads settings from the environment (and `.env`), validates them before any
//! network client is built, then runs the two-pass analysis and prints the report.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use movie_agent::{
    format_report, logging, ollama_client, AnalysisError, DuckDuckGoProvider, MovieAnalysisAgent,
    MovieTools, SearchWrapper, Settings,
};

const DEFAULT_TITLE: &str = "The Dark Knight";
const GRAPH_FILE: &str = "graph.mmd";

#[derive(Parser)]
#[command(name = "movie-agent")]
#[command(about = "Find a movie's lead cast and each actor's recent films using a local LLM (Ollama) and web search")]
struct Args {
    /// Movie title to analyze; prompts for one when omitted
    title: Option<String>,

    /// Keep asking for titles until quit/exit/q
    #[arg(long, short)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let settings = match Settings::load_validated() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration Error: {}", e);
            eprintln!("Please check your .env file and environment.");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&settings.agent);

    match run(args, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "movie-agent failed");
            eprintln!("Error: {:#}", e);
            eprintln!("Make sure Ollama is running and the model is installed (e.g. `ollama pull mistral`).");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, settings: Settings) -> Result<()> {
    info!(model = %settings.model.name, base_url = %settings.model.base_url, "starting movie analysis agent");

    let llm = Arc::new(ollama_client(&settings.model).context("building model client")?);
    let provider = Arc::new(DuckDuckGoProvider::new(settings.search.timeout()).context("building search client")?);
    let search = Arc::new(SearchWrapper::new(provider, &settings.search));
    let tools = Arc::new(MovieTools::new(search));
    let agent = MovieAnalysisAgent::new(llm, tools, &settings)
        .await
        .context("building agent")?;

    if settings.agent.graph_visualization {
        match std::fs::write(GRAPH_FILE, agent.graph_mermaid()) {
            Ok(()) => info!(path = GRAPH_FILE, "graph visualization saved"),
            Err(e) => warn!(path = GRAPH_FILE, error = %e, "could not save graph visualization"),
        }
    }

    println!("Movie Analysis Agent");
    println!("{}", "=".repeat(40));

    if args.interactive {
        loop {
            let Some(line) = prompt_line("Enter a movie name (quit/exit/q to stop): ")? else {
                break;
            };
            let title = line.trim();
            if matches!(title.to_ascii_lowercase().as_str(), "quit" | "exit" | "q") {
                break;
            }
            if title.is_empty() {
                continue;
            }
            if let Err(e) = analyze_and_print(&agent, title).await {
                error!(error = %e, "analysis failed");
                eprintln!("Error: {:#}", e);
            }
        }
        println!("Goodbye!");
        return Ok(());
    }

    let title = match args.title {
        Some(t) => t,
        None => prompt_line(&format!("Enter a movie name (or press Enter for '{}'): ", DEFAULT_TITLE))?
            .unwrap_or_default(),
    };
    let title = if title.trim().is_empty() {
        println!("Using default movie: {}", DEFAULT_TITLE);
        DEFAULT_TITLE.to_string()
    } else {
        title
    };
    analyze_and_print(&agent, &title).await
}

/// Runs one analysis; analysis failures are reported, not propagated.
async fn analyze_and_print(agent: &MovieAnalysisAgent, title: &str) -> Result<()> {
    println!();
    println!("Analyzing movie: {}", title.trim());
    println!("{}", "=".repeat(50));

    match agent.analyze(title).await {
        Ok(result) => {
            println!("{}", format_report(&result));
        }
        Err(AnalysisError::NoCastFound { answer, failures, .. }) => {
            println!("Could not identify the lead cast of '{}'.", title.trim());
            for f in &failures {
                warn!(line_no = f.line_no, line = %f.line, "unparsed cast line");
            }
            if !answer.trim().is_empty() {
                println!();
                println!("Model answer:");
                println!("{}", answer.trim());
            }
        }
        Err(e @ AnalysisError::EmptyTitle) => println!("{}", e),
        Err(e @ AnalysisError::CastRunFailed { .. }) => {
            return Err(anyhow::Error::new(e));
        }
    }

    let info = agent.info();
    println!("Agent Info: {} with {} tools", info.model, info.tools_count());
    Ok(())
}

/// Prints `prompt` and reads one line from stdin; `None` at end of input.
fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush().context("flushing stdout")?;
    let mut line = String::new();
    let n = io::stdin().lock().read_line(&mut line).context("reading stdin")?;
    Ok((n > 0).then_some(line))
}
