//! Diagnostics for movie-agent: checks settings, tools and the model server without
//! running an analysis. Prints PASS/FAIL per check; exits 0 only when all pass.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use langgraph::ToolSource;
use serde_json::json;

use movie_agent::{
    logging, ollama_client, DuckDuckGoProvider, MockSearchProvider, MovieTools, SearchProvider, SearchWrapper,
    Settings,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Check {
    All,
    Config,
    Tools,
    Model,
}

#[derive(Parser)]
#[command(name = "movie-agent-diagnose")]
#[command(about = "Check movie-agent configuration, tools and model server")]
struct Args {
    /// Which check to run
    #[arg(value_enum, default_value_t = Check::All)]
    check: Check,

    /// Use a canned search provider instead of the network
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let loaded = Settings::load();
    let settings = loaded.clone().unwrap_or_default();
    logging::init(&settings.agent);

    println!("Running diagnostics...");
    println!("{}", "=".repeat(50));

    let mut results: Vec<(&str, bool)> = Vec::new();
    if matches!(args.check, Check::All | Check::Config) {
        results.push(("Configuration", check_config(&loaded)));
    }
    if matches!(args.check, Check::All | Check::Tools) {
        results.push(("Tools", check_tools(&settings, args.offline).await));
    }
    if matches!(args.check, Check::All | Check::Model) {
        results.push(("Model", check_model(&settings).await));
    }

    println!();
    println!("Diagnostic Results:");
    println!("{}", "=".repeat(30));
    for (name, ok) in &results {
        println!("{}: {}", name, if *ok { "PASS" } else { "FAIL" });
    }
    let all_passed = results.iter().all(|(_, ok)| *ok);
    println!();
    println!(
        "Overall: {}",
        if all_passed { "all checks passed" } else { "some checks failed" }
    );

    if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn check_config(loaded: &Result<Settings, movie_agent::ConfigError>) -> bool {
    println!();
    println!("Testing configuration...");
    let settings = match loaded {
        Ok(s) => s,
        Err(e) => {
            println!("  configuration error: {}", e);
            return false;
        }
    };
    println!("  model: {} at {}", settings.model.name, settings.model.base_url);
    println!("  temperature: {}", settings.model.temperature);
    println!("  search timeout: {}s", settings.search.timeout_secs);
    println!("  search cache TTL: {}s", settings.search.cache_ttl_secs);
    println!("  max iterations: {}", settings.agent.max_iterations);
    println!(
        "  logging: {}",
        if settings.agent.enable_logging { "enabled" } else { "disabled" }
    );
    match settings.validate() {
        Ok(()) => {
            println!("  configuration is valid");
            true
        }
        Err(e) => {
            println!("  configuration error: {}", e);
            false
        }
    }
}

async fn check_tools(settings: &Settings, offline: bool) -> bool {
    println!();
    println!("Testing tools...");
    let provider: Arc<dyn SearchProvider> = if offline {
        Arc::new(MockSearchProvider::always("offline search result"))
    } else {
        match DuckDuckGoProvider::new(settings.search.timeout()) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                println!("  search client error: {}", e);
                return false;
            }
        }
    };
    let tools = MovieTools::new(Arc::new(SearchWrapper::new(provider, &settings.search)));

    let specs = match tools.list_tools().await {
        Ok(specs) => specs,
        Err(e) => {
            println!("  listing tools failed: {}", e);
            return false;
        }
    };
    println!("  found {} tools:", specs.len());
    for spec in &specs {
        println!("    - {}: {}", spec.name, spec.description);
    }

    let mut ok = true;
    match tools.call_tool("calculator", json!({"expression": "2 + 3 * 4"})).await {
        Ok(out) if out.text == "14" => println!("  calculator: 2 + 3 * 4 = 14"),
        other => {
            println!("  calculator returned {:?}, expected 14", other);
            ok = false;
        }
    }
    match tools.call_tool("calculator", json!({"expression": "__import__('os')"})).await {
        Err(_) => println!("  calculator rejects names"),
        Ok(out) => {
            println!("  calculator accepted a name: {}", out.text);
            ok = false;
        }
    }
    match tools.call_tool("search_movie_info", json!({"query": "The Dark Knight cast"})).await {
        Ok(out) => {
            let first = out.text.lines().next().unwrap_or_default();
            println!("  search working: {}", first);
        }
        Err(e) => {
            println!("  search failed: {}", e);
            ok = false;
        }
    }
    ok
}

async fn check_model(settings: &Settings) -> bool {
    println!();
    println!("Testing model server...");
    let client = match ollama_client(&settings.model) {
        Ok(c) => c,
        Err(e) => {
            println!("  model client error: {}", e);
            return false;
        }
    };
    match client.has_model().await {
        Ok(true) => {
            println!("  {} is available at {}", settings.model.name, settings.model.base_url);
            true
        }
        Ok(false) => {
            println!(
                "  {} is not installed; run: ollama pull {}",
                settings.model.name, settings.model.name
            );
            false
        }
        Err(e) => {
            println!("  cannot reach {}: {}", settings.model.base_url, e);
            println!("  make sure Ollama is running: ollama serve");
            false
        }
    }
}
