//! Command-line trip planner: asks Gemini one travel question and prints
//! the answer.

#[macro_use]
extern crate tracing;

use std::error::Error;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use trip_planner::SessionBuilder;
use trip_planner::config::Config;
use trip_planner::core::ReplyKind;
use trip_planner::core::conversation::{Conversation, Role};
use trip_planner_gemini_model::GeminiProvider;

const DEFAULT_QUERY: &str = "Plan a 5-day trip to Paris and Tokyo with a \
    budget of $3000. Include weather forecast and top attractions.";

const PREVIEW_CHARS: usize = 500;

const BAR_CHAR: &str = "▎";

#[derive(Parser)]
#[command(name = "trip-planner", version, about = "Plans trips with Gemini")]
struct Cli {
    /// The travel question. A sample Paris and Tokyo trip is planned when
    /// omitted.
    query: Vec<String>,

    /// Print every message of the conversation before the answer.
    #[arg(short, long)]
    verbose: bool,

    /// Gemini model to use, overriding GEMINI_MODEL.
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".bright_red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = Config::from_env()?;
    if cli.model.is_some() {
        config.model = cli.model;
    }
    let gemini_config = config.gemini_config();
    debug!("using {gemini_config:?}");

    let mut session =
        SessionBuilder::with_model_provider(GeminiProvider::new(gemini_config))
            .with_min_call_interval(config.rate_limit_delay)
            .with_retry_policy(config.retry_policy)
            .build();

    let query = if cli.query.is_empty() {
        DEFAULT_QUERY.to_owned()
    } else {
        cli.query.join(" ")
    };

    let progress_bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {wide_msg}") {
        progress_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    progress_bar.set_message("🧳 Planning...");
    progress_bar.enable_steady_tick(Duration::from_millis(100));

    let result = session.ask(&query).await;
    progress_bar.finish_and_clear();

    if cli.verbose {
        print_conversation(session.conversation());
    }

    let reply = result?;
    match reply.kind {
        ReplyKind::Answer => println!("{}", reply.text),
        ReplyKind::QuotaExhausted | ReplyKind::NoAnswer => {
            println!("{}{}", BAR_CHAR.bright_yellow(), reply.text)
        }
    }
    Ok(())
}

fn print_conversation(conversation: &Conversation) {
    for (idx, item) in conversation.iter().enumerate() {
        let transcript = item.transcript();
        if !transcript.is_empty() {
            let header = format!("[{}] {}:", idx + 1, role_name(item.role()));
            println!("\n{}", header.bright_cyan().bold());
            println!("{}", preview(transcript));
        }

        let tool_calls = item.tool_calls();
        if !tool_calls.is_empty() {
            println!("  → Tool calls: {}", tool_calls.len());
            for call in tool_calls {
                println!("    - {}", call.name.bright_white());
            }
        }
    }
    println!("\n{}", "─".repeat(60).dimmed());
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Model => "Model",
        Role::ToolResult => "Tool",
    }
}

/// Cuts `text` to its first 500 characters.
fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();

        let cli = Cli::parse_from([
            "trip-planner",
            "--verbose",
            "Weekend",
            "in",
            "London",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.query.join(" "), "Weekend in London");
        assert_eq!(cli.model, None);
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(PREVIEW_CHARS + 1);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), PREVIEW_CHARS + 3);
        assert!(cut.ends_with("é..."));
        assert_eq!(preview(&"a".repeat(PREVIEW_CHARS)).len(), PREVIEW_CHARS);
    }
}
