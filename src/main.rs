//! Interactive command loop: read a line, parse it, and call Jira.
//!
//! All user-facing prose lives here; the classifier only names which entity
//! is missing via its `unclear_*` intents.

use clap::Parser;
use jira_nlu::classifier::NluProcessor;
use jira_nlu::config::JiraConfig;
use jira_nlu::error::Result;
use jira_nlu::jira::{JiraService, UpdateFields};
use jira_nlu::llm::LlmParser;
use jira_nlu::types::{keys, Intent, ParseResult};
use std::io::{self, BufRead, Write};

#[derive(Parser, Debug)]
#[command(name = "jira-nlu", about = "Natural language commands for Jira")]
struct Cli {
    /// Parse commands with an LLM instead of the rule-based classifier
    #[arg(long)]
    llm: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("jira_nlu=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match JiraConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!("Set JIRA_URL, JIRA_USERNAME and JIRA_API_TOKEN before starting.");
            std::process::exit(1);
        }
    };
    let service = JiraService::new(config);

    let nlu = NluProcessor::new();
    if !cli.llm && !nlu.is_ready() {
        eprintln!("NLU rules failed to load. Cannot process commands.");
        std::process::exit(1);
    }

    let llm = if cli.llm {
        match LlmParser::from_env() {
            Ok(parser) => Some(parser),
            Err(e) => {
                eprintln!("LLM parser unavailable: {e}");
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    println!("--- Jira NLP Automation Tool ---");
    println!("Enter commands to interact with Jira (e.g., 'create a story...', 'close MYPROJ-123').");
    println!("Type 'exit' or 'quit' to stop.");

    let stdin = io::stdin();
    loop {
        print!("\nEnter command: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if command.eq_ignore_ascii_case("exit") || command.eq_ignore_ascii_case("quit") {
            println!("Exiting Jira NLP Automation. Goodbye!");
            break;
        }

        let parsed = match &llm {
            Some(parser) => match parser.parse(command).await {
                Ok(parsed) => parsed,
                Err(e) => {
                    println!("LLM parsing failed: {e}");
                    continue;
                }
            },
            None => nlu.classify(command),
        };
        handle_command(&service, command, parsed).await;
    }

    Ok(())
}

async fn handle_command(service: &JiraService, command: &str, parsed: ParseResult) {
    match parsed.intent {
        Intent::Create => {
            let issue_type = parsed.entity(keys::ISSUE_TYPE).unwrap_or("Story");
            let description = parsed.entity(keys::DESCRIPTION).unwrap_or("");
            match (parsed.entity(keys::PROJECT_KEY), parsed.entity(keys::SUMMARY)) {
                (Some(project_key), Some(summary)) => {
                    println!(
                        "Attempting to create {issue_type} '{summary}' in project '{project_key}'..."
                    );
                    match service
                        .create_issue(project_key, summary, description, issue_type)
                        .await
                    {
                        Ok(created) => println!(
                            "Created {}: {}",
                            created.key,
                            service.browse_url(&created.key)
                        ),
                        Err(e) => println!("Failed to create issue: {e}"),
                    }
                }
                _ => {
                    println!("Error: for 'create', specify both a project and a summary.");
                    println!("Example: create a story called 'Setup CI/CD' in project DEVOPS");
                }
            }
        }

        Intent::Transition => {
            match (
                parsed.entity(keys::ISSUE_KEY),
                parsed.entity(keys::TRANSITION_NAME),
            ) {
                (Some(issue_key), Some(transition_name)) => {
                    println!(
                        "Attempting to transition issue '{issue_key}' to '{transition_name}'..."
                    );
                    match service.transition_issue(issue_key, transition_name).await {
                        Ok(()) => println!("Transitioned {issue_key} to '{transition_name}'."),
                        Err(e) => println!("Failed to transition issue: {e}"),
                    }
                }
                _ => {
                    println!("Error: for 'transition', specify an issue key and a transition name.");
                    println!("Example: close MYPROJ-123 or resolve PROJ-456");
                }
            }
        }

        Intent::Modify => {
            let issue_key = parsed.entity(keys::ISSUE_KEY);
            let field = parsed.entity(keys::FIELD);
            let new_value = parsed.entity(keys::NEW_VALUE);
            match (issue_key, field, new_value) {
                (Some(issue_key), Some(field), Some(new_value)) => {
                    println!("Attempting to modify issue '{issue_key}' {field} to '{new_value}'...");
                    let fields = match field {
                        "summary" => UpdateFields::summary(new_value),
                        "description" => UpdateFields::description(new_value),
                        other => {
                            println!("Modification for field '{other}' is not yet supported.");
                            println!("Currently supported fields: 'summary', 'description'.");
                            return;
                        }
                    };
                    match service.update_issue(issue_key, fields).await {
                        Ok(()) => println!("Updated {issue_key}."),
                        Err(e) => println!("Failed to update issue: {e}"),
                    }
                }
                _ => {
                    println!(
                        "Error: for 'modify', specify an issue key, a field (summary/description) and a new value."
                    );
                    println!("Example: modify MYPROJ-123 summary to 'New Title'");
                }
            }
        }

        Intent::UnclearCreate => {
            println!("I understood you want to create an issue, but the command is incomplete.");
            println!("Please provide a summary and project key. Example: create a story 'Build UI' in PROJ");
        }

        Intent::UnclearTransition => {
            println!("I understood you want to transition an issue, but the command is incomplete.");
            println!("Please provide an issue key. Example: close MYPROJ-123");
        }

        Intent::UnclearModify => {
            println!("I understood you want to modify an issue, but the command is incomplete.");
            println!("Please provide an issue key and what to modify (summary or description) with its new value.");
            println!("Example: modify MYPROJ-123 summary to 'New Title'");
        }

        Intent::Error => {
            println!(
                "{}",
                parsed
                    .message
                    .as_deref()
                    .unwrap_or("The classifier is unavailable.")
            );
        }

        Intent::Unknown => {
            println!("Sorry, I didn't understand the command: '{command}'.");
            println!("Try 'create a story...', 'close MYPROJ-123', or 'modify MYPROJ-123 summary to ...'.");
        }
    }
}
