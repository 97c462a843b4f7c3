//! Command-line client that runs the Sahayak orchestrator in-process.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use sahayak_api::{config::Config, state::build_orchestrator};
use sahayak_core::{
    Orchestrator, TaskRequest, TaskType,
    generation::OfflineGenerationService,
    orchestrator::Orchestration,
    prompts::PromptLibrary,
    settings::OrchestratorSettings,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{Level, debug};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate classroom material with specialised content agents", long_about = None)]
struct Cli {
    /// Use the deterministic offline generator instead of the configured provider
    #[arg(long, global = true)]
    offline: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a free-text request without generating anything
    Classify {
        text: String,
        /// Language to assume when the text does not name one
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Run a single agent on a structured request
    Generate {
        /// story, worksheet, visual_aid, lesson_plan, qna or translation
        task_type: String,
        #[arg(short, long)]
        topic: String,
        #[arg(short, long, default_value = "3-5")]
        grade: String,
        #[arg(short, long, default_value = "general")]
        subject: String,
        #[arg(short, long, default_value = "en")]
        language: String,
        #[arg(short, long)]
        context: Option<String>,
    },
    /// Classify, dispatch every mentioned task and print the merged lesson package
    Orchestrate {
        text: String,
        /// Print the full JSON result instead of the merged document
        #[arg(long)]
        json: bool,
    },
    /// Show what the orchestrator supports
    Capabilities,
    /// Show an example request for one task type
    Template { task_type: String },
}

fn orchestrator(offline: bool) -> anyhow::Result<Orchestrator> {
    if offline {
        return Ok(Orchestrator::new(
            Arc::new(OfflineGenerationService),
            Arc::new(PromptLibrary::builtin()),
            OrchestratorSettings::default(),
        ));
    }
    let config = Config::from_env().context("Failed to load configuration (try --offline)")?;
    build_orchestrator(&config)
}

fn print_json(value: impl serde::Serialize) -> anyhow::Result<()> {
    let value: Value = serde_json::to_value(value)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let orchestrator = orchestrator(cli.offline)?;
    debug!(command = ?cli.command, "Running command");

    match cli.command {
        Command::Classify { text, language } => {
            print_json(orchestrator.analyze(&text, language.as_deref()))?;
        }
        Command::Generate {
            task_type,
            topic,
            grade,
            subject,
            language,
            context,
        } => {
            let task: TaskType = task_type.parse()?;
            let mut request = TaskRequest::new(task, topic, grade)
                .with_subject(subject)
                .with_language(language);
            request.context = context;

            let response = orchestrator.generate(&request).await;
            if !response.success {
                let message = response.error_message.as_deref().unwrap_or("Unknown error");
                bail!("{}: {message}", response.agent_type);
            }
            println!("{}", response.content);
        }
        Command::Orchestrate { text, json } => {
            let outcome = orchestrator.orchestrate(&text).await?;
            match outcome {
                Orchestration::Completed(result) if !json => match &result.merged_document {
                    Some(document) => println!("{document}"),
                    None => print_json(&result.responses)?,
                },
                other => print_json(other)?,
            }
        }
        Command::Capabilities => print_json(orchestrator.capabilities())?,
        Command::Template { task_type } => print_json(orchestrator.task_template(&task_type)?)?,
    }
    Ok(())
}
