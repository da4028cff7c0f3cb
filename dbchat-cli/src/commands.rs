//! Command handlers for the `dbchat` binary.

use crate::{AiArgs, Cli, Command, ModelArgs};
use anyhow::{Context, Result, bail};
use dbchat_core::{
    AiOrchestrator, ChatMessage, DatabaseAdapter as _, DatabaseManager, DatabaseSchema, EngineType,
    HistoryStore, ai::enhancer::enhance_schema, error::redact_database_url,
};
use std::process::ExitCode;
use tracing::{error, info};

/// How `schema` prints the introspected schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaView {
    Json,
    RawDdl,
    Enhanced,
}

impl SchemaView {
    pub fn from_flags(raw: bool, enhanced: bool) -> Self {
        match (raw, enhanced) {
            (true, _) => Self::RawDdl,
            (false, true) => Self::Enhanced,
            (false, false) => Self::Json,
        }
    }
}

/// Runs the parsed command.
///
/// # Errors
/// Returns an error for a missing connection string, a failed connect, or any
/// schema, execution or provider failure.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        Command::Engines => {
            print!("{}", render_engines());
            Ok(ExitCode::SUCCESS)
        }
        Command::Test { url } => {
            let url = match url.as_deref() {
                Some(url) => url,
                None => require_database_url(cli.database_url.as_deref())?,
            };
            Ok(if test_connection(url).await {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Chat { messages, model } => chat(&cli.ai, model, messages).await,
        Command::Schema { raw, enhanced } => {
            let manager = connect(cli.database_url.as_deref()).await?;
            let outcome = show_schema(&manager, SchemaView::from_flags(*raw, *enhanced)).await;
            finish(manager, outcome).await
        }
        Command::Execute { sql } => {
            let manager = connect(cli.database_url.as_deref()).await?;
            let outcome = execute(&manager, sql).await;
            finish(manager, outcome).await
        }
        Command::Ask {
            prompt,
            model,
            basic,
            run,
        } => {
            let manager = connect(cli.database_url.as_deref()).await?;
            let outcome = ask(&manager, &cli.ai, model, prompt, !*basic, *run).await;
            finish(manager, outcome).await
        }
    }
}

/// Returns the connection string or explains how to provide one.
///
/// # Errors
/// Returns an error if `database_url` is absent or blank
pub fn require_database_url(database_url: Option<&str>) -> Result<&str> {
    match database_url.map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url),
        _ => bail!(
            "Database connection information required. Set DATABASE_URL or pass --database-url."
        ),
    }
}

/// One line per supported engine.
pub fn render_engines() -> String {
    EngineType::ALL
        .iter()
        .map(|engine| {
            format!(
                "{:<12} {}://user[:password]@host[:{}]/database\n",
                engine.dialect_name(),
                engine.scheme(),
                engine.default_port()
            )
        })
        .collect()
}

/// Formats a schema for printing.
///
/// # Errors
/// Returns an error if JSON serialization fails
pub fn render_schema(schema: &DatabaseSchema, dialect: &str, view: SchemaView) -> Result<String> {
    Ok(match view {
        SchemaView::Json => serde_json::to_string_pretty(schema)?,
        SchemaView::RawDdl => schema.raw_ddl.join("\n\n"),
        SchemaView::Enhanced => enhance_schema(schema, dialect),
    })
}

async fn test_connection(url: &str) -> bool {
    info!("Testing connection to {}", redact_database_url(url));
    let manager = DatabaseManager::default();

    let reachable = manager.test_connection(url).await;
    if reachable {
        println!("Connection to {} successful", redact_database_url(url));
    } else {
        error!("Connection test failed");
        println!("Connection to {} failed", redact_database_url(url));
    }
    reachable
}

async fn connect(database_url: Option<&str>) -> Result<DatabaseManager> {
    let url = require_database_url(database_url)?;
    let mut manager = DatabaseManager::default();
    if !manager.connect(url).await {
        bail!("Failed to connect to {}", redact_database_url(url));
    }
    Ok(manager)
}

/// Closes the connection whatever the outcome of the command.
async fn finish(mut manager: DatabaseManager, outcome: Result<ExitCode>) -> Result<ExitCode> {
    manager.disconnect().await;
    outcome
}

fn dialect(manager: &DatabaseManager) -> Result<&'static str> {
    manager
        .current_adapter()
        .map(|adapter| adapter.engine_name())
        .context("No database connection")
}

async fn show_schema(manager: &DatabaseManager, view: SchemaView) -> Result<ExitCode> {
    let schema = manager.get_schema().await?;
    info!("Found {} tables", schema.table_count());
    println!("{}", render_schema(&schema, dialect(manager)?, view)?);
    Ok(ExitCode::SUCCESS)
}

async fn execute(manager: &DatabaseManager, sql: &str) -> Result<ExitCode> {
    let result = manager.execute(sql).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(ExitCode::SUCCESS)
}

async fn ask(
    manager: &DatabaseManager,
    ai: &AiArgs,
    model: &ModelArgs,
    prompt: &str,
    enhanced: bool,
    run: bool,
) -> Result<ExitCode> {
    let schema = manager.get_schema().await?;
    let dialect = dialect(manager)?;

    let mut orchestrator = AiOrchestrator::new(ai.to_settings(enhanced));
    let generated = orchestrator
        .generate_query(model.service, &model.model, prompt, &schema, dialect)
        .await?;

    let mut history = HistoryStore::new();
    let item = history.record(prompt, &generated);
    println!("{}", serde_json::to_string_pretty(item)?);

    if run {
        info!("Running generated query");
        let result = manager
            .execute(&generated.query)
            .await
            .context("Generated query failed")?;
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(ExitCode::SUCCESS)
}

async fn chat(ai: &AiArgs, model: &ModelArgs, messages: &[String]) -> Result<ExitCode> {
    let settings = ai.to_settings(true);
    settings.validate()?;

    let conversation: Vec<ChatMessage> = messages.iter().map(ChatMessage::user).collect();
    let mut orchestrator = AiOrchestrator::new(settings);
    let reply = orchestrator
        .chat_prompt(&conversation, model.service, &model.model)
        .await?;
    println!("{}", reply);
    Ok(ExitCode::SUCCESS)
}
