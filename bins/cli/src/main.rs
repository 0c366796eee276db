//! CLI binary entrypoint.

mod error;
mod format;

use clap::{Parser, Subcommand, ValueEnum};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode};
use resumariner_api::v1::{self, ApiV1ErrorDto, ApiV1Result};
use resumariner_core::build_info;
use resumariner_domain::{HybridWeights, InterviewType as DomainInterviewType, JobId, SearchFilters, SearchMode as DomainSearchMode, Uid};
use resumariner_facade::Facade;
use resumariner_shared::{ErrorEnvelope, RequestContext};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "resumariner",
    version,
    about = "Resume ingestion, search, and RAG CLI",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    /// Path to the backend config file (JSON or TOML). Falls back to env/defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory uploaded resumes are written to before ingestion.
    #[arg(long, global = true, default_value = ".resumariner/uploads")]
    upload_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show build and version details.
    Info,
    /// Submit a resume file for background ingestion.
    Ingest {
        /// Path to the resume file (PDF or image) to upload.
        file: PathBuf,
    },
    /// Run the ingestion worker and cleanup loops in the foreground.
    Worker {
        /// Milliseconds to wait for a queued task before polling again.
        #[arg(long, default_value_t = 5_000)]
        poll_timeout_ms: u64,
        /// Milliseconds an in-flight task may run before it is reclaimed.
        #[arg(long, default_value_t = 300_000)]
        visibility_timeout_ms: u64,
    },
    /// Background job commands.
    Jobs {
        #[command(subcommand)]
        command: JobsCommands,
    },
    /// Run semantic, structured, or hybrid search over stored resumes.
    Search {
        /// Search mode.
        #[arg(long, value_enum, default_value = "hybrid")]
        mode: CliSearchMode,
        /// Free-text query, required for semantic and hybrid modes.
        #[arg(long)]
        query: Option<String>,
        /// Structured filters, encoded as JSON (`SearchFilters` shape).
        #[arg(long)]
        filters_json: Option<String>,
        /// Maximum number of hits to return.
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Minimum match score, below which hits are dropped.
        #[arg(long)]
        min_score: Option<f32>,
        /// Hybrid vector-score weight (paired with `--graph-weight`).
        #[arg(long)]
        vector_weight: Option<f64>,
        /// Hybrid graph-presence weight (paired with `--vector-weight`).
        #[arg(long)]
        graph_weight: Option<f64>,
    },
    /// Retrieval-augmented generation commands.
    Rag {
        #[command(subcommand)]
        command: RagCommands,
    },
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum JobsCommands {
    /// Fetch the current state of a job.
    Status {
        /// Job id, as returned by `ingest`.
        job_id: String,
    },
    /// List the most recently updated jobs.
    List {
        /// Maximum number of jobs to return.
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Delete a job record.
    Delete {
        /// Job id to delete.
        job_id: String,
    },
}

#[derive(Debug, Subcommand)]
enum RagCommands {
    /// Explain how well one resume fits a job description.
    ExplainMatch {
        /// Candidate resume uid.
        uid: String,
        /// Job description text.
        #[arg(long)]
        job_description: String,
    },
    /// Compare 2-5 candidates head-to-head.
    CompareCandidates {
        /// Candidate uids, comma-separated (2 to 5 required).
        #[arg(long, value_delimiter = ',')]
        uids: Vec<String>,
        /// Optional comparison criteria, freeform text.
        #[arg(long)]
        criteria: Option<String>,
        /// Optional job context to compare candidates against.
        #[arg(long)]
        job_context: Option<String>,
    },
    /// Generate an interview question set for a candidate.
    InterviewQuestions {
        /// Candidate resume uid.
        uid: String,
        /// Interview type.
        #[arg(long, value_enum, default_value = "technical")]
        interview_type: CliInterviewType,
        /// Optional role context, freeform text.
        #[arg(long)]
        role_context: Option<String>,
        /// Optional focus areas, comma-separated.
        #[arg(long, value_delimiter = ',')]
        focus_areas: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the effective config (defaults merged with env and file), as JSON.
    Show,
    /// Validate that the environment can be parsed into config overrides.
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliSearchMode {
    Semantic,
    Structured,
    Hybrid,
}

impl CliSearchMode {
    const fn into_domain(self) -> DomainSearchMode {
        match self {
            Self::Semantic => DomainSearchMode::Semantic,
            Self::Structured => DomainSearchMode::Structured,
            Self::Hybrid => DomainSearchMode::Hybrid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliInterviewType {
    Technical,
    Behavioral,
    General,
}

impl CliInterviewType {
    const fn into_domain(self) -> DomainInterviewType {
        match self {
            Self::Technical => DomainInterviewType::Technical,
            Self::Behavioral => DomainInterviewType::Behavioral,
            Self::General => DomainInterviewType::General,
        }
    }
}

fn main() -> ProcessExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => return exit_with_error(&CliError::from(error)),
    };

    match runtime.block_on(run(&cli, mode)) {
        Ok(output) => match write_output(&output) {
            Ok(()) => ProcessExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> ProcessExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    ProcessExitCode::from(error.exit_code().as_u8())
}

struct CliOutput {
    stdout: String,
    exit_code: ExitCode,
}

async fn run(cli: &Cli, mode: OutputMode) -> Result<CliOutput, CliError> {
    match &cli.command {
        Commands::Info => run_info(mode),
        Commands::Config { command } => run_config_command(cli, mode, command),
        Commands::Ingest { file } => run_ingest(cli, mode, file).await,
        Commands::Worker {
            poll_timeout_ms,
            visibility_timeout_ms,
        } => run_worker(cli, *poll_timeout_ms, *visibility_timeout_ms).await,
        Commands::Jobs { command } => run_jobs_command(cli, mode, command).await,
        Commands::Search {
            mode: search_mode,
            query,
            filters_json,
            limit,
            min_score,
            vector_weight,
            graph_weight,
        } => {
            run_search(
                cli,
                mode,
                *search_mode,
                query.clone(),
                filters_json.as_deref(),
                *limit,
                *min_score,
                *vector_weight,
                *graph_weight,
            )
            .await
        },
        Commands::Rag { command } => run_rag_command(cli, mode, command).await,
    }
}

fn run_info(mode: OutputMode) -> Result<CliOutput, CliError> {
    #[derive(Serialize)]
    struct InfoPayload {
        name: &'static str,
        version: &'static str,
        rustc_version: &'static str,
        target: &'static str,
        profile: &'static str,
    }

    let info = build_info();
    emit_ok(
        mode,
        &InfoPayload {
            name: info.name,
            version: info.version,
            rustc_version: info.rustc_version,
            target: info.target,
            profile: info.profile,
        },
    )
}

fn run_config_command(
    cli: &Cli,
    mode: OutputMode,
    command: &ConfigCommands,
) -> Result<CliOutput, CliError> {
    let env: std::collections::BTreeMap<String, String> = std::env::vars().collect();

    match command {
        ConfigCommands::Show => {
            match resumariner_facade::load_effective_config_json(&env, cli.config.as_deref()) {
                Ok(json) => {
                    let value: serde_json::Value = serde_json::from_str(&json)?;
                    emit_ok(mode, &value)
                },
                Err(error) => Ok(emit_err(mode, &error)),
            }
        },
        ConfigCommands::Validate => {
            match resumariner_facade::validate_env_parsing(&env) {
                Ok(()) => emit_ok(mode, &serde_json::json!({ "valid": true })),
                Err(error) => Ok(emit_err(mode, &error)),
            }
        },
    }
}

fn build_facade(cli: &Cli) -> Result<Facade, CliError> {
    Facade::init(cli.config.as_deref(), cli.upload_dir.clone()).map_err(CliError::from)
}

async fn run_ingest(cli: &Cli, mode: OutputMode, file: &PathBuf) -> Result<CliOutput, CliError> {
    let facade = build_facade(cli)?;
    let ctx = RequestContext::new_request();

    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::InvalidInput("--file has no file name component".to_string()))?;
    let bytes = std::fs::read(file)?;

    match facade.submit_ingestion_job(&ctx, &file_name, bytes).await {
        Ok(job) => emit_ok(mode, &job),
        Err(error) => Ok(emit_err(mode, &error)),
    }
}

async fn run_worker(cli: &Cli, poll_timeout_ms: u64, visibility_timeout_ms: u64) -> Result<CliOutput, CliError> {
    let facade = build_facade(cli)?;
    let runtime = facade.spawn_worker(
        std::time::Duration::from_millis(poll_timeout_ms),
        std::time::Duration::from_millis(visibility_timeout_ms),
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, draining worker");
    runtime.shutdown().await?;

    Ok(CliOutput {
        stdout: String::new(),
        exit_code: ExitCode::Ok,
    })
}

async fn run_jobs_command(
    cli: &Cli,
    mode: OutputMode,
    command: &JobsCommands,
) -> Result<CliOutput, CliError> {
    let facade = build_facade(cli)?;
    let ctx = RequestContext::new_request();

    match command {
        JobsCommands::Status { job_id } => {
            let job_id = JobId::parse(job_id)?;
            match facade.get_job(&ctx, job_id).await {
                Ok(Some(job)) => emit_ok(mode, &job),
                Ok(None) => Err(CliError::InvalidInput(format!("job {job_id} not found"))),
                Err(error) => Ok(emit_err(mode, &error)),
            }
        },
        JobsCommands::List { limit } => match facade.list_jobs(&ctx, *limit).await {
            Ok(jobs) => emit_ok(mode, &jobs),
            Err(error) => Ok(emit_err(mode, &error)),
        },
        JobsCommands::Delete { job_id } => {
            let job_id = JobId::parse(job_id)?;
            match facade.delete_job(&ctx, job_id).await {
                Ok(deleted) => emit_ok(mode, &serde_json::json!({ "deleted": deleted })),
                Err(error) => Ok(emit_err(mode, &error)),
            }
        },
    }
}

#[allow(clippy::too_many_arguments, reason = "mirrors Facade::search's parameter list one-for-one")]
async fn run_search(
    cli: &Cli,
    mode: OutputMode,
    search_mode: CliSearchMode,
    query: Option<String>,
    filters_json: Option<&str>,
    limit: u32,
    min_score: Option<f32>,
    vector_weight: Option<f64>,
    graph_weight: Option<f64>,
) -> Result<CliOutput, CliError> {
    let facade = build_facade(cli)?;
    let ctx = RequestContext::new_request();

    let filters: SearchFilters = match filters_json {
        Some(raw) => serde_json::from_str(raw)?,
        None => SearchFilters::default(),
    };
    let weights = match (vector_weight, graph_weight) {
        (None, None) => None,
        (vector, graph) => Some(HybridWeights {
            vector_weight: vector.unwrap_or(0.5),
            graph_weight: graph.unwrap_or(0.5),
        }),
    };

    match facade
        .search(
            &ctx,
            search_mode.into_domain(),
            query,
            filters,
            limit,
            min_score,
            weights,
        )
        .await
    {
        Ok(hits) => emit_ok(mode, &hits),
        Err(error) => Ok(emit_err(mode, &error)),
    }
}

async fn run_rag_command(
    cli: &Cli,
    mode: OutputMode,
    command: &RagCommands,
) -> Result<CliOutput, CliError> {
    let facade = build_facade(cli)?;
    let ctx = RequestContext::new_request();

    match command {
        RagCommands::ExplainMatch { uid, job_description } => {
            let uid = Uid::parse(uid)?;
            match facade.explain_match(&ctx, uid, job_description).await {
                Ok(explanation) => emit_ok(mode, &explanation),
                Err(error) => Ok(emit_err(mode, &error)),
            }
        },
        RagCommands::CompareCandidates {
            uids,
            criteria,
            job_context,
        } => {
            let uids = uids
                .iter()
                .map(Uid::parse)
                .collect::<Result<Vec<_>, _>>()?;
            match facade
                .compare_candidates(&ctx, uids, criteria.as_deref(), job_context.as_deref())
                .await
            {
                Ok(comparison) => emit_ok(mode, &comparison),
                Err(error) => Ok(emit_err(mode, &error)),
            }
        },
        RagCommands::InterviewQuestions {
            uid,
            interview_type,
            role_context,
            focus_areas,
        } => {
            let uid = Uid::parse(uid)?;
            match facade
                .generate_interview_questions(
                    &ctx,
                    uid,
                    interview_type.into_domain(),
                    role_context.as_deref(),
                    focus_areas,
                )
                .await
            {
                Ok(questions) => emit_ok(mode, &questions),
                Err(error) => Ok(emit_err(mode, &error)),
            }
        },
    }
}

fn emit_ok<T: Serialize>(mode: OutputMode, data: &T) -> Result<CliOutput, CliError> {
    let envelope = ApiV1Result::ok(data);
    let stdout = render(mode, &envelope)?;
    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}

fn emit_err(mode: OutputMode, error: &ErrorEnvelope) -> CliOutput {
    let api_error: ApiV1ErrorDto = v1::error_envelope_to_api_v1_error(error, None);
    let exit_code = CliError::from(error.clone()).exit_code();
    let envelope = ApiV1Result::<()>::err(api_error);
    let stdout = render(mode, &envelope).unwrap_or_else(|_| "{\"ok\":false}\n".to_string());
    CliOutput { stdout, exit_code }
}

fn render<T: Serialize>(mode: OutputMode, value: &T) -> Result<String, CliError> {
    let mut rendered = if mode.is_ndjson() {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    rendered.push('\n');
    Ok(rendered)
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    io::stdout().write_all(output.stdout.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn emit_ok_wraps_payload_with_ok_flag() -> Result<(), Box<dyn std::error::Error>> {
        let mode = OutputMode::from_args(&OutputArgs {
            output: Some(format::OutputFormat::Json),
            json: false,
            agent: false,
            no_progress: true,
            interactive: false,
        });
        let output = emit_ok(mode, &serde_json::json!({ "hello": "world" }))?;
        let value: serde_json::Value = serde_json::from_str(output.stdout.trim())?;
        assert_eq!(value.get("ok").and_then(serde_json::Value::as_bool), Some(true));
        assert_eq!(output.exit_code, ExitCode::Ok);
        Ok(())
    }

    #[test]
    fn emit_err_maps_expected_errors_to_invalid_input_exit_code() {
        let mode = OutputMode::from_args(&OutputArgs {
            output: Some(format::OutputFormat::Json),
            json: false,
            agent: false,
            no_progress: true,
            interactive: false,
        });
        let error = ErrorEnvelope::expected(
            resumariner_shared::ErrorCode::new("cli", "bad_input"),
            "bad input",
        );
        let output = emit_err(mode, &error);
        assert_eq!(output.exit_code, ExitCode::InvalidInput);
    }
}
