use batchjob_spec::api::{JobRun, JobTemplate};
use batchjob_spec::config::AdmissionConfig;
use batchjob_spec::report::{AdmissionView, DecodeView, StatusView};
use batchjob_spec::status::Observations;
use batchjob_spec::{Result, admission, diagnostics, range};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

#[derive(Parser)]
#[command(name = "batchjob-spec")]
#[command(about = "Array batch job spec resolver", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an arraySpec range expression.
    Decode { expression: String },

    /// Resolve a job run against its template and validate it.
    Admit {
        #[arg(long)]
        run: String,

        #[arg(long)]
        template: Option<String>,

        #[arg(long)]
        config: Option<String>,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },

    /// Default and validate a job template.
    CheckTemplate {
        #[arg(long)]
        template: String,

        #[arg(long)]
        config: Option<String>,
    },

    /// Fold per-index pod phases into a run's status.
    Status {
        #[arg(long)]
        run: String,

        /// JSON object of index to pod phase, e.g. {"0": "Succeeded"}.
        #[arg(long)]
        observations: String,

        #[arg(long)]
        total: i64,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path))
}

fn load_config(path: Option<&str>) -> Result<AdmissionConfig> {
    match path {
        Some(path) => AdmissionConfig::from_file(path),
        None => Ok(AdmissionConfig::default()),
    }
}

fn emit<T: Serialize>(value: &T, out: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(out) => {
            std::fs::write(out, json).with_context(|| format!("failed to write {}", out))?;
            info!("wrote {}", out);
            println!("Wrote {}", out);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::init(&cli.log_level)?;

    match cli.cmd {
        Commands::Decode { expression } => {
            let indices = range::decode(&expression).map_err(|e| {
                anyhow::anyhow!(
                    "{}",
                    diagnostics::error_message(format!("invalid range expression {:?}: {}", expression, e))
                )
            })?;
            emit(&DecodeView::new(&expression, &indices), None)?;
        }

        Commands::Admit {
            run,
            template,
            config,
            out,
        } => {
            let config = load_config(config.as_deref())?;
            let job_run: JobRun = read_json(&run)?;
            let job_template: Option<JobTemplate> = template.as_deref().map(read_json::<JobTemplate>).transpose()?;

            if job_run.is_templated() && job_template.is_none() {
                diagnostics::warn(format!(
                    "run references job definition '{}' but no --template was given",
                    job_run.spec.template_ref
                ));
            }

            let view = AdmissionView::from_result(admission::admit_run(&job_run, job_template.as_ref(), &config));
            emit(&view, out.as_deref())?;
            if !view.admitted {
                bail!("{}", diagnostics::error_message(format!("run {} was rejected", run)));
            }
        }

        Commands::CheckTemplate { template, config } => {
            let config = load_config(config.as_deref())?;
            let job_template: JobTemplate = read_json(&template)?;

            let view = AdmissionView::from_result(admission::admit_template(&job_template, &config));
            emit(&view, None)?;
            if !view.admitted {
                bail!("{}", diagnostics::error_message(format!("template {} was rejected", template)));
            }
        }

        Commands::Status {
            run,
            observations,
            total,
            out,
        } => {
            if total < 0 {
                bail!("{}", diagnostics::error_message(format!("--total must not be negative, got {}", total)));
            }
            let mut job_run: JobRun = read_json(&run)?;
            let observations: Observations = read_json(&observations)?;

            if observations.len() as i64 > total {
                diagnostics::warn(format!(
                    "{} indices observed but only {} requested",
                    observations.len(),
                    total
                ));
            }

            job_run.aggregate_status(total, &observations);
            emit(&StatusView::from(&job_run), out.as_deref())?;
        }
    }

    Ok(())
}
