use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::audit::Findings;
use crate::config::{Config, OutputFormat};
use crate::output::{self, PhaseProgress};
use crate::save::save_job_configs;
use crate::server::{AuditResult, FetchOrchestrator, HttpTransport, JenkinsClient};

#[derive(Parser)]
#[command(name = "ci-audit")]
#[command(author, version, about = "Jenkins job inventory audit", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./ci-audit.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Args)]
struct ServerArgs {
    /// Jenkins base URL, ending in '/'
    #[arg(short, long, env = "CI_AUDIT_URL")]
    url: Option<String>,

    /// Concurrent job fetchers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report stale, never-run, never-passed, and unassigned jobs
    Audit {
        #[command(flatten)]
        server: ServerArgs,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Also print the job health table
        #[arg(long, default_value_t = false)]
        health: bool,

        /// Days without a build before a job counts as stale
        #[arg(long)]
        stale_days: Option<i64>,
    },
    /// Download every job's config.xml into one folder per view
    SaveJobs {
        #[command(flatten)]
        server: ServerArgs,

        /// Target folder
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Layers command-line values over the loaded configuration.
    fn apply_overrides(&self, config: &mut Config) {
        let server = match &self.command {
            Commands::Audit {
                server,
                format,
                health,
                stale_days,
            } => {
                if let Some(format) = format {
                    config.output.format = *format;
                }
                if let Some(days) = stale_days {
                    config.audit.stale_after_days = *days;
                }
                config.output.health |= *health;
                server
            }
            Commands::SaveJobs { server, dir } => {
                if let Some(dir) = dir {
                    config.output.jobs_dir.clone_from(dir);
                }
                server
            }
        };

        if let Some(url) = &server.url {
            config.server.url = Some(url.clone());
        }
        if let Some(workers) = server.workers {
            config.fetch.workers = workers;
        }
        if let Some(timeout) = server.timeout {
            config.server.timeout_secs = timeout;
        }
        config.output.pretty |= self.pretty;
    }

    /// Runs the three fetch phases against the server.
    async fn gather(
        client: &JenkinsClient,
        url: &str,
        config: &Config,
    ) -> Result<(AuditResult, usize)> {
        let orchestrator = FetchOrchestrator::new(
            client.clone(),
            config.fetch.workers,
            config.fetch.queue_factor,
        );

        let progress = PhaseProgress::start_phase_1();
        let mut result = orchestrator
            .fetch_root(url)
            .await
            .with_context(|| format!("Failed to list jobs and views of {url}"))?;

        let progress = progress.finish_phase_1_start_phase_2(result.jobs.len());
        let skipped = orchestrator
            .enrich_jobs(&mut result.jobs, progress.bar())
            .await?;

        let progress = progress.finish_phase_2_start_phase_3(skipped);
        orchestrator
            .enrich_views(&mut result.views)
            .await
            .context("Failed to fetch view membership")?;
        progress.finish_phase_3();

        Ok((result, skipped))
    }

    fn execute_audit(
        &self,
        url: &str,
        config: &Config,
        result: &AuditResult,
        skipped: usize,
    ) -> Result<()> {
        let stale_after = config.audit.stale_after()?;
        let findings = Findings::collect(result, Utc::now(), stale_after);

        info!(
            "Findings: {} outside views, {} never run, {} never passed, {} stale",
            findings.outside_views.len(),
            findings.never_run.len(),
            findings.never_passed.len(),
            findings.stale.len()
        );

        if config.output.format == OutputFormat::Summary {
            output::print_summary(url, result, &findings, skipped);
            if config.output.health {
                output::print_health_table(result);
            }
            return Ok(());
        }

        if let Some(output_path) = &self.output {
            let mut file = std::fs::File::create(output_path)
                .with_context(|| format!("Failed to create {}", output_path.display()))?;
            output::export_findings(&findings, config.output.format, config.output.pretty, &mut file)?;
            info!("Findings written to: {}", output_path.display());
        } else {
            let mut stdout = std::io::stdout().lock();
            output::export_findings(&findings, config.output.format, config.output.pretty, &mut stdout)?;
        }

        Ok(())
    }

    async fn execute_save(
        client: &JenkinsClient,
        config: &Config,
        result: &AuditResult,
    ) -> Result<()> {
        let dir = &config.output.jobs_dir;
        info!("Saving job configurations under {}", dir.display());

        let summary = save_job_configs(client, result, dir).await;

        if summary.failed > 0 {
            warn!("{} job configurations could not be saved", summary.failed);
        }
        eprintln!(
            "Saved {} job configurations to {} ({} failed)",
            summary.saved,
            dir.display(),
            summary.failed
        );

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        config.validate()?;

        let url = config
            .server
            .url
            .clone()
            .context("No server URL given; pass --url or set server.url in the config file")?;

        let transport = HttpTransport::new(Duration::from_secs(config.server.timeout_secs))?;
        let client = JenkinsClient::new(Arc::new(transport));

        info!("Auditing Jenkins server: {url}");
        let (result, skipped) = Self::gather(&client, &url, &config).await?;

        match &self.command {
            Commands::Audit { .. } => self.execute_audit(&url, &config, &result, skipped),
            Commands::SaveJobs { .. } => Self::execute_save(&client, &config, &result).await,
        }
    }
}
