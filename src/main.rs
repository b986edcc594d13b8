use anyhow::{bail, Context, Result};
use assetline::{
    sanitize_all, ActionExecutor, BuildConfig, RunOverrides, SanitizeOptions, Scheduler,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "assetline", version, about = "Front-end build pipeline runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inline sources into source maps and make their paths portable
    Sanitize {
        /// Source map files to rewrite in place
        #[arg(required = true)]
        maps: Vec<PathBuf>,

        /// Directory the rewritten source paths are relative to
        #[arg(long)]
        base: PathBuf,

        /// Value written as `sourceRoot` (default: /)
        #[arg(long)]
        source_root: Option<String>,

        /// Value written as `file` (default: map name without .map)
        #[arg(long)]
        file: Option<String>,

        /// Leave maps that already carry inline sources and the requested root
        #[arg(long)]
        skip_sanitized: bool,
    },

    /// Run pipeline stages and everything they depend on
    Run {
        /// Stages to run (default: the configured default targets, else all)
        stages: Vec<String>,

        /// Configuration file (default: nearest assetline.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Record failing tools instead of stopping the run
        #[arg(long)]
        keep_going: bool,

        /// Maximum number of stages running at once
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Write a JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show the order stages would run in
    Plan {
        stages: Vec<String>,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sanitize {
            maps,
            base,
            source_root,
            file,
            skip_sanitized,
        } => {
            if file.is_some() && maps.len() > 1 {
                bail!("--file can only be used with a single source map");
            }

            let start = Instant::now();
            let options = SanitizeOptions {
                base,
                source_root,
                file,
                skip_sanitized,
            };
            let outcomes = sanitize_all(&maps, &options)?;

            for outcome in &outcomes {
                let state = if outcome.skipped { "unchanged" } else { "sanitized" };
                println!(
                    "{}  {} ({}, {} sources)",
                    outcome.digest,
                    outcome.map_path.display(),
                    state,
                    outcome.sources.len()
                );
            }
            eprintln!(
                "[sourcemap] {} maps [{:.2}s]",
                outcomes.len(),
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Run {
            stages,
            config,
            keep_going,
            jobs,
            report,
        } => {
            let config = load_config(config)?;
            let pipeline = config.pipeline()?;
            let targets = targets_or_default(stages, &config);
            let plan = pipeline.plan(&targets)?;

            let ctx = config.run_context(&RunOverrides { jobs, keep_going });
            let executor = ActionExecutor::new(config.hooks()?);
            let run = Scheduler::new(ctx.jobs).run(&pipeline, &plan, &ctx, &executor)?;

            for line in run.summary() {
                println!("{}", line);
            }
            if let Some(path) = report {
                run.write_to_file(&path)?;
            }

            if let Some(failed) = run.failed_stage() {
                bail!("Stage '{}' failed", failed.name);
            }
        }

        Commands::Plan { stages, config } => {
            let config = load_config(config)?;
            let pipeline = config.pipeline()?;
            let targets = targets_or_default(stages, &config);
            let plan = pipeline.plan(&targets)?;

            for (i, layer) in plan.layers().iter().enumerate() {
                let described: Vec<String> = layer
                    .iter()
                    .filter_map(|name| pipeline.stage(name))
                    .map(|stage| format!("{} ({})", stage.name, stage.action.kind()))
                    .collect();
                println!("{}. {}", i + 1, described.join(", "));
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<BuildConfig> {
    match path {
        Some(path) => BuildConfig::load(&path),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            BuildConfig::discover(&cwd)
        }
    }
}

fn targets_or_default(stages: Vec<String>, config: &BuildConfig) -> Vec<String> {
    if stages.is_empty() {
        config.default_targets().to_vec()
    } else {
        stages
    }
}
