use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use seqmerge_core::{diff, merge, Diff, MergeConfig, Side, TracingSink};

mod logging;
mod render;
mod settings;
mod tokenize;

use logging::init_logging;
use settings::Settings;
use tokenize::{join, tokenize, TokenMode};

#[derive(Parser)]
#[command(
    name = "seqmerge",
    about = "Diff, patch and three-way merge text by lines, words or characters"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a settings.json file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How to split text into elements (overrides settings)
    #[arg(long, global = true, value_enum)]
    mode: Option<TokenMode>,

    /// Also write logs to seqmerge.log in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the differences between two files
    Diff {
        previous: PathBuf,
        next: PathBuf,
        /// Print the edit script as JSON instead of a unified diff
        #[arg(long)]
        json: bool,
        /// Lines of context around each hunk
        #[arg(long, default_value_t = 3)]
        context: usize,
    },
    /// Apply a JSON edit script to a file
    Patch {
        previous: PathBuf,
        /// Edit script produced by `seqmerge diff --json`
        diff: PathBuf,
    },
    /// Three-way merge two descendants of a common ancestor
    Merge {
        previous: PathBuf,
        current: PathBuf,
        next: PathBuf,
        /// Print conflict marker blocks instead of the resolved text
        #[arg(long)]
        markers: bool,
        /// Resolve every conflict to this side
        #[arg(long, value_enum)]
        fallback: Option<FallbackArg>,
    },
    /// Write default settings to a file
    InitConfig { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum FallbackArg {
    Previous,
    Current,
    Next,
}

impl From<FallbackArg> for Side {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Previous => Side::Previous,
            FallbackArg::Current => Side::Current,
            FallbackArg::Next => Side::Next,
        }
    }
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(mode) = cli.mode {
        settings.tokenizer.mode = mode;
    }
    if let Some(dir) = &cli.log_dir {
        settings.logging.dir = Some(dir.clone());
    }
    Ok(settings)
}

fn read_tokens(path: &Path, mode: TokenMode) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(tokenize(&text, mode))
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let _guard = init_logging(settings.logging.dir.as_deref(), &settings.logging.filter)?;

    match &cli.command {
        Commands::Diff {
            previous,
            next,
            json,
            context,
        } => cmd_diff(&settings, previous, next, *json, *context),
        Commands::Patch { previous, diff } => cmd_patch(&settings, previous, diff),
        Commands::Merge {
            previous,
            current,
            next,
            markers,
            fallback,
        } => {
            let mut config = settings.merge.clone();
            if let Some(side) = fallback {
                config.fallback_on_conflict = Some((*side).into());
            }
            cmd_merge(&settings, &config, [previous, current, next], *markers)
        }
        Commands::InitConfig { path } => {
            Settings::default()
                .save(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote default settings to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn cmd_diff(
    settings: &Settings,
    previous_path: &Path,
    next_path: &Path,
    json: bool,
    context: usize,
) -> anyhow::Result<ExitCode> {
    let mode = settings.tokenizer.mode;
    let previous = read_tokens(previous_path, mode)?;
    let next = read_tokens(next_path, mode)?;
    let d = diff(&previous, &next);

    let stats = d.stats();
    tracing::debug!(
        chunks = d.len(),
        unchanged = stats.unchanged,
        inserted = stats.inserted,
        deleted = stats.deleted,
        "Computed diff"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&d)?);
    } else {
        let labels = (
            previous_path.display().to_string(),
            next_path.display().to_string(),
        );
        print!(
            "{}",
            render::unified(&previous, &d, (&labels.0, &labels.1), context, mode)
        );
    }

    Ok(if d.is_identity() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn cmd_patch(settings: &Settings, previous_path: &Path, diff_path: &Path) -> anyhow::Result<ExitCode> {
    let previous = read_tokens(previous_path, settings.tokenizer.mode)?;
    let content = std::fs::read_to_string(diff_path)
        .with_context(|| format!("failed to read {}", diff_path.display()))?;
    let d: Diff<String> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid edit script", diff_path.display()))?;

    let patched = d
        .apply(&previous)
        .with_context(|| format!("edit script does not fit {}", previous_path.display()))?;
    print!("{}", join(&patched));
    Ok(ExitCode::SUCCESS)
}

fn cmd_merge(
    settings: &Settings,
    config: &MergeConfig,
    paths: [&PathBuf; 3],
    markers: bool,
) -> anyhow::Result<ExitCode> {
    let mode = settings.tokenizer.mode;
    let [previous, current, next] = [
        read_tokens(paths[0], mode)?,
        read_tokens(paths[1], mode)?,
        read_tokens(paths[2], mode)?,
    ];

    let result = merge(&previous, &current, &next, Some(config));
    result.log().replay(&TracingSink);
    tracing::info!(
        conflicts = result.conflicts().len(),
        elements = result.merged().len(),
        "Merge finished"
    );

    if markers {
        print!("{}", render::with_markers(&result));
    } else {
        print!("{}", join(result.merged()));
    }

    Ok(if result.has_conflicts() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
