// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Command-line interface for the rebadge binary.
//!
//! The CLI exposes a `publish` subcommand running the full pipeline plus
//! diagnostic subcommands that exercise the classifier and the renderers
//! without touching any repository.

use std::{fs, path::PathBuf, process};

use clap::{Args, Parser, Subcommand};
use rebadge::{
    BadgeSpec, BadgeStyle, Error, GithubMetadataSource, LicenseCategory, LicenseClassifier,
    PublishArgs, PublishConfig, PublishPipeline, artifact_io_error, badge_url, render_svg,
    renderer_for
};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Command line interface for classifying repository metadata and
/// publishing status badges.
#[derive(Debug, Parser)]
#[command(name = "rebadge", version, about = "Classify repository metadata and publish status badges")]
struct Cli {
    #[command(subcommand)]
    command: Command
}

/// Supported commands exposed by the CLI.
#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch metadata, render badges, and publish them to the repository.
    Publish(PublishArgs),
    /// Classify a license identifier and print its category.
    Classify(ClassifyArgs),
    /// Render a one-off badge without touching any repository.
    Badge(BadgeArgs)
}

/// Arguments accepted by the `classify` subcommand.
#[derive(Debug, Args)]
struct ClassifyArgs {
    /// SPDX identifier or alias; omit to classify "no license".
    #[arg(long = "license", value_name = "IDENTIFIER")]
    license: Option<String>
}

#[derive(Debug, Args)]
struct BadgeArgs {
    #[command(subcommand)]
    command: BadgeCommand
}

#[derive(Debug, Subcommand)]
enum BadgeCommand {
    /// Print the badge-service URL for the given fields.
    Url(BadgeFieldArgs),
    /// Render the badge locally and print (or write) the SVG markup.
    Svg(BadgeFieldArgs)
}

/// Badge fields shared by the `badge url` and `badge svg` subcommands.
#[derive(Debug, Args)]
struct BadgeFieldArgs {
    /// Left-hand label text.
    #[arg(long, value_name = "TEXT")]
    label: String,

    /// Right-hand message text.
    #[arg(long, value_name = "TEXT")]
    message: String,

    /// Message color token (CSS color name or hex).
    #[arg(long, default_value = "lightgrey", value_name = "COLOR")]
    color: String,

    /// Label color token.
    #[arg(long, default_value = "#555", value_name = "COLOR")]
    label_color: String,

    /// Visual style preset.
    #[arg(long, default_value = "flat", value_name = "STYLE")]
    style: BadgeStyle,

    /// Logo name understood by the badge service.
    #[arg(long, value_name = "NAME")]
    logo: Option<String>,

    /// Logo color token.
    #[arg(long, value_name = "COLOR")]
    logo_color: Option<String>,

    /// Write the output here instead of stdout.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>
}

impl BadgeFieldArgs {
    fn to_spec(&self) -> BadgeSpec {
        BadgeSpec {
            label:         self.label.clone(),
            message:       self.message.clone(),
            label_color:   self.label_color.clone(),
            message_color: self.color.clone(),
            style:         self.style,
            logo:          self.logo.clone(),
            logo_color:    self.logo_color.clone()
        }
    }
}

#[derive(Debug, Serialize)]
struct ClassifyReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    category:   LicenseCategory
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(error) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors originating from configuration validation and the
/// publish pipeline.
async fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Command::Publish(args) => run_publish(args).await,
        Command::Classify(args) => run_classify(args),
        Command::Badge(args) => run_badge(args)
    }
}

async fn run_publish(args: PublishArgs) -> Result<(), Error> {
    let config = PublishConfig::from_args(args)?;

    let metadata = GithubMetadataSource::new(
        config.token.expose(),
        &config.owner,
        &config.repository,
        config.network_timeout
    )?;
    let renderer = renderer_for(config.render_mode, config.network_timeout)?;

    let mut pipeline = PublishPipeline::new(config, Box::new(metadata), renderer);
    let report = pipeline.run().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<(), Error> {
    let classifier = LicenseClassifier::new();
    let category = classifier.classify(args.license.as_deref());

    let report = ClassifyReport {
        identifier: args.license,
        category:   *category
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_badge(args: BadgeArgs) -> Result<(), Error> {
    match args.command {
        BadgeCommand::Url(fields) => emit(&badge_url(&fields.to_spec()), fields.output.as_deref()),
        BadgeCommand::Svg(fields) => emit(&render_svg(&fields.to_spec()), fields.output.as_deref())
    }
}

fn emit(content: &str, output: Option<&std::path::Path>) -> Result<(), Error> {
    match output {
        Some(path) => {
            fs::write(path, content).map_err(|source| artifact_io_error(path, source))
        }
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
