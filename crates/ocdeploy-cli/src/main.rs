use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ocdeploy",
    about = "ocdeploy — template-driven OpenShift deployment releases",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the deployment template, update the deployment config and
    /// wait for the rollout to finish.
    Release {
        #[command(flatten)]
        target: TargetArgs,
        /// Override the target project
        #[arg(long)]
        project: Option<String>,
        /// Override the target service (deployment config name)
        #[arg(long)]
        service: Option<String>,
    },
    /// Render the deployment template from a local checkout and print it.
    ///
    /// Touches neither git nor the cluster.
    Render {
        #[command(flatten)]
        target: TargetArgs,
        /// Local checkout of the release repository
        #[arg(long)]
        checkout: PathBuf,
        /// Output format: yaml or json
        #[arg(short, long, default_value = "yaml", value_parser = ["yaml", "json"])]
        format: String,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Path to ocdeploy.toml
    #[arg(short, long, default_value = "ocdeploy.toml")]
    config: PathBuf,
    /// Override the environment (selects vars/<environment>.yaml)
    #[arg(short, long)]
    environment: Option<String>,
    /// Override the directory holding the deployment files
    #[arg(short, long)]
    directory: Option<String>,
    /// Template variable, `key=value`. Repeatable.
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,
}

fn init_logging(json: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("ocdeploy=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.log_json) {
        eprintln!("failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Release {
            target,
            project,
            service,
        } => commands::release::run(target.into_request(project, service)).await,
        Commands::Render {
            target,
            checkout,
            format,
        } => commands::render::run(target.into_request(None, None), &checkout, &format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(commands::exit_code(&e))
        }
    }
}

impl TargetArgs {
    fn into_request(self, project: Option<String>, service: Option<String>) -> commands::Request {
        commands::Request {
            config: self.config,
            overrides: ocdeploy_core::config::TargetOverrides {
                project,
                service,
                environment: self.environment,
                directory: self.directory,
            },
            options: self.options,
        }
    }
}
