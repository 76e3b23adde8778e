use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hd_naumen::api::{ServiceCallId, TaskId};
use hd_naumen::config::Config;
use hd_naumen::logging;
use hd_naumen::workflow::{self, WorkflowOptions};

#[derive(Parser)]
#[command(name = "hd-naumen")]
#[command(about = "Resolve, claim and close Naumen service calls")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a task identifier to its service call
    Resolve {
        /// External task identifier
        task: String,
    },

    /// Show the service call, title (RP) and summary of a task
    Details {
        /// External task identifier
        task: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Take responsibility for a service call
    Claim {
        /// Service call identifier (e.g. serviceCall$1234567)
        service_call: String,
    },

    /// Attach files and set a service call to awaiting acceptance
    Close {
        /// Service call identifier (e.g. serviceCall$1234567)
        service_call: String,

        /// Files to attach
        files: Vec<PathBuf>,
    },

    /// Fetch details, claim and close the service call of a task
    Run {
        /// External task identifier
        task: String,

        /// Files to attach
        files: Vec<PathBuf>,

        /// Skip taking responsibility (ticket already owned)
        #[arg(long)]
        no_claim: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;
    let _logging_handle = logging::init_logging(&config, cli.debug)?;

    let client = config.backend.client()?;

    match cli.command {
        Commands::Resolve { task } => {
            let service_call = client.resolve_service_call(&TaskId::new(task))?;
            println!("{}", service_call);
        }
        Commands::Details { task, json } => {
            let details = client.fetch_details(&TaskId::new(task))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                println!("Service call: {}", details.service_call);
                println!("RP:           {}", details.title);
                println!("Summary:      {}", details.summary);
            }
        }
        Commands::Claim { service_call } => {
            let service_call = ServiceCallId::new(service_call)?;
            client.take_responsibility(&service_call)?;
            println!("Took responsibility for {}", service_call);
        }
        Commands::Close {
            service_call,
            files,
        } => {
            let service_call = ServiceCallId::new(service_call)?;
            let attachments = client.submit_closure(&service_call, &files)?;
            println!(
                "{} is awaiting acceptance ({} attachments)",
                service_call,
                attachments.len()
            );
        }
        Commands::Run {
            task,
            files,
            no_claim,
            json,
        } => {
            let options = WorkflowOptions { claim: !no_claim };
            let report = workflow::close_task(&client, &TaskId::new(task.clone()), &files, &options)
                .with_context(|| format!("Failed to close task {}", task))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Service call: {}", report.details.service_call);
                println!("RP:           {}", report.details.title);
                println!("Summary:      {}", report.details.summary);
                for attachment in &report.attachments {
                    println!("Attached:     {} ({} bytes)", attachment.file_name, attachment.size);
                }
                println!("State:        {}", report.state);
            }
        }
    }

    Ok(())
}
