//! DynamoDB infrastructure management commands.

mod client;
mod config;
mod deploy;
mod error;
mod load;
mod planning;

use error::{DynamodbError, Result};

use crate::prelude::*;
use config::TableKind;
use dialoguer::Confirm;
use std::path::PathBuf;

/// DynamoDB infrastructure management commands.
#[derive(Debug, clap::Parser)]
pub struct DynamodbCommand {
    #[command(subcommand)]
    pub action: DynamodbAction,
}

/// Available DynamoDB actions.
#[derive(Debug, clap::Subcommand)]
pub enum DynamodbAction {
    /// Deploy or destroy the gridload tables.
    Deploy(DeployCommand),

    /// Load a fixture file into one table.
    Load(LoadCommand),
}

/// Deploy or destroy DynamoDB infrastructure.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Deploy or destroy DynamoDB table infrastructure.

By default, this command creates any missing gridload table (Movies,
ReferenceZones, TotalLoadData, ResolutionCodes) with its key schema.

The command shows a plan of changes before applying and asks for confirmation.

Environment variables:
  AWS_ENDPOINT_URL    - Use local DynamoDB (e.g., http://localhost:8000)
  AWS_REGION          - AWS region (defaults to eu-west-3)
  AWS_PROFILE         - AWS profile to use for credentials
  MOVIES_TABLE, REFERENCE_ZONES_TABLE, TOTAL_LOAD_TABLE, RESOLUTION_CODES_TABLE
                      - Table name overrides")]
pub struct DeployCommand {
    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,

    /// Destroy the tables instead of creating them.
    #[arg(long)]
    pub destroy: bool,
}

/// Load fixture records into a table.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Load a JSON fixture file into one gridload table.

Fixture layout per table:
  movies            - a bare array of movie records
  reference-zones   - {\"entsoeAreaRef\": [...]}
  total-load        - {\"data\": [...]}
  resolution-codes  - {\"ResolutionCode\": [...]}

Zone records without an Id_CountryFK get one derived from Id and Country_FK.")]
pub struct LoadCommand {
    /// Table to load.
    #[arg(long, value_enum)]
    pub table: TableKind,

    /// Fixture JSON file.
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,
}

/// Main entry point for dynamodb command.
pub async fn run(command: DynamodbCommand, global: crate::Global) -> Result<()> {
    match command.action {
        DynamodbAction::Deploy(deploy_cmd) => run_deploy(deploy_cmd, &global).await,
        DynamodbAction::Load(load_cmd) => run_load(load_cmd, &global).await,
    }
}

fn confirm(prompt: &str, default: bool) -> Result<()> {
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| DynamodbError::AwsSdk(e.to_string()))?;

    if confirmed {
        Ok(())
    } else {
        Err(DynamodbError::UserCancelled)
    }
}

async fn run_deploy(cmd: DeployCommand, global: &crate::Global) -> Result<()> {
    let aws_config = client::AwsConfig::default();

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), aws_config.target_display());
        aprintln!();
    }

    let dynamo_client = client::create_client(&aws_config).await?;

    let mut current_states = Vec::with_capacity(TableKind::ALL.len());
    for kind in TableKind::ALL {
        let table_name = kind.table_name();
        let state = client::get_table_state(&dynamo_client, &table_name).await?;
        current_states.push((kind, table_name, state));
    }

    if cmd.destroy {
        // Destroy flow
        let plans: Vec<_> = current_states
            .iter()
            .map(|(_, name, state)| planning::calculate_destroy_plan(state.as_ref(), name))
            .collect();

        if !global.is_silent() {
            aprintln!("{}", p_y("Destroy Plan:"));
            for plan in &plans {
                for line in planning::format_destroy_plan(plan) {
                    aprintln!("  {}", p_r(&line));
                }
            }
            aprintln!();
        }

        if plans.iter().all(|plan| plan.is_noop()) {
            if !global.is_silent() {
                aprintln!("{}", p_g("Nothing to destroy."));
            }
            return Ok(());
        }

        if !cmd.force {
            confirm(
                "Are you sure you want to delete these tables? ALL DATA WILL BE LOST",
                false,
            )?;
        }

        if !global.is_silent() {
            aprintln!("{}", p_b("Deleting tables..."));
        }

        for plan in &plans {
            deploy::execute_destroy_plan(&dynamo_client, plan).await?;
        }

        if !global.is_silent() {
            aprintln!("{}", p_g("Tables destroyed successfully."));
        }
    } else {
        // Deploy flow
        let plans: Vec<_> = current_states
            .iter()
            .map(|(kind, name, state)| {
                planning::calculate_deploy_plan(state.as_ref(), &kind.table_config(name))
            })
            .collect();

        if !global.is_silent() {
            aprintln!("{}", p_c("Deploy Plan:"));
            for plan in &plans {
                for line in planning::format_deploy_plan(plan) {
                    if line.starts_with('+') {
                        aprintln!("  {}", p_g(&line));
                    } else {
                        aprintln!("  {}", line);
                    }
                }
            }
            aprintln!();
        }

        if plans.iter().all(|plan| plan.is_noop()) {
            if !global.is_silent() {
                aprintln!("{}", p_g("Infrastructure is up to date."));
            }
            return Ok(());
        }

        if !cmd.force {
            confirm("Apply these changes?", true)?;
        }

        if !global.is_silent() {
            aprintln!("{}", p_b("Applying changes..."));
        }

        for plan in &plans {
            deploy::execute_deploy_plan(&dynamo_client, plan).await?;
        }

        if !global.is_silent() {
            aprintln!("{}", p_g("Infrastructure deployed successfully."));
        }
    }

    Ok(())
}

async fn run_load(cmd: LoadCommand, global: &crate::Global) -> Result<()> {
    let aws_config = client::AwsConfig::default();
    let table_name = cmd.table.table_name();

    let contents = tokio::fs::read_to_string(&cmd.file).await?;
    let items = load::parse_fixture(cmd.table, &contents)?;

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), aws_config.target_display());
        aprintln!("{} {}", p_b("Table:"), table_name);
        aprintln!("{} {}", p_b("Fixture:"), cmd.file.display());
        aprintln!("{} {}", p_b("Records:"), items.len());
        aprintln!();
    }

    let dynamo_client = client::create_client(&aws_config).await?;

    // Verify table exists
    let table_state = client::get_table_state(&dynamo_client, &table_name).await?;
    if table_state.is_none() {
        return Err(DynamodbError::TableNotFound { table_name });
    }

    if !cmd.force {
        confirm(&format!("Write {} records?", items.len()), true)?;
    }

    let written = load::write_items(&dynamo_client, &table_name, items).await?;

    if !global.is_silent() {
        aprintln!("{} {} records written.", p_g("Success:"), written);
    }

    Ok(())
}
