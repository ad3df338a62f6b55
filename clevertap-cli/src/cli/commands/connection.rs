//! Connection command handlers

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, Select};

use crate::api::models::Region;
use crate::workflow::{ConnectionDraft, ConnectionManager};

use super::{ConnectionCommands, Workbench};

pub async fn handle_connection_command(args: ConnectionCommands) -> Result<()> {
    let workbench = Workbench::from_config()?;
    let mut manager = workbench.connection_manager();

    match args {
        ConnectionCommands::List => {
            manager.load().await?;
            print_connections(&manager);
            Ok(())
        }
        ConnectionCommands::Create => {
            let mut draft = manager.open_create();
            prompt_draft(&mut draft, false)?;
            manager.save(&draft).await
        }
        ConnectionCommands::Edit { id } => {
            manager.load().await?;
            let mut draft = manager.open_edit(&id)?;
            prompt_draft(&mut draft, true)?;
            manager.save(&draft).await
        }
        ConnectionCommands::Delete { id, yes } => {
            manager.load().await?;
            let name = manager
                .connections()
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.clone());
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Are you sure you want to delete the connection \"{}\"?",
                        name
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
                if !confirmed {
                    println!("{}", "Deletion cancelled".dimmed());
                    return Ok(());
                }
            }
            manager.delete(&id).await
        }
        ConnectionCommands::Map { id } => {
            manager.load().await?;
            manager.navigate_to_mappings(&id)?;
            let mut list = workbench.sync_list();
            list.load().await?;
            super::sync::print_sync_rows(list.rows());
            Ok(())
        }
    }
}

fn print_connections(manager: &ConnectionManager) {
    if manager.connections().is_empty() {
        println!("{}", "No connections configured".dimmed());
        return;
    }
    println!(
        "{:<18} {:<24} {:<6} {:<20} {}",
        "ID".bold(),
        "NAME".bold(),
        "REGION".bold(),
        "ACCOUNT".bold(),
        "DEVELOPER NAME".bold()
    );
    for connection in manager.connections() {
        println!(
            "{:<18} {:<24} {:<6} {:<20} {}",
            connection.id,
            connection.name,
            connection.region.code(),
            connection.account_id,
            connection.developer_name
        );
    }
}

/// Interactive prompts for the connection form. When editing, current
/// values are offered as defaults and an empty passcode keeps the stored
/// one.
fn prompt_draft(draft: &mut ConnectionDraft, editing: bool) -> Result<()> {
    let mut name = Input::<String>::new().with_prompt("Connection name");
    if editing && !draft.name.is_empty() {
        name = name.default(draft.name.clone());
    }
    draft.name = name.interact_text().context("Failed to read name")?;

    let labels: Vec<&str> = Region::ALL.iter().map(|r| r.label()).collect();
    let preselected = draft
        .region
        .and_then(|current| Region::ALL.iter().position(|r| *r == current))
        .unwrap_or(0);
    let picked = Select::new()
        .with_prompt("Region")
        .items(&labels)
        .default(preselected)
        .interact()
        .context("Failed to read region")?;
    draft.region = Some(Region::ALL[picked]);

    let mut account = Input::<String>::new().with_prompt("CleverTap account ID");
    if editing && !draft.account_id.is_empty() {
        account = account.default(draft.account_id.clone());
    }
    draft.account_id = account
        .interact_text()
        .context("Failed to read account ID")?;

    let prompt = if editing {
        "CleverTap passcode (leave empty to keep current)"
    } else {
        "CleverTap passcode"
    };
    let passcode = rpassword::prompt_password(format!("{}: ", prompt))
        .context("Failed to read passcode")?;
    if !(editing && passcode.is_empty()) {
        draft.passcode = passcode;
    }

    Ok(())
}
