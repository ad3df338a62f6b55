//! Sync configuration command handlers
//!
//! `create` and `edit` drive the two-phase wizard interactively: basic
//! attributes first, then the field mapping phase under the identifier
//! the first phase produced.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, Select};

use crate::api::models::{ClevertapEntity, DataType, SalesforceEntity, SyncType};
use crate::workflow::{
    EditorMode, FieldMappingEditor, SortDirection, SortField, StatusAction,
    SyncConfigurationEditor, SyncRow,
};

use super::{SyncCommands, Workbench};

pub async fn handle_sync_command(args: SyncCommands) -> Result<()> {
    let workbench = Workbench::from_config()?;

    match args {
        SyncCommands::List { sort, direction } => {
            let mut list = workbench.sync_list();
            list.load().await?;
            if let Some(field) = sort {
                let field: SortField = field.parse()?;
                let direction: SortDirection = direction.parse()?;
                list.sort(field, direction);
            }
            print_sync_rows(list.rows());
            Ok(())
        }
        SyncCommands::Create => run_wizard(&workbench, EditorMode::New).await,
        SyncCommands::Edit { id } => {
            run_wizard(&workbench, EditorMode::Edit { record_id: id }).await
        }
        SyncCommands::Delete { id, yes } => {
            let mut list = workbench.sync_list();
            list.request_delete(&id);
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!(
                        "Are you sure you want to delete sync configuration {}?",
                        id
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
            if !confirmed {
                list.cancel_delete();
                println!("{}", "Deletion cancelled".dimmed());
                return Ok(());
            }
            list.confirm_delete().await
        }
        SyncCommands::Activate { id } => {
            let mut list = workbench.sync_list();
            list.set_status(&id, StatusAction::Activate).await
        }
        SyncCommands::Deactivate { id } => {
            let mut list = workbench.sync_list();
            list.set_status(&id, StatusAction::Deactivate).await
        }
    }
}

pub(crate) fn print_sync_rows(rows: &[SyncRow]) {
    if rows.is_empty() {
        println!("{}", "No sync configurations found".dimmed());
        return;
    }
    println!(
        "{:<10} {:<26} {:<26} {:<12} {:<10} {:<10} {}",
        "ID".bold(),
        "NAME".bold(),
        "TYPE".bold(),
        "SALESFORCE".bold(),
        "CLEVERTAP".bold(),
        "STATUS".bold(),
        "ACTIONS".bold()
    );
    for row in rows {
        let status = row
            .record
            .status
            .map(|s| s.to_string())
            .unwrap_or_default();
        let status = match row.status_class {
            "success" => status.green().to_string(),
            "muted" => status.dimmed().to_string(),
            "error" => status.red().to_string(),
            _ => status,
        };
        let actions: Vec<&str> = row.actions.iter().map(|a| a.label()).collect();
        println!(
            "{:<10} {:<26} {:<26} {:<12} {:<10} {:<10} {}",
            row.record.id,
            row.record.name,
            row.record.sync_type.label(),
            row.record.salesforce_entity.to_string(),
            row.record.clevertap_entity.label(),
            status,
            actions.join(", ").dimmed()
        );
    }
}

/// Drive both wizard phases interactively
async fn run_wizard(workbench: &Workbench, mode: EditorMode) -> Result<()> {
    let mut editor = SyncConfigurationEditor::new(
        Arc::clone(&workbench.gateway),
        Arc::clone(&workbench.notifier),
        Arc::clone(&workbench.navigator),
        mode,
    );
    editor.load_existing().await?;

    prompt_basic_attributes(&mut editor)?;
    let salesforce_entity = editor
        .draft()
        .salesforce_entity
        .expect("prompted above");
    let sync_id = editor.submit().await?;

    run_mapping_phase(workbench, sync_id, salesforce_entity).await?;
    editor.complete();
    Ok(())
}

fn prompt_basic_attributes(editor: &mut SyncConfigurationEditor) -> Result<()> {
    let draft = editor.draft().clone();

    let mut name = Input::<String>::new().with_prompt("Sync name");
    if !draft.name.is_empty() {
        name = name.default(draft.name.clone());
    }
    let name = name.interact_text().context("Failed to read sync name")?;

    let sync_types = [SyncType::SalesforceToClevertap];
    let labels: Vec<&str> = sync_types.iter().map(|t| t.label()).collect();
    let picked = Select::new()
        .with_prompt("Sync type")
        .items(&labels)
        .default(0)
        .interact()
        .context("Failed to read sync type")?;
    let sync_type = sync_types[picked];

    let labels: Vec<&str> = SalesforceEntity::ALL.iter().map(|e| e.object_name()).collect();
    let preselected = draft
        .salesforce_entity
        .and_then(|current| SalesforceEntity::ALL.iter().position(|e| *e == current))
        .unwrap_or(0);
    let picked = Select::new()
        .with_prompt("Salesforce entity")
        .items(&labels)
        .default(preselected)
        .interact()
        .context("Failed to read Salesforce entity")?;
    let salesforce_entity = SalesforceEntity::ALL[picked];

    let labels: Vec<&str> = ClevertapEntity::ALL.iter().map(|e| e.label()).collect();
    let preselected = draft
        .clevertap_entity
        .and_then(|current| ClevertapEntity::ALL.iter().position(|e| *e == current))
        .unwrap_or(0);
    let picked = Select::new()
        .with_prompt("CleverTap entity")
        .items(&labels)
        .default(preselected)
        .interact()
        .context("Failed to read CleverTap entity")?;
    let clevertap_entity = ClevertapEntity::ALL[picked];

    let draft = editor.draft_mut();
    draft.name = name;
    draft.sync_type = Some(sync_type);
    draft.salesforce_entity = Some(salesforce_entity);
    draft.clevertap_entity = Some(clevertap_entity);
    Ok(())
}

async fn run_mapping_phase(
    workbench: &Workbench,
    sync_id: String,
    salesforce_entity: SalesforceEntity,
) -> Result<()> {
    let mut editor = FieldMappingEditor::new(
        Arc::clone(&workbench.gateway),
        Arc::clone(&workbench.notifier),
        Arc::clone(&workbench.navigator),
        sync_id,
        salesforce_entity,
    );
    editor.initialize().await;

    let fields = editor.salesforce_fields().to_vec();
    if fields.is_empty() {
        anyhow::bail!(
            "No Salesforce fields available for {}; cannot define mappings",
            salesforce_entity
        );
    }
    let field_labels: Vec<String> = fields
        .iter()
        .map(|f| format!("{} ({})", f.label, f.value))
        .collect();

    let preselected = fields
        .iter()
        .position(|f| f.value == editor.mandatory_source())
        .unwrap_or(0);
    let picked = Select::new()
        .with_prompt("Salesforce field for the mandatory customer_id mapping")
        .items(&field_labels)
        .default(preselected)
        .interact()
        .context("Failed to read mandatory field")?;
    editor.set_mandatory_source(&fields[picked].value);

    if !editor.rows().is_empty() {
        println!(
            "{} additional mapping(s) loaded from the existing configuration",
            editor.rows().len()
        );
        let clear = Confirm::new()
            .with_prompt("Discard the loaded additional mappings?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if clear {
            while !editor.rows().is_empty() {
                editor.remove_row(0);
            }
        }
    }

    loop {
        let more = Confirm::new()
            .with_prompt("Add a field mapping?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !more {
            break;
        }

        let clevertap_field: String = Input::new()
            .with_prompt("CleverTap field name")
            .interact_text()
            .context("Failed to read CleverTap field")?;
        let picked = Select::new()
            .with_prompt("Salesforce field")
            .items(&field_labels)
            .default(0)
            .interact()
            .context("Failed to read Salesforce field")?;

        let options = editor.data_type_options().to_vec();
        let option_labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        let data_type_idx = Select::new()
            .with_prompt("Data type")
            .items(&option_labels)
            .default(0)
            .interact()
            .context("Failed to read data type")?;
        let data_type = options[data_type_idx]
            .value
            .parse::<DataType>()
            .unwrap_or_default();

        let index = editor.add_row();
        let row = &mut editor.rows_mut()[index];
        row.clevertap_field = clevertap_field;
        row.salesforce_field = fields[picked].value.clone();
        row.data_type = data_type;
    }

    editor.save().await
}
