mod cli;
mod prompts;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use datareq_core::{
    preferences_path, ApiClient, FilterCriteria, FormController, FormError, Preferences,
    RecordSet, RequirementApi, RequirementRecord, SchemaRegistry, SubmitError, SubmitOutcome,
    Summary, Theme, Workflow, ALL_ROLE,
};

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let prefs_path = preferences_path()?;
    let prefs = Preferences::load(&prefs_path)?;
    let api_url = cli.api_url.clone().unwrap_or_else(|| prefs.api_url.clone());

    let registry = SchemaRegistry::standard();

    match &cli.command {
        Command::Submit { set, interactive } => {
            let client = ApiClient::new(&api_url)?;
            submit_requirement(&registry, &client, cli.role.as_deref(), set, *interactive)?;
        }
        Command::List {
            attribute,
            steward,
            datamart,
            all,
        } => {
            let client = ApiClient::new(&api_url)?;
            let criteria = FilterCriteria {
                attribute: attribute.clone().unwrap_or_default(),
                steward: steward.clone().unwrap_or_default(),
                datamart: datamart.clone().unwrap_or_default(),
                show_all: *all,
            };
            list_requirements(&client, &criteria)?;
        }
        Command::Show { id } => {
            let client = ApiClient::new(&api_url)?;
            show_requirement(&registry, &client, *id)?;
        }
        Command::Edit { id, set } => {
            let client = ApiClient::new(&api_url)?;
            edit_requirement(&registry, &client, cli.role.as_deref(), *id, set)?;
        }
        Command::Del { id, yes } => {
            let client = ApiClient::new(&api_url)?;
            delete_requirement(&client, *id, *yes)?;
        }
        Command::Stats => {
            let client = ApiClient::new(&api_url)?;
            show_stats(&client)?;
        }
        Command::Fields { role } => {
            let role = role.as_deref().or(cli.role.as_deref()).unwrap_or(ALL_ROLE);
            list_fields(&registry, role);
        }
        Command::Theme { value } => {
            handle_theme(&prefs_path, prefs, value.as_deref())?;
        }
    }

    Ok(())
}

/// Applies FIELD=VALUE pairs from the command line to the form
fn apply_set_pairs(
    registry: &SchemaRegistry,
    form: &mut FormController,
    pairs: &[String],
) -> Result<()> {
    for pair in pairs {
        let (field, value) = pair
            .split_once('=')
            .with_context(|| format!("Expected FIELD=VALUE, got '{}'", pair))?;
        form.set_field(registry, field, value)
            .with_context(|| format!("Cannot set '{}'", field))?;
    }
    Ok(())
}

fn report_submit_error(err: SubmitError) -> Result<()> {
    match err {
        SubmitError::Form(FormError::Validation { missing }) => {
            eprintln!("{}", "Missing required fields:".red().bold());
            for id in missing {
                eprintln!("  - {}", id.red());
            }
            anyhow::bail!("Validation failed, nothing was submitted");
        }
        other => Err(other.into()),
    }
}

/// Explicit `--role` wins; interactive runs without one prompt for it
fn resolve_role(
    registry: &SchemaRegistry,
    role: Option<&str>,
    interactive: bool,
) -> Result<String> {
    match role {
        Some(role) => Ok(role.to_string()),
        None if interactive => prompts::prompt_select_role(registry),
        None => Ok(ALL_ROLE.to_string()),
    }
}

fn submit_requirement(
    registry: &SchemaRegistry,
    client: &ApiClient,
    role: Option<&str>,
    set: &[String],
    interactive: bool,
) -> Result<()> {
    let interactive = interactive || set.is_empty();
    let role = resolve_role(registry, role, interactive)?;

    let mut form = FormController::new(registry);
    apply_set_pairs(registry, &mut form, set)?;

    if interactive {
        prompts::prompt_form(registry, &role, &mut form)?;
    }

    match form.submit(registry, &role, client) {
        Ok(SubmitOutcome::Created(rec)) => {
            println!(
                "{} requirement {} ({})",
                "Created".green().bold(),
                rec.id,
                rec.value("attribute")
            );
            Ok(())
        }
        Ok(SubmitOutcome::Updated(_)) => unreachable!("fresh form has no edit session"),
        Err(err) => report_submit_error(err),
    }
}

fn fetch_record(client: &ApiClient, id: i64) -> Result<RequirementRecord> {
    let records = client.fetch()?;
    records
        .into_iter()
        .find(|r| r.id == id)
        .with_context(|| format!("Requirement {} not found", id))
}

fn list_requirements(client: &ApiClient, criteria: &FilterCriteria) -> Result<()> {
    let records = client.fetch()?;
    let view = criteria.apply(&records);

    if view.is_empty() {
        println!("{}", "No requirements match".dimmed());
        return Ok(());
    }

    if criteria.is_default_view() {
        println!("{}", "Latest requirement (use --all for the full list):".bold());
    } else {
        println!("{}", format!("{} requirement(s):", view.len()).bold());
    }

    for rec in view {
        let attribute = rec.value("attribute");
        let steward = rec.value("data_steward");
        let datamart = rec.value("target_datamart");
        println!(
            "{:>5}  {}  {} {} {}",
            rec.id.to_string().cyan(),
            rec.created_at.format("%Y-%m-%d %H:%M"),
            attribute.bold(),
            if steward.is_empty() {
                String::new()
            } else {
                format!("steward={}", steward)
            },
            if datamart.is_empty() {
                String::new()
            } else {
                format!("datamart={}", datamart).yellow().to_string()
            },
        );
    }
    Ok(())
}

fn show_requirement(registry: &SchemaRegistry, client: &ApiClient, id: i64) -> Result<()> {
    let rec = fetch_record(client, id)?;

    println!("{} {}", "Requirement".bold(), rec.id.to_string().cyan());
    println!("  {:<22} {}", "Created:".dimmed(), rec.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(updated) = rec.updated_at {
        println!("  {:<22} {}", "Updated:".dimmed(), updated.format("%Y-%m-%d %H:%M"));
    }

    for field in registry.fields() {
        let value = rec.value(&field.id);
        let shown = if value.is_empty() { "-" } else { value };
        println!("  {:<22} {}", format!("{}:", field.label).dimmed(), shown);
    }
    Ok(())
}

fn edit_requirement(
    registry: &SchemaRegistry,
    client: &ApiClient,
    role: Option<&str>,
    id: i64,
    set: &[String],
) -> Result<()> {
    let role = resolve_role(registry, role, set.is_empty())?;
    let rec = fetch_record(client, id)?;

    let mut form = FormController::new(registry);
    let workflow = Workflow::new();
    workflow.request_edit(registry, &mut form, &rec);

    if set.is_empty() {
        prompts::prompt_form(registry, &role, &mut form)?;
    } else {
        apply_set_pairs(registry, &mut form, set)?;
    }

    match form.submit(registry, &role, client) {
        Ok(SubmitOutcome::Updated(rec)) => {
            println!("{} requirement {}", "Updated".green().bold(), rec.id);
            Ok(())
        }
        Ok(SubmitOutcome::Created(_)) => unreachable!("edit session forces an update"),
        Err(err) => report_submit_error(err),
    }
}

fn delete_requirement(client: &ApiClient, id: i64, yes: bool) -> Result<()> {
    let records = client.fetch()?;
    let mut set = RecordSet::new();
    set.replace(records);

    if set.get(id).is_none() {
        anyhow::bail!("Requirement {} not found", id);
    }

    let mut workflow = Workflow::new();
    workflow.request_delete(id);

    if !yes && !prompts::confirm_delete(id)? {
        workflow.cancel_delete();
        println!("{}", "Delete cancelled".dimmed());
        return Ok(());
    }

    workflow.confirm_delete(client, &mut set)?;
    println!("{} requirement {}", "Deleted".green().bold(), id);
    Ok(())
}

fn show_stats(client: &ApiClient) -> Result<()> {
    let records = client.fetch()?;
    let summary = Summary::compute(&records);

    println!("{}", "Requirements summary".bold());
    println!("  Total:          {}", summary.total.to_string().cyan());
    println!("  Data stewards:  {}", summary.distinct_stewards.to_string().cyan());
    println!("  Data owners:    {}", summary.distinct_owners.to_string().cyan());

    print_counts("By data owner", &summary.owner_counts);
    print_counts("By target datamart", &summary.datamart_counts);
    Ok(())
}

fn print_counts(title: &str, counts: &[(String, usize)]) {
    if counts.is_empty() {
        return;
    }
    println!("\n{}", title.bold());
    for (name, count) in counts {
        println!("  {:<24} {:>4}  {}", name, count, "#".repeat(*count).yellow());
    }
}

fn list_fields(registry: &SchemaRegistry, role: &str) {
    println!(
        "{}",
        format!("Fields visible to role '{}':", role).bold()
    );
    for field in registry.visible_fields(role) {
        println!(
            "  {:<22} {:<24} [{}]",
            field.id.cyan(),
            field.label,
            field.kind
        );
        if let Some(description) = &field.description {
            println!("  {:<22} {}", "", description.dimmed());
        }
    }
}

fn handle_theme(
    prefs_path: &std::path::Path,
    mut prefs: Preferences,
    value: Option<&str>,
) -> Result<()> {
    match value {
        None => {
            println!("{}", prefs.theme);
        }
        Some(raw) => {
            prefs.theme = match raw.to_lowercase().as_str() {
                "dark" => Theme::Dark,
                "light" => Theme::Light,
                other => anyhow::bail!("Unknown theme '{}' (expected dark or light)", other),
            };
            prefs.save(prefs_path)?;
            println!("Theme set to {}", prefs.theme.to_string().green());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_role_wins_over_prompting() {
        let registry = SchemaRegistry::standard();
        let role = resolve_role(&registry, Some("Data Steward"), true).unwrap();
        assert_eq!(role, "Data Steward");
    }

    #[test]
    fn test_missing_role_defaults_to_all_when_not_interactive() {
        let registry = SchemaRegistry::standard();
        let role = resolve_role(&registry, None, false).unwrap();
        assert_eq!(role, ALL_ROLE);
    }

    #[test]
    fn test_role_flag_is_optional() {
        let cli = Cli::try_parse_from(["datareq", "stats"]).unwrap();
        assert!(cli.role.is_none());

        let cli = Cli::try_parse_from(["datareq", "-r", "Data Engineer", "stats"]).unwrap();
        assert_eq!(cli.role.as_deref(), Some("Data Engineer"));
    }
}
