use anyhow::Result;
use inquire::{Confirm, Select, Text};

use datareq_core::{FieldKind, FormController, SchemaRegistry};

/// Prompts for every field visible to `role`, pre-filling current values
///
/// Multi-line fields open the editor; everything else is a plain text prompt.
pub fn prompt_form(registry: &SchemaRegistry, role: &str, form: &mut FormController) -> Result<()> {
    for field in registry.visible_fields(role) {
        let current = form.state().get(&field.id).to_string();
        let id = field.id.clone();

        let help = match (&field.description, &field.example) {
            (Some(d), Some(e)) => format!("{} (e.g. {})", d, e),
            (Some(d), None) => d.clone(),
            (None, Some(e)) => format!("e.g. {}", e),
            (None, None) => String::new(),
        };

        let prompt = format!("{}:", field.label);
        let value = match field.kind {
            FieldKind::MultiLine => {
                let mut editor = inquire::Editor::new(&prompt).with_predefined_text(&current);
                if !help.is_empty() {
                    editor = editor.with_help_message(&help);
                }
                editor.prompt()?
            }
            FieldKind::SingleLine => {
                let mut text = Text::new(&prompt).with_initial_value(&current);
                if !help.is_empty() {
                    text = text.with_help_message(&help);
                }
                text.prompt()?
            }
        };

        form.set_field(registry, &id, &value)?;
    }

    Ok(())
}

/// Prompts the user to pick a role from the registry
pub fn prompt_select_role(registry: &SchemaRegistry) -> Result<String> {
    let options: Vec<String> = registry.roles().iter().map(|r| r.to_string()).collect();
    let selection = Select::new("Role:", options).prompt()?;
    Ok(selection)
}

/// Delete confirmation prompt
pub fn confirm_delete(id: i64) -> Result<bool> {
    let answer = Confirm::new(&format!("Delete requirement {}? This cannot be undone.", id))
        .with_default(false)
        .prompt()?;
    Ok(answer)
}
