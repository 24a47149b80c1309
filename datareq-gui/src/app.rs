use eframe::egui;
use std::path::PathBuf;
use std::time::Instant;

use datareq_core::{
    preferences_path, ApiClient, FieldDefinition, FieldKind, FilterCriteria, FormController,
    FormError, Preferences, RecordSet, RequirementApi, RequirementRecord, SchemaRegistry,
    SubmitError, SubmitOutcome, SummaryCache, Theme, Workflow, ALL_ROLE,
};

#[derive(Default, PartialEq, Clone)]
enum View {
    #[default]
    Records,
    Dashboard,
}

pub struct DatareqApp {
    registry: SchemaRegistry,
    client: Option<ApiClient>,
    prefs_path: PathBuf,
    prefs: Preferences,

    records: RecordSet,
    summary: SummaryCache,
    form: FormController,
    workflow: Workflow,
    criteria: FilterCriteria,
    role: String,
    current_view: View,

    // Advisory debounce: mutations are disabled while a request is in flight
    loading: bool,

    // Messages
    message: Option<(String, bool)>, // (message, is_error)

    // Pending operations (to avoid borrow checker issues)
    pending_refresh: bool,
    pending_edit: Option<i64>,
    pending_confirm_delete: bool,
}

impl DatareqApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let registry = SchemaRegistry::standard();
        let form = FormController::new(&registry);

        let prefs_path = preferences_path().unwrap_or_else(|_| PathBuf::from(".datareq.yaml"));
        let prefs = Preferences::load(&prefs_path).unwrap_or_else(|e| {
            log::warn!("Falling back to default preferences: {}", e);
            Preferences::default()
        });

        apply_theme(&cc.egui_ctx, prefs.theme);

        let client = match ApiClient::new(&prefs.api_url) {
            Ok(client) => Some(client),
            Err(e) => {
                log::error!("Cannot construct API client: {}", e);
                None
            }
        };

        let mut app = Self {
            registry,
            client,
            prefs_path,
            prefs,
            records: RecordSet::new(),
            summary: SummaryCache::new(),
            form,
            workflow: Workflow::new(),
            criteria: FilterCriteria::default(),
            role: ALL_ROLE.to_string(),
            current_view: View::Records,
            loading: false,
            message: None,
            pending_refresh: false,
            pending_edit: None,
            pending_confirm_delete: false,
        };
        app.refresh();
        app
    }

    fn refresh(&mut self) {
        let Some(client) = &self.client else {
            self.message = Some(("No backend configured".to_string(), true));
            return;
        };

        self.loading = true;
        let result = client.fetch();
        self.loading = false;

        match result {
            Ok(records) => {
                self.records.replace(records);
                self.message = None;
            }
            Err(e) => {
                log::error!("Failed to fetch requirements: {}", e);
                self.message = Some(("Failed to fetch requirements".to_string(), true));
            }
        }
    }

    fn submit(&mut self) {
        let Some(client) = &self.client else {
            return;
        };

        self.loading = true;
        let result = self.form.submit(&self.registry, &self.role, client);
        self.loading = false;

        match result {
            Ok(SubmitOutcome::Created(_)) => {
                self.message = Some(("Requirement submitted successfully!".to_string(), false));
                self.pending_refresh = true;
            }
            Ok(SubmitOutcome::Updated(_)) => {
                self.message = Some(("Requirement updated successfully!".to_string(), false));
                self.pending_refresh = true;
            }
            Err(SubmitError::Form(FormError::Validation { missing })) => {
                self.message = Some((format!("Missing required: {}", missing.join(", ")), true));
            }
            Err(e) => {
                log::error!("Submit failed: {}", e);
                self.message = Some(("Submit failed, nothing was saved".to_string(), true));
            }
        }
    }

    fn confirm_delete(&mut self) {
        let Some(client) = &self.client else {
            return;
        };

        self.loading = true;
        let result = self.workflow.confirm_delete(client, &mut self.records);
        self.loading = false;

        match result {
            Ok(Some(id)) => {
                self.message = Some((format!("Requirement {} deleted", id), false));
            }
            Ok(None) => {}
            Err(_) => {
                self.message = Some(("Delete failed, record kept".to_string(), true));
            }
        }
    }

    fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.prefs.theme = self.prefs.theme.toggled();
        apply_theme(ctx, self.prefs.theme);
        if let Err(e) = self.prefs.save(&self.prefs_path) {
            log::warn!("Could not persist theme preference: {}", e);
        }
    }

    fn show_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.heading("Requirements for data mart");
                ui.separator();

                ui.selectable_value(&mut self.current_view, View::Records, "Records");
                ui.selectable_value(&mut self.current_view, View::Dashboard, "Dashboard");
                ui.separator();

                if ui.add_enabled(!self.loading, egui::Button::new("🔄 Refresh")).clicked() {
                    self.pending_refresh = true;
                }

                let theme_label = match self.prefs.theme {
                    Theme::Dark => "☀ Light mode",
                    Theme::Light => "🌙 Dark mode",
                };
                if ui.button(theme_label).clicked() {
                    self.toggle_theme(ctx);
                }

                ui.separator();
                ui.label(format!("Requirements: {}", self.records.len()));

                if self.form.success_visible(Instant::now()) {
                    ui.separator();
                    ui.colored_label(egui::Color32::GREEN, "Submitted ✔");
                }

                if let Some((msg, is_error)) = &self.message {
                    ui.separator();
                    let color = if *is_error {
                        egui::Color32::RED
                    } else {
                        egui::Color32::GREEN
                    };
                    ui.colored_label(color, msg);
                }
            });
        });
    }

    fn show_form_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("form_panel").min_width(360.0).show(ctx, |ui| {
            let editing = self.form.editing();
            ui.heading(match editing {
                Some(id) => format!("Edit requirement {}", id),
                None => "Submit requirement".to_string(),
            });

            ui.horizontal(|ui| {
                ui.label("Role:");
                egui::ComboBox::new("role_combo", "")
                    .selected_text(self.role.clone())
                    .show_ui(ui, |ui| {
                        for role in self.registry.roles().iter().map(|r| r.to_string()) {
                            ui.selectable_value(&mut self.role, role.clone(), role);
                        }
                    });
            });
            ui.separator();

            let fields: Vec<FieldDefinition> = self
                .registry
                .visible_fields(&self.role)
                .into_iter()
                .cloned()
                .collect();

            egui::ScrollArea::vertical().show(ui, |ui| {
                for field in &fields {
                    ui.label(&field.label);
                    let mut value = self.form.state().get(&field.id).to_string();
                    let response = match field.kind {
                        FieldKind::SingleLine => ui.text_edit_singleline(&mut value),
                        FieldKind::MultiLine => ui.text_edit_multiline(&mut value),
                    };
                    if response.changed() {
                        // Ids come from the registry, so this cannot reject
                        if let Err(e) = self.form.set_field(&self.registry, &field.id, &value) {
                            log::error!("{}", e);
                        }
                    }
                    if let Some(example) = &field.example {
                        ui.small(format!("e.g. {}", example));
                    }
                    ui.add_space(6.0);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    let submit_label = if editing.is_some() { "💾 Update" } else { "💾 Submit" };
                    if ui.add_enabled(!self.loading, egui::Button::new(submit_label)).clicked() {
                        self.submit();
                    }
                    if editing.is_some() && ui.button("❌ Cancel").clicked() {
                        self.form.cancel_edit(&self.registry);
                    }
                });
            });
        });
    }

    fn show_records_view(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Attribute:");
            ui.add(egui::TextEdit::singleline(&mut self.criteria.attribute).desired_width(120.0));
            ui.label("Steward:");
            ui.add(egui::TextEdit::singleline(&mut self.criteria.steward).desired_width(120.0));
            ui.label("Datamart:");
            ui.add(egui::TextEdit::singleline(&mut self.criteria.datamart).desired_width(120.0));
            ui.checkbox(&mut self.criteria.show_all, "Show all");
        });
        ui.separator();

        let visible: Vec<RequirementRecord> = self
            .criteria
            .apply(self.records.records())
            .into_iter()
            .cloned()
            .collect();

        if visible.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.heading("No requirements to show");
            });
            return;
        }

        if self.criteria.is_default_view() {
            ui.label("Showing the latest requirement. Tick \"Show all\" for the full list.");
            ui.add_space(4.0);
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            for rec in &visible {
                self.show_record_row(ui, rec);
            }
        });
    }

    fn show_record_row(&mut self, ui: &mut egui::Ui, rec: &RequirementRecord) {
        let expanded = self.workflow.expanded() == Some(rec.id);

        ui.group(|ui| {
            ui.horizontal(|ui| {
                let title = format!(
                    "#{} {}",
                    rec.id,
                    non_empty(rec.value("attribute"), "(unnamed)")
                );
                if ui.selectable_label(expanded, title).clicked() {
                    self.workflow.toggle_expanded(rec.id);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add_enabled(!self.loading, egui::Button::new("🗑 Delete")).clicked() {
                        self.workflow.request_delete(rec.id);
                    }
                    if ui.button("✏ Edit").clicked() {
                        self.pending_edit = Some(rec.id);
                    }
                    ui.label(rec.created_at.format("%Y-%m-%d %H:%M").to_string());
                });
            });

            ui.horizontal(|ui| {
                let steward = rec.value("data_steward");
                if !steward.is_empty() {
                    ui.label(format!("👤 {}", steward));
                }
                let datamart = rec.value("target_datamart");
                if !datamart.is_empty() {
                    ui.label(format!("🗄 {}", datamart));
                }
            });

            if expanded {
                ui.separator();
                egui::Grid::new(("detail_grid", rec.id))
                    .num_columns(2)
                    .spacing([30.0, 4.0])
                    .striped(true)
                    .show(ui, |ui| {
                        for field in self.registry.fields() {
                            ui.label(format!("{}:", field.label));
                            ui.label(non_empty(rec.value(&field.id), "-"));
                            ui.end_row();
                        }
                        if let Some(updated) = rec.updated_at {
                            ui.label("Updated:");
                            ui.label(updated.format("%Y-%m-%d %H:%M").to_string());
                            ui.end_row();
                        }
                    });
            }
        });
    }

    fn show_dashboard_view(&mut self, ui: &mut egui::Ui) {
        let summary = self.summary.summary(&self.records).clone();

        ui.horizontal(|ui| {
            kpi_card(ui, "Total requirements", summary.total);
            kpi_card(ui, "Data stewards", summary.distinct_stewards);
            kpi_card(ui, "Data owners", summary.distinct_owners);
        });
        ui.add_space(12.0);

        count_bars(ui, "Requirements by data owner", &summary.owner_counts, summary.total);
        ui.add_space(12.0);
        count_bars(ui, "Requirements by datamart", &summary.datamart_counts, summary.total);
    }

    fn show_delete_prompt(&mut self, ctx: &egui::Context) {
        let Some(id) = self.workflow.pending_delete() else {
            return;
        };

        egui::Window::new("Confirm delete")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "Delete requirement {}? This removes it from the backend.",
                    id
                ));
                ui.horizontal(|ui| {
                    if ui.add_enabled(!self.loading, egui::Button::new("🗑 Delete")).clicked() {
                        self.pending_confirm_delete = true;
                    }
                    if ui.button("Cancel").clicked() {
                        self.workflow.cancel_delete();
                    }
                });
            });
    }
}

impl eframe::App for DatareqApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle pending operations (to avoid borrow checker issues)
        if self.pending_confirm_delete {
            self.pending_confirm_delete = false;
            self.confirm_delete();
        }
        if let Some(id) = self.pending_edit.take() {
            if let Some(rec) = self.records.get(id).cloned() {
                self.workflow.request_edit(&self.registry, &mut self.form, &rec);
            }
        }
        if self.pending_refresh {
            self.pending_refresh = false;
            self.refresh();
        }

        self.show_top_panel(ctx);
        self.show_form_panel(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.current_view {
            View::Records => self.show_records_view(ui),
            View::Dashboard => self.show_dashboard_view(ui),
        });

        self.show_delete_prompt(ctx);

        // The success affordance clears itself after a few seconds
        if self.form.success_visible(Instant::now()) {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }
}

fn apply_theme(ctx: &egui::Context, theme: Theme) {
    match theme {
        Theme::Dark => ctx.set_visuals(egui::Visuals::dark()),
        Theme::Light => ctx.set_visuals(egui::Visuals::light()),
    }
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn kpi_card(ui: &mut egui::Ui, title: &str, value: usize) {
    ui.group(|ui| {
        ui.vertical(|ui| {
            ui.label(title);
            ui.heading(value.to_string());
        });
    });
}

fn count_bars(ui: &mut egui::Ui, title: &str, counts: &[(String, usize)], total: usize) {
    ui.heading(title);
    if counts.is_empty() {
        ui.label("No data yet");
        return;
    }
    for (name, count) in counts {
        ui.horizontal(|ui| {
            ui.label(format!("{} ({})", name, count));
            let fraction = if total == 0 {
                0.0
            } else {
                *count as f32 / total as f32
            };
            ui.add(egui::ProgressBar::new(fraction).desired_width(260.0));
        });
    }
}
