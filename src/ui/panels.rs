use std::path::Path;

use anyhow::Context as _;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::dashboard::Dashboard;
use crate::data::model::CellValue;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.heading("Filters");
    ui.separator();

    let Some(session) = &state.session else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let choices: Vec<(String, Vec<CellValue>)> = state
        .filters
        .keys()
        .map(|col| (col.clone(), session.filter_choices(col)))
        .collect();
    let column_info: Vec<(String, usize)> = session.missing.clone();
    let dropped_rows = session.dropped_rows;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Single-choice combo per filterable column ----
            for (col, values) in &choices {
                let current = state.filters.get(col).cloned().flatten();
                let selected_text = current
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "All".to_string());

                ui.strong(col);
                egui::ComboBox::from_id_salt(col)
                    .selected_text(selected_text)
                    .show_ui(ui, |ui: &mut Ui| {
                        if ui.selectable_label(current.is_none(), "All").clicked() {
                            state.set_filter(col, None);
                        }
                        for value in values {
                            let is_current = current.as_ref() == Some(value);
                            if ui
                                .selectable_label(is_current, value.to_string())
                                .clicked()
                            {
                                state.set_filter(col, Some(value.clone()));
                            }
                        }
                    });
                ui.add_space(6.0);
            }

            if choices.is_empty() {
                ui.label("No filterable columns in this file.");
            } else if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }

            ui.separator();

            // ---- Column overview ----
            egui::CollapsingHeader::new(RichText::new("Columns").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for (col, missing) in &column_info {
                        if *missing > 0 {
                            ui.label(format!("{col}  ({missing} missing)"));
                        } else {
                            ui.label(col);
                        }
                    }
                    if dropped_rows > 0 {
                        ui.add_space(4.0);
                        ui.label(
                            RichText::new(format!(
                                "{dropped_rows} incomplete rows excluded from charts"
                            ))
                            .weak(),
                        );
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dashboard.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export summary…"))
                .clicked()
            {
                export_summary_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.session {
            let shown = state
                .dashboard
                .as_ref()
                .map_or(session.clean.len(), |d| d.row_count);
            ui.label(format!(
                "{}: {} records loaded, {} complete, {} after filters",
                session.source_name,
                session.raw.len(),
                session.clean.len(),
                shown
            ));
        }

        if state.loading {
            ui.separator();
            ui.spinner();
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

/// Load `path` and install it as the current session; failures become a
/// status message instead of tearing the app down.
pub fn load_into_state(state: &mut AppState, path: &Path) {
    state.loading = true;
    match crate::data::loader::load_file(path) {
        Ok(table) => {
            log::info!(
                "Loaded {} records with columns {:?}",
                table.len(),
                table.column_names
            );
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            state.install_session(table, name);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
            state.loading = false;
        }
    }
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open earnings data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_into_state(state, &path);
    }
}

pub fn export_summary_dialog(state: &mut AppState) {
    if state.dashboard.is_none() {
        return;
    }
    let file = rfd::FileDialog::new()
        .set_title("Export chart summary")
        .set_file_name("gigscope_summary.json")
        .add_filter("JSON", &["json"])
        .save_file();

    let Some(path) = file else {
        return;
    };
    let result = state
        .dashboard
        .as_ref()
        .map(|dash| export_summary(dash, &path))
        .unwrap_or(Ok(()));
    match result {
        Ok(()) => log::info!("Exported summary to {}", path.display()),
        Err(e) => {
            log::error!("Failed to export summary: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn export_summary(dashboard: &Dashboard, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(dashboard).context("serializing summary")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_export_writes_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let dash = Dashboard {
            row_count: 2,
            notices: vec!["note".to_string()],
            ..Dashboard::default()
        };

        export_summary(&dash, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["row_count"], 2);
        assert_eq!(value["notices"][0], "note");
    }

    #[test]
    fn summary_export_surfaces_io_errors() {
        let dash = Dashboard::default();
        let err = export_summary(&dash, Path::new("/nonexistent/dir/summary.json"))
            .unwrap_err();
        assert!(err.to_string().contains("summary.json"));
    }
}
