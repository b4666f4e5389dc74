use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{charts, overview, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GigScopeApp {
    pub state: AppState,
    /// File to open on the first frame (from the command line).
    initial_path: Option<PathBuf>,
}

impl GigScopeApp {
    pub fn new(initial_path: Option<PathBuf>) -> Self {
        Self {
            state: AppState::default(),
            initial_path,
        }
    }
}

impl eframe::App for GigScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(path) = self.initial_path.take() {
            panels::load_into_state(&mut self.state, &path);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: overview tables and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.session.is_none() {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("GigScope");
                    ui.label("Open a CSV, JSON, or Parquet file of freelancer earnings");
                    ui.label("(File → Open…)");
                });
                return;
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    overview::section(ui, &self.state);
                    ui.add_space(12.0);
                    charts::section(ui, &self.state);
                });
        });
    }
}
