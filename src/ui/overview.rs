use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, SessionData};

/// How many rows the preview table shows.
const PREVIEW_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Dataset overview (central panel, above the charts)
// ---------------------------------------------------------------------------

/// Render the dataset overview: first rows, descriptive statistics, and
/// per-column missing-value counts. All three read the raw table, before
/// incomplete rows are dropped.
pub fn section(ui: &mut Ui, state: &AppState) {
    let Some(session) = &state.session else {
        return;
    };

    preview(ui, session);
    ui.add_space(12.0);
    summary(ui, session);
    ui.add_space(12.0);
    missing(ui, session);
}

fn preview(ui: &mut Ui, session: &SessionData) {
    let table = &session.raw;
    let rows = table.head(PREVIEW_ROWS);

    egui::CollapsingHeader::new(RichText::new("Data preview").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            if table.column_names.is_empty() {
                ui.label("Empty table.");
                return;
            }
            ui.push_id("preview", |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .vscroll(false)
                    .columns(Column::auto().resizable(true), table.column_names.len())
                    .header(20.0, |mut header| {
                        for col in &table.column_names {
                            header.col(|ui| {
                                ui.strong(col);
                            });
                        }
                    })
                    .body(|mut body| {
                        body.rows(18.0, rows.len(), |mut row| {
                            let record = &rows[row.index()];
                            for col in &table.column_names {
                                row.col(|ui| {
                                    let text = record
                                        .get(col)
                                        .map(|v| v.to_string())
                                        .unwrap_or_default();
                                    ui.label(text);
                                });
                            }
                        });
                    });
            });
        });
}

fn summary(ui: &mut Ui, session: &SessionData) {
    egui::CollapsingHeader::new(RichText::new("Summary statistics").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            if session.summaries.is_empty() {
                ui.label("No numeric columns.");
                return;
            }
            ui.push_id("summary", |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .vscroll(false)
                    .columns(Column::auto().resizable(true), 9)
                    .header(20.0, |mut header| {
                        for title in [
                            "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
                        ] {
                            header.col(|ui| {
                                ui.strong(title);
                            });
                        }
                    })
                    .body(|mut body| {
                        body.rows(18.0, session.summaries.len(), |mut row| {
                            let s = &session.summaries[row.index()];
                            row.col(|ui| {
                                ui.label(&s.column);
                            });
                            for value in
                                [s.count as f64, s.mean, s.std, s.min, s.q1, s.median, s.q3, s.max]
                            {
                                row.col(|ui| {
                                    ui.label(format_stat(value));
                                });
                            }
                        });
                    });
            });
        });
}

fn missing(ui: &mut Ui, session: &SessionData) {
    egui::CollapsingHeader::new(RichText::new("Missing values").strong())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.push_id("missing", |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .vscroll(false)
                    .columns(Column::auto().resizable(true), 2)
                    .header(20.0, |mut header| {
                        header.col(|ui| {
                            ui.strong("column");
                        });
                        header.col(|ui| {
                            ui.strong("missing");
                        });
                    })
                    .body(|mut body| {
                        body.rows(18.0, session.missing.len(), |mut row| {
                            let (col, count) = &session.missing[row.index()];
                            row.col(|ui| {
                                ui.label(col);
                            });
                            row.col(|ui| {
                                ui.label(count.to_string());
                            });
                        });
                    });
            });
            if session.dropped_rows > 0 {
                ui.add_space(4.0);
                ui.label(
                    RichText::new(format!(
                        "{} incomplete rows are excluded from filters and charts",
                        session.dropped_rows
                    ))
                    .weak(),
                );
            }
        });
}

/// Two decimals, except for whole numbers and NaN.
fn format_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == v.trunc() && v.abs() < 1e12 {
        format!("{}", v as i64)
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_format_compactly() {
        assert_eq!(format_stat(150.0), "150");
        assert_eq!(format_stat(2.5), "2.50");
        assert_eq!(format_stat(-0.125), "-0.12");
        assert_eq!(format_stat(f64::NAN), "NaN");
    }
}
