use std::f64::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use crate::color::CategoryColors;
use crate::data::dashboard::{CategoryChart, FrequencyChart, PieChart, TrendChart};
use crate::data::model::format_currency;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Chart area (central panel)
// ---------------------------------------------------------------------------

/// Render every chart the current dashboard provides, in a fixed order.
pub fn section(ui: &mut Ui, state: &AppState) {
    let Some(dash) = &state.dashboard else {
        return;
    };

    ui.heading("Charts");
    for notice in &dash.notices {
        ui.label(RichText::new(notice).weak());
    }

    if let Some(chart) = &dash.industry_earnings {
        earnings_bars(ui, "industry_earnings", chart);
    }
    if let Some(chart) = &dash.category_earnings {
        earnings_bars(ui, "category_earnings", chart);
    }
    if let Some(chart) = &dash.top_skills {
        frequency_bars(ui, chart);
    }
    if !dash.completion_pies.is_empty() {
        pie_row(ui, &dash.completion_pies);
    }
    if let Some(chart) = &dash.earnings_trend {
        trend_line(ui, chart);
    }
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

fn earnings_bars(ui: &mut Ui, id: &str, chart: &CategoryChart) {
    ui.add_space(12.0);
    ui.strong(&chart.title);

    let colors = CategoryColors::from_labels(chart.bars.iter().map(|b| b.label.as_str()));
    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            Bar::new(i as f64, bar.mean)
                .name(format!("{} ({} records)", bar.label, bar.count))
                .fill(colors.color_for(&bar.label))
        })
        .collect();
    let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();

    Plot::new(id)
        .height(280.0)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| tick_label(&labels, mark.value))
        .y_axis_formatter(|mark, _range| format_currency(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn frequency_bars(ui: &mut Ui, chart: &FrequencyChart) {
    ui.add_space(12.0);
    ui.strong(&chart.title);

    let colors = CategoryColors::from_labels(chart.bars.iter().map(|b| b.label.as_str()));
    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            Bar::new(i as f64, bar.count as f64)
                .name(format!("{} ({} records)", bar.label, bar.count))
                .fill(colors.color_for(&bar.label))
        })
        .collect();
    let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();

    Plot::new("top_skills")
        .height(280.0)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| tick_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Pies
// ---------------------------------------------------------------------------

fn pie_row(ui: &mut Ui, pies: &[PieChart]) {
    ui.add_space(12.0);

    // One colour per category label, shared by both pies.
    let colors = CategoryColors::from_labels(
        pies.iter()
            .flat_map(|p| p.slices.iter().map(|s| s.label.as_str())),
    );

    ui.columns(pies.len(), |columns| {
        for (pie, column) in pies.iter().zip(columns.iter_mut()) {
            draw_pie(column, pie, &colors);
        }
    });
}

fn draw_pie(ui: &mut Ui, pie: &PieChart, colors: &CategoryColors) {
    ui.strong(&pie.title);
    let total = pie.total();
    if total <= 0.0 {
        return;
    }

    let size = ui.available_width().min(260.0);
    let (response, painter) = ui.allocate_painter(Vec2::new(size, size), Sense::hover());
    let center = response.rect.center();
    let radius = size * 0.42;

    let mut start = -TAU / 4.0; // twelve o'clock
    for slice in &pie.slices {
        let sweep = slice.value / total * TAU;
        paint_sector(
            &painter,
            center,
            radius,
            start,
            sweep,
            colors.color_for(&slice.label),
        );

        let share = slice.value / total;
        if share >= 0.04 {
            let mid = start + sweep / 2.0;
            let pos = center + radius * 0.62 * angle_vec(mid);
            painter.text(
                pos,
                Align2::CENTER_CENTER,
                format!("{:.0}%", share * 100.0),
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }
        start += sweep;
    }

    for slice in &pie.slices {
        ui.horizontal(|ui: &mut Ui| {
            let (swatch, _) = ui.allocate_exact_size(Vec2::new(12.0, 12.0), Sense::hover());
            ui.painter()
                .rect_filled(swatch, 2.0, colors.color_for(&slice.label));
            ui.label(format!("{}: {}", slice.label, format_currency(slice.value)));
        });
    }
}

/// Fill a circle sector as a fan of thin triangles; each triangle stays
/// convex no matter how wide the sector is.
fn paint_sector(
    painter: &egui::Painter,
    center: Pos2,
    radius: f32,
    start: f64,
    sweep: f64,
    color: Color32,
) {
    let steps = ((sweep / 0.15).ceil() as usize).max(1);
    for s in 0..steps {
        let a0 = start + sweep * s as f64 / steps as f64;
        let a1 = start + sweep * (s + 1) as f64 / steps as f64;
        painter.add(Shape::convex_polygon(
            vec![
                center,
                center + radius * angle_vec(a0),
                center + radius * angle_vec(a1),
            ],
            color,
            Stroke::new(1.0, color),
        ));
    }
}

fn angle_vec(angle: f64) -> Vec2 {
    Vec2::new(angle.cos() as f32, angle.sin() as f32)
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

fn trend_line(ui: &mut Ui, chart: &TrendChart) {
    ui.add_space(12.0);
    ui.strong(&chart.title);
    if chart.skipped_rows > 0 {
        ui.label(
            RichText::new(format!(
                "{} rows skipped (unreadable date or earnings)",
                chart.skipped_rows
            ))
            .weak(),
        );
    }

    let points: PlotPoints = chart
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| [i as f64, p.mean])
        .collect();
    let months: Vec<String> = chart.points.iter().map(|p| p.month.clone()).collect();

    Plot::new("earnings_trend")
        .height(260.0)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| tick_label(&months, mark.value))
        .y_axis_formatter(|mark, _range| format_currency(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("Mean earnings").width(1.5));
        });
}

/// Label for a categorical x-axis: the category name on integer marks,
/// nothing on the fractional marks in between.
fn tick_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_labels_appear_only_on_integer_marks() {
        let labels = vec!["IT".to_string(), "Art".to_string()];
        assert_eq!(tick_label(&labels, 0.0), "IT");
        assert_eq!(tick_label(&labels, 1.0), "Art");
        assert_eq!(tick_label(&labels, 0.5), "");
        assert_eq!(tick_label(&labels, -1.0), "");
        assert_eq!(tick_label(&labels, 7.0), "");
    }

    #[test]
    fn sector_angles_cover_the_circle() {
        // Sweeps proportional to value, summing to a full turn.
        let pie = PieChart {
            title: "t".to_string(),
            slices: vec![
                crate::data::dashboard::PieSlice {
                    label: "a".to_string(),
                    value: 1.0,
                },
                crate::data::dashboard::PieSlice {
                    label: "b".to_string(),
                    value: 3.0,
                },
            ],
        };
        let total = pie.total();
        let sweep_sum: f64 = pie.slices.iter().map(|s| s.value / total * TAU).sum();
        assert!((sweep_sum - TAU).abs() < 1e-9);
    }
}
