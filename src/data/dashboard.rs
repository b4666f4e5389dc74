use serde::Serialize;

use super::aggregate::{
    COMPLETION_THRESHOLD, GroupMean, aggregate_mean, monthly_trend, partition, value_counts,
};
use super::model::EarningsTable;
use super::schema::{self, ColumnCaps};

/// How many skills the frequency chart shows.
pub const TOP_SKILLS: usize = 10;

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------
//
// These structs are what the UI draws and what "Export summary" writes out:
// labels and numbers only, no widget state. Building them is a pure function
// of (table, caps), so re-running the pipeline on every interaction is safe.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBar {
    pub label: String,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryChart {
    pub title: String,
    pub bars: Vec<CategoryBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyBar {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyChart {
    pub title: String,
    pub bars: Vec<FrequencyBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: String,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub title: String,
    pub points: Vec<TrendPoint>,
    /// Rows dropped from the trend because of unparseable dates or
    /// non-numeric earnings; shown beside the chart when non-zero.
    pub skipped_rows: usize,
}

/// Everything the chart area renders for the current filtered table.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Dashboard {
    pub row_count: usize,
    pub industry_earnings: Option<CategoryChart>,
    pub category_earnings: Option<CategoryChart>,
    pub top_skills: Option<FrequencyChart>,
    pub completion_pies: Vec<PieChart>,
    pub earnings_trend: Option<TrendChart>,
    /// Skipped sections, empty partitions, missing columns.
    pub notices: Vec<String>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Assemble the dashboard for a (filtered) table. The capability record is
/// consulted here, once; a missing column downgrades its section to a notice
/// instead of failing the run.
pub fn build(table: &EarningsTable, caps: ColumnCaps) -> Dashboard {
    let mut dash = Dashboard {
        row_count: table.len(),
        ..Dashboard::default()
    };

    let missing = caps.missing();
    if !missing.is_empty() {
        dash.notices.push(format!(
            "Columns not in this dataset: {} (related sections skipped)",
            missing.join(", ")
        ));
    }
    if table.is_empty() {
        dash.notices
            .push("No rows match the current filters.".to_string());
        return dash;
    }

    if caps.industry && caps.earnings {
        dash.industry_earnings = category_chart(
            "Average earnings by industry",
            aggregate_mean(table, schema::INDUSTRY, schema::EARNINGS),
        );
    }

    if caps.job_category && caps.earnings {
        dash.category_earnings = category_chart(
            "Average earnings by job category",
            aggregate_mean(table, schema::JOB_CATEGORY, schema::EARNINGS),
        );
    }

    if caps.skill {
        let bars: Vec<FrequencyBar> = value_counts(table, schema::SKILL)
            .into_iter()
            .take(TOP_SKILLS)
            .map(|(value, count)| FrequencyBar {
                label: value.to_string(),
                count,
            })
            .collect();
        if !bars.is_empty() {
            dash.top_skills = Some(FrequencyChart {
                title: format!("Most requested skills (top {TOP_SKILLS})"),
                bars,
            });
        }
    }

    if caps.earnings {
        build_pies(table, caps, &mut dash);
    }

    if caps.date && caps.earnings {
        let trend = monthly_trend(table, schema::DATE, schema::EARNINGS);
        if trend.is_empty() {
            if trend.skipped_rows > 0 {
                dash.notices.push(format!(
                    "Earnings trend skipped: none of the {} dated rows had a readable date.",
                    trend.skipped_rows
                ));
            }
        } else {
            dash.earnings_trend = Some(TrendChart {
                title: "Earnings trend over time".to_string(),
                points: trend
                    .points
                    .iter()
                    .map(|p| TrendPoint {
                        month: p.month.to_string(),
                        mean: p.mean,
                        count: p.count,
                    })
                    .collect(),
                skipped_rows: trend.skipped_rows,
            });
        }
    }

    dash
}

/// Pie(s) of mean earnings by category. With a `job_completed` column the
/// table is partitioned at the completion threshold and each non-empty side
/// gets its own pie; otherwise a single unsplit pie is built.
fn build_pies(table: &EarningsTable, caps: ColumnCaps, dash: &mut Dashboard) {
    let Some(category) = caps.pie_category() else {
        return;
    };

    if caps.job_completed {
        let (high, low) = partition(table, schema::JOB_COMPLETED, COMPLETION_THRESHOLD);
        let sides = [
            (high, format!("more than {COMPLETION_THRESHOLD:.0}")),
            (low, format!("{COMPLETION_THRESHOLD:.0} or fewer")),
        ];
        for (side, qualifier) in sides {
            let title = format!("Average earnings by {category} ({qualifier} jobs completed)");
            match pie_chart(&title, aggregate_mean(&side, category, schema::EARNINGS)) {
                Some(pie) => dash.completion_pies.push(pie),
                None => dash.notices.push(format!(
                    "No rows with {qualifier} completed jobs under the current filters."
                )),
            }
        }
    } else {
        let title = format!("Average earnings by {category}");
        if let Some(pie) = pie_chart(&title, aggregate_mean(table, category, schema::EARNINGS)) {
            dash.completion_pies.push(pie);
        }
    }
}

fn category_chart(title: &str, means: Vec<GroupMean>) -> Option<CategoryChart> {
    if means.is_empty() {
        return None;
    }
    Some(CategoryChart {
        title: title.to_string(),
        bars: means
            .into_iter()
            .map(|g| CategoryBar {
                label: g.group.to_string(),
                mean: g.mean,
                count: g.count,
            })
            .collect(),
    })
}

fn pie_chart(title: &str, means: Vec<GroupMean>) -> Option<PieChart> {
    // A sector cannot depict a non-positive mean.
    let slices: Vec<PieSlice> = means
        .into_iter()
        .filter(|g| g.mean.is_finite() && g.mean > 0.0)
        .map(|g| PieSlice {
            label: g.group.to_string(),
            value: g.mean,
        })
        .collect();
    if slices.is_empty() {
        return None;
    }
    Some(PieChart {
        title: title.to_string(),
        slices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Record};

    fn full_row(
        industry: &str,
        skill: &str,
        category: &str,
        earnings: f64,
        completed: i64,
        date: &str,
    ) -> Record {
        [
            ("industry", CellValue::String(industry.into())),
            ("skill", CellValue::String(skill.into())),
            ("job_category", CellValue::String(category.into())),
            ("earnings", CellValue::Float(earnings)),
            ("job_completed", CellValue::Integer(completed)),
            ("hourly_rate", CellValue::Float(earnings / 40.0)),
            ("date", CellValue::String(date.into())),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn full_table() -> EarningsTable {
        let columns = vec![
            "industry".to_string(),
            "skill".to_string(),
            "job_category".to_string(),
            "earnings".to_string(),
            "job_completed".to_string(),
            "hourly_rate".to_string(),
            "date".to_string(),
        ];
        let rows = vec![
            full_row("IT", "Rust", "Web", 100.0, 60, "2024-01-05"),
            full_row("IT", "Rust", "Web", 200.0, 70, "2024-01-20"),
            full_row("Art", "Design", "Logo", 50.0, 10, "2024-02-01"),
        ];
        EarningsTable::new(columns, rows)
    }

    #[test]
    fn full_capability_table_fills_every_section() {
        let table = full_table();
        let caps = ColumnCaps::detect(&table);
        let dash = build(&table, caps);

        assert_eq!(dash.row_count, 3);
        assert!(dash.notices.is_empty());

        let industry = dash.industry_earnings.as_ref().unwrap();
        assert_eq!(industry.bars.len(), 2);
        assert_eq!(industry.bars[1].label, "IT");
        assert_eq!(industry.bars[1].mean, 150.0);

        assert!(dash.category_earnings.is_some());

        let skills = dash.top_skills.as_ref().unwrap();
        assert_eq!(skills.bars[0].label, "Rust");
        assert_eq!(skills.bars[0].count, 2);

        assert_eq!(dash.completion_pies.len(), 2);
        // high side first: only the two IT/Web rows passed the threshold
        assert_eq!(dash.completion_pies[0].slices.len(), 1);
        assert_eq!(dash.completion_pies[0].slices[0].label, "Web");

        let trend = dash.earnings_trend.as_ref().unwrap();
        assert_eq!(trend.points.len(), 2);
        assert_eq!(trend.points[0].month, "2024-01");
        assert_eq!(trend.points[0].mean, 150.0);
        assert_eq!(trend.skipped_rows, 0);
    }

    #[test]
    fn missing_skill_column_skips_only_that_section() {
        let columns = vec![
            "industry".to_string(),
            "earnings".to_string(),
            "job_completed".to_string(),
        ];
        let rows = vec![
            [
                ("industry", CellValue::String("IT".into())),
                ("earnings", CellValue::Float(100.0)),
                ("job_completed", CellValue::Integer(60)),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        ];
        let table = EarningsTable::new(columns, rows);
        let caps = ColumnCaps::detect(&table);
        let dash = build(&table, caps);

        assert!(dash.top_skills.is_none());
        assert!(dash.industry_earnings.is_some());
        assert!(!dash.completion_pies.is_empty());
        // The missing columns are reported once, and nothing failed.
        assert!(dash.notices.iter().any(|n| n.contains("skill")));
    }

    #[test]
    fn empty_table_is_all_notices_no_sections() {
        let table = EarningsTable::new(vec!["industry".into(), "earnings".into()], Vec::new());
        let caps = ColumnCaps::detect(&table);
        let dash = build(&table, caps);

        assert_eq!(dash.row_count, 0);
        assert!(dash.industry_earnings.is_none());
        assert!(dash.completion_pies.is_empty());
        assert!(dash
            .notices
            .iter()
            .any(|n| n.contains("No rows match")));
    }

    #[test]
    fn one_sided_partition_reports_the_empty_side() {
        let columns = vec![
            "job_category".to_string(),
            "earnings".to_string(),
            "job_completed".to_string(),
        ];
        let rows: Vec<Record> = (0..3)
            .map(|i| {
                [
                    ("job_category", CellValue::String("Web".into())),
                    ("earnings", CellValue::Float(100.0 + i as f64)),
                    ("job_completed", CellValue::Integer(90)),
                ]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect()
            })
            .collect();
        let table = EarningsTable::new(columns, rows);
        let dash = build(&table, ColumnCaps::detect(&table));

        assert_eq!(dash.completion_pies.len(), 1);
        assert!(dash.completion_pies[0].title.contains("more than 50"));
        assert!(dash
            .notices
            .iter()
            .any(|n| n.contains("50 or fewer")));
    }

    #[test]
    fn rebuilding_from_the_same_table_is_identical() {
        let table = full_table();
        let caps = ColumnCaps::detect(&table);
        assert_eq!(build(&table, caps), build(&table, caps));
    }

    #[test]
    fn non_positive_means_cannot_become_slices() {
        let means = vec![
            GroupMean {
                group: CellValue::String("loss".into()),
                mean: -5.0,
                count: 1,
            },
            GroupMean {
                group: CellValue::String("gain".into()),
                mean: 5.0,
                count: 1,
            },
        ];
        let pie = pie_chart("t", means).unwrap();
        assert_eq!(pie.slices.len(), 1);
        assert_eq!(pie.slices[0].label, "gain");
        assert!(pie_chart("t", Vec::new()).is_none());
    }
}
