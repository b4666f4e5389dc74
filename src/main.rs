use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use gigscope::app::GigScopeApp;

/// Interactive dashboard over a table of freelancer earnings.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Data file to open at startup (CSV, JSON, or Parquet).
    #[arg(long, default_value = "freelancer_earnings_bd.csv")]
    data: PathBuf,

    /// Start with an empty window instead of opening `data`.
    #[arg(long)]
    no_auto_load: bool,
}

fn main() -> eframe::Result {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let initial_path = (!args.no_auto_load).then_some(args.data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "GigScope – Freelancer Earnings",
        options,
        Box::new(|_cc| Ok(Box::new(GigScopeApp::new(initial_path)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_data_flag_overrides_the_startup_path() {
        let args = Args::try_parse_from(["gigscope", "--data", "jobs.csv"]).unwrap();
        assert_eq!(args.data, PathBuf::from("jobs.csv"));
        assert!(!args.no_auto_load);
    }

    #[test]
    fn bare_invocation_uses_the_bundled_dataset_name() {
        let args = Args::try_parse_from(["gigscope"]).unwrap();
        assert_eq!(args.data, PathBuf::from("freelancer_earnings_bd.csv"));

        let skip = Args::try_parse_from(["gigscope", "--no-auto-load"]).unwrap();
        assert!(skip.no_auto_load);
    }
}
