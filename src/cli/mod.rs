pub mod report;

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::services::{
    available_formats, available_trainers, resolve_location, Aggregator, DataLoader, SessionFilter,
};
use crate::types::{GroupBy, Metric, SessionRecord};

/// Fitness studio session analytics
#[derive(Parser)]
#[command(name = "studiopulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Data source and filter flags shared by every subcommand
#[derive(Args, Debug, Default)]
struct CommonArgs {
    /// Path to a csv export, or a directory of exports
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Filter to one studio location (case-insensitive substring)
    #[arg(long)]
    location: Option<String>,

    /// Earliest session date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Latest session date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Limit to a class format (repeatable)
    #[arg(long = "class", value_name = "FORMAT")]
    classes: Vec<String>,

    /// Limit to a trainer (repeatable)
    #[arg(long = "trainer", value_name = "NAME")]
    trainers: Vec<String>,
}

impl CommonArgs {
    fn filter(&self) -> SessionFilter {
        // Canonicalize shorthand like "bandra" to the full studio name;
        // unrecognized queries pass through as substring filters.
        let location = self.location.as_deref().map(|query| {
            resolve_location(query)
                .map(str::to_string)
                .unwrap_or_else(|| query.to_string())
        });
        SessionFilter {
            location,
            from: self.from,
            to: self.to,
            class_formats: self.classes.clone(),
            trainers: self.trainers.clone(),
        }
    }

    /// Load and filter records for a report command
    fn load(&self) -> anyhow::Result<Vec<SessionRecord>> {
        let root = self
            .data
            .clone()
            .or_else(DataLoader::default_dir)
            .context("no data directory available, pass --data")?;

        let loaded = DataLoader::new(root).load()?;
        if loaded.skipped_rows > 0 {
            eprintln!(
                "[studiopulse] Warning: skipped {} rows with unparseable dates",
                loaded.skipped_rows
            );
        }

        let records = self.filter().apply(&loaded.records);
        if records.is_empty() && !loaded.records.is_empty() {
            for hint in no_match_hints(&self.classes, &self.trainers, &loaded.records) {
                eprintln!("[studiopulse] {hint}");
            }
        }
        Ok(records)
    }
}

/// Hints for a filter that matched nothing, naming what the data contains
fn no_match_hints(
    classes: &[String],
    trainers: &[String],
    records: &[SessionRecord],
) -> Vec<String> {
    let mut hints = Vec::new();
    if !classes.is_empty() {
        hints.push(format!(
            "No sessions match --class; formats in the data: {}",
            available_formats(records).join(", ")
        ));
    }
    if !trainers.is_empty() {
        hints.push(format!(
            "No sessions match --trainer; trainers in the data: {}",
            available_trainers(records).join(", ")
        ));
    }
    hints
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI (default)
    Tui {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Attendance by class format, month on month
    Attendance {
        #[command(flatten)]
        common: CommonArgs,

        /// Split categories by trainer as well
        #[arg(long)]
        by_trainer: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fill-rate efficiency by class format
    Efficiency {
        #[command(flatten)]
        common: CommonArgs,

        /// Split categories by trainer as well
        #[arg(long)]
        by_trainer: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Revenue by class format
    Revenue {
        #[command(flatten)]
        common: CommonArgs,

        /// Split categories by trainer as well
        #[arg(long)]
        by_trainer: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Capacity utilization by class format
    Utilization {
        #[command(flatten)]
        common: CommonArgs,

        /// Split categories by trainer as well
        #[arg(long)]
        by_trainer: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// All-metric format comparison with weighted score
    Comparison {
        #[command(flatten)]
        common: CommonArgs,

        /// Split categories by trainer as well
        #[arg(long)]
        with_trainer: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Studio-wide summary
    Summary {
        #[command(flatten)]
        common: CommonArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn group_by(by_trainer: bool) -> GroupBy {
    if by_trainer {
        GroupBy::FormatAndTrainer
    } else {
        GroupBy::ClassFormat
    }
}

/// Run one comparison report: load, aggregate, print
fn run_comparison(
    common: &CommonArgs,
    by_trainer: bool,
    metric: Metric,
    json: bool,
) -> anyhow::Result<()> {
    let records = common.load()?;
    let window = Aggregator::month_window(&records);
    let rows = Aggregator::compare(&records, group_by(by_trainer), metric);
    report::print_comparison(&rows, &window, metric, json)
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            None => crate::tui::run(None, SessionFilter::default()),
            Some(Commands::Tui { common }) => {
                crate::tui::run(common.data.clone(), common.filter())
            }
            Some(Commands::Attendance {
                common,
                by_trainer,
                json,
            }) => run_comparison(&common, by_trainer, Metric::Attendance, json),
            Some(Commands::Efficiency {
                common,
                by_trainer,
                json,
            }) => run_comparison(&common, by_trainer, Metric::FillRate, json),
            Some(Commands::Revenue {
                common,
                by_trainer,
                json,
            }) => run_comparison(&common, by_trainer, Metric::TotalRevenue, json),
            Some(Commands::Utilization {
                common,
                by_trainer,
                json,
            }) => run_comparison(&common, by_trainer, Metric::UtilizationRate, json),
            Some(Commands::Comparison {
                common,
                with_trainer,
                json,
            }) => {
                let records = common.load()?;
                let rows = Aggregator::format_comparison(&records, with_trainer);
                report::print_format_comparison(&rows, json)
            }
            Some(Commands::Summary { common, json }) => {
                let records = common.load()?;
                let summary = Aggregator::summary(&records);
                report::print_summary(&summary, json)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["studiopulse"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_attendance() {
        let cli = Cli::try_parse_from(["studiopulse", "attendance"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Attendance {
                json: false,
                by_trainer: false,
                ..
            })
        ));
    }

    #[test]
    fn test_cli_parse_revenue_json() {
        let cli = Cli::try_parse_from(["studiopulse", "revenue", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Revenue { json: true, .. })
        ));
    }

    #[test]
    fn test_cli_parse_filters() {
        let cli = Cli::try_parse_from([
            "studiopulse",
            "efficiency",
            "--location",
            "bandra",
            "--from",
            "2024-05-01",
            "--to",
            "2024-06-30",
            "--class",
            "Yoga",
            "--class",
            "Barre",
            "--trainer",
            "Anisha",
        ])
        .unwrap();

        let Some(Commands::Efficiency { common, .. }) = cli.command else {
            panic!("expected efficiency command");
        };
        let filter = common.filter();
        assert_eq!(filter.location.as_deref(), Some("Supreme HQ, Bandra"));
        assert_eq!(filter.from, Some("2024-05-01".parse().unwrap()));
        assert_eq!(filter.to, Some("2024-06-30".parse().unwrap()));
        assert_eq!(filter.class_formats, vec!["Yoga", "Barre"]);
        assert_eq!(filter.trainers, vec!["Anisha"]);
    }

    #[test]
    fn test_cli_parse_comparison_with_trainer() {
        let cli =
            Cli::try_parse_from(["studiopulse", "comparison", "--with-trainer"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Comparison {
                with_trainer: true,
                ..
            })
        ));
    }

    #[test]
    fn test_cli_parse_bad_date_rejected() {
        assert!(Cli::try_parse_from(["studiopulse", "summary", "--from", "June 1"]).is_err());
    }

    #[test]
    fn test_no_match_hints_name_available_values() {
        let records = vec![
            SessionRecord {
                date: "2024-06-01".parse().unwrap(),
                cleaned_class: Some("Yoga".to_string()),
                class_type: None,
                trainer_name: Some("Anisha".to_string()),
                location: None,
                checked_in_count: 10,
                capacity: 20,
                total_paid: 100.0,
                booked_count: 0,
                late_cancelled_count: 0,
                new_client_count: 0,
                time: None,
                day_of_week: None,
            },
            SessionRecord {
                date: "2024-06-02".parse().unwrap(),
                cleaned_class: Some("Barre".to_string()),
                class_type: None,
                trainer_name: Some("Rohan".to_string()),
                location: None,
                checked_in_count: 8,
                capacity: 20,
                total_paid: 80.0,
                booked_count: 0,
                late_cancelled_count: 0,
                new_client_count: 0,
                time: None,
                day_of_week: None,
            },
        ];

        let hints = no_match_hints(&["Pilates".to_string()], &[], &records);
        assert_eq!(hints.len(), 1);
        assert!(hints[0].contains("Barre, Yoga"));

        let hints = no_match_hints(&[], &["Priya".to_string()], &records);
        assert_eq!(hints.len(), 1);
        assert!(hints[0].contains("Anisha, Rohan"));

        assert!(no_match_hints(&[], &[], &records).is_empty());
    }
}
