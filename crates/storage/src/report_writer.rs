use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use common::models::{Analysis, HoldingEvaluation};
use csv::Writer;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("cannot prepare report directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

const WEEKLY_HEADER: [&str; 10] = [
    "ticker", "shares", "last", "sma50", "sma200", "rsi", "signal", "target", "stop", "reasons",
];

const MONTHLY_HEADER: [&str; 7] = ["ticker", "last", "sma50", "sma200", "rsi", "signal", "reasons"];

/// Writes one spreadsheet (CSV) per job run into the reports directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    reports_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    pub fn write_weekly(
        &self,
        evaluations: &[HoldingEvaluation],
        at: DateTime<FixedOffset>,
    ) -> Result<PathBuf, ExportError> {
        let rows = evaluations.iter().map(|e| {
            let a = &e.analysis;
            vec![
                a.symbol.clone(),
                e.holding.shares.to_string(),
                format!("{:.2}", a.snapshot.last),
                optional(a.snapshot.sma50),
                optional(a.snapshot.sma200),
                optional(a.snapshot.rsi),
                a.signal.kind.to_string(),
                format!("{:.2}", e.target),
                format!("{:.2}", e.stop),
                a.reasons_joined("; "),
            ]
        });
        self.write("weekly", at, &WEEKLY_HEADER, rows)
    }

    pub fn write_monthly(
        &self,
        picks: &[Analysis],
        at: DateTime<FixedOffset>,
    ) -> Result<PathBuf, ExportError> {
        let rows = picks.iter().map(|a| {
            vec![
                a.symbol.clone(),
                format!("{:.2}", a.snapshot.last),
                optional(a.snapshot.sma50),
                optional(a.snapshot.sma200),
                optional(a.snapshot.rsi),
                a.signal.kind.to_string(),
                a.reasons_joined("; "),
            ]
        });
        self.write("monthly", at, &MONTHLY_HEADER, rows)
    }

    fn write<I>(
        &self,
        kind: &str,
        at: DateTime<FixedOffset>,
        header: &[&str],
        rows: I,
    ) -> Result<PathBuf, ExportError>
    where
        I: Iterator<Item = Vec<String>>,
    {
        fs::create_dir_all(&self.reports_dir).map_err(|source| ExportError::Directory {
            path: self.reports_dir.clone(),
            source,
        })?;

        let path = self.reports_dir.join(report_file_name(kind, at));
        let mut writer = Writer::from_path(&path)?;
        writer.write_record(header)?;

        let mut count = 0;
        for row in rows {
            writer.write_record(&row)?;
            count += 1;
        }
        writer.flush()?;

        info!("Exported {} rows to {}", count, path.display());
        Ok(path)
    }
}

pub fn report_file_name(kind: &str, at: DateTime<FixedOffset>) -> String {
    format!("{}_{}.csv", kind, at.format("%Y%m%d_%H%M"))
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::models::{Holding, IndicatorSnapshot, Signal, SignalKind};

    fn at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(330 * 60)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 1, 18, 0, 0)
            .unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("advisor-reports-{}", std::process::id()))
            .join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn analysis(symbol: &str, last: f64, kind: SignalKind, reasons: &[&str]) -> Analysis {
        Analysis {
            symbol: symbol.to_string(),
            snapshot: IndicatorSnapshot {
                last,
                sma50: Some(last * 0.9),
                sma200: None,
                rsi: Some(28.123),
            },
            signal: Signal {
                kind,
                reasons: reasons.iter().map(|r| r.to_string()).collect(),
            },
        }
    }

    #[test]
    fn test_file_name_uses_local_minutes() {
        assert_eq!(report_file_name("weekly", at()), "weekly_20250601_1800.csv");
    }

    #[test]
    fn test_weekly_export_has_one_column_per_field() {
        let writer = ReportWriter::new(scratch_dir("weekly"));
        let evaluation = HoldingEvaluation {
            holding: Holding {
                ticker: "INFY".to_string(),
                shares: 7.5,
            },
            analysis: analysis(
                "INFY.NS",
                100.0,
                SignalKind::Buy,
                &["price below fast MA", "oversold (rsi<30)"],
            ),
            target: 125.0,
            stop: 90.0,
        };

        let path = writer.write_weekly(&[evaluation], at()).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert!(path.starts_with(writer.reports_dir()));
        assert_eq!(lines[0], "ticker,shares,last,sma50,sma200,rsi,signal,target,stop,reasons");
        assert_eq!(
            lines[1],
            "INFY.NS,7.5,100.00,90.00,,28.12,BUY,125.00,90.00,price below fast MA; oversold (rsi<30)"
        );
    }

    #[test]
    fn test_monthly_export_without_picks_keeps_header() {
        let writer = ReportWriter::new(scratch_dir("monthly"));
        let path = writer.write_monthly(&[], at()).unwrap();
        let contents = fs::read_to_string(path).unwrap();
        assert_eq!(contents.trim_end(), "ticker,last,sma50,sma200,rsi,signal,reasons");
    }
}
