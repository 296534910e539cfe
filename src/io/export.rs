//! Export the monthly curve and meeting path to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::curve::{QualityThresholds, assess_quality};
use crate::domain::{MeetingExpectation, MonthlyRatePoint};
use crate::error::AppError;

/// Write the monthly curve to a CSV file.
pub fn write_monthly_csv(
    path: &Path,
    curve: &[MonthlyRatePoint],
    quality: &QualityThresholds,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_monthly(file, curve, quality)
}

/// Write the meeting path to a CSV file.
pub fn write_meetings_csv(path: &Path, meetings: &[MeetingExpectation]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_meetings(file, meetings)
}

fn row_err(e: csv::Error) -> AppError {
    AppError::new(4, format!("Failed to write export CSV row: {e}"))
}

fn write_monthly<W: Write>(out: W, curve: &[MonthlyRatePoint], quality: &QualityThresholds) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([
            "month",
            "rate",
            "synthetic",
            "symbol",
            "price",
            "volume",
            "open_interest",
            "bid_ask_spread_bp",
            "quality",
        ])
        .map_err(row_err)?;

    for p in curve {
        let q = p.source_quote.as_ref();
        writer
            .write_record([
                p.month.to_string(),
                format!("{:.4}", p.rate),
                p.is_synthetic.to_string(),
                q.map(|q| q.symbol.clone()).unwrap_or_default(),
                q.map(|q| format!("{:.4}", q.price)).unwrap_or_default(),
                q.map(|q| q.volume.to_string()).unwrap_or_default(),
                q.and_then(|q| q.open_interest).map(|v| v.to_string()).unwrap_or_default(),
                q.and_then(|q| q.bid_ask_spread_bp).map(|v| format!("{v:.2}")).unwrap_or_default(),
                q.map(|q| assess_quality(q, quality).label().to_string()).unwrap_or_default(),
            ])
            .map_err(row_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV: {e}")))
}

fn write_meetings<W: Write>(out: W, meetings: &[MeetingExpectation]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([
            "meeting_date",
            "month",
            "source_month",
            "rate_after",
            "rate_after_raw",
            "move_after_bp",
            "move_raw_bp",
            "weight_before",
            "weight_after",
            "adjustments",
        ])
        .map_err(row_err)?;

    for m in meetings {
        let adjustments = m.adjustments.iter().map(|a| a.label()).collect::<Vec<_>>().join(";");
        writer
            .write_record([
                m.meeting_date.to_string(),
                m.month.to_string(),
                m.source_month.to_string(),
                format!("{:.4}", m.rate_after),
                format!("{:.6}", m.rate_after_raw),
                format!("{:.2}", m.move_after_bp),
                format!("{:.2}", m.move_raw_bp),
                format!("{:.6}", m.weight_before),
                format!("{:.6}", m.weight_after),
                adjustments,
            ])
            .map_err(row_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Adjustment, FuturesQuote, YearMonth};
    use chrono::NaiveDate;

    #[test]
    fn monthly_rows_mark_synthetic_points() {
        let jan = YearMonth::new(2026, 1).unwrap();
        let curve = vec![
            MonthlyRatePoint {
                month: jan,
                rate: 3.9,
                source_quote: Some(FuturesQuote {
                    symbol: "ZQF26".to_string(),
                    month: jan,
                    price: 96.1,
                    volume: 1200,
                    open_interest: Some(5000),
                    bid_ask_spread_bp: None,
                }),
                is_synthetic: false,
            },
            MonthlyRatePoint {
                month: jan.next(),
                rate: 3.85,
                source_quote: None,
                is_synthetic: true,
            },
        ];

        let mut buf = Vec::new();
        write_monthly(&mut buf, &curve, &QualityThresholds::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2026-01,3.9000,false,ZQF26,96.1000,1200,5000,,high");
        assert_eq!(lines[2], "2026-02,3.8500,true,,,,,,");
    }

    #[test]
    fn symbols_with_delimiters_are_quoted() {
        let jan = YearMonth::new(2026, 1).unwrap();
        let curve = vec![MonthlyRatePoint {
            month: jan,
            rate: 3.9,
            source_quote: Some(FuturesQuote {
                symbol: "ZQ,F\"26".to_string(),
                month: jan,
                price: 96.1,
                volume: 10,
                open_interest: None,
                bid_ask_spread_bp: None,
            }),
            is_synthetic: false,
        }];

        let mut buf = Vec::new();
        write_monthly(&mut buf, &curve, &QualityThresholds::default()).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 9);
        assert_eq!(&rows[0][3], "ZQ,F\"26");
        assert_eq!(&rows[0][4], "96.1000");
    }

    #[test]
    fn meeting_rows_join_adjustments() {
        let month = YearMonth::new(2026, 1).unwrap();
        let meeting = MeetingExpectation {
            meeting_date: NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
            month,
            source_month: month.next(),
            rate_after_raw: 3.8,
            rate_after: 3.75,
            move_raw_bp: -20.0,
            move_after_bp: -25.0,
            weight_before: 27.0 / 31.0,
            weight_after: 4.0 / 31.0,
            adjustments: vec![Adjustment::MonthEnd, Adjustment::FollowingMonth],
        };

        let mut buf = Vec::new();
        write_meetings(&mut buf, &[meeting]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let row = text.lines().nth(1).unwrap();

        assert!(row.starts_with("2026-01-28,2026-01,2026-02,3.7500,3.800000,-25.00,-20.00,"));
        assert!(row.ends_with(",month_end;following_month"));
    }
}
