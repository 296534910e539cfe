//! Plain-text tables for the console report.

use crate::domain::{MeetingExpectation, MeetingSummary, MonthlyRatePoint, RunFile};
use crate::io::ingest::IngestedQuotes;

const MAX_ROW_ERRORS: usize = 5;

/// Format the full run report (header + curve + meetings + next-meeting summary).
pub fn format_run_report(run: &RunFile) -> String {
    let mut out = String::new();

    let name = if run.bank_name.is_empty() { &run.bank } else { &run.bank_name };
    out.push_str(&format!("=== ipath - Implied Policy Path: {name} ({}) ===\n", run.bank));
    out.push_str(&format!("As-of: {}\n", run.asof_date));
    out.push_str(&format!(
        "Current rate: {:.4}% | grid step: {}bp\n",
        run.current_rate, run.increment_bp
    ));
    out.push('\n');

    out.push_str("Monthly curve:\n");
    out.push_str(&format_monthly_table(&run.monthly));
    out.push('\n');

    out.push_str("Meeting path:\n");
    out.push_str(&format_meetings_table(&run.meetings));
    out.push('\n');

    match &run.summary {
        Some(summary) => out.push_str(&format_summary(summary)),
        None => out.push_str("Next meeting: no upcoming meeting with curve coverage.\n"),
    }

    out
}

/// Ingest counters plus the first few row errors.
pub fn format_ingest_summary(ingested: &IngestedQuotes) -> String {
    let mut out = format!(
        "Quotes: read={} used={} errors={} below-quality={}\n",
        ingested.rows_read,
        ingested.rows_used(),
        ingested.row_errors.len(),
        ingested.rows_filtered,
    );
    for e in ingested.row_errors.iter().take(MAX_ROW_ERRORS) {
        match &e.symbol {
            Some(sym) => out.push_str(&format!("  line {} ({sym}): {}\n", e.line, e.message)),
            None => out.push_str(&format!("  line {}: {}\n", e.line, e.message)),
        }
    }
    if ingested.row_errors.len() > MAX_ROW_ERRORS {
        out.push_str(&format!("  ... {} more\n", ingested.row_errors.len() - MAX_ROW_ERRORS));
    }
    out
}

pub fn format_monthly_table(curve: &[MonthlyRatePoint]) -> String {
    let mut out = String::new();
    push_row(&mut out, format!("{:<8} {:>8} {:<8} {:>10} {:>10}", "month", "rate", "symbol", "price", "volume"));
    push_row(&mut out, format!("{:-<8} {:-<8} {:-<8} {:-<10} {:-<10}", "", "", "", "", ""));

    for p in curve {
        let row = match &p.source_quote {
            Some(q) => format!(
                "{:<8} {:>8.4} {:<8} {:>10.4} {:>10}",
                p.month.to_string(),
                p.rate,
                truncate(&q.symbol, 8),
                q.price,
                q.volume
            ),
            None => format!(
                "{:<8} {:>8.4} {:<8}",
                p.month.to_string(),
                p.rate,
                if p.is_synthetic { "(interp)" } else { "" }
            ),
        };
        push_row(&mut out, row);
    }

    out
}

pub fn format_meetings_table(meetings: &[MeetingExpectation]) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        format!(
            "{:<10} {:>10} {:>8} {:>10} {:>8} {}",
            "meeting", "rate_after", "move_bp", "raw", "raw_bp", "adjustments"
        ),
    );
    push_row(
        &mut out,
        format!("{:-<10} {:-<10} {:-<8} {:-<10} {:-<8} {:-<11}", "", "", "", "", "", ""),
    );

    for m in meetings {
        let adjustments = m.adjustments.iter().map(|a| a.label()).collect::<Vec<_>>().join(",");
        push_row(
            &mut out,
            format!(
                "{:<10} {:>10.4} {:>+8.0} {:>10.4} {:>+8.1} {}",
                m.meeting_date.to_string(),
                m.rate_after,
                m.move_after_bp,
                m.rate_after_raw,
                m.move_raw_bp,
                adjustments
            ),
        );
    }

    out
}

/// Next-meeting block: expected move, cut/hold/hike and the top two outcomes.
pub fn format_summary(summary: &MeetingSummary) -> String {
    let mut out = String::new();
    let p = &summary.probabilities;

    out.push_str(&format!("Next meeting: {}\n", summary.meeting.meeting_date));
    out.push_str(&format!(
        "- expected rate after: {:.4}% ({:+.2}bp vs {:.4}%)\n",
        summary.expected_rate_after_raw, summary.expected_move_bp, summary.current_rate
    ));
    out.push_str(&format!(
        "- cut {:.1}% | hold {:.1}% | hike {:.1}%\n",
        p.cut * 100.0,
        p.hold * 100.0,
        p.hike * 100.0
    ));

    let main = summary.scenarios.main;
    out.push_str(&format!("- main: {:.4}% ({:.1}%)\n", main.rate, main.probability * 100.0));
    if let Some(alt) = summary.scenarios.alt {
        out.push_str(&format!("- alt : {:.4}% ({:.1}%)\n", alt.rate, alt.probability * 100.0));
    }

    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Adjustment, FuturesQuote, YearMonth};
    use crate::io::ingest::RowError;
    use crate::scenario::build_summary;
    use chrono::NaiveDate;

    fn meeting() -> MeetingExpectation {
        let jan = YearMonth::new(2026, 1).unwrap();
        MeetingExpectation {
            meeting_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            month: jan,
            source_month: jan,
            rate_after_raw: 3.8,
            rate_after: 3.75,
            move_raw_bp: -20.0,
            move_after_bp: -25.0,
            weight_before: 14.0 / 31.0,
            weight_after: 17.0 / 31.0,
            adjustments: vec![Adjustment::FollowingMonth],
        }
    }

    #[test]
    fn meetings_table_layout() {
        let table = format_meetings_table(&[meeting()]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("meeting"));
        assert_eq!(lines[2], "2026-01-15     3.7500      -25     3.8000    -20.0 following_month");
    }

    #[test]
    fn monthly_table_marks_interpolated_points() {
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
                    open_interest: None,
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
        let table = format_monthly_table(&curve);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[2], "2026-01    3.9000 ZQF26       96.1000       1200");
        assert_eq!(lines[3], "2026-02    3.8500 (interp)");
    }

    #[test]
    fn summary_block_shows_probabilities() {
        let summary = build_summary(&[meeting()], 4.0, 25, 0.0, 10.0).unwrap().unwrap();
        let text = format_summary(&summary);
        assert!(text.contains("Next meeting: 2026-01-15"));
        assert!(text.contains("cut 80.0% | hold 20.0% | hike 0.0%"));
        assert!(text.contains("- main: 3.7500% (80.0%)"));
        assert!(text.contains("- alt : 4.0000% (20.0%)"));
    }

    #[test]
    fn ingest_summary_caps_row_errors() {
        let ingested = IngestedQuotes {
            row_errors: (0..7)
                .map(|i| RowError {
                    line: i + 2,
                    symbol: None,
                    message: "Missing/invalid price.".to_string(),
                })
                .collect(),
            rows_read: 9,
            ..Default::default()
        };
        let text = format_ingest_summary(&ingested);
        assert!(text.starts_with("Quotes: read=9 used=0 errors=7 below-quality=0"));
        assert!(text.contains("  line 2: Missing/invalid price."));
        assert!(text.ends_with("  ... 2 more\n"));
    }
}
