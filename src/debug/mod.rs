//! Debug bundle writer for inspecting quote inputs and the meeting back-solve.
//!
//! One markdown file per bank run: ingest counters and row errors, every
//! quote with its liquidity tier, the monthly curve, the per-meeting weights
//! and substitutions, and the next-meeting distribution.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::{BankRun, RateSource};
use crate::curve::assess_quality;
use crate::domain::{FuturesQuote, YearMonth};
use crate::error::AppError;

/// Write the bundle under `dir` and return its path.
pub fn write_debug_bundle(run: &BankRun, dir: &Path) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!(
        "ipath_debug_{}_{}_{ts}.md",
        run.config.bank.code.to_lowercase(),
        run.asof.format("%Y%m%d"),
    ));

    let text = render_debug_markdown(run).map_err(|e| AppError::new(4, format!("Failed to render debug bundle: {e}")))?;

    let mut file = File::create(&path).map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    file.write_all(text.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug file: {e}")))?;

    tracing::info!(path = %path.display(), "wrote debug bundle");
    Ok(path)
}

pub fn render_debug_markdown(run: &BankRun) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let cfg = &run.config;

    writeln!(out, "# ipath debug bundle: {}", cfg.display_name())?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(out, "- asof_date: {}", run.asof)?;
    match &run.rate_source {
        RateSource::Config => writeln!(out, "- current_rate: {:.4} (config)", run.current_rate)?,
        RateSource::Fred { series, date } => {
            writeln!(out, "- current_rate: {:.4} (FRED {series} @ {date})", run.current_rate)?
        }
    }
    writeln!(
        out,
        "- policy: increment={}bp, bounds=[{:.2}, {:.2}]",
        cfg.policy.increment_bp, cfg.policy.min_rate, cfg.policy.max_rate
    )?;
    writeln!(
        out,
        "- futures: root={:?}, formula={}, densify={}",
        cfg.futures.symbol_root,
        cfg.futures.price_formula.name(),
        cfg.futures.densify
    )?;
    writeln!(
        out,
        "- guards: min_days_after={}, max_move_bp={:.1}, clamp_pp={:.2}",
        cfg.guards.min_days_after, cfg.guards.max_move_bp, cfg.guards.clamp_pp
    )?;

    let ingest = &run.ingest;
    writeln!(out, "\n## Ingest")?;
    writeln!(
        out,
        "rows_read={} rows_used={} row_errors={} below_quality={}",
        ingest.rows_read,
        ingest.rows_used(),
        ingest.row_errors.len(),
        ingest.rows_filtered
    )?;
    for e in &ingest.row_errors {
        writeln!(
            out,
            "- line {} [{}]: {}",
            e.line,
            e.symbol.as_deref().unwrap_or("-"),
            e.message
        )?;
    }

    writeln!(out, "\n## Quotes")?;
    writeln!(out, "| month | symbol | price | volume | open_int | spread_bp | tier | chosen |")?;
    writeln!(out, "| - | - | - | - | - | - | - | - |")?;
    let chosen = chosen_quotes(run);
    let mut quotes: Vec<&FuturesQuote> = ingest.quotes.iter().collect();
    quotes.sort_by(|a, b| a.month.cmp(&b.month).then(b.volume.cmp(&a.volume)));
    for q in quotes {
        let is_chosen = chosen.get(&q.month).is_some_and(|c| *c == q);
        writeln!(
            out,
            "| {} | {} | {:.4} | {} | {} | {} | {} | {} |",
            q.month,
            q.symbol,
            q.price,
            q.volume,
            fmt_opt_u64(q.open_interest),
            fmt_opt(q.bid_ask_spread_bp),
            assess_quality(q, &cfg.quality).label(),
            if is_chosen { "yes" } else { "" }
        )?;
    }

    writeln!(out, "\n## Monthly curve")?;
    writeln!(out, "| month | rate | synthetic |")?;
    writeln!(out, "| - | - | - |")?;
    for p in &run.monthly {
        writeln!(out, "| {} | {:.4} | {} |", p.month, p.rate, p.is_synthetic)?;
    }

    writeln!(out, "\n## Meetings")?;
    if !run.past_meetings.is_empty() {
        let past: Vec<String> = run.past_meetings.iter().map(|d| d.to_string()).collect();
        writeln!(out, "Before as-of (ignored): {}", past.join(", "))?;
    }
    writeln!(
        out,
        "| date | source_month | w_before | w_after | raw | rate_after | move_bp | adjustments |"
    )?;
    writeln!(out, "| - | - | - | - | - | - | - | - |")?;
    for m in &run.meetings {
        let adjustments: Vec<&str> = m.adjustments.iter().map(|a| a.label()).collect();
        writeln!(
            out,
            "| {} | {} | {:.6} | {:.6} | {:.6} | {:.4} | {:+.1} | {} |",
            m.meeting_date,
            m.source_month,
            m.weight_before,
            m.weight_after,
            m.rate_after_raw,
            m.rate_after,
            m.move_after_bp,
            adjustments.join(", ")
        )?;
    }

    writeln!(out, "\n## Next meeting distribution")?;
    match &run.summary {
        Some(summary) => {
            writeln!(out, "| rate | probability |")?;
            writeln!(out, "| - | - |")?;
            for level in &summary.distribution.levels {
                writeln!(out, "| {:.4} | {:.6} |", level.rate, level.probability)?;
            }
            let p = &summary.probabilities;
            writeln!(out, "\ncut={:.6} hold={:.6} hike={:.6}", p.cut, p.hold, p.hike)?;
        }
        None => writeln!(out, "(none)")?,
    }

    Ok(out)
}

/// The quote the curve builder kept for each month.
fn chosen_quotes(run: &BankRun) -> BTreeMap<YearMonth, &FuturesQuote> {
    run.monthly
        .iter()
        .filter_map(|p| p.source_quote.as_ref().map(|q| (p.month, q)))
        .collect()
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "-".to_string(),
    }
}

fn fmt_opt_u64(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
