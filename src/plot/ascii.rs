//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - monthly curve: `-` line through the mid-month points
//! - quoted months: `o`, interpolated months: `+`
//! - rate after each meeting: `*`

use chrono::Datelike;

use crate::domain::{MeetingExpectation, MonthlyRatePoint, RunFile, YearMonth};

/// Render the monthly curve and meeting path of a run.
pub fn render_run_plot(run: &RunFile, width: usize, height: usize) -> String {
    render_plot(&run.monthly, &run.meetings, width, height)
}

pub fn render_plot(
    monthly: &[MonthlyRatePoint],
    meetings: &[MeetingExpectation],
    width: usize,
    height: usize,
) -> String {
    let (Some(first), Some(last)) = (monthly.first(), monthly.last()) else {
        return "Plot: no monthly data\n".to_string();
    };

    let width = width.max(10);
    let height = height.max(5);

    let curve: Vec<(f64, f64)> = monthly.iter().map(|p| (month_x(p.month), p.rate)).collect();
    let marks: Vec<(f64, f64)> = meetings.iter().map(|m| (meeting_x(m), m.rate_after)).collect();

    let (x_min, x_max) = x_range(curve.iter().chain(&marks)).unwrap_or((month_x(first.month), month_x(first.month) + 1.0));
    let (y_min, y_max) = y_range(curve.iter().chain(&marks)).unwrap_or((first.rate - 0.5, first.rate + 0.5));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so markers can overlay).
    draw_curve(&mut grid, &curve, x_min, x_max, y_min, y_max);

    for &(x, y) in &marks {
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = '*';
    }

    for (p, &(x, y)) in monthly.iter().zip(&curve) {
        let ch = if p.is_synthetic { '+' } else { 'o' };
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = ch;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: months=[{}, {}] | rate=[{y_min:.4}, {y_max:.4}]%\n",
        first.month, last.month
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Monthly averages sit at mid-month.
fn month_x(month: YearMonth) -> f64 {
    month.index() as f64 + 0.5
}

fn meeting_x(m: &MeetingExpectation) -> f64 {
    let dim = f64::from(m.month.days_in_month());
    m.month.index() as f64 + f64::from(m.meeting_date.day() - 1) / dim
}

fn x_range<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<(f64, f64)> {
    let (min, max) = points.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
    if min.is_finite() && max.is_finite() && max > min { Some((min, max)) } else { None }
}

fn y_range<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<(f64, f64)> {
    let (min, max) = points.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    if min.is_finite() && max.is_finite() && max > min { Some((min, max)) } else { None }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let xx = map_x(x, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, xx, yy, '-');
        }
        prev = Some((xx, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(month: &str, rate: f64, synthetic: bool) -> MonthlyRatePoint {
        MonthlyRatePoint {
            month: month.parse().unwrap(),
            rate,
            source_quote: None,
            is_synthetic: synthetic,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let monthly = vec![point("2026-01", 4.0, false), point("2026-02", 3.5, false)];

        let txt = render_plot(&monthly, &[], 10, 5);
        let expected = concat!(
            "Plot: months=[2026-01, 2026-02] | rate=[3.4750, 4.0250]%\n",
            "o-        \n",
            "  --      \n",
            "    --    \n",
            "      --  \n",
            "        -o\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn meetings_and_synthetic_points_are_marked() {
        let monthly = vec![
            point("2026-01", 4.0, false),
            point("2026-02", 3.75, true),
            point("2026-03", 3.5, false),
        ];
        let month = "2026-01".parse().unwrap();
        let meeting = MeetingExpectation {
            meeting_date: NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
            month,
            source_month: month,
            rate_after_raw: 3.5,
            rate_after: 3.5,
            move_raw_bp: -50.0,
            move_after_bp: -50.0,
            weight_before: 27.0 / 31.0,
            weight_after: 4.0 / 31.0,
            adjustments: Vec::new(),
        };

        let txt = render_plot(&monthly, &[meeting], 40, 10);
        let body: String = txt.lines().skip(1).collect();
        assert_eq!(body.matches('*').count(), 1);
        assert_eq!(body.matches('+').count(), 1);
        assert_eq!(body.matches('o').count(), 2);
    }

    #[test]
    fn empty_curve_renders_placeholder() {
        assert_eq!(render_plot(&[], &[], 10, 5), "Plot: no monthly data\n");
    }
}
