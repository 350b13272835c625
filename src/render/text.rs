//! Plain-text charts: horizontal bars and day timelines.

use crate::models::chart::format_duration;
use crate::models::{ChartData, ChartKind};

use super::ChartSettings;

/// Widest bar, in cells.
const BAR_WIDTH: usize = 40;

/// Cells in a 24h timeline (one per half hour).
const TIMELINE_WIDTH: usize = 48;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Draw a chart as text, labelled per `settings.locale`.
pub fn draw(kind: ChartKind, data: &ChartData, settings: &ChartSettings) -> String {
    let mut output = format!("{}\n", kind.title());
    if data.is_empty() {
        output.push_str("  No presence data.\n");
        return output;
    }

    match data {
        ChartData::Bars(rows) => {
            let max = rows.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
            for (label, value) in rows {
                let cells = if max > 0.0 {
                    ((value / max) * BAR_WIDTH as f64).round() as usize
                } else {
                    0
                };
                output.push_str(&format!(
                    "  {:<6} {:<width$} {}\n",
                    weekday_label(label, &settings.locale),
                    "█".repeat(cells),
                    format_duration(*value),
                    width = BAR_WIDTH,
                ));
            }
        }
        ChartData::Spans(rows) => {
            for (label, start, end) in rows {
                let cell = |secs: u32| {
                    ((f64::from(secs) / SECONDS_PER_DAY) * TIMELINE_WIDTH as f64).round() as usize
                };
                let from = cell(start.seconds_since_midnight()).min(TIMELINE_WIDTH);
                let to = cell(end.seconds_since_midnight()).clamp(from, TIMELINE_WIDTH);
                let line: String = (0..TIMELINE_WIDTH)
                    .map(|i| if i >= from && i < to { '█' } else { '·' })
                    .collect();
                output.push_str(&format!(
                    "  {:<6} {} {} – {}\n",
                    weekday_label(label, &settings.locale),
                    line,
                    start,
                    end,
                ));
            }
        }
    }
    output
}

/// Translate the API's English weekday abbreviations.
pub fn weekday_label<'a>(label: &'a str, locale: &str) -> &'a str {
    if !locale.eq_ignore_ascii_case("pl") {
        return label;
    }
    match label {
        "Mon" => "pon",
        "Tue" => "wt",
        "Wed" => "śr",
        "Thu" => "czw",
        "Fri" => "pt",
        "Sat" => "sob",
        "Sun" => "niedz",
        other => other,
    }
}
