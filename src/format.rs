//! Display formatting helpers.
//!
//! Pure, locale-insensitive functions shared by the TUI widgets and the CLI
//! table printers.

/// Compact monetary formatting with fixed thresholds:
/// `$X.YB` at a billion and above, `$X.YM` at a million, `$XK` at a
/// thousand (no decimal), `$X` below that (no decimal).
pub fn format_amount(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("${:.0}K", value / 1e3)
    } else {
        format!("${value:.0}")
    }
}

/// One-decimal millions formatting used on chart axes (market share,
/// spending over time).
pub fn format_millions(value: f64) -> String {
    format!("${:.1}M", value / 1e6)
}

/// Whole-number percentage from a [0, 1] fraction.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Absent optional scalars render as an em-dash.
pub fn dash_opt(value: Option<&str>) -> &str {
    value.unwrap_or("—")
}

/// Thousands-grouped integer, e.g. `1,234,567`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
