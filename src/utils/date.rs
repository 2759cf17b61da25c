// Date expression parsing for CLI arguments

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use anyhow::Result;

fn local_timestamp(datetime: &NaiveDateTime) -> Result<i64> {
    let local_dt = Local.from_local_datetime(datetime)
        .single()
        .ok_or_else(|| anyhow::anyhow!("Ambiguous local time: {}", datetime))?;
    Ok(local_dt.timestamp())
}

/// Parse a date expression and return a Unix timestamp.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM`, a raw timestamp in seconds,
/// `now`, `today` and `tomorrow`.
pub fn parse_date_expr(expr: &str) -> Result<i64> {
    let expr = expr.trim();

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        let datetime = date.and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid date: {}", expr))?;
        return local_timestamp(&datetime);
    }

    if let Ok(datetime) = NaiveDateTime::parse_from_str(expr, "%Y-%m-%dT%H:%M") {
        return local_timestamp(&datetime);
    }

    if let Ok(ts) = expr.parse::<i64>() {
        return Ok(ts);
    }

    let now = Local::now();
    let day = match expr {
        "now" => return Ok(now.timestamp()),
        "today" => now.date_naive(),
        "tomorrow" => now.date_naive() + chrono::Duration::days(1),
        _ => anyhow::bail!(
            "Unsupported date expression: '{}'. Use YYYY-MM-DD, YYYY-MM-DDTHH:MM, now, today or tomorrow",
            expr
        ),
    };
    let midnight = day.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date: {}", expr))?;
    local_timestamp(&midnight)
}
