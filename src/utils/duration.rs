// Duration parsing for CLI arguments

use anyhow::Result;

/// Parse a duration such as `30s`, `10m`, `2h` or `1d2h30m` into seconds
pub fn parse_duration(expr: &str) -> Result<i64> {
    let expr = expr.trim();
    if expr.is_empty() {
        anyhow::bail!("Duration cannot be empty");
    }

    let mut total_secs = 0i64;
    let mut digits = String::new();
    for c in expr.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            'd' => 86400,
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => anyhow::bail!("Invalid duration format: {}", expr),
        };
        let value: i64 = digits.parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration format: {}", expr))?;
        total_secs = value
            .checked_mul(unit)
            .and_then(|v| total_secs.checked_add(v))
            .ok_or_else(|| anyhow::anyhow!("Duration too large: {}", expr))?;
        digits.clear();
    }

    if !digits.is_empty() {
        anyhow::bail!("Invalid duration format: {} (missing unit after {})", expr, digits);
    }
    Ok(total_secs)
}

/// Time spent on an item: plain seconds or a duration expression
pub fn parse_time_spent(expr: &str) -> Result<i64> {
    match expr.trim().parse::<i64>() {
        Ok(secs) if secs >= 0 => Ok(secs),
        Ok(_) => anyhow::bail!("Time spent cannot be negative"),
        Err(_) => parse_duration(expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s").unwrap(), 30);
        assert_eq!(parse_duration("10m").unwrap(), 600);
        assert_eq!(parse_duration("2h").unwrap(), 7200);
        assert_eq!(parse_duration("1h30m").unwrap(), 5400);
        assert_eq!(parse_duration("1d1s").unwrap(), 86401);
        assert!(parse_duration("90").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("5w").is_err());
    }

    #[test]
    fn test_parse_time_spent() {
        assert_eq!(parse_time_spent("0").unwrap(), 0);
        assert_eq!(parse_time_spent("125").unwrap(), 125);
        assert_eq!(parse_time_spent("2m5s").unwrap(), 125);
        assert!(parse_time_spent("-5").is_err());
    }
}
