//! Sexagesimal (`dd:mm:ss.s`) conversions for RA hours and Dec degrees.

/// Parse `[-|+]dd[:mm[:ss.s]]` (colons or spaces) into a decimal value.
///
/// The sign applies to the whole value, so `-00:30:00` is `-0.5`.
pub fn parse_sexagesimal(text: &str) -> Option<f64> {
    let text = text.trim();
    let (sign, body) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text.strip_prefix('+').unwrap_or(text)),
    };

    let parts: Vec<&str> = body
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut value = 0.0;
    let mut scale = 1.0;
    for part in parts {
        let v: f64 = part.parse().ok()?;
        if !v.is_finite() || v < 0.0 {
            return None;
        }
        value += v / scale;
        scale *= 60.0;
    }
    Some(sign * value)
}

/// Format a decimal value as `sdd:mm:ss.s…` with `sec_decimals` digits.
///
/// Positive values get a leading `+` when `plus_sign` is set and a space
/// otherwise; negative values always get `-`. Seconds are rounded first so
/// they never print as `60`.
pub fn to_sexagesimal(value: f64, plus_sign: bool, sec_decimals: usize) -> String {
    let sign = if value < 0.0 {
        '-'
    } else if plus_sign {
        '+'
    } else {
        ' '
    };
    let scale = 10f64.powi(sec_decimals as i32);
    let total = (value.abs() * 3600.0 * scale).round() / scale;

    let whole = (total / 3600.0).floor();
    let minutes = ((total - whole * 3600.0) / 60.0).floor();
    let seconds = (total - whole * 3600.0 - minutes * 60.0).max(0.0);
    let width = if sec_decimals > 0 { sec_decimals + 3 } else { 2 };
    format!(
        "{}{:02}:{:02}:{:0width$.prec$}",
        sign,
        whole as u64,
        minutes as u64,
        seconds,
        width = width,
        prec = sec_decimals
    )
}
