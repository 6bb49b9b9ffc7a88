use crate::constants::SCHEDULE_SETTINGS;

/// Formats fractional hours as `HH:MM`. A minute count that rounds up to 60
/// carries into the hour, so the end of the day prints as `24:00`.
pub fn format_hours(hours: f64) -> String {
    let hours = hours.clamp(0.0, SCHEDULE_SETTINGS.day_hours);
    let whole = hours.floor();
    let mut h = whole as u32;
    let mut m = ((hours - whole) * 60.0).round() as u32;
    if m == 60 {
        h += 1;
        m = 0;
    }
    format!("{:02}:{:02}", h, m)
}

pub fn parse_hours(raw: &str) -> Option<f64> {
    let (h_raw, m_raw) = raw.trim().split_once(':')?;
    if h_raw.is_empty() || m_raw.len() != 2 {
        return None;
    }

    let h: u32 = h_raw.parse().ok()?;
    let m: u32 = m_raw.parse().ok()?;
    let day = SCHEDULE_SETTINGS.day_hours as u32;

    if m >= 60 || h > day || (h == day && m != 0) {
        return None;
    }

    Some(h as f64 + m as f64 / 60.0)
}

pub fn format_duration(hours: f64) -> String {
    format!("{:.1}h", hours)
}
