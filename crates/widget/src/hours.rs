use {
    chatbubble_config::{Weekday, WorkingHoursConfig},
    chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike},
};

/// Decide whether the widget may appear at `now`.
///
/// A disabled policy is always available. Otherwise `now` must fall on an
/// allowed weekday (an empty day list allows every day) and inside the
/// inclusive `[start, end]` minute-of-day window.
///
/// A window whose end precedes its start never matches — there is no
/// overnight wraparound. Unparseable window bounds also never match.
///
/// Evaluated once at mount time; an already-mounted widget is not re-gated
/// while the page stays open.
pub fn is_available_now(policy: &WorkingHoursConfig, now: NaiveDateTime) -> bool {
    if !policy.enabled {
        return true;
    }

    if !policy.days.is_empty() && !policy.days.contains(&Weekday::from(now.weekday())) {
        return false;
    }

    let (Some(start), Some(end)) = (minute_of_day(&policy.start), minute_of_day(&policy.end))
    else {
        return false;
    };
    let current = now.hour() * 60 + now.minute();
    start <= current && current <= end
}

fn minute_of_day(hhmm: &str) -> Option<u32> {
    let t = NaiveTime::parse_from_str(hhmm, "%H:%M").ok()?;
    Some(t.hour() * 60 + t.minute())
}
