//! Derived totals. Everything here is recomputed from the full session list;
//! nothing is updated incrementally.

use crate::record::parse_timestamp;
use crate::types::{Config, Session, StudyDocument};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// Recompute every derived field of `doc` as of `now`.
pub fn recompute(doc: &mut StudyDocument, now: DateTime<Utc>) {
    doc.metadata.total_sessions = doc.sessions.len() as u64;
    doc.metadata.total_minutes = doc.sessions.iter().map(Session::minutes).sum();
    doc.metadata.last_updated = Some(now.to_rfc3339());

    for (name, subject) in doc.subjects.iter_mut() {
        subject.total_minutes = doc
            .sessions
            .iter()
            .filter(|s| s.subject.as_deref() == Some(name.as_str()))
            .map(Session::minutes)
            .sum();
    }

    let tz = resolve_timezone(&doc.config);
    doc.analytics.weekly_minutes = Some(weekly_minutes(&doc.sessions, tz, now));
}

/// The configured zone, or UTC when it is missing or not a known IANA name.
pub fn resolve_timezone(config: &Config) -> Tz {
    match config.timezone.as_deref().map(str::parse::<Tz>) {
        Some(Ok(tz)) => tz,
        Some(Err(e)) => {
            log::debug!("Unknown timezone {:?}, using UTC: {}", config.timezone, e);
            Tz::UTC
        }
        None => Tz::UTC,
    }
}

/// Start of the most recent Monday in `tz`, as of `now`.
pub fn week_start(now: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    start_of_day(current_monday(now, tz), tz)
}

fn current_monday(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    let today = now.with_timezone(&tz).date_naive();
    today - Days::new(u64::from(today.weekday().num_days_from_monday()))
}

/// First instant of `date` in `tz`. Midnight may fall in a DST gap, in which
/// case the day starts at the first local time after the gap; an ambiguous
/// midnight resolves to its earlier instant.
fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    let mut local = midnight;
    // No zone has skipped more than a day.
    while local - midnight <= TimeDelta::days(2) {
        if let Some(start) = tz.from_local_datetime(&local).earliest() {
            return start;
        }
        local += TimeDelta::minutes(1);
    }
    tz.from_utc_datetime(&midnight)
}

/// Minutes per weekday (Monday first) for sessions inside the current week.
/// Sessions whose timestamp cannot be parsed are skipped.
pub fn weekly_minutes(sessions: &[Session], tz: Tz, now: DateTime<Utc>) -> [i64; 7] {
    let monday = current_monday(now, tz);
    let start = start_of_day(monday, tz);
    let end = start_of_day(monday + Days::new(7), tz);
    let mut buckets = [0i64; 7];
    for session in sessions {
        let Some(ts) = parse_timestamp(&session.timestamp) else {
            log::debug!(
                "Session #{} has unparseable timestamp {:?}",
                session.id,
                session.timestamp
            );
            continue;
        };
        let local = ts.with_timezone(&tz);
        if local >= start && local < end {
            buckets[local.weekday().num_days_from_monday() as usize] += session.minutes();
        }
    }
    buckets
}
