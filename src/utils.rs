use crate::errors::SiteError;
use crate::scheduler::{Scheduler, TimerHandle};
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::{sync::Arc, time::Duration};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Trailing-edge debounce: runs with the latest arguments once `wait` passes quietly.
pub struct Debounced<A> {
    func: Arc<dyn Fn(A) + Send + Sync>,
    wait: Duration,
    scheduler: Scheduler,
    pending: Arc<Mutex<Option<TimerHandle>>>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            wait: self.wait,
            scheduler: self.scheduler.clone(),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<A: Send + 'static> Debounced<A> {
    pub fn call(&self, args: A) {
        let func = Arc::clone(&self.func);
        let mut pending = self.pending.lock();
        if let Some(timer) = pending.take() {
            timer.cancel();
        }
        *pending = Some(self.scheduler.set_timeout(self.wait, move || func(args)));
    }

    pub fn cancel(&self) {
        if let Some(timer) = self.pending.lock().take() {
            timer.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

pub fn debounce<A, F>(scheduler: &Scheduler, func: F, wait: Duration) -> Debounced<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced {
        func: Arc::new(func),
        wait,
        scheduler: scheduler.clone(),
        pending: Arc::new(Mutex::new(None)),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(input: &str) -> Result<NaiveDate, SiteError> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.date_naive())
        .map_err(|_| SiteError::invalid_input(format!("unrecognized date: {input}")))
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn format_grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Leading integer of `input`: optional sign then digits, anything after ignored.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time;

    #[test]
    fn validate_email_matches_simple_pattern() {
        assert!(validate_email("a@b.co"));
        assert!(validate_email("first.last@mail.example.org"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a b@c.co"));
        assert!(!validate_email("a@@b.co"));
        assert!(!validate_email(""));
    }

    #[test]
    fn format_date_uses_long_month() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(format_date(date), "January 1, 2024");
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(format_date(date), "October 18, 2026");
    }

    #[test]
    fn parse_date_accepts_plain_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09").unwrap(), expected);
        assert_eq!(parse_date("2024-03-09T10:00:00Z").unwrap(), expected);
        assert!(parse_date("March 9th").is_err());
    }

    #[test]
    fn format_grouped_inserts_commas() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1000), "1,000");
        assert_eq!(format_grouped(1234567), "1,234,567");
        assert_eq!(format_grouped(-15000), "-15,000");
    }

    #[test]
    fn parse_int_prefix_reads_leading_digits() {
        assert_eq!(parse_int_prefix("42"), Some(42));
        assert_eq!(parse_int_prefix("  12abc"), Some(12));
        assert_eq!(parse_int_prefix("-7"), Some(-7));
        assert_eq!(parse_int_prefix("1,000"), Some(1));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_runs_once_with_last_args() {
        let scheduler = Scheduler::current().expect("runtime");
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let debounced = debounce(
            &scheduler,
            move |value: u32| sink.lock().push((value, time::Instant::now())),
            Duration::from_millis(200),
        );
        let start = time::Instant::now();

        debounced.call(1);
        time::sleep(Duration::from_millis(50)).await;
        debounced.call(2);
        time::sleep(Duration::from_millis(50)).await;
        debounced.call(3);
        assert!(debounced.is_pending());

        time::sleep(Duration::from_millis(199)).await;
        assert!(calls.lock().is_empty());

        time::sleep(Duration::from_millis(500)).await;
        let calls = calls.lock().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 3);
        let fired_after = calls[0].1 - start;
        assert!(fired_after >= Duration::from_millis(300));
        assert!(fired_after < Duration::from_millis(302));
        assert!(!debounced.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_debounce_never_fires() {
        let scheduler = Scheduler::current().expect("runtime");
        let calls = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&calls);
        let debounced = debounce(
            &scheduler,
            move |_: ()| *sink.lock() += 1,
            Duration::from_millis(10),
        );

        debounced.call(());
        debounced.cancel();
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*calls.lock(), 0);
    }
}
