use std::time::Duration;

use tracing::error;

/// Log-and-forget for message sends whose failure should not abort the
/// surrounding command.
pub fn check_msg<T, E: std::fmt::Debug>(result: Result<T, E>) {
    if let Err(why) = result {
        error!("Error sending message: {:?}", why);
    }
}

pub fn bold(s: impl AsRef<str>) -> String {
    format!("**{}**", s.as_ref())
}

pub fn hyperlink(text: impl AsRef<str>, url: impl AsRef<str>) -> String {
    format!("[{}]({})", text.as_ref(), url.as_ref())
}

/// `MM:SS`, minutes unbounded.
pub fn format_time(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero() {
        assert_eq!(format_time(Duration::ZERO), "00:00");
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(Duration::from_secs(61)), "01:01");
        assert_eq!(format_time(Duration::from_secs(3599)), "59:59");
    }

    #[test]
    fn long_durations_keep_counting_minutes() {
        assert_eq!(format_time(Duration::from_secs(2 * 3600 + 30)), "120:30");
    }

    #[test]
    fn markdown_helpers() {
        assert_eq!(bold("hi"), "**hi**");
        assert_eq!(hyperlink("a", "https://b"), "[a](https://b)");
    }
}
