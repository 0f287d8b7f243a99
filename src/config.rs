use std::{io::BufRead, time::Duration};

use reqwest::Url;

use crate::error::{Error, Result};

pub static TIMEOUT_ENV_VAR: &str = "WB_TIMEOUT";
pub static ARCHIVE_URL_ENV_VAR: &str = "WB_ARCHIVE_URL";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// What to do with the captures of each URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Print one line per capture.
    ListSnapshots,
    /// Print the content of every capture, oldest first.
    FetchAll,
    /// Print the content of one capture: the one at `date` if it exists,
    /// otherwise the latest.
    FetchSelected { date: Option<String> },
}

impl Mode {
    /// Resolves the command-line toggles. Listing wins over fetching
    /// everything, which wins over fetching a single capture.
    #[must_use]
    pub fn from_flags(snapshots: bool, all: bool, date: Option<String>) -> Self {
        let mode = if snapshots {
            Self::ListSnapshots
        } else if all {
            Self::FetchAll
        } else {
            return Self::FetchSelected { date };
        };
        if let Some(date) = date {
            log::warn!("ignoring --date {} because another mode was requested", date);
        }
        mode
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub urls: Vec<String>,
    pub timeout: Duration,
    pub mode: Mode,
    pub archive_url: Url,
}

impl Config {
    /// Whether each URL's output is preceded by a separator line.
    #[must_use]
    pub fn show_separators(&self) -> bool {
        self.urls.len() > 1
    }
}

/// Reads one URL per line until end of input. Surrounding whitespace is
/// trimmed and blank lines are skipped. Invalid UTF-8 is replaced rather
/// than rejected.
///
/// # Errors
///
/// Fails if `input` cannot be read.
pub fn read_urls(mut input: impl BufRead) -> Result<Vec<String>> {
    let mut urls = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line).map_err(Error::Stdin)? == 0 {
            break;
        }
        let url = String::from_utf8_lossy(&line);
        let url = url.trim();
        if !url.is_empty() {
            urls.push(url.to_owned());
        }
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{self, Cursor, Read};

    #[test]
    fn test_mode_from_flags_when_nothing_set_returns_fetch_latest() {
        assert_eq!(
            Mode::from_flags(false, false, None),
            Mode::FetchSelected { date: None }
        );
    }

    #[test]
    fn test_mode_from_flags_when_date_set_returns_fetch_selected_date() {
        assert_eq!(
            Mode::from_flags(false, false, Some("20200101000000".into())),
            Mode::FetchSelected {
                date: Some("20200101000000".into())
            }
        );
    }

    #[test]
    fn test_mode_from_flags_when_snapshots_and_all_set_returns_list() {
        assert_eq!(
            Mode::from_flags(true, true, Some("20200101000000".into())),
            Mode::ListSnapshots
        );
    }

    #[test]
    fn test_mode_from_flags_when_all_and_date_set_returns_fetch_all() {
        assert_eq!(
            Mode::from_flags(false, true, Some("20200101000000".into())),
            Mode::FetchAll
        );
    }

    #[test]
    fn test_read_urls_preserves_order_and_skips_blank_lines() {
        let input = Cursor::new("http://a\n\n  http://b  \r\nhttp://c");
        assert_eq!(
            read_urls(input).unwrap(),
            vec!["http://a", "http://b", "http://c"]
        );
    }

    #[test]
    fn test_read_urls_when_line_is_not_utf8_keeps_reading() {
        let input = Cursor::new(b"http://a/\xff\nhttp://b\n".to_vec());
        assert_eq!(
            read_urls(input).unwrap(),
            vec!["http://a/\u{fffd}", "http://b"]
        );
    }

    #[test]
    fn test_read_urls_when_input_empty_returns_no_urls() {
        assert!(read_urls(Cursor::new("")).unwrap().is_empty());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "stdin closed"))
        }
    }

    #[test]
    fn test_read_urls_when_read_fails_returns_stdin_error() {
        let err = read_urls(io::BufReader::new(FailingReader)).unwrap_err();
        assert!(matches!(err, Error::Stdin(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_show_separators_only_for_multiple_urls() {
        let mut config = Config {
            urls: vec!["http://a".into()],
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            mode: Mode::ListSnapshots,
            archive_url: Url::parse("https://web.archive.org").unwrap(),
        };
        assert!(!config.show_separators());
        config.urls.push("http://b".into());
        assert!(config.show_separators());
    }
}
