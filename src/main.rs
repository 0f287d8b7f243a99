//! Prints archived captures of URLs from the
//! [Wayback Machine](https://web.archive.org).

#![warn(
    clippy::all,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]

use std::{
    env,
    ffi::OsString,
    io::{self, BufRead, Write},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{ErrorKind, Parser};
use env_logger::Env;
use reqwest::Url;
use wb::{
    config::{self, Config, Mode, ARCHIVE_URL_ENV_VAR, TIMEOUT_ENV_VAR},
    output,
    wayback::{WaybackClient, DEFAULT_ARCHIVE_URL},
};

#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Prints archived snapshots of a URL from the Wayback Machine.",
    after_help = "When no URL is given, URLs are read from stdin, one per line."
)]
struct CLIArgs {
    /// URL to look up.
    #[clap(name = "URL", conflicts_with = "url_option")]
    url: Option<String>,
    /// URL to look up, same as the positional argument.
    #[clap(short = 'u', long = "url", name = "url_option", value_name = "URL")]
    url_option: Option<String>,
    /// Per-request timeout.
    #[clap(
        short,
        long,
        env = TIMEOUT_ENV_VAR,
        default_value_t = config::DEFAULT_TIMEOUT_SECS,
        value_name = "SECONDS"
    )]
    timeout: u64,
    /// Lists all snapshots instead of fetching content.
    #[clap(short, long)]
    snapshots: bool,
    /// Fetches the snapshot taken at this YYYYMMDDHHMMSS timestamp. Falls
    /// back to the latest snapshot if there is none.
    #[clap(short, long, value_name = "TIMESTAMP")]
    date: Option<String>,
    /// Fetches every snapshot, oldest first.
    #[clap(short, long)]
    all: bool,
    /// Hides the banner.
    #[clap(long)]
    no_banner: bool,
    /// Base URL of the archive.
    #[clap(long, env = ARCHIVE_URL_ENV_VAR, default_value = DEFAULT_ARCHIVE_URL)]
    archive_url: Url,
    /// Shows trace messages, including HTTP connection data.
    #[clap(long)]
    trace: bool,
}

fn write_banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "🪄 wb / v{}\n----", env!("CARGO_PKG_VERSION"))
}

/// Whether `--no-banner` appears among `args` (program name first), before
/// any `--` terminator.
fn banner_suppressed(args: impl IntoIterator<Item = OsString>) -> bool {
    args.into_iter()
        .skip(1)
        .take_while(|arg| arg != "--")
        .any(|arg| arg == "--no-banner")
}

/// Parses the command line. Help and version output is preceded by the
/// banner unless `--no-banner` was passed; other usage errors exit without it.
fn parse_args() -> CLIArgs {
    CLIArgs::try_parse().unwrap_or_else(|e| {
        if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
            && !banner_suppressed(env::args_os())
        {
            let mut stdout = io::stdout();
            // clap exits right after, so a failed banner write has nowhere to go.
            let _ = write_banner(&mut stdout).and_then(|()| stdout.flush());
        }
        e.exit()
    })
}

/// Builds the run configuration, reading URLs from `stdin` only when none
/// was given on the command line.
fn resolve_config(args: CLIArgs, stdin: impl BufRead) -> wb::error::Result<Config> {
    let urls = match args.url.or(args.url_option) {
        Some(url) => vec![url],
        None => config::read_urls(stdin)?,
    };
    if urls.is_empty() {
        log::warn!("no URLs given");
    }

    Ok(Config {
        urls,
        timeout: Duration::from_secs(args.timeout),
        mode: Mode::from_flags(args.snapshots, args.all, args.date),
        archive_url: args.archive_url,
    })
}

async fn try_main() -> Result<()> {
    let args = parse_args();
    let trace = args.trace;

    let default_log_level = if trace { "trace" } else { "info" };
    let mut log_builder =
        env_logger::Builder::from_env(Env::default().default_filter_or(default_log_level));
    if trace {
        log_builder.filter_module("reqwest", log::LevelFilter::Trace);
    }
    log_builder.init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !args.no_banner {
        write_banner(&mut out)?;
    }

    let config = resolve_config(args, io::stdin().lock())?;
    let http_client =
        wb::build_client(config.timeout, trace).context("failed to build HTTP client")?;
    let archive = WaybackClient::new(config.archive_url.clone(), &http_client);

    output::run(&archive, &config, &mut out).await?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = try_main().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use clap::CommandFactory;

    #[test]
    fn test_cli_args_are_well_formed() {
        CLIArgs::command().debug_assert();
    }

    #[test]
    fn test_banner_names_version() {
        let mut buf = Vec::new();
        write_banner(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            format!("🪄 wb / v{}\n----\n", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_resolve_config_when_url_given_ignores_stdin() {
        let args = CLIArgs::try_parse_from(&["wb", "http://a"]).unwrap();

        let config = resolve_config(args, Cursor::new("http://b\nhttp://c\n")).unwrap();

        assert_eq!(config.urls, vec!["http://a"]);
        assert_eq!(config.mode, Mode::FetchSelected { date: None });
        assert_eq!(config.archive_url.as_str(), "https://web.archive.org/");
    }

    #[test]
    fn test_resolve_config_when_url_option_given_ignores_stdin() {
        let args = CLIArgs::try_parse_from(&["wb", "--url", "http://a", "-s"]).unwrap();

        let config = resolve_config(args, Cursor::new("http://b\n")).unwrap();

        assert_eq!(config.urls, vec!["http://a"]);
        assert_eq!(config.mode, Mode::ListSnapshots);
    }

    #[test]
    fn test_resolve_config_when_no_url_given_reads_stdin() {
        let args = CLIArgs::try_parse_from(&["wb", "--all", "-t", "30"]).unwrap();

        let config = resolve_config(args, Cursor::new("http://b\nhttp://c\n")).unwrap();

        assert_eq!(config.urls, vec!["http://b", "http://c"]);
        assert_eq!(config.mode, Mode::FetchAll);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_resolve_config_when_stdin_empty_returns_no_urls() {
        let args = CLIArgs::try_parse_from(&["wb", "-d", "20200101000000"]).unwrap();

        let config = resolve_config(args, Cursor::new("")).unwrap();

        assert!(config.urls.is_empty());
        assert_eq!(
            config.mode,
            Mode::FetchSelected {
                date: Some("20200101000000".into())
            }
        );
    }

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_banner_suppressed_when_flag_given_returns_true() {
        assert!(banner_suppressed(os_args(&["wb", "--help", "--no-banner"])));
        assert!(banner_suppressed(os_args(&["wb", "--no-banner", "-V"])));
    }

    #[test]
    fn test_banner_suppressed_when_flag_absent_returns_false() {
        assert!(!banner_suppressed(os_args(&["wb", "--help"])));
        // The program name and anything after `--` are not flags.
        assert!(!banner_suppressed(os_args(&["--no-banner", "--help"])));
        assert!(!banner_suppressed(os_args(&["wb", "--", "--no-banner"])));
    }

    #[test]
    fn test_cli_args_when_help_requested_returns_display_help() {
        let err = CLIArgs::try_parse_from(&["wb", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_args_when_both_urls_given_fails() {
        let result = CLIArgs::try_parse_from(&["wb", "http://a", "--url", "http://b"]);
        assert!(result.is_err());
    }
}
