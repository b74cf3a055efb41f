use std::ffi::OsString;
use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::Parser;

use crate::search::DEFAULT_ENDPOINT;

/// Long options that take a value and may also be given with a single dash, e.g. `-devKey`.
const SINGLE_DASH_LONGS: &[&str] = &[
    "path",
    "devKey",
    "dev-key",
    "maxResults",
    "max-results",
    "m3uFileName",
    "m3u-file-name",
    "skip",
    "fuzziness",
];

/// Builds an M3U playlist of the local songs that rank highest on YouTube for each
/// artist of a music library.
#[derive(Parser, Clone, Debug)]
#[command(version, about)]
pub struct Config {
    /// Library root, one directory per artist
    #[arg(long, value_name = "DIR")]
    pub path: PathBuf,

    /// YouTube API developer key
    #[arg(
        long = "dev-key",
        alias = "devKey",
        env = "YOUTUBE_API_KEY",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub dev_key: String,

    /// Maximum number of YouTube search results to analyse per artist
    #[arg(
        long = "max-results",
        alias = "maxResults",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(0..=50)
    )]
    pub max_results: u32,

    /// Playlist name, written to `<path>/<name>.m3u`
    #[arg(
        long = "m3u-file-name",
        alias = "m3uFileName",
        default_value = "top10",
        allow_hyphen_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub m3u_file_name: String,

    /// Skip this many artists in the working folder
    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    /// Edits tolerated per word when matching video titles to songs
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub fuzziness: u8,

    /// Search endpoint
    #[arg(long = "api-url", default_value = DEFAULT_ENDPOINT, hide = true)]
    pub api_url: reqwest::Url,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    pub fn playlist_path(&self) -> PathBuf {
        self.path.join(format!("{}.m3u", self.m3u_file_name))
    }
}

/// Rewrites `-name` and `-name=value` to their double-dash form for known long options.
///
/// Only arguments in option position are touched: the value following an option and
/// everything after `--` are passed through as given.
pub(crate) fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut value_next = false;
    let mut options_done = false;

    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if std::mem::take(&mut value_next) || options_done {
                return arg;
            }
            let Some(s) = arg.to_str() else {
                return arg;
            };
            if s == "--" {
                options_done = true;
                return arg;
            }

            let (dashes, flag) = match s.strip_prefix("--") {
                Some(flag) => (2, flag),
                None => match s.strip_prefix('-') {
                    Some(flag) => (1, flag),
                    None => return arg,
                },
            };
            let (name, inline_value) = match flag.split_once('=') {
                Some((name, _)) => (name, true),
                None => (flag, false),
            };
            let takes_value =
                SINGLE_DASH_LONGS.contains(&name) || (dashes == 2 && name == "api-url");
            value_next = takes_value && !inline_value;

            if dashes == 1 && takes_value {
                OsString::from(format!("-{}", s))
            } else {
                arg
            }
        })
        .collect()
}
