use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Context;

pub use cli::Config;
pub use index::{Hit, SongIndex};
pub use library::{scan_library, Artist, Song};
pub use playlist::Playlist;
pub use search::{Candidate, VideoSearch, YouTubeClient};

mod cli;

pub mod index;
pub mod library;
mod playlist;
pub mod search;
mod tokenize;

/// Knobs of the per-artist matching loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub max_results: u32,
    pub skip: usize,
    pub fuzziness: u8,
}

impl From<&Config> for MatchOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_results: config.max_results,
            skip: config.skip,
            fuzziness: config.fuzziness,
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let config = match Config::try_from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(err) => err.exit(),
    };

    let log_level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let client = YouTubeClient::new(&config.dev_key, config.api_url.clone())
        .context("Error creating new YouTube client")?;

    execute(&config, &client)?;
    Ok(())
}

/// Scans the library, matches every artist against `search` and writes the playlist
/// next to the artists.
pub fn execute<S: VideoSearch>(config: &Config, search: &S) -> anyhow::Result<Playlist> {
    let artists = scan_library(&config.path);
    log::info!(
        "found {} artists in {}",
        artists.len(),
        config.path.display()
    );

    let output = config.playlist_path();
    let file = File::create(&output)
        .with_context(|| format!("Error creating m3u file {}", output.display()))?;

    let playlist = collect_playlist(&artists, search, &MatchOptions::from(config));

    playlist
        .write_to(&mut BufWriter::new(file))
        .with_context(|| format!("Error writing m3u file {}", output.display()))?;
    log::info!("wrote {} songs to {}", playlist.len(), output.display());

    Ok(playlist)
}

/// Matches the videos found for each artist against that artist's songs, reporting
/// progress on stdout.
pub fn collect_playlist<S: VideoSearch>(
    artists: &[Artist],
    search: &S,
    options: &MatchOptions,
) -> Playlist {
    collect_playlist_into(&mut io::stdout().lock(), artists, search, options)
}

/// Like [`collect_playlist`], reporting artist names and matched paths to `out`.
///
/// Every artist name is reported, but the first `options.skip` artists are not searched.
/// Failed searches skip the artist, failed matches skip the video. A reader that goes
/// away does not stop the run.
pub fn collect_playlist_into<W: Write, S: VideoSearch>(
    out: &mut W,
    artists: &[Artist],
    search: &S,
    options: &MatchOptions,
) -> Playlist {
    let mut playlist = Playlist::default();

    for (i, artist) in artists.iter().enumerate() {
        report(out, &artist.name);
        if i < options.skip {
            continue;
        }

        let candidates = match search.search(&artist.name, options.max_results) {
            Ok(candidates) => candidates,
            Err(err) => {
                log::error!("Error searching videos for {}: {:#}", artist.name, err);
                continue;
            }
        };

        let index = match SongIndex::build(&artist.songs, options.fuzziness) {
            Ok(index) => index,
            Err(err) => {
                log::error!("Error indexing songs of {}: {:#}", artist.name, err);
                continue;
            }
        };
        log::debug!(
            "{}: {} videos, {} songs",
            artist.name,
            candidates.len(),
            index.len()
        );

        for candidate in &candidates {
            match index.best_match(&candidate.title) {
                Ok(Some(hit)) => {
                    let path = Path::new(&hit.key);
                    log::debug!("{:?} -> {} ({:.3})", candidate.title, path.display(), hit.score);
                    report(out, path.display());
                    playlist.insert(hit.key);
                }
                Ok(None) => log::debug!("{:?} has no local match", candidate.title),
                Err(err) => log::warn!("Error while searching {:?}: {:#}", candidate.title, err),
            }
        }
    }

    playlist
}

fn report<W: Write>(out: &mut W, line: impl Display) {
    match writeln!(out, "{}", line) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
        Err(err) => log::debug!("cannot report progress: {}", err),
    }
}
