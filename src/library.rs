use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub name: String,
    pub songs: Vec<Song>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// Location of the file as reached from the library root, root included.
    pub path: PathBuf,
    /// File name, extension included.
    pub title: String,
}

impl Song {
    /// The path this song is indexed and listed under, byte for byte.
    pub fn key(&self) -> &OsStr { self.path.as_os_str() }
}

/// Lists every non-hidden directory under `root` as an artist, together with all
/// the files found beneath it.
///
/// Unreadable directories are logged and contribute nothing.
pub fn scan_library(root: &Path) -> Vec<Artist> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            log::error!("cannot read library {}: {}", root.display(), err);
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| {
            entry
                .map_err(|err| log::error!("cannot read entry in {}: {}", root.display(), err))
                .ok()
        })
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| (entry.file_name(), entry.path()))
        .filter(|(name, _)| !name.to_string_lossy().starts_with('.'))
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(name, path)| Artist {
            name: name.to_string_lossy().into_owned(),
            songs: scan_songs(&path),
        })
        .collect()
}

fn scan_songs(dir: &Path) -> Vec<Song> {
    WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.map_err(|err| log::error!("{}", err)).ok())
        .filter(|entry| !entry.file_type().is_dir())
        .map(|entry| Song {
            title: entry.file_name().to_string_lossy().into_owned(),
            path: entry.into_path(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn one_artist_per_visible_directory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Zappa/Peaches En Regalia.flac");
        touch(dir.path(), "ABBA/Waterloo.mp3");
        touch(dir.path(), ".cache/thumbs.db");
        touch(dir.path(), "top10.m3u");
        fs::create_dir(dir.path().join("Empty")).unwrap();

        let artists = scan_library(dir.path());
        let names: Vec<_> = artists.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["ABBA", "Empty", "Zappa"]);
        assert!(artists[1].songs.is_empty());
    }

    #[test]
    fn songs_are_collected_at_any_depth() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Queen/Bohemian Rhapsody.mp3");
        touch(dir.path(), "Queen/A Night at the Opera/Love of My Life.mp3");
        touch(dir.path(), "Queen/Live/1986/Wembley/Radio Ga Ga.mp3");
        touch(dir.path(), "Queen/.hidden/cover.jpg");

        let artists = scan_library(dir.path());
        assert_eq!(artists.len(), 1);

        let songs = &artists[0].songs;
        assert_eq!(songs.len(), 4);
        assert!(songs.iter().all(|s| s.path.starts_with(dir.path().join("Queen"))));

        let radio = songs.iter().find(|s| s.title == "Radio Ga Ga.mp3").unwrap();
        assert_eq!(
            radio.path,
            dir.path().join("Queen/Live/1986/Wembley/Radio Ga Ga.mp3")
        );
    }

    #[test]
    fn song_key_is_full_path() {
        let song = Song {
            path: PathBuf::from("music/Foo/Bar.mp3"),
            title: "Bar.mp3".to_owned(),
        };
        assert_eq!(song.key(), "music/Foo/Bar.mp3");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_file_name_keeps_its_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let artist = dir.path().join("Foo");
        fs::create_dir(&artist).unwrap();
        let name = OsStr::from_bytes(b"Caf\xe9.mp3");
        fs::write(artist.join(name), b"").unwrap();

        let artists = scan_library(dir.path());
        let song = &artists[0].songs[0];
        assert_eq!(song.path.file_name(), Some(name));
        assert!(Path::new(song.key()).exists());
        assert_eq!(song.title, "Caf\u{fffd}.mp3");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_keeps_the_rest() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Queen/Innuendo.mp3");
        touch(dir.path(), "Queen/Live/Radio Ga Ga.mp3");
        touch(dir.path(), "Queen/Vault/Demo.mp3");
        let locked = dir.path().join("Queen/Vault");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores permission bits
        let readable = fs::read_dir(&locked).is_ok();
        let artists = scan_library(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        let titles: Vec<_> = artists[0].songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Innuendo.mp3", "Radio Ga Ga.mp3"]);
    }

    #[test]
    fn missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(scan_library(&dir.path().join("nope")).is_empty());
    }
}
