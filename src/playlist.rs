use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::Path;

/// Matched song paths, unique and kept in byte-wise order.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Playlist {
    entries: BTreeSet<OsString>,
}

impl Playlist {
    pub(crate) const HEADER: &'static str = "#EXTM3U";

    /// Returns `false` if the path was already listed.
    pub fn insert(&mut self, path: impl Into<OsString>) -> bool { self.entries.insert(path.into()) }

    pub fn contains(&self, path: impl AsRef<OsStr>) -> bool { self.entries.contains(path.as_ref()) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &OsStr> { self.entries.iter().map(OsString::as_os_str) }

    /// Writes the playlist with every path exactly as found on disk, even when it is
    /// not valid UTF-8.
    pub fn write_to<T: Write>(&self, w: &mut T) -> std::io::Result<()> {
        writeln!(w, "{}", Self::HEADER)?;
        for ent in &self.entries {
            w.write_all(ent.as_encoded_bytes())?;
            w.write_all(b"\n")?;
        }
        w.flush()
    }
}

/// Human-readable form; paths that are not valid UTF-8 are shown lossily.
impl Display for Playlist {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", Self::HEADER)?;
        for ent in &self.entries {
            writeln!(f, "{}", Path::new(ent).display())?;
        }
        Ok(())
    }
}

impl<S: Into<OsString>> Extend<S> for Playlist {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.entries.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<OsString>> FromIterator<S> for Playlist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut playlist = Self::default();
        playlist.extend(iter);
        playlist
    }
}
