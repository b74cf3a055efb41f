//! A small in-memory full-text index over song titles.
//!
//! Titles are analyzed into lower-cased alphanumeric terms. A query term matches any
//! indexed term within the configured Levenshtein distance, and documents are
//! ranked with a tf-idf style score scaled by how many query terms they matched.

use std::collections::HashMap;
use std::ffi::OsString;

use anyhow::{bail, ensure};
use itertools::Itertools;

use crate::library::Song;
use crate::tokenize;

/// Largest edit distance a query term may be away from an indexed term.
pub const MAX_FUZZINESS: u8 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub key: OsString,
    pub score: f64,
}

#[derive(Debug)]
struct Document {
    key: OsString,
    terms: usize,
}

#[derive(Debug)]
struct Posting {
    doc: usize,
    freq: u32,
}

#[derive(Debug)]
pub struct SongIndex {
    fuzziness: u8,
    docs: Vec<Document>,
    postings: HashMap<String, Vec<Posting>>,
}

impl SongIndex {
    pub fn new(fuzziness: u8) -> anyhow::Result<Self> {
        ensure!(
            fuzziness <= MAX_FUZZINESS,
            "fuzziness {} exceeds max ({})",
            fuzziness,
            MAX_FUZZINESS
        );
        Ok(Self {
            fuzziness,
            docs: Vec::new(),
            postings: HashMap::new(),
        })
    }

    /// Indexes every song title under the song's path.
    pub fn build(songs: &[Song], fuzziness: u8) -> anyhow::Result<Self> {
        let mut index = Self::new(fuzziness)?;
        for song in songs {
            index.add(song.key(), &song.title);
        }
        Ok(index)
    }

    /// Adds `text` under `key`. Keys are not checked for uniqueness.
    pub fn add(&mut self, key: impl Into<OsString>, text: &str) {
        let doc = self.docs.len();
        let counts = tokenize::analyze(text).counts();
        self.docs.push(Document {
            key: key.into(),
            terms: counts.values().sum(),
        });
        for (term, freq) in counts {
            self.postings.entry(term).or_default().push(Posting {
                doc,
                freq: freq as u32,
            });
        }
    }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    /// All documents matching at least one query term, best first.
    pub fn search(&self, query: &str) -> anyhow::Result<Vec<Hit>> {
        let terms: Vec<String> = tokenize::analyze(query).unique().collect();
        if terms.is_empty() {
            bail!("query {:?} has no searchable terms", query);
        }

        // doc -> (summed weight, number of query terms matched)
        let mut scores: HashMap<usize, (f64, usize)> = HashMap::new();
        for term in &terms {
            let mut best: HashMap<usize, f64> = HashMap::new();
            for (indexed, distance) in self.expand(term) {
                let postings = &self.postings[indexed];
                let idf = self.idf(postings.len());
                for posting in postings {
                    let doc = &self.docs[posting.doc];
                    let weight = f64::from(posting.freq).sqrt() * idf * idf
                        / (doc.terms as f64).sqrt()
                        / (1.0 + distance as f64);
                    let slot = best.entry(posting.doc).or_insert(0.0);
                    if weight > *slot {
                        *slot = weight;
                    }
                }
            }
            for (doc, weight) in best {
                let entry = scores.entry(doc).or_insert((0.0, 0));
                entry.0 += weight;
                entry.1 += 1;
            }
        }

        let mut hits: Vec<Hit> = scores
            .into_iter()
            .map(|(doc, (weight, matched))| Hit {
                key: self.docs[doc].key.clone(),
                score: weight * matched as f64 / terms.len() as f64,
            })
            .collect();

        // best score first, ties by key
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.key.cmp(&b.key)));
        Ok(hits)
    }

    pub fn best_match(&self, query: &str) -> anyhow::Result<Option<Hit>> {
        Ok(self.search(query)?.into_iter().next())
    }

    /// Indexed terms within `fuzziness` edits of `term`, with their distance.
    fn expand<'a>(&'a self, term: &'a str) -> impl Iterator<Item = (&'a str, usize)> + 'a {
        let max = usize::from(self.fuzziness);
        let len = term.chars().count();
        self.postings.keys().filter_map(move |indexed| {
            if indexed.chars().count().abs_diff(len) > max {
                return None;
            }
            let distance = strsim::levenshtein(term, indexed);
            (distance <= max).then_some((indexed.as_str(), distance))
        })
    }

    fn idf(&self, doc_freq: usize) -> f64 {
        1.0 + (self.docs.len() as f64 / (doc_freq as f64 + 1.0)).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(titles: &[&str]) -> SongIndex {
        let mut index = SongIndex::new(1).unwrap();
        for title in titles {
            index.add(format!("music/Artist/{}", title), title);
        }
        index
    }

    fn best(index: &SongIndex, query: &str) -> Option<String> {
        index
            .best_match(query)
            .unwrap()
            .map(|hit| hit.key.to_string_lossy().into_owned())
    }

    #[test]
    fn exact_title_matches() {
        let index = index(&["Bar.mp3", "Baz Qux.mp3"]);
        assert_eq!(best(&index, "Bar").as_deref(), Some("music/Artist/Bar.mp3"));
    }

    #[test]
    fn one_edit_matches() {
        let index = index(&["Hello.mp3"]);
        assert!(best(&index, "Hallo").is_some(), "substitution");
        assert!(best(&index, "Helloo").is_some(), "insertion");
        assert!(best(&index, "Helo").is_some(), "deletion");
    }

    #[test]
    fn two_edits_do_not_match() {
        let index = index(&["Hello.mp3"]);
        assert_eq!(best(&index, "Hxllx"), None);
        assert_eq!(best(&index, "Hel"), None);
    }

    #[test]
    fn exact_term_beats_fuzzy_term() {
        let index = index(&["Roam.mp3", "Roar.mp3"]);
        assert_eq!(best(&index, "Roar").as_deref(), Some("music/Artist/Roar.mp3"));
    }

    #[test]
    fn more_matched_terms_rank_higher() {
        let index = index(&[
            "Another One Bites the Dust.mp3",
            "One Vision.mp3",
            "Dust in the Wind.mp3",
        ]);
        let hits = index
            .search("Queen - Another One Bites the Dust (Official Video)")
            .unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].key, "music/Artist/Another One Bites the Dust.mp3");
    }

    #[test]
    fn ties_are_ordered_by_key() {
        let index = index(&["Live.mp3", "Live.flac"]);
        let hits = index.search("live").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, hits[1].score);
        assert_eq!(hits[0].key, "music/Artist/Live.flac");
    }

    #[test]
    fn zero_fuzziness_is_exact() {
        let mut index = SongIndex::new(0).unwrap();
        index.add("a", "Hello");
        assert!(index.best_match("Hallo").unwrap().is_none());
        assert!(index.best_match("HELLO").unwrap().is_some());
    }

    #[test]
    fn build_indexes_every_song() {
        let songs = vec![
            Song {
                path: "lib/Foo/Bar.mp3".into(),
                title: "Bar.mp3".to_owned(),
            },
            Song {
                path: "lib/Foo/live/Baz.mp3".into(),
                title: "Baz.mp3".to_owned(),
            },
        ];
        let index = SongIndex::build(&songs, 1).unwrap();
        assert_eq!(index.len(), 2);
        assert!(!index.is_empty());
    }

    #[test]
    fn rejects_excessive_fuzziness() {
        assert!(SongIndex::new(MAX_FUZZINESS + 1).is_err());
    }

    #[test]
    fn query_without_terms_is_an_error() {
        let index = index(&["Bar.mp3"]);
        assert!(index.search(" - (the) ").is_err());
    }

    #[test]
    fn empty_index_has_no_hits() {
        let index = SongIndex::new(1).unwrap();
        assert!(index.search("anything").unwrap().is_empty());
    }
}
