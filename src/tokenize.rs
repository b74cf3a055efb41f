use std::iter::FusedIterator;

/// Common English words that carry no weight when comparing titles.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is",
    "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Splits a string into maximal runs of alphanumeric characters.
#[derive(Clone, Debug)]
pub(crate) struct Tokens<'a> {
    string: &'a str,
    index: usize,
}

impl<'a> Tokens<'a> {
    pub const fn new(string: &'a str) -> Self { Self { string, index: 0 } }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        // the token starts at the next alphanumeric char:
        let start = self.string[self.index..]
            .char_indices()
            .find_map(|(i, c)| if c.is_alphanumeric() { Some(i) } else { None })
            .map(|i| i + self.index);

        let Some(start) = start else {
            self.index = self.string.len();
            return None;
        };

        // and runs until the first char that is not:
        let end = self.string[start..]
            .char_indices()
            .find_map(|(i, c)| if c.is_alphanumeric() { None } else { Some(i) })
            .map_or(self.string.len(), |i| i + start);

        self.index = end;
        Some(&self.string[start..end])
    }
}

impl<'a> FusedIterator for Tokens<'a> {}

pub(crate) fn is_stop_word(term: &str) -> bool { STOP_WORDS.contains(&term) }

/// Lower-cased searchable terms of `text`, in order of appearance.
pub(crate) fn analyze(text: &str) -> impl Iterator<Item = String> + '_ {
    Tokens::new(text)
        .map(str::to_lowercase)
        .filter(|term| !is_stop_word(term))
}
