use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tokens shorter than this many characters are never counted.
pub const MIN_TOKEN_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCount {
    pub token: String,
    pub count: u64,
}

/// Token occurrence counts, remembering the order in which tokens were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<TokenCount>,
    positions: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `token`. Returns false, leaving the table
    /// untouched, when the token is shorter than [`MIN_TOKEN_CHARS`].
    pub fn record(&mut self, token: &str) -> bool {
        if token.chars().count() < MIN_TOKEN_CHARS {
            return false;
        }
        match self.positions.get(token) {
            Some(&idx) => self.entries[idx].count += 1,
            None => {
                self.positions.insert(token.to_string(), self.entries.len());
                self.entries.push(TokenCount { token: token.to_string(), count: 1 });
            }
        }
        true
    }

    pub fn get(&self, token: &str) -> Option<u64> {
        self.positions.get(token).map(|&idx| self.entries[idx].count)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Entries in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = &TokenCount> {
        self.entries.iter()
    }

    /// The `k` most frequent tokens, count descending. Equal counts keep
    /// first-occurrence order, so `top(k1)` is always a prefix of `top(k2)`
    /// for `k1 <= k2`.
    pub fn top(&self, k: usize) -> Vec<TokenCount> {
        let mut ranked = self.entries.clone();
        // sort_by is stable
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(k);
        ranked
    }
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::new();
        for token in iter {
            table.record(token.as_ref());
        }
        table
    }
}
