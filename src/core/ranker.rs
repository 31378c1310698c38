//! Fuzzy ranking of videos against a free-text query.
//!
//! A candidate matches when every character of the query appears in its
//! text, in order. Matches are ranked by Levenshtein distance to the query,
//! closest first; equal distances keep the order candidates were given in.
//! Candidates are identified by position, never by their text, so two videos
//! that render to the same text are both returned.

use crate::core::Video;
use crate::error::Result;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Which part of a video a query is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SearchField {
    /// `<channel> - <title>`
    #[default]
    All,
    Title,
    Description,
    Channel,
}

impl SearchField {
    pub fn candidate_text(self, video: &Video) -> String {
        match self {
            SearchField::All => format!("{} - {}", video.channel.title, video.title),
            SearchField::Title => video.title.clone(),
            SearchField::Description => video.description.clone(),
            SearchField::Channel => video.channel.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Case-sensitive; an empty query matches nothing.
    Strict,
    /// Case-insensitive and accent-insensitive; an empty query matches everything.
    #[default]
    NormalizedFold,
}

/// Anything that can pick candidates for a query: the in-process ranker, or
/// an interactive selector driven by the user.
pub trait Matcher {
    /// Positions into `candidates` of the selected entries, best first.
    fn select(&self, query: &str, candidates: &[String]) -> Result<Vec<usize>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<K> {
    pub key: K,
    /// Higher is better; an exact match scores 0.
    pub score: i64,
}

pub struct FuzzyRanker {
    strategy: Strategy,
    matcher: SkimMatcherV2,
}

impl FuzzyRanker {
    pub fn new(strategy: Strategy) -> Self {
        let matcher = match strategy {
            Strategy::Strict => SkimMatcherV2::default().respect_case(),
            Strategy::NormalizedFold => SkimMatcherV2::default().ignore_case(),
        };
        Self { strategy, matcher }
    }

    fn normalize(&self, s: &str) -> String {
        match self.strategy {
            Strategy::Strict => s.to_string(),
            Strategy::NormalizedFold => fold(s),
        }
    }

    /// Score of `text` against an already-normalized query, or `None` when
    /// it does not match at all.
    fn score(&self, query: &str, text: &str) -> Option<i64> {
        if query.is_empty() {
            return match self.strategy {
                Strategy::Strict => None,
                Strategy::NormalizedFold => Some(0),
            };
        }
        let text = self.normalize(text);
        self.matcher.fuzzy_match(&text, query)?;
        Some(-(levenshtein(query, &text) as i64))
    }

    /// Ranks `candidates` against `query`, dropping non-matches.
    pub fn rank_scored<K>(&self, query: &str, candidates: impl IntoIterator<Item = (K, String)>) -> Vec<Ranked<K>> {
        let query = self.normalize(query);
        let mut ranked: Vec<Ranked<K>> = candidates
            .into_iter()
            .filter_map(|(key, text)| self.score(&query, &text).map(|score| Ranked { key, score }))
            .collect();
        // Stable: equal scores stay in input order.
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    pub fn rank<K>(&self, query: &str, candidates: impl IntoIterator<Item = (K, String)>) -> Vec<K> {
        self.rank_scored(query, candidates).into_iter().map(|r| r.key).collect()
    }
}

impl Matcher for FuzzyRanker {
    fn select(&self, query: &str, candidates: &[String]) -> Result<Vec<usize>> {
        let keys = self.rank(query, candidates.iter().cloned().enumerate());
        debug!("{} of {} candidates match {:?}", keys.len(), candidates.len(), query);
        Ok(keys)
    }
}

/// Decomposes, drops combining marks, then lowercases: `Café` becomes `cafe`.
fn fold(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect::<String>().to_lowercase()
}

/// Edit distance in characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            cur[j + 1] = substitution.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Runs `matcher` over the candidate text of each video and returns the
/// selected videos in the matcher's order.
pub fn search_videos(matcher: &dyn Matcher, query: &str, videos: Vec<Video>, field: SearchField) -> Result<Vec<Video>> {
    let texts: Vec<String> = videos.iter().map(|v| field.candidate_text(v)).collect();
    let selected = matcher.select(query, &texts)?;

    let mut slots: Vec<Option<Video>> = videos.into_iter().map(Some).collect();
    Ok(selected
        .into_iter()
        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
        .collect())
}
