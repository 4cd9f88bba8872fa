//! "More like this" ranking with a fixed additive weight table.

use dramashelf_core::Work;

use crate::stats::distinct;

pub const SAME_AUTHOR_WEIGHT: u32 = 10;
pub const SHARED_TRANSLATOR_WEIGHT: u32 = 8;
pub const SHARED_TAG_WEIGHT: u32 = 2;
pub const SAME_STATUS_WEIGHT: u32 = 1;

pub const DEFAULT_RELATED_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Related<'a> {
    pub work: &'a Work,
    pub score: u32,
}

/// Similarity of `candidate` to `target`. Symmetric; zero means unrelated.
pub fn score(target: &Work, candidate: &Work) -> u32 {
    let mut score = 0;
    if candidate.author == target.author {
        score += SAME_AUTHOR_WEIGHT;
    }

    let target_translators = target.translators();
    if candidate
        .translators()
        .iter()
        .any(|name| target_translators.contains(name))
    {
        score += SHARED_TRANSLATOR_WEIGHT;
    }

    let target_tags = distinct(target.tags.iter().map(String::as_str));
    let shared_tags = distinct(candidate.tags.iter().map(String::as_str))
        .intersection(&target_tags)
        .count() as u32;
    score += SHARED_TAG_WEIGHT * shared_tags;

    if candidate.is_translated == target.is_translated {
        score += SAME_STATUS_WEIGHT;
    }
    score
}

/// Works most similar to `target`, best first. The target itself and works
/// scoring zero are left out; equal scores keep catalog order.
pub fn related<'a>(target: &Work, works: &'a [Work], limit: usize) -> Vec<Related<'a>> {
    let mut ranked: Vec<Related<'a>> = works
        .iter()
        .filter(|work| work.id != target.id)
        .map(|work| Related {
            work,
            score: score(target, work),
        })
        .filter(|r| r.score > 0)
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(limit);
    ranked
}
