//! Reading time estimation for article bodies

use serde::Serialize;
use std::fmt;
use std::num::NonZeroU32;

use super::richtext::as_plain_text;
use super::ContentBlock;

/// Average adult reading speed used when nothing else is configured
pub const DEFAULT_WORDS_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(200) {
    Some(n) => n,
    None => unreachable!(),
};

/// Estimated minutes needed to read an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ReadingTimeEstimate {
    pub minutes: u32,
}

impl fmt::Display for ReadingTimeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.minutes)
    }
}

/// Count maximal runs of non-whitespace characters.
///
/// Punctuation-only runs count as words too.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimate reading time as `ceil(words / words_per_minute)`
pub fn estimate(blocks: &[ContentBlock], words_per_minute: NonZeroU32) -> ReadingTimeEstimate {
    let total_words: usize = blocks
        .iter()
        .map(|block| count_words(&block.heading) + count_words(&as_plain_text(&block.body)))
        .sum();

    let wpm = words_per_minute.get() as usize;
    let minutes = total_words.div_ceil(wpm);

    ReadingTimeEstimate {
        minutes: u32::try_from(minutes).unwrap_or(u32::MAX),
    }
}
