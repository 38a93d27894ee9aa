//! Title detection over the first page's blocks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Block, UNTITLED};

static DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());
static LONG_DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{5,}").unwrap());

/// Pick and clean the document title from page-1 blocks.
///
/// Preference order: the bold-led block with the largest span size, then the
/// largest multi-word block, then the first multi-word block. Ties go to the
/// block that comes first.
pub fn detect_title(blocks: &[Block]) -> String {
    let text_blocks: Vec<&Block> = blocks.iter().filter(|b| b.is_text()).collect();

    let bold: Vec<&Block> = text_blocks
        .iter()
        .copied()
        .filter(|b| b.first_span().is_some_and(|s| s.is_bold()))
        .collect();
    if let Some(block) = first_largest(&bold) {
        log::debug!("title from bold block");
        return clean_title(&block.flat_text());
    }

    let candidates: Vec<&Block> = text_blocks
        .iter()
        .copied()
        .filter(|b| is_title_candidate(b))
        .collect();
    if candidates.is_empty() {
        return clean_title(UNTITLED);
    }
    if let Some(block) = first_largest(&candidates) {
        log::debug!("title from largest font size");
        return clean_title(&block.flat_text());
    }

    // A candidate without span data has no size to compare
    log::info!("No valid blocks with font size, using first meaningful block");
    clean_title(&candidates[0].flat_text())
}

/// More than one word and no run of five or more dashes.
fn is_title_candidate(block: &Block) -> bool {
    block.word_count() > 1 && !LONG_DASH_RUN.is_match(&block.text)
}

/// First block with the maximum span size, or `None` if any block lacks spans.
fn first_largest<'a>(blocks: &[&'a Block]) -> Option<&'a Block> {
    let mut best: Option<(&'a Block, f32)> = None;
    for &block in blocks {
        let size = block.max_span_size()?;
        match best {
            Some((_, best_size)) if size <= best_size => {}
            _ => best = Some((block, size)),
        }
    }
    best.map(|(block, _)| block)
}

/// Normalize a title string.
///
/// Dash runs become spaces, an immediately repeated word collapses to one
/// occurrence, whitespace is collapsed, and one trailing punctuation mark is
/// dropped. An empty result becomes "Untitled".
pub fn clean_title(text: &str) -> String {
    let text = DASH_RUN.replace_all(text, " ");
    let text = collapse_repeated_word(&text);
    let mut text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(last) = text.chars().last() {
        if !is_word_char(last) && !last.is_whitespace() && last != '-' {
            text.pop();
        }
    }

    if text.is_empty() {
        UNTITLED.to_string()
    } else {
        text
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Replace every `<word><whitespace><word>` with a single `<word>`.
///
/// Scans left to right without overlap. The second occurrence only has to
/// match as a prefix, so "Report Reporting" becomes "Reporting".
fn collapse_repeated_word(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        match repeat_at(&chars, i) {
            Some((word_len, end)) => {
                out.extend(&chars[i..i + word_len]);
                i = end;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

/// Length of the repeated word starting at `start` and the end of the match.
fn repeat_at(chars: &[char], start: usize) -> Option<(usize, usize)> {
    let word_len = chars[start..]
        .iter()
        .take_while(|c| is_word_char(**c))
        .count();
    if word_len == 0 {
        return None;
    }

    // A shorter word would be followed by a word char, not whitespace
    let gap_start = start + word_len;
    let gap_len = chars[gap_start..]
        .iter()
        .take_while(|c| c.is_whitespace())
        .count();
    if gap_len == 0 {
        return None;
    }

    let second = gap_start + gap_len;
    let end = second + word_len;
    (end <= chars.len() && chars[second..end] == chars[start..gap_start])
        .then_some((word_len, end))
}
