//! Ordered heading rules.
//!
//! Classification runs the gate rules in order (the first rule that fires
//! rejects the line), then the level rules in order (the first rule that
//! matches assigns the level). Rules are pure; the caller applies the TOC
//! side effects of the outcome.

use once_cell::sync::Lazy;
use regex::Regex;

use super::features::LineFeatures;
use crate::model::{is_toc_header, HeadingLevel, Line};

/// Longest line (in characters) that can still be a heading.
pub const MAX_HEADING_CHARS: usize = 100;

/// Lines with fewer words than this may count as TOC entries or compact headings.
pub const COMPACT_WORD_LIMIT: usize = 10;

static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(Phase\s+[IVXLC]+:|\d+\.\d*(\.\d+)*\s)").unwrap());
static LETTERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[A-Z]\.\s").unwrap());
static TOC_ENTRY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\.\s").unwrap());
static PHASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*Phase\s+[IVXLC]+\s*:").unwrap());
static SUB_LEVEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d\.\d").unwrap());

/// Dotted decimal, lettered or "Phase <roman>:" numbering.
pub fn is_numbered(text: &str) -> bool {
    NUMBERED.is_match(text) || LETTERED.is_match(text)
}

/// Simple `<digits>. ` numbering, as used by TOC entries.
pub fn is_toc_entry(text: &str) -> bool {
    TOC_ENTRY.is_match(text)
}

/// Everything a rule may look at for one line.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub line: &'a Line,
    pub features: &'a LineFeatures,
    pub page_width: f32,
    /// TOC suppression is active on the line's page
    pub toc_active: bool,
    /// At least one heading has been accepted for the document
    pub has_headings: bool,
}

impl LineContext<'_> {
    fn text(&self) -> &str {
        &self.line.text
    }

    fn styled(&self) -> bool {
        self.features.bold || self.features.italic
    }

    fn size(&self) -> f32 {
        self.features.font_size
    }
}

/// Why a line was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Empty or longer than [`MAX_HEADING_CHARS`]
    Length,
    /// Several plain spans without numbering
    MixedStyle,
    /// The "Table of Contents" header itself
    TocHeader,
    /// A numbered entry inside an active TOC
    TocEntry,
    /// Neither numbered, short and prominent, nor title-cased
    NotHeadingLike,
    /// Starts right of the page's first quarter
    OffMargin,
    /// No level rule matched
    NoLevel,
}

/// Outcome of classifying one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Heading(HeadingLevel),
    Rejected(RejectReason),
}

/// A rule that rejects lines.
pub struct GateRule {
    pub name: &'static str,
    pub reason: RejectReason,
    pub rejects: fn(&LineContext) -> bool,
}

/// A rule that assigns a level.
pub struct LevelRule {
    pub name: &'static str,
    pub level: HeadingLevel,
    pub matches: fn(&LineContext) -> bool,
}

pub const GATE_RULES: &[GateRule] = &[
    GateRule {
        name: "length",
        reason: RejectReason::Length,
        rejects: |ctx| {
            ctx.text().trim().is_empty() || ctx.text().chars().count() > MAX_HEADING_CHARS
        },
    },
    GateRule {
        name: "mixed-style",
        reason: RejectReason::MixedStyle,
        rejects: |ctx| !is_numbered(ctx.text()) && ctx.features.span_count > 1 && !ctx.styled(),
    },
    GateRule {
        name: "toc-header",
        reason: RejectReason::TocHeader,
        rejects: |ctx| is_toc_header(ctx.text()),
    },
    GateRule {
        name: "toc-entry",
        reason: RejectReason::TocEntry,
        rejects: |ctx| ctx.toc_active && is_toc_entry(ctx.text()),
    },
    GateRule {
        name: "heading-like",
        reason: RejectReason::NotHeadingLike,
        rejects: |ctx| {
            let f = ctx.features;
            let heading_like = is_numbered(ctx.text())
                || (f.is_short() && (f.bold || f.font_size > 10.0))
                || (f.is_title_cased() && f.font_size > 10.0 && !f.italic);
            !heading_like
        },
    },
    GateRule {
        name: "left-margin",
        reason: RejectReason::OffMargin,
        rejects: |ctx| ctx.line.x0 >= ctx.page_width / 4.0,
    },
];

pub const LEVEL_RULES: &[LevelRule] = &[
    LevelRule {
        name: "first-heading",
        level: HeadingLevel::H1,
        matches: |ctx| !ctx.has_headings,
    },
    LevelRule {
        name: "large-bold",
        level: HeadingLevel::H1,
        matches: |ctx| {
            ctx.size() >= 18.0 && ctx.features.bold && ctx.features.word_count < COMPACT_WORD_LIMIT
        },
    },
    LevelRule {
        name: "medium-size",
        level: HeadingLevel::H2,
        matches: |ctx| (12.0..18.0).contains(&ctx.size()),
    },
    LevelRule {
        name: "small-compact",
        level: HeadingLevel::H3,
        matches: |ctx| {
            (10.5..12.0).contains(&ctx.size()) && ctx.features.word_count < COMPACT_WORD_LIMIT
        },
    },
    LevelRule {
        name: "phase",
        level: HeadingLevel::H3,
        matches: |ctx| PHASE.is_match(ctx.text()),
    },
    LevelRule {
        name: "numbered-styled",
        level: HeadingLevel::H3,
        matches: |ctx| is_toc_entry(ctx.text()) && ctx.styled(),
    },
    LevelRule {
        name: "numbered-bold-short",
        level: HeadingLevel::H3,
        matches: |ctx| {
            is_toc_entry(ctx.text())
                && !SUB_LEVEL.is_match(ctx.text())
                && ctx.features.word_count < 5
                && ctx.features.bold
        },
    },
];

/// Run the gate rules, then the level rules.
pub fn classify(ctx: &LineContext) -> Classification {
    if let Some(rule) = GATE_RULES.iter().find(|rule| (rule.rejects)(ctx)) {
        log::debug!(
            "page {}: rejected by {}: {:?}",
            ctx.line.page,
            rule.name,
            ctx.line.text
        );
        return Classification::Rejected(rule.reason);
    }

    match LEVEL_RULES.iter().find(|rule| (rule.matches)(ctx)) {
        Some(rule) => {
            log::debug!(
                "page {}: {} via {}: {:?}",
                ctx.line.page,
                rule.level,
                rule.name,
                ctx.line.text
            );
            Classification::Heading(rule.level)
        }
        None => {
            log::debug!("page {}: no level for {:?}", ctx.line.page, ctx.line.text);
            Classification::Rejected(RejectReason::NoLevel)
        }
    }
}
