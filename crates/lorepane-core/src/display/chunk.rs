//! Chunked text: splitting narrative into paced pieces.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// How text is broken into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Break after `.`, `!` or `?` when a new sentence follows.
    #[default]
    Sentence,
    /// Break on blank lines.
    Paragraph,
    /// Break on every line.
    Line,
    /// Group lines into sections that start at headers, stats lines and separators.
    Semantic,
}

/// Pacing for chunked reveals (the `[reveal]` config table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub base_delay_per_char_ms: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub strategy: ChunkStrategy,
    pub add_blank_line_between_chunks: bool,
    pub enabled: bool,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            base_delay_per_char_ms: 30,
            min_delay_ms: 500,
            max_delay_ms: 4000,
            strategy: ChunkStrategy::Sentence,
            add_blank_line_between_chunks: false,
            enabled: true,
        }
    }
}

impl RevealConfig {
    /// Dungeon intros: section-wise and a bit slower between sections.
    pub fn dungeon() -> Self {
        Self {
            base_delay_per_char_ms: 25,
            min_delay_ms: 800,
            max_delay_ms: 3000,
            strategy: ChunkStrategy::Semantic,
            ..Self::default()
        }
    }

    /// Combat narration: sentence-wise and brisk.
    pub fn combat() -> Self {
        Self {
            base_delay_per_char_ms: 20,
            min_delay_ms: 500,
            max_delay_ms: 2000,
            strategy: ChunkStrategy::Sentence,
            ..Self::default()
        }
    }

    /// Pause after showing `chunk`, proportional to its length.
    pub fn delay_for(&self, chunk: &str) -> Duration {
        let length = chunk.width() as u64;
        let min = self.min_delay_ms.min(self.max_delay_ms);
        let millis = length
            .saturating_mul(self.base_delay_per_char_ms)
            .clamp(min, self.max_delay_ms);
        Duration::from_millis(millis)
    }
}

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[=\-]{3,}|[A-Z\s]{10,}|^[=\-\s]*[A-Z\s]+[=\-\s]*$").expect("valid header regex")
});

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[=\-]{4,}$").expect("valid separator regex"));

const STATS_MARKERS: [&str; 7] = ["Stats", "Health:", "Attack:", "STR", "AGI", "TEC", "INT"];

/// Splits `text` into non-empty, trimmed chunks.
pub fn split_into_chunks(text: &str, strategy: ChunkStrategy) -> Vec<String> {
    match strategy {
        ChunkStrategy::Sentence => tidy(split_sentences(text)),
        ChunkStrategy::Paragraph => tidy(split_paragraphs(text)),
        ChunkStrategy::Line => tidy(split_lines(text)),
        ChunkStrategy::Semantic => tidy(split_semantic(text)),
    }
}

fn tidy<S: AsRef<str>>(chunks: Vec<S>) -> Vec<String> {
    chunks
        .iter()
        .map(|chunk| chunk.as_ref().trim())
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = i + c.len_utf8();

        let mut saw_newline = false;
        let mut gap_end = end;
        while let Some(&(j, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            saw_newline |= next == '\n';
            gap_end = j + next.len_utf8();
            chars.next();
        }
        if gap_end == end {
            continue;
        }

        let starts_sentence = chars.peek().is_some_and(|&(_, next)| next.is_uppercase());
        if saw_newline || starts_sentence {
            chunks.push(&text[start..end]);
            start = gap_end;
        }
    }
    chunks.push(&text[start..]);
    chunks
}

fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split("\r\n\r\n").flat_map(|part| part.split("\n\n")).collect()
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split(['\n', '\r']).collect()
}

fn starts_section(line: &str) -> bool {
    HEADER.is_match(line)
        || SEPARATOR.is_match(line)
        || STATS_MARKERS.iter().any(|marker| line.contains(marker))
}

fn split_semantic(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split(['\n', '\r']).map(str::trim).filter(|l| !l.is_empty()) {
        if starts_section(line) && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        } else if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
