//! Word wrapping for free-form schema descriptions.
//!
//! Descriptions in API schemas are loosely formatted prose: paragraphs separated
//! by blank lines, `Key:` style headings, bullet and numbered lists and indented
//! code samples. Wrapping keeps those breaks instead of flowing everything into
//! one paragraph.

use regex::Regex;
use std::sync::LazyLock;
use unicode_width::UnicodeWidthStr;

/// Lines starting with this marker are preformatted and emitted verbatim.
pub const CODE_PREFIX: &str = "    ";

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.?|-|\*)\s").expect("valid list item pattern"));

struct LineBuffer<'a> {
    width: usize,
    words: Vec<&'a str>,
    len: usize,
}

impl<'a> LineBuffer<'a> {
    fn new(width: usize) -> Self {
        Self {
            width,
            words: Vec::new(),
            len: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Appends `word` if it fits. An empty buffer always accepts a word.
    fn push(&mut self, word: &'a str) -> bool {
        let word_len = word.width();
        let next_len = if self.words.is_empty() {
            word_len
        } else {
            self.len + 1 + word_len
        };
        if !self.words.is_empty() && next_len > self.width {
            return false;
        }
        self.words.push(word);
        self.len = next_len;
        true
    }

    fn take(&mut self) -> String {
        let line = self.words.join(" ");
        self.words.clear();
        self.len = 0;
        line
    }
}

/// Words are never split: a single word wider than `width` occupies its own
/// line. Preformatted lines (starting with [`CODE_PREFIX`]) pass through
/// unchanged.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut wrapped = Vec::new();
    let mut buffer = LineBuffer::new(width);
    let mut last_word: Option<&str> = None;

    for raw in text.split('\n') {
        if raw.starts_with(CODE_PREFIX) {
            flush(&mut buffer, &mut wrapped, &mut last_word);
            wrapped.push(raw.to_string());
            continue;
        }

        // blank lines separate sections, but a leading one is dropped
        if !wrapped.is_empty() && raw.trim().is_empty() {
            flush(&mut buffer, &mut wrapped, &mut last_word);
            wrapped.push(String::new());
            continue;
        }

        if starts_new_line(last_word, raw) {
            flush(&mut buffer, &mut wrapped, &mut last_word);
        }

        for word in raw.split_whitespace() {
            last_word = Some(word);
            if !buffer.push(word) {
                flush(&mut buffer, &mut wrapped, &mut last_word);
                last_word = Some(word);
                buffer.push(word);
            }
        }
    }
    flush(&mut buffer, &mut wrapped, &mut last_word);
    wrapped
}

fn flush(buffer: &mut LineBuffer<'_>, wrapped: &mut Vec<String>, last_word: &mut Option<&str>) {
    if buffer.is_empty() {
        return;
    }
    *last_word = None;
    wrapped.push(buffer.take());
}

fn starts_new_line(last_word: Option<&str>, raw: &str) -> bool {
    if last_word.is_some_and(|word| word.ends_with(':')) {
        return true;
    }
    if raw.starts_with(CODE_PREFIX) {
        return true;
    }
    let trimmed = raw.trim();
    trimmed.is_empty() || LIST_ITEM.is_match(trimmed)
}
