use crate::error::ExplainError;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

pub fn compile(pattern: &str) -> Result<Regex, ExplainError> {
    Ok(Regex::new(pattern)?)
}

/// Index of the first line matching `pattern` strictly after (or before)
/// `from`. The scan stops at either end of `lines`; it never wraps around.
pub fn search<S: AsRef<str>>(
    lines: &[S],
    from: usize,
    direction: Direction,
    pattern: &Regex,
) -> Option<usize> {
    let matches = |index: &usize| pattern.is_match(lines[*index].as_ref());
    match direction {
        Direction::Forward => (from.saturating_add(1)..lines.len()).find(matches),
        Direction::Backward => (0..from.min(lines.len())).rev().find(matches),
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, compile, search};
    use crate::error::ExplainError;

    const LINES: [&str; 6] = [
        "KIND:     Pod",
        "VERSION:  v1",
        "",
        "DESCRIPTION:",
        "     Pod is a collection of containers.",
        "   containers     <[]Object>",
    ];

    #[test]
    fn forward_search_starts_after_current_line() {
        let pattern = compile("container").expect("valid");
        assert_eq!(search(&LINES, 0, Direction::Forward, &pattern), Some(4));
        assert_eq!(search(&LINES, 4, Direction::Forward, &pattern), Some(5));
    }

    #[test]
    fn backward_search_starts_before_current_line() {
        let pattern = compile("^[A-Z]+:").expect("valid");
        assert_eq!(search(&LINES, 4, Direction::Backward, &pattern), Some(3));
        assert_eq!(search(&LINES, 3, Direction::Backward, &pattern), Some(1));
    }

    #[test]
    fn search_does_not_wrap_around() {
        let pattern = compile("KIND").expect("valid");
        assert_eq!(search(&LINES, 5, Direction::Forward, &pattern), None);
        let pattern = compile("Object").expect("valid");
        assert_eq!(search(&LINES, 0, Direction::Backward, &pattern), None);
    }

    #[test]
    fn start_beyond_the_end_is_clamped() {
        let pattern = compile("containers").expect("valid");
        assert_eq!(search(&LINES, 99, Direction::Forward, &pattern), None);
        assert_eq!(search(&LINES, 99, Direction::Backward, &pattern), Some(5));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let error = compile("(unclosed").expect_err("invalid");
        assert!(matches!(error, ExplainError::BadPattern(_)));
        assert!(error.to_string().starts_with("bad pattern:"));
    }
}
