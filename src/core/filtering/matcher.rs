// Matching a single filter against message content.
//
// All comparisons ignore case. Patterns are compiled once per snapshot; a
// filter with a broken pattern keeps its compile error and only fails for
// itself.

use super::filter_models::{FilterError, FilterRule, MatchType};
use regex::{Regex, RegexBuilder};

/// Compile a filter pattern with case-insensitive semantics.
///
/// With `whole_content` set the pattern must cover the entire input. The raw
/// pattern is checked on its own first so wrapping it can't repair it.
pub fn compile_pattern(pattern: &str, whole_content: bool) -> Result<Regex, FilterError> {
    let raw = build(pattern, pattern)?;
    if !whole_content {
        return Ok(raw);
    }
    build(&format!("^(?:{})$", pattern), pattern)
}

fn build(source: &str, pattern: &str) -> Result<Regex, FilterError> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|e| FilterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Fold one character for comparison: compare upper-cased, then lower-cased
/// forms, keeping one character per character.
fn fold_char(c: char) -> char {
    let upper = single(c.to_uppercase()).unwrap_or(c);
    upper.to_lowercase().next().unwrap_or(upper)
}

fn single(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}

fn fold(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

#[derive(Debug, Clone)]
enum Matcher {
    /// Case-folded literal text.
    Contains(String),
    Exact(String),
    Pattern(Result<Regex, FilterError>),
}

/// A filter together with its ready-to-run matcher.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    rule: FilterRule,
    matcher: Matcher,
}

impl CompiledFilter {
    pub fn new(rule: FilterRule) -> Self {
        let matcher = match rule.match_type {
            MatchType::Contains => Matcher::Contains(fold(&rule.pattern)),
            MatchType::Exact => Matcher::Exact(fold(&rule.pattern)),
            MatchType::Regex => Matcher::Pattern(compile_pattern(&rule.pattern, true)),
            MatchType::RegexContains => Matcher::Pattern(compile_pattern(&rule.pattern, false)),
        };
        Self { rule, matcher }
    }

    pub fn rule(&self) -> &FilterRule {
        &self.rule
    }

    /// Does the filter match `content`?
    ///
    /// Returns `Err(FilterError::InvalidPattern)` for a regex filter whose
    /// pattern does not compile; callers treat that as a non-match.
    pub fn matches(&self, content: &str) -> Result<bool, FilterError> {
        match &self.matcher {
            Matcher::Contains(needle) => Ok(fold(content).contains(needle.as_str())),
            Matcher::Exact(expected) => Ok(fold(content) == *expected),
            Matcher::Pattern(Ok(regex)) => Ok(regex.is_match(content)),
            Matcher::Pattern(Err(e)) => Err(e.clone()),
        }
    }
}
