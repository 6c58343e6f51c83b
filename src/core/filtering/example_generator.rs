// Sample strings for regex filters, shown to moderators next to the pattern.
//
// The pattern is parsed into regex-syntax's HIR and walked once per sample.
// Every open-ended quantifier is cut down to `min + max_repeat` copies, so a
// walk visits each HIR node a bounded number of times and always finishes.

use super::filter_models::FilterError;
use super::matcher::compile_pattern;
use rand::Rng;
use regex_syntax::hir::{Class, ClassUnicodeRange, Hir, HirKind};
use regex_syntax::ParserBuilder;

/// Same ceiling the old generator used for `*` and `+`.
pub const DEFAULT_MAX_REPEAT: u32 = 2;
/// Examples shown per filter in the listing.
pub const DEFAULT_MAX_EXAMPLES: usize = 4;

const ATTEMPTS_PER_EXAMPLE: usize = 8;
// Patterns that demand more repeats than this are not worth previewing.
const MAX_MIN_REPEAT: u32 = 100;
const MAX_EXAMPLE_BYTES: usize = 512;
const NEST_LIMIT: u32 = 64;

/// Examples plus the reason none could be produced, if any.
#[derive(Debug, Clone, Default)]
pub struct ExamplePreview {
    pub examples: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ExampleGenerator {
    pub max_repeat: u32,
    pub max_examples: usize,
}

impl Default for ExampleGenerator {
    fn default() -> Self {
        Self {
            max_repeat: DEFAULT_MAX_REPEAT,
            max_examples: DEFAULT_MAX_EXAMPLES,
        }
    }
}

impl ExampleGenerator {
    pub fn new(max_repeat: u32, max_examples: usize) -> Self {
        Self {
            max_repeat,
            max_examples,
        }
    }

    /// Never fails: errors are logged and returned alongside an empty list.
    pub fn preview(&self, pattern: &str) -> ExamplePreview {
        match self.generate(pattern) {
            Ok(examples) => ExamplePreview {
                examples,
                error: None,
            },
            Err(e) => {
                tracing::warn!(pattern, error = %e, "Failed to generate filter examples");
                ExamplePreview {
                    examples: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn generate(&self, pattern: &str) -> Result<Vec<String>, FilterError> {
        self.generate_with_rng(pattern, &mut rand::thread_rng())
    }

    /// Up to `max_examples` distinct strings, each matching the whole pattern.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        pattern: &str,
        rng: &mut R,
    ) -> Result<Vec<String>, FilterError> {
        let hir = ParserBuilder::new()
            .nest_limit(NEST_LIMIT)
            .build()
            .parse(pattern)
            .map_err(|e| FilterError::Generation(e.to_string()))?;
        let verifier =
            compile_pattern(pattern, true).map_err(|e| FilterError::Generation(e.to_string()))?;

        let mut examples: Vec<String> = Vec::new();
        for _ in 0..self.max_examples * ATTEMPTS_PER_EXAMPLE {
            if examples.len() >= self.max_examples {
                break;
            }

            let mut out = Vec::new();
            self.emit(&hir, rng, &mut out)?;

            // Non-UTF-8 output only comes from byte classes; skip it.
            let Ok(sample) = String::from_utf8(out) else {
                continue;
            };
            // Look-arounds are emitted as nothing, which can break the match.
            if verifier.is_match(&sample) && !examples.contains(&sample) {
                examples.push(sample);
            }
        }

        if examples.is_empty() && self.max_examples > 0 {
            return Err(FilterError::Generation(
                "no sample string satisfied the pattern".to_string(),
            ));
        }
        Ok(examples)
    }

    fn emit<R: Rng + ?Sized>(
        &self,
        hir: &Hir,
        rng: &mut R,
        out: &mut Vec<u8>,
    ) -> Result<(), FilterError> {
        if out.len() > MAX_EXAMPLE_BYTES {
            return Err(FilterError::Generation(format!(
                "examples would be longer than {} bytes",
                MAX_EXAMPLE_BYTES
            )));
        }

        match hir.kind() {
            HirKind::Empty | HirKind::Look(_) => {}
            HirKind::Literal(literal) => out.extend_from_slice(&literal.0),
            HirKind::Class(Class::Unicode(class)) => {
                let c = pick_char(class.ranges(), rng).ok_or_else(never_matches)?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            HirKind::Class(Class::Bytes(class)) => {
                let ranges = class.ranges();
                if ranges.is_empty() {
                    return Err(never_matches());
                }
                let range = &ranges[rng.gen_range(0..ranges.len())];
                out.push(rng.gen_range(range.start()..=range.end()));
            }
            HirKind::Repetition(rep) => {
                if rep.min > MAX_MIN_REPEAT {
                    return Err(FilterError::Generation(format!(
                        "repetition of at least {} is too large to preview",
                        rep.min
                    )));
                }
                let ceiling = rep.min.saturating_add(self.max_repeat);
                let upper = rep.max.map_or(ceiling, |max| max.min(ceiling));
                let count = rng.gen_range(rep.min..=upper.max(rep.min));
                for _ in 0..count {
                    self.emit(&rep.sub, rng, out)?;
                }
            }
            HirKind::Capture(capture) => self.emit(&capture.sub, rng, out)?,
            HirKind::Concat(parts) => {
                for part in parts {
                    self.emit(part, rng, out)?;
                }
            }
            HirKind::Alternation(branches) => {
                let branch = &branches[rng.gen_range(0..branches.len())];
                self.emit(branch, rng, out)?;
            }
        }

        Ok(())
    }
}

fn never_matches() -> FilterError {
    FilterError::Generation("pattern contains a class that can never match".to_string())
}

/// Pick a character from a class, preferring printable ASCII so previews stay
/// readable for classes like `.` or `\w`.
fn pick_char<R: Rng + ?Sized>(ranges: &[ClassUnicodeRange], rng: &mut R) -> Option<char> {
    let printable: Vec<(u32, u32)> = ranges
        .iter()
        .filter_map(|range| {
            let lo = (range.start() as u32).max(0x20);
            let hi = (range.end() as u32).min(0x7E);
            (lo <= hi).then_some((lo, hi))
        })
        .collect();

    let pool = if printable.is_empty() {
        ranges
            .iter()
            .map(|range| (range.start() as u32, range.end() as u32))
            .collect()
    } else {
        printable
    };

    if pool.is_empty() {
        return None;
    }
    let (lo, hi) = pool[rng.gen_range(0..pool.len())];
    // Ranges may straddle the surrogate gap; fall back to the range start.
    char::from_u32(rng.gen_range(lo..=hi)).or_else(|| char::from_u32(lo))
}
