//! The inline reference grammar.
//!
//! Docstrings reference other API objects with `#`-prefixed tokens:
//!
//! ```text
//! This is a ref to another class: #Config
//! You can rename a ref like #this~Config
//! And you can reference a sub-member like this: #Config#field
//! A callable is written #load()
//! ```
//!
//! [`scan_references`] finds every token in a block of text, without mutating
//! it, and decomposes each into a [`ReferenceToken`] plus its exact span. The
//! grammar is greedy and non-backtracking, so tokens never overlap. Whether a
//! token's target actually exists is not the grammar's concern; every match is
//! emitted and resolution decides failure.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

// A token starts at a '#' not preceded by a word character. The optional
// alias segment before '~' renames the display text; the optional second
// '#' segment appends a sub-member access to it.
static REF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\B#(?:(?P<alias>[\w.]+)~)?(?P<target>[\w.]+)(?P<parens>\(\))?(?P<trailing>#[\w.]+)?")
        .expect("reference pattern is statically valid")
});

/// One reference occurrence, decomposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceToken {
    /// The lookup name, with any trailing sentence period already stripped.
    pub target: String,
    /// Rename segment: display this instead of the target name.
    pub alias: Option<String>,
    /// The token was written with a literal `()` call marker.
    pub call_suffix: bool,
    /// Append segment (the part after a second `#`), shown as `#<append>`
    /// after the target name but excluded from the lookup.
    pub append: Option<String>,
    /// A period immediately followed the token and was judged to be sentence
    /// punctuation; it must be re-appended after substitution.
    pub trailing_period: bool,
}

impl ReferenceToken {
    /// The visible text a substitution should carry: the alias when renaming,
    /// otherwise the target name, plus the call marker and append segment.
    pub fn display_text(&self) -> String {
        let mut text = self
            .alias
            .clone()
            .unwrap_or_else(|| self.target.clone());
        if self.call_suffix {
            text.push_str("()");
        }
        if self.alias.is_none() {
            if let Some(append) = &self.append {
                text.push('#');
                text.push_str(append);
            }
        }
        text
    }
}

/// A [`ReferenceToken`] together with the byte span it was scanned from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMatch {
    pub range: Range<usize>,
    pub token: ReferenceToken,
}

/// Lazily scan `text` for reference tokens, left to right.
pub fn scan_references(text: &str) -> impl Iterator<Item = ReferenceMatch> + '_ {
    REF_PATTERN.captures_iter(text).map(|caps| {
        let whole = caps.get(0).expect("capture group 0 spans the whole match");
        let mut target = caps["target"].to_string();
        let alias = caps.name("alias").map(|m| m.as_str().to_string());
        let call_suffix = caps.name("parens").is_some();
        let mut append = caps
            .name("trailing")
            .map(|m| m.as_str().trim_start_matches('#').to_string());

        // A period ending the token is probably just the end of the
        // sentence. Strip it from the append segment when one exists,
        // otherwise from the target itself unless the call marker fixed the
        // token's boundary.
        let mut trailing_period = false;
        if let Some(trailing) = append.as_mut() {
            if trailing.ends_with('.') {
                trailing.pop();
                trailing_period = true;
            }
        } else if !call_suffix && target.ends_with('.') {
            target.pop();
            trailing_period = true;
        }

        ReferenceMatch {
            range: whole.range(),
            token: ReferenceToken {
                target,
                alias,
                call_suffix,
                append,
                trailing_period,
            },
        }
    })
}
