//! Path Filter Rules
//!
//! Line-based include/exclude rules over file paths:
//! - `+pattern` includes, `-pattern` excludes, `#` starts a comment
//! - patterns are regexes matched anywhere in the path
//! - `\Q...\E` quotes its content literally
//! - the last matching rule wins; unmatched paths are included
//!
//! @module filter

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use tracing::{debug, warn};

use crate::core::error::Result;

static RULE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-])(.*)$").unwrap());

#[derive(Debug)]
struct Rule {
    include: bool,
    pattern: Regex,
}

/// Compiled rule set with a per-path decision cache
#[derive(Debug, Default)]
pub struct Filter {
    /// Rules in reverse file order, so the first match decides
    rules: Vec<Rule>,
    memo: Mutex<HashMap<String, bool>>,
}

impl Filter {
    /// A filter without rules; includes everything
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile rules from their text form
    pub fn parse(text: &str) -> Self {
        let mut rules = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches(['\r', '\n']).trim_start();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(caps) = RULE_LINE.captures(line) else {
                warn!(line = index + 1, text = line, "Ignoring malformed filter line");
                continue;
            };
            let include = &caps[1] == "+";
            let source = quote_literals(&caps[2]);
            match Regex::new(&source) {
                Ok(pattern) => rules.push(Rule { include, pattern }),
                Err(e) => {
                    warn!(line = index + 1, pattern = %source, error = %e, "Skipping invalid filter rule")
                }
            }
        }
        rules.reverse();
        debug!(rules = rules.len(), "Compiled filter rules");
        Self {
            rules,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Load rules from `path`; a missing file yields an empty filter
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Filter file not found, using no rules");
                Ok(Self::empty())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load an optional rule file
    pub fn from_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::empty()),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `path` survives the rules
    pub fn is_included(&self, path: &str) -> bool {
        if self.rules.is_empty() {
            return true;
        }
        if let Some(&decision) = self.memo.lock().get(path) {
            return decision;
        }
        let decision = self
            .rules
            .iter()
            .find(|rule| rule.pattern.is_match(path))
            .map_or(true, |rule| rule.include);
        self.memo.lock().insert(path.to_string(), decision);
        decision
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        !self.is_included(path)
    }
}

/// Rewrite `\Q...\E` spans as escaped literals
///
/// An unterminated `\Q` quotes to the end; a `\E` outside a quote is
/// dropped.
fn quote_literals(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match after.chars().next() {
            Some('Q') => {
                let quoted = &after[1..];
                match quoted.find("\\E") {
                    Some(end) => {
                        out.push_str(&regex::escape(&quoted[..end]));
                        rest = &quoted[end + 2..];
                    }
                    None => {
                        out.push_str(&regex::escape(quoted));
                        rest = "";
                    }
                }
            }
            Some('E') => {
                warn!(pattern, "Dropping \\E without a matching \\Q");
                rest = &after[1..];
            }
            Some(c) => {
                out.push('\\');
                out.push(c);
                rest = &after[c.len_utf8()..];
            }
            None => {
                out.push('\\');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_last_match_wins() {
        let filter = Filter::parse("-foo\n+foo/bar.cs\n");
        assert!(filter.is_included("foo/bar.cs"));
        assert!(filter.is_excluded("foo/baz.cs"));
        assert!(filter.is_included("other/x.cs"));
        // memoized answers stay the same
        assert!(filter.is_included("foo/bar.cs"));
        assert!(filter.is_excluded("foo/baz.cs"));
    }

    #[test]
    fn test_comments_and_junk_lines() {
        let filter = Filter::parse("# header\n\n  -generated\nbogus line\n+(unclosed\n");
        assert_eq!(filter.rule_count(), 1);
        assert!(filter.is_excluded("src/generated/a.cs"));
    }

    #[test]
    fn test_trailing_space_is_part_of_pattern() {
        let filter = Filter::parse("-foo \r\n");
        assert_eq!(filter.rule_count(), 1);
        assert!(filter.is_included("src/foo.cs"));
        assert!(filter.is_excluded("src/foo bar.cs"));
    }

    #[test]
    fn test_quoted_literal() {
        let filter = Filter::parse("-\\Q.\\E\n");
        assert!(filter.is_excluded("a.cs"));
        assert!(filter.is_included("acs"));

        assert_eq!(quote_literals(r"\Qa+b\E\.cs$"), r"a\+b\.cs$");
        assert_eq!(quote_literals(r"x\Q(y"), r"x\(y");
    }

    #[test]
    fn test_stray_end_quote_is_dropped() {
        assert_eq!(quote_literals(r"foo\Ebar"), "foobar");
        let filter = Filter::parse("-foo\\Ebar\n");
        assert!(filter.is_excluded("x/foobar.cs"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let filter = Filter::from_file(dir.path().join("nope.txt")).unwrap();
        assert!(filter.is_empty());
        assert!(filter.is_included("anything"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hard.txt");
        fs::write(&path, "-\\Qobj/\\E\n").unwrap();
        let filter = Filter::from_optional(Some(&path)).unwrap();
        assert!(filter.is_excluded("proj/obj/Debug/x.cs"));
        assert!(filter.is_included("proj/src/x.cs"));
    }
}
