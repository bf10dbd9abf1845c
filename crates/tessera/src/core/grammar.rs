//! Composable line grammar
//!
//! A [`Pattern`] is a tree of [`Fragment`]s compiled to a `chumsky` parser that must
//! consume the whole (trimmed) line. Matching is ordered and committed: an
//! alternative that matches is kept even when a later branch would also match,
//! and character runs are greedy.
//!
//! ```
//! use tessera::core::grammar::*;
//!
//! let pattern = Pattern::new(concat(vec![
//!     lit("box"),
//!     optional(concat(vec![space1(), quoted("TITLE")])),
//! ]));
//! let captures = pattern.matches("BOX \"Backend\"").unwrap();
//! assert_eq!(captures.get("TITLE"), Some("Backend"));
//! ```

use std::fmt;

use chumsky::prelude::*;
use chumsky::Boxed;
use tracing::trace;

type CaptureList = Vec<(String, String)>;
type LineParser<'src> = Boxed<'src, 'src, &'src str, CaptureList, extra::Default>;

/// Characters accepted by a capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharClass {
    /// Letters, digits, `_`, `.` and `@`
    Word,
    /// Any character outside the given set
    Except(Vec<char>),
    /// ASCII digits
    Digits,
    /// Colour names, hex digits and gradient separators
    Color,
    /// Anything
    Any,
}

impl CharClass {
    pub fn accepts(&self, c: char) -> bool {
        match self {
            CharClass::Word => c.is_alphanumeric() || matches!(c, '_' | '.' | '@'),
            CharClass::Except(excluded) => !excluded.contains(&c),
            CharClass::Digits => c.is_ascii_digit(),
            CharClass::Color => {
                c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '|' | '/' | '\\' | ':')
            }
            CharClass::Any => true,
        }
    }

    fn describe(&self) -> String {
        match self {
            CharClass::Word => "[\\w.@]".to_string(),
            CharClass::Except(excluded) => {
                let chars: String = excluded.iter().collect();
                format!("[^{}]", chars)
            }
            CharClass::Digits => "\\d".to_string(),
            CharClass::Color => "[\\w|/\\\\:-]".to_string(),
            CharClass::Any => ".".to_string(),
        }
    }
}

/// A piece of a line grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Case-insensitive text; a space inside it matches any run of whitespace
    Literal(String),
    /// Whitespace run
    Space { at_least_one: bool },
    /// One or more characters of a class, stored under `name`
    Capture { name: String, class: CharClass },
    /// First matching keyword, stored under `name`
    OneOf { name: String, options: Vec<String> },
    /// Matches the inner fragment or nothing; contributes no captures when absent
    Optional(Box<Fragment>),
    /// First matching branch wins
    Or(Vec<Fragment>),
    /// Fragments in sequence
    Concat(Vec<Fragment>),
}

pub fn lit(text: &str) -> Fragment {
    Fragment::Literal(text.to_string())
}

/// Optional whitespace
pub fn space() -> Fragment {
    Fragment::Space {
        at_least_one: false,
    }
}

/// Mandatory whitespace
pub fn space1() -> Fragment {
    Fragment::Space { at_least_one: true }
}

pub fn capture(name: &str, class: CharClass) -> Fragment {
    Fragment::Capture {
        name: name.to_string(),
        class,
    }
}

pub fn one_of(name: &str, options: &[&str]) -> Fragment {
    Fragment::OneOf {
        name: name.to_string(),
        options: options.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn optional(inner: Fragment) -> Fragment {
    Fragment::Optional(Box::new(inner))
}

pub fn or(branches: Vec<Fragment>) -> Fragment {
    Fragment::Or(branches)
}

pub fn concat(parts: Vec<Fragment>) -> Fragment {
    Fragment::Concat(parts)
}

/// `"..."`, capturing the text between the quotes
pub fn quoted(name: &str) -> Fragment {
    concat(vec![
        lit("\""),
        capture(name, CharClass::Except(vec!['"'])),
        lit("\""),
    ])
}

/// `#color`, capturing the part after `#`
pub fn color(name: &str) -> Fragment {
    concat(vec![lit("#"), capture(name, CharClass::Color)])
}

impl Fragment {
    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Fragment::Literal(_) | Fragment::Space { .. } => {}
            Fragment::Capture { name, .. } | Fragment::OneOf { name, .. } => names.push(name),
            Fragment::Optional(inner) => inner.collect_names(names),
            Fragment::Or(parts) | Fragment::Concat(parts) => {
                for part in parts {
                    part.collect_names(names);
                }
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Fragment::Literal(text) => text
                .chars()
                .map(|c| match c {
                    ' ' => "\\s+".to_string(),
                    '.' | '(' | ')' | '[' | ']' | '|' | '?' | '*' | '+' | '\\' | '{' | '}'
                    | '^' | '$' => format!("\\{}", c),
                    other => other.to_string(),
                })
                .collect(),
            Fragment::Space { at_least_one: true } => "\\s+".to_string(),
            Fragment::Space {
                at_least_one: false,
            } => "\\s*".to_string(),
            Fragment::Capture { name, class } => format!("(?<{}>{}+)", name, class.describe()),
            Fragment::OneOf { name, options } => format!("(?<{}>{})", name, options.join("|")),
            Fragment::Optional(inner) => format!("(?:{})?", inner.describe()),
            Fragment::Or(branches) => {
                let parts: Vec<String> = branches.iter().map(|b| b.describe()).collect();
                format!("(?:{})", parts.join("|"))
            }
            Fragment::Concat(parts) => parts.iter().map(|p| p.describe()).collect(),
        }
    }
}

fn literal<'src>(text: &str) -> Boxed<'src, 'src, &'src str, (), extra::Default> {
    let mut parser = empty().boxed();
    for expected in text.chars() {
        parser = if expected.is_whitespace() {
            parser
                .then_ignore(
                    any()
                        .filter(|c: &char| c.is_whitespace())
                        .repeated()
                        .at_least(1),
                )
                .boxed()
        } else {
            parser
                .then_ignore(any().filter(move |c: &char| c.eq_ignore_ascii_case(&expected)))
                .boxed()
        };
    }
    parser
}

fn compile<'src>(fragment: &Fragment) -> LineParser<'src> {
    match fragment {
        Fragment::Literal(text) => literal(text).to(Vec::new()).boxed(),
        Fragment::Space { at_least_one } => any()
            .filter(|c: &char| c.is_whitespace())
            .repeated()
            .at_least(usize::from(*at_least_one))
            .to(Vec::new())
            .boxed(),
        Fragment::Capture { name, class } => {
            let name = name.clone();
            let class = class.clone();
            any()
                .filter(move |c: &char| class.accepts(*c))
                .repeated()
                .at_least(1)
                .to_slice()
                .map(move |text: &str| vec![(name.clone(), text.to_string())])
                .boxed()
        }
        Fragment::OneOf { name, options } => {
            let name = name.clone();
            let mut choice = any().filter(|_: &char| false).ignored().boxed();
            for option in options {
                choice = choice.or(literal(option)).boxed();
            }
            choice
                .to_slice()
                .map(move |text: &str| vec![(name.clone(), text.to_string())])
                .boxed()
        }
        Fragment::Optional(inner) => compile(inner)
            .or_not()
            .map(|found| found.unwrap_or_default())
            .boxed(),
        Fragment::Or(branches) => {
            let mut parser = any().filter(|_: &char| false).to(Vec::new()).boxed();
            for branch in branches {
                parser = parser.or(compile(branch)).boxed();
            }
            parser
        }
        Fragment::Concat(parts) => {
            let mut parser = empty().to(Vec::new()).boxed();
            for part in parts {
                parser = parser
                    .then(compile(part))
                    .map(|(mut acc, more): (CaptureList, CaptureList)| {
                        acc.extend(more);
                        acc
                    })
                    .boxed();
            }
            parser
        }
    }
}

/// Named captures of a successful match, in match order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    values: CaptureList,
}

impl Captures {
    /// Value of a capture; `None` when its group did not take part in the match
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First present, non-empty capture among `names`, checked in the given order
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.get(name))
            .find(|value| !value.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A full-line grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    root: Fragment,
}

impl Pattern {
    pub fn new(root: Fragment) -> Self {
        let pattern = Self { root };
        debug_assert!(
            pattern.has_unique_names(),
            "duplicate capture name in {}",
            pattern.describe()
        );
        pattern
    }

    /// Match a whole line, ignoring surrounding whitespace
    ///
    /// Compiles the grammar for this one call; use [`Pattern::matcher`] to match
    /// many lines.
    pub fn matches(&self, line: &str) -> Option<Captures> {
        self.matcher().matches(line)
    }

    /// Compile the grammar once for lines borrowed for `'src`
    pub fn matcher<'src>(&self) -> LineMatcher<'src> {
        LineMatcher {
            parser: compile(&self.root).then_ignore(end()).boxed(),
            pattern: self.describe(),
        }
    }

    pub fn capture_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.root.collect_names(&mut names);
        names
    }

    pub fn has_unique_names(&self) -> bool {
        let names = self.capture_names();
        names
            .iter()
            .enumerate()
            .all(|(i, name)| !names[..i].contains(name))
    }

    /// Regex-like rendering of the grammar
    pub fn describe(&self) -> String {
        format!("^{}$", self.root.describe())
    }
}

/// A compiled [`Pattern`]
pub struct LineMatcher<'src> {
    parser: LineParser<'src>,
    pattern: String,
}

impl<'src> LineMatcher<'src> {
    pub fn matches(&self, line: &'src str) -> Option<Captures> {
        let result = self.parser.parse(line.trim()).into_result().ok();
        trace!(pattern = %self.pattern, matched = result.is_some(), "Pattern match");
        result.map(|values| Captures { values })
    }
}

impl fmt::Debug for LineMatcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineMatcher")
            .field("pattern", &self.pattern)
            .finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_pattern() -> Pattern {
        Pattern::new(concat(vec![
            lit("box"),
            optional(or(vec![
                concat(vec![space1(), quoted("NAME1")]),
                concat(vec![space1(), capture("NAME2", CharClass::Except(vec!['#']))]),
            ])),
            space(),
            optional(color("COLOR")),
        ]))
    }

    #[test]
    fn test_matcher_is_reusable_across_lines() {
        let pattern = box_pattern();
        let lines = ["box \"A\" #red", "box", "box B", "participant A", "box \"C\""];
        let matcher = pattern.matcher();
        for line in lines {
            assert_eq!(matcher.matches(line), pattern.matches(line), "{line}");
        }
        assert_eq!(matcher.matches("box B").unwrap().get("NAME2"), Some("B"));
        assert!(matcher.matches("participant A").is_none());
    }

    #[test]
    fn test_literal_is_case_insensitive() {
        let pattern = Pattern::new(lit("end box"));
        assert!(pattern.matches("end box").is_some());
        assert!(pattern.matches("END   Box").is_some());
        assert!(pattern.matches("  end box  ").is_some());
        assert!(pattern.matches("endbox").is_none());
        assert!(pattern.matches("end box x").is_none());
    }

    #[test]
    fn test_optional_groups_are_absent_not_empty() {
        let captures = box_pattern().matches("box").unwrap();
        assert_eq!(captures.get("NAME1"), None);
        assert_eq!(captures.get("NAME2"), None);
        assert_eq!(captures.get("COLOR"), None);
        assert!(captures.is_empty());
    }

    #[test]
    fn test_quoted_branch_commits_first() {
        let captures = box_pattern().matches("box \"Label\" #FF0000").unwrap();
        assert_eq!(captures.get("NAME1"), Some("Label"));
        assert_eq!(captures.get("NAME2"), None);
        assert_eq!(captures.get("COLOR"), Some("FF0000"));
    }

    #[test]
    fn test_bare_branch_and_coalescing() {
        let captures = box_pattern().matches("box Backend #lightblue").unwrap();
        assert_eq!(captures.get("NAME1"), None);
        assert_eq!(captures.first_of(&["NAME1", "NAME2"]).map(str::trim), Some("Backend"));
        assert_eq!(captures.get("COLOR"), Some("lightblue"));
    }

    #[test]
    fn test_color_only() {
        let captures = box_pattern().matches("box #red").unwrap();
        assert_eq!(captures.first_of(&["NAME1", "NAME2"]), None);
        assert_eq!(captures.get("COLOR"), Some("red"));
    }

    #[test]
    fn test_one_of_takes_declaration_order() {
        let pattern = Pattern::new(concat(vec![
            capture("FROM", CharClass::Word),
            space(),
            one_of("ARROW", &["-->", "->"]),
            space(),
            capture("TO", CharClass::Word),
        ]));
        let captures = pattern.matches("Alice --> Bob").unwrap();
        assert_eq!(captures.get("ARROW"), Some("-->"));
        let captures = pattern.matches("Alice->Bob").unwrap();
        assert_eq!(captures.get("ARROW"), Some("->"));
        assert_eq!(captures.get("TO"), Some("Bob"));
    }

    #[test]
    fn test_empty_or_never_matches() {
        let pattern = Pattern::new(or(vec![]));
        assert!(pattern.matches("").is_none());
        assert!(pattern.matches("x").is_none());
    }

    #[test]
    fn test_capture_names_and_uniqueness() {
        let pattern = box_pattern();
        assert_eq!(pattern.capture_names(), vec!["NAME1", "NAME2", "COLOR"]);
        assert!(pattern.has_unique_names());

        let duplicated = Pattern {
            root: concat(vec![capture("A", CharClass::Word), capture("A", CharClass::Word)]),
        };
        assert!(!duplicated.has_unique_names());
    }

    #[test]
    fn test_describe() {
        let pattern = Pattern::new(concat(vec![lit("end box"), optional(color("C"))]));
        assert_eq!(pattern.describe(), "^end\\s+box(?:#(?<C>[\\w|/\\\\:-]+))?$");
    }

    #[test]
    fn test_greedy_runs_do_not_backtrack() {
        let pattern = Pattern::new(concat(vec![
            capture("A", CharClass::Word),
            capture("B", CharClass::Word),
        ]));
        assert!(pattern.matches("ab").is_none());
    }
}
