//! Python version specifiers (PEP 440 subset).
//!
//! Plugins declare a `python_version` such as `>=3.9,<3.13`; the python filter
//! asks whether a literal version like `3.10` satisfies it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecifierError {
    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    #[error("wildcard is only allowed with '==' or '!=' in '{0}'")]
    InvalidWildcard(String),

    #[error("'~=' needs at least two release segments in '{0}'")]
    InvalidCompatible(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PreKind {
    Alpha,
    Beta,
    Rc,
}

/// Position of the pre-release part in the ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    /// `1.0.dev1` sorts before `1.0a1`
    DevOnly,
    Pre(PreKind, u64),
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DevKey {
    Dev(u64),
    Final,
}

/// A parsed version literal. Local labels are kept but ignored for comparison.
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

impl Version {
    /// Release segments, e.g. `[3, 10]`
    #[must_use]
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    #[must_use]
    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    fn trimmed_release(&self) -> &[u64] {
        let len = self
            .release
            .iter()
            .rposition(|&n| n != 0)
            .map_or(0, |i| i + 1);
        &self.release[..len]
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOnly,
            (Some((kind, n)), _, _) => PreKey::Pre(kind, n),
            _ => PreKey::Final,
        }
    }

    fn dev_key(&self) -> DevKey {
        self.dev.map_or(DevKey::Final, DevKey::Dev)
    }

    /// Same epoch and release once trailing zeros are dropped
    fn same_release(&self, other: &Version) -> bool {
        self.epoch == other.epoch && self.trimmed_release() == other.trimmed_release()
    }

    /// Epoch matches and the release starts with `prefix` (missing segments read as 0)
    fn has_release_prefix(&self, epoch: u64, prefix: &[u64]) -> bool {
        self.epoch == epoch
            && prefix
                .iter()
                .enumerate()
                .all(|(i, &n)| self.release.get(i).copied().unwrap_or(0) == n)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.trimmed_release().cmp(other.trimmed_release()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        f.write_str(&release.join("."))?;
        if let Some((kind, n)) = self.pre {
            let tag = match kind {
                PreKind::Alpha => "a",
                PreKind::Beta => "b",
                PreKind::Rc => "rc",
            };
            write!(f, "{tag}{n}")?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{n}")?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{n}")?;
        }
        if let Some(local) = &self.local {
            write!(f, "+{local}")?;
        }
        Ok(())
    }
}

/// Byte cursor over a lowercased version string
struct Cursor<'s> {
    s: &'s str,
    pos: usize,
}

impl<'s> Cursor<'s> {
    fn rest(&self) -> &'s str {
        &self.s[self.pos..]
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn eat_separator(&mut self) -> bool {
        self.eat(".") || self.eat("-") || self.eat("_")
    }

    fn number(&mut self) -> Option<u64> {
        let digits = self.rest().bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let n = self.rest()[..digits].parse().ok()?;
        self.pos += digits;
        Some(n)
    }

    /// Try `parse`, rewinding when it fails
    fn attempt<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let start = self.pos;
        let result = parse(self);
        if result.is_none() {
            self.pos = start;
        }
        result
    }
}

fn parse_pre(c: &mut Cursor<'_>) -> Option<(PreKind, u64)> {
    c.eat_separator();
    // Longer spellings first so "alpha" is not read as "a" + "lpha"
    let kind = [
        ("alpha", PreKind::Alpha),
        ("beta", PreKind::Beta),
        ("preview", PreKind::Rc),
        ("pre", PreKind::Rc),
        ("rc", PreKind::Rc),
        ("a", PreKind::Alpha),
        ("b", PreKind::Beta),
        ("c", PreKind::Rc),
    ]
    .into_iter()
    .find_map(|(token, kind)| c.eat(token).then_some(kind))?;
    let n = c.attempt(|c| {
        c.eat_separator();
        c.number()
    });
    Some((kind, n.unwrap_or(0)))
}

fn parse_post(c: &mut Cursor<'_>) -> Option<u64> {
    // Implicit form: "1.0-1"
    if let Some(n) = c.attempt(|c| c.eat("-").then(|| c.number()).flatten()) {
        return Some(n);
    }
    c.eat_separator();
    if !(c.eat("post") || c.eat("rev") || c.eat("r")) {
        return None;
    }
    let n = c.attempt(|c| {
        c.eat_separator();
        c.number()
    });
    Some(n.unwrap_or(0))
}

fn parse_dev(c: &mut Cursor<'_>) -> Option<u64> {
    c.eat_separator();
    if !c.eat("dev") {
        return None;
    }
    let n = c.attempt(|c| {
        c.eat_separator();
        c.number()
    });
    Some(n.unwrap_or(0))
}

impl FromStr for Version {
    type Err = SpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SpecifierError::InvalidVersion(s.trim().to_string());
        let lowered = s.trim().to_ascii_lowercase();
        let body = lowered.strip_prefix('v').unwrap_or(&lowered);

        let (public, local) = match body.split_once('+') {
            Some((public, local)) => (public, Some(local.to_string())),
            None => (body, None),
        };
        if local.as_deref().is_some_and(|l| {
            l.is_empty() || !l.chars().all(|ch| ch.is_ascii_alphanumeric() || ".-_".contains(ch))
        }) {
            return Err(invalid());
        }

        let mut c = Cursor { s: public, pos: 0 };

        let epoch = c
            .attempt(|c| {
                let n = c.number()?;
                c.eat("!").then_some(n)
            })
            .unwrap_or(0);

        let mut release = vec![c.number().ok_or_else(invalid)?];
        while let Some(n) = c.attempt(|c| c.eat(".").then(|| c.number()).flatten()) {
            release.push(n);
        }

        let pre = c.attempt(parse_pre);
        let post = c.attempt(parse_post);
        let dev = c.attempt(parse_dev);

        if !c.rest().is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Compatible,
    Arbitrary,
}

impl Operator {
    /// Longest tokens first so "<=" is not read as "<"
    const TOKENS: [(&'static str, Operator); 8] = [
        ("===", Self::Arbitrary),
        ("~=", Self::Compatible),
        ("==", Self::Equal),
        ("!=", Self::NotEqual),
        ("<=", Self::LessEqual),
        (">=", Self::GreaterEqual),
        ("<", Self::Less),
        (">", Self::Greater),
    ];

    fn token(self) -> &'static str {
        Self::TOKENS
            .iter()
            .find(|(_, op)| *op == self)
            .map_or("", |(token, _)| token)
    }
}

/// A single clause such as `>=3.9` or `==3.10.*`
#[derive(Debug, Clone)]
pub struct Specifier {
    operator: Operator,
    version: Version,
    wildcard: bool,
    raw: String,
}

impl Specifier {
    #[must_use]
    pub fn contains(&self, candidate: &Version) -> bool {
        let spec = &self.version;
        match self.operator {
            Operator::Equal if self.wildcard => {
                candidate.has_release_prefix(spec.epoch, &spec.release)
            }
            Operator::NotEqual if self.wildcard => {
                !candidate.has_release_prefix(spec.epoch, &spec.release)
            }
            Operator::Equal => candidate == spec,
            Operator::NotEqual => candidate != spec,
            Operator::LessEqual => candidate <= spec,
            Operator::GreaterEqual => candidate >= spec,
            Operator::Less => {
                candidate < spec
                    && !(candidate.is_prerelease()
                        && !spec.is_prerelease()
                        && candidate.same_release(spec))
            }
            Operator::Greater => {
                candidate > spec
                    && !(candidate.is_postrelease()
                        && !spec.is_postrelease()
                        && candidate.same_release(spec))
            }
            Operator::Compatible => {
                let prefix = &spec.release[..spec.release.len() - 1];
                candidate >= spec && candidate.has_release_prefix(spec.epoch, prefix)
            }
            Operator::Arbitrary => candidate.to_string() == self.raw,
        }
    }
}

impl FromStr for Specifier {
    type Err = SpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clause: String = s.chars().filter(|c| !c.is_whitespace()).collect();

        // A bare version means an exact match
        let (operator, rest) = Operator::TOKENS
            .iter()
            .find_map(|(token, op)| clause.strip_prefix(token).map(|rest| (*op, rest)))
            .unwrap_or((Operator::Equal, clause.as_str()));

        if operator == Operator::Arbitrary {
            let version = rest.parse()?;
            return Ok(Self {
                operator,
                version,
                wildcard: false,
                raw: rest.to_ascii_lowercase(),
            });
        }

        let (rest, wildcard) = match rest.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (rest, false),
        };
        if wildcard && !matches!(operator, Operator::Equal | Operator::NotEqual) {
            return Err(SpecifierError::InvalidWildcard(clause.clone()));
        }

        let version: Version = rest.parse()?;
        if operator == Operator::Compatible && version.release.len() < 2 {
            return Err(SpecifierError::InvalidCompatible(clause.clone()));
        }

        Ok(Self {
            operator,
            version,
            wildcard,
            raw: rest.to_ascii_lowercase(),
        })
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.token(), self.version)?;
        if self.wildcard {
            f.write_str(".*")?;
        }
        Ok(())
    }
}

/// Comma-separated clauses, all of which must hold. Empty admits everything.
#[derive(Debug, Clone, Default)]
pub struct SpecifierSet {
    specifiers: Vec<Specifier>,
}

impl SpecifierSet {
    #[must_use]
    pub fn contains(&self, candidate: &Version) -> bool {
        self.specifiers.iter().all(|s| s.contains(candidate))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specifiers.len()
    }
}

impl FromStr for SpecifierSet {
    type Err = SpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let specifiers = s
            .split(',')
            .filter(|clause| !clause.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Specifier>, _>>()?;
        Ok(Self { specifiers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn satisfies(spec: &str, version: &str) -> bool {
        spec.parse::<SpecifierSet>().unwrap().contains(&v(version))
    }

    #[test]
    fn test_parse_release() {
        assert_eq!(v("3.10").release(), &[3, 10]);
        assert_eq!(v("v1.2.3").release(), &[1, 2, 3]);
        assert_eq!(v("2!1.0").to_string(), "2!1.0");
    }

    #[test]
    fn test_parse_pre_post_dev() {
        assert_eq!(v("1.0a1").to_string(), "1.0a1");
        assert_eq!(v("1.0-alpha.2").to_string(), "1.0a2");
        assert_eq!(v("1.0.preview1").to_string(), "1.0rc1");
        assert_eq!(v("1.0c").to_string(), "1.0rc0");
        assert_eq!(v("1.0-3").to_string(), "1.0.post3");
        assert_eq!(v("1.0.rev2").to_string(), "1.0.post2");
        assert_eq!(v("1.0.dev").to_string(), "1.0.dev0");
        assert_eq!(v("1.0rc1.post2.dev3+ubuntu.1").to_string(), "1.0rc1.post2.dev3+ubuntu.1");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "three", "3.", "3..9", "1.0+", "1.0 beta gamma", "1.0xyz"] {
            assert!(bad.parse::<Version>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_ordering() {
        let ordered = [
            "1.0.dev1", "1.0a1", "1.0a2.dev1", "1.0a2", "1.0b1", "1.0rc1", "1.0", "1.0.post1.dev1",
            "1.0.post1", "1.1", "1!0.1",
        ];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(v("3.9"), v("3.9.0"));
        assert_eq!(v("3"), v("3.0.0"));
        assert_eq!(v("1.0+local"), v("1.0"));
    }

    #[test]
    fn test_comparison_operators() {
        assert!(satisfies(">=3.9", "3.9"));
        assert!(satisfies(">=3.9", "3.10"));
        assert!(!satisfies(">=3.10", "3.9"));
        assert!(satisfies("<=3.9", "3.9.0"));
        assert!(satisfies(">3.8", "3.9"));
        assert!(!satisfies(">3.9", "3.9"));
        assert!(satisfies("<3.10", "3.9"));
        assert!(!satisfies("<3.9", "3.9"));
        assert!(satisfies("!=3.8", "3.9"));
        assert!(!satisfies("==3.9", "3.10"));
    }

    #[test]
    fn test_numeric_not_lexical() {
        assert!(satisfies(">=3.9", "3.10"));
        assert!(!satisfies("<3.9", "3.10"));
    }

    #[test]
    fn test_intersections() {
        assert!(satisfies(">=3.8,<3.11", "3.10"));
        assert!(!satisfies(">=3.8,<3.11", "3.11"));
        assert!(!satisfies("<3.10,!=3.9", "3.9"));
        assert!(satisfies(" >= 3.8 , < 4 ", "3.12"));
        assert!(satisfies(">=3.8,", "3.9"));
    }

    #[test]
    fn test_wildcards() {
        assert!(satisfies("==3.9.*", "3.9"));
        assert!(satisfies("==3.9.*", "3.9.7"));
        assert!(!satisfies("==3.9.*", "3.10"));
        assert!(satisfies("!=3.9.*", "3.10"));
        assert!(!satisfies("!=3.9.*", "3.9.1"));
        assert!(satisfies("==3.*", "3.12"));
        assert!(matches!(
            ">=3.9.*".parse::<SpecifierSet>(),
            Err(SpecifierError::InvalidWildcard(_))
        ));
    }

    #[test]
    fn test_compatible_release() {
        assert!(satisfies("~=3.8", "3.8"));
        assert!(satisfies("~=3.8", "3.12"));
        assert!(!satisfies("~=3.8", "4.0"));
        assert!(!satisfies("~=3.8", "3.7"));
        assert!(satisfies("~=3.8.1", "3.8.5"));
        assert!(!satisfies("~=3.8.1", "3.9"));
        assert!(matches!(
            "~=3".parse::<SpecifierSet>(),
            Err(SpecifierError::InvalidCompatible(_))
        ));
    }

    #[test]
    fn test_exclusive_bounds_and_pre_post_releases() {
        assert!(!satisfies("<3.10", "3.10rc1"));
        assert!(satisfies("<3.10rc2", "3.10rc1"));
        assert!(!satisfies(">3.9", "3.9.post1"));
        assert!(satisfies(">3.9.post1", "3.9.post2"));
        assert!(satisfies(">3.9", "3.9.1"));
    }

    #[test]
    fn test_arbitrary_equality() {
        assert!(satisfies("===3.9", "3.9"));
        assert!(!satisfies("===3.9", "3.9.0"));
    }

    #[test]
    fn test_bare_version_is_exact() {
        assert!(satisfies("3.9", "3.9"));
        assert!(!satisfies("3.9", "3.10"));
    }

    #[test]
    fn test_empty_set_admits_everything() {
        let set: SpecifierSet = "".parse().unwrap();
        assert!(set.is_empty());
        assert!(set.contains(&v("2.7")));
    }

    #[test]
    fn test_invalid_clause() {
        let err = ">=3.9,<four".parse::<SpecifierSet>().unwrap_err();
        assert_eq!(err, SpecifierError::InvalidVersion("four".into()));
    }

    #[test]
    fn test_specifier_display() {
        let spec: Specifier = "== 3.9.*".parse().unwrap();
        assert_eq!(spec.to_string(), "==3.9.*");
        let bare: Specifier = "3.9".parse().unwrap();
        assert_eq!(bare.to_string(), "==3.9");
    }
}
