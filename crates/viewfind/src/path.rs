//! Virtual path normalization and joining.
//!
//! Virtual paths are provider-relative, `/`-separated, and always absolute:
//!
//! ```text
//! "Views/Home/"     →  /Views/Home
//! "//Views//Home"   →  /Views/Home
//! "~/Views/Home"    →  /Views/Home     (app-relative form)
//! "/"               →  /
//! ```

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::InvalidPathError;

/// Path separator used by every virtual path.
pub const SEPARATOR: char = '/';

/// A normalized virtual path.
///
/// Begins with exactly one `/`, contains no empty segments, and has no
/// trailing `/` unless it is the root itself. The only way to build one is
/// through [`normalize`], so holding a `VirtualPath` means the path is valid.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualPath(String);

impl VirtualPath {
    /// The root path `/`.
    pub fn root() -> Self {
        VirtualPath(SEPARATOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Last path segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit(SEPARATOR).next()
    }
}

impl Deref for VirtualPath {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VirtualPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for VirtualPath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for VirtualPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl FromStr for VirtualPath {
    type Err = InvalidPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

impl TryFrom<&str> for VirtualPath {
    type Error = InvalidPathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        normalize(s)
    }
}

/// Canonicalize a caller-supplied path into a [`VirtualPath`].
///
/// Rejects empty input and input containing NUL. A leading `~/` (or a bare
/// `~`) is the app-relative spelling of the root and is dropped. Runs of `/`
/// collapse to one, a single leading `/` is ensured, and trailing `/` is
/// removed.
pub fn normalize(path: &str) -> Result<VirtualPath, InvalidPathError> {
    if path.is_empty() {
        return Err(InvalidPathError::Empty);
    }
    if path.contains('\0') {
        return Err(InvalidPathError::Nul);
    }

    let path = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(SEPARATOR) => rest,
        _ => path,
    };

    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split(SEPARATOR).filter(|s| !s.is_empty()) {
        normalized.push(SEPARATOR);
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push(SEPARATOR);
    }

    Ok(VirtualPath(normalized))
}

/// [`normalize`] for hosts that carry the path as an optional value.
pub fn normalize_opt(path: Option<&str>) -> Result<VirtualPath, InvalidPathError> {
    normalize(path.ok_or(InvalidPathError::Missing)?)
}

/// Join two path segments with exactly one `/` between them.
///
/// Only the trailing character of `a` and the leading character of `b` are
/// inspected; interior separators are left alone.
pub fn join(a: &str, b: &str) -> String {
    let has_trailing = a.ends_with(SEPARATOR);
    let has_leading = b.starts_with(SEPARATOR);

    match (has_trailing, has_leading) {
        (true, true) => format!("{}{}", a, &b[1..]),
        (true, false) | (false, true) => format!("{}{}", a, b),
        (false, false) => format!("{}{}{}", a, SEPARATOR, b),
    }
}

/// Extension of a file name, including the leading dot.
///
/// The extension starts at the last `.`; a name ending in `.` has none.
/// Dot-files count: the extension of `.cshtml` is `.cshtml`.
pub fn extension(name: &str) -> Option<&str> {
    let idx = name.rfind('.')?;
    if idx + 1 == name.len() {
        None
    } else {
        Some(&name[idx..])
    }
}

/// Case-insensitive comparison of a file name's extension with `target`.
pub(crate) fn has_extension(name: &str, target: &str) -> bool {
    match extension(name) {
        Some(ext) => ext.to_lowercase() == target.to_lowercase(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case::relative("foo/bar", "/foo/bar")]
    #[case::trailing("/foo/bar/", "/foo/bar")]
    #[case::double_leading("//foo/bar", "/foo/bar")]
    #[case::interior_run("/foo//bar", "/foo/bar")]
    #[case::already_normal("/foo/bar", "/foo/bar")]
    #[case::root("/", "/")]
    #[case::root_run("///", "/")]
    #[case::app_relative("~/Views/Home", "/Views/Home")]
    #[case::app_root("~", "/")]
    #[case::tilde_name("~foo", "/~foo")]
    #[case::single("a", "/a")]
    fn normalize_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case::empty("", InvalidPathError::Empty)]
    #[case::nul("/a\0b", InvalidPathError::Nul)]
    fn normalize_rejects(#[case] input: &str, #[case] expected: InvalidPathError) {
        assert_eq!(normalize(input).unwrap_err(), expected);
    }

    #[test]
    fn normalize_opt_rejects_none() {
        assert_eq!(normalize_opt(None).unwrap_err(), InvalidPathError::Missing);
        assert_eq!(normalize_opt(Some("x")).unwrap().as_str(), "/x");
    }

    #[rstest]
    #[case::both("/a/", "/b")]
    #[case::neither("/a", "b")]
    #[case::trailing_only("/a/", "b")]
    #[case::leading_only("/a", "/b")]
    fn join_single_separator(#[case] a: &str, #[case] b: &str) {
        assert_eq!(join(a, b), "/a/b");
    }

    #[test]
    fn join_empty_prefix() {
        assert_eq!(join("", "sub"), "/sub");
        assert_eq!(join("/", "/sub"), "/sub");
    }

    #[rstest]
    #[case::plain("a.cshtml", Some(".cshtml"))]
    #[case::double("a.min.js", Some(".js"))]
    #[case::none("Makefile", None)]
    #[case::trailing_dot("a.", None)]
    #[case::dotfile(".cshtml", Some(".cshtml"))]
    fn extension_cases(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(extension(name), expected);
    }

    #[rstest]
    #[case("A.EXT")]
    #[case("a.Ext")]
    #[case("a.ext")]
    fn extension_match_ignores_case(#[case] name: &str) {
        assert!(has_extension(name, ".ext"));
    }

    #[test]
    fn extension_mismatch() {
        assert!(!has_extension("b.txt", ".ext"));
        assert!(!has_extension("ext", ".ext"));
    }

    #[test]
    fn virtual_path_accessors() {
        let path = normalize("/Views/Home/Index.cshtml").unwrap();
        assert_eq!(path.file_name(), Some("Index.cshtml"));
        assert!(!path.is_root());
        assert!(VirtualPath::root().is_root());
        assert_eq!(VirtualPath::root().file_name(), None);
        assert_eq!("x/y".parse::<VirtualPath>().unwrap(), "/x/y");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(p in "[a-z~/.]{1,24}") {
            let once = normalize(&p).unwrap();
            let twice = normalize(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn normalized_shape(p in "[a-z/]{1,24}") {
            let n = normalize(&p).unwrap();
            prop_assert!(n.starts_with('/'));
            prop_assert!(!n.contains("//"));
            prop_assert!(n.is_root() || !n.ends_with('/'));
        }

        #[test]
        fn join_never_doubles(a in "/?[a-z]{1,8}/?", b in "/?[a-z]{1,8}") {
            let joined = join(&a, &b);
            prop_assert!(!joined.contains("//"));
            let expected = 1 + usize::from(a.starts_with('/'));
            prop_assert_eq!(joined.matches('/').count(), expected);
        }
    }
}
