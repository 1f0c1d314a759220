//! Path helpers shared by path fields and run-metadata derivation.
//!
//! Run-file paths typed on one platform are routinely consumed on another, so
//! anything that looks like a Windows path (UNC prefix, drive letter or a
//! backslash) is parsed with Windows rules regardless of the host. Everything
//! else follows the host's own rules.

use std::fmt;

/// Expand a leading `~` to the user's home directory.
///
/// `~user` forms are left untouched, as is everything when no home directory
/// is known.
pub fn expand_home(text: &str) -> String {
    let Some(rest) = text.strip_prefix('~') else {
        return text.to_string();
    };
    if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\')) {
        return text.to_string();
    }
    match std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        Ok(home) if !home.is_empty() => format!("{}{}", home.trim_end_matches(['/', '\\']), rest),
        _ => text.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFlavour {
    Posix,
    Windows,
}

impl PathFlavour {
    pub fn host() -> Self {
        if cfg!(windows) {
            PathFlavour::Windows
        } else {
            PathFlavour::Posix
        }
    }

    /// Pick Windows rules for Windows-looking text, host rules otherwise.
    pub fn detect(text: &str) -> Self {
        if text.starts_with("\\\\") || has_drive_letter(text) || text.contains('\\') {
            PathFlavour::Windows
        } else {
            Self::host()
        }
    }

    fn separator(self) -> char {
        match self {
            PathFlavour::Posix => '/',
            PathFlavour::Windows => '\\',
        }
    }

    fn is_separator(self, c: char) -> bool {
        match self {
            PathFlavour::Posix => c == '/',
            PathFlavour::Windows => c == '/' || c == '\\',
        }
    }
}

fn has_drive_letter(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// A purely lexical path: anchor (drive and/or root) plus normalised parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPath {
    flavour: PathFlavour,
    drive: String,
    root: bool,
    parts: Vec<String>,
}

impl RunPath {
    /// Parse with the flavour chosen by [`PathFlavour::detect`]. Host-flavoured
    /// POSIX paths get `~` expanded.
    pub fn parse(text: &str) -> Self {
        let flavour = PathFlavour::detect(text);
        match flavour {
            PathFlavour::Posix => Self::with_flavour(&expand_home(text), flavour),
            PathFlavour::Windows => Self::with_flavour(text, flavour),
        }
    }

    pub fn with_flavour(text: &str, flavour: PathFlavour) -> Self {
        let mut drive = String::new();
        let mut rest = text;

        if flavour == PathFlavour::Windows {
            if let Some(unc) = text.strip_prefix("\\\\").or_else(|| text.strip_prefix("//")) {
                let mut segments = unc.splitn(3, |c: char| flavour.is_separator(c));
                let server = segments.next().unwrap_or("");
                let share = segments.next().unwrap_or("");
                if !server.is_empty() && !share.is_empty() {
                    return Self {
                        flavour,
                        drive: format!("\\\\{server}\\{share}"),
                        root: true,
                        parts: split_parts(segments.next().unwrap_or(""), flavour),
                    };
                }
            } else if has_drive_letter(text) {
                drive = text[..2].to_string();
                rest = &text[2..];
            }
        }

        let root = rest.starts_with(|c: char| flavour.is_separator(c));
        Self {
            flavour,
            drive,
            root,
            parts: split_parts(rest, flavour),
        }
    }

    pub fn flavour(&self) -> PathFlavour {
        self.flavour
    }

    pub fn is_absolute(&self) -> bool {
        match self.flavour {
            PathFlavour::Posix => self.root,
            PathFlavour::Windows => self.root && !self.drive.is_empty(),
        }
    }

    /// Drive plus root separator, e.g. `/`, `C:\` or `\\server\share\`.
    pub fn anchor(&self) -> String {
        let mut anchor = self.drive.clone();
        if self.root {
            anchor.push(self.flavour.separator());
        }
        anchor
    }

    /// The path without its last part; an anchor-only path is its own parent.
    pub fn parent(&self) -> RunPath {
        let mut parent = self.clone();
        parent.parts.pop();
        parent
    }

    /// Final part, or `""` for an anchor-only path.
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or("")
    }

    /// Final part without its last suffix. Leading-dot names keep their dot.
    pub fn stem(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(idx) if idx > 0 && idx + 1 < name.len() => &name[..idx],
            _ => name,
        }
    }

    /// Parts after the anchor.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Keep only the first `count` parts after the anchor.
    pub fn truncated(&self, count: usize) -> RunPath {
        let mut out = self.clone();
        out.parts.truncate(count);
        out
    }
}

fn split_parts(text: &str, flavour: PathFlavour) -> Vec<String> {
    text.split(|c: char| flavour.is_separator(c))
        .filter(|p| !p.is_empty() && *p != ".")
        .map(str::to_string)
        .collect()
}

impl fmt::Display for RunPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let anchor = self.anchor();
        let sep = self.flavour.separator().to_string();
        let body = self.parts.join(&sep);
        if anchor.is_empty() && body.is_empty() {
            return f.write_str(".");
        }
        write!(f, "{anchor}{body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_drive_paths() {
        let p = RunPath::parse(r"C:\proj\Analysis\run_07\case3.run");
        assert_eq!(p.flavour(), PathFlavour::Windows);
        assert!(p.is_absolute());
        assert_eq!(p.anchor(), r"C:\");
        assert_eq!(p.name(), "case3.run");
        assert_eq!(p.stem(), "case3");
        assert_eq!(p.parent().to_string(), r"C:\proj\Analysis\run_07");
    }

    #[test]
    fn windows_forward_slashes_after_drive() {
        let p = RunPath::parse("D:/data/run1/a.run");
        assert_eq!(p.to_string(), r"D:\data\run1\a.run");
    }

    #[test]
    fn unc_paths_are_absolute() {
        let p = RunPath::parse(r"\\server\share\proj\r2\x.run");
        assert!(p.is_absolute());
        assert_eq!(p.anchor(), r"\\server\share\");
        assert_eq!(p.parts(), ["proj", "r2", "x.run"]);
    }

    #[test]
    fn drive_relative_is_not_absolute() {
        assert!(!RunPath::parse(r"C:proj\x.run").is_absolute());
        assert!(!RunPath::parse(r"\proj\x.run").is_absolute());
    }

    #[test]
    fn posix_paths_are_normalised() {
        let p = RunPath::with_flavour("/a//b/./c.run", PathFlavour::Posix);
        assert_eq!(p.to_string(), "/a/b/c.run");
        assert!(p.is_absolute());
        assert!(!RunPath::with_flavour("a/b", PathFlavour::Posix).is_absolute());
    }

    #[test]
    fn root_is_its_own_parent() {
        let root = RunPath::with_flavour("/", PathFlavour::Posix);
        assert_eq!(root.parent(), root);
        assert_eq!(root.name(), "");
    }

    #[test]
    fn stem_edge_cases() {
        assert_eq!(RunPath::with_flavour("/x/.run", PathFlavour::Posix).stem(), ".run");
        assert_eq!(RunPath::with_flavour("/x/a.b.run", PathFlavour::Posix).stem(), "a.b");
        assert_eq!(RunPath::with_flavour("/x/plain", PathFlavour::Posix).stem(), "plain");
    }

    #[test]
    fn home_expansion_leaves_other_forms() {
        assert_eq!(expand_home("/abs"), "/abs");
        assert_eq!(expand_home("~someone/x"), "~someone/x");
    }
}
