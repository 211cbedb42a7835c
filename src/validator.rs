//! Path validation and sandboxing
//!
//! The sole security boundary: every caller-supplied path string passes
//! through [`PathValidator::validate`] before any filesystem operation runs.
//! Containment is checked segment-wise (`Path::starts_with`), never by string
//! prefix, so a root of `/data` can never admit `/data-public`.

use std::path::{Component, Path, PathBuf};

use crate::error::{FsError, FsResult};

#[derive(Debug, Clone)]
pub struct PathValidator {
    /// Canonicalized allowed roots, fixed for the process lifetime
    roots: Vec<PathBuf>,
    home_dir: Option<PathBuf>,
}

impl PathValidator {
    /// Create a validator from configured root directory strings.
    ///
    /// Each root is home/env expanded and canonicalized once. Roots that do
    /// not exist yet are kept in lexically-normalized form so they become
    /// valid as soon as they are created.
    pub fn new(roots: &[String]) -> FsResult<Self> {
        if roots.is_empty() {
            return Err(FsError::Config(
                "No allowed directories configured".to_string(),
            ));
        }

        let home_dir = dirs::home_dir();
        let resolved = roots
            .iter()
            .map(|raw| {
                let expanded = expand(raw, home_dir.as_deref());
                if expanded.is_relative() {
                    return Err(FsError::Config(format!(
                        "Allowed root must be absolute: {raw}"
                    )));
                }
                Ok(expanded
                    .canonicalize()
                    .unwrap_or_else(|_| normalize_lexically(&expanded)))
            })
            .collect::<FsResult<Vec<_>>>()?;

        Ok(Self {
            roots: resolved,
            home_dir,
        })
    }

    /// Canonicalized allowed roots.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Validate a caller-supplied path, returning its canonical absolute form.
    ///
    /// Relative paths are resolved against the configured roots in order,
    /// preferring a root where the path already exists and falling back to
    /// the first root. Fails with [`FsError::AccessDenied`] when the resolved
    /// path escapes every root.
    pub fn validate(&self, raw: &str) -> FsResult<PathBuf> {
        if raw.contains('\0') {
            return Err(FsError::InvalidPath("Path contains null byte".to_string()));
        }

        let expanded = expand(raw, self.home_dir.as_deref());

        let resolved = if expanded.is_absolute() {
            self.canonicalize_lenient(&expanded)?
        } else {
            let existing = self
                .roots
                .iter()
                .map(|root| root.join(&expanded))
                .find(|candidate| candidate.exists());
            match existing {
                Some(candidate) => self.canonicalize_lenient(&candidate)?,
                None => self.canonicalize_lenient(&self.roots[0].join(&expanded))?,
            }
        };

        if self.roots.iter().any(|root| resolved.starts_with(root)) {
            Ok(resolved)
        } else {
            Err(FsError::AccessDenied(raw.to_string()))
        }
    }

    /// Non-throwing probe for whether a path would validate.
    pub fn is_allowed(&self, raw: &str) -> bool {
        self.validate(raw).is_ok()
    }

    /// Express an absolute path relative to the allowed root that contains
    /// it, for display. Paths outside every root are returned unchanged.
    pub fn relativize(&self, path: &Path) -> String {
        for root in &self.roots {
            if let Ok(rel) = path.strip_prefix(root) {
                let rel = rel.to_string_lossy();
                return if rel.is_empty() {
                    ".".to_string()
                } else {
                    rel.to_string()
                };
            }
        }
        path.display().to_string()
    }

    /// Canonicalize a path that may not exist yet: resolve the nearest
    /// existing ancestor through the filesystem, then append the remaining
    /// components lexically (`..` pops, `.` is dropped).
    fn canonicalize_lenient(&self, path: &Path) -> FsResult<PathBuf> {
        match path.canonicalize() {
            Ok(canonical) => Ok(canonical),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut existing = path.to_path_buf();
                let mut tail: Vec<std::ffi::OsString> = Vec::new();
                while !existing.exists() {
                    match existing.file_name() {
                        Some(name) => {
                            tail.push(name.to_os_string());
                            existing.pop();
                        }
                        // Ran out of named components (e.g. ended at "/..")
                        None => break,
                    }
                }

                let base = existing
                    .canonicalize()
                    .map_err(|e| FsError::InvalidPath(format!("{}: {}", path.display(), e)))?;

                let mut resolved = base;
                for name in tail.iter().rev() {
                    match Path::new(name).components().next() {
                        Some(Component::ParentDir) => {
                            resolved.pop();
                        }
                        Some(Component::CurDir) | None => {}
                        _ => resolved.push(name),
                    }
                }
                Ok(resolved)
            }
            Err(e) => Err(crate::error::io_error_for(path, e)),
        }
    }
}

/// Expand a leading `~` and any `$VAR` / `${VAR}` tokens.
///
/// Unknown variables are left untouched, matching shell-style expansion of
/// display paths rather than strict substitution.
fn expand(raw: &str, home_dir: Option<&Path>) -> PathBuf {
    let with_env = expand_env(raw);
    if let Some(home) = home_dir {
        if with_env == "~" {
            return home.to_path_buf();
        }
        if let Some(stripped) = with_env.strip_prefix("~/") {
            return home.join(stripped);
        }
    }
    PathBuf::from(with_env)
}

fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        match chars.peek() {
            Some('{') => {
                chars.next();
                let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                match std::env::var(&name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push_str("${");
                        out.push_str(&name);
                        out.push('}');
                    }
                }
            }
            Some(c) if c.is_ascii_alphanumeric() || *c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match std::env::var(&name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push('$');
                        out.push_str(&name);
                    }
                }
            }
            _ => out.push('$'),
        }
    }

    out
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            _ => resolved.push(component),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator_for(roots: &[&Path]) -> PathValidator {
        let roots: Vec<String> = roots.iter().map(|p| p.display().to_string()).collect();
        PathValidator::new(&roots).unwrap()
    }

    #[test]
    fn rejects_empty_root_list() {
        assert!(matches!(
            PathValidator::new(&[]),
            Err(FsError::Config(_))
        ));
    }

    #[test]
    fn accepts_path_inside_root() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        let validator = validator_for(&[tmp.path()]);
        let resolved = validator.validate(&file.display().to_string()).unwrap();
        assert!(resolved.ends_with("a.txt"));
    }

    #[test]
    fn rejects_path_outside_root() {
        let tmp = tempfile::tempdir().unwrap();
        let validator = validator_for(&[tmp.path()]);
        assert!(matches!(
            validator.validate("/etc/passwd"),
            Err(FsError::AccessDenied(_))
        ));
        assert!(!validator.is_allowed("/etc/passwd"));
    }

    #[test]
    fn rejects_sibling_directory_with_matching_prefix() {
        // root "data" must not admit "data-other", which a naive string
        // prefix comparison would accept
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("data");
        let sibling = tmp.path().join("data-other");
        std::fs::create_dir(&root).unwrap();
        std::fs::create_dir(&sibling).unwrap();
        std::fs::write(sibling.join("secret.txt"), "x").unwrap();

        let validator = validator_for(&[&root]);
        let raw = sibling.join("secret.txt").display().to_string();
        assert!(matches!(
            validator.validate(&raw),
            Err(FsError::AccessDenied(_))
        ));
    }

    #[test]
    fn rejects_parent_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("root");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(tmp.path().join("outside.txt"), "x").unwrap();

        let validator = validator_for(&[&root]);
        let raw = format!("{}/../outside.txt", root.display());
        assert!(matches!(
            validator.validate(&raw),
            Err(FsError::AccessDenied(_))
        ));
        // Relative traversal out of the root is caught too
        assert!(!validator.is_allowed("../outside.txt"));
    }

    #[test]
    fn resolves_relative_path_against_roots_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        std::fs::create_dir(&first).unwrap();
        std::fs::create_dir(&second).unwrap();
        std::fs::write(second.join("only-here.txt"), "x").unwrap();

        let validator = validator_for(&[&first, &second]);

        // Exists only under the second root: resolution prefers it
        let resolved = validator.validate("only-here.txt").unwrap();
        assert!(resolved.starts_with(second.canonicalize().unwrap()));

        // Does not exist anywhere: falls back to the first root
        let resolved = validator.validate("brand-new.txt").unwrap();
        assert!(resolved.starts_with(first.canonicalize().unwrap()));
    }

    #[test]
    fn validates_nonexistent_descendant() {
        let tmp = tempfile::tempdir().unwrap();
        let validator = validator_for(&[tmp.path()]);
        let raw = format!("{}/new/sub/file.txt", tmp.path().display());
        let resolved = validator.validate(&raw).unwrap();
        assert!(resolved.ends_with("new/sub/file.txt"));
    }

    #[test]
    fn rejects_null_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let validator = validator_for(&[tmp.path()]);
        assert!(matches!(
            validator.validate("a\0b"),
            Err(FsError::InvalidPath(_))
        ));
    }

    #[test]
    fn relativize_strips_the_matching_root() {
        let tmp = tempfile::tempdir().unwrap();
        let validator = validator_for(&[tmp.path()]);
        let root = validator.roots()[0].clone();

        assert_eq!(validator.relativize(&root.join("a/b.txt")), "a/b.txt");
        assert_eq!(validator.relativize(&root), ".");
        assert_eq!(
            validator.relativize(Path::new("/somewhere/else")),
            "/somewhere/else"
        );
    }

    #[test]
    fn expands_env_variables() {
        std::env::set_var("REMOTEFS_TEST_DIR", "/tmp");
        assert_eq!(expand_env("$REMOTEFS_TEST_DIR/x"), "/tmp/x");
        assert_eq!(expand_env("${REMOTEFS_TEST_DIR}/x"), "/tmp/x");
        assert_eq!(expand_env("$REMOTEFS_UNSET_VAR/x"), "$REMOTEFS_UNSET_VAR/x");
        assert_eq!(expand_env("no variables"), "no variables");
    }
}
