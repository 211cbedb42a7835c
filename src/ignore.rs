//! Gitignore-style ignore patterns for searches

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::{FsError, FsResult};

/// An ordered set of gitignore-style patterns, compiled once per search.
#[derive(Debug)]
pub struct IgnoreSpec {
    matcher: Option<Gitignore>,
}

impl IgnoreSpec {
    /// Compile patterns rooted at the search base. An empty pattern list
    /// matches nothing.
    pub fn compile(base: &Path, patterns: &[String]) -> FsResult<Self> {
        if patterns.is_empty() {
            return Ok(Self { matcher: None });
        }

        let mut builder = GitignoreBuilder::new(base);
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .map_err(|e| FsError::InvalidPattern(format!("{pattern}: {e}")))?;
        }
        let matcher = builder
            .build()
            .map_err(|e| FsError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            matcher: Some(matcher),
        })
    }

    /// Whether a path (relative to the search base) matches any pattern.
    pub fn matches(&self, relative: &Path, is_dir: bool) -> bool {
        match &self.matcher {
            Some(matcher) => matcher
                .matched_path_or_any_parents(relative, is_dir)
                .is_ignore(),
            None => false,
        }
    }
}
