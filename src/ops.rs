//! Filesystem operation engine
//!
//! Every operation here receives an already-validated absolute path (or a
//! pair of them for move) and re-checks existence and entry kind itself,
//! since the filesystem can change between validation and use. Results are
//! a closed set of typed records, one per operation.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::classify::{self, OCTET_STREAM};
use crate::error::{io_error_for, FsError, FsResult};
use crate::ignore::IgnoreSpec;

// ============================================================================
// Metadata
// ============================================================================

/// Metadata for a single file or directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    pub is_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Octal permission bits, e.g. "644"
    pub permissions: String,
}

pub async fn metadata_for(path: &Path) -> FsResult<FileMetadata> {
    let meta = fs::metadata(path).await.map_err(|e| io_error_for(path, e))?;

    Ok(FileMetadata {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        path: path.display().to_string(),
        is_directory: meta.is_dir(),
        is_file: meta.is_file(),
        size: meta.is_file().then(|| meta.len()),
        modified: meta.modified().ok().map(DateTime::<Utc>::from),
        created: meta.created().ok().map(DateTime::<Utc>::from),
        mime_type: if meta.is_file() {
            classify::mime_for(path)
        } else {
            None
        },
        permissions: permission_bits(&meta),
    })
}

#[cfg(unix)]
fn permission_bits(meta: &std::fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:03o}", meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permission_bits(meta: &std::fs::Metadata) -> String {
    if meta.permissions().readonly() {
        "444".to_string()
    } else {
        "644".to_string()
    }
}

async fn require_file(path: &Path) -> FsResult<std::fs::Metadata> {
    let meta = fs::metadata(path).await.map_err(|e| io_error_for(path, e))?;
    if !meta.is_file() {
        return Err(FsError::NotAFile(path.display().to_string()));
    }
    Ok(meta)
}

async fn require_dir(path: &Path) -> FsResult<std::fs::Metadata> {
    let meta = fs::metadata(path).await.map_err(|e| io_error_for(path, e))?;
    if !meta.is_dir() {
        return Err(FsError::NotADirectory(path.display().to_string()));
    }
    Ok(meta)
}

// ============================================================================
// Read
// ============================================================================

/// Result of a whole-file read: text when the content decodes, base64
/// binary otherwise.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReadResult {
    Text {
        content: String,
        mime_type: String,
        encoding: String,
        lines: usize,
    },
    Binary {
        content: String,
        mime_type: String,
        size: u64,
    },
}

pub async fn read(path: &Path, encoding: Option<&str>) -> FsResult<ReadResult> {
    require_file(path).await?;

    let mime = classify::mime_for(path);
    let bytes = fs::read(path).await.map_err(|e| io_error_for(path, e))?;

    if mime.as_deref().map(classify::is_binary_mime).unwrap_or(false) {
        return Ok(ReadResult::Binary {
            content: BASE64.encode(&bytes),
            mime_type: mime.unwrap_or_else(|| OCTET_STREAM.to_string()),
            size: bytes.len() as u64,
        });
    }

    match classify::decode_text(&bytes, encoding) {
        Ok(content) => Ok(ReadResult::Text {
            lines: content.matches('\n').count() + 1,
            mime_type: mime.unwrap_or_else(|| "text/plain".to_string()),
            encoding: encoding.unwrap_or("utf-8").to_string(),
            content,
        }),
        // Decode failure falls back to a binary representation, never a
        // hard error
        Err(_) => Ok(ReadResult::Binary {
            content: BASE64.encode(&bytes),
            mime_type: OCTET_STREAM.to_string(),
            size: bytes.len() as u64,
        }),
    }
}

/// Result of a head/tail line-sliced read.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadPartialResult {
    pub content: String,
    pub total_lines: usize,
    pub lines_returned: usize,
    pub encoding: String,
}

pub async fn read_partial(
    path: &Path,
    head: Option<usize>,
    tail: Option<usize>,
    encoding: Option<&str>,
) -> FsResult<ReadPartialResult> {
    if head.is_some() && tail.is_some() {
        return Err(FsError::InvalidArgument(
            "head and tail are mutually exclusive".to_string(),
        ));
    }

    require_file(path).await?;
    let bytes = fs::read(path).await.map_err(|e| io_error_for(path, e))?;
    let content = classify::decode_text(&bytes, encoding)?;

    let lines: Vec<&str> = content.lines().collect();
    let total = lines.len();
    let slice: &[&str] = match (head, tail) {
        (Some(n), _) => &lines[..n.min(total)],
        (_, Some(n)) => &lines[total - n.min(total)..],
        _ => &lines[..],
    };

    Ok(ReadPartialResult {
        content: slice.join("\n"),
        total_lines: total,
        lines_returned: slice.len(),
        encoding: encoding.unwrap_or("utf-8").to_string(),
    })
}

/// Result of a media read: always base64, tagged with a coarse kind.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadMediaResult {
    pub content: String,
    pub mime_type: String,
    pub kind: String,
    pub size: u64,
}

pub async fn read_media(path: &Path) -> FsResult<ReadMediaResult> {
    require_file(path).await?;

    let (mime_type, kind) = classify::media_type(path);
    let bytes = fs::read(path).await.map_err(|e| io_error_for(path, e))?;

    Ok(ReadMediaResult {
        content: BASE64.encode(&bytes),
        mime_type,
        kind: kind.as_str().to_string(),
        size: bytes.len() as u64,
    })
}

/// One entry of a batch read: either a read result or a per-item error.
#[derive(Debug, Serialize)]
pub struct BatchReadEntry {
    pub path: String,
    #[serde(flatten)]
    pub result: Option<ReadResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fan out N reads concurrently; a failure in one path is captured as a
/// per-item error entry rather than aborting the batch.
pub async fn read_multiple(
    items: Vec<(String, FsResult<PathBuf>)>,
    encoding: Option<&str>,
) -> Vec<BatchReadEntry> {
    let reads = items.into_iter().map(|(raw, resolved)| async move {
        let outcome = match resolved {
            Ok(path) => read(&path, encoding).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(result) => BatchReadEntry {
                path: raw,
                result: Some(result),
                error: None,
            },
            Err(e) => BatchReadEntry {
                path: raw,
                result: None,
                error: Some(e.to_string()),
            },
        }
    });

    futures_util::future::join_all(reads).await
}

// ============================================================================
// Write / Edit
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct WriteResult {
    pub path: String,
    pub bytes_written: u64,
    pub created: bool,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Heuristic from the wire contract: a non-empty payload made entirely of
/// base64-alphabet characters that also decodes validly is written as raw
/// bytes. Plain text that happens to satisfy both (a short alphanumeric
/// note of length divisible by four) is misclassified as binary; that
/// ambiguity is part of the contract and covered by tests.
fn decode_base64_payload(content: &str) -> Option<Vec<u8>> {
    if content.is_empty() {
        return None;
    }
    let in_alphabet = content
        .chars()
        .filter(|&c| c != '\n')
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=');
    if !in_alphabet {
        return None;
    }
    // Strict decode: embedded newlines or bad padding fall through to text
    BASE64.decode(content.as_bytes()).ok()
}

pub async fn write(
    path: &Path,
    content: &str,
    encoding: Option<&str>,
    create_dirs: bool,
) -> FsResult<WriteResult> {
    if create_dirs {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error_for(parent, e))?;
        }
    }

    let created = !path.exists();

    if let Some(bytes) = decode_base64_payload(content) {
        fs::write(path, &bytes)
            .await
            .map_err(|e| io_error_for(path, e))?;
        return Ok(WriteResult {
            path: path.display().to_string(),
            bytes_written: bytes.len() as u64,
            created,
            content_type: "binary".to_string(),
        });
    }

    // Validates the requested encoding; only UTF-8 is supported
    classify::decode_text(content.as_bytes(), encoding)?;
    fs::write(path, content)
        .await
        .map_err(|e| io_error_for(path, e))?;

    Ok(WriteResult {
        path: path.display().to_string(),
        bytes_written: content.len() as u64,
        created,
        content_type: "text".to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EditResult {
    pub path: String,
    pub replacements: usize,
    pub message: String,
}

/// Exact substring replace-all. Zero matches is not an error: the file is
/// left untouched and the count reports 0.
pub async fn edit(
    path: &Path,
    search: &str,
    replace: &str,
    encoding: Option<&str>,
) -> FsResult<EditResult> {
    if search.is_empty() {
        return Err(FsError::InvalidArgument(
            "search string must not be empty".to_string(),
        ));
    }

    require_file(path).await?;
    let bytes = fs::read(path).await.map_err(|e| io_error_for(path, e))?;
    let content = classify::decode_text(&bytes, encoding)?;

    let count = content.matches(search).count();
    if count == 0 {
        return Ok(EditResult {
            path: path.display().to_string(),
            replacements: 0,
            message: format!("No occurrences of '{search}' found"),
        });
    }

    let new_content = content.replace(search, replace);
    fs::write(path, &new_content)
        .await
        .map_err(|e| io_error_for(path, e))?;

    Ok(EditResult {
        path: path.display().to_string(),
        replacements: count,
        message: format!("Replaced {count} occurrence(s)"),
    })
}

// ============================================================================
// Listing
// ============================================================================

fn compile_pattern(pattern: &str) -> FsResult<glob::Pattern> {
    glob::Pattern::new(pattern)
        .map_err(|e| FsError::InvalidArgument(format!("invalid pattern '{pattern}': {e}")))
}

/// Name globs ("*.txt") match the file name at any depth; patterns with a
/// separator match the path relative to the base.
fn pattern_matches(pattern: &glob::Pattern, base: &Path, path: &Path) -> bool {
    if pattern.as_str().contains('/') {
        path.strip_prefix(base)
            .map(|rel| pattern.matches_path(rel))
            .unwrap_or(false)
    } else {
        path.file_name()
            .map(|name| pattern.matches(&name.to_string_lossy()))
            .unwrap_or(false)
    }
}

fn sort_entries(entries: &mut [FileMetadata]) {
    entries.sort_by(|a, b| {
        (!a.is_directory, a.name.as_str()).cmp(&(!b.is_directory, b.name.as_str()))
    });
}

pub async fn list(
    path: &Path,
    recursive: bool,
    pattern: Option<&str>,
) -> FsResult<Vec<FileMetadata>> {
    require_dir(path).await?;
    let matcher = pattern.map(compile_pattern).transpose()?;

    let mut entries = Vec::new();
    let mut stack = vec![path.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(rd) => rd,
            // Unreadable subdirectories are skipped; the top level is a
            // hard failure
            Err(e) if dir != path => {
                tracing::debug!("skipping unreadable directory {}: {}", dir.display(), e);
                continue;
            }
            Err(e) => return Err(io_error_for(&dir, e)),
        };

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| io_error_for(&dir, e))?
        {
            let child = entry.path();
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);

            if recursive && is_dir {
                stack.push(child.clone());
            }

            let matched = matcher
                .as_ref()
                .map(|m| pattern_matches(m, path, &child))
                .unwrap_or(true);
            if matched {
                if let Ok(meta) = metadata_for(&child).await {
                    entries.push(meta);
                }
            }
        }
    }

    sort_entries(&mut entries);
    Ok(entries)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Size,
}

impl SortKey {
    pub fn parse(raw: &str) -> FsResult<Self> {
        match raw {
            "name" => Ok(SortKey::Name),
            "size" => Ok(SortKey::Size),
            other => Err(FsError::InvalidArgument(format!(
                "sort_by must be 'name' or 'size', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SizedEntry {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    pub size: u64,
    pub size_human: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListSummary {
    pub total_files: usize,
    pub total_directories: usize,
    pub total_size: u64,
    pub total_size_human: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListWithSizesResult {
    pub entries: Vec<SizedEntry>,
    pub summary: ListSummary,
}

/// Human-readable size: 1024-based units, two decimals.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

pub async fn list_with_sizes(path: &Path, sort_by: SortKey) -> FsResult<ListWithSizesResult> {
    let listed = list(path, false, None).await?;

    let mut entries: Vec<SizedEntry> = listed
        .into_iter()
        .map(|meta| {
            let size = meta.size.unwrap_or(0);
            SizedEntry {
                name: meta.name,
                path: meta.path,
                is_directory: meta.is_directory,
                size,
                size_human: human_size(size),
            }
        })
        .collect();

    if sort_by == SortKey::Size {
        entries.sort_by(|a, b| b.size.cmp(&a.size));
    }

    let total_files = entries.iter().filter(|e| !e.is_directory).count();
    let total_directories = entries.len() - total_files;
    let total_size: u64 = entries.iter().filter(|e| !e.is_directory).map(|e| e.size).sum();

    Ok(ListWithSizesResult {
        entries,
        summary: ListSummary {
            total_files,
            total_directories,
            total_size,
            total_size_human: human_size(total_size),
        },
    })
}

// ============================================================================
// Tree
// ============================================================================

/// A node in a recursive directory tree. Directories always carry a
/// children list (possibly empty); files never do.
#[derive(Debug, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(flatten)]
    pub meta: FileMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DirectoryEntry>>,
}

/// Build the tree with an explicit worklist so deep hierarchies cannot
/// overflow the native stack. A child directory that cannot be read keeps
/// an empty children list instead of failing the traversal.
pub async fn tree(path: &Path) -> FsResult<DirectoryEntry> {
    require_dir(path).await?;
    let root_meta = metadata_for(path).await?;

    // Arena of (entry, parent index); children are attached bottom-up at
    // the end, after traversal
    let mut nodes: Vec<(Option<DirectoryEntry>, Option<usize>)> = vec![(
        Some(DirectoryEntry {
            meta: root_meta,
            children: Some(Vec::new()),
        }),
        None,
    )];
    let mut work: Vec<(usize, PathBuf)> = vec![(0, path.to_path_buf())];

    while let Some((index, dir)) = work.pop() {
        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) => {
                if index == 0 {
                    return Err(io_error_for(&dir, e));
                }
                tracing::debug!("unreadable directory {}: {}", dir.display(), e);
                continue;
            }
        };

        let mut children = Vec::new();
        while let Ok(Some(entry)) = read_dir.next_entry().await {
            let child = entry.path();
            if let Ok(meta) = metadata_for(&child).await {
                children.push((child, meta));
            }
        }
        children.sort_by(|a, b| {
            (!a.1.is_directory, a.1.name.as_str()).cmp(&(!b.1.is_directory, b.1.name.as_str()))
        });

        for (child, meta) in children {
            let is_dir = meta.is_directory;
            nodes.push((
                Some(DirectoryEntry {
                    meta,
                    children: is_dir.then(Vec::new),
                }),
                Some(index),
            ));
            if is_dir {
                work.push((nodes.len() - 1, child));
            }
        }
    }

    // Nodes are created strictly after their parent, so a reverse pass
    // attaches every subtree exactly once
    for i in (1..nodes.len()).rev() {
        let entry = nodes[i].0.take();
        let parent = nodes[i].1;
        if let (Some(entry), Some(parent)) = (entry, parent) {
            if let Some((Some(parent_entry), _)) = nodes.get_mut(parent) {
                if let Some(children) = parent_entry.children.as_mut() {
                    children.insert(0, entry);
                }
            }
        }
    }

    nodes
        .swap_remove(0)
        .0
        .ok_or_else(|| FsError::Config("tree assembly invariant broken".to_string()))
}

// ============================================================================
// Search
// ============================================================================

/// Recursive file search: glob on the name, optional substring match on
/// decoded content, gitignore-style exclusions evaluated against the path
/// relative to the base.
pub async fn search(
    base: &Path,
    pattern: &str,
    content: Option<&str>,
    ignore: &IgnoreSpec,
) -> FsResult<Vec<FileMetadata>> {
    require_dir(base).await?;
    let matcher = compile_pattern(pattern)?;

    let mut matches = Vec::new();
    let mut stack = vec![base.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if dir != base => {
                tracing::debug!("skipping unreadable directory {}: {}", dir.display(), e);
                continue;
            }
            Err(e) => return Err(io_error_for(&dir, e)),
        };

        while let Ok(Some(entry)) = read_dir.next_entry().await {
            let child = entry.path();
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);

            let relative = match child.strip_prefix(base) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => continue,
            };
            if ignore.matches(&relative, is_dir) {
                continue;
            }

            if is_dir {
                stack.push(child);
                continue;
            }

            if !pattern_matches(&matcher, base, &child) {
                continue;
            }

            if let Some(needle) = content {
                // Files that fail to decode as text are skipped, not errored
                let Ok(bytes) = fs::read(&child).await else {
                    continue;
                };
                let Ok(text) = std::str::from_utf8(&bytes) else {
                    continue;
                };
                if !text.contains(needle) {
                    continue;
                }
            }

            if let Ok(meta) = metadata_for(&child).await {
                matches.push(meta);
            }
        }
    }

    matches.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(matches)
}

// ============================================================================
// Directory / move / delete / info
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDirResult {
    pub path: String,
    pub created: bool,
    pub message: String,
}

/// Idempotent: an existing directory at the path succeeds with
/// `created=false`; an existing non-directory fails.
pub async fn create_directory(path: &Path, parents: bool) -> FsResult<CreateDirResult> {
    if let Ok(meta) = fs::metadata(path).await {
        if meta.is_dir() {
            return Ok(CreateDirResult {
                path: path.display().to_string(),
                created: false,
                message: "Directory already exists".to_string(),
            });
        }
        return Err(FsError::NotADirectory(path.display().to_string()));
    }

    let result = if parents {
        fs::create_dir_all(path).await
    } else {
        fs::create_dir(path).await
    };
    result.map_err(|e| io_error_for(path, e))?;

    Ok(CreateDirResult {
        path: path.display().to_string(),
        created: true,
        message: "Directory created successfully".to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoveResult {
    pub source: String,
    pub destination: String,
    pub message: String,
}

pub async fn move_path(
    source: &Path,
    destination: &Path,
    overwrite: bool,
) -> FsResult<MoveResult> {
    if !source.exists() {
        return Err(FsError::NotFound(source.display().to_string()));
    }
    if destination.exists() && !overwrite {
        return Err(FsError::AlreadyExists(destination.display().to_string()));
    }

    // An existing directory destination receives the source as a child
    let target = if destination.is_dir() {
        let name = source
            .file_name()
            .ok_or_else(|| FsError::InvalidPath(source.display().to_string()))?;
        destination.join(name)
    } else {
        destination.to_path_buf()
    };

    if let Err(rename_err) = fs::rename(source, &target).await {
        // Cross-device moves: fall back to copy + remove for files
        let meta = fs::metadata(source)
            .await
            .map_err(|e| io_error_for(source, e))?;
        if !meta.is_file() {
            return Err(io_error_for(source, rename_err));
        }
        fs::copy(source, &target)
            .await
            .map_err(|e| io_error_for(&target, e))?;
        fs::remove_file(source)
            .await
            .map_err(|e| io_error_for(source, e))?;
    }

    Ok(MoveResult {
        source: source.display().to_string(),
        destination: target.display().to_string(),
        message: "Moved successfully".to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResult {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

pub async fn delete(path: &Path, recursive: bool) -> FsResult<DeleteResult> {
    let meta = fs::metadata(path).await.map_err(|e| io_error_for(path, e))?;

    if meta.is_file() {
        fs::remove_file(path)
            .await
            .map_err(|e| io_error_for(path, e))?;
        return Ok(DeleteResult {
            path: path.display().to_string(),
            kind: "file".to_string(),
            message: "File deleted successfully".to_string(),
        });
    }

    if recursive {
        fs::remove_dir_all(path)
            .await
            .map_err(|e| io_error_for(path, e))?;
        return Ok(DeleteResult {
            path: path.display().to_string(),
            kind: "directory".to_string(),
            message: "Directory deleted recursively".to_string(),
        });
    }

    let mut read_dir = fs::read_dir(path).await.map_err(|e| io_error_for(path, e))?;
    if read_dir
        .next_entry()
        .await
        .map_err(|e| io_error_for(path, e))?
        .is_some()
    {
        return Err(FsError::DirectoryNotEmpty(path.display().to_string()));
    }

    fs::remove_dir(path)
        .await
        .map_err(|e| io_error_for(path, e))?;
    Ok(DeleteResult {
        path: path.display().to_string(),
        kind: "directory".to_string(),
        message: "Empty directory deleted".to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResult {
    #[serde(flatten)]
    pub meta: FileMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir_count: Option<usize>,
}

pub async fn info(path: &Path) -> FsResult<InfoResult> {
    let meta = metadata_for(path).await?;
    let mut result = InfoResult {
        meta,
        lines: None,
        is_text: None,
        item_count: None,
        file_count: None,
        dir_count: None,
    };

    if result.meta.is_file {
        // Best-effort decode; undecodable files are just flagged binary
        match fs::read(path).await {
            Ok(bytes) => match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    result.lines = Some(text.lines().count());
                    result.is_text = Some(true);
                }
                Err(_) => result.is_text = Some(false),
            },
            Err(_) => result.is_text = Some(false),
        }
    } else if result.meta.is_directory {
        let mut items = 0;
        let mut files = 0;
        let mut dirs = 0;
        let mut read_dir = fs::read_dir(path).await.map_err(|e| io_error_for(path, e))?;
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| io_error_for(path, e))?
        {
            items += 1;
            if let Ok(file_type) = entry.file_type().await {
                if file_type.is_dir() {
                    dirs += 1;
                } else if file_type.is_file() {
                    files += 1;
                }
            }
        }
        result.item_count = Some(items);
        result.file_count = Some(files);
        result.dir_count = Some(dirs);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_size_escalates_units() {
        assert_eq!(human_size(0), "0.00 B");
        assert_eq!(human_size(512), "512.00 B");
        assert_eq!(human_size(1024), "1.00 KB");
        assert_eq!(human_size(1536), "1.50 KB");
        assert_eq!(human_size(1024 * 1024), "1.00 MB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn base64_heuristic_accepts_valid_payloads() {
        let payload = BASE64.encode(b"\x00\x01\x02\x03");
        assert_eq!(
            decode_base64_payload(&payload).as_deref(),
            Some(&b"\x00\x01\x02\x03"[..])
        );
    }

    #[test]
    fn base64_heuristic_rejects_ordinary_text() {
        assert!(decode_base64_payload("hello world").is_none());
        assert!(decode_base64_payload("hello").is_none()); // length not a multiple of 4
        assert!(decode_base64_payload("").is_none());
        assert!(decode_base64_payload("line one\nline two").is_none());
    }

    #[test]
    fn base64_heuristic_known_false_positive() {
        // A plain-text note made only of alphabet characters with a length
        // divisible by four decodes validly and is treated as binary. This
        // ambiguity is inherent to the heuristic.
        assert!(decode_base64_payload("abcd").is_some());
    }

    #[test]
    fn sort_key_parses() {
        assert_eq!(SortKey::parse("name").unwrap(), SortKey::Name);
        assert_eq!(SortKey::parse("size").unwrap(), SortKey::Size);
        assert!(SortKey::parse("mtime").is_err());
    }

    #[test]
    fn name_globs_match_at_any_depth() {
        let pattern = compile_pattern("*.txt").unwrap();
        let base = Path::new("/base");
        assert!(pattern_matches(&pattern, base, Path::new("/base/a.txt")));
        assert!(pattern_matches(&pattern, base, Path::new("/base/sub/b.txt")));
        assert!(!pattern_matches(&pattern, base, Path::new("/base/a.rs")));

        let scoped = compile_pattern("sub/*.txt").unwrap();
        assert!(pattern_matches(&scoped, base, Path::new("/base/sub/b.txt")));
        assert!(!pattern_matches(&scoped, base, Path::new("/base/b.txt")));
    }
}
