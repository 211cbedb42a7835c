//! Parameter types for the filesystem MCP tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadFileParams {
    #[schemars(description = "Path to the file (absolute or relative to an allowed root)")]
    pub path: String,

    #[schemars(description = "Text encoding (default: utf-8)")]
    pub encoding: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadFileLinesParams {
    #[schemars(description = "Path to the file")]
    pub path: String,

    #[schemars(description = "Return only the first N lines (mutually exclusive with tail)")]
    pub head: Option<usize>,

    #[schemars(description = "Return only the last N lines (mutually exclusive with head)")]
    pub tail: Option<usize>,

    #[schemars(description = "Text encoding (default: utf-8)")]
    pub encoding: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadMediaFileParams {
    #[schemars(description = "Path to the media file")]
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadMultipleFilesParams {
    #[schemars(description = "Paths of the files to read")]
    pub paths: Vec<String>,

    #[schemars(description = "Text encoding (default: utf-8)")]
    pub encoding: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WriteFileParams {
    #[schemars(description = "Path to the file to write")]
    pub path: String,

    #[schemars(description = "Content to write (text, or base64 for binary payloads)")]
    pub content: String,

    #[schemars(description = "Text encoding (default: utf-8)")]
    pub encoding: Option<String>,

    #[schemars(description = "Create parent directories if they don't exist (default: true)")]
    #[serde(default = "default_true")]
    pub create_dirs: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EditFileParams {
    #[schemars(description = "Path to the file to edit")]
    pub path: String,

    #[schemars(description = "Exact text to search for")]
    pub search: String,

    #[schemars(description = "Replacement text")]
    pub replace: String,

    #[schemars(description = "Text encoding (default: utf-8)")]
    pub encoding: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListDirectoryParams {
    #[schemars(description = "Directory path (defaults to the first allowed root)")]
    #[serde(default)]
    pub path: String,

    #[schemars(description = "List recursively (default: false)")]
    #[serde(default)]
    pub recursive: bool,

    #[schemars(description = "Optional glob pattern to filter entries (e.g. '*.rs')")]
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListDirectoryWithSizesParams {
    #[schemars(description = "Directory path (defaults to the first allowed root)")]
    #[serde(default)]
    pub path: String,

    #[schemars(description = "Sort order: 'name' or 'size' (default: name)")]
    #[serde(default = "default_sort")]
    pub sort_by: String,
}

fn default_sort() -> String {
    "name".to_string()
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DirectoryTreeParams {
    #[schemars(description = "Directory path (defaults to the first allowed root)")]
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchFilesParams {
    #[schemars(description = "Base path for the search (defaults to the first allowed root)")]
    #[serde(default)]
    pub path: String,

    #[schemars(description = "Glob pattern for file names (default: *)")]
    #[serde(default = "default_pattern")]
    pub pattern: String,

    #[schemars(description = "Only return files containing this text")]
    pub content: Option<String>,

    #[schemars(description = "Gitignore-style patterns to exclude (defaults to VCS and cache directories)")]
    pub ignore_patterns: Option<Vec<String>>,
}

fn default_pattern() -> String {
    "*".to_string()
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateDirectoryParams {
    #[schemars(description = "Path of the directory to create")]
    pub path: String,

    #[schemars(description = "Create parent directories as needed (default: true)")]
    #[serde(default = "default_true")]
    pub parents: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MoveFileParams {
    #[schemars(description = "Source path")]
    pub source: String,

    #[schemars(description = "Destination path; an existing directory receives the source as a child")]
    pub destination: String,

    #[schemars(description = "Overwrite an existing destination (default: false)")]
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteFileParams {
    #[schemars(description = "Path to the file or directory to delete")]
    pub path: String,

    #[schemars(description = "Recursively delete directories (default: false)")]
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetFileInfoParams {
    #[schemars(description = "Path to the file or directory")]
    pub path: String,
}

fn default_true() -> bool {
    true
}
