//! MCP server for sandboxed remote filesystem access
//!
//! The dispatch layer: each tool checks the required scope, validates the
//! caller-supplied path through the sandbox, delegates to the operation
//! engine, and attaches a display-relative path to the result.

use std::path::{Path, PathBuf};

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use serde::Serialize;

use crate::config::Config;
use crate::error::FsResult;
use crate::ignore::IgnoreSpec;
use crate::ops::{self, SortKey};
use crate::params::*;
use crate::validator::PathValidator;

/// The remote filesystem MCP server
#[derive(Clone)]
pub struct RemoteFsServer {
    validator: PathValidator,
    config: Config,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Response envelopes
// ============================================================================

fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[derive(Serialize)]
struct WithRelativePath<T: Serialize> {
    #[serde(flatten)]
    inner: T,
    relative_path: String,
}

#[derive(Serialize)]
struct MoveEnvelope {
    #[serde(flatten)]
    inner: ops::MoveResult,
    relative_source: String,
    relative_destination: String,
}

// ============================================================================
// Tool router
// ============================================================================

#[tool_router]
impl RemoteFsServer {
    /// Create a server with explicit config. Allowed roots are created on
    /// startup if missing.
    pub fn with_config(config: Config) -> FsResult<Self> {
        let validator = PathValidator::new(&config.paths.roots)?;

        for root in validator.roots() {
            if let Err(e) = std::fs::create_dir_all(root) {
                tracing::warn!("could not create allowed root {}: {}", root.display(), e);
            }
        }

        Ok(Self {
            validator,
            config,
            tool_router: Self::tool_router(),
        })
    }

    #[tool(
        description = "Read the contents of a file. Text files return decoded content; binary files return base64 with a MIME type."
    )]
    async fn read_file(
        &self,
        Parameters(params): Parameters<ReadFileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("read")?;
        let path = self.validate(&params.path)?;
        let result = ops::read(&path, params.encoding.as_deref()).await?;
        json_success(&self.with_relative(&path, result))
    }

    #[tool(
        description = "Read only the first or last N lines of a text file. head and tail are mutually exclusive."
    )]
    async fn read_file_lines(
        &self,
        Parameters(params): Parameters<ReadFileLinesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("read")?;
        let path = self.validate(&params.path)?;
        let result =
            ops::read_partial(&path, params.head, params.tail, params.encoding.as_deref()).await?;
        json_success(&self.with_relative(&path, result))
    }

    #[tool(
        description = "Read an image or audio file. Returns base64 content with a MIME type and a kind tag (image/audio/blob)."
    )]
    async fn read_media_file(
        &self,
        Parameters(params): Parameters<ReadMediaFileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("read")?;
        let path = self.validate(&params.path)?;
        let result = ops::read_media(&path).await?;
        json_success(&self.with_relative(&path, result))
    }

    #[tool(
        description = "Read multiple files at once. Each file is read independently; a failure for one file is reported per-item and doesn't affect the others."
    )]
    async fn read_multiple_files(
        &self,
        Parameters(params): Parameters<ReadMultipleFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("read")?;
        let items = params
            .paths
            .iter()
            .map(|raw| (raw.clone(), self.validator.validate(raw)))
            .collect();
        let files = ops::read_multiple(items, params.encoding.as_deref()).await;
        json_success(&serde_json::json!({ "files": files }))
    }

    #[tool(
        description = "Write content to a file. Base64 payloads are detected and written as raw bytes; anything else is written as text. Creates parent directories by default."
    )]
    async fn write_file(
        &self,
        Parameters(params): Parameters<WriteFileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("write")?;
        let path = self.validate(&params.path)?;
        let result = ops::write(
            &path,
            &params.content,
            params.encoding.as_deref(),
            params.create_dirs,
        )
        .await?;
        json_success(&self.with_relative(&path, result))
    }

    #[tool(
        description = "Edit a file by replacing every exact occurrence of a search string. Zero matches leaves the file unchanged and reports a count of 0."
    )]
    async fn edit_file(
        &self,
        Parameters(params): Parameters<EditFileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("write")?;
        let path = self.validate(&params.path)?;
        let result = ops::edit(
            &path,
            &params.search,
            &params.replace,
            params.encoding.as_deref(),
        )
        .await?;
        json_success(&self.with_relative(&path, result))
    }

    #[tool(
        description = "List files and directories with metadata, directories first. Optionally recursive and glob-filtered."
    )]
    async fn list_directory(
        &self,
        Parameters(params): Parameters<ListDirectoryParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("read")?;
        let path = self.resolve_or_root(&params.path)?;
        let entries = ops::list(&path, params.recursive, params.pattern.as_deref()).await?;
        json_success(&self.with_relative_entries(entries))
    }

    #[tool(
        description = "List a directory with human-readable sizes and a summary of totals. Sort by 'name' or 'size'."
    )]
    async fn list_directory_with_sizes(
        &self,
        Parameters(params): Parameters<ListDirectoryWithSizesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("read")?;
        let path = self.resolve_or_root(&params.path)?;
        let sort_by = SortKey::parse(&params.sort_by)?;
        let result = ops::list_with_sizes(&path, sort_by).await?;
        json_success(&self.with_relative(&path, result))
    }

    #[tool(
        description = "Get a recursive directory tree as nested entries. Unreadable subdirectories appear with empty children."
    )]
    async fn directory_tree(
        &self,
        Parameters(params): Parameters<DirectoryTreeParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("read")?;
        let path = self.resolve_or_root(&params.path)?;
        let result = ops::tree(&path).await?;
        json_success(&self.with_relative(&path, result))
    }

    #[tool(
        description = "Search for files by name glob and optional content substring. Gitignore-style patterns exclude matches; VCS and cache directories are excluded by default."
    )]
    async fn search_files(
        &self,
        Parameters(params): Parameters<SearchFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("read")?;
        let base = self.resolve_or_root(&params.path)?;
        let patterns = params
            .ignore_patterns
            .unwrap_or_else(|| self.config.search.default_ignore.clone());
        let ignore = IgnoreSpec::compile(&base, &patterns)?;
        let matches =
            ops::search(&base, &params.pattern, params.content.as_deref(), &ignore).await?;
        json_success(&self.with_relative_entries(matches))
    }

    #[tool(
        description = "Create a directory. Succeeds with created=false if it already exists; creates parents by default."
    )]
    async fn create_directory(
        &self,
        Parameters(params): Parameters<CreateDirectoryParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("write")?;
        let path = self.validate(&params.path)?;
        let result = ops::create_directory(&path, params.parents).await?;
        json_success(&self.with_relative(&path, result))
    }

    #[tool(
        description = "Move or rename a file or directory. Fails if the destination exists unless overwrite=true; an existing directory destination receives the source as a child."
    )]
    async fn move_file(
        &self,
        Parameters(params): Parameters<MoveFileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("write")?;
        let source = self.validate(&params.source)?;
        let destination = self.validate(&params.destination)?;
        let result = ops::move_path(&source, &destination, params.overwrite).await?;

        let relative_source = self.validator.relativize(&source);
        let relative_destination = self
            .validator
            .relativize(Path::new(&result.destination));
        json_success(&MoveEnvelope {
            inner: result,
            relative_source,
            relative_destination,
        })
    }

    #[tool(
        description = "Delete a file or directory. Non-empty directories require recursive=true."
    )]
    async fn delete_file(
        &self,
        Parameters(params): Parameters<DeleteFileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("write")?;
        let path = self.validate(&params.path)?;
        let result = ops::delete(&path, params.recursive).await?;
        json_success(&self.with_relative(&path, result))
    }

    #[tool(
        description = "Get detailed information about a file or directory, including line count and text/binary classification for files and child counts for directories."
    )]
    async fn get_file_info(
        &self,
        Parameters(params): Parameters<GetFileInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        self.require_scope("read")?;
        let path = self.validate(&params.path)?;
        let result = ops::info(&path).await?;
        json_success(&self.with_relative(&path, result))
    }

    #[tool(description = "List the allowed root directories this server can access.")]
    async fn list_allowed_directories(&self) -> Result<CallToolResult, McpError> {
        let roots: Vec<String> = self
            .validator
            .roots()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        json_success(&serde_json::json!({ "allowed_directories": roots }))
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl RemoteFsServer {
    fn require_scope(&self, scope: &str) -> Result<(), McpError> {
        if self.config.auth.grants(scope) {
            Ok(())
        } else {
            Err(McpError::invalid_request(
                format!("Insufficient permissions: '{scope}' scope required"),
                None,
            ))
        }
    }

    fn validate(&self, raw: &str) -> Result<PathBuf, McpError> {
        self.validator.validate(raw).map_err(McpError::from)
    }

    /// An empty path argument means the first allowed root.
    fn resolve_or_root(&self, raw: &str) -> Result<PathBuf, McpError> {
        if raw.is_empty() {
            Ok(self.validator.roots()[0].clone())
        } else {
            self.validate(raw)
        }
    }

    fn with_relative<T: Serialize>(&self, path: &Path, inner: T) -> WithRelativePath<T> {
        WithRelativePath {
            relative_path: self.validator.relativize(path),
            inner,
        }
    }

    fn with_relative_entries(
        &self,
        entries: Vec<ops::FileMetadata>,
    ) -> Vec<WithRelativePath<ops::FileMetadata>> {
        entries
            .into_iter()
            .map(|meta| WithRelativePath {
                relative_path: self.validator.relativize(Path::new(&meta.path)),
                inner: meta,
            })
            .collect()
    }
}

// ============================================================================
// Server handler
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for RemoteFsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Remote filesystem MCP server. All operations are confined to \
                 configured allowed root directories; paths may be absolute or \
                 relative to a root. Use list_allowed_directories to see what \
                 is accessible."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
