//! Remote filesystem MCP server
//!
//! Sandboxed, scope-gated filesystem access over MCP. All operations are
//! confined to configured allowed root directories; the [`validator`]
//! module is the only security boundary and the [`ops`] module implements
//! the filesystem actions behind it.
//!
//! The core (validator + ops + classify + ignore) is usable as a library;
//! [`server`] is the MCP dispatch layer on top of it.

pub mod classify;
pub mod config;
pub mod error;
pub mod ignore;
pub mod ops;
pub mod params;
pub mod server;
pub mod validator;

pub use config::Config;
pub use error::{FsError, FsResult};
pub use server::RemoteFsServer;
pub use validator::PathValidator;
