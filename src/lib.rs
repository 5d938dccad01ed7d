//! A small object-mapping facade over SQLite and a demo that exercises it.
//!
//! # Intention
//!
//! - Map plain record types onto tables described by a textual mapping.
//! - Expose insert/query/update/delete through one helper facade.
//! - Capture what happened in a log that can be shown to the user.
//!
//! # Architectural Boundaries
//!
//! - Query fragments are passed to SQLite untouched; no query language lives here.
//! - Only one connection per service; callers own its lifetime.

pub mod app;
pub mod config;
pub mod demo;
pub mod error;
pub mod helper;
pub mod logging;
pub mod mapping;
pub mod model;
pub mod sqlite;

pub use app::{DemoApp, Screen};
pub use config::AppConfig;
pub use error::{OrmError, OrmResult};
pub use helper::OrmHelper;
pub use mapping::Mapping;
pub use model::{Entity, Record};
pub use sqlite::{SqliteConfig, SqliteService};
