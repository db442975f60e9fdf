//! Test database support for the notes web application: a `DATABASE_URL`
//! driven connection handle and the schema of the `notes` table.

#[macro_use]
extern crate diesel;

pub mod config;
pub mod db;
pub mod errors;
pub mod fixtures;
pub mod metadata;
pub mod models;
pub mod schema;

pub use config::Config;
pub use db::{shared, Database, Pool};
pub use errors::DbError;
pub use metadata::{MetaData, TableDescriptor, METADATA, NOTES_TABLE};
pub use models::{NewNote, Note};

/// Initializes `env_logger` with an `info` default. Repeated calls are ignored.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("info"))
        .try_init();
}
