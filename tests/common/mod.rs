use std::sync::OnceLock;

use notes_testdb::{init_logger, Database};

static DATABASE: OnceLock<Database> = OnceLock::new();

/// The migrated test database named by `DATABASE_URL`.
pub fn database() -> &'static Database {
    DATABASE.get_or_init(|| {
        init_logger();
        let database = Database::from_env().expect("DATABASE_URL must name a reachable database");
        database.setup().expect("failed to create the notes table");
        database
    })
}
