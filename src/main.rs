use notes_testdb::{init_logger, Database, DbError};

const USAGE: &str = "usage: notes-testdb <setup|teardown|reset|check>";
const COMMANDS: [&str; 4] = ["setup", "teardown", "reset", "check"];

fn main() {
    init_logger();

    let command = std::env::args().nth(1).unwrap_or_default();
    if !COMMANDS.contains(&command.as_str()) {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    if let Err(err) = run(&command) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run(command: &str) -> Result<(), DbError> {
    let database = Database::from_env()?;
    match command {
        "setup" => database.setup()?,
        "teardown" => return database.teardown(),
        "reset" => database.reset()?,
        _ => {}
    }

    database.check()?;
    log::info!("notes table matches its schema");
    Ok(())
}
