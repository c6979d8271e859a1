use clap::Parser;
use color_eyre::Result;
use dot_journal::cli::{self, Cli};
use dot_journal::{Database, Profile, Settings, logging, output};
use std::io;

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };
    let settings = Settings::load(cli.home.as_deref(), profile)?;

    let level = if cli.verbose { "debug" } else { settings.log_level.as_str() };
    let log_dir = settings.log_to_file.then(|| settings.log_dir());
    let logger = logging::init_logging(level, log_dir.as_deref())?;

    let db = Database::open(settings.database_path())?;
    let mut uow = db.unit_of_work()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = cli::dispatch(cli.command, &mut uow, &settings, &mut out) {
        log::error!("event=command module=cli status=error error={err}");
        output::print_error(&err.to_string());
        drop(uow);
        drop(db);
        logger.flush();
        std::process::exit(1);
    }

    Ok(())
}
