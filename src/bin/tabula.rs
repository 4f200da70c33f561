use std::path::PathBuf;
use std::process::ExitCode;
use tabula::config::{self, Config};
use tabula::{BetterPerson, DbClient, Person, SchemaMutable, SchemaTable, TableManager};
use tracing::{error, info};

const USAGE: &str = "usage: tabula [--config PATH] [--verbose] <setup|teardown|columns TABLE>";

#[derive(Debug, PartialEq)]
enum Command {
    Setup,
    Teardown,
    Columns(String),
}

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    verbose: bool,
    command: Command,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut config = None;
    let mut verbose = false;
    let mut rest = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--verbose" | "-v" => verbose = true,
            other => rest.push(other),
        }
    }

    let command = match rest.as_slice() {
        ["setup"] => Command::Setup,
        ["teardown"] => Command::Teardown,
        ["columns", table] => Command::Columns(table.to_string()),
        _ => return Err(USAGE.to_string()),
    };
    Ok(Args {
        config,
        verbose,
        command,
    })
}

fn load(args: &Args) -> tabula::Result<Config> {
    match &args.config {
        Some(path) => config::load_config(path),
        None => match config::default_config_path().filter(|path| path.exists()) {
            Some(path) => config::load_config(path),
            None => Ok(Config::default()),
        },
    }
}

fn run(args: Args) -> tabula::Result<bool> {
    let config = load(&args)?;
    tabula::logging::init_logging(args.verbose || config.verbose())?;

    let database = config.database.with_env_overrides()?;
    info!(path = %database.path, "Starting tabula...");
    let client = DbClient::connect(&database)?;
    let manager = TableManager::new(&client);

    let ok = match args.command {
        Command::Setup => manager.create_table_for::<Person>() && manager.create_table_for::<BetterPerson>(),
        Command::Teardown => manager.drop_table_for::<Person>() && manager.drop_table_for::<BetterPerson>(),
        Command::Columns(table) => {
            let table = SchemaTable::new(&client, &table)?;
            let columns = table.columns()?;
            let json = serde_json::to_string_pretty(&columns)
                .map_err(|err| tabula::StoreError::Query(format!("cannot render columns: {err}")))?;
            println!("{json}");
            true
        }
    };

    client.close()?;
    Ok(ok)
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(code = err.error_code(), "{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
