use prefsql::config::{default_config_path, load_config, BenchmarkConfig, Config, ConnectionConfig, SqliteConfig};
use prefsql::report::OrDie;
use prefsql::{ExecOutcome, PrefSql, PrefSqlError, ResultSet};
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: prefsql [--config PATH | --database PATH] [--show-errors] [--json] [SQL...]";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config: Option<PathBuf>,
    database: Option<String>,
    show_errors: bool,
    json: bool,
    statements: Vec<String>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--database" => {
                parsed.database = Some(args.next().ok_or("--database needs a path")?);
            }
            "--show-errors" => parsed.show_errors = true,
            "--json" => parsed.json = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag: {}", flag)),
            _ => parsed.statements.push(arg),
        }
    }
    if parsed.config.is_some() && parsed.database.is_some() {
        return Err("--config and --database are mutually exclusive".to_string());
    }
    Ok(parsed)
}

fn resolve_config(args: &CliArgs) -> prefsql::Result<Config> {
    if let Some(database) = &args.database {
        return Ok(Config {
            connection: ConnectionConfig {
                host: "localhost".to_string(),
                login: String::new(),
                password: String::new(),
                database: database.clone(),
                show_errors: false,
            },
            sqlite: SqliteConfig::default(),
            benchmark: BenchmarkConfig::default(),
        });
    }
    let path = args
        .config
        .clone()
        .or_else(default_config_path)
        .ok_or_else(|| PrefSqlError::Config("no configuration file; pass --config or --database".to_string()))?;
    load_config(path)
}

fn print_rows(rs: &ResultSet) {
    println!("{}", rs.columns.join(" | "));
    for row in &rs.rows {
        println!("{}", row.join(" | "));
    }
    println!("({} row(s))", rs.row_count());
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            std::process::exit(2);
        }
    };

    let config = resolve_config(&args).or_die();
    let show_errors = args.show_errors || config.connection.show_errors;
    let driver = config.sqlite_driver();
    let mut db = PrefSql::connect(&driver, &config.connect_params(), show_errors).or_die();
    info!("Starting prefsql on {}", config.connection.database);

    let statements = if args.statements.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .map_err(PrefSqlError::from)
            .or_die()
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect()
    } else {
        args.statements.clone()
    };

    for sql in &statements {
        match db.query(sql).or_die() {
            Some(ExecOutcome::Rows(rs)) => print_rows(&rs),
            Some(ExecOutcome::Affected(n)) => println!("{} row(s) affected", n),
            None => println!("statement failed: {}", sql),
        }
    }

    let benchmark = db.close();
    if args.json {
        println!("{}", benchmark.to_json().or_die());
    } else {
        println!(
            "{} request(s) in {} ms",
            benchmark.request_count(),
            benchmark.total_time(config.benchmark.precision)
        );
    }
}
