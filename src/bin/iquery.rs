use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use scidb_client::shared::config::CONFIG;
use scidb_client::tabular::ConnectionUrl;
use scidb_client::{Connection, ConnectionOptions, ResultSet, SqlConnection, logging};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

#[derive(Parser)]
#[command(name = "iquery")]
#[command(about = "Interactive SciDB query console", long_about = None)]
struct Args {
    /// The query to execute (non-interactive mode)
    #[arg(short, long)]
    query: Option<String>,

    /// Connection URL, e.g. scidb://localhost:1239
    /// Takes precedence over --host and --port
    #[arg(short, long)]
    url: Option<String>,

    /// Server host
    /// Can also be set via SCIDB_HOST environment variable or config file
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Use AFL instead of AQL
    #[arg(short, long)]
    afl: bool,

    /// Read query from stdin instead of command line
    #[arg(long)]
    stdin: bool,

    /// Maximum number of rows to display (0 = unlimited)
    #[arg(short, long, default_value = "0")]
    limit: usize,
}

struct Config {
    host: String,
    port: u16,
    afl: bool,
}

impl Config {
    fn load() -> anyhow::Result<Self> {
        let file = read_config_file();
        let host = env::var("SCIDB_HOST")
            .ok()
            .or_else(|| file.as_ref().and_then(|c| c.host.clone()))
            .unwrap_or_else(|| CONFIG.connection.host.clone());
        let port = file
            .as_ref()
            .and_then(|c| c.port)
            .unwrap_or(CONFIG.connection.port);
        let afl = file
            .as_ref()
            .and_then(|c| c.afl)
            .unwrap_or(CONFIG.connection.afl);
        Ok(Config { host, port, afl })
    }

    fn merge_with_args(&mut self, args: &Args) -> anyhow::Result<()> {
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(url) = &args.url {
            let target = ConnectionUrl::parse(url)?;
            self.host = target.host;
            self.port = target.port;
        }
        if args.afl {
            self.afl = true;
        }
        Ok(())
    }

    fn connect(&self) -> anyhow::Result<SqlConnection> {
        let options = ConnectionOptions::from_settings(&CONFIG).with_afl(self.afl);
        let connection = Connection::connect(&self.host, self.port, &options)?;
        Ok(SqlConnection::new(connection))
    }
}

#[derive(serde::Deserialize)]
struct ConfigFile {
    #[serde(rename = "config")]
    config: Option<ConfigSection>,
}

#[derive(serde::Deserialize)]
struct ConfigSection {
    host: Option<String>,
    port: Option<u16>,
    afl: Option<bool>,
}

fn read_config_file() -> Option<ConfigSection> {
    let home = dirs::home_dir().map(|home| home.join(".scidb").join("config"));
    let local = Path::new(".scidb").join("config");
    home.into_iter().chain([local]).find_map(|path| {
        let content = fs::read_to_string(&path).ok()?;
        toml::from_str::<ConfigFile>(&content).ok()?.config
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init()?;

    let mut config = Config::load()?;
    config.merge_with_args(&args)?;

    let query = if args.stdin {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        Some(input.trim().to_string())
    } else {
        args.query.clone()
    };

    if let Some(query) = query {
        if query.is_empty() {
            eprintln!("Error: Query cannot be empty");
            std::process::exit(1);
        }
        let conn = config.connect()?;
        let result = run_query(&conn, &query, config.afl, args.limit);
        if let Err(e) = &result {
            let _ = conn.rollback();
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        conn.commit()?;
        conn.close()?;
        return Ok(());
    }

    run_interactive(config, args)
}

/// Runs one query and prints its rows; returns the rendered schema of a
/// selective query.
fn run_query(
    conn: &SqlConnection,
    query: &str,
    afl: bool,
    limit: usize,
) -> anyhow::Result<Option<String>> {
    let mut statement = conn.create_statement()?;
    statement.set_afl(afl);
    match statement.execute_query(query)? {
        Some(mut rs) => {
            display_result_set(&mut rs, limit)?;
            Ok(Some(rs.schema().to_string()))
        }
        None => {
            println!("Query was executed successfully");
            Ok(None)
        }
    }
}

fn run_interactive(mut config: Config, args: Args) -> anyhow::Result<()> {
    let conn = config.connect()?;
    let mut rl = DefaultEditor::new()?;
    let _ = rl.load_history(".iquery_history");

    println!("SciDB Interactive Console");
    println!("Type '\\h' for help, '\\q' to quit");
    println!("Connected to: {}:{}", config.host, config.port);

    let mut query_buffer = String::new();
    let mut last_schema: Option<String> = None;

    loop {
        let prompt = match (query_buffer.is_empty(), config.afl) {
            (false, _) => "  -> ",
            (true, true) => "AFL% ",
            (true, false) => "AQL% ",
        };
        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                if query_buffer.is_empty() && trimmed.starts_with('\\') {
                    let cmd = trimmed
                        .trim_start_matches('\\')
                        .split_whitespace()
                        .next()
                        .unwrap_or("");
                    match cmd {
                        "q" | "quit" => {
                            println!("Goodbye!");
                            break;
                        }
                        "h" | "help" => print_help(),
                        "afl" => {
                            config.afl = true;
                            println!("Query language: AFL");
                        }
                        "aql" => {
                            config.afl = false;
                            println!("Query language: AQL");
                        }
                        "commit" => match conn.commit() {
                            Ok(()) => println!("Committed"),
                            Err(e) => eprintln!("Error: {}", e),
                        },
                        "rollback" => match conn.rollback() {
                            Ok(()) => println!("Rolled back"),
                            Err(e) => eprintln!("Error: {}", e),
                        },
                        "schema" => match &last_schema {
                            Some(schema) => println!("{}", schema),
                            None => println!("No result schema yet"),
                        },
                        _ => eprintln!("Unknown command: \\{}. Type \\h for help.", cmd),
                    }
                    continue;
                }

                if !query_buffer.is_empty() {
                    query_buffer.push('\n');
                }
                query_buffer.push_str(&line);

                if !trimmed.ends_with(';') {
                    continue;
                }
                let query = query_buffer.trim().trim_end_matches(';').trim().to_string();
                query_buffer.clear();
                if query.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&query);

                match run_query(&conn, &query, config.afl, args.limit) {
                    Ok(Some(schema)) => last_schema = Some(schema),
                    Ok(None) => {}
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                query_buffer.clear();
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(".iquery_history");
    conn.close()?;
    Ok(())
}

fn print_help() {
    println!();
    println!("SciDB Console Help");
    println!("──────────────────");
    println!("Special commands:");
    println!("  \\q, \\quit          Exit the console");
    println!("  \\h, \\help          Show this help message");
    println!("  \\afl               Switch to AFL");
    println!("  \\aql               Switch to AQL");
    println!("  \\commit            Complete every active query");
    println!("  \\rollback          Cancel every active query");
    println!("  \\schema            Show the schema of the last result");
    println!();
    println!("Query input:");
    println!("  - End queries with semicolon (;)");
    println!("  - Use Ctrl+C to discard the current input");
    println!();
    println!("Config file:   ~/.scidb/config or .scidb/config");
    println!("  [config]");
    println!("  host = \"localhost\"");
    println!("  port = 1239");
    println!("  afl = true");
    println!();
}

fn display_result_set(rs: &mut ResultSet, row_limit: usize) -> anyhow::Result<()> {
    let columns: Vec<String> = rs
        .metadata()
        .columns()
        .iter()
        .map(|c| c.name.clone())
        .collect();

    let mut rows = Vec::new();
    let mut truncated = false;
    while !rs.is_after_last() {
        if row_limit > 0 && rows.len() == row_limit {
            truncated = true;
            break;
        }
        let mut row = Vec::with_capacity(columns.len());
        for col in 1..=columns.len() {
            let cell = match rs.get_object(col)? {
                Some(value) => value.to_string(),
                None => "NULL".to_string(),
            };
            row.push(cell);
        }
        rows.push(row);
        rs.next()?;
    }

    display_simple_table(&columns, &rows);
    if truncated {
        println!("({} rows shown, limit reached)", rows.len());
    } else {
        println!("({} rows)", rows.len());
    }
    Ok(())
}

fn display_simple_table(columns: &[String], rows: &[Vec<String>]) {
    let mut col_widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (col_idx, value) in row.iter().enumerate() {
            if let Some(width) = col_widths.get_mut(col_idx) {
                *width = (*width).max(value.chars().count().min(50));
            }
        }
    }

    print_rule('┌', '┬', '┐', &col_widths);
    print_row(columns, &col_widths);
    print_rule('├', '┼', '┤', &col_widths);
    for row in rows {
        print_row(row, &col_widths);
    }
    print_rule('└', '┴', '┘', &col_widths);
}

fn print_rule(left: char, mid: char, right: char, widths: &[usize]) {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    println!("{}{}{}", left, segments.join(&mid.to_string()), right);
}

fn print_row(values: &[String], widths: &[usize]) {
    let cells: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(idx, width)| {
            let value = values.get(idx).map(String::as_str).unwrap_or("");
            let shown = if value.chars().count() > *width {
                format!("{}...", value.chars().take(width.saturating_sub(3)).collect::<String>())
            } else {
                value.to_string()
            };
            format!(" {:<width$} ", shown, width = *width)
        })
        .collect();
    println!("│{}│", cells.join("│"));
}
