use anyhow::bail;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn setup_tracing() {
    // Stderr, so traces never mix into query output.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
}

fn main() -> anyhow::Result<()> {
    setup_tracing();

    let args = std::env::args().collect::<Vec<_>>();
    match args.len() {
        0 | 1 => bail!("Missing <database path> and <command>"),
        2 => bail!("Missing <command>"),
        _ => {}
    }

    handle_command(&args[1], &args[2])
}

fn handle_command(path: &str, command: &str) -> anyhow::Result<()> {
    match command {
        ".dbinfo" => peeklite::print_db_info(path),
        ".tables" => peeklite::print_tables(path),
        cmd if cmd.starts_with('.') => bail!("Unrecognized dot command: {}", cmd),
        sql => peeklite::run_sql(path, sql),
    }
}
