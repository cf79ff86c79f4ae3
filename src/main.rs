//! tile-export - export map tiles from a database into a z/x/y.png tree.

use db_tile_export::cli::Cli;
use db_tile_export::config::Config;
use db_tile_export::db;
use db_tile_export::error::Result;
use db_tile_export::export::{export_tiles, ExportOptions, ExportSummary, Exporter, TileWriter};
use db_tile_export::logging;
use tracing::{error, info};

fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    logging::init_stderr_logging();

    // The whole export runs on this one thread.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Internal Error: cannot start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run()) {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<ExportSummary> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;

    // CLI > config file > environment > built-in defaults
    let connection = cli.resolve_connection(&config)?;
    cli.apply_export_overrides(&mut config.export);
    config.export.validate()?;

    info!("Connection: {}", connection.display_string());
    let source = db::connect(&connection, &config.export.table).await?;

    let mut exporter = Exporter::new(
        TileWriter::new(&config.export.output_dir),
        ExportOptions::from(&config.export),
        std::io::stdout(),
    );

    export_tiles(source.as_ref(), &mut exporter).await
}
