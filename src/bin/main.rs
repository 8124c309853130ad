use clap::Parser;
use sheetfill::{Config, Driver, FieldTable, Session};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "sheetfill")]
#[command(about = "Spreadsheet-driven form automation")]
#[command(version)]
struct Cli {
    /// Config file to run (built-in defaults when omitted)
    config: Option<PathBuf>,

    /// Run in headless mode (overrides config)
    #[arg(long)]
    headless: bool,

    /// Target page URL (overrides config)
    #[arg(long)]
    url: Option<String>,

    /// Directory for the downloaded workbook (overrides config)
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate config without running
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> sheetfill::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    // Load config, apply CLI overrides, re-validate
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if cli.headless {
        config.browser.headless = true;
    }
    if let Some(url) = cli.url {
        config.target.url = url;
    }
    if let Some(dir) = cli.download_dir {
        config.download.dir = dir;
    }
    config.validate()?;

    if cli.check {
        let fields = FieldTable::with_overrides(&config.form.fields);
        println!("Config valid");
        println!("  Target: {}", config.target.url);
        println!("  Download dir: {}", config.download.dir.display());
        println!("  Mapped fields: {}", fields.len());
        println!(
            "  Implicit wait: {}ms, page load: {}ms",
            config.timeouts.implicit_wait_ms, config.timeouts.page_load_ms
        );
        return Ok(());
    }

    println!("Running against {}", config.target.url);

    let session = Session::launch(&config.browser).await?;
    let result = Driver::new(&session, &config).run().await;

    // Closed exactly once, success or failure.
    if let Err(e) = session.close().await {
        tracing::warn!("browser close failed: {}", e);
    }

    println!();
    match result {
        Ok(summary) => {
            println!("✓ Success");
            println!("  Rows submitted: {}", summary.rows_submitted);
            println!("  Workbook: {}", summary.workbook.display());
            println!("  Duration: {}ms", summary.duration_ms);
            Ok(())
        }
        Err(e) => {
            tracing::error!("run failed: {}", e);
            println!("✗ Failed");
            println!("  Error: {}", e);
            std::process::exit(1);
        }
    }
}
