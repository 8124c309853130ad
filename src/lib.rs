//! # sheetfill
//!
//! Spreadsheet-driven form automation. Point it at a page that links a
//! workbook: it downloads the sheet, reads every row, then drives the form —
//! fill, submit, next row — until the data runs out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sheetfill::{Config, Driver, Session};
//!
//! # #[tokio::main]
//! # async fn main() -> sheetfill::Result<()> {
//! let config = Config::default();
//! let session = Session::launch(&config.browser).await?;
//! let summary = Driver::new(&session, &config).run().await?;
//! println!("Submitted {} rows", summary.rows_submitted);
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod driver;
pub mod extract;
pub mod fetch;
pub mod session;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{Config, FieldTable, Locator};
pub use data::{Row, RowSet};
pub use driver::{Driver, RunSummary};
pub use session::{PageSurface, Session};

/// Result type for sheetfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during config loading or a form run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("interaction failed: {0}")]
    Interaction(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("no field mapping for column '{0}'")]
    UnknownColumn(String),

    #[error("timeout: {0}")]
    Timeout(String),
}
