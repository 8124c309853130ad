pub mod fields;
pub mod schema;

pub use fields::{normalize_header, FieldTable, Locator};
pub use schema::{
    BrowserConfig, Config, Delays, DownloadConfig, FormConfig, TargetUrl, Timeouts, Viewport,
};
