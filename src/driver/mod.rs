//! The automation run — a strictly linear pass over the target form.
//!
//! Navigate, acquire the workbook, extract rows, click start, then one
//! fill-then-submit cycle per row. No state is revisited; the first
//! unrecoverable fault aborts the pass and propagates to the caller.

pub mod interact;
pub mod mapper;
pub mod scroll;

use crate::config::{Config, FieldTable};
use crate::data::RowSet;
use crate::session::PageSurface;
use crate::{extract, fetch, Error, Result};
use interact::{FormActions, Interactor};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;
use url::Url;

/// What a completed run did.
#[derive(Debug)]
pub struct RunSummary {
    /// Rows filled and submitted, across all groups.
    pub rows_submitted: usize,
    /// Where the workbook landed.
    pub workbook: PathBuf,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

/// Drives one full pass: navigate, acquire the workbook, then fill and
/// submit every extracted row in order.
pub struct Driver<'a, P: PageSurface> {
    surface: &'a P,
    config: &'a Config,
    fields: FieldTable,
}

impl<'a, P: PageSurface> Driver<'a, P> {
    pub fn new(surface: &'a P, config: &'a Config) -> Self {
        let fields = FieldTable::with_overrides(&config.form.fields);
        Self {
            surface,
            config,
            fields,
        }
    }

    /// Run to completion. The caller owns the session and closes it whether
    /// this returns Ok or Err.
    pub async fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();
        let interactor = Interactor::new(self.surface, &self.config.timeouts, &self.config.delays);

        self.navigate(&interactor).await?;
        let workbook = self.acquire_workbook(&interactor).await?;
        let rows = extract::read_rows(&workbook)?;
        info!(
            "extracted {} rows in {} groups",
            rows.row_count(),
            rows.groups.len()
        );

        let rows_submitted = run_form_pass(&interactor, &self.fields, &rows, self.config).await?;

        // Let the last submission's confirmation render before the caller
        // tears the browser down.
        self.surface.settle(self.config.delays.before_close_ms).await;

        Ok(RunSummary {
            rows_submitted,
            workbook,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn navigate(&self, interactor: &Interactor<'a, P>) -> Result<()> {
        let url = &self.config.target.url;
        info!("navigating to {}", url);
        tokio::time::timeout(
            Duration::from_millis(self.config.timeouts.page_load_ms),
            self.surface.goto(url),
        )
        .await
        .map_err(|_| {
            Error::Timeout(format!(
                "page load exceeded {}ms",
                self.config.timeouts.page_load_ms
            ))
        })??;

        // The workbook link appearing is the closest observable signal that
        // the client-side app has rendered; the settle after it covers the
        // rest.
        interactor.resolve(&self.config.form.download_link).await?;
        self.surface
            .settle(self.config.delays.after_navigation_ms)
            .await;
        Ok(())
    }

    async fn acquire_workbook(&self, interactor: &Interactor<'a, P>) -> Result<PathBuf> {
        let link = &self.config.form.download_link;
        let path = interactor.resolve(link).await?;
        let sel = serde_json::to_string(&path).unwrap();
        let js = format!("document.querySelector({sel})?.getAttribute('href')");
        let href = self.surface.eval(&js).await?;
        let Some(href) = href.as_str().filter(|h| !h.is_empty()) else {
            return Err(Error::Download(format!("{} has no href", link)));
        };

        let base = Url::parse(&self.config.target.url)?;
        let url = base.join(href)?;
        let name = fetch::file_name_from_url(&url)?;
        let dest = self.config.download.dir.join(name);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        fetch::download(&client, url.as_str(), &dest).await
    }
}

/// Click start, then fill and submit each row in order, settling between
/// submissions. One row is always exactly one fill-then-submit cycle.
pub(crate) async fn run_form_pass<A: FormActions>(
    actions: &A,
    fields: &FieldTable,
    rows: &RowSet,
    config: &Config,
) -> Result<usize> {
    info!("starting form pass");
    actions.click(&config.form.start).await?;

    let mut submitted = 0;
    for group in &rows.groups {
        for row in group {
            mapper::fill_row(actions, fields, row).await?;
            actions.click(&config.form.submit).await?;
            actions.pause(config.delays.between_submissions_ms).await;
            submitted += 1;
        }
    }

    info!("submitted {} rows", submitted);
    Ok(submitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Row;
    use crate::testutil::{FakePage, Recorder};
    use serde_json::json;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect()
    }

    fn two_row_set() -> RowSet {
        RowSet {
            groups: vec![vec![
                row(&[("FIRSTNAME", "Jane"), ("EMAIL", "jane@x.com")]),
                row(&[("FIRSTNAME", "John"), ("EMAIL", "john@x.com")]),
            ]],
        }
    }

    #[tokio::test]
    async fn test_form_pass_sequence() {
        let recorder = Recorder::new();
        let config = Config::default();
        let fields = FieldTable::standard();

        let submitted = run_form_pass(&recorder, &fields, &two_row_set(), &config)
            .await
            .unwrap();

        assert_eq!(submitted, 2);
        assert_eq!(
            recorder.ops(),
            vec![
                "click button.btn-large.uiColorButton",
                "type input[ng-reflect-name='labelFirstName'] Jane",
                "type input[ng-reflect-name='labelEmail'] jane@x.com",
                "click input[value='Submit']",
                "pause 500",
                "type input[ng-reflect-name='labelFirstName'] John",
                "type input[ng-reflect-name='labelEmail'] john@x.com",
                "click input[value='Submit']",
                "pause 500",
            ]
        );
    }

    #[tokio::test]
    async fn test_form_pass_is_deterministic() {
        let config = Config::default();
        let fields = FieldTable::standard();
        let rows = two_row_set();

        let first = Recorder::new();
        run_form_pass(&first, &fields, &rows, &config).await.unwrap();
        let second = Recorder::new();
        run_form_pass(&second, &fields, &rows, &config)
            .await
            .unwrap();

        assert_eq!(first.ops(), second.ops());
    }

    #[tokio::test]
    async fn test_form_pass_halts_on_unknown_column() {
        let recorder = Recorder::new();
        let config = Config::default();
        let fields = FieldTable::standard();
        let rows = RowSet {
            groups: vec![vec![
                row(&[("FAXNUMBER", "555-0100")]),
                row(&[("FIRSTNAME", "Jane")]),
            ]],
        };

        let err = run_form_pass(&recorder, &fields, &rows, &config)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnknownColumn(_)));
        // Start was clicked, but no submit ever happened.
        assert_eq!(recorder.ops(), vec!["click button.btn-large.uiColorButton"]);
    }

    #[tokio::test]
    async fn test_empty_row_set_clicks_start_only() {
        let recorder = Recorder::new();
        let config = Config::default();
        let fields = FieldTable::standard();

        let submitted = run_form_pass(&recorder, &fields, &RowSet::default(), &config)
            .await
            .unwrap();

        assert_eq!(submitted, 0);
        assert_eq!(recorder.ops(), vec!["click button.btn-large.uiColorButton"]);
    }

    fn test_config(server_uri: &str, dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.target.url = format!("{}/", server_uri);
        config.timeouts.implicit_wait_ms = 50;
        config.timeouts.poll_interval_ms = 10;
        config.download.dir = dir.to_path_buf();
        config
    }

    fn scripted_page() -> FakePage {
        // Probe rules first; bare selector needles would shadow them.
        FakePage::new()
            .on_eval("r.bottom > 0", json!(true))
            .on_eval("getAttribute('href')", json!("files/challenge.csv"))
            .on_eval("a.btn.waves-effect", json!({"count": 1, "path": "#download"}))
            .on_eval("btn-large", json!({"count": 1, "path": "#start"}))
            .on_eval("Submit", json!({"count": 1, "path": "#submit"}))
            .on_eval("labelFirstName", json!({"count": 1, "path": "#first"}))
            .on_eval("labelEmail", json!({"count": 1, "path": "#email"}))
    }

    #[tokio::test]
    async fn test_run_drives_the_whole_pass() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/files/challenge.csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("First Name,Email\nJane,jane@x.com\n"),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&server.uri(), dir.path());
        let page = scripted_page();

        let summary = Driver::new(&page, &config).run().await.unwrap();

        assert_eq!(summary.rows_submitted, 1);
        assert!(summary.workbook.ends_with("challenge.csv"));
        assert!(summary.workbook.exists());

        let calls = page.calls();
        let goto = calls.iter().position(|c| c.starts_with("goto ")).unwrap();
        let start = calls.iter().position(|c| c == "click #start").unwrap();
        let typed = calls.iter().position(|c| c == "type Jane").unwrap();
        let submit = calls.iter().position(|c| c == "click #submit").unwrap();
        let closing = calls.iter().rposition(|c| c == "settle 5000").unwrap();
        assert!(goto < start && start < typed && typed < submit && submit < closing);
    }

    #[tokio::test]
    async fn test_failed_download_short_circuits_before_extraction() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/files/challenge.csv"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&server.uri(), dir.path());
        let page = scripted_page();

        let err = Driver::new(&page, &config).run().await.unwrap_err();

        // Download error, not a parse error: extraction never ran.
        assert!(matches!(err, Error::Download(_)), "got: {}", err);
        assert!(!dir.path().join("challenge.csv").exists());
        // The pass never started either.
        assert!(!page.calls().iter().any(|c| c == "click #start"));
    }
}
