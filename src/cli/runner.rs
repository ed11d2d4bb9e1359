//! CLI runner - executes commands

use crate::cancel::{cancel_pair, CancelToken};
use crate::cli::commands::{Cli, Commands};
use crate::config::TapConfig;
use crate::cursor;
use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::http::{RestClient, RestClientConfig};
use crate::sink::{DiscardSink, JsonlSink, RecordSink};
use crate::state::StateManager;
use crate::stream::StreamDescriptor;
use crate::streams;
use std::collections::HashSet;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Sync {
                streams,
                config_json,
                dry_run,
            } => {
                self.sync(streams.as_deref(), config_json.as_deref(), *dry_run)
                    .await
            }
            Commands::Streams => self.list_streams(),
        }
    }

    /// Load tap configuration, inline JSON winning over the file path
    fn load_config(&self, config_json: Option<&str>) -> Result<TapConfig> {
        let config = match (config_json, &self.cli.config) {
            (Some(json), _) => TapConfig::from_json(json)?,
            (None, Some(path)) => TapConfig::from_file(path)?,
            (None, None) => {
                return Err(Error::config(
                    "No configuration provided (use -C or --config-json)",
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Load saved state, inline JSON winning over the file path
    fn load_state(&self) -> Result<StateManager> {
        match (&self.cli.state_json, &self.cli.state) {
            (Some(json), _) => StateManager::from_json(json),
            (None, Some(path)) => StateManager::from_file(path),
            (None, None) => Ok(StateManager::in_memory()),
        }
    }

    /// Parse the stream selection. Only the names given here count as
    /// selected; a child's parent still runs to collect contexts, but its
    /// own records are emitted only when it appears in this set.
    fn selection(names: Option<&str>) -> Result<Option<HashSet<String>>> {
        let Some(names) = names.filter(|n| !n.trim().is_empty()) else {
            return Ok(None);
        };
        let mut selected = HashSet::new();
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let stream = streams::find(name).ok_or_else(|| Error::StreamNotFound {
                stream: name.to_string(),
            })?;
            selected.insert(stream.name.clone());
        }
        Ok(Some(selected))
    }

    fn is_selected(selected: Option<&HashSet<String>>, name: &str) -> bool {
        selected.map_or(true, |s| s.contains(name))
    }

    /// Sync the selected streams sequentially, parents before children
    async fn sync(
        &self,
        stream_names: Option<&str>,
        config_json: Option<&str>,
        dry_run: bool,
    ) -> Result<()> {
        let config = self.load_config(config_json)?;
        let state = self.load_state()?;
        let selected = Self::selection(stream_names)?;

        if dry_run {
            return self.dry_run(&config, &state, selected.as_ref()).await;
        }

        let mut sink = JsonlSink::stdout();
        let token = ctrl_c_token();
        Self::run_streams(&config, &state, selected.as_ref(), &mut sink, &token).await?;

        state.save().await?;
        info!("sync complete");
        Ok(())
    }

    /// Sync every top-level stream that is selected or has a selected
    /// child, fanning parent contexts out to the selected children.
    async fn run_streams(
        config: &TapConfig,
        state: &StateManager,
        selected: Option<&HashSet<String>>,
        sink: &mut (dyn RecordSink + '_),
        cancel: &CancelToken,
    ) -> Result<()> {
        let client = RestClient::new(RestClientConfig::from_tap_config(config))?;
        let engine = SyncEngine::new(&client, config);
        let mut discard = DiscardSink;

        for parent in streams::top_level() {
            let children: Vec<&StreamDescriptor> = streams::children_of(&parent.name)
                .filter(|c| Self::is_selected(selected, &c.name))
                .collect();
            let parent_selected = Self::is_selected(selected, &parent.name);
            if !parent_selected && children.is_empty() {
                continue;
            }

            // An unselected parent runs only to collect child contexts;
            // its records and bookmark message go nowhere.
            let parent_sink: &mut (dyn RecordSink + '_) = if parent_selected {
                &mut *sink
            } else {
                &mut discard
            };

            let prior = state.bookmark(&parent.name).await;
            let report = engine
                .sync_stream(parent, None, prior.as_deref(), parent_sink, cancel)
                .await?;

            for child in &children {
                let child_prior = state.bookmark(&child.name).await;
                let mut child_bookmark: Option<String> = None;
                for context in &report.child_contexts {
                    let child_report = engine
                        .sync_stream(
                            child,
                            Some(context),
                            child_prior.as_deref(),
                            &mut *sink,
                            cancel,
                        )
                        .await?;
                    if child_report.bookmark > child_bookmark {
                        child_bookmark = child_report.bookmark;
                    }
                }
                // Advances only once every parent context completed.
                if let Some(bookmark) = child_bookmark {
                    state.set_bookmark(&child.name, bookmark).await?;
                }
            }

            // Parent bookmark saved last: a failed child fan-out must not
            // advance it past unprocessed children.
            if parent_selected {
                if let Some(bookmark) = report.bookmark {
                    state.set_bookmark(&parent.name, bookmark).await?;
                }
            }
        }

        Ok(())
    }

    /// Resolve windows and print the plan without touching the network
    async fn dry_run(
        &self,
        config: &TapConfig,
        state: &StateManager,
        selected: Option<&HashSet<String>>,
    ) -> Result<()> {
        for stream in streams::CATALOG.iter() {
            if !Self::is_selected(selected, &stream.name) {
                continue;
            }
            let bookmark = state.bookmark(&stream.name).await;
            let window = cursor::resolve_window(config, bookmark.as_deref());
            let start = window
                .start
                .filter(|_| stream.is_incremental())
                .map(cursor::format_timestamp);
            println!(
                "{}: mode={} start={} end={}",
                stream.name,
                stream.sync_mode(),
                start.as_deref().unwrap_or("-"),
                window
                    .end
                    .map(cursor::format_timestamp)
                    .as_deref()
                    .unwrap_or("-"),
            );
        }
        Ok(())
    }

    /// List available stream names
    fn list_streams(&self) -> Result<()> {
        for stream in streams::CATALOG.iter() {
            println!("{}", stream.name);
        }
        Ok(())
    }
}

/// Cancellation token wired to Ctrl-C
fn ctrl_c_token() -> CancelToken {
    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping sync");
            handle.cancel();
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_selection_none_means_all() {
        assert_eq!(Runner::selection(None).unwrap(), None);
        assert_eq!(Runner::selection(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_selection_child_only_leaves_parent_unselected() {
        let selected = Runner::selection(Some("order_lines")).unwrap().unwrap();
        assert!(selected.contains("order_lines"));
        assert!(!selected.contains("orders"));
    }

    #[test]
    fn test_selection_unknown_stream_fails() {
        let err = Runner::selection(Some("orders,invoices")).unwrap_err();
        assert!(matches!(err, Error::StreamNotFound { .. }));
    }

    fn test_config(server: &MockServer) -> TapConfig {
        serde_json::from_value(json!({
            "base_url": server.uri(),
            "language": "en",
            "api_key": "key",
            "api_secret": "secret",
            "throttle_seconds": 0
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_unselected_parent_records_stay_out_of_the_sink() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/en/orders.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "orders": [{ "id": 7, "updatedAt": "2024-03-01T10:00:00+00:00" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/en/orders/7/products.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "orderProducts": [{ "id": 70 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server);
        let state = StateManager::in_memory();
        let selected = Runner::selection(Some("order_lines")).unwrap();
        let mut sink = CollectingSink::new();

        Runner::run_streams(
            &config,
            &state,
            selected.as_ref(),
            &mut sink,
            &CancelToken::none(),
        )
        .await
        .unwrap();

        // The parent ran for context only, so nothing of it reaches the sink
        // and its bookmark stays where it was.
        assert!(sink.records("orders").is_empty());
        assert!(sink.bookmark("orders").is_none());
        assert_eq!(sink.records("order_lines").len(), 1);
        assert_eq!(state.bookmark("orders").await, None);
    }
}
