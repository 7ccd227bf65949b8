//! `tractstack visible`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::info;

use tractstack_beliefs::{
    apply_beliefs, belief_set, decode, is_visible, watch_pane, Belief, BeliefFilter, BeliefStore, DriverTiming,
    PaneFilters, PaneSurface, VisibilityDriver,
};
use tractstack_config::EngineConfig;
use tractstack_core::{EventLog, EventSink, EventStream};
use tractstack_logging::LoggedSink;

use crate::input::read_text;

#[derive(Args, Debug)]
pub struct VisibleArgs {
    /// Belief set JSON: array of {slug, verb, object?}
    #[arg(long)]
    pub beliefs: Option<PathBuf>,
    /// Held-beliefs filter JSON
    #[arg(long)]
    pub held: Option<PathBuf>,
    /// Withheld-beliefs filter JSON
    #[arg(long)]
    pub withheld: Option<PathBuf>,
    /// Pane filters JSON: {paneId: {heldBeliefs?, withheldBeliefs?}}
    #[arg(long, conflicts_with_all = ["held", "withheld"])]
    pub panes: Option<PathBuf>,
    /// Clear the beliefs named by --held before deciding
    #[arg(long, requires = "held")]
    pub go_back: bool,
    /// Belief events to replay against --panes: array of {atMs, event}
    #[arg(long, requires = "panes")]
    pub replay: Option<PathBuf>,
}

/// One timed belief event in a replay file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplayStep {
    at_ms: u64,
    event: EventStream,
}

/// Records what the driver did to a pane.
#[derive(Debug, Default)]
struct SurfaceLog {
    ops: Vec<&'static str>,
}

impl PaneSurface for SurfaceLog {
    fn show(&mut self) {
        self.ops.push("show");
    }
    fn hide(&mut self) {
        self.ops.push("hide");
    }
    fn scroll_into_view(&mut self) {
        self.ops.push("scroll");
    }
}

async fn read_belief_input<T: DeserializeOwned>(path: Option<&Path>) -> Result<Option<T>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = read_text(path).await?;
    let value = decode(&raw).with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(Some(value))
}

pub async fn run(args: VisibleArgs, config: &EngineConfig) -> Result<Value> {
    let beliefs: Vec<Belief> = read_belief_input(args.beliefs.as_deref()).await?.unwrap_or_default();
    let held: Option<BeliefFilter> = read_belief_input(args.held.as_deref()).await?;
    let withheld: Option<BeliefFilter> = read_belief_input(args.withheld.as_deref()).await?;
    let panes: Option<BTreeMap<String, PaneFilters>> = read_belief_input(args.panes.as_deref()).await?;

    let store = BeliefStore::with_beliefs(belief_set(beliefs));

    if let Some(replay) = args.replay.as_deref() {
        let steps: Vec<ReplayStep> = read_belief_input(Some(replay)).await?.unwrap_or_default();
        let panes = panes.unwrap_or_default();
        let timing = DriverTiming::from_millis(config.settle_ms(), config.scroll_delay_ms());
        return replay_events(store, &panes, steps, timing).await;
    }

    let mut sink = LoggedSink::new(EventLog::new());
    if args.go_back {
        let Some(held) = held.as_ref() else {
            bail!("--go-back needs a held-beliefs filter");
        };
        for event in store.go_back(held) {
            sink.push(event);
        }
    }

    let snapshot = store.snapshot();
    let events = sink.into_inner().drain();
    let beliefs: Vec<&Belief> = snapshot.values().collect();

    Ok(match panes {
        Some(panes) => json!({
            "visibility": apply_beliefs(&panes, &snapshot),
            "beliefs": beliefs,
            "events": events,
        }),
        None => json!({
            "visible": is_visible(held.as_ref(), withheld.as_ref(), &snapshot),
            "beliefs": beliefs,
            "events": events,
        }),
    })
}

/// Drive every pane through a timed sequence of belief events and report
/// what each surface saw.
async fn replay_events(
    store: BeliefStore,
    panes: &BTreeMap<String, PaneFilters>,
    mut steps: Vec<ReplayStep>,
    timing: DriverTiming,
) -> Result<Value> {
    steps.sort_by_key(|s| s.at_ms);
    let start = Instant::now();

    let mut surfaces: BTreeMap<&str, Arc<Mutex<SurfaceLog>>> = BTreeMap::new();
    let mut tasks = Vec::with_capacity(panes.len());
    for (pane_id, filters) in panes {
        let driver = VisibilityDriver::new(pane_id.clone(), filters.clone(), SurfaceLog::default(), timing);
        surfaces.insert(pane_id.as_str(), driver.surface());
        tasks.push(watch_pane(driver, store.subscribe()));
    }

    let mut sink = LoggedSink::new(EventLog::new());
    for step in &steps {
        sleep_until(start + Duration::from_millis(step.at_ms)).await;
        if store.apply_event(&step.event) {
            sink.push(step.event.clone());
        }
    }

    // Let the last reveal's scroll land before tearing the watchers down.
    let last_ms = steps.last().map_or(0, |s| s.at_ms);
    sleep_until(start + Duration::from_millis(last_ms) + timing.scroll_delay + Duration::from_millis(1)).await;
    let snapshot = store.snapshot();
    drop(store);
    for task in tasks {
        task.await.context("Pane watcher failed")?;
    }

    let mut ops = BTreeMap::new();
    for (pane_id, surface) in surfaces {
        ops.insert(pane_id, surface.lock().await.ops.clone());
    }
    info!(panes = ops.len(), steps = steps.len(), "Replayed belief events");

    Ok(json!({
        "visibility": apply_beliefs(panes, &snapshot),
        "surfaceOps": ops,
        "beliefs": snapshot.values().collect::<Vec<_>>(),
        "events": sink.into_inner().drain(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tractstack_config::VisibilityConfig;

    fn args() -> VisibleArgs {
        VisibleArgs { beliefs: None, held: None, withheld: None, panes: None, go_back: false, replay: None }
    }

    async fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        tokio::fs::write(&path, body).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_held_filter() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args();
        a.beliefs = Some(write(dir.path(), "b.json", r#"[{"slug":"A","verb":"yes"}]"#).await);
        a.held = Some(write(dir.path(), "h.json", r#"{"A":["yes","maybe"]}"#).await);
        let out = run(a, &EngineConfig::default()).await.unwrap();
        assert_eq!(out["visible"], true);
        assert!(out["events"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_filters_is_visible() {
        let out = run(args(), &EngineConfig::default()).await.unwrap();
        assert_eq!(out["visible"], true);
    }

    #[tokio::test]
    async fn test_malformed_beliefs_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args();
        a.beliefs = Some(write(dir.path(), "b.json", r#"[{"verb":"yes"}]"#).await);
        let err = run(a, &EngineConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("b.json"));
        assert!(format!("{:#}", err).contains("invalid belief data"));
    }

    #[tokio::test]
    async fn test_go_back_clears_and_emits() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args();
        a.beliefs = Some(
            write(dir.path(), "b.json", r#"[{"slug":"A","verb":"yes"},{"slug":"B","verb":"no"}]"#).await,
        );
        a.held = Some(write(dir.path(), "h.json", r#"{"A":"yes"}"#).await);
        a.go_back = true;
        let out = run(a, &EngineConfig::default()).await.unwrap();

        assert_eq!(out["visible"], false);
        assert_eq!(out["beliefs"].as_array().unwrap().len(), 1);
        assert_eq!(out["beliefs"][0]["slug"], "B");
        assert_eq!(out["events"][0]["id"], "A");
        assert_eq!(out["events"][0]["verb"], "UNSET");
    }

    #[tokio::test]
    async fn test_pane_map() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args();
        a.beliefs = Some(write(dir.path(), "b.json", r#"[{"slug":"A","verb":"yes"}]"#).await);
        a.panes = Some(
            write(
                dir.path(),
                "p.json",
                r#"{"intro":{},"pitch":{"withheldBeliefs":{"A":"*"}},"deep":{"heldBeliefs":{"A":"yes"}}}"#,
            )
            .await,
        );
        let out = run(a, &EngineConfig::default()).await.unwrap();
        assert_eq!(out["visibility"]["intro"], true);
        assert_eq!(out["visibility"]["pitch"], false);
        assert_eq!(out["visibility"]["deep"], true);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_uses_configured_timing() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args();
        a.panes = Some(write(dir.path(), "p.json", r#"{"deep":{"heldBeliefs":{"A":"yes"}}}"#).await);
        a.replay = Some(
            write(
                dir.path(),
                "r.json",
                r#"[{"atMs":200,"event":{"id":"A","type":"Belief","verb":"yes"}}]"#,
            )
            .await,
        );

        let quick = EngineConfig {
            visibility: Some(VisibilityConfig { settle_ms: Some(100), scroll_delay_ms: Some(20) }),
            ..Default::default()
        };
        let out = run(a, &quick).await.unwrap();
        assert_eq!(out["visibility"]["deep"], true);
        assert_eq!(out["surfaceOps"]["deep"], json!(["hide", "show", "scroll"]));
        assert_eq!(out["events"][0]["id"], "A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_inside_settle_window_does_not_scroll() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args();
        a.panes = Some(write(dir.path(), "p.json", r#"{"deep":{"heldBeliefs":{"A":"yes"}}}"#).await);
        a.replay = Some(
            write(
                dir.path(),
                "r.json",
                r#"[{"atMs":200,"event":{"id":"A","type":"Belief","verb":"yes"}}]"#,
            )
            .await,
        );

        let out = run(a, &EngineConfig::default()).await.unwrap();
        assert_eq!(out["surfaceOps"]["deep"], json!(["hide", "show"]));
    }
}
