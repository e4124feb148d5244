//! Application dispatcher / 应用调度
//!
//! UI events arrive as explicit commands:
//! - `load_store`: one-time snapshot load, drives the status line
//! - `on_query_submitted`: search → rank → cards, graphs queued for the next frame
//! - `on_theme_toggled`: persist the choice and re-run the current query
//! - `run_frame`: draw the queued graphs
//!
//! Queued draws are fire-and-forget. A draw whose card was replaced by a
//! newer search finds no target and does nothing.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::accent;
use crate::config::AppConfig;
use crate::error::{LexiconError, Result};
use crate::render::card::GraphSpec;
use crate::render::{draw_accent_graph, ResultCard, SvgSurface};
use crate::search::{QueryEngine, SearchOptions};
use crate::store::{LexiconSource, LexiconStore, SnapshotSource, StoreState};
use crate::theme::{PrefsStore, Theme, ThemeSettings};

pub const STATUS_LOADING: &str = "Downloading dictionary data... (first time only)";
pub const STATUS_READY: &str = "Type a search term and press Enter.";
pub const STATUS_FAILED: &str = "Failed to load dictionary data.";
pub const MESSAGE_NO_RESULTS: &str = "No results found.";

/// What a submitted query led to / 查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Store not ready or empty input: nothing happened
    Skipped,
    Results(usize),
    NoResults,
    /// Search failed; shown once, later searches are unaffected
    Failed(String),
}

/// Summary of one frame / 单帧统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub drawn: usize,
    /// Target card no longer in the view
    pub stale: usize,
    /// Graph skipped because of bad pitch data; the card is still shown
    pub invalid: usize,
}

#[derive(Debug, Clone)]
struct DrawTask {
    target_id: String,
    spec: GraphSpec,
}

/// Current result list / 当前结果
#[derive(Debug, Clone, Default)]
pub struct ResultsView {
    pub cards: Vec<ResultCard>,
    pub message: Option<String>,
}

pub struct App {
    config: AppConfig,
    engine: QueryEngine,
    source: Arc<dyn LexiconSource>,
    theme: Arc<ThemeSettings>,
    prefs: PrefsStore,
    status: RwLock<String>,
    input: RwLock<String>,
    view: RwLock<ResultsView>,
    frames: Mutex<VecDeque<DrawTask>>,
    rerun_requested: Arc<AtomicBool>,
}

impl App {
    pub fn new(
        config: AppConfig,
        source: Arc<dyn LexiconSource>,
        theme: Arc<ThemeSettings>,
        prefs: PrefsStore,
    ) -> Self {
        let rerun_requested = Arc::new(AtomicBool::new(false));
        let flag = rerun_requested.clone();
        theme.subscribe(move |_| flag.store(true, Ordering::SeqCst));

        Self {
            config,
            engine: QueryEngine::new(source.clone()),
            source,
            theme,
            prefs,
            status: RwLock::new(String::new()),
            input: RwLock::new(String::new()),
            view: RwLock::new(ResultsView::default()),
            frames: Mutex::new(VecDeque::new()),
            rerun_requested,
        }
    }

    pub fn status(&self) -> String {
        self.status.read().clone()
    }

    pub fn view(&self) -> ResultsView {
        self.view.read().clone()
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn pending_draws(&self) -> usize {
        self.frames.lock().len()
    }

    /// Load the store once; the status line reflects the outcome / 加载词库
    pub async fn load_store(&self, store: &LexiconStore, snapshot: &SnapshotSource) -> Result<()> {
        *self.status.write() = STATUS_LOADING.to_string();
        match store.load(snapshot).await {
            Ok(()) if store.state().is_ready() => {
                *self.status.write() = STATUS_READY.to_string();
                Ok(())
            }
            Ok(()) => {
                // Load already ran earlier; keep whatever it ended in
                if let StoreState::Failed(_) = store.state() {
                    *self.status.write() = STATUS_FAILED.to_string();
                }
                Ok(())
            }
            Err(e) => {
                *self.status.write() = STATUS_FAILED.to_string();
                Err(e)
            }
        }
    }

    /// Run a search for the committed input / 提交查询
    pub async fn on_query_submitted(&self, text: &str) -> SearchOutcome {
        *self.input.write() = text.to_string();

        if text.is_empty() || !self.source.state().is_ready() {
            return SearchOutcome::Skipped;
        }

        let options = SearchOptions::new(text)
            .with_candidate_limit(self.config.search.candidate_limit)
            .with_result_limit(self.config.search.result_limit);

        let ranked = match self.engine.search(&options).await {
            Ok(ranked) => ranked,
            Err(LexiconError::StoreUnavailable(reason)) => {
                tracing::debug!("Search skipped: {}", reason);
                return SearchOutcome::Skipped;
            }
            Err(e) => {
                tracing::error!("Search failed: {}", e);
                return SearchOutcome::Failed(format!("An error occurred while searching: {}", e));
            }
        };

        let cards: Vec<ResultCard> = ranked.iter().map(ResultCard::from_scored).collect();
        let count = cards.len();

        {
            let mut frames = self.frames.lock();
            for card in &cards {
                if let (Some(target_id), Some(spec)) = (card.graph_id(), card.graph.clone()) {
                    frames.push_back(DrawTask { target_id, spec });
                }
            }
        }

        let mut view = self.view.write();
        view.cards = cards;
        if count == 0 {
            view.message = Some(MESSAGE_NO_RESULTS.to_string());
            SearchOutcome::NoResults
        } else {
            view.message = None;
            SearchOutcome::Results(count)
        }
    }

    /// Apply a theme choice; re-runs the current query when it changed / 切换主题
    pub async fn on_theme_toggled(&self, theme: Theme) -> SearchOutcome {
        self.theme.set(theme);
        if let Err(e) = self.prefs.save_theme(theme) {
            tracing::warn!("Failed to persist theme: {}", e);
        }

        if !self.rerun_requested.swap(false, Ordering::SeqCst) {
            return SearchOutcome::Skipped;
        }
        let input = self.input.read().clone();
        if input.is_empty() {
            return SearchOutcome::Skipped;
        }
        self.on_query_submitted(&input).await
    }

    /// Draw everything queued since the last frame / 绘制队列中的图
    pub fn run_frame(&self, container_width: f64, device_pixel_ratio: f64) -> FrameReport {
        let tasks: Vec<DrawTask> = self.frames.lock().drain(..).collect();
        let theme = self.theme.get();
        let mut report = FrameReport::default();
        let mut view = self.view.write();

        for task in tasks {
            let Some(card) = view
                .cards
                .iter_mut()
                .find(|c| c.graph_id().as_deref() == Some(task.target_id.as_str()))
            else {
                report.stale += 1;
                continue;
            };

            let layout = match accent::layout(
                &task.spec.pitch_pattern,
                task.spec.accent_type,
                &task.spec.reading,
                container_width,
                device_pixel_ratio,
            ) {
                Ok(layout) => layout,
                Err(e) if e.is_record_local() => {
                    tracing::warn!("Skipping accent graph for {}: {}", task.target_id, e);
                    report.invalid += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!("Accent layout failed for {}: {}", task.target_id, e);
                    report.invalid += 1;
                    continue;
                }
            };

            let mut surface = SvgSurface::new();
            if draw_accent_graph(&mut surface, &layout, &task.spec.reading, theme) {
                card.graph_svg = Some(surface.finish());
                report.drawn += 1;
            }
        }

        report
    }

    /// Write drawn graphs as `<graph id>.svg` / 导出声调图
    pub async fn export_graphs(&self, dir: &Path) -> Result<usize> {
        let graphs: Vec<(String, String)> = self
            .view
            .read()
            .cards
            .iter()
            .filter_map(|c| Some((c.graph_id()?, c.graph_svg.clone()?)))
            .collect();
        if graphs.is_empty() {
            return Ok(0);
        }

        tokio::fs::create_dir_all(dir).await?;
        for (id, svg) in &graphs {
            tokio::fs::write(dir.join(format!("{}.svg", id)), svg).await?;
        }
        tracing::debug!("Exported {} graphs to {:?}", graphs.len(), dir);
        Ok(graphs.len())
    }
}
