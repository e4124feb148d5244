use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moji_lexicon::app::{App, SearchOutcome};
use moji_lexicon::config;
use moji_lexicon::store::{LexiconStore, SnapshotSource};
use moji_lexicon::theme::{self, PrefsStore, Theme};

const HELP: &str = "Commands: <text> search | :theme [dark|light|toggle] | :help | :quit";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moji_lexicon=info,moji=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration / 加载配置
    let loaded = match std::env::args().nth(1) {
        Some(path) => config::load_config_from(&PathBuf::from(path))?,
        None => config::load_config()?,
    };
    config::init_config(loaded)?;
    let app_config = config::config();

    let prefs = PrefsStore::new(app_config.get_prefs_path());
    let theme = theme::theme_settings();
    theme.set(prefs.load_theme());

    let store = Arc::new(LexiconStore::new(app_config.table_name()?));
    let app = App::new(app_config.clone(), store.clone(), theme, prefs);

    println!(
        "moji {} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME")
    );

    let snapshot = SnapshotSource::from_config(&app_config.store);
    println!("{}", moji_lexicon::app::STATUS_LOADING);
    match app.load_store(&store, &snapshot).await {
        Ok(()) => {
            if let Ok(count) = store.entry_count().await {
                tracing::info!("Lexicon loaded: {} entries", count);
            }
        }
        Err(e) => tracing::error!("DB loading error: {}", e),
    }
    println!("{}", app.status());
    println!("{}", HELP);

    let output_dir = app_config.get_output_dir();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(command) = line.strip_prefix(':') {
            let mut parts = command.split_whitespace();
            match parts.next() {
                Some("quit") | Some("q") => break,
                Some("help") => println!("{}", HELP),
                Some("theme") => {
                    let next = match parts.next() {
                        None | Some("toggle") => Ok(app.theme().toggled()),
                        Some(value) => value.parse::<Theme>(),
                    };
                    match next {
                        Ok(next) => {
                            let outcome = app.on_theme_toggled(next).await;
                            println!("Theme: {}", next.as_str());
                            show(&app, outcome, output_dir.as_deref()).await;
                        }
                        Err(e) => println!("{}", e),
                    }
                }
                _ => println!("{}", HELP),
            }
            continue;
        }

        let outcome = app.on_query_submitted(line).await;
        show(&app, outcome, output_dir.as_deref()).await;
    }

    store.close().await;
    Ok(())
}

/// Print the result list and flush queued graphs / 输出结果
async fn show(app: &App, outcome: SearchOutcome, output_dir: Option<&std::path::Path>) {
    match outcome {
        SearchOutcome::Skipped => return,
        SearchOutcome::Failed(message) => {
            println!("! {}", message);
            return;
        }
        SearchOutcome::NoResults | SearchOutcome::Results(_) => {}
    }

    // Next paint frame / 下一帧绘制
    let render = config::config().render;
    let report = app.run_frame(render.container_width, render.device_pixel_ratio);
    tracing::debug!("Frame: {:?}", report);

    let view = app.view();
    if let Some(message) = &view.message {
        println!("{}", message);
    }
    for card in &view.cards {
        println!("{}", card.render_text());
    }

    if let Some(dir) = output_dir {
        match app.export_graphs(dir).await {
            Ok(0) => {}
            Ok(n) => println!("({} accent graphs written to {})", n, dir.display()),
            Err(e) => tracing::warn!("Failed to write accent graphs: {}", e),
        }
    }
}
