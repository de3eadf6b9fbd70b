//! # Reel CLI
//!
//! 无界面运行演示：按固定帧长推进虚拟时钟，按脚本注入按键，
//! 结束时输出最终快照。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p reel-cli
//! cargo run -p reel-cli -- --duration-ms 60000 --keys 1000:right,4000:space
//! cargo run -p reel-cli -- --content content.json --config config.json --json
//! cargo run -p reel-cli -- --reject-autoplay --log-level debug
//! ```

mod args;
mod transport;

use anyhow::{Context, Result};
use clap::Parser;
use reel_runtime::{EngineConfig, Presenter, PresenterSnapshot, SceneContent};
use tracing::{debug, info};

use args::Cli;
use transport::HeadlessTransport;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    let config = EngineConfig::load(&cli.config)
        .with_context(|| format!("加载配置失败: {}", cli.config.display()))?;
    let content = match &cli.content {
        Some(path) => SceneContent::load(path)
            .with_context(|| format!("加载场景内容失败: {}", path.display()))?,
        None => SceneContent::demo().context("内置示例内容损坏")?,
    };

    let frame_ms = cli.frame_ms.max(1);
    let mut presenter = Presenter::new(
        config,
        content,
        HeadlessTransport::new(cli.reject_autoplay),
    );
    presenter.start()?;
    let mut keys = cli.keys.clone().unwrap_or_default();

    while presenter.now() < cli.duration_ms {
        let now = presenter.now();
        for key in keys.drain_due(now) {
            let response = presenter.handle_key(&key)?;
            debug!(at = now, ?key, action = ?response.action, "按键");
        }

        // 落在按键时刻上，不跨过它
        let mut step = frame_ms.min(cli.duration_ms - now);
        if let Some(at) = keys.next_at() {
            step = step.min(at.saturating_sub(now).max(1));
        }
        presenter.advance(step)?;
    }

    let snapshot = presenter.snapshot();
    presenter.teardown();
    info!(
        at = snapshot.now_ms,
        music = presenter.transport().is_playing(),
        "运行结束"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

fn print_snapshot(snapshot: &PresenterSnapshot) {
    println!("时间        {} ms", snapshot.now_ms);
    println!(
        "场景        {} ({})",
        snapshot.scene_index,
        snapshot.scene.name()
    );
    println!("播放状态    {:?}", snapshot.playback);
    println!("切换中      {}", snapshot.transitioning);
    println!(
        "倒计时      {:.1}% / {} ms{}",
        snapshot.countdown.fraction * 100.0,
        snapshot.countdown.duration_ms,
        if snapshot.countdown.running { "" } else { " (停止)" }
    );
    if let Some(typewriter) = &snapshot.typewriter {
        println!(
            "打字机      #{} {:?} \"{}\"",
            typewriter.phrase_index, typewriter.phase, typewriter.text
        );
    }
    println!("遮罩透明度  {:.2}", snapshot.overlay_opacity);
    println!("活动时间轴  {}", snapshot.active_timelines);
}
