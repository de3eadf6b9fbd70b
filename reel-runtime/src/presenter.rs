//! # Presenter 模块
//!
//! 组合根：把调度器、场景切换状态机、自动播放、媒体同步和当前场景连起来。
//!
//! ## 事件路由
//!
//! `advance` 按事件时刻切分推进，每个时刻的事件依次交给：
//!
//! - 场景切换状态机：遮罩中点卸载旧场景、挂载新场景、重启倒计时
//! - 自动播放驱动器：倒计时结束触发 `next`
//! - 当前场景：入场时间轴结束
//!
//! 打字机与虚拟时钟同步推进。

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::autoplay::{AutoplayDriver, AutoplayEvent};
use crate::config::EngineConfig;
use crate::error::ReelResult;
use crate::input::{Key, KeyResponse, NavAction};
use crate::media::{MediaSynchronizer, MediaTransport};
use crate::scene::{ActiveScene, SceneContent, SceneKind};
use crate::state::{PlaybackState, PresenterSnapshot};
use crate::target::PropertyBag;
use crate::timeline::{ScheduledEvent, TimelineScheduler};
use crate::transition::{SceneTransitionMachine, TransitionEvent, TransitionRequest};

/// 演示器
pub struct Presenter<T: MediaTransport> {
    config: EngineConfig,
    content: SceneContent,
    scheduler: TimelineScheduler,
    transitions: SceneTransitionMachine,
    autoplay: AutoplayDriver,
    media: MediaSynchronizer,
    transport: T,
    playback: PlaybackState,
    scene: Option<ActiveScene>,
}

impl<T: MediaTransport> Presenter<T> {
    /// 创建演示器（尚未挂载任何场景）
    pub fn new(config: EngineConfig, content: SceneContent, transport: T) -> Self {
        let overlay = PropertyBag::shared("overlay");
        let progress = PropertyBag::shared("progress");
        let transitions =
            SceneTransitionMachine::new(SceneKind::ALL.len(), overlay, config.transition.clone());
        let autoplay = AutoplayDriver::new(progress, config.autoplay_ms, config.progress_reset_ms);
        let media = MediaSynchronizer::new(config.audio_volume);
        let playback = if config.start_playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        };

        Self {
            config,
            content,
            scheduler: TimelineScheduler::new(),
            transitions,
            autoplay,
            media,
            transport,
            playback,
            scene: None,
        }
    }

    /// 同步媒体并挂载第一个场景
    pub fn start(&mut self) -> ReelResult<()> {
        self.sync_media();
        self.mount_scene(self.transitions.current())?;
        info!(playback = ?self.playback, "演示开始");
        Ok(())
    }

    /// 下一个场景
    pub fn next(&mut self) -> ReelResult<TransitionRequest> {
        Ok(self.transitions.next(&mut self.scheduler)?)
    }

    /// 上一个场景
    pub fn prev(&mut self) -> ReelResult<TransitionRequest> {
        Ok(self.transitions.prev(&mut self.scheduler)?)
    }

    /// 跳转到指定场景
    pub fn jump_to(&mut self, index: usize) -> ReelResult<TransitionRequest> {
        Ok(self.transitions.jump_to(&mut self.scheduler, index)?)
    }

    /// 切换播放/暂停，返回实际生效的状态
    pub fn toggle_play(&mut self) -> ReelResult<PlaybackState> {
        self.playback = self.playback.toggled();
        self.sync_media();
        self.restart_autoplay()?;
        debug!(playback = ?self.playback, "播放状态切换");
        Ok(self.playback)
    }

    /// 处理按键
    pub fn handle_key(&mut self, key: &Key) -> ReelResult<KeyResponse> {
        let response = key.response();
        match response.action {
            Some(NavAction::TogglePlay) => {
                self.toggle_play()?;
            }
            Some(NavAction::Next) => {
                self.next()?;
            }
            Some(NavAction::Prev) => {
                self.prev()?;
            }
            None => {}
        }
        Ok(response)
    }

    /// 推进虚拟时钟 `dt` 毫秒
    pub fn advance(&mut self, dt: u64) -> ReelResult<()> {
        let deadline = self.scheduler.now().saturating_add(dt);
        loop {
            let before = self.scheduler.now();
            let batch = self.scheduler.advance_until(deadline);
            let step = self.scheduler.now() - before;
            if let Some(scene) = &mut self.scene {
                scene.advance_typewriter(step);
            }

            let Some(batch) = batch else {
                return Ok(());
            };
            for event in &batch.events {
                self.dispatch(event)?;
            }
        }
    }

    fn dispatch(&mut self, event: &ScheduledEvent) -> ReelResult<()> {
        if self.transitions.owns(event.handle) {
            if let Some(TransitionEvent::SceneSwapped { to, .. }) =
                self.transitions.handle_event(event)
            {
                self.mount_scene(to)?;
            }
            return Ok(());
        }

        if self.autoplay.owns(event.handle) {
            if let Some(AutoplayEvent::Expired) = self.autoplay.handle_event(event) {
                // 到期时仍在切换中：重新计时
                if !self.next()?.is_started() {
                    debug!(at = self.scheduler.now(), "自动切换被拒绝，重新开始倒计时");
                    self.restart_autoplay()?;
                }
            }
            return Ok(());
        }

        if let Some(scene) = &mut self.scene {
            scene.handle_event(event);
        }
        Ok(())
    }

    fn mount_scene(&mut self, index: usize) -> ReelResult<()> {
        if let Some(mut previous) = self.scene.take() {
            previous.teardown(&mut self.scheduler);
        }
        let Some(kind) = SceneKind::from_index(index) else {
            warn!(index, "场景下标无效");
            return Ok(());
        };

        let scene = ActiveScene::mount(kind, &self.content, &self.config, &mut self.scheduler)?;
        self.scene = Some(scene);
        self.restart_autoplay()?;
        info!(scene = kind.name(), index, at = self.scheduler.now(), "切换到场景");
        Ok(())
    }

    fn restart_autoplay(&mut self) -> ReelResult<()> {
        match self.playback {
            PlaybackState::Playing => {
                self.autoplay
                    .start(&mut self.scheduler, self.config.autoplay_ms)?;
            }
            PlaybackState::Paused => self.autoplay.stop(&mut self.scheduler)?,
        }
        Ok(())
    }

    fn sync_media(&mut self) {
        self.playback = self.media.sync(&mut self.transport, self.playback);
    }

    /// 卸载：中止切换、取消所有时间轴、暂停媒体
    pub fn teardown(&mut self) {
        self.transitions.abort(&mut self.scheduler);
        self.autoplay.teardown(&mut self.scheduler);
        if let Some(mut scene) = self.scene.take() {
            scene.teardown(&mut self.scheduler);
        }
        self.scheduler.cancel_all();
        self.media.sync(&mut self.transport, PlaybackState::Paused);
        info!(at = self.scheduler.now(), "演示结束");
    }

    /// 当前场景下标
    pub fn current_scene(&self) -> usize {
        self.transitions.current()
    }

    /// 播放状态
    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    /// 是否正在切换
    pub fn is_transitioning(&self) -> bool {
        self.transitions.is_transitioning()
    }

    /// 当前挂载的场景
    pub fn scene(&self) -> Option<&ActiveScene> {
        self.scene.as_ref()
    }

    /// 遮罩层
    pub fn overlay(&self) -> &Rc<PropertyBag> {
        self.transitions.overlay()
    }

    /// 进度条
    pub fn progress(&self) -> &Rc<PropertyBag> {
        self.autoplay.progress()
    }

    /// 媒体传输层
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 虚拟时钟（毫秒）
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// 快照
    pub fn snapshot(&self) -> PresenterSnapshot {
        let index = self.transitions.current();
        PresenterSnapshot {
            now_ms: self.scheduler.now(),
            scene_index: index,
            scene: self
                .scene
                .as_ref()
                .map_or(SceneKind::ALL[index % SceneKind::ALL.len()], ActiveScene::kind),
            playback: self.playback,
            transitioning: self.transitions.is_transitioning(),
            countdown: self.autoplay.countdown_state(),
            typewriter: self.scene.as_ref().and_then(ActiveScene::typewriter),
            overlay_opacity: self.overlay().number_or("opacity", 0.0),
            active_timelines: self.scheduler.playing_count(),
        }
    }
}
