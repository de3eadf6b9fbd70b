//! # Autoplay 模块
//!
//! 自动播放倒计时：把倒计时、进度条和场景推进绑在一起。
//!
//! - 倒计时就是进度条 `scale_x` 0 → 1 的一个线性步骤，结束即 `Expired`
//! - 暂停时取消倒计时，进度条用短动画回到 0
//! - 恢复时从 0 重新开始完整倒计时；同一时刻最多一个倒计时

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::easing::Easing;
use crate::error::TimelineError;
use crate::target::{PropertyBag, PropertySet};
use crate::timeline::{
    ScheduledEvent, Step, Timeline, TimelineConfig, TimelineEvent, TimelineHandle,
    TimelineScheduler,
};

/// 进度条上被驱动的属性
pub const PROGRESS_PROPERTY: &str = "scale_x";

/// 倒计时状态
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountdownState {
    /// 已经过的比例 (0.0 - 1.0)
    pub fraction: f32,
    /// 目标时长（毫秒）
    pub duration_ms: u64,
    /// 是否在计时
    pub running: bool,
}

/// 自动播放事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayEvent {
    /// 倒计时自然结束，应切到下一个场景
    Expired,
}

/// 自动播放驱动器
#[derive(Debug)]
pub struct AutoplayDriver {
    progress: Rc<PropertyBag>,
    countdown: Option<TimelineHandle>,
    reset: Option<TimelineHandle>,
    duration_ms: u64,
    reset_ms: u64,
}

impl AutoplayDriver {
    /// 创建驱动器
    ///
    /// # 参数
    /// - `progress`: 进度条目标
    /// - `duration_ms`: 默认倒计时时长
    /// - `reset_ms`: 暂停时进度条回零的时长
    pub fn new(progress: Rc<PropertyBag>, duration_ms: u64, reset_ms: u64) -> Self {
        progress.set(PROGRESS_PROPERTY, 0.0);
        Self {
            progress,
            countdown: None,
            reset: None,
            duration_ms,
            reset_ms,
        }
    }

    /// 进度条目标
    pub fn progress(&self) -> &Rc<PropertyBag> {
        &self.progress
    }

    /// 默认倒计时时长
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// 开始新的倒计时，取消已有的倒计时和回零动画
    pub fn start(
        &mut self,
        scheduler: &mut TimelineScheduler,
        duration_ms: u64,
    ) -> Result<TimelineHandle, TimelineError> {
        self.cancel_running(scheduler);
        self.duration_ms = duration_ms;

        let mut timeline = Timeline::new(TimelineConfig::named("autoplay"));
        timeline.add_step(
            Step::from_to(
                &self.progress,
                PropertySet::new().num(PROGRESS_PROPERTY, 0.0),
                PropertySet::new().num(PROGRESS_PROPERTY, 1.0),
            )
            .duration(duration_ms)
            .ease(Easing::Linear),
        )?;

        let handle = scheduler.insert(timeline);
        scheduler.play(handle)?;
        self.countdown = Some(handle);
        debug!(%handle, duration_ms, at = scheduler.now(), "倒计时开始");
        Ok(handle)
    }

    /// 停止倒计时，进度条回到 0
    pub fn stop(&mut self, scheduler: &mut TimelineScheduler) -> Result<(), TimelineError> {
        self.cancel_running(scheduler);

        let mut timeline = Timeline::new(TimelineConfig::named("autoplay-reset"));
        timeline.add_step(
            Step::to(&self.progress, PropertySet::new().num(PROGRESS_PROPERTY, 0.0))
                .duration(self.reset_ms)
                .ease(Easing::Power1Out),
        )?;

        let handle = scheduler.insert(timeline);
        scheduler.play(handle)?;
        self.reset = Some(handle);
        debug!(%handle, at = scheduler.now(), "倒计时停止，进度条回零");
        Ok(())
    }

    /// 取消所有时间轴（卸载时调用），进度条保持当前值
    pub fn teardown(&mut self, scheduler: &mut TimelineScheduler) {
        self.cancel_running(scheduler);
    }

    fn cancel_running(&mut self, scheduler: &mut TimelineScheduler) {
        if let Some(handle) = self.countdown.take() {
            scheduler.cancel(handle);
        }
        if let Some(handle) = self.reset.take() {
            scheduler.cancel(handle);
        }
    }

    /// 句柄是否属于本驱动器
    pub fn owns(&self, handle: TimelineHandle) -> bool {
        self.countdown == Some(handle) || self.reset == Some(handle)
    }

    /// 处理调度器事件
    pub fn handle_event(&mut self, event: &ScheduledEvent) -> Option<AutoplayEvent> {
        if event.event != TimelineEvent::Completed {
            return None;
        }
        if self.countdown == Some(event.handle) {
            self.countdown = None;
            debug!(handle = %event.handle, "倒计时结束");
            return Some(AutoplayEvent::Expired);
        }
        if self.reset == Some(event.handle) {
            self.reset = None;
        }
        None
    }

    /// 是否在计时
    pub fn is_running(&self) -> bool {
        self.countdown.is_some()
    }

    /// 倒计时状态
    pub fn countdown_state(&self) -> CountdownState {
        CountdownState {
            fraction: self.progress.number_or(PROGRESS_PROPERTY, 0.0).clamp(0.0, 1.0),
            duration_ms: self.duration_ms,
            running: self.is_running(),
        }
    }
}
