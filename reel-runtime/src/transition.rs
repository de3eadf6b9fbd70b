//! # Transition 模块
//!
//! 场景切换状态机。
//!
//! 每次切换由一条遮罩时间轴完成：
//!
//! 1. 遮罩就位（屏幕外、不透明、轻微倾斜）
//! 2. 滑入盖住画面
//! 3. 回调点 `swap`：切换当前场景下标
//! 4. 滑出
//! 5. 遮罩隐藏，时间轴结束释放锁
//!
//! 锁被持有期间所有切换请求都被吸收为无操作。

use std::rc::Rc;

use tracing::debug;

use crate::config::TransitionConfig;
use crate::error::TimelineError;
use crate::target::{PropertyBag, PropertySet};
use crate::timeline::{
    Position, ScheduledEvent, Step, Timeline, TimelineConfig, TimelineEvent, TimelineHandle,
    TimelineScheduler,
};

/// 遮罩时间轴中点的回调名
pub const SWAP_CUE: &str = "swap";

/// 切换方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// 向后（遮罩从右侧进入）
    Forward,
    /// 向前（遮罩从左侧进入）
    Backward,
}

impl Direction {
    fn sign(&self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// 请求被拒绝的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// 已有切换在进行
    InProgress,
    /// 目标就是当前场景
    SameScene,
    /// 目标下标越界
    OutOfRange,
}

/// 切换请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRequest {
    /// 已开始切换
    Started {
        from: usize,
        to: usize,
        direction: Direction,
        handle: TimelineHandle,
    },
    /// 请求被吸收，状态未改变
    Rejected(RejectReason),
}

impl TransitionRequest {
    /// 是否开始了切换
    pub fn is_started(&self) -> bool {
        matches!(self, TransitionRequest::Started { .. })
    }
}

/// 切换过程中的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// 遮罩中点：当前场景已切换
    SceneSwapped {
        from: usize,
        to: usize,
        direction: Direction,
    },
    /// 遮罩时间轴结束，锁已释放
    Finished { to: usize },
}

/// 切换互斥锁
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionLock {
    held: bool,
}

impl TransitionLock {
    /// 尝试获取锁
    pub fn try_acquire(&mut self) -> bool {
        if self.held {
            false
        } else {
            self.held = true;
            true
        }
    }

    /// 释放锁
    pub fn release(&mut self) {
        self.held = false;
    }

    /// 是否被持有
    pub fn is_held(&self) -> bool {
        self.held
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveTransition {
    handle: TimelineHandle,
    from: usize,
    to: usize,
    direction: Direction,
    swapped: bool,
}

/// 场景切换状态机
#[derive(Debug)]
pub struct SceneTransitionMachine {
    current: usize,
    scene_count: usize,
    lock: TransitionLock,
    overlay: Rc<PropertyBag>,
    active: Option<ActiveTransition>,
    config: TransitionConfig,
}

impl SceneTransitionMachine {
    /// 创建状态机，从场景 0 开始
    pub fn new(scene_count: usize, overlay: Rc<PropertyBag>, config: TransitionConfig) -> Self {
        overlay.set("opacity", 0.0);
        overlay.set("background", config.light_gradient.as_str());
        Self {
            current: 0,
            scene_count,
            lock: TransitionLock::default(),
            overlay,
            active: None,
            config,
        }
    }

    /// 当前场景下标
    pub fn current(&self) -> usize {
        self.current
    }

    /// 场景数
    pub fn scene_count(&self) -> usize {
        self.scene_count
    }

    /// 是否正在切换
    pub fn is_transitioning(&self) -> bool {
        self.lock.is_held()
    }

    /// 遮罩层
    pub fn overlay(&self) -> &Rc<PropertyBag> {
        &self.overlay
    }

    /// 下一个场景（循环）
    pub fn next(
        &mut self,
        scheduler: &mut TimelineScheduler,
    ) -> Result<TransitionRequest, TimelineError> {
        let target = (self.current + 1) % self.scene_count.max(1);
        self.request(scheduler, target, Direction::Forward)
    }

    /// 上一个场景（循环）
    pub fn prev(
        &mut self,
        scheduler: &mut TimelineScheduler,
    ) -> Result<TransitionRequest, TimelineError> {
        let count = self.scene_count.max(1);
        let target = (self.current + count - 1) % count;
        self.request(scheduler, target, Direction::Backward)
    }

    /// 跳转到指定场景，目标在后则向后切换
    pub fn jump_to(
        &mut self,
        scheduler: &mut TimelineScheduler,
        index: usize,
    ) -> Result<TransitionRequest, TimelineError> {
        if index >= self.scene_count {
            debug!(index, scene_count = self.scene_count, "跳转目标越界，忽略");
            return Ok(TransitionRequest::Rejected(RejectReason::OutOfRange));
        }
        let direction = if index > self.current {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.request(scheduler, index, direction)
    }

    fn request(
        &mut self,
        scheduler: &mut TimelineScheduler,
        target: usize,
        direction: Direction,
    ) -> Result<TransitionRequest, TimelineError> {
        if self.lock.is_held() {
            debug!(target, "切换进行中，忽略请求");
            return Ok(TransitionRequest::Rejected(RejectReason::InProgress));
        }
        if target == self.current {
            return Ok(TransitionRequest::Rejected(RejectReason::SameScene));
        }

        let timeline = self.build_overlay_timeline(self.current, target, direction)?;
        let handle = scheduler.insert(timeline);
        scheduler.play(handle)?;
        let acquired = self.lock.try_acquire();
        debug_assert!(acquired);
        self.active = Some(ActiveTransition {
            handle,
            from: self.current,
            to: target,
            direction,
            swapped: false,
        });

        debug!(from = self.current, to = target, ?direction, %handle, "开始场景切换");
        Ok(TransitionRequest::Started {
            from: self.current,
            to: target,
            direction,
            handle,
        })
    }

    fn build_overlay_timeline(
        &self,
        from: usize,
        to: usize,
        direction: Direction,
    ) -> Result<Timeline, TimelineError> {
        let cfg = &self.config;
        let sign = direction.sign();
        let background = if from == 0 && to == 1 {
            &cfg.dark_gradient
        } else {
            &cfg.light_gradient
        };

        let mut tl = Timeline::new(TimelineConfig::named(format!("transition {from}->{to}")));
        tl.add_step(Step::set(
            &self.overlay,
            PropertySet::new()
                .num("x_percent", sign * cfg.offscreen_percent)
                .num("opacity", 1.0)
                .num("rotate", sign * cfg.tilt_deg)
                .text("background", background.as_str()),
        ))?;
        tl.add_step(
            Step::to(
                &self.overlay,
                PropertySet::new().num("x_percent", 0.0).num("rotate", 0.0),
            )
            .duration(cfg.cover_ms)
            .ease(cfg.cover_ease),
        )?;
        tl.add_cue(SWAP_CUE, Position::Sequential)?;
        tl.add_step(
            Step::to(
                &self.overlay,
                PropertySet::new().num("x_percent", -sign * cfg.offscreen_percent),
            )
            .duration(cfg.reveal_ms)
            .ease(cfg.reveal_ease),
        )?;
        tl.add_step(Step::set(&self.overlay, PropertySet::new().num("opacity", 0.0)))?;
        Ok(tl)
    }

    /// 句柄是否为当前的遮罩时间轴
    pub fn owns(&self, handle: TimelineHandle) -> bool {
        self.active.is_some_and(|a| a.handle == handle)
    }

    /// 处理调度器事件
    pub fn handle_event(&mut self, event: &ScheduledEvent) -> Option<TransitionEvent> {
        let active = self.active.as_mut().filter(|a| a.handle == event.handle)?;
        match &event.event {
            TimelineEvent::Cue(name) if name == SWAP_CUE && !active.swapped => {
                active.swapped = true;
                self.current = active.to;
                debug!(from = active.from, to = active.to, "遮罩中点，切换场景");
                Some(TransitionEvent::SceneSwapped {
                    from: active.from,
                    to: active.to,
                    direction: active.direction,
                })
            }
            TimelineEvent::Completed => {
                let to = active.to;
                self.active = None;
                self.lock.release();
                debug!(to, "场景切换结束");
                Some(TransitionEvent::Finished { to })
            }
            TimelineEvent::Cue(_) => None,
        }
    }

    /// 强制结束当前切换
    ///
    /// 取消遮罩时间轴，隐藏遮罩并释放锁。中点之前中止不会切换场景。
    /// 返回是否确实中止了一个切换。
    pub fn abort(&mut self, scheduler: &mut TimelineScheduler) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        scheduler.cancel(active.handle);
        self.overlay.set("opacity", 0.0);
        self.lock.release();
        debug!(
            from = active.from,
            to = active.to,
            swapped = active.swapped,
            "场景切换被中止"
        );
        true
    }
}
