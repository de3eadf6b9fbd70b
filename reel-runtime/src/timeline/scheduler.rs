//! # Scheduler 模块
//!
//! 时间轴调度器：持有所有在播时间轴，驱动统一的虚拟时钟。
//!
//! 单线程协作式调度。`advance_until` 会在每个回调点或结束时刻切分时间推进，
//! 并把该时刻的事件交还给调用方处理，调用方处理完之后再继续推进。
//! 这样回调点引发的状态变化（例如切换场景、重启倒计时）严格发生在该时刻，
//! 而不是在整帧结束后。
//!
//! ```rust,ignore
//! let mut scheduler = TimelineScheduler::new();
//! let handle = scheduler.create(TimelineConfig::named("fade"));
//! scheduler.add_step(handle, Step::to(&target, PropertySet::new().num("opacity", 1.0)))?;
//! scheduler.play(handle)?;
//!
//! let deadline = scheduler.now() + 16;
//! while let Some(batch) = scheduler.advance_until(deadline) {
//!     for event in batch.events { /* ... */ }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::error::TimelineError;

use super::{Position, Step, Timeline, TimelineConfig, TimelineEvent, TimelineState};

/// 时间轴句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimelineHandle(u64);

impl TimelineHandle {
    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimelineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 带来源的时间轴事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent {
    /// 产生事件的时间轴
    pub handle: TimelineHandle,
    /// 事件内容
    pub event: TimelineEvent,
}

/// 同一时刻产生的一批事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBatch {
    /// 调度器时间（毫秒）
    pub at: u64,
    /// 按句柄顺序排列的事件
    pub events: Vec<ScheduledEvent>,
}

/// 时间轴调度器
#[derive(Debug, Default)]
pub struct TimelineScheduler {
    timelines: BTreeMap<TimelineHandle, Timeline>,
    next_id: u64,
    now: u64,
}

impl TimelineScheduler {
    /// 创建新的调度器
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前时间（毫秒）
    pub fn now(&self) -> u64 {
        self.now
    }

    fn next_handle(&mut self) -> TimelineHandle {
        self.next_id += 1;
        TimelineHandle(self.next_id)
    }

    /// 创建空时间轴
    pub fn create(&mut self, config: TimelineConfig) -> TimelineHandle {
        self.insert(Timeline::new(config))
    }

    /// 接管已构建好的时间轴
    pub fn insert(&mut self, timeline: Timeline) -> TimelineHandle {
        let handle = self.next_handle();
        self.timelines.insert(handle, timeline);
        handle
    }

    fn get_mut(&mut self, handle: TimelineHandle) -> Result<&mut Timeline, TimelineError> {
        self.timelines
            .get_mut(&handle)
            .ok_or(TimelineError::UnknownHandle { handle })
    }

    /// 追加步骤
    pub fn add_step(&mut self, handle: TimelineHandle, step: Step) -> Result<u64, TimelineError> {
        self.get_mut(handle)?.add_step(step)
    }

    /// 定义标签
    pub fn add_label(
        &mut self,
        handle: TimelineHandle,
        name: &str,
        position: Position,
    ) -> Result<u64, TimelineError> {
        self.get_mut(handle)?.add_label(name, position)
    }

    /// 插入回调点
    pub fn add_cue(
        &mut self,
        handle: TimelineHandle,
        name: &str,
        position: Position,
    ) -> Result<u64, TimelineError> {
        self.get_mut(handle)?.add_cue(name, position)
    }

    /// 开始播放（从当前调度器时间起算）
    pub fn play(&mut self, handle: TimelineHandle) -> Result<(), TimelineError> {
        self.get_mut(handle)?.play();
        Ok(())
    }

    /// 取消并移除时间轴
    ///
    /// 幂等；对已完成、已取消或从未播放的句柄都安全。返回是否确实取消了一个活跃时间轴。
    pub fn cancel(&mut self, handle: TimelineHandle) -> bool {
        match self.timelines.remove(&handle) {
            Some(mut timeline) => {
                let was_live = !timeline.is_finished();
                timeline.cancel();
                was_live
            }
            None => false,
        }
    }

    /// 取消所有时间轴
    pub fn cancel_all(&mut self) {
        for timeline in self.timelines.values_mut() {
            timeline.cancel();
        }
        self.timelines.clear();
    }

    /// 查询状态；已移除的句柄返回 None
    pub fn state(&self, handle: TimelineHandle) -> Option<TimelineState> {
        self.timelines.get(&handle).map(Timeline::state)
    }

    /// 查询时间轴
    pub fn timeline(&self, handle: TimelineHandle) -> Option<&Timeline> {
        self.timelines.get(&handle)
    }

    /// 句柄是否仍然有效
    pub fn contains(&self, handle: TimelineHandle) -> bool {
        self.timelines.contains_key(&handle)
    }

    /// 正在播放的时间轴数量
    pub fn playing_count(&self) -> usize {
        self.timelines
            .values()
            .filter(|t| t.state() == TimelineState::Playing)
            .count()
    }

    /// 推进到下一个事件时刻或 `deadline`（取较早者）
    ///
    /// # 返回
    /// - `Some(batch)`: 在 `batch.at` 时刻产生了事件，调用方处理后应再次调用
    /// - `None`: 已推进到 `deadline`，期间没有更多事件
    pub fn advance_until(&mut self, deadline: u64) -> Option<EventBatch> {
        loop {
            let horizon = self
                .timelines
                .values()
                .filter_map(Timeline::time_to_next_event)
                .min()
                .map(|d| self.now + d);

            let target = match horizon {
                Some(h) if h <= deadline => h,
                _ if self.now >= deadline => return None,
                _ => deadline,
            };

            let dt = target - self.now;
            self.now = target;

            let mut events = Vec::new();
            for (handle, timeline) in &mut self.timelines {
                for event in timeline.update(dt) {
                    events.push(ScheduledEvent {
                        handle: *handle,
                        event,
                    });
                }
            }
            self.timelines.retain(|_, t| !t.is_finished());

            if !events.is_empty() {
                return Some(EventBatch {
                    at: self.now,
                    events,
                });
            }
            if self.now >= deadline {
                return None;
            }
        }
    }

    /// 推进 `dt` 毫秒，收集所有事件
    ///
    /// 适用于不需要在事件时刻插入新时间轴的场合。
    pub fn advance(&mut self, dt: u64) -> Vec<EventBatch> {
        let deadline = self.now.saturating_add(dt);
        let mut batches = Vec::new();
        while let Some(batch) = self.advance_until(deadline) {
            batches.push(batch);
        }
        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::target::{PropertyBag, PropertySet};

    fn fade(target: &std::rc::Rc<PropertyBag>, ms: u64) -> Step {
        Step::from_to(
            target,
            PropertySet::new().num("opacity", 0.0),
            PropertySet::new().num("opacity", 1.0),
        )
        .duration(ms)
        .ease(Easing::Linear)
    }

    #[test]
    fn test_create_add_play() {
        let a = PropertyBag::shared("a");
        let mut scheduler = TimelineScheduler::new();
        let handle = scheduler.create(TimelineConfig::named("fade"));
        scheduler.add_step(handle, fade(&a, 100)).unwrap();
        scheduler.play(handle).unwrap();
        assert_eq!(scheduler.playing_count(), 1);

        let batches = scheduler.advance(250);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].at, 100);
        assert_eq!(
            batches[0].events,
            vec![ScheduledEvent {
                handle,
                event: TimelineEvent::Completed
            }]
        );
        assert_eq!(scheduler.now(), 250);
        // 完成后移除
        assert!(!scheduler.contains(handle));
    }

    #[test]
    fn test_batches_split_at_cue() {
        let a = PropertyBag::shared("a");
        let mut scheduler = TimelineScheduler::new();
        let handle = scheduler.create(TimelineConfig::named("cue"));
        scheduler.add_step(handle, fade(&a, 380)).unwrap();
        scheduler.add_cue(handle, "swap", Position::Sequential).unwrap();
        scheduler.add_step(handle, fade(&a, 460)).unwrap();
        scheduler.play(handle).unwrap();

        let batch = scheduler.advance_until(1000).unwrap();
        assert_eq!(batch.at, 380);
        assert_eq!(batch.events[0].event, TimelineEvent::Cue("swap".to_string()));

        // 在回调时刻插入的新时间轴从该时刻起算
        let b = PropertyBag::shared("b");
        let late = scheduler.create(TimelineConfig::named("late"));
        scheduler.add_step(late, fade(&b, 100)).unwrap();
        scheduler.play(late).unwrap();

        let batch = scheduler.advance_until(1000).unwrap();
        assert_eq!(batch.at, 480);
        assert_eq!(batch.events[0].handle, late);

        let batch = scheduler.advance_until(1000).unwrap();
        assert_eq!(batch.at, 840);
        assert_eq!(batch.events[0].handle, handle);
        assert!(scheduler.advance_until(1000).is_none());
        assert_eq!(scheduler.now(), 1000);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let a = PropertyBag::shared("a");
        let mut scheduler = TimelineScheduler::new();
        let handle = scheduler.create(TimelineConfig::named("fade"));
        scheduler.add_step(handle, fade(&a, 100)).unwrap();

        // 从未播放也可以取消
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(scheduler.advance(500).is_empty());
        assert!(matches!(
            scheduler.play(handle),
            Err(TimelineError::UnknownHandle { .. })
        ));
    }

    #[test]
    fn test_cancel_mid_flight_stops_writes() {
        let a = PropertyBag::shared("a");
        let mut scheduler = TimelineScheduler::new();
        let handle = scheduler.create(TimelineConfig::named("fade"));
        scheduler.add_step(handle, fade(&a, 1000)).unwrap();
        scheduler.play(handle).unwrap();
        scheduler.advance(400);
        assert!(scheduler.cancel(handle));
        assert!(scheduler.advance(1000).is_empty());
        assert!((a.number_or("opacity", 0.0) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_idle_timelines_do_not_advance() {
        let a = PropertyBag::shared("a");
        let mut scheduler = TimelineScheduler::new();
        let handle = scheduler.create(TimelineConfig::named("idle"));
        scheduler.add_step(handle, fade(&a, 100)).unwrap();
        assert!(scheduler.advance(500).is_empty());
        assert_eq!(scheduler.state(handle), Some(TimelineState::Idle));
    }
}
