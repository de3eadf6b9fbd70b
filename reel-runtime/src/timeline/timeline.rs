//! # Timeline 模块
//!
//! 有序步骤集合，插入时解析偏移，播放时按绝对开始时间求值。
//!
//! 生命周期：`Idle` → `play()` → `Playing` → `Completed` / `Cancelled`。
//! `Completed` 事件只在自然结束时产生一次；取消后不再产生任何事件。

use std::fmt::Write as _;

use tracing::debug;

use crate::error::TimelineError;
use crate::target::{Animatable, PropertySet, PropertyValue, TargetRef};

use super::position::Cursor;
use super::{Position, Repeat, Step};

/// 时间轴配置
#[derive(Debug, Clone, Default)]
pub struct TimelineConfig {
    /// 名称（用于日志）
    pub name: String,
}

impl TimelineConfig {
    /// 指定名称的配置
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// 时间轴状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineState {
    /// 尚未开始
    #[default]
    Idle,
    /// 正在播放
    Playing,
    /// 自然结束
    Completed,
    /// 已取消
    Cancelled,
}

impl TimelineState {
    /// 是否已结束（完成或取消）
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// 时间轴事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEvent {
    /// 到达回调点
    Cue(String),
    /// 自然结束
    Completed,
}

/// 单个目标槽位的运行状态
#[derive(Debug, Clone, Default)]
struct SlotState {
    /// 起始值（显式或首次激活时读取）
    from: Option<PropertySet>,
    /// 最终值已写入
    done: bool,
}

/// 已解析开始时间的步骤
#[derive(Debug, Clone)]
struct ScheduledStep {
    step: Step,
    start: u64,
    slots: Vec<SlotState>,
}

/// 回调点
#[derive(Debug, Clone)]
struct ScheduledCue {
    name: String,
    at: u64,
    fired: bool,
}

/// 布局条目（调试输出）
#[derive(Debug, Clone)]
struct LayoutEntry {
    start: u64,
    end: Option<u64>,
    kind: &'static str,
    name: String,
}

/// 时间轴
#[derive(Debug)]
pub struct Timeline {
    config: TimelineConfig,
    steps: Vec<ScheduledStep>,
    cues: Vec<ScheduledCue>,
    cursor: Cursor,
    layout: Vec<LayoutEntry>,
    /// 总时长；None 表示包含无限循环
    duration: Option<u64>,
    elapsed: u64,
    state: TimelineState,
}

impl Timeline {
    /// 创建空时间轴
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            steps: Vec::new(),
            cues: Vec::new(),
            cursor: Cursor::default(),
            layout: Vec::new(),
            duration: Some(0),
            elapsed: 0,
            state: TimelineState::Idle,
        }
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// 当前状态
    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// 总时长（毫秒）；None 表示无限
    pub fn duration(&self) -> Option<u64> {
        self.duration
    }

    /// 已播放时间（毫秒）
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    fn ensure_editable(&self) -> Result<(), TimelineError> {
        if self.state == TimelineState::Idle {
            Ok(())
        } else {
            Err(TimelineError::AlreadyStarted {
                name: self.config.name.clone(),
            })
        }
    }

    fn extend_duration(&mut self, end: Option<u64>) {
        self.duration = match (self.duration, end) {
            (Some(d), Some(e)) => Some(d.max(e)),
            _ => None,
        };
    }

    /// 追加步骤，返回解析后的开始时间
    pub fn add_step(&mut self, step: Step) -> Result<u64, TimelineError> {
        self.ensure_editable()?;
        let start = self.cursor.resolve(step.position())?;
        let end = step.total_span().map(|span| start + span);

        if step.targets.missing() > 0 {
            debug!(
                timeline = %self.config.name,
                start,
                missing = step.targets.missing(),
                "动画目标缺失，对应槽位降级为占位延迟"
            );
        }

        self.cursor.advance(start, end);
        self.extend_duration(end);
        self.layout.push(LayoutEntry {
            start,
            end,
            kind: "step",
            name: step.targets.describe(),
        });

        let slots = vec![SlotState::default(); step.slot_count() as usize];
        self.steps.push(ScheduledStep { step, start, slots });
        Ok(start)
    }

    /// 定义标签（不移动游标）
    pub fn add_label(&mut self, name: &str, position: Position) -> Result<u64, TimelineError> {
        self.ensure_editable()?;
        if self.cursor.labels.contains_key(name) {
            return Err(TimelineError::DuplicateLabel {
                label: name.to_string(),
            });
        }
        let at = self.cursor.resolve(&position)?;
        self.cursor.labels.insert(name.to_string(), at);
        self.extend_duration(Some(at));
        self.layout.push(LayoutEntry {
            start: at,
            end: Some(at),
            kind: "label",
            name: name.to_string(),
        });
        Ok(at)
    }

    /// 插入回调点（零时长子项，移动游标）
    pub fn add_cue(&mut self, name: &str, position: Position) -> Result<u64, TimelineError> {
        self.ensure_editable()?;
        let at = self.cursor.resolve(&position)?;
        self.cursor.advance(at, Some(at));
        self.extend_duration(Some(at));
        self.cues.push(ScheduledCue {
            name: name.to_string(),
            at,
            fired: false,
        });
        self.layout.push(LayoutEntry {
            start: at,
            end: Some(at),
            kind: "cue",
            name: name.to_string(),
        });
        Ok(at)
    }

    /// 开始播放
    ///
    /// 显式起止值的步骤按声明顺序渲染起始值，随后在时间 0 求值一次。重复调用无效果。
    pub fn play(&mut self) {
        if self.state != TimelineState::Idle {
            return;
        }
        self.state = TimelineState::Playing;

        for scheduled in &mut self.steps {
            let Some(from) = scheduled.step.from.clone() else {
                continue;
            };
            for (slot, target) in scheduled.slots.iter_mut().zip(scheduled.step.targets.slots()) {
                if let Some(target) = target {
                    for (key, value) in from.iter() {
                        target.set_property(key, value.clone());
                    }
                    slot.from = Some(capture_from(
                        target.as_ref(),
                        &scheduled.step.to,
                        Some(&from),
                    ));
                }
            }
        }

        // 时间 0 处的步骤立即生效
        for scheduled in &mut self.steps {
            evaluate(scheduled, 0);
        }
    }

    /// 取消
    ///
    /// 幂等；已完成的时间轴保持 `Completed`。
    pub fn cancel(&mut self) {
        if !self.state.is_finished() {
            self.state = TimelineState::Cancelled;
        }
    }

    /// 距离下一个事件（回调点或结束）的时间
    pub fn time_to_next_event(&self) -> Option<u64> {
        if self.state != TimelineState::Playing {
            return None;
        }
        let next_cue = self
            .cues
            .iter()
            .filter(|c| !c.fired)
            .map(|c| c.at.saturating_sub(self.elapsed))
            .min();
        let completion = self.duration.map(|d| d.saturating_sub(self.elapsed));
        match (next_cue, completion) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// 推进时间轴
    ///
    /// 在新的时间点求值所有步骤，然后按时间顺序触发到期的回调点，最后检查是否结束。
    pub fn update(&mut self, dt: u64) -> Vec<TimelineEvent> {
        if self.state != TimelineState::Playing {
            return Vec::new();
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        let now = self.elapsed;

        for scheduled in &mut self.steps {
            evaluate(scheduled, now);
        }

        let mut events = Vec::new();
        let mut due: Vec<usize> = (0..self.cues.len())
            .filter(|&i| !self.cues[i].fired && self.cues[i].at <= now)
            .collect();
        due.sort_by_key(|&i| self.cues[i].at);
        for i in due {
            self.cues[i].fired = true;
            events.push(TimelineEvent::Cue(self.cues[i].name.clone()));
        }

        if self.duration.is_some_and(|d| now >= d) {
            self.state = TimelineState::Completed;
            events.push(TimelineEvent::Completed);
        }
        events
    }

    /// 解析后的布局（调试与快照测试）
    pub fn layout(&self) -> String {
        let mut out = String::new();
        for entry in &self.layout {
            let end = entry
                .end
                .map_or_else(|| "inf".to_string(), |e| e.to_string());
            let _ = writeln!(
                out,
                "{:<6}..{:<6} {:<5} {}",
                entry.start, end, entry.kind, entry.name
            );
        }
        out
    }
}

/// 计算某槽位的起始值：显式值优先，其次读取目标当前值，最后退化为目标值
fn capture_from(
    target: &dyn Animatable,
    to: &PropertySet,
    explicit: Option<&PropertySet>,
) -> PropertySet {
    let mut from = PropertySet::new();
    for (key, end) in to.iter() {
        let value = explicit
            .and_then(|set| set.get(key).cloned())
            .or_else(|| target.get_property(key))
            .unwrap_or_else(|| end.clone());
        from.insert(key, value);
    }
    from
}

/// 在时间轴时间 `now` 求值一个步骤
fn evaluate(scheduled: &mut ScheduledStep, now: u64) {
    let step = &scheduled.step;
    let span = step.per_target_span();

    for (index, slot) in scheduled.slots.iter_mut().enumerate() {
        if slot.done {
            continue;
        }
        let begin = scheduled.start + step.stagger_ms * index as u64;
        if now < begin {
            continue;
        }
        let local = now - begin;
        let finished = span.is_some_and(|s| local >= s);

        let target: Option<&TargetRef> = step.targets.slots().get(index).and_then(Option::as_ref);
        let Some(target) = target else {
            // 缺失目标：只占用时间
            slot.done = finished;
            continue;
        };

        let from = slot
            .from
            .get_or_insert_with(|| capture_from(target.as_ref(), &step.to, step.from.as_ref()));

        let (iteration, fraction) = if finished {
            let last = match step.repeat {
                Repeat::Count(n) => n as u64,
                Repeat::Infinite => 0,
            };
            (last, 1.0)
        } else {
            let iteration = local / step.duration_ms;
            let fraction = (local % step.duration_ms) as f32 / step.duration_ms as f32;
            (iteration, fraction)
        };

        let reversed = step.yoyo && iteration % 2 == 1;
        let eased = step.easing.apply(fraction);
        for (key, end) in step.to.iter() {
            let start = from.get(key).unwrap_or(end);
            let value: PropertyValue = if reversed {
                end.interpolate(start, eased)
            } else {
                start.interpolate(end, eased)
            };
            target.set_property(key, value);
        }
        slot.done = finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::target::PropertyBag;
    use crate::timeline::Targets;

    fn fade(target: &std::rc::Rc<PropertyBag>) -> Step {
        Step::from_to(
            target,
            PropertySet::new().num("opacity", 0.0),
            PropertySet::new().num("opacity", 1.0),
        )
        .duration(1000)
        .ease(Easing::Linear)
    }

    #[test]
    fn test_sequential_resolution() {
        let a = PropertyBag::shared("a");
        let mut tl = Timeline::new(TimelineConfig::named("seq"));
        assert_eq!(tl.add_step(fade(&a)).unwrap(), 0);
        assert_eq!(tl.add_step(fade(&a)).unwrap(), 1000);
        assert_eq!(tl.add_step(fade(&a).at(Position::AfterEnd(-500))).unwrap(), 1500);
        assert_eq!(tl.add_step(fade(&a).at(Position::WithStart(100))).unwrap(), 1600);
        assert_eq!(tl.duration(), Some(2600));
    }

    #[test]
    fn test_immediate_render_and_progress() {
        let a = PropertyBag::shared("a");
        let mut tl = Timeline::new(TimelineConfig::named("fade"));
        tl.add_step(fade(&a).at(Position::At(500))).unwrap();

        assert_eq!(a.get_property("opacity"), None);
        tl.play();
        // 开始播放即渲染起始值
        assert_eq!(a.number_or("opacity", -1.0), 0.0);

        tl.update(400);
        assert_eq!(a.number_or("opacity", -1.0), 0.0);
        tl.update(600);
        assert!((a.number_or("opacity", -1.0) - 0.5).abs() < 1e-6);
        let events = tl.update(500);
        assert_eq!(a.number_or("opacity", -1.0), 1.0);
        assert_eq!(events, vec![TimelineEvent::Completed]);
        assert_eq!(tl.state(), TimelineState::Completed);
    }

    #[test]
    fn test_to_captures_current_value() {
        let bar = PropertyBag::shared("bar");
        bar.set("scale_x", 0.6);
        let mut tl = Timeline::new(TimelineConfig::named("reset"));
        tl.add_step(
            Step::to(&bar, PropertySet::new().num("scale_x", 0.0))
                .duration(300)
                .ease(Easing::Linear),
        )
        .unwrap();
        tl.play();
        tl.update(150);
        assert!((bar.number_or("scale_x", -1.0) - 0.3).abs() < 1e-6);
        tl.update(150);
        assert_eq!(bar.number_or("scale_x", -1.0), 0.0);
    }

    #[test]
    fn test_stagger_preserves_order() {
        let words: Vec<_> = (0..3).map(|i| PropertyBag::shared(format!("w{i}"))).collect();
        let mut tl = Timeline::new(TimelineConfig::named("words"));
        tl.add_step(
            Step::from_to(
                words.clone(),
                PropertySet::new().num("opacity", 0.0),
                PropertySet::new().num("opacity", 1.0),
            )
            .duration(100)
            .stagger(50)
            .ease(Easing::Linear),
        )
        .unwrap();
        assert_eq!(tl.duration(), Some(200));

        tl.play();
        tl.update(75);
        let values: Vec<f32> = words.iter().map(|w| w.number_or("opacity", -1.0)).collect();
        assert!((values[0] - 0.75).abs() < 1e-6);
        assert!((values[1] - 0.25).abs() < 1e-6);
        assert_eq!(values[2], 0.0);
    }

    #[test]
    fn test_stagger_gap_keeps_its_slot() {
        let a = PropertyBag::shared("a");
        let c = PropertyBag::shared("c");
        let targets = Targets::none()
            .with(&a)
            .with_maybe(Option::<&std::rc::Rc<PropertyBag>>::None)
            .with(&c);
        let mut tl = Timeline::new(TimelineConfig::named("gap"));
        tl.add_step(
            Step::from_to(
                targets,
                PropertySet::new().num("opacity", 0.0),
                PropertySet::new().num("opacity", 1.0),
            )
            .duration(100)
            .stagger(50)
            .ease(Easing::Linear),
        )
        .unwrap();
        assert_eq!(tl.duration(), Some(200));

        tl.play();
        tl.update(150);
        assert_eq!(a.number_or("opacity", -1.0), 1.0);
        // 第三个目标仍从 100ms 开始
        assert!((c.number_or("opacity", -1.0) - 0.5).abs() < 1e-6);
        assert_eq!(tl.update(50), vec![TimelineEvent::Completed]);
        assert_eq!(c.number_or("opacity", -1.0), 1.0);
    }

    #[test]
    fn test_yoyo_reverses_odd_iterations() {
        let c = PropertyBag::shared("container");
        let mut tl = Timeline::new(TimelineConfig::named("float"));
        tl.add_step(
            Step::from_to(
                &c,
                PropertySet::new().num("y", 0.0),
                PropertySet::new().num("y", -4.0),
            )
            .duration(1000)
            .ease(Easing::Linear)
            .repeat(Repeat::Count(1))
            .yoyo(true),
        )
        .unwrap();
        tl.play();
        tl.update(1250);
        assert!((c.number_or("y", 0.0) - -3.0).abs() < 1e-5);
        let events = tl.update(750);
        // 第二次迭代反向，结束于起始值
        assert_eq!(c.number_or("y", 1.0), 0.0);
        assert_eq!(events, vec![TimelineEvent::Completed]);
    }

    #[test]
    fn test_infinite_never_completes() {
        let line = PropertyBag::shared("hairline");
        let mut tl = Timeline::new(TimelineConfig::named("scroll"));
        tl.add_step(
            Step::from_to(
                &line,
                PropertySet::new().num("x_percent", 0.0),
                PropertySet::new().num("x_percent", 100.0),
            )
            .duration(10_000)
            .ease(Easing::Linear)
            .repeat(Repeat::Infinite),
        )
        .unwrap();
        assert_eq!(tl.duration(), None);
        tl.play();
        assert!(tl.update(125_000).is_empty());
        assert!((line.number_or("x_percent", 0.0) - 50.0).abs() < 1e-3);
        assert_eq!(tl.time_to_next_event(), None);

        // 相对无限步骤的结束时间定位是构建错误
        let mut tl = Timeline::new(TimelineConfig::named("scroll"));
        tl.add_step(
            Step::to(&line, PropertySet::new().num("x_percent", 100.0)).repeat(Repeat::Infinite),
        )
        .unwrap();
        assert!(matches!(
            tl.add_step(fade(&line)),
            Err(TimelineError::UnboundedPrevious { .. })
        ));
    }

    #[test]
    fn test_labels() {
        let a = PropertyBag::shared("a");
        let mut tl = Timeline::new(TimelineConfig::named("labels"));
        tl.add_step(fade(&a)).unwrap();
        assert_eq!(tl.add_label("cards", Position::AfterEnd(-200)).unwrap(), 800);
        assert_eq!(
            tl.add_step(fade(&a).at(Position::label_offset("cards", 400))).unwrap(),
            1200
        );
        assert!(matches!(
            tl.add_step(fade(&a).at(Position::label("outro"))),
            Err(TimelineError::UnknownLabel { .. })
        ));
        assert!(matches!(
            tl.add_label("cards", Position::Sequential),
            Err(TimelineError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_cue_fires_once_in_order() {
        let a = PropertyBag::shared("a");
        let mut tl = Timeline::new(TimelineConfig::named("cues"));
        tl.add_step(fade(&a)).unwrap();
        tl.add_cue("mid", Position::Sequential).unwrap();
        tl.add_step(fade(&a)).unwrap();
        tl.add_cue("early", Position::At(200)).unwrap();
        tl.play();

        assert_eq!(tl.time_to_next_event(), Some(200));
        let events = tl.update(1500);
        assert_eq!(
            events,
            vec![
                TimelineEvent::Cue("early".to_string()),
                TimelineEvent::Cue("mid".to_string()),
            ]
        );
        assert_eq!(tl.time_to_next_event(), Some(500));
        assert_eq!(tl.update(500), vec![TimelineEvent::Completed]);
    }

    #[test]
    fn test_cancel_suppresses_completion() {
        let a = PropertyBag::shared("a");
        let mut tl = Timeline::new(TimelineConfig::named("cancel"));
        tl.add_step(fade(&a)).unwrap();
        tl.play();
        tl.update(500);
        tl.cancel();
        tl.cancel();
        assert_eq!(tl.state(), TimelineState::Cancelled);
        assert!(tl.update(1000).is_empty());
        assert!((a.number_or("opacity", 0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_cancel_after_completion_is_noop() {
        let a = PropertyBag::shared("a");
        let mut tl = Timeline::new(TimelineConfig::named("done"));
        tl.add_step(fade(&a)).unwrap();
        tl.play();
        tl.update(1000);
        tl.cancel();
        assert_eq!(tl.state(), TimelineState::Completed);
    }

    #[test]
    fn test_missing_target_keeps_timing() {
        let a = PropertyBag::shared("a");
        let mut tl = Timeline::new(TimelineConfig::named("missing"));
        tl.add_step(
            Step::from_to(
                Option::<&std::rc::Rc<PropertyBag>>::None,
                PropertySet::new().num("opacity", 0.0),
                PropertySet::new().num("opacity", 1.0),
            )
            .duration(700),
        )
        .unwrap();
        tl.add_step(fade(&a)).unwrap();
        assert_eq!(tl.duration(), Some(1700));

        tl.play();
        assert!(tl.update(1699).is_empty());
        assert_eq!(tl.update(1), vec![TimelineEvent::Completed]);
        assert_eq!(a.number_or("opacity", 0.0), 1.0);
    }

    #[test]
    fn test_cannot_edit_after_play() {
        let a = PropertyBag::shared("a");
        let mut tl = Timeline::new(TimelineConfig::named("locked"));
        tl.play();
        assert!(matches!(
            tl.add_step(fade(&a)),
            Err(TimelineError::AlreadyStarted { .. })
        ));
    }

    #[test]
    fn test_empty_timeline_completes_immediately() {
        let mut tl = Timeline::new(TimelineConfig::named("empty"));
        tl.play();
        assert_eq!(tl.time_to_next_event(), Some(0));
        assert_eq!(tl.update(0), vec![TimelineEvent::Completed]);
    }

    #[test]
    fn test_text_property_switches_after_set() {
        let overlay = PropertyBag::shared("overlay");
        overlay.set("background", "light");
        let mut tl = Timeline::new(TimelineConfig::named("bg"));
        tl.add_step(
            Step::set(&overlay, PropertySet::new().text("background", "dark"))
                .at(Position::At(100)),
        )
        .unwrap();
        tl.play();
        tl.update(99);
        assert_eq!(overlay.text("background").as_deref(), Some("light"));
        tl.update(1);
        assert_eq!(overlay.text("background").as_deref(), Some("dark"));
    }
}
