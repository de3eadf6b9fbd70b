//! # Scene 模块
//!
//! 三个固定场景及其编排。
//!
//! 每次选中一个场景都会重新挂载：创建命名元素、运行入场时间轴和常驻微动效、
//! 启动打字机（如有）。切走或卸载时取消全部时间轴。
//!
//! 元素只是带名字的 `PropertyBag`，宿主按名字读取属性做渲染。

mod content;
mod event;
mod guest;
mod sponsor;

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::TimelineError;
use crate::target::{PropertyBag, PropertySet};
use crate::timeline::{ScheduledEvent, Timeline, TimelineEvent, TimelineHandle, TimelineScheduler};
use crate::typewriter::{Typewriter, TypewriterState};

pub use content::{EventContent, GuestContent, SceneContent, SponsorCard, SponsorContent};

/// 场景类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    /// 活动介绍
    Event,
    /// 嘉宾介绍
    Guest,
    /// 赞助商
    Sponsor,
}

impl SceneKind {
    /// 固定的场景顺序
    pub const ALL: [SceneKind; 3] = [SceneKind::Event, SceneKind::Guest, SceneKind::Sponsor];

    /// 场景下标
    pub fn index(&self) -> usize {
        match self {
            SceneKind::Event => 0,
            SceneKind::Guest => 1,
            SceneKind::Sponsor => 2,
        }
    }

    /// 由下标获取场景
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            SceneKind::Event => "event",
            SceneKind::Guest => "guest",
            SceneKind::Sponsor => "sponsor",
        }
    }
}

/// 场景挂载时的构建器
pub(crate) struct SceneBuilder<'a> {
    kind: SceneKind,
    scheduler: &'a mut TimelineScheduler,
    elements: BTreeMap<String, Rc<PropertyBag>>,
    timelines: Vec<TimelineHandle>,
    typewriter: Option<(String, Typewriter)>,
}

impl<'a> SceneBuilder<'a> {
    fn new(kind: SceneKind, scheduler: &'a mut TimelineScheduler) -> Self {
        Self {
            kind,
            scheduler,
            elements: BTreeMap::new(),
            timelines: Vec::new(),
            typewriter: None,
        }
    }

    /// 创建命名元素并写入初始属性
    pub fn element(&mut self, name: &str, initial: PropertySet) -> Rc<PropertyBag> {
        let element = PropertyBag::shared(name);
        for (key, value) in initial.iter() {
            element.set(key, value.clone());
        }
        self.elements.insert(name.to_string(), element.clone());
        element
    }

    /// 创建一组元素，名称为 `prefix.0`、`prefix.1` ...
    pub fn elements(
        &mut self,
        prefix: &str,
        count: usize,
        initial: &PropertySet,
    ) -> Vec<Rc<PropertyBag>> {
        (0..count)
            .map(|i| self.element(&format!("{prefix}.{i}"), initial.clone()))
            .collect()
    }

    /// 创建可能缺失的元素
    pub fn optional(
        &mut self,
        name: &str,
        present: bool,
        initial: PropertySet,
    ) -> Option<Rc<PropertyBag>> {
        present.then(|| self.element(name, initial))
    }

    /// 交给调度器并开始播放
    pub fn run(&mut self, timeline: Timeline) -> Result<TimelineHandle, TimelineError> {
        let name = timeline.name().to_string();
        let duration = timeline.duration();
        let handle = self.scheduler.insert(timeline);
        self.scheduler.play(handle)?;
        self.timelines.push(handle);
        debug!(
            scene = self.kind.name(),
            timeline = %name,
            %handle,
            ?duration,
            "场景时间轴开始"
        );
        Ok(handle)
    }

    /// 绑定打字机，文本写入 `element` 的 `text` 属性
    pub fn typewriter(&mut self, element: &str, typewriter: Typewriter) {
        self.typewriter = Some((element.to_string(), typewriter));
    }
}

/// 当前挂载的场景
#[derive(Debug)]
pub struct ActiveScene {
    kind: SceneKind,
    elements: BTreeMap<String, Rc<PropertyBag>>,
    timelines: Vec<TimelineHandle>,
    typewriter: Option<(String, Typewriter)>,
}

impl ActiveScene {
    /// 挂载场景：创建元素并启动所有动画
    pub fn mount(
        kind: SceneKind,
        content: &SceneContent,
        config: &EngineConfig,
        scheduler: &mut TimelineScheduler,
    ) -> Result<Self, TimelineError> {
        let mut builder = SceneBuilder::new(kind, scheduler);
        match kind {
            SceneKind::Event => event::build(&mut builder, &content.event, config)?,
            SceneKind::Guest => guest::build(&mut builder, &content.guest)?,
            SceneKind::Sponsor => sponsor::build(&mut builder, &content.sponsor)?,
        }

        let scene = Self {
            kind,
            elements: builder.elements,
            timelines: builder.timelines,
            typewriter: builder.typewriter,
        };
        scene.write_typewriter_text();
        debug!(
            scene = kind.name(),
            elements = scene.elements.len(),
            timelines = scene.timelines.len(),
            "场景已挂载"
        );
        Ok(scene)
    }

    /// 场景类型
    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    /// 按名称查询元素
    pub fn element(&self, name: &str) -> Option<&Rc<PropertyBag>> {
        self.elements.get(name)
    }

    /// 全部元素名称
    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// 打字机状态
    pub fn typewriter(&self) -> Option<TypewriterState> {
        self.typewriter.as_ref().map(|(_, tw)| tw.state())
    }

    /// 句柄是否属于本场景
    pub fn owns(&self, handle: TimelineHandle) -> bool {
        self.timelines.contains(&handle)
    }

    /// 仍在调度器中的时间轴数量
    pub fn live_timelines(&self, scheduler: &TimelineScheduler) -> usize {
        self.timelines
            .iter()
            .filter(|h| scheduler.contains(**h))
            .count()
    }

    /// 推进打字机
    pub fn advance_typewriter(&mut self, dt: u64) {
        let changed = self
            .typewriter
            .as_mut()
            .is_some_and(|(_, tw)| tw.advance(dt));
        if changed {
            self.write_typewriter_text();
        }
    }

    fn write_typewriter_text(&self) {
        let Some((name, tw)) = &self.typewriter else {
            return;
        };
        if let Some(element) = self.elements.get(name) {
            element.set("text", tw.text());
        }
    }

    /// 处理调度器事件，返回事件是否属于本场景
    pub fn handle_event(&mut self, event: &ScheduledEvent) -> bool {
        if !self.owns(event.handle) {
            return false;
        }
        if event.event == TimelineEvent::Completed {
            self.timelines.retain(|h| *h != event.handle);
            debug!(scene = self.kind.name(), handle = %event.handle, "场景时间轴结束");
        }
        true
    }

    /// 卸载：取消所有时间轴和打字机
    pub fn teardown(&mut self, scheduler: &mut TimelineScheduler) {
        for handle in self.timelines.drain(..) {
            scheduler.cancel(handle);
        }
        if let Some((_, tw)) = &mut self.typewriter {
            tw.cancel();
        }
        debug!(scene = self.kind.name(), "场景已卸载");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mount(kind: SceneKind, scheduler: &mut TimelineScheduler) -> ActiveScene {
        let content = SceneContent::demo().unwrap();
        ActiveScene::mount(kind, &content, &EngineConfig::default(), scheduler).unwrap()
    }

    #[test]
    fn test_scene_kind_index() {
        for (i, kind) in SceneKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(SceneKind::from_index(i), Some(*kind));
        }
        assert_eq!(SceneKind::from_index(3), None);
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let mut scheduler = TimelineScheduler::new();
        for kind in SceneKind::ALL {
            let mut scene = mount(kind, &mut scheduler);
            assert!(scene.live_timelines(&scheduler) >= 2);
            scene.teardown(&mut scheduler);
            assert_eq!(scene.live_timelines(&scheduler), 0);
            assert_eq!(scheduler.playing_count(), 0);
        }
    }

    #[test]
    fn test_entrance_completes_and_idle_keeps_running() {
        let mut scheduler = TimelineScheduler::new();
        let mut scene = mount(SceneKind::Guest, &mut scheduler);
        let before = scene.live_timelines(&scheduler);

        for batch in scheduler.advance(30_000) {
            for event in &batch.events {
                assert!(scene.handle_event(event));
            }
        }
        // 入场结束，常驻微动效仍在
        assert_eq!(scene.live_timelines(&scheduler), before - 1);
        assert!(scene.live_timelines(&scheduler) >= 1);
    }
}
