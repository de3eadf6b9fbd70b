//! # Step 模块
//!
//! 时间轴上的单个属性插值指令。

use std::rc::Rc;

use crate::easing::Easing;
use crate::target::{Animatable, PropertySet, TargetRef};

use super::Position;

/// 循环次数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// 额外重复 n 次（`Count(0)` 即只播放一次）
    Count(u32),
    /// 无限循环，直到时间轴被取消
    Infinite,
}

impl Repeat {
    /// 是否有界
    pub fn is_bounded(&self) -> bool {
        matches!(self, Repeat::Count(_))
    }
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Count(0)
    }
}

/// 步骤目标列表
///
/// `None` 表示缺失的目标：该槽位不写入任何属性，但仍占用时间（含 stagger 偏移）。
#[derive(Clone, Default)]
pub struct Targets(Vec<Option<TargetRef>>);

impl Targets {
    /// 空列表（整个步骤降级为占位延迟）
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// 追加一个目标
    pub fn with<T: Animatable>(mut self, target: &Rc<T>) -> Self {
        self.0.push(Some(target.clone() as TargetRef));
        self
    }

    /// 追加一个可能缺失的目标
    pub fn with_maybe<T: Animatable>(mut self, target: Option<&Rc<T>>) -> Self {
        self.0.push(target.map(|t| t.clone() as TargetRef));
        self
    }

    /// 槽位数
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否无槽位
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 缺失的槽位数（空列表算一个）
    pub fn missing(&self) -> usize {
        if self.0.is_empty() {
            1
        } else {
            self.0.iter().filter(|t| t.is_none()).count()
        }
    }

    pub(crate) fn slots(&self) -> &[Option<TargetRef>] {
        &self.0
    }

    /// 用于日志与布局输出的名称
    pub fn describe(&self) -> String {
        if self.0.is_empty() {
            return "<missing>".to_string();
        }
        let names: Vec<&str> = self
            .0
            .iter()
            .map(|t| t.as_ref().map_or("<missing>", |t| t.name()))
            .collect();
        if names.len() > 3 {
            format!("{} +{}", names[..3].join(","), names.len() - 3)
        } else {
            names.join(",")
        }
    }
}

impl<T: Animatable> From<&Rc<T>> for Targets {
    fn from(value: &Rc<T>) -> Self {
        Targets::none().with(value)
    }
}

impl<T: Animatable> From<Rc<T>> for Targets {
    fn from(value: Rc<T>) -> Self {
        Targets(vec![Some(value as TargetRef)])
    }
}

impl<T: Animatable> From<Option<&Rc<T>>> for Targets {
    fn from(value: Option<&Rc<T>>) -> Self {
        Targets::none().with_maybe(value)
    }
}

impl<T: Animatable> From<&[Rc<T>]> for Targets {
    fn from(value: &[Rc<T>]) -> Self {
        Targets(
            value
                .iter()
                .map(|t| Some(t.clone() as TargetRef))
                .collect(),
        )
    }
}

impl<T: Animatable> From<Vec<Rc<T>>> for Targets {
    fn from(value: Vec<Rc<T>>) -> Self {
        Targets(value.into_iter().map(|t| Some(t as TargetRef)).collect())
    }
}

impl std::fmt::Debug for Targets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Targets").field(&self.describe()).finish()
    }
}

/// 动画步骤
///
/// 三种形态：
/// - `from_to`：显式起止值，时间轴开始播放时立即渲染起始值
/// - `to`：起始值在步骤首次激活时从目标读取
/// - `set`：零时长，激活即写入
#[derive(Debug, Clone)]
pub struct Step {
    pub(crate) targets: Targets,
    pub(crate) from: Option<PropertySet>,
    pub(crate) to: PropertySet,
    pub(crate) duration_ms: u64,
    pub(crate) easing: Easing,
    pub(crate) stagger_ms: u64,
    pub(crate) repeat: Repeat,
    pub(crate) yoyo: bool,
    pub(crate) position: Position,
}

impl Step {
    fn new(targets: Targets, from: Option<PropertySet>, to: PropertySet) -> Self {
        Self {
            targets,
            from,
            to,
            duration_ms: 500,
            easing: Easing::default(),
            stagger_ms: 0,
            repeat: Repeat::default(),
            yoyo: false,
            position: Position::Sequential,
        }
    }

    /// 显式起止值的步骤
    pub fn from_to(targets: impl Into<Targets>, from: PropertySet, to: PropertySet) -> Self {
        Self::new(targets.into(), Some(from), to)
    }

    /// 从目标当前值过渡到 `to`
    pub fn to(targets: impl Into<Targets>, to: PropertySet) -> Self {
        Self::new(targets.into(), None, to)
    }

    /// 零时长赋值
    pub fn set(targets: impl Into<Targets>, values: PropertySet) -> Self {
        Self::new(targets.into(), None, values).duration(0)
    }

    /// 单次迭代时长（毫秒）
    pub fn duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }

    /// 缓动函数
    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// 多目标之间的固定间隔（毫秒）
    pub fn stagger(mut self, ms: u64) -> Self {
        self.stagger_ms = ms;
        self
    }

    /// 循环次数
    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// 奇数次迭代反向播放
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// 插入位置
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// 插入位置
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// 是否为显式起止值步骤
    pub fn renders_immediately(&self) -> bool {
        self.from.is_some()
    }

    /// 槽位数（至少为 1）
    pub(crate) fn slot_count(&self) -> u64 {
        self.targets.len().max(1) as u64
    }

    /// 单个目标的总时长；None 表示无限
    pub(crate) fn per_target_span(&self) -> Option<u64> {
        match self.repeat {
            Repeat::Count(n) => Some(self.duration_ms.saturating_mul(n as u64 + 1)),
            Repeat::Infinite if self.duration_ms == 0 => Some(0),
            Repeat::Infinite => None,
        }
    }

    /// 整个步骤的总时长（含 stagger）；None 表示无限
    pub fn total_span(&self) -> Option<u64> {
        let stagger = self.stagger_ms.saturating_mul(self.slot_count() - 1);
        self.per_target_span().map(|span| span.saturating_add(stagger))
    }
}
