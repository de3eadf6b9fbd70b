//! # Target 模块
//!
//! 动画目标与属性值。
//!
//! ## 核心概念
//!
//! - `PropertyValue`: 属性值，数值可插值，字符串只能切换
//! - `Animatable`: 可动画对象接口，时间轴通过它读写属性
//! - `PropertyBag`: 通用的命名属性容器，场景元素、遮罩层、进度条都用它
//! - `PropertySet`: 一组有序的属性赋值，用作步骤的起始值/目标值
//!
//! 时间轴不关心属性代表什么（位置、透明度、裁剪、旋转），对象自己决定如何使用。

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// 属性值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// 数值属性
    Number(f32),
    /// 字符串属性（背景渐变等）
    Text(String),
}

impl PropertyValue {
    /// 数值（字符串返回 None）
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PropertyValue::Number(v) => Some(*v),
            PropertyValue::Text(_) => None,
        }
    }

    /// 字符串（数值返回 None）
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Number(_) => None,
            PropertyValue::Text(s) => Some(s),
        }
    }

    /// 在 `self` 与 `to` 之间插值
    ///
    /// 数值按 `progress` 线性插值；类型不同或字符串时，`progress > 0` 即取 `to`。
    pub fn interpolate(&self, to: &PropertyValue, progress: f32) -> PropertyValue {
        match (self, to) {
            (PropertyValue::Number(a), PropertyValue::Number(b)) => {
                if progress >= 1.0 {
                    PropertyValue::Number(*b)
                } else {
                    PropertyValue::Number(a + (b - a) * progress)
                }
            }
            _ => {
                if progress > 0.0 {
                    to.clone()
                } else {
                    self.clone()
                }
            }
        }
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(v) => write!(f, "{v}"),
            PropertyValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// 可动画对象接口
///
/// 使用内部可变性，多个时间轴可以共享同一个目标（`Rc<dyn Animatable>`）。
/// 同一时刻对同一属性的多次写入，以声明顺序最后一次为准。
pub trait Animatable: 'static {
    /// 目标名称（用于日志）
    fn name(&self) -> &str;

    /// 获取属性的当前值
    ///
    /// # 返回
    /// - `Some(value)`: 属性存在
    /// - `None`: 属性从未被写入
    fn get_property(&self, property_id: &str) -> Option<PropertyValue>;

    /// 设置属性的新值
    ///
    /// # 返回
    /// - `true`: 设置成功
    /// - `false`: 目标拒绝了该属性
    fn set_property(&self, property_id: &str, value: PropertyValue) -> bool;
}

/// 共享的动画目标引用
pub type TargetRef = Rc<dyn Animatable>;

/// 通用命名属性容器
///
/// 接受任意属性名，未写入的属性读取为 `None`。
#[derive(Debug, Default)]
pub struct PropertyBag {
    name: String,
    values: RefCell<BTreeMap<String, PropertyValue>>,
}

impl PropertyBag {
    /// 创建空的属性容器
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: RefCell::new(BTreeMap::new()),
        }
    }

    /// 创建并包装为共享引用
    pub fn shared(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self::new(name))
    }

    /// 读取数值属性，缺失或非数值时返回默认值
    pub fn number_or(&self, property_id: &str, default: f32) -> f32 {
        self.values
            .borrow()
            .get(property_id)
            .and_then(PropertyValue::as_number)
            .unwrap_or(default)
    }

    /// 读取字符串属性
    pub fn text(&self, property_id: &str) -> Option<String> {
        self.values
            .borrow()
            .get(property_id)
            .and_then(|v| v.as_text().map(str::to_string))
    }

    /// 直接写入属性（不经过动画）
    pub fn set(&self, property_id: &str, value: impl Into<PropertyValue>) {
        self.values
            .borrow_mut()
            .insert(property_id.to_string(), value.into());
    }

    /// 当前所有属性的拷贝
    pub fn snapshot(&self) -> BTreeMap<String, PropertyValue> {
        self.values.borrow().clone()
    }
}

impl Animatable for PropertyBag {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property(&self, property_id: &str) -> Option<PropertyValue> {
        self.values.borrow().get(property_id).cloned()
    }

    fn set_property(&self, property_id: &str, value: PropertyValue) -> bool {
        self.values
            .borrow_mut()
            .insert(property_id.to_string(), value);
        true
    }
}

/// 有序的属性赋值集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertySet {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个数值属性
    pub fn num(mut self, key: &str, value: f32) -> Self {
        self.insert(key, PropertyValue::Number(value));
        self
    }

    /// 追加一个字符串属性
    pub fn text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, PropertyValue::Text(value.into()));
        self
    }

    /// 插入或覆盖属性，保持首次出现的顺序
    pub fn insert(&mut self, key: &str, value: PropertyValue) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// 查询属性
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 属性个数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_interpolation() {
        let from = PropertyValue::Number(0.0);
        let to = PropertyValue::Number(10.0);
        assert_eq!(from.interpolate(&to, 0.0), PropertyValue::Number(0.0));
        assert_eq!(from.interpolate(&to, 0.25), PropertyValue::Number(2.5));
        assert_eq!(from.interpolate(&to, 1.0), PropertyValue::Number(10.0));
    }

    #[test]
    fn test_text_snaps_once_started() {
        let from = PropertyValue::from("light");
        let to = PropertyValue::from("dark");
        assert_eq!(from.interpolate(&to, 0.0), from);
        assert_eq!(from.interpolate(&to, 0.01), to);
    }

    #[test]
    fn test_property_bag() {
        let bag = PropertyBag::new("overlay");
        assert_eq!(bag.name(), "overlay");
        assert_eq!(bag.get_property("opacity"), None);
        assert_eq!(bag.number_or("opacity", 0.3), 0.3);

        assert!(bag.set_property("opacity", PropertyValue::Number(1.0)));
        bag.set("background", "gradient");

        assert_eq!(bag.number_or("opacity", 0.0), 1.0);
        assert_eq!(bag.text("background").as_deref(), Some("gradient"));
        assert_eq!(bag.snapshot().len(), 2);
    }

    #[test]
    fn test_property_set_keeps_order_and_overrides() {
        let set = PropertySet::new()
            .num("x", 1.0)
            .num("opacity", 0.0)
            .num("x", 2.0);
        let keys: Vec<_> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["x", "opacity"]);
        assert_eq!(set.get("x"), Some(&PropertyValue::Number(2.0)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_untagged_serde() {
        let values: Vec<PropertyValue> = serde_json::from_str(r#"[0.5, "red"]"#).unwrap();
        assert_eq!(values[0], PropertyValue::Number(0.5));
        assert_eq!(values[1], PropertyValue::Text("red".to_string()));
    }
}
