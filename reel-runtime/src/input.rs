//! # Input 模块
//!
//! 键盘输入到导航动作的映射。
//!
//! 宿主只需要把按键编码传进来，引擎返回语义化的动作和是否阻止默认行为。

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 按键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// 空格
    Space,
    /// 右方向键
    ArrowRight,
    /// 左方向键
    ArrowLeft,
    /// 其他按键（忽略）
    Other(String),
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    /// 接受按键编码（`Space` / `ArrowRight` / `ArrowLeft`）和简写
    /// （`space` / `right` / `left`），其余一律视为 `Other`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim() {
            "Space" | "space" | " " => Key::Space,
            "ArrowRight" | "right" => Key::ArrowRight,
            "ArrowLeft" | "left" => Key::ArrowLeft,
            other => Key::Other(other.to_string()),
        };
        Ok(key)
    }
}

/// 导航动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavAction {
    /// 切换播放/暂停
    TogglePlay,
    /// 下一个场景
    Next,
    /// 上一个场景
    Prev,
}

/// 按键处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyResponse {
    /// 触发的动作
    pub action: Option<NavAction>,
    /// 宿主是否应阻止该按键的默认行为（空格滚动页面）
    pub prevent_default: bool,
}

impl Key {
    /// 按键映射
    pub fn response(&self) -> KeyResponse {
        match self {
            Key::Space => KeyResponse {
                action: Some(NavAction::TogglePlay),
                prevent_default: true,
            },
            Key::ArrowRight => KeyResponse {
                action: Some(NavAction::Next),
                prevent_default: false,
            },
            Key::ArrowLeft => KeyResponse {
                action: Some(NavAction::Prev),
                prevent_default: false,
            },
            Key::Other(_) => KeyResponse::default(),
        }
    }
}
