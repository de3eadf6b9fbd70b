//! # State 模块
//!
//! 播放状态与可序列化的演示器快照。

use serde::{Deserialize, Serialize};

use crate::autoplay::CountdownState;
use crate::scene::SceneKind;
use crate::typewriter::TypewriterState;

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// 自动播放中
    #[default]
    Playing,
    /// 已暂停
    Paused,
}

impl PlaybackState {
    /// 是否在播放
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    /// 切换后的状态
    pub fn toggled(&self) -> Self {
        match self {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
        }
    }
}

/// 演示器快照
///
/// 用于宿主展示和测试断言，不用于恢复状态。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenterSnapshot {
    /// 虚拟时钟（毫秒）
    pub now_ms: u64,
    /// 当前场景下标
    pub scene_index: usize,
    /// 当前场景类型
    pub scene: SceneKind,
    /// 播放状态
    pub playback: PlaybackState,
    /// 是否正在切换场景
    pub transitioning: bool,
    /// 自动播放倒计时
    pub countdown: CountdownState,
    /// 当前场景的打字机（如有）
    pub typewriter: Option<TypewriterState>,
    /// 遮罩层透明度
    pub overlay_opacity: f32,
    /// 活跃时间轴数量
    pub active_timelines: usize,
}
