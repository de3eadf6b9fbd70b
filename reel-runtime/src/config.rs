//! # Config 模块
//!
//! 引擎配置，集中管理所有可调常量。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (JSON)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::easing::Easing;
use crate::error::ConfigError;

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 每个场景的自动播放时长（毫秒）
    #[serde(default = "default_autoplay_ms")]
    pub autoplay_ms: u64,

    /// 背景音乐音量 (0.0 - 1.0)
    #[serde(default = "default_audio_volume")]
    pub audio_volume: f32,

    /// 暂停时进度条回零的时长（毫秒）
    #[serde(default = "default_progress_reset_ms")]
    pub progress_reset_ms: u64,

    /// 启动时是否处于播放状态
    #[serde(default = "default_start_playing")]
    pub start_playing: bool,

    /// 场景切换遮罩配置
    #[serde(default)]
    pub transition: TransitionConfig,

    /// 打字机配置
    #[serde(default)]
    pub typewriter: TypewriterConfig,
}

/// 场景切换遮罩配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// 遮罩滑入时长（毫秒）
    #[serde(default = "default_cover_ms")]
    pub cover_ms: u64,

    /// 遮罩滑入缓动
    #[serde(default = "default_cover_ease")]
    pub cover_ease: Easing,

    /// 遮罩滑出时长（毫秒）
    #[serde(default = "default_reveal_ms")]
    pub reveal_ms: u64,

    /// 遮罩滑出缓动
    #[serde(default = "default_reveal_ease")]
    pub reveal_ease: Easing,

    /// 遮罩初始倾斜角度（度）
    #[serde(default = "default_tilt_deg")]
    pub tilt_deg: f32,

    /// 遮罩在屏幕外时的横向偏移（百分比）
    #[serde(default = "default_offscreen_percent")]
    pub offscreen_percent: f32,

    /// 深色遮罩背景（仅 0 → 1 使用）
    #[serde(default = "default_dark_gradient")]
    pub dark_gradient: String,

    /// 浅色遮罩背景
    #[serde(default = "default_light_gradient")]
    pub light_gradient: String,
}

/// 打字机配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypewriterConfig {
    /// 每个字符的显示间隔（毫秒）
    #[serde(default = "default_type_speed_ms")]
    pub type_speed_ms: u64,

    /// 短语第一个字符之前的等待（毫秒）
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,

    /// 完整显示后的停留（毫秒）
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,

    /// 每个字符的删除间隔（毫秒）
    #[serde(default = "default_erase_speed_ms")]
    pub erase_speed_ms: u64,

    /// 两个短语之间的停顿（毫秒）
    #[serde(default = "default_between_ms")]
    pub between_ms: u64,
}

// 默认值函数
fn default_autoplay_ms() -> u64 {
    15_000
}

fn default_audio_volume() -> f32 {
    0.5
}

fn default_progress_reset_ms() -> u64 {
    300
}

fn default_start_playing() -> bool {
    true
}

fn default_cover_ms() -> u64 {
    380
}

fn default_cover_ease() -> Easing {
    Easing::Power3In
}

fn default_reveal_ms() -> u64 {
    460
}

fn default_reveal_ease() -> Easing {
    Easing::Power3Out
}

fn default_tilt_deg() -> f32 {
    0.8
}

fn default_offscreen_percent() -> f32 {
    100.0
}

fn default_dark_gradient() -> String {
    "linear-gradient(90deg, rgba(0,0,0,0.98) 0%, rgba(8,8,8,0.98) 45%, rgba(0,0,0,0.98) 100%)"
        .to_string()
}

fn default_light_gradient() -> String {
    "linear-gradient(90deg, rgba(255,255,255,0.92) 0%, rgba(246,242,233,0.98) 45%, rgba(226,220,207,0.96) 100%)"
        .to_string()
}

fn default_type_speed_ms() -> u64 {
    35
}

fn default_start_delay_ms() -> u64 {
    250
}

fn default_hold_ms() -> u64 {
    900
}

fn default_erase_speed_ms() -> u64 {
    22
}

fn default_between_ms() -> u64 {
    250
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autoplay_ms: default_autoplay_ms(),
            audio_volume: default_audio_volume(),
            progress_reset_ms: default_progress_reset_ms(),
            start_playing: default_start_playing(),
            transition: TransitionConfig::default(),
            typewriter: TypewriterConfig::default(),
        }
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            cover_ms: default_cover_ms(),
            cover_ease: default_cover_ease(),
            reveal_ms: default_reveal_ms(),
            reveal_ease: default_reveal_ease(),
            tilt_deg: default_tilt_deg(),
            offscreen_percent: default_offscreen_percent(),
            dark_gradient: default_dark_gradient(),
            light_gradient: default_light_gradient(),
        }
    }
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            type_speed_ms: default_type_speed_ms(),
            start_delay_ms: default_start_delay_ms(),
            hold_ms: default_hold_ms(),
            erase_speed_ms: default_erase_speed_ms(),
            between_ms: default_between_ms(),
        }
    }
}

impl EngineConfig {
    /// 加载配置文件
    ///
    /// 文件不存在时返回默认配置并打印警告；读取或解析失败返回错误。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_json_str(&content)?;
        debug!(path = %path.display(), "配置文件加载成功");
        Ok(config)
    }

    /// 从 JSON 文本解析并验证
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.autoplay_ms == 0 {
            return Err(ConfigError::Validation(
                "autoplay_ms 必须大于 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.audio_volume) {
            return Err(ConfigError::Validation(
                "音量必须在 0.0 - 1.0 之间".to_string(),
            ));
        }

        if self.transition.offscreen_percent <= 0.0 {
            return Err(ConfigError::Validation(
                "offscreen_percent 必须大于 0".to_string(),
            ));
        }

        Ok(())
    }
}
