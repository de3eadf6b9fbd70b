//! # Error 模块
//!
//! 定义 reel-runtime 中使用的错误类型。
//!
//! 导航请求被拒绝、动画目标缺失都不是错误：前者返回 `TransitionRequest::Rejected`，
//! 后者降级为占位延迟。这里只收录真正需要调用方处理的失败。

use thiserror::Error;

use crate::timeline::TimelineHandle;

/// 时间轴构建错误
///
/// 全部在构建期（插入步骤时）产生，代表编程错误而非运行时状态。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// 引用了尚未定义的标签
    #[error("标签 '{label}' 未定义")]
    UnknownLabel { label: String },

    /// 重复定义标签
    #[error("标签 '{label}' 重复定义")]
    DuplicateLabel { label: String },

    /// 偏移解析后落在时间轴起点之前
    #[error("位置 '{position}' 解析为负时间 {resolved_ms}ms")]
    NegativeStart { position: String, resolved_ms: i64 },

    /// 相对于无限循环步骤的结束时间定位
    #[error("位置 '{position}' 引用了无限循环步骤的结束时间")]
    UnboundedPrevious { position: String },

    /// 无法识别的位置字符串
    #[error("无效的位置参数 '{input}'")]
    InvalidPosition { input: String },

    /// 时间轴已经开始播放，不能再追加步骤
    #[error("时间轴 '{name}' 已开始播放，不能再修改")]
    AlreadyStarted { name: String },

    /// 句柄不存在（已完成、已取消或从未创建）
    #[error("时间轴句柄 {handle} 不存在")]
    UnknownHandle { handle: TimelineHandle },
}

/// 缓动函数名称解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的缓动函数 '{name}'")]
pub struct EasingParseError {
    pub name: String,
}

/// 媒体播放错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// 宿主环境的自动播放策略拒绝了播放请求
    #[error("播放请求被自动播放策略拒绝")]
    PolicyRejected,

    /// 播放设备不可用
    #[error("播放设备不可用: {message}")]
    Unavailable { message: String },
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(String),

    /// 解析失败
    #[error("配置解析失败: {0}")]
    Parse(String),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}

/// reel-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReelError {
    /// 时间轴构建错误
    #[error("时间轴错误: {0}")]
    Timeline(#[from] TimelineError),

    /// 缓动函数错误
    #[error("缓动函数错误: {0}")]
    Easing(#[from] EasingParseError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type ReelResult<T> = Result<T, ReelError>;
