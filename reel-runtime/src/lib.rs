//! # Reel Runtime
//!
//! 时间轴驱动的演示引擎核心库。
//!
//! ## 架构概述
//!
//! `reel-runtime` 是纯逻辑核心，不做渲染也不播放声音。
//! 宿主按帧推进虚拟时钟，读取命名元素的属性完成渲染：
//!
//! ```text
//! Host                          Presenter
//!   │                              │
//!   │──── advance(dt) / key ─────►│ 调度器按事件时刻切分推进
//!   │                              │
//!   │◄─── 元素属性 / snapshot ────│
//!   │                              │
//! ```
//!
//! ## 核心类型
//!
//! - [`Timeline`] / [`TimelineScheduler`]：步骤编排与虚拟时钟
//! - [`SceneTransitionMachine`]：带互斥锁的场景切换
//! - [`AutoplayDriver`]：倒计时与进度条
//! - [`Typewriter`]：循环打字机
//! - [`MediaSynchronizer`]：背景音乐与播放状态同步
//! - [`Presenter`]：组合根
//!
//! ## 使用示例
//!
//! ```ignore
//! use reel_runtime::{EngineConfig, Key, Presenter, RecordingTransport, SceneContent};
//!
//! let mut presenter = Presenter::new(
//!     EngineConfig::default(),
//!     SceneContent::demo()?,
//!     RecordingTransport::new(),
//! );
//! presenter.start()?;
//!
//! loop {
//!     presenter.advance(16)?;
//!     if let Some(key) = poll_key() {
//!         presenter.handle_key(&key)?;
//!     }
//!     render(presenter.scene(), presenter.overlay(), presenter.progress());
//! }
//! ```

pub mod autoplay;
pub mod config;
pub mod delay;
pub mod easing;
pub mod error;
pub mod input;
pub mod media;
pub mod presenter;
pub mod scene;
pub mod state;
pub mod target;
pub mod timeline;
pub mod transition;
pub mod typewriter;

// 重导出核心类型
pub use autoplay::{AutoplayDriver, AutoplayEvent, CountdownState, PROGRESS_PROPERTY};
pub use config::{EngineConfig, TransitionConfig, TypewriterConfig};
pub use delay::SingleShot;
pub use easing::Easing;
pub use error::{
    ConfigError, EasingParseError, ReelError, ReelResult, TimelineError, TransportError,
};
pub use input::{Key, KeyResponse, NavAction};
pub use media::{MediaSynchronizer, MediaTransport, RecordingTransport, TransportCall};
pub use presenter::Presenter;
pub use scene::{ActiveScene, SceneContent, SceneKind};
pub use state::{PlaybackState, PresenterSnapshot};
pub use target::{Animatable, PropertyBag, PropertySet, PropertyValue, TargetRef};
pub use timeline::{
    EventBatch, Position, Repeat, ScheduledEvent, Step, Targets, Timeline, TimelineConfig,
    TimelineEvent, TimelineHandle, TimelineScheduler, TimelineState,
};
pub use transition::{
    Direction, RejectReason, SceneTransitionMachine, TransitionEvent, TransitionLock,
    TransitionRequest, SWAP_CUE,
};
pub use typewriter::{TypePhase, Typewriter, TypewriterState};
