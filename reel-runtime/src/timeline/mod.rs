//! # Timeline 模块
//!
//! 通用时间轴系统。
//!
//! ## 核心设计理念
//!
//! 时间轴只负责 **时间管理**：
//! - 步骤在插入时解析偏移，得到绝对开始时间
//! - 播放时按声明顺序求值，写入目标属性
//! - 回调点与结束以事件形式交还给所有者，不使用异步通道
//!
//! ## 核心概念
//!
//! - `Step`: 单个属性插值指令（时长、缓动、偏移、stagger、repeat/yoyo）
//! - `Position`: 插入位置（绝对、相对上一步开始/结束、相对标签）
//! - `Timeline`: 有序步骤集合
//! - `TimelineScheduler`: 持有时间轴，驱动虚拟时钟
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut tl = Timeline::new(TimelineConfig::named("title"));
//! tl.add_step(
//!     Step::from_to(&title, PropertySet::new().num("opacity", 0.0), PropertySet::new().num("opacity", 1.0))
//!         .duration(1500)
//!         .ease(Easing::Power4Out),
//! )?;
//! tl.add_step(Step::to(&ticker, PropertySet::new().num("y", 0.0)).at("-=0.5".parse()?))?;
//! let handle = scheduler.insert(tl);
//! scheduler.play(handle)?;
//! ```

mod position;
mod scheduler;
mod step;
#[allow(clippy::module_inception)]
mod timeline;

pub use position::Position;
pub use scheduler::{EventBatch, ScheduledEvent, TimelineHandle, TimelineScheduler};
pub use step::{Repeat, Step, Targets};
pub use timeline::{Timeline, TimelineConfig, TimelineEvent, TimelineState};
