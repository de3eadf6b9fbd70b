//! # Delay 模块
//!
//! 单次延迟触发器。独立于时间轴调度器，用于打字机这类逐步推进的小状态机。

/// 单次延迟动作
///
/// 同一时刻最多挂起一个动作；重新调度会替换旧动作。
#[derive(Debug, Clone)]
pub struct SingleShot<A> {
    pending: Option<(u64, A)>,
}

impl<A> Default for SingleShot<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> SingleShot<A> {
    /// 创建空触发器
    pub fn new() -> Self {
        Self::default()
    }

    /// 在 `due_at` 时刻触发 `action`，替换已挂起的动作
    pub fn schedule(&mut self, due_at: u64, action: A) {
        self.pending = Some((due_at, action));
    }

    /// 取消挂起的动作
    pub fn cancel(&mut self) -> Option<A> {
        self.pending.take().map(|(_, action)| action)
    }

    /// 是否有挂起的动作
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 挂起动作的触发时刻
    pub fn due_at(&self) -> Option<u64> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    /// 如果到期则取出动作，返回其触发时刻
    pub fn take_due(&mut self, now: u64) -> Option<(u64, A)> {
        match self.pending {
            Some((at, _)) if at <= now => self.pending.take(),
            _ => None,
        }
    }
}
