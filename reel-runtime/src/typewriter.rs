//! # Typewriter 模块
//!
//! 循环打字机：逐字显示短语，停留，逐字删除，切到下一条短语。
//!
//! ```text
//! Typing ──(满)──► Holding ──► Erasing ──(空)──► 下一条 ──► Typing
//! ```
//!
//! 每一步都是一个单次延迟动作，由 `advance` 在其到期时刻依次执行，
//! 所以帧长不影响显示节奏。

use serde::{Deserialize, Serialize};

use crate::config::TypewriterConfig;
use crate::delay::SingleShot;

/// 打字机阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypePhase {
    /// 逐字显示
    #[default]
    Typing,
    /// 完整显示后停留
    Holding,
    /// 逐字删除
    Erasing,
}

/// 打字机状态快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypewriterState {
    /// 当前短语下标
    pub phrase_index: usize,
    /// 当前阶段
    pub phase: TypePhase,
    /// 可见字符数
    pub visible: usize,
    /// 当前可见文本
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeAction {
    Reveal,
    EnterHolding,
    EnterErasing,
    Remove,
    NextPhrase,
}

/// 循环打字机
#[derive(Debug, Clone)]
pub struct Typewriter {
    phrases: Vec<Vec<char>>,
    config: TypewriterConfig,
    index: usize,
    phase: TypePhase,
    visible: usize,
    clock: u64,
    timer: SingleShot<TypeAction>,
}

impl Typewriter {
    /// 创建打字机并挂起第一步
    pub fn new(phrases: &[String], config: TypewriterConfig) -> Self {
        let mut typewriter = Self {
            phrases: Vec::new(),
            config,
            index: 0,
            phase: TypePhase::Typing,
            visible: 0,
            clock: 0,
            timer: SingleShot::new(),
        };
        typewriter.set_phrases(phrases);
        typewriter
    }

    /// 替换短语列表，从第一条重新开始
    pub fn set_phrases(&mut self, phrases: &[String]) {
        self.timer.cancel();
        self.phrases = phrases.iter().map(|p| p.chars().collect()).collect();
        self.index = 0;
        self.phase = TypePhase::Typing;
        self.visible = 0;
        self.schedule_next();
    }

    /// 停止（卸载时调用）
    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    /// 是否还在运行
    pub fn is_running(&self) -> bool {
        self.timer.is_pending()
    }

    /// 推进 `dt` 毫秒，返回可见文本是否变化
    pub fn advance(&mut self, dt: u64) -> bool {
        let target = self.clock.saturating_add(dt);
        let before = (self.index, self.visible);

        while let Some((due, action)) = self.timer.take_due(target) {
            self.clock = due;
            self.apply(action);
            self.schedule_next();
        }
        self.clock = target;

        before != (self.index, self.visible)
    }

    /// 当前可见文本
    pub fn text(&self) -> String {
        self.current().iter().take(self.visible).collect()
    }

    /// 状态快照
    pub fn state(&self) -> TypewriterState {
        TypewriterState {
            phrase_index: self.index,
            phase: self.phase,
            visible: self.visible,
            text: self.text(),
        }
    }

    fn current(&self) -> &[char] {
        self.phrases.get(self.index).map_or(&[], Vec::as_slice)
    }

    fn apply(&mut self, action: TypeAction) {
        match action {
            TypeAction::Reveal => self.visible = (self.visible + 1).min(self.current().len()),
            TypeAction::EnterHolding => self.phase = TypePhase::Holding,
            TypeAction::EnterErasing => self.phase = TypePhase::Erasing,
            TypeAction::Remove => self.visible = self.visible.saturating_sub(1),
            TypeAction::NextPhrase => {
                self.index = (self.index + 1) % self.phrases.len().max(1);
                self.phase = TypePhase::Typing;
            }
        }
    }

    /// 根据当前状态挂起下一步
    fn schedule_next(&mut self) {
        if self.phrases.is_empty() {
            return;
        }
        let len = self.current().len();
        let cfg = &self.config;

        let (delay, action) = match self.phase {
            TypePhase::Typing if self.visible < len => {
                let delay = if self.visible == 0 {
                    cfg.start_delay_ms
                } else {
                    cfg.type_speed_ms
                };
                (delay, TypeAction::Reveal)
            }
            TypePhase::Typing => (cfg.hold_ms, TypeAction::EnterHolding),
            TypePhase::Holding => (cfg.hold_ms, TypeAction::EnterErasing),
            TypePhase::Erasing if self.visible > 0 => (cfg.erase_speed_ms, TypeAction::Remove),
            TypePhase::Erasing => (cfg.between_ms, TypeAction::NextPhrase),
        };

        // 零延迟会在同一时刻无限推进
        self.timer.schedule(self.clock + delay.max(1), action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cycle_two_phrases() {
        let mut tw = Typewriter::new(&phrases(&["A", "BC"]), TypewriterConfig::default());
        assert_eq!(tw.text(), "");

        tw.advance(249);
        assert_eq!(tw.text(), "");
        tw.advance(1);
        assert_eq!(tw.text(), "A");

        // 满 -> holding (900) -> erasing (900) -> 删除 (22)
        tw.advance(900);
        assert_eq!(tw.state().phase, TypePhase::Holding);
        tw.advance(900);
        assert_eq!(tw.state().phase, TypePhase::Erasing);
        tw.advance(22);
        assert_eq!(tw.text(), "");

        // 停顿 250 后切换短语，再等待 250 显示首字
        tw.advance(250);
        assert_eq!(tw.state().phrase_index, 1);
        assert_eq!(tw.state().phase, TypePhase::Typing);
        tw.advance(250);
        assert_eq!(tw.text(), "B");
        tw.advance(35);
        assert_eq!(tw.text(), "BC");

        tw.advance(900 + 900 + 22 + 22);
        assert_eq!(tw.text(), "");
        tw.advance(250 + 250);
        assert_eq!(tw.state().phrase_index, 0);
        assert_eq!(tw.text(), "A");
    }

    #[test]
    fn test_large_step_matches_small_steps() {
        let config = TypewriterConfig::default();
        let list = phrases(&["hello", "wörld"]);
        let mut coarse = Typewriter::new(&list, config.clone());
        let mut fine = Typewriter::new(&list, config);

        coarse.advance(7_000);
        for _ in 0..7_000 {
            fine.advance(1);
        }
        assert_eq!(coarse.state(), fine.state());
    }

    #[test]
    fn test_visible_within_bounds() {
        let list = phrases(&["ab", "", "çãé"]);
        let mut tw = Typewriter::new(&list, TypewriterConfig::default());
        for _ in 0..2_000 {
            tw.advance(7);
            let state = tw.state();
            let len = list[state.phrase_index].chars().count();
            assert!(state.visible <= len);
            assert_eq!(state.text.chars().count(), state.visible);
        }
    }

    #[test]
    fn test_set_phrases_restarts() {
        let mut tw = Typewriter::new(&phrases(&["abc"]), TypewriterConfig::default());
        tw.advance(250 + 35);
        assert_eq!(tw.text(), "ab");

        tw.set_phrases(&phrases(&["xyz"]));
        assert_eq!(tw.text(), "");
        // 新短语重新等待首字延迟
        tw.advance(249);
        assert_eq!(tw.text(), "");
        tw.advance(1);
        assert_eq!(tw.text(), "x");
    }

    #[test]
    fn test_empty_phrase_list_is_idle() {
        let mut tw = Typewriter::new(&[], TypewriterConfig::default());
        assert!(!tw.is_running());
        assert!(!tw.advance(10_000));
        assert_eq!(tw.text(), "");
    }

    #[test]
    fn test_cancel_stops_progress() {
        let mut tw = Typewriter::new(&phrases(&["abc"]), TypewriterConfig::default());
        tw.advance(250);
        tw.cancel();
        assert!(!tw.advance(10_000));
        assert_eq!(tw.text(), "a");
    }
}
