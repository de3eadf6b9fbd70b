//! # Media 模块
//!
//! 背景音乐与播放状态同步。
//!
//! 引擎不负责解码和输出，只通过 `MediaTransport` 下发播放控制请求。
//! 宿主的自动播放策略可能拒绝播放，此时强制回到 `Paused`，不重试。

use tracing::{debug, warn};

use crate::error::TransportError;
use crate::state::PlaybackState;

/// 媒体播放接口
pub trait MediaTransport {
    /// 设置音量 (0.0 - 1.0)
    fn set_volume(&mut self, volume: f32);

    /// 请求开始播放，可能被拒绝
    fn play(&mut self) -> Result<(), TransportError>;

    /// 请求暂停
    fn pause(&mut self);
}

/// 播放状态同步器
#[derive(Debug, Clone)]
pub struct MediaSynchronizer {
    volume: f32,
    last: Option<PlaybackState>,
}

impl MediaSynchronizer {
    /// 创建同步器
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
            last: None,
        }
    }

    /// 最近一次同步后的状态
    pub fn last_synced(&self) -> Option<PlaybackState> {
        self.last
    }

    /// 按请求状态同步传输层，返回实际生效的状态
    ///
    /// 与上次同步的状态相同时不做任何调用。
    pub fn sync<T: MediaTransport + ?Sized>(
        &mut self,
        transport: &mut T,
        requested: PlaybackState,
    ) -> PlaybackState {
        if self.last == Some(requested) {
            return requested;
        }

        let effective = match requested {
            PlaybackState::Playing => {
                transport.set_volume(self.volume);
                match transport.play() {
                    Ok(()) => {
                        debug!(volume = self.volume, "背景音乐开始播放");
                        PlaybackState::Playing
                    }
                    Err(e) => {
                        warn!(error = %e, "播放被拒绝，切换为暂停状态");
                        PlaybackState::Paused
                    }
                }
            }
            PlaybackState::Paused => {
                transport.pause();
                debug!("背景音乐暂停");
                PlaybackState::Paused
            }
        };

        self.last = Some(effective);
        effective
    }
}

/// 传输层调用记录
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    /// 设置音量
    SetVolume(f32),
    /// 请求播放
    Play,
    /// 请求暂停
    Pause,
}

/// 记录调用的传输层（测试与无头运行）
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    /// 按顺序记录的调用
    pub calls: Vec<TransportCall>,
    /// 为 true 时拒绝所有播放请求
    pub reject_play: bool,
}

impl RecordingTransport {
    /// 创建接受播放的传输层
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建拒绝播放的传输层
    pub fn rejecting() -> Self {
        Self {
            calls: Vec::new(),
            reject_play: true,
        }
    }
}

impl MediaTransport for RecordingTransport {
    fn set_volume(&mut self, volume: f32) {
        self.calls.push(TransportCall::SetVolume(volume));
    }

    fn play(&mut self) -> Result<(), TransportError> {
        self.calls.push(TransportCall::Play);
        if self.reject_play {
            Err(TransportError::PolicyRejected)
        } else {
            Ok(())
        }
    }

    fn pause(&mut self) {
        self.calls.push(TransportCall::Pause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_sets_volume_first() {
        let mut transport = RecordingTransport::new();
        let mut sync = MediaSynchronizer::new(0.5);
        assert_eq!(
            sync.sync(&mut transport, PlaybackState::Playing),
            PlaybackState::Playing
        );
        assert_eq!(
            transport.calls,
            vec![TransportCall::SetVolume(0.5), TransportCall::Play]
        );
    }

    #[test]
    fn test_rejection_forces_paused() {
        let mut transport = RecordingTransport::rejecting();
        let mut sync = MediaSynchronizer::new(0.5);
        assert_eq!(
            sync.sync(&mut transport, PlaybackState::Playing),
            PlaybackState::Paused
        );
        assert_eq!(sync.last_synced(), Some(PlaybackState::Paused));
        // 之后的暂停请求不再调用传输层
        sync.sync(&mut transport, PlaybackState::Paused);
        assert_eq!(transport.calls.len(), 2);
    }

    #[test]
    fn test_repeat_is_idempotent() {
        let mut transport = RecordingTransport::new();
        let mut sync = MediaSynchronizer::new(0.5);
        sync.sync(&mut transport, PlaybackState::Paused);
        sync.sync(&mut transport, PlaybackState::Paused);
        assert_eq!(transport.calls, vec![TransportCall::Pause]);

        sync.sync(&mut transport, PlaybackState::Playing);
        sync.sync(&mut transport, PlaybackState::Playing);
        assert_eq!(transport.calls.len(), 3);
    }
}
