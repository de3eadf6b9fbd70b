//! 无界面媒体传输层：只记录请求，不输出声音。

use reel_runtime::{MediaTransport, TransportError};
use tracing::info;

#[derive(Debug, Default)]
pub struct HeadlessTransport {
    reject_play: bool,
    volume: f32,
    playing: bool,
}

impl HeadlessTransport {
    /// `reject_play` 为 true 时模拟宿主拒绝自动播放
    pub fn new(reject_play: bool) -> Self {
        Self {
            reject_play,
            ..Self::default()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl MediaTransport for HeadlessTransport {
    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        info!(volume, "音量");
    }

    fn play(&mut self) -> Result<(), TransportError> {
        if self.reject_play {
            return Err(TransportError::PolicyRejected);
        }
        self.playing = true;
        info!(volume = self.volume, "背景音乐播放");
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
        info!("背景音乐暂停");
    }
}
