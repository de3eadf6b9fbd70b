//! 命令行参数

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use reel_runtime::Key;

#[derive(Parser, Debug)]
#[command(name = "reel")]
#[command(about = "时间轴演示引擎 - 无界面运行演示并输出最终状态")]
#[command(version)]
pub struct Cli {
    /// 引擎配置文件（JSON，不存在时使用默认配置）
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// 场景内容文件（JSON，缺省使用内置示例）
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// 运行的虚拟时长（毫秒）
    #[arg(short, long, default_value_t = 30_000)]
    pub duration_ms: u64,

    /// 每帧推进的时长（毫秒）
    #[arg(short, long, default_value_t = 16)]
    pub frame_ms: u64,

    /// 按键脚本，例如 `1000:right,4000:space`
    #[arg(short, long, value_parser = parse_key_script)]
    pub keys: Option<KeyScript>,

    /// 模拟宿主拒绝自动播放
    #[arg(long)]
    pub reject_autoplay: bool,

    /// 日志级别
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// 以 JSON 输出最终快照
    #[arg(long)]
    pub json: bool,
}

/// 按时间排序的按键序列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyScript(Vec<(u64, Key)>);

impl KeyScript {
    /// 取出所有时刻不晚于 `now` 的按键
    pub fn drain_due(&mut self, now: u64) -> Vec<Key> {
        let split = self.0.partition_point(|(at, _)| *at <= now);
        self.0.drain(..split).map(|(_, key)| key).collect()
    }

    /// 下一个按键的时刻
    pub fn next_at(&self) -> Option<u64> {
        self.0.first().map(|(at, _)| *at)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn parse_key_script(input: &str) -> anyhow::Result<KeyScript> {
    let mut entries = Vec::new();
    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((at, key)) = entry.split_once(':') else {
            bail!("按键格式应为 time_ms:key，实际为 `{entry}`");
        };
        let at: u64 = at
            .trim()
            .parse()
            .with_context(|| format!("无效的按键时刻 `{at}`"))?;
        let key: Key = key.trim().parse()?;
        if let Key::Other(name) = &key {
            bail!("不支持的按键 `{name}`（可用：space, right, left）");
        }
        entries.push((at, key));
    }
    // 稳定排序，同一时刻保持书写顺序
    entries.sort_by_key(|(at, _)| *at);
    Ok(KeyScript(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_script() {
        let mut script = parse_key_script("4000:space, 1000:right,1000:left").unwrap();
        assert_eq!(script.next_at(), Some(1000));
        assert!(script.drain_due(999).is_empty());
        assert_eq!(script.drain_due(1000), vec![Key::ArrowRight, Key::ArrowLeft]);
        assert_eq!(script.drain_due(10_000), vec![Key::Space]);
        assert!(script.is_empty());
    }

    #[test]
    fn test_parse_key_script_rejects_garbage() {
        assert!(parse_key_script("").unwrap().is_empty());
        assert!(parse_key_script("right").is_err());
        assert!(parse_key_script("x:right").is_err());
        assert!(parse_key_script("100:enter").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["reel"]);
        assert_eq!(cli.duration_ms, 30_000);
        assert_eq!(cli.frame_ms, 16);
        assert_eq!(cli.log_level, tracing::Level::INFO);
        assert!(cli.keys.is_none());
        assert!(!cli.json);
    }
}
