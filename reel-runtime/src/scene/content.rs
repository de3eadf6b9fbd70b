//! 场景内容（只读数据）

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEMO_CONTENT: &str = include_str!("../../assets/demo_content.json");

/// 全部场景内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneContent {
    pub event: EventContent,
    pub guest: GuestContent,
    pub sponsor: SponsorContent,
}

/// 活动场景
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContent {
    #[serde(default)]
    pub event_title: String,
    #[serde(default)]
    pub event_subtitle: String,
    #[serde(default)]
    pub event_theme: String,
    /// 打字机短语
    #[serde(default)]
    pub event_phrases: Vec<String>,
    #[serde(default)]
    pub event_meta: String,
    #[serde(default)]
    pub cta_label: String,
}

/// 嘉宾场景
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestContent {
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub guest_role: String,
    #[serde(default)]
    pub guest_company: String,
    #[serde(default)]
    pub guest_bio: String,
    /// 为空时肖像元素缺失
    #[serde(default)]
    pub guest_image_url: String,
    #[serde(default)]
    pub guest_tags: Vec<String>,
}

/// 赞助商场景
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorContent {
    #[serde(default)]
    pub sponsor_impact_phrase: String,
    /// 为空时 logo 元素缺失
    #[serde(default)]
    pub sponsor_logo_url: String,
    #[serde(default)]
    pub cards: Vec<SponsorCard>,
}

/// 赞助商卡片
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorCard {
    pub title: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub cta_label: String,
    #[serde(default)]
    pub cta_href: String,
}

impl SceneContent {
    /// 从 JSON 文本解析
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json(&content)
    }

    /// 内置演示内容
    pub fn demo() -> Result<Self, ConfigError> {
        Self::from_json(DEMO_CONTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_content() {
        let content = SceneContent::demo().unwrap();
        assert_eq!(content.event.event_phrases.len(), 4);
        assert_eq!(content.guest.guest_tags, vec!["Inovação", "Ética", "Democracia"]);
        assert_eq!(content.sponsor.cards.len(), 3);
        assert_eq!(content.sponsor.cards[2].bullets[0], "Presença em 5 continentes");
    }

    #[test]
    fn test_missing_fields_default() {
        let content = SceneContent::from_json(
            r#"{ "event": { "eventTitle": "X" }, "guest": {}, "sponsor": { "cards": [] } }"#,
        )
        .unwrap();
        assert_eq!(content.event.event_title, "X");
        assert!(content.event.event_phrases.is_empty());
        assert!(content.guest.guest_image_url.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SceneContent::from_json("[]"),
            Err(ConfigError::Parse(_))
        ));
    }
}
