//! # Position 模块
//!
//! 步骤在时间轴上的插入位置，以及插入时的偏移解析。
//!
//! 字符串写法（单位：秒）：
//!
//! | 写法            | 含义                         |
//! |-----------------|------------------------------|
//! | `""` / `">"`    | 紧接上一步结束（默认）       |
//! | `"+=0.5"`       | 上一步结束后 0.5s            |
//! | `"-=0.5"`       | 上一步结束前 0.5s（重叠）    |
//! | `"<"` `"<0.2"`  | 相对上一步开始               |
//! | `"1.5"`         | 绝对时间 1.5s                |
//! | `"intro+=0.3"`  | 相对标签                     |

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::TimelineError;

/// 插入位置
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Position {
    /// 紧接上一步结束
    #[default]
    Sequential,
    /// 绝对时间（毫秒）
    At(u64),
    /// 相对上一步结束时间的偏移（毫秒，可为负）
    AfterEnd(i64),
    /// 相对上一步开始时间的偏移（毫秒，可为负）
    WithStart(i64),
    /// 相对标签的偏移（毫秒，可为负）
    Label { name: String, offset: i64 },
}

impl Position {
    /// 解析位置字符串
    pub fn parse(input: &str) -> Result<Self, TimelineError> {
        let s = input.trim();
        let invalid = || TimelineError::InvalidPosition {
            input: input.to_string(),
        };

        if s.is_empty() || s == ">" {
            return Ok(Position::Sequential);
        }
        if let Some(rest) = s.strip_prefix('<') {
            let delta = if rest.is_empty() {
                0
            } else {
                parse_signed_seconds(rest).ok_or_else(invalid)?
            };
            return Ok(Position::WithStart(delta));
        }
        if let Some(rest) = s.strip_prefix('>') {
            return parse_signed_seconds(rest)
                .map(Position::AfterEnd)
                .ok_or_else(invalid);
        }
        if let Some(delta) = parse_relative(s) {
            return delta.map(Position::AfterEnd).ok_or_else(invalid);
        }
        if let Some(ms) = parse_signed_seconds(s) {
            return u64::try_from(ms).map(Position::At).map_err(|_| invalid());
        }

        // 标签，可带 += / -= 偏移
        let (name, offset) = match s.find("+=").or_else(|| s.find("-=")) {
            Some(idx) => {
                let offset = parse_relative(&s[idx..])
                    .flatten()
                    .ok_or_else(invalid)?;
                (&s[..idx], offset)
            }
            None => (s, 0),
        };
        if !is_label_name(name) {
            return Err(invalid());
        }
        Ok(Position::Label {
            name: name.to_string(),
            offset,
        })
    }

    /// 相对标签的位置
    pub fn label(name: impl Into<String>) -> Self {
        Position::Label {
            name: name.into(),
            offset: 0,
        }
    }

    /// 相对标签并带偏移的位置
    pub fn label_offset(name: impl Into<String>, offset: i64) -> Self {
        Position::Label {
            name: name.into(),
            offset,
        }
    }
}

impl FromStr for Position {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::parse(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Sequential => f.write_str(">"),
            Position::At(ms) => write!(f, "{}", format_seconds(*ms as i64)),
            Position::AfterEnd(d) => write!(f, "{}", format_relative(*d)),
            Position::WithStart(0) => f.write_str("<"),
            Position::WithStart(d) => write!(f, "<{}", format_seconds(*d)),
            Position::Label { name, offset: 0 } => f.write_str(name),
            Position::Label { name, offset } => write!(f, "{name}{}", format_relative(*offset)),
        }
    }
}

/// `"+=N"` / `"-=N"`；外层 None 表示不是这种写法，内层 None 表示数字非法
fn parse_relative(s: &str) -> Option<Option<i64>> {
    if let Some(rest) = s.strip_prefix("+=") {
        Some(parse_unsigned_seconds(rest))
    } else if let Some(rest) = s.strip_prefix("-=") {
        Some(parse_unsigned_seconds(rest).map(|v| -v))
    } else {
        None
    }
}

fn parse_unsigned_seconds(s: &str) -> Option<i64> {
    if s.starts_with(['+', '-']) {
        return None;
    }
    parse_signed_seconds(s)
}

fn parse_signed_seconds(s: &str) -> Option<i64> {
    let secs: f64 = s.trim().parse().ok()?;
    if !secs.is_finite() {
        return None;
    }
    Some((secs * 1000.0).round() as i64)
}

fn is_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn format_seconds(ms: i64) -> String {
    format!("{}", ms as f64 / 1000.0)
}

fn format_relative(ms: i64) -> String {
    if ms < 0 {
        format!("-={}", format_seconds(-ms))
    } else {
        format!("+={}", format_seconds(ms))
    }
}

/// 偏移解析游标
///
/// 记录上一个子项（步骤或回调点）的起止时间和已定义的标签。
#[derive(Debug, Clone)]
pub(crate) struct Cursor {
    /// 上一子项开始时间
    pub prev_start: u64,
    /// 上一子项结束时间；None 表示无限循环
    pub prev_end: Option<u64>,
    /// 标签 -> 绝对时间
    pub labels: HashMap<String, u64>,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            prev_start: 0,
            prev_end: Some(0),
            labels: HashMap::new(),
        }
    }
}

impl Cursor {
    /// 将位置解析为绝对开始时间（毫秒）
    pub fn resolve(&self, position: &Position) -> Result<u64, TimelineError> {
        let unbounded = || TimelineError::UnboundedPrevious {
            position: position.to_string(),
        };

        let resolved: i64 = match position {
            Position::Sequential => self.prev_end.ok_or_else(unbounded)? as i64,
            Position::At(ms) => *ms as i64,
            Position::AfterEnd(delta) => self.prev_end.ok_or_else(unbounded)? as i64 + delta,
            Position::WithStart(delta) => self.prev_start as i64 + delta,
            Position::Label { name, offset } => {
                let at = self
                    .labels
                    .get(name)
                    .ok_or_else(|| TimelineError::UnknownLabel {
                        label: name.clone(),
                    })?;
                *at as i64 + offset
            }
        };

        u64::try_from(resolved).map_err(|_| TimelineError::NegativeStart {
            position: position.to_string(),
            resolved_ms: resolved,
        })
    }

    /// 记录一个新插入的子项
    pub fn advance(&mut self, start: u64, end: Option<u64>) {
        self.prev_start = start;
        self.prev_end = end;
    }
}
