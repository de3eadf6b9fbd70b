//! # Easing 模块
//!
//! 缓动函数库，用于动画的时间插值。
//!
//! 名称沿用常见的 `power`/`sine` 命名：`power1` 为二次，`power2` 为三次，
//! `power3` 为四次，`power4` 为五次。

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EasingParseError;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    /// 线性（匀速），名称 `none` / `linear`
    Linear,
    /// 二次缓入
    Power1In,
    /// 二次缓出（步骤的默认缓动）
    #[default]
    Power1Out,
    /// 二次缓入缓出
    Power1InOut,
    /// 三次缓入
    Power2In,
    /// 三次缓出
    Power2Out,
    /// 三次缓入缓出
    Power2InOut,
    /// 四次缓入
    Power3In,
    /// 四次缓出
    Power3Out,
    /// 四次缓入缓出
    Power3InOut,
    /// 五次缓入
    Power4In,
    /// 五次缓出
    Power4Out,
    /// 五次缓入缓出
    Power4InOut,
    /// 正弦缓入
    SineIn,
    /// 正弦缓出
    SineOut,
    /// 正弦缓入缓出
    SineInOut,
}

impl Easing {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值 (0.0 - 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::Power1In => power_in(t, 2),
            Easing::Power1Out => power_out(t, 2),
            Easing::Power1InOut => power_in_out(t, 2),
            Easing::Power2In => power_in(t, 3),
            Easing::Power2Out => power_out(t, 3),
            Easing::Power2InOut => power_in_out(t, 3),
            Easing::Power3In => power_in(t, 4),
            Easing::Power3Out => power_out(t, 4),
            Easing::Power3InOut => power_in_out(t, 4),
            Easing::Power4In => power_in(t, 5),
            Easing::Power4Out => power_out(t, 5),
            Easing::Power4InOut => power_in_out(t, 5),
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }

    /// 标准名称
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "none",
            Easing::Power1In => "power1.in",
            Easing::Power1Out => "power1.out",
            Easing::Power1InOut => "power1.inOut",
            Easing::Power2In => "power2.in",
            Easing::Power2Out => "power2.out",
            Easing::Power2InOut => "power2.inOut",
            Easing::Power3In => "power3.in",
            Easing::Power3Out => "power3.out",
            Easing::Power3InOut => "power3.inOut",
            Easing::Power4In => "power4.in",
            Easing::Power4Out => "power4.out",
            Easing::Power4InOut => "power4.inOut",
            Easing::SineIn => "sine.in",
            Easing::SineOut => "sine.out",
            Easing::SineInOut => "sine.inOut",
        }
    }
}

fn power_in(t: f32, exp: i32) -> f32 {
    t.powi(exp)
}

fn power_out(t: f32, exp: i32) -> f32 {
    1.0 - (1.0 - t).powi(exp)
}

fn power_in_out(t: f32, exp: i32) -> f32 {
    if t < 0.5 {
        2.0_f32.powi(exp - 1) * t.powi(exp)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(exp) / 2.0
    }
}

impl FromStr for Easing {
    type Err = EasingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let easing = match s.trim() {
            "none" | "linear" => Easing::Linear,
            "power1.in" => Easing::Power1In,
            "power1" | "power1.out" => Easing::Power1Out,
            "power1.inOut" => Easing::Power1InOut,
            "power2.in" => Easing::Power2In,
            "power2" | "power2.out" => Easing::Power2Out,
            "power2.inOut" => Easing::Power2InOut,
            "power3.in" => Easing::Power3In,
            "power3" | "power3.out" => Easing::Power3Out,
            "power3.inOut" => Easing::Power3InOut,
            "power4.in" => Easing::Power4In,
            "power4" | "power4.out" => Easing::Power4Out,
            "power4.inOut" => Easing::Power4InOut,
            "sine.in" => Easing::SineIn,
            "sine" | "sine.out" => Easing::SineOut,
            "sine.inOut" => Easing::SineInOut,
            other => {
                return Err(EasingParseError {
                    name: other.to_string(),
                });
            }
        };
        Ok(easing)
    }
}

impl TryFrom<String> for Easing {
    type Error = EasingParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(value: Easing) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear() {
        let easing = Easing::Linear;
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(0.5), 0.5);
        assert_eq!(easing.apply(1.0), 1.0);
    }

    #[test]
    fn test_endpoints() {
        let all = [
            Easing::Power1In,
            Easing::Power1Out,
            Easing::Power2InOut,
            Easing::Power3In,
            Easing::Power3Out,
            Easing::Power4Out,
            Easing::SineIn,
            Easing::SineInOut,
        ];
        for easing in all {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing} 起点");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing} 终点");
        }
    }

    #[test]
    fn test_in_out_midpoint() {
        let mid = Easing::Power3InOut.apply(0.5);
        assert!((mid - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_in_is_slower_than_out() {
        assert!(Easing::Power3In.apply(0.3) < Easing::Power3Out.apply(0.3));
    }

    #[test]
    fn test_clamp() {
        let easing = Easing::Linear;
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("none".parse::<Easing>().unwrap(), Easing::Linear);
        assert_eq!("power3.in".parse::<Easing>().unwrap(), Easing::Power3In);
        assert_eq!("power2".parse::<Easing>().unwrap(), Easing::Power2Out);
        assert_eq!("sine.inOut".parse::<Easing>().unwrap(), Easing::SineInOut);
        assert!("bounce.out".parse::<Easing>().is_err());
    }

    #[test]
    fn test_name_parses_back() {
        for easing in [Easing::Linear, Easing::Power4InOut, Easing::SineOut] {
            assert_eq!(easing.name().parse::<Easing>().unwrap(), easing);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Easing::Power3Out).unwrap();
        assert_eq!(json, "\"power3.out\"");
        let parsed: Easing = serde_json::from_str("\"power1.inOut\"").unwrap();
        assert_eq!(parsed, Easing::Power1InOut);
        assert!(serde_json::from_str::<Easing>("\"wobble\"").is_err());
    }
}
