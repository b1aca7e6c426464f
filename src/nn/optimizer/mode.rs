/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : BCOS 的三种二阶矩估计模式
 */

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::OptimizerError;

/// BCOS 模式，构造后不可更改
///
/// | 模式 | 更新方向 `d` | 方差 `v` | 持久化状态 |
/// |------|-------------|----------|-----------|
/// | `g` | 梯度 | `d²` 的EMA | `v` |
/// | `m` | 动量 | `d²` 的EMA | `m`、`v` |
/// | `c` | 动量 | 上一步动量平方与当前梯度平方的混合 | `m` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BcosMode {
    #[serde(rename = "g")]
    Gradient,
    #[serde(rename = "m")]
    Momentum,
    /// 条件估计（默认）
    #[default]
    #[serde(rename = "c")]
    Conditional,
}

impl BcosMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gradient => "g",
            Self::Momentum => "m",
            Self::Conditional => "c",
        }
    }

    /// 方差估计所用的衰减系数 `betav`
    ///
    /// - `g`/`m`：`beta2`，未指定时沿用 `beta`；
    /// - `c`：`beta2`，未指定时为 `1 - (1 - beta)²`。
    pub fn variance_decay(&self, beta: f32, beta2: Option<f32>) -> f32 {
        match (self, beta2) {
            (_, Some(beta2)) => beta2,
            (Self::Conditional, None) => 1.0 - (1.0 - beta) * (1.0 - beta),
            (_, None) => beta,
        }
    }
}

impl FromStr for BcosMode {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "g" => Ok(Self::Gradient),
            "m" => Ok(Self::Momentum),
            "c" => Ok(Self::Conditional),
            other => Err(OptimizerError::InvalidMode(other.to_string())),
        }
    }
}

impl TryFrom<char> for BcosMode {
    type Error = OptimizerError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        c.to_string().parse()
    }
}

impl Display for BcosMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
