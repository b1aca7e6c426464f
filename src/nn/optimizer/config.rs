/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : BCOS 的全局配置：各参数组未指定超参数时使用的默认值，以及模式和权重衰减方式
 */

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::BcosMode;
use crate::errors::OptimizerError;

const DEFAULT_BETA: f32 = 0.9;
const DEFAULT_EPS: f32 = 1e-6;
const DEFAULT_WEIGHT_DECAY: f32 = 0.1;

/// BCOS 全局配置
///
/// 默认值：`beta=0.9`、`beta2=None`、`eps=1e-6`、`weight_decay=0.1`、`mode=c`、`decouple_wd=true`。
/// `decouple_wd=true` 时即通常所说的 BCOSW。
///
/// 超参数的取值范围在构造`Bcos`时才校验。
///
/// # 示例
/// ```
/// use only_torch_bcos::nn::optimizer::{BcosConfig, BcosMode};
///
/// let config = BcosConfig::new(1e-3).beta(0.95).mode(BcosMode::Momentum);
/// assert_eq!(config.beta2, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BcosConfig {
    /// 学习率（必填）
    pub lr: f32,
    /// 动量衰减系数
    #[serde(default = "default_beta")]
    pub beta: f32,
    /// 独立的方差衰减系数
    #[serde(default)]
    pub beta2: Option<f32>,
    /// 数值稳定项
    #[serde(default = "default_eps")]
    pub eps: f32,
    /// 权重衰减系数
    #[serde(default = "default_weight_decay", alias = "wd")]
    pub weight_decay: f32,
    #[serde(default)]
    pub mode: BcosMode,
    /// 是否使用解耦权重衰减
    #[serde(default = "default_decouple_wd")]
    pub decouple_wd: bool,
}

const fn default_beta() -> f32 {
    DEFAULT_BETA
}
const fn default_eps() -> f32 {
    DEFAULT_EPS
}
const fn default_weight_decay() -> f32 {
    DEFAULT_WEIGHT_DECAY
}
const fn default_decouple_wd() -> bool {
    true
}

impl BcosConfig {
    pub const fn new(lr: f32) -> Self {
        Self {
            lr,
            beta: DEFAULT_BETA,
            beta2: None,
            eps: DEFAULT_EPS,
            weight_decay: DEFAULT_WEIGHT_DECAY,
            mode: BcosMode::Conditional,
            decouple_wd: true,
        }
    }

    pub const fn beta(mut self, beta: f32) -> Self {
        self.beta = beta;
        self
    }

    pub const fn beta2(mut self, beta2: f32) -> Self {
        self.beta2 = Some(beta2);
        self
    }

    pub const fn eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    pub const fn weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub const fn mode(mut self, mode: BcosMode) -> Self {
        self.mode = mode;
        self
    }

    /// 以字符串（`"g"`、`"m"`、`"c"`）指定模式
    pub fn mode_str(self, mode: &str) -> Result<Self, OptimizerError> {
        Ok(self.mode(mode.parse()?))
    }

    pub const fn decouple_wd(mut self, decouple_wd: bool) -> Self {
        self.decouple_wd = decouple_wd;
        self
    }

    /// 从 JSON 文本读取配置。未写明的字段取默认值，`mode` 不合法时返回 `InvalidMode`
    pub fn from_json_str(json: &str) -> Result<Self, OptimizerError> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        // 先单独解析模式，使非法模式报告为 InvalidMode 而非笼统的反序列化错误
        let mode = match value.as_object_mut().and_then(|obj| obj.remove("mode")) {
            Some(serde_json::Value::String(mode)) => mode.parse()?,
            Some(other) => return Err(OptimizerError::InvalidMode(other.to_string())),
            None => BcosMode::default(),
        };
        let config: Self = serde_json::from_value(value)?;
        Ok(config.mode(mode))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OptimizerError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
