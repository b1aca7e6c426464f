/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 参数组：共享同一套超参数的一组参数
 *
 * 用于需要对不同参数使用不同超参数的场景，如：
 * - 分层学习率
 * - 对偏置/归一化层关闭权重衰减
 */

use serde::{Deserialize, Serialize};

use super::{BcosConfig, BcosMode};
use crate::errors::OptimizerError;
use crate::nn::ParamId;

/// 用户传入的参数组，未指定的超参数沿用`BcosConfig`中的默认值
///
/// # 示例
/// ```ignore
/// let decay = ParamGroup::new(&[w1, w2]);
/// let no_decay = ParamGroup::new(&[b1, b2]).weight_decay(0.0);
/// let optimizer = Bcos::new(vec![decay, no_decay], BcosConfig::new(1e-3))?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamGroup {
    pub params: Vec<ParamId>,
    pub lr: Option<f32>,
    pub beta: Option<f32>,
    pub beta2: Option<f32>,
    pub eps: Option<f32>,
    pub weight_decay: Option<f32>,
}

impl ParamGroup {
    pub fn new(params: &[ParamId]) -> Self {
        Self {
            params: params.to_vec(),
            ..Self::default()
        }
    }

    pub fn lr(mut self, lr: f32) -> Self {
        self.lr = Some(lr);
        self
    }

    pub fn beta(mut self, beta: f32) -> Self {
        self.beta = Some(beta);
        self
    }

    pub fn beta2(mut self, beta2: f32) -> Self {
        self.beta2 = Some(beta2);
        self
    }

    pub fn eps(mut self, eps: f32) -> Self {
        self.eps = Some(eps);
        self
    }

    pub fn weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = Some(weight_decay);
        self
    }
}

/// 已校验、已补全默认值的参数组
///
/// 除学习率外，其余超参数在优化器生命周期内不可更改。
/// 方差衰减系数`betav`在构造时按模式一次性算出，每步直接读取，并随状态字典一同保存。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterGroup {
    params: Vec<ParamId>,
    lr: f32,
    beta: f32,
    beta2: Option<f32>,
    eps: f32,
    weight_decay: f32,
    variance_decay: f32,
}

impl HyperparameterGroup {
    /// 补全默认值并校验超参数，`index`为该组在优化器中的序号（仅用于报错）
    pub(crate) fn resolve(
        group: ParamGroup,
        index: usize,
        defaults: &BcosConfig,
    ) -> Result<Self, OptimizerError> {
        let mut resolved = Self {
            params: group.params,
            lr: group.lr.unwrap_or(defaults.lr),
            beta: group.beta.unwrap_or(defaults.beta),
            beta2: group.beta2.or(defaults.beta2),
            eps: group.eps.unwrap_or(defaults.eps),
            weight_decay: group.weight_decay.unwrap_or(defaults.weight_decay),
            variance_decay: 0.0,
        };
        resolved.validate(index, defaults.mode)?;
        Ok(resolved)
    }

    /// 校验超参数并（重新）计算方差衰减系数
    pub(crate) fn validate(&mut self, index: usize, mode: BcosMode) -> Result<(), OptimizerError> {
        check_lr(index, self.lr)?;
        check(index, "beta", self.beta, "0<beta<1", self.beta > 0.0 && self.beta < 1.0)?;
        if let Some(beta2) = self.beta2 {
            check(index, "beta2", beta2, "0≤beta2<1", (0.0..1.0).contains(&beta2))?;
        }
        check(index, "eps", self.eps, "eps>0且有限", self.eps > 0.0 && self.eps.is_finite())?;
        check(
            index,
            "weight_decay",
            self.weight_decay,
            "weight_decay≥0且有限",
            self.weight_decay >= 0.0 && self.weight_decay.is_finite(),
        )?;
        self.variance_decay = mode.variance_decay(self.beta, self.beta2);
        Ok(())
    }

    pub fn params(&self) -> &[ParamId] {
        &self.params
    }

    pub const fn lr(&self) -> f32 {
        self.lr
    }

    pub(crate) fn set_lr(&mut self, index: usize, lr: f32) -> Result<(), OptimizerError> {
        check_lr(index, lr)?;
        self.lr = lr;
        Ok(())
    }

    pub const fn beta(&self) -> f32 {
        self.beta
    }

    pub const fn beta2(&self) -> Option<f32> {
        self.beta2
    }

    pub const fn eps(&self) -> f32 {
        self.eps
    }

    pub const fn weight_decay(&self) -> f32 {
        self.weight_decay
    }

    /// 方差估计实际使用的衰减系数`betav`
    pub const fn variance_decay(&self) -> f32 {
        self.variance_decay
    }
}

fn check_lr(index: usize, lr: f32) -> Result<(), OptimizerError> {
    check(index, "lr", lr, "lr≥0且有限", lr >= 0.0 && lr.is_finite())
}

// NaN 会使所有比较为false，因而同样被拒绝
fn check(
    group: usize,
    name: &'static str,
    value: f32,
    requirement: &'static str,
    ok: bool,
) -> Result<(), OptimizerError> {
    if ok {
        Ok(())
    } else {
        Err(OptimizerError::InvalidHyperparameter {
            group,
            name,
            value,
            requirement,
        })
    }
}
