/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 单个参数的优化器状态。每种模式只持有自己需要的张量
 */

use serde::{Deserialize, Serialize};

use super::BcosMode;
use crate::errors::OptimizerError;
use crate::nn::ParamId;
use crate::tensor::Tensor;

/// 单个参数的优化器状态，在该参数第一次带梯度参与`step()`时创建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamState {
    /// 模式`g`：方差EMA
    Gradient { v: Tensor },
    /// 模式`m`：动量与方差EMA
    Momentum { m: Tensor, v: Tensor },
    /// 模式`c`：仅动量，方差每步由动量与梯度现算
    Conditional { m: Tensor },
}

impl ParamState {
    /// 以首个梯度初始化：`m := g`（拷贝），`v := g⊙g`
    pub(crate) fn init(mode: BcosMode, grad: &Tensor) -> Self {
        match mode {
            BcosMode::Gradient => Self::Gradient { v: grad.square() },
            BcosMode::Momentum => Self::Momentum {
                m: grad.clone(),
                v: grad.square(),
            },
            BcosMode::Conditional => Self::Conditional { m: grad.clone() },
        }
    }

    pub const fn mode(&self) -> BcosMode {
        match self {
            Self::Gradient { .. } => BcosMode::Gradient,
            Self::Momentum { .. } => BcosMode::Momentum,
            Self::Conditional { .. } => BcosMode::Conditional,
        }
    }

    /// 动量`m`（模式`g`下没有）
    pub const fn momentum(&self) -> Option<&Tensor> {
        match self {
            Self::Momentum { m, .. } | Self::Conditional { m } => Some(m),
            Self::Gradient { .. } => None,
        }
    }

    /// 持久化的方差`v`（模式`c`下没有）
    pub const fn variance(&self) -> Option<&Tensor> {
        match self {
            Self::Gradient { v } | Self::Momentum { v, .. } => Some(v),
            Self::Conditional { .. } => None,
        }
    }

    /// 检查所有状态张量的形状是否与参数一致
    pub(crate) fn check_shape(&self, param: ParamId, shape: &[usize]) -> Result<(), OptimizerError> {
        let tensors = [("动量m", self.momentum()), ("方差v", self.variance())];
        for (what, tensor) in tensors {
            match tensor {
                Some(tensor) if tensor.shape() != shape => {
                    return Err(OptimizerError::ShapeMismatch {
                        param: param.0,
                        what,
                        expected: shape.to_vec(),
                        got: tensor.shape().to_vec(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}
