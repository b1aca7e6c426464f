/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-03
 * @Description  : 错误类型：张量运算错误（TensorError）与优化器错误（OptimizerError）
 */

use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },
    #[error("数据长度{data_len}与形状{shape:?}不符")]
    DataShapeMismatch { data_len: usize, shape: Vec<usize> },
    #[error("除数为零")]
    DivByZero,
}

/// 优化器相关错误
///
/// 构造期错误（`InvalidMode`、`InvalidHyperparameter`、`DuplicateParameter`）出现时不会产出任何优化器实例；
/// `step()` 期间的 `ShapeMismatch` 在修改任何参数/状态之前就会返回，即该步整体未执行。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("不支持的BCOS模式`{0}`，仅支持g、m、c")]
    InvalidMode(String),
    #[error("第{group}个参数组的超参数{name}={value}不合法，须满足{requirement}")]
    InvalidHyperparameter {
        group: usize,
        name: &'static str,
        value: f32,
        requirement: &'static str,
    },
    #[error("参数{param:?}的{what}形状不一致：期望{expected:?}，实际{got:?}")]
    ShapeMismatch {
        param: usize,
        what: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("参数{0}不存在")]
    ParamNotFound(usize),
    #[error("参数{0}同时出现在多个参数组中")]
    DuplicateParameter(usize),
    #[error("参数组{0}不存在")]
    GroupNotFound(usize),
    #[error("状态字典与当前优化器不匹配：{0}")]
    StateDictMismatch(String),
    #[error("（反）序列化失败：{0}")]
    Serialization(String),
    #[error("读写文件失败：{0}")]
    Io(String),
}

impl From<std::io::Error> for OptimizerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for OptimizerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for OptimizerError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
