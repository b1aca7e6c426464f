/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 可训练参数及其存储（arena）
 *
 * 参数由调用方持有，优化器只记住参数的句柄（`ParamId`），每步借用`ParamStore`原地更新。
 * 句柄即参数的身份：两个数值完全相同的参数仍是两个不同的参数。
 * 参数一经登记不会被移除，故其句柄在整个生命周期内稳定。
 */

use serde::{Deserialize, Serialize};

use crate::errors::OptimizerError;
use crate::tensor::Tensor;

/// 参数句柄（即其在`ParamStore`中的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamId(pub usize);

/// 单个可训练参数：数值、（可选的）梯度以及是否参与训练
#[derive(Debug, Clone)]
pub struct Parameter {
    name: Option<String>,
    value: Tensor,
    grad: Option<Tensor>,
    requires_grad: bool,
}

impl Parameter {
    fn new(value: Tensor, name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            value,
            grad: None,
            requires_grad: true,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub const fn value(&self) -> &Tensor {
        &self.value
    }

    pub const fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    pub const fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// 同时借出可变的数值与只读的梯度（供优化器原地更新）
    pub(crate) fn value_and_grad_mut(&mut self) -> (&mut Tensor, Option<&Tensor>) {
        (&mut self.value, self.grad.as_ref())
    }
}

/// 参数仓库
#[derive(Debug, Default, Clone)]
pub struct ParamStore {
    params: Vec<Parameter>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个新参数（默认参与训练），返回其句柄
    pub fn add(&mut self, value: Tensor) -> ParamId {
        self.push(Parameter::new(value, None))
    }

    /// 登记一个带名字的新参数，名字仅用于调试输出
    pub fn add_named(&mut self, value: Tensor, name: &str) -> ParamId {
        self.push(Parameter::new(value, Some(name)))
    }

    fn push(&mut self, param: Parameter) -> ParamId {
        let id = ParamId(self.params.len());
        self.params.push(param);
        id
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, id: ParamId) -> Result<&Parameter, OptimizerError> {
        self.params
            .get(id.0)
            .ok_or(OptimizerError::ParamNotFound(id.0))
    }

    pub fn get_mut(&mut self, id: ParamId) -> Result<&mut Parameter, OptimizerError> {
        self.params
            .get_mut(id.0)
            .ok_or(OptimizerError::ParamNotFound(id.0))
    }

    pub fn value(&self, id: ParamId) -> Result<&Tensor, OptimizerError> {
        Ok(self.get(id)?.value())
    }

    pub fn grad(&self, id: ParamId) -> Result<Option<&Tensor>, OptimizerError> {
        Ok(self.get(id)?.grad())
    }

    /// 替换参数数值。形状可以改变，但若该参数已有优化器状态，
    /// 下一次`step()`会因状态形状不一致而报错
    pub fn set_value(&mut self, id: ParamId, value: Tensor) -> Result<(), OptimizerError> {
        self.get_mut(id)?.value = value;
        Ok(())
    }

    /// 设置梯度（通常由反向传播填充）。形状一致性在`step()`时检查
    pub fn set_grad(&mut self, id: ParamId, grad: Tensor) -> Result<(), OptimizerError> {
        self.get_mut(id)?.grad = Some(grad);
        Ok(())
    }

    pub fn clear_grad(&mut self, id: ParamId) -> Result<(), OptimizerError> {
        self.get_mut(id)?.grad = None;
        Ok(())
    }

    pub fn set_requires_grad(
        &mut self,
        id: ParamId,
        requires_grad: bool,
    ) -> Result<(), OptimizerError> {
        self.get_mut(id)?.requires_grad = requires_grad;
        Ok(())
    }
}
