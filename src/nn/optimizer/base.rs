/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:00:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-03
 * @Description  : 优化器基础trait
 */

use crate::errors::OptimizerError;
use crate::nn::ParamStore;

/// 优化器核心 trait
pub trait Optimizer {
    /// 参数更新（使用已计算的梯度）
    ///
    /// `PyTorch` 风格训练循环：
    /// ```ignore
    /// optimizer.zero_grad(&mut store)?;
    /// // ……由调用方计算梯度，并通过 store.set_grad() 填入……
    /// optimizer.step(&mut store)?; // ← 只更新参数，不做 forward/backward
    /// ```
    fn step(&mut self, params: &mut ParamStore) -> Result<(), OptimizerError>;

    /// 清空（置为无）优化器所绑定参数的梯度
    fn zero_grad(&mut self, params: &mut ParamStore) -> Result<(), OptimizerError>;

    /// 重置累积状态
    fn reset(&mut self);

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);
}
