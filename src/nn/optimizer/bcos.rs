/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : BCOS 优化器
 *
 * 对每个参数组、组内每个（参与训练且带梯度的）参数，依次执行：
 * 1. 状态初始化（仅首次）：m := g，v := g⊙g
 * 2. 权重衰减：解耦时 p := (1 - lr·wd)·p；否则 g := g + wd·p
 * 3. 更新方向 d：
 *    - m/c 模式：（c 模式先以更新前的动量算出 v := betav·m² + (1-betav)·g²）
 *      再更新动量 m := beta·m + (1-beta)·g，d := m
 *    - g 模式：d := g
 * 4. 方差：g/m 模式 v := betav·v + (1-betav)·d²；c 模式直接使用第3步的 v（不保存）
 * 5. 参数更新：p := p - lr·d / (√v + eps)
 */

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use log::{debug, info, trace, warn};

use super::group::HyperparameterGroup;
use super::{BcosConfig, BcosMode, Optimizer, ParamGroup, ParamState};
use crate::errors::OptimizerError;
use crate::nn::{ParamId, ParamStore};
use crate::tensor::Tensor;

/// BCOS 优化器
///
/// # 使用示例
/// ```ignore
/// let config = BcosConfig::new(1e-3).mode(BcosMode::Conditional);
/// let mut optimizer = Bcos::with_params(&[w, b], config)?;
///
/// // 训练循环
/// optimizer.zero_grad(&mut store)?;
/// // ……计算梯度并 store.set_grad(..)……
/// optimizer.step(&mut store)?;
/// ```
#[derive(Debug, Clone)]
pub struct Bcos {
    /// 参数组（按登记顺序处理）
    groups: Vec<HyperparameterGroup>,
    /// 全局默认超参数（`add_param_group`时补全用）
    defaults: BcosConfig,
    /// 每个参数的状态（按 `ParamId` 索引，首次更新时创建）
    state: HashMap<ParamId, ParamState>,
    /// 已执行的步数
    t: usize,
}

impl Bcos {
    /// 创建 BCOS 优化器
    ///
    /// 任一参数组的超参数不合法（`lr<0`、`beta∉(0,1)`、`eps≤0`、`wd<0`等），
    /// 或同一参数出现在多个组中时返回错误。
    pub fn new(groups: Vec<ParamGroup>, config: BcosConfig) -> Result<Self, OptimizerError> {
        let mut optimizer = Self {
            groups: Vec::with_capacity(groups.len()),
            defaults: config,
            state: HashMap::new(),
            t: 0,
        };
        for group in groups {
            optimizer.push_group(group)?;
        }
        info!(
            "BCOS优化器已创建：模式={}，解耦权重衰减={}，参数组数={}",
            optimizer.mode(),
            optimizer.decouple_wd(),
            optimizer.groups.len()
        );
        Ok(optimizer)
    }

    /// 使用指定参数（单个参数组，超参数全部取自`config`）创建优化器
    pub fn with_params(params: &[ParamId], config: BcosConfig) -> Result<Self, OptimizerError> {
        Self::new(vec![ParamGroup::new(params)], config)
    }

    /// 追加一个参数组，校验规则与构造时相同。出错时优化器保持不变
    pub fn add_param_group(&mut self, group: ParamGroup) -> Result<(), OptimizerError> {
        self.push_group(group)?;
        info!("BCOS优化器新增第{}个参数组", self.groups.len() - 1);
        Ok(())
    }

    fn push_group(&mut self, group: ParamGroup) -> Result<(), OptimizerError> {
        let index = self.groups.len();
        let resolved = HyperparameterGroup::resolve(group, index, &self.defaults)?;
        let mut seen = HashSet::new();
        for &id in resolved.params() {
            if !seen.insert(id) || self.groups.iter().any(|g| g.params().contains(&id)) {
                return Err(OptimizerError::DuplicateParameter(id.0));
            }
        }
        self.groups.push(resolved);
        Ok(())
    }

    pub const fn mode(&self) -> BcosMode {
        self.defaults.mode
    }

    pub const fn decouple_wd(&self) -> bool {
        self.defaults.decouple_wd
    }

    /// 全局默认配置
    pub const fn defaults(&self) -> &BcosConfig {
        &self.defaults
    }

    pub fn param_groups(&self) -> &[HyperparameterGroup] {
        &self.groups
    }

    /// 获取指定参数的状态（尚未参与过更新时为`None`）
    pub fn state(&self, param: ParamId) -> Option<&ParamState> {
        self.state.get(&param)
    }

    /// 获取当前时间步
    pub const fn timestep(&self) -> usize {
        self.t
    }

    /// 设置指定参数组的学习率（供学习率调度使用）
    pub fn set_group_learning_rate(&mut self, index: usize, lr: f32) -> Result<(), OptimizerError> {
        self.groups
            .get_mut(index)
            .ok_or(OptimizerError::GroupNotFound(index))?
            .set_lr(index, lr)
    }

    /// 在修改任何参数之前，检查所有待更新参数的梯度及已有状态的形状
    fn check_shapes(&self, params: &ParamStore) -> Result<(), OptimizerError> {
        for group in &self.groups {
            for &id in group.params() {
                let param = params.get(id)?;
                if !param.requires_grad() {
                    continue;
                }
                let Some(grad) = param.grad() else {
                    continue;
                };
                if !grad.is_same_shape(param.value()) {
                    return Err(OptimizerError::ShapeMismatch {
                        param: id.0,
                        what: "梯度",
                        expected: param.value().shape().to_vec(),
                        got: grad.shape().to_vec(),
                    });
                }
                if let Some(state) = self.state.get(&id) {
                    state.check_shape(id, param.value().shape())?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn state_entries(&self) -> &HashMap<ParamId, ParamState> {
        &self.state
    }

    pub(crate) fn restore(
        &mut self,
        groups: Vec<HyperparameterGroup>,
        state: HashMap<ParamId, ParamState>,
        t: usize,
    ) {
        self.groups = groups;
        self.state = state;
        self.t = t;
    }
}

impl Optimizer for Bcos {
    /// 对所有参与训练且带梯度的参数执行一步 BCOS 更新
    ///
    /// 若任一参数的梯度或已有状态与参数形状不一致，返回`ShapeMismatch`，且本步不修改任何参数或状态。
    fn step(&mut self, params: &mut ParamStore) -> Result<(), OptimizerError> {
        self.check_shapes(params)?;
        self.t += 1;

        let mode = self.mode();
        let decouple_wd = self.decouple_wd();
        let mut updated = 0usize;
        for group in &self.groups {
            for &id in group.params() {
                let param = params.get_mut(id)?;
                if !param.requires_grad() {
                    trace!("参数{id:?}不参与训练，跳过");
                    continue;
                }
                let (value, grad) = param.value_and_grad_mut();
                let Some(grad) = grad else {
                    trace!("参数{id:?}没有梯度，跳过");
                    continue;
                };

                let state = self.state.entry(id).or_insert_with(|| {
                    debug!("为参数{id:?}创建{mode}模式的状态，形状{:?}", grad.shape());
                    ParamState::init(mode, grad)
                });
                bcos_update(state, value, grad, group, decouple_wd);

                if log::log_enabled!(log::Level::Warn) && !value.is_finite() {
                    warn!("参数{id:?}在第{}步更新后出现非有限值", self.t);
                }
                updated += 1;
            }
        }
        debug!("BCOS第{}步完成，更新了{updated}个参数", self.t);
        Ok(())
    }

    fn zero_grad(&mut self, params: &mut ParamStore) -> Result<(), OptimizerError> {
        for group in &self.groups {
            for &id in group.params() {
                params.clear_grad(id)?;
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state.clear();
        self.t = 0;
    }

    /// 第一个参数组的学习率（没有参数组时为默认学习率）
    fn learning_rate(&self) -> f32 {
        self.groups.first().map_or(self.defaults.lr, |g| g.lr())
    }

    /// 将所有参数组（及默认配置）的学习率设为`lr`；不合法的`lr`会被忽略并记录警告
    fn set_learning_rate(&mut self, lr: f32) {
        if !(lr >= 0.0 && lr.is_finite()) {
            warn!("忽略不合法的学习率{lr}");
            return;
        }
        self.defaults.lr = lr;
        for (index, group) in self.groups.iter_mut().enumerate() {
            // lr 已校验，不会失败
            let _ = group.set_lr(index, lr);
        }
    }
}

/// 单个参数的 BCOS 更新（对应模块注释中的第2~5步）
fn bcos_update(
    state: &mut ParamState,
    value: &mut Tensor,
    grad: &Tensor,
    group: &HyperparameterGroup,
    decouple_wd: bool,
) {
    let lr = group.lr();
    let wd = group.weight_decay();
    let beta = group.beta();
    let betav = group.variance_decay();

    // 权重衰减。吸收进梯度时只修改本地副本，调用方的梯度不受影响
    let grad = if decouple_wd {
        *value *= 1.0 - lr * wd;
        Cow::Borrowed(grad)
    } else {
        Cow::Owned(grad + &(wd * &*value))
    };
    let grad: &Tensor = &grad;

    match state {
        ParamState::Gradient { v } => {
            ema(v, &grad.square(), betav);
            apply_update(value, grad, v, lr, group.eps());
        }
        ParamState::Momentum { m, v } => {
            ema(m, grad, beta);
            ema(v, &m.square(), betav);
            apply_update(value, m, v, lr, group.eps());
        }
        ParamState::Conditional { m } => {
            // 必须用本步更新之前的动量
            let v = betav * &m.square() + &((1.0 - betav) * &grad.square());
            ema(m, grad, beta);
            apply_update(value, m, &v, lr, group.eps());
        }
    }
}

/// 原地指数滑动平均：acc := decay·acc + (1 - decay)·x
fn ema(acc: &mut Tensor, x: &Tensor, decay: f32) {
    *acc *= decay;
    *acc += &((1.0 - decay) * x);
}

/// p := p - lr·d / (√v + eps)
fn apply_update(value: &mut Tensor, direction: &Tensor, variance: &Tensor, lr: f32, eps: f32) {
    let denominator = variance.sqrt() + eps;
    let update = direction / &denominator;
    *value -= &(lr * &update);
}
