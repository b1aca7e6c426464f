/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : BCOS 优化器的状态字典（state_dict / load_state_dict），用于保存、恢复训练
 */

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::group::HyperparameterGroup;
use super::{Bcos, BcosMode, ParamState};
use crate::errors::OptimizerError;
use crate::nn::ParamId;

/// 优化器状态快照：模式、权重衰减方式、各参数组超参数以及每个参数的状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BcosStateDict {
    pub mode: BcosMode,
    pub decouple_wd: bool,
    pub step: usize,
    pub groups: Vec<HyperparameterGroup>,
    /// 按`ParamId`升序排列
    pub state: Vec<(ParamId, ParamState)>,
}

impl BcosStateDict {
    /// 以 bincode 格式写入本地文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), OptimizerError> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// 从`save()`写出的文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptimizerError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    pub fn to_json(&self) -> Result<String, OptimizerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, OptimizerError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Bcos {
    /// 导出当前状态
    pub fn state_dict(&self) -> BcosStateDict {
        let mut state: Vec<_> = self
            .state_entries()
            .iter()
            .map(|(&id, s)| (id, s.clone()))
            .collect();
        state.sort_by_key(|(id, _)| *id);
        BcosStateDict {
            mode: self.mode(),
            decouple_wd: self.decouple_wd(),
            step: self.timestep(),
            groups: self.param_groups().to_vec(),
            state,
        }
    }

    /// 恢复状态。模式、权重衰减方式以及参数组的划分都必须与当前优化器一致，
    /// 各组超参数（含学习率）以快照为准。校验失败时优化器保持不变。
    ///
    /// 状态张量与参数形状是否一致在下一次`step()`时检查。
    pub fn load_state_dict(&mut self, dict: BcosStateDict) -> Result<(), OptimizerError> {
        if dict.mode != self.mode() {
            return Err(OptimizerError::StateDictMismatch(format!(
                "模式为{}，当前优化器为{}",
                dict.mode,
                self.mode()
            )));
        }
        if dict.decouple_wd != self.decouple_wd() {
            return Err(OptimizerError::StateDictMismatch(format!(
                "decouple_wd为{}，当前优化器为{}",
                dict.decouple_wd,
                self.decouple_wd()
            )));
        }
        if dict.groups.len() != self.param_groups().len() {
            return Err(OptimizerError::StateDictMismatch(format!(
                "含{}个参数组，当前优化器有{}个",
                dict.groups.len(),
                self.param_groups().len()
            )));
        }

        let mut groups = dict.groups;
        for (index, (loaded, current)) in groups.iter_mut().zip(self.param_groups()).enumerate() {
            if loaded.params() != current.params() {
                return Err(OptimizerError::StateDictMismatch(format!(
                    "第{index}个参数组的参数与当前优化器不同"
                )));
            }
            loaded.validate(index, self.mode())?;
        }

        let mut state = HashMap::with_capacity(dict.state.len());
        for (id, param_state) in dict.state {
            if param_state.mode() != self.mode() {
                return Err(OptimizerError::StateDictMismatch(format!(
                    "参数{}的状态属于{}模式",
                    id.0,
                    param_state.mode()
                )));
            }
            if !groups.iter().any(|g| g.params().contains(&id)) {
                return Err(OptimizerError::StateDictMismatch(format!(
                    "参数{}不属于任何参数组",
                    id.0
                )));
            }
            if state.insert(id, param_state).is_some() {
                return Err(OptimizerError::StateDictMismatch(format!(
                    "参数{}的状态出现了多次",
                    id.0
                )));
            }
        }

        info!("BCOS优化器已恢复至第{}步，含{}个参数状态", dict.step, state.len());
        self.restore(groups, state, dict.step);
        Ok(())
    }
}
