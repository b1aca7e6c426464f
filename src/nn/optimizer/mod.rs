/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:00:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-03
 * @Description  : 优化器模块，实现 PyTorch 风格的 BCOS 优化算法
 */

mod base;
mod bcos;
mod config;
mod group;
mod mode;
mod state;
mod state_dict;

pub use base::Optimizer;
pub use bcos::Bcos;
pub use config::BcosConfig;
pub use group::{HyperparameterGroup, ParamGroup};
pub use mode::BcosMode;
pub use state::ParamState;
pub use state_dict::BcosStateDict;
