/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-03
 * @Description  : 负责可训练参数的登记及其优化
 */

pub mod optimizer;
mod parameter;

pub use optimizer::{Bcos, BcosConfig, BcosMode, Optimizer, ParamGroup};
pub use parameter::{ParamId, ParamStore, Parameter};
