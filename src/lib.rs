//! # Only Torch · BCOS
//!
//! 用纯rust实现的BCOS一阶随机优化器。与动量SGD、Adam系列优化器定位相同：
//! 给定一组可训练参数及其梯度，原地更新参数。
//!
//! BCOS支持三种二阶矩（方差）估计模式：
//! - `g`：对梯度平方做指数滑动平均（EMA）；
//! - `m`：对动量平方做EMA；
//! - `c`：条件估计，每步由“上一步动量的平方”与“当前梯度的平方”混合得出，不做持久化。
//!
//! 训练循环（梯度计算、学习率调度、梯度裁剪等）由调用方负责，本库只负责每步的参数更新。
//!
//! ```
//! use only_torch_bcos::nn::optimizer::{Bcos, BcosConfig, BcosMode, Optimizer, ParamGroup};
//! use only_torch_bcos::nn::ParamStore;
//! use only_torch_bcos::tensor::Tensor;
//!
//! let mut store = ParamStore::new();
//! let w = store.add(Tensor::new(&[1.0, -1.0], &[2]));
//!
//! let config = BcosConfig::new(0.1).mode(BcosMode::Momentum).weight_decay(0.0);
//! let mut optimizer = Bcos::new(vec![ParamGroup::new(&[w])], config).unwrap();
//!
//! store.set_grad(w, Tensor::new(&[0.5, -0.5], &[2])).unwrap();
//! optimizer.step(&mut store).unwrap();
//! optimizer.zero_grad(&mut store).unwrap();
//! ```

pub mod errors;
pub mod nn;
pub mod tensor;
