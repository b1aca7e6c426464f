/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-03
 * @Description  : 张量。优化器中的参数、梯度以及动量/方差等状态均以张量表示，
 *                 所有运算均为逐元素运算
 */

use ndarray::{Array, IxDyn};
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::errors::TensorError;

mod ops {
    pub mod add;
    pub mod add_assign;
    pub mod div;
    pub mod mul;
    pub mod mul_assign;
    pub mod others;
    pub mod sub;
    pub mod sub_assign;
}

mod property;


/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]、[1,1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等（`shape`为`[]`时乘积为1），否则会panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        match Array::from_shape_vec(IxDyn(shape), data.to_vec()) {
            Ok(data) => Self { data },
            Err(_) => panic!(
                "{}",
                TensorError::DataShapeMismatch {
                    data_len: data.len(),
                    shape: shape.to_vec(),
                }
            ),
        }
    }

    /// 创建一个所有元素均为0的张量
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    /// 创建一个随机张量，其值在[min, max]的闭区间。
    /// 相同的`seed`总会得到相同的张量，便于测试复现。
    pub fn new_random_seeded(min: f32, max: f32, shape: &[usize], seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let uniform = Uniform::from(min..=max);
        let data = (0..shape.iter().product::<usize>())
            .map(|_| uniform.sample(&mut rng))
            .collect::<Vec<_>>();
        Self::new(&data, shape)
    }
}

// 私有方法
impl Tensor {
    fn has_zero_value(&self) -> bool {
        self.data.iter().any(|&x| x == 0.)
    }
}
