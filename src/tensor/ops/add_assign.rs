/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-03
 * @Description  : 张量的自相加（原地运算），要求两个张量形状严格一致
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::AddAssign;

impl AddAssign for Tensor {
    fn add_assign(&mut self, other: Self) {
        add_assign_within_tensors(self, &other);
    }
}

impl<'a> AddAssign<&'a Self> for Tensor {
    fn add_assign(&mut self, other: &'a Self) {
        add_assign_within_tensors(self, other);
    }
}

impl AddAssign<f32> for Tensor {
    fn add_assign(&mut self, scalar: f32) {
        self.data += scalar;
    }
}

fn add_assign_within_tensors(tensor_1: &mut Tensor, tensor_2: &Tensor) {
    assert!(
        tensor_1.is_same_shape(tensor_2),
        "{}",
        TensorError::OperatorError {
            operator: Operator::AddAssign,
            tensor1_shape: tensor_1.shape().to_vec(),
            tensor2_shape: tensor_2.shape().to_vec(),
        }
    );
    tensor_1.data += &tensor_2.data;
}
