use crate::tensor::Tensor;
use std::cmp::PartialEq;

impl From<f32> for Tensor {
    /// 实现 From<f32> trait 用于将`f32`类型转换为形状为`[1]`的张量
    fn from(scalar: f32) -> Self {
        Tensor::new(&[scalar], &[1])
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Tensor {
    /// 逐元素平方，返回新的张量
    pub fn square(&self) -> Tensor {
        Tensor {
            data: self.data.mapv(|x| x * x),
        }
    }

    /// 逐元素开方，返回新的张量
    pub fn sqrt(&self) -> Tensor {
        Tensor {
            data: self.data.mapv(f32::sqrt),
        }
    }

    /// 对张量中的所有元素求和，返回纯数
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 判断张量中的所有元素是否都是有限值（非NaN、非无穷）
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}
