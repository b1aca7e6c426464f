/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : Optimizer trait 通用行为测试
 */

use crate::nn::optimizer::{Bcos, BcosConfig, BcosMode, Optimizer, ParamGroup};
use crate::nn::ParamStore;
use crate::tensor::Tensor;

#[test]
fn test_optimizer_as_trait_object() {
    let mut store = ParamStore::new();
    let w = store.add(Tensor::new(&[1.0, 2.0], &[2]));

    let mut optimizers: Vec<Box<dyn Optimizer>> = [BcosMode::Gradient, BcosMode::Momentum, BcosMode::Conditional]
        .into_iter()
        .map(|mode| {
            Box::new(Bcos::with_params(&[w], BcosConfig::new(0.01).mode(mode)).unwrap())
                as Box<dyn Optimizer>
        })
        .collect();

    for optimizer in &mut optimizers {
        assert_eq!(optimizer.learning_rate(), 0.01);
        let before = store.value(w).unwrap().clone();
        store.set_grad(w, Tensor::new(&[0.3, -0.3], &[2])).unwrap();
        optimizer.step(&mut store).unwrap();
        assert_ne!(store.value(w).unwrap(), &before);
    }
}

#[test]
fn test_learning_rate_modification() {
    let groups = vec![
        ParamGroup::new(&[crate::nn::ParamId(0)]),
        ParamGroup::new(&[crate::nn::ParamId(1)]).lr(0.5),
    ];
    let mut optimizer = Bcos::new(groups, BcosConfig::new(0.001)).unwrap();
    assert_eq!(optimizer.learning_rate(), 0.001);

    optimizer.set_learning_rate(0.0001);
    assert_eq!(optimizer.learning_rate(), 0.0001);
    assert!(optimizer.param_groups().iter().all(|g| g.lr() == 0.0001));
    assert_eq!(optimizer.defaults().lr, 0.0001);

    // 不合法的学习率被忽略
    optimizer.set_learning_rate(-1.0);
    optimizer.set_learning_rate(f32::INFINITY);
    assert_eq!(optimizer.learning_rate(), 0.0001);
}

#[test]
fn test_zero_grad() {
    let mut store = ParamStore::new();
    let w = store.add(Tensor::new(&[1.0], &[1]));
    let other = store.add(Tensor::new(&[1.0], &[1]));
    let mut optimizer = Bcos::with_params(&[w], BcosConfig::new(0.1)).unwrap();

    store.set_grad(w, Tensor::new(&[1.0], &[1])).unwrap();
    store.set_grad(other, Tensor::new(&[1.0], &[1])).unwrap();
    optimizer.zero_grad(&mut store).unwrap();

    assert!(store.grad(w).unwrap().is_none());
    // 不属于该优化器的参数不受影响
    assert!(store.grad(other).unwrap().is_some());

    // 梯度清空后 step 不做任何事
    let before = store.value(w).unwrap().clone();
    optimizer.step(&mut store).unwrap();
    assert_eq!(store.value(w).unwrap(), &before);
    assert!(optimizer.state(w).is_none());
}

#[test]
fn test_reset() {
    let mut store = ParamStore::new();
    let w = store.add(Tensor::new(&[1.0], &[1]));
    let mut optimizer =
        Bcos::with_params(&[w], BcosConfig::new(0.1).mode(BcosMode::Momentum)).unwrap();

    store.set_grad(w, Tensor::new(&[1.0], &[1])).unwrap();
    optimizer.step(&mut store).unwrap();
    assert!(optimizer.state(w).is_some());
    assert_eq!(optimizer.timestep(), 1);

    optimizer.reset();
    assert!(optimizer.state(w).is_none());
    assert_eq!(optimizer.timestep(), 0);
}
