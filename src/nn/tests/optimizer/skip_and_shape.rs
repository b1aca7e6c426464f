/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 跳过规则、学习率为0以及形状检查测试
 */

use crate::errors::OptimizerError;
use crate::nn::optimizer::{Bcos, BcosConfig, BcosMode, Optimizer};
use crate::nn::{ParamId, ParamStore};
use crate::tensor::Tensor;

fn two_param_setup(mode: BcosMode) -> (Bcos, ParamStore, ParamId, ParamId) {
    let mut store = ParamStore::new();
    let w = store.add_named(Tensor::new_random_seeded(-1.0, 1.0, &[2, 3], 42), "w");
    let b = store.add_named(Tensor::new(&[0.1, -0.2, 0.3], &[3]), "b");
    let optimizer = Bcos::with_params(&[w, b], BcosConfig::new(0.05).mode(mode)).unwrap();
    (optimizer, store, w, b)
}

#[test]
fn test_frozen_param_is_untouched() {
    for mode in [BcosMode::Gradient, BcosMode::Momentum, BcosMode::Conditional] {
        let (mut optimizer, mut store, w, b) = two_param_setup(mode);
        store.set_requires_grad(b, false).unwrap();
        let b_before = store.value(b).unwrap().clone();
        let w_before = store.value(w).unwrap().clone();

        store.set_grad(w, Tensor::new(&[0.5; 6], &[2, 3])).unwrap();
        store.set_grad(b, Tensor::new(&[0.5; 3], &[3])).unwrap();
        optimizer.step(&mut store).unwrap();

        // 逐位不变，也不创建状态
        let b_after = store.value(b).unwrap();
        for (x, y) in b_before.to_vec().iter().zip(b_after.to_vec()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
        assert!(optimizer.state(b).is_none());
        assert_ne!(store.value(w).unwrap(), &w_before);
        assert!(optimizer.state(w).is_some());
    }
}

#[test]
fn test_param_without_grad_is_skipped() {
    let (mut optimizer, mut store, w, b) = two_param_setup(BcosMode::Conditional);
    let b_before = store.value(b).unwrap().clone();

    store.set_grad(w, Tensor::new(&[0.5; 6], &[2, 3])).unwrap();
    optimizer.step(&mut store).unwrap();

    assert_eq!(store.value(b).unwrap(), &b_before);
    assert!(optimizer.state(b).is_none());

    // 之后一旦有梯度，首次参与时才创建状态
    store.set_grad(b, Tensor::new(&[1.0, 2.0, 3.0], &[3])).unwrap();
    optimizer.step(&mut store).unwrap();
    assert!(optimizer.state(b).is_some());
}

#[test]
fn test_zero_learning_rate_keeps_params() {
    for mode in [BcosMode::Gradient, BcosMode::Momentum, BcosMode::Conditional] {
        for decouple_wd in [true, false] {
            let mut store = ParamStore::new();
            let w = store.add(Tensor::new_random_seeded(-1.0, 1.0, &[4], 7));
            let before = store.value(w).unwrap().clone();
            let config = BcosConfig::new(0.0).mode(mode).decouple_wd(decouple_wd);
            let mut optimizer = Bcos::with_params(&[w], config).unwrap();

            for step in 0..10 {
                let grad = Tensor::new_random_seeded(-1.0, 1.0, &[4], 100 + step);
                store.set_grad(w, grad).unwrap();
                optimizer.step(&mut store).unwrap();
            }
            assert_eq!(store.value(w).unwrap(), &before);
            assert_eq!(optimizer.timestep(), 10);
        }
    }
}

#[test]
fn test_zero_learning_rate_still_evolves_state() {
    let mut store = ParamStore::new();
    let w = store.add(Tensor::new(&[1.0], &[1]));
    let config = BcosConfig::new(0.0).mode(BcosMode::Momentum);
    let mut optimizer = Bcos::with_params(&[w], config).unwrap();

    store.set_grad(w, Tensor::new(&[1.0], &[1])).unwrap();
    optimizer.step(&mut store).unwrap();
    store.set_grad(w, Tensor::new(&[3.0], &[1])).unwrap();
    optimizer.step(&mut store).unwrap();

    // m = 0.9·1 + 0.1·3
    let m = optimizer.state(w).unwrap().momentum().unwrap().number().unwrap();
    assert!((m - 1.2).abs() < 1e-6);
}

#[test]
fn test_grad_shape_mismatch_aborts_whole_step() {
    let (mut optimizer, mut store, w, b) = two_param_setup(BcosMode::Momentum);
    let w_before = store.value(w).unwrap().clone();

    // w 的梯度正确，b 的梯度形状错误：整步放弃，w 也不应被更新
    store.set_grad(w, Tensor::new(&[0.5; 6], &[2, 3])).unwrap();
    store.set_grad(b, Tensor::new(&[0.5; 3], &[1, 3])).unwrap();
    let err = optimizer.step(&mut store).unwrap_err();

    assert_eq!(
        err,
        OptimizerError::ShapeMismatch {
            param: b.0,
            what: "梯度",
            expected: vec![3],
            got: vec![1, 3],
        }
    );
    assert_eq!(store.value(w).unwrap(), &w_before);
    assert!(optimizer.state(w).is_none());
    assert_eq!(optimizer.timestep(), 0);
}

#[test]
fn test_state_shape_mismatch() {
    let (mut optimizer, mut store, w, _) = two_param_setup(BcosMode::Conditional);
    store.set_grad(w, Tensor::new(&[0.5; 6], &[2, 3])).unwrap();
    optimizer.step(&mut store).unwrap();

    // 参数被替换为另一种形状，梯度与之一致，但已有的动量状态仍是旧形状
    store.set_value(w, Tensor::new(&[1.0; 6], &[3, 2])).unwrap();
    store.set_grad(w, Tensor::new(&[0.5; 6], &[3, 2])).unwrap();
    let err = optimizer.step(&mut store).unwrap_err();
    assert_eq!(
        err,
        OptimizerError::ShapeMismatch {
            param: w.0,
            what: "动量m",
            expected: vec![3, 2],
            got: vec![2, 3],
        }
    );

    // 重置后状态按新形状重新创建
    optimizer.reset();
    optimizer.step(&mut store).unwrap();
    assert_eq!(
        optimizer.state(w).unwrap().momentum().unwrap().shape(),
        &[3, 2]
    );
}

#[test]
fn test_state_keeps_param_shape() {
    for mode in [BcosMode::Gradient, BcosMode::Momentum, BcosMode::Conditional] {
        let (mut optimizer, mut store, w, _) = two_param_setup(mode);
        for step in 0..3 {
            store
                .set_grad(w, Tensor::new_random_seeded(-1.0, 1.0, &[2, 3], step))
                .unwrap();
            optimizer.step(&mut store).unwrap();
            let state = optimizer.state(w).unwrap();
            for tensor in [state.momentum(), state.variance()].into_iter().flatten() {
                assert_eq!(tensor.shape(), store.value(w).unwrap().shape());
            }
        }
    }
}

#[test]
fn test_unknown_param_id() {
    let mut store = ParamStore::new();
    let mut optimizer = Bcos::with_params(&[ParamId(5)], BcosConfig::new(0.1)).unwrap();
    assert_eq!(
        optimizer.step(&mut store),
        Err(OptimizerError::ParamNotFound(5))
    );
}
