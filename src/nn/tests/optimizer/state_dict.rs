/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : state_dict / load_state_dict 测试
 */

use approx::assert_abs_diff_eq;

use crate::errors::OptimizerError;
use crate::nn::optimizer::{Bcos, BcosConfig, BcosMode, BcosStateDict, Optimizer, ParamGroup};
use crate::nn::{ParamId, ParamStore};
use crate::tensor::Tensor;

fn setup(mode: BcosMode) -> (Bcos, ParamStore, ParamId, ParamId) {
    let mut store = ParamStore::new();
    let w = store.add(Tensor::new_random_seeded(-1.0, 1.0, &[3, 2], 1));
    let b = store.add(Tensor::new(&[0.0, 0.0], &[2]));
    let groups = vec![ParamGroup::new(&[w]), ParamGroup::new(&[b]).weight_decay(0.0)];
    let optimizer = Bcos::new(groups, BcosConfig::new(0.05).mode(mode)).unwrap();
    (optimizer, store, w, b)
}

fn train(optimizer: &mut Bcos, store: &mut ParamStore, w: ParamId, b: ParamId, seeds: std::ops::Range<u64>) {
    for seed in seeds {
        store
            .set_grad(w, Tensor::new_random_seeded(-1.0, 1.0, &[3, 2], seed))
            .unwrap();
        store
            .set_grad(b, Tensor::new_random_seeded(-1.0, 1.0, &[2], seed + 1000))
            .unwrap();
        optimizer.step(store).unwrap();
    }
}

#[test]
fn test_state_dict_snapshot() {
    let (mut optimizer, mut store, w, b) = setup(BcosMode::Momentum);
    train(&mut optimizer, &mut store, w, b, 0..3);

    let dict = optimizer.state_dict();
    assert_eq!(dict.mode, BcosMode::Momentum);
    assert!(dict.decouple_wd);
    assert_eq!(dict.step, 3);
    assert_eq!(dict.groups.len(), 2);
    assert_eq!(
        dict.state.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
        vec![w, b]
    );
}

#[test]
fn test_resume_matches_uninterrupted_training() {
    for mode in [BcosMode::Gradient, BcosMode::Momentum, BcosMode::Conditional] {
        // 不中断地训练 6 步
        let (mut reference, mut reference_store, w, b) = setup(mode);
        train(&mut reference, &mut reference_store, w, b, 0..6);

        // 训练 3 步后保存，换一个新优化器恢复后再训练 3 步
        let (mut first, mut store, w, b) = setup(mode);
        train(&mut first, &mut store, w, b, 0..3);
        let path = std::env::temp_dir().join(format!("only_torch_bcos_resume_{mode}.bin"));
        first.state_dict().save(&path).unwrap();
        let loaded = BcosStateDict::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let (mut resumed, _, _, _) = setup(mode);
        resumed.load_state_dict(loaded).unwrap();
        assert_eq!(resumed.timestep(), 3);
        train(&mut resumed, &mut store, w, b, 3..6);

        assert_eq!(store.value(w).unwrap(), reference_store.value(w).unwrap());
        assert_eq!(store.value(b).unwrap(), reference_store.value(b).unwrap());
        assert_eq!(resumed.state_dict(), reference.state_dict());
    }
}

#[test]
fn test_save_and_load_bincode_file() {
    let (mut optimizer, mut store, w, b) = setup(BcosMode::Conditional);
    train(&mut optimizer, &mut store, w, b, 0..2);
    optimizer.set_group_learning_rate(0, 0.01).unwrap();

    let path = std::env::temp_dir().join("only_torch_bcos_state_dict_test.bin");
    optimizer.state_dict().save(&path).unwrap();
    let loaded = BcosStateDict::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, optimizer.state_dict());
    assert!((loaded.groups[0].variance_decay() - 0.99).abs() < 1e-6);

    // 超参数（含学习率）以快照为准
    let (mut restored, _, _, _) = setup(BcosMode::Conditional);
    restored.load_state_dict(loaded).unwrap();
    assert_eq!(restored.param_groups()[0].lr(), 0.01);
    assert!((restored.param_groups()[0].variance_decay() - 0.99).abs() < 1e-6);
    assert_eq!(restored.state(w), optimizer.state(w));
}

#[test]
fn test_json_round_trip() {
    let (mut optimizer, mut store, w, b) = setup(BcosMode::Momentum);
    train(&mut optimizer, &mut store, w, b, 0..2);
    let snapshot = optimizer.state_dict();

    let json = snapshot.to_json().unwrap();
    assert!(json.contains("\"mode\": \"m\""));
    let loaded = BcosStateDict::from_json(&json).unwrap();
    assert_eq!(loaded.mode, BcosMode::Momentum);
    assert_eq!(loaded.step, 2);
    assert_eq!(loaded.groups.len(), 2);
    assert_eq!(loaded.groups[1].weight_decay(), 0.0);

    for ((id, expected), (loaded_id, got)) in snapshot.state.iter().zip(&loaded.state) {
        assert_eq!(id, loaded_id);
        let pairs = [
            (expected.momentum(), got.momentum()),
            (expected.variance(), got.variance()),
        ];
        for (expected, got) in pairs {
            let (expected, got) = (expected.unwrap().to_vec(), got.unwrap().to_vec());
            assert_eq!(expected.len(), got.len());
            for (e, g) in expected.iter().zip(&got) {
                assert_abs_diff_eq!(*e, *g, epsilon = 1e-6);
            }
        }
    }

    let (mut restored, _, _, _) = setup(BcosMode::Momentum);
    restored.load_state_dict(loaded).unwrap();
    assert_eq!(restored.timestep(), 2);
    assert!(restored.state(w).is_some());
}

#[test]
fn test_json_round_trip_keeps_snapshot_equal() {
    for mode in [BcosMode::Gradient, BcosMode::Momentum, BcosMode::Conditional] {
        let (mut optimizer, mut store, w, b) = setup(mode);
        train(&mut optimizer, &mut store, w, b, 0..1);
        let snapshot = optimizer.state_dict();

        let loaded = BcosStateDict::from_json(&snapshot.to_json().unwrap()).unwrap();
        for (loaded_group, group) in loaded.groups.iter().zip(&snapshot.groups) {
            assert_eq!(loaded_group.variance_decay(), group.variance_decay());
        }
        assert_eq!(loaded, snapshot);
    }
}

#[test]
fn test_load_state_dict_rejects_repeated_state() {
    let (mut optimizer, mut store, w, b) = setup(BcosMode::Conditional);
    train(&mut optimizer, &mut store, w, b, 0..1);

    let mut dict = optimizer.state_dict();
    let repeated = dict.state[0].clone();
    dict.state.push(repeated);

    let (mut target, _, _, _) = setup(BcosMode::Conditional);
    assert!(matches!(
        target.load_state_dict(dict),
        Err(OptimizerError::StateDictMismatch(_))
    ));
    assert!(target.state(w).is_none());
}

#[test]
fn test_broken_json_is_a_serialization_error() {
    assert!(matches!(
        BcosStateDict::from_json("{\"mode\": \"m\""),
        Err(OptimizerError::Serialization(_))
    ));
    assert!(matches!(
        BcosStateDict::load(std::env::temp_dir().join("only_torch_bcos_missing_state_dict.bin")),
        Err(OptimizerError::Io(_))
    ));
}

#[test]
fn test_load_state_dict_rejects_mismatch() {
    let (mut optimizer, mut store, w, b) = setup(BcosMode::Momentum);
    train(&mut optimizer, &mut store, w, b, 0..1);
    let dict = optimizer.state_dict();

    // 模式不同
    let (mut other_mode, _, _, _) = setup(BcosMode::Conditional);
    assert!(matches!(
        other_mode.load_state_dict(dict.clone()),
        Err(OptimizerError::StateDictMismatch(_))
    ));

    // 参数组划分不同
    let mut single_group =
        Bcos::with_params(&[w, b], BcosConfig::new(0.05).mode(BcosMode::Momentum)).unwrap();
    assert!(matches!(
        single_group.load_state_dict(dict.clone()),
        Err(OptimizerError::StateDictMismatch(_))
    ));

    // 快照中的超参数不合法
    let mut bad = dict.clone();
    bad.groups[1] = {
        let mut json = serde_json::to_value(&bad.groups[1]).unwrap();
        json["eps"] = serde_json::json!(-1.0);
        serde_json::from_value(json).unwrap()
    };
    let (mut target, _, _, _) = setup(BcosMode::Momentum);
    assert!(matches!(
        target.load_state_dict(bad),
        Err(OptimizerError::InvalidHyperparameter { group: 1, name: "eps", .. })
    ));
    // 失败时保持原状
    assert_eq!(target.timestep(), 0);
    assert!(target.state(w).is_none());
}

#[test]
fn test_loaded_state_with_wrong_shape_fails_at_step() {
    let (mut optimizer, mut store, w, b) = setup(BcosMode::Conditional);
    train(&mut optimizer, &mut store, w, b, 0..1);

    // 参数换了形状后再恢复旧状态
    let dict = optimizer.state_dict();
    let mut new_store = ParamStore::new();
    let w2 = new_store.add(Tensor::zeros(&[2, 3]));
    let b2 = new_store.add(Tensor::zeros(&[2]));
    assert_eq!((w2, b2), (w, b));

    let (mut restored, _, _, _) = setup(BcosMode::Conditional);
    restored.load_state_dict(dict).unwrap();
    new_store.set_grad(w2, Tensor::zeros(&[2, 3])).unwrap();
    assert!(matches!(
        restored.step(&mut new_store),
        Err(OptimizerError::ShapeMismatch { what: "动量m", .. })
    ));
}
