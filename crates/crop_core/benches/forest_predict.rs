use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cropforest_core::{
    FeatureVector, Forest, ForestMetadata, ModelParams, NumericFeature, SoilType, TreeNode,
    FOREST_FORMAT_VERSION,
};

const CROPS: [&str; 4] = ["rice", "wheat", "maize", "pulses"];

/// Complete binary tree that cycles through features and crops
fn balanced_tree(depth: usize, offset: usize) -> TreeNode {
    if depth == 0 {
        return TreeNode::leaf(CROPS[offset % CROPS.len()], 1);
    }
    let feature = NumericFeature::ALL[(depth + offset) % NumericFeature::COUNT];
    TreeNode::internal(
        feature,
        50.0 + (offset % 7) as f64 * 10.0,
        balanced_tree(depth - 1, offset * 2 + 1),
        balanced_tree(depth - 1, offset * 2 + 2),
        1 << depth,
    )
}

fn sample_forest() -> Forest {
    let trees: Vec<TreeNode> = (0..15).map(|i| balanced_tree(12, i)).collect();
    let metadata = ForestMetadata {
        version: FOREST_FORMAT_VERSION,
        params: ModelParams::default(),
        tree_count: trees.len(),
        training_samples: 400,
        classes: CROPS.iter().map(|c| c.to_string()).collect(),
        created_at: 0,
    };
    Forest::new(trees, metadata).expect("benchmark forest is valid")
}

fn bench_forest_predict(c: &mut Criterion) {
    let forest = sample_forest();
    let features = FeatureVector {
        soil_ph: 6.5,
        nitrogen: 80.0,
        phosphorus: 40.0,
        potassium: 40.0,
        temperature: 25.0,
        humidity: 80.0,
        rainfall: 150.0,
        soil_type: SoilType::Loamy,
    };

    c.bench_function("forest_predict_15x12", |b| {
        b.iter(|| {
            let ranked = forest.predict(black_box(&features));
            black_box(ranked).ok();
        });
    });
}

criterion_group!(forest_benches, bench_forest_predict);
criterion_main!(forest_benches);
