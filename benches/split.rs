use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use kinsplit::{generate_train_test_split, SplitConfig, TrainingType};
use ndarray::{s, Array2};

/// 8 DOFs, 400 trials of 200 samples cycling through every single-DOF gesture.
fn session() -> (Array2<f32>, Vec<i64>, Vec<i64>, Vec<i64>) {
    let (n_trials, len, gap, n_dofs) = (400usize, 200usize, 100usize, 8usize);
    let n = n_trials * (len + gap);
    let mut k = Array2::<f32>::zeros((n, n_dofs));
    let (mut starts, mut stops) = (vec![], vec![]);
    for i in 0..n_trials {
        let start = i * (len + gap);
        let ch = i % n_dofs;
        let v = if (i / n_dofs) % 2 == 0 { 0.8 } else { -0.8 };
        k.slice_mut(s![start..start + len, ch]).fill(v);
        starts.push((start * 33) as i64);
        stops.push(((start + len) * 33) as i64);
    }
    let ts: Vec<i64> = (0..n as i64).map(|i| i * 33).collect();
    (k, ts, starts, stops)
}

fn bench_split(c: &mut Criterion) {
    let (k, ts, starts, stops) = session();
    for tt in [TrainingType::TrainFirst, TrainingType::TrainRandom] {
        let cfg = SplitConfig { training_type: tt, ..SplitConfig::default() };
        c.bench_function(&format!("generate_train_test_split [{tt}, 400 trials × 8 DOF]"), |b| {
            b.iter(|| {
                let split = generate_train_test_split(
                    black_box(k.view()), &ts, &starts, &stops, &cfg,
                ).unwrap();
                black_box(split.train_idxs.len())
            })
        });
    }
}

criterion_group!(benches, bench_split);
criterion_main!(benches);
