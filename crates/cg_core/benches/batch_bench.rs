use cg_core::models::{player_field, BALL_X_FIELD, BALL_Y_FIELD, PLAYER_COUNT};
use cg_core::{BatchConfig, BatchDriver, CourtConfig, FailurePolicy, FrameRecord};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic_frames(count: usize) -> Vec<FrameRecord> {
    (0..count)
        .map(|f| {
            let t = f as f64 * 0.04;
            let mut record = FrameRecord::new();
            for i in 0..PLAYER_COUNT {
                let phase = t + i as f64;
                record.insert(player_field(i, "name"), format!("player {}", i + 1));
                record.insert(player_field(i, "x_coord"), 47.0 + 40.0 * phase.sin());
                record.insert(player_field(i, "y_coord"), 25.0 + 20.0 * (phase * 0.7).cos());
                record.insert(player_field(i, "team"), if i < 5 { 1_i64 } else { 2_i64 });
            }
            record
                .with(BALL_X_FIELD, 47.0 + 45.0 * (t * 1.3).sin())
                .with(BALL_Y_FIELD, 25.0 + 22.0 * t.cos())
        })
        .collect()
}

fn bench_build_graphs(c: &mut Criterion) {
    let frames = synthetic_frames(2_500);

    let mut group = c.benchmark_group("build_graphs");
    for parallel in [false, true] {
        let driver = BatchDriver::new(
            CourtConfig::default(),
            BatchConfig {
                policy: FailurePolicy::Abort,
                parallel,
            },
        )
        .unwrap();
        let name = if parallel { "parallel" } else { "sequential" };
        group.bench_function(name, |b| {
            b.iter(|| driver.build_graphs(black_box(frames.clone())).unwrap())
        });
    }
    group.finish();
}

fn bench_possession(c: &mut Criterion) {
    let frames = synthetic_frames(2_500);
    let driver = BatchDriver::default();
    c.bench_function("resolve_possessions", |b| {
        b.iter(|| driver.resolve_possessions(black_box(frames.clone())).unwrap())
    });
}

criterion_group!(benches, bench_build_graphs, bench_possession);
criterion_main!(benches);
