use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use itertools::Itertools as _;
use twenty_fourty_eight_rollout::{
    board::{Board, Direction, test_utils},
    search::rollout::random_rollout,
};

/// Generate a vector of random boards for benchmarking.
fn generate_boards(count: usize) -> Vec<Board> {
    (0..16)
        .flat_map(|filled| {
            (0..filled.max(1)).cartesian_product(0..count).map(
                move |(duplicates, _)| test_utils::random_board(filled, duplicates),
            )
        })
        .collect()
}

/// Benchmark one full shift in every direction over a spread of boards.
fn bench_shift(c: &mut Criterion) {
    const COUNT: usize = 100;

    let mut group = c.benchmark_group("shift");

    let boards = generate_boards(COUNT);
    group.throughput(Throughput::Elements((boards.len() * 4) as u64));

    group.bench_function("checked_shift", |b| {
        b.iter(|| {
            for &board in &boards {
                for direction in Direction::ALL {
                    black_box(board.checked_shift(direction));
                }
            }
        });
    });

    group.bench_function("possible_moves", |b| {
        b.iter(|| {
            for &board in &boards {
                black_box(board.possible_moves());
            }
        });
    });
}

/// Benchmark a whole random playout from a fresh game.
fn bench_rollout(c: &mut Criterion) {
    let mut rng = rand::rng();
    let mut group = c.benchmark_group("rollout");

    group.bench_function("random_rollout", |b| {
        b.iter(|| {
            let board = Board::new_game(&mut rng);
            black_box(random_rollout(&mut rng, board))
        });
    });
}

criterion_group!(benches, bench_shift, bench_rollout);
criterion_main!(benches);
