use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pepindex_engine::{Automaton, MatchState, SearchBudget};
use std::hint::black_box;

const RESIDUES: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// Deterministic pseudo-random residues
fn create_protein(seed: usize, length: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
    (0..length)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            RESIDUES[state % RESIDUES.len()]
        })
        .collect()
}

/// Tryptic-length slices of the proteins, so a share of them occurs
fn create_needles(proteins: &[Vec<u8>], count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let protein = &proteins[i % proteins.len()];
            let len = 7 + i % 12;
            let start = (i * 31) % (protein.len() - len);
            protein[start..start + len].to_vec()
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("automaton_build");
    let proteins: Vec<Vec<u8>> = (0..200).map(|i| create_protein(i, 400)).collect();

    for count in &[1_000, 10_000, 50_000] {
        let needles = create_needles(&proteins, *count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("needles", count), &needles, |b, needles| {
            b.iter(|| {
                Automaton::build(
                    black_box(needles).iter().map(Vec::as_slice),
                    SearchBudget::exact(),
                )
            });
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("automaton_search");
    let proteins: Vec<Vec<u8>> = (0..200).map(|i| create_protein(i, 400)).collect();
    let needles = create_needles(&proteins, 5_000);
    let residues: usize = proteins.iter().map(Vec::len).sum();
    group.throughput(Throughput::Bytes(residues as u64));

    for (aaa, mm) in [(0, 0), (3, 0), (0, 1), (2, 2)] {
        let budget = SearchBudget::new(aaa, mm).unwrap();
        let automaton = Automaton::build(needles.iter().map(Vec::as_slice), budget).unwrap();
        let label = format!("aaa{}_mm{}", aaa, mm);

        group.bench_with_input(BenchmarkId::new("budget", label), &automaton, |b, automaton| {
            let mut state = MatchState::new();
            b.iter(|| {
                let mut total = 0;
                for protein in &proteins {
                    total += state.search(automaton, black_box(protein)).len();
                }
                total
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
