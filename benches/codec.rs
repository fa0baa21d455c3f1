// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use colloquy::format::dlg::{read_dialog, write_dialog};
use colloquy::model::Dialog;

mod fixtures;

fn checksum_dialog(dialog: &Dialog) -> u64 {
    let pointers: usize = dialog.nodes().map(|(_, node)| node.pointers().len()).sum();
    (dialog.node_count() as u64) ^ ((pointers as u64) << 20) ^ (dialog.starts().len() as u64)
}

fn bench_write(c: &mut Criterion) {
    // Benchmark identity (keep stable): group `codec.write`, case ids from `fixtures::Case::id`.
    let mut group = c.benchmark_group("codec.write");
    for case in fixtures::cases() {
        let dialog = fixtures::dialog(case);
        group.throughput(Throughput::Elements(dialog.node_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.id()), &dialog, |b, dialog| {
            b.iter(|| {
                let bytes = write_dialog(black_box(dialog)).expect("write");
                black_box(bytes.len())
            })
        });
    }
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    // Benchmark identity (keep stable): group `codec.read`, case ids from `fixtures::Case::id`.
    let mut group = c.benchmark_group("codec.read");
    for case in fixtures::cases() {
        let dialog = fixtures::dialog(case);
        let bytes = write_dialog(&dialog).expect("fixture bytes");
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.id()), &bytes, |b, bytes| {
            b.iter(|| {
                let report = read_dialog(black_box(bytes)).expect("read");
                black_box(checksum_dialog(&report.dialog))
            })
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = fixtures::criterion();
    targets = bench_write, bench_read
}
criterion_main!(benches);
