//! Criterion benchmarks for tileset critical paths
//!
//! Benchmarks the operations that run on every load/save:
//! - Pixel: texture decode/encode (512 KiB of texels)
//! - Atlas: composite with border clamping, decompose
//! - Object: stream parse and serialize
//! - Behavior: table decode

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};
use puzzle::atlas::{composite, decompose, TILE_SIZE};
use puzzle::behavior::{decode_behaviors, BEHAVIOR_TABLE_BYTES};
use puzzle::object::{decode_objects, encode_objects, Object, Slope, TileGrid, TileRef};
use puzzle::pixel::{decode_texture, encode_texture, TEXTURE_BYTES};
use puzzle::tileset::TILE_COUNT;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Alternating RGB555 and RGB4A3 texels
fn make_texture() -> Vec<u8> {
    (0..TEXTURE_BYTES / 2)
        .flat_map(|i| {
            let texel = if i % 2 == 0 { 0x8000 | (i as u16 & 0x7FFF) } else { i as u16 & 0x7FFF };
            texel.to_be_bytes()
        })
        .collect()
}

fn make_tiles() -> Vec<RgbaImage> {
    (0..TILE_COUNT)
        .map(|i| RgbaImage::from_fn(TILE_SIZE, TILE_SIZE, |x, y| Rgba([i as u8, x as u8, y as u8, 255])))
        .collect()
}

fn make_objects(count: usize, size: usize) -> Vec<Object> {
    (0..count)
        .map(|i| {
            let tiles = TileGrid::filled(size, size, TileRef::new(0, (i % 256) as u8, 1));
            if i % 4 == 0 && size > 1 {
                Object::with_slopes(tiles, Slope::new(0x90, 1), Slope::new(0x84, (size - 1) as u8))
            } else {
                Object::new(tiles)
            }
        })
        .collect()
}

// =============================================================================
// Pixel Benchmarks
// =============================================================================

fn bench_pixel(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixel");
    let raw = make_texture();
    let image = decode_texture(&raw).unwrap();

    group.throughput(Throughput::Bytes(TEXTURE_BYTES as u64));
    group.bench_function("decode_texture", |b| b.iter(|| decode_texture(black_box(&raw))));
    group.bench_function("encode_texture", |b| b.iter(|| encode_texture(black_box(&image))));

    group.finish();
}

// =============================================================================
// Atlas Benchmarks
// =============================================================================

fn bench_atlas(c: &mut Criterion) {
    let mut group = c.benchmark_group("atlas");
    let tiles = make_tiles();
    let atlas = composite(&tiles).unwrap();

    group.throughput(Throughput::Elements(TILE_COUNT as u64));
    group.bench_function("composite", |b| b.iter(|| composite(black_box(&tiles))));
    group.bench_function("decompose", |b| b.iter(|| decompose(black_box(&atlas))));

    group.finish();
}

// =============================================================================
// Object Benchmarks
// =============================================================================

fn bench_objects(c: &mut Criterion) {
    let mut group = c.benchmark_group("object");

    for size in [1, 4, 8].iter() {
        let objects = make_objects(200, *size);
        let (stream, metadata) = encode_objects(&objects, TILE_COUNT).unwrap();

        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode_200", size), &objects, |b, objects| {
            b.iter(|| encode_objects(black_box(objects), TILE_COUNT))
        });
        group.bench_with_input(BenchmarkId::new("decode_200", size), &(stream, metadata), |b, (s, m)| {
            b.iter(|| decode_objects(black_box(s), black_box(m), TILE_COUNT))
        });
    }

    group.finish();
}

fn bench_behaviors(c: &mut Criterion) {
    let table: Vec<u8> = (0..BEHAVIOR_TABLE_BYTES).map(|i| (i % 251) as u8).collect();
    c.bench_function("decode_behaviors", |b| b.iter(|| decode_behaviors(black_box(&table))));
}

criterion_group!(benches, bench_pixel, bench_atlas, bench_objects, bench_behaviors);
criterion_main!(benches);
