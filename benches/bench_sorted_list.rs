#![feature(test)]

extern crate rand;
extern crate sorted_collections;

extern crate test;

use self::test::Bencher;
use rand::Rng;
use sorted_collections::{SortedArray, SortedMap, SortedSet};

#[bench]
fn empty(b: &mut Bencher) {
    b.iter(|| 1)
}

#[bench]
fn add_random_u8(b: &mut Bencher) {
    let mut list: SortedArray<u8> = SortedArray::new();
    let mut rng = ::rand::thread_rng();
    b.iter(|| list.add(rng.gen::<u8>()));
}

#[bench]
fn add_random_u64(b: &mut Bencher) {
    let mut list: SortedArray<u64> = SortedArray::new();
    let mut rng = ::rand::thread_rng();
    b.iter(|| list.add(rng.gen::<u64>()));
}

#[bench]
fn add_zero_u8(b: &mut Bencher) {
    let mut list: SortedArray<u8> = SortedArray::new();
    b.iter(|| list.add(0));
}

#[bench]
fn add_zero_u64(b: &mut Bencher) {
    let mut list: SortedArray<u64> = SortedArray::new();
    b.iter(|| list.add(0));
}

#[bench]
fn add_sequential_u8(b: &mut Bencher) {
    let mut list: SortedArray<u8> = SortedArray::new();
    let mut i: u8 = 0;
    b.iter(|| {
        list.add(i);
        i = i.wrapping_add(1)
    });
}

#[bench]
fn add_increasing_u64(b: &mut Bencher) {
    let mut list: SortedArray<u64> = SortedArray::new();
    let mut i: u64 = 0;
    b.iter(|| {
        list.add(i);
        i = i + 1
    });
}

#[bench]
fn set_add_random_dedup_heavy(b: &mut Bencher) {
    let mut set: SortedSet<u8> = SortedSet::new();
    let mut rng = ::rand::thread_rng();
    b.iter(|| set.add(rng.gen::<u8>()));
}

#[bench]
fn map_set_random_u16_keys(b: &mut Bencher) {
    let mut map: SortedMap<u16, u64> = SortedMap::new();
    let mut rng = ::rand::thread_rng();
    let mut i: u64 = 0;
    b.iter(|| {
        map.set(rng.gen::<u16>(), i);
        i += 1;
    });
}

#[bench]
fn at_forces_positional_index_build(b: &mut Bencher) {
    let mut list: SortedArray<u64> = SortedArray::new();
    list.update(0..100_000u64);
    b.iter(|| {
        // Every 97th rank forces a fresh index build on the first access
        // after a structural change; this approximates the steady-state
        // cost once the container stops growing.
        test::black_box(list.at(54_321));
    });
}

#[bench]
fn islice_walk_10000(b: &mut Bencher) {
    let mut list: SortedArray<u64> = SortedArray::new();
    list.update(0..100_000u64);
    b.iter(|| {
        let sum: u64 = list.islice(0, 10_000, false).sum();
        test::black_box(sum);
    });
}
