use std::collections::HashMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde::{Deserialize, Serialize};
use serde_query_items::{ArrayFormat, Config, QueryItem};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SimpleStruct {
    id: u32,
    name: String,
    active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SimpleVecWrapper {
    items: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeepNested {
    level1: Level1,
    metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Level1 {
    level2: Level2,
    tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Level2 {
    level3: Level3,
    config: HashMap<String, i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Level3 {
    value: String,
    flags: Vec<bool>,
}

fn simple() -> SimpleStruct {
    SimpleStruct {
        id: 42,
        name: "test_user".to_string(),
        active: true,
    }
}

fn deep() -> DeepNested {
    DeepNested {
        level1: Level1 {
            level2: Level2 {
                level3: Level3 {
                    value: "deep".to_string(),
                    flags: vec![true, false, true],
                },
                config: HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]),
            },
            tags: vec!["x".to_string(), "y".to_string()],
        },
        metadata: HashMap::from([("k".to_string(), "v".to_string())]),
    }
}

fn large_vec() -> SimpleVecWrapper {
    SimpleVecWrapper {
        items: (0..1000).collect(),
    }
}

fn serialize_simple_struct(c: &mut Criterion) {
    let data = simple();
    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| serde_query_items::to_items(black_box(&data)).unwrap())
    });
}

fn serialize_deep_nested(c: &mut Criterion) {
    let data = deep();
    c.bench_function("serialize_deep_nested", |b| {
        b.iter(|| serde_query_items::to_items(black_box(&data)).unwrap())
    });
}

fn serialize_large_vec(c: &mut Criterion) {
    let data = large_vec();
    let repeated = Config::new().array_format(ArrayFormat::Repeated);
    c.bench_function("serialize_large_vec_ordered", |b| {
        b.iter(|| serde_query_items::to_items(black_box(&data)).unwrap())
    });
    c.bench_function("serialize_large_vec_repeated", |b| {
        b.iter(|| repeated.serialize_items(black_box(&data)).unwrap())
    });
}

fn deserialize_simple_struct(c: &mut Criterion) {
    let items = serde_query_items::to_items(&simple()).unwrap();
    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| serde_query_items::from_items::<SimpleStruct>(black_box(&items)).unwrap())
    });
}

fn deserialize_deep_nested(c: &mut Criterion) {
    let items = serde_query_items::to_items(&deep()).unwrap();
    c.bench_function("deserialize_deep_nested", |b| {
        b.iter(|| serde_query_items::from_items::<DeepNested>(black_box(&items)).unwrap())
    });
}

fn deserialize_large_vec(c: &mut Criterion) {
    let items: Vec<QueryItem> = serde_query_items::to_items(&large_vec()).unwrap();
    c.bench_function("deserialize_large_vec", |b| {
        b.iter(|| serde_query_items::from_items::<SimpleVecWrapper>(black_box(&items)).unwrap())
    });
}

criterion_group!(
    serialize,
    serialize_simple_struct,
    serialize_deep_nested,
    serialize_large_vec
);

criterion_group!(
    deserialize,
    deserialize_simple_struct,
    deserialize_deep_nested,
    deserialize_large_vec
);

criterion_main!(serialize, deserialize);
