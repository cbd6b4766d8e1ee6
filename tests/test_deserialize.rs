use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_query_items::{ArrayFormat, Config, Error, KeyDecodingStrategy, QueryItem};
use std::collections::{BTreeMap, HashMap};

fn items(pairs: &[(&str, Option<&str>)]) -> Vec<QueryItem> {
    pairs.iter().map(|&pair| QueryItem::from(pair)).collect()
}

#[derive(Debug, Deserialize, PartialEq)]
struct Address {
    city: String,
    street: String,
    postcode: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct QueryParams {
    id: u8,
    name: String,
    address: Address,
    phone: u32,
    user_ids: Vec<u8>,
}

#[test]
fn deserialize_struct() {
    let params: QueryParams = serde_query_items::from_items(&items(&[
        ("id", Some("42")),
        ("name", Some("Acme")),
        ("phone", Some("12345")),
        ("address.city", Some("Carrot City")),
        ("address.street", Some("Special-Street* No. 11")),
        ("address.postcode", Some("12345")),
        ("user_ids.0", Some("1")),
        ("user_ids.1", Some("2")),
        ("user_ids.2", Some("3")),
        ("user_ids.3", Some("4")),
    ]))
    .unwrap();

    assert_eq!(
        params,
        QueryParams {
            id: 42,
            name: "Acme".to_string(),
            phone: 12345,
            address: Address {
                city: "Carrot City".to_string(),
                street: "Special-Street* No. 11".to_string(),
                postcode: "12345".to_string(),
            },
            user_ids: vec![1, 2, 3, 4],
        }
    );
}

#[test]
fn deserialize_unordered_and_sparse_indices() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Query {
        list: Vec<String>,
    }

    let query: Query = serde_query_items::from_items(&items(&[
        ("list.5", Some("c")),
        ("list.0", Some("a")),
        ("list.2", Some("b")),
    ]))
    .unwrap();
    assert_eq!(query.list, ["a", "b", "c"]);
}

#[test]
fn deserialize_unknown_fields_are_ignored() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Query {
        a: u8,
    }

    let query: Query = serde_query_items::from_items(&items(&[
        ("a", Some("1")),
        ("extra", Some("x")),
        ("nested.deeply.0", Some("y")),
    ]))
    .unwrap();
    assert_eq!(query, Query { a: 1 });
}

#[test]
fn deserialize_option() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Query {
        vec: Option<Vec<u8>>,
        flag: Option<bool>,
    }

    let query: Query = serde_query_items::from_items(&[]).unwrap();
    assert_eq!(
        query,
        Query {
            vec: None,
            flag: None
        }
    );

    let query: Query = serde_query_items::from_items(&items(&[
        ("vec.0", Some("1")),
        ("vec.1", Some("2")),
        ("flag", None),
    ]))
    .unwrap();
    assert_eq!(
        query,
        Query {
            vec: Some(vec![1, 2]),
            flag: None
        }
    );
}

#[test]
fn deserialize_root_values() {
    let value: u16 = serde_query_items::from_items(&items(&[("", Some("80"))])).unwrap();
    assert_eq!(value, 80);

    let value: Option<u16> = serde_query_items::from_items(&items(&[("", None)])).unwrap();
    assert_eq!(value, None);

    let list: Vec<String> =
        serde_query_items::from_items(&items(&[("0", Some("a")), ("1", Some("b"))])).unwrap();
    assert_eq!(list, ["a", "b"]);

    let map: HashMap<String, String> = serde_query_items::from_items(&[]).unwrap();
    assert!(map.is_empty());
}

#[test]
fn deserialize_enum() {
    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum TestEnum {
        A,
        B(bool),
        C { x: u8, y: u8 },
        D(u8, u8),
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Query {
        e: TestEnum,
    }

    let decode = |pairs: &[(&str, Option<&str>)]| {
        serde_query_items::from_items::<Query>(&items(pairs)).map(|q| q.e)
    };

    assert_eq!(decode(&[("e", Some("a"))]).unwrap(), TestEnum::A);
    assert_eq!(decode(&[("e.b", Some("true"))]).unwrap(), TestEnum::B(true));
    assert_eq!(
        decode(&[("e.c.x", Some("2")), ("e.c.y", Some("3"))]).unwrap(),
        TestEnum::C { x: 2, y: 3 }
    );
    assert_eq!(
        decode(&[("e.d.0", Some("128")), ("e.d.1", Some("1"))]).unwrap(),
        TestEnum::D(128, 1)
    );

    let err = decode(&[("e.a", Some("")), ("e.b", Some("true"))]).unwrap_err();
    assert!(matches!(err, Error::StructuralMismatch { .. }), "got: {err}");
    assert_eq!(err.path().unwrap().to_string(), "e");

    let err = decode(&[("e", Some("z"))]).unwrap_err();
    insta::assert_snapshot!(err, @"unknown variant `z`, expected one of `a`, `b`, `c`, `d` at `e`");
}

#[test]
fn deserialize_any_into_json() {
    let value: serde_json::Value = serde_query_items::from_items(&items(&[
        ("a", Some("1")),
        ("b.0", Some("x")),
        ("b.1", Some("y")),
        ("c.d", None),
    ]))
    .unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "a": "1",
            "b": ["x", "y"],
            "c": { "d": null },
        })
    );
}

#[test]
fn deserialize_repeated() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Query {
        tags: Vec<String>,
        page: u8,
    }

    let config = Config::new().array_format(ArrayFormat::Repeated);
    let query: Query = config
        .deserialize_items(&items(&[
            ("tags", Some("a")),
            ("page", Some("2")),
            ("tags", Some("b")),
        ]))
        .unwrap();
    assert_eq!(
        query,
        Query {
            tags: vec!["a".to_string(), "b".to_string()],
            page: 2,
        }
    );

    // indexed names are still understood
    let query: Query = config
        .deserialize_items(&items(&[("tags.0", Some("a")), ("page", Some("2"))]))
        .unwrap();
    assert_eq!(query.tags, ["a"]);
}

#[test]
fn deserialize_repeated_names_are_rejected_when_ordered() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Query {
        tags: Vec<String>,
    }

    let err = serde_query_items::from_items::<Query>(&items(&[
        ("tags", Some("a")),
        ("tags", Some("b")),
    ]))
    .unwrap_err();
    assert!(matches!(err, Error::StructuralMismatch { .. }), "got: {err}");
    assert_eq!(err.path().unwrap().to_string(), "tags");
}

#[test]
fn deserialize_leaf_and_branch_conflict() {
    let err = serde_query_items::from_items::<serde_json::Value>(&items(&[
        ("a", Some("1")),
        ("a.b", Some("2")),
    ]))
    .unwrap_err();
    assert!(matches!(err, Error::StructuralMismatch { .. }), "got: {err}");
    assert_eq!(err.path().unwrap().to_string(), "a");
}

#[test]
fn deserialize_errors_carry_paths() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Person {
        name: String,
        age: u8,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Query {
        people: Vec<Person>,
    }

    let err = serde_query_items::from_items::<Query>(&items(&[
        ("people.0.name", Some("A")),
        ("people.0.age", Some("3")),
        ("people.1.name", Some("B")),
        ("people.1.age", Some("old")),
    ]))
    .unwrap_err();
    insta::assert_snapshot!(err, @"type mismatch at `people.1.age`: expected u8, found `old`");

    let err = serde_query_items::from_items::<Query>(&items(&[
        ("people.0.name", Some("A")),
        ("people.0.age", None),
    ]))
    .unwrap_err();
    insta::assert_snapshot!(err, @"value not found at `people.0.age`: expected u8, found nil");

    let err = serde_query_items::from_items::<Query>(&items(&[("people.0.name", Some("A"))]))
        .unwrap_err();
    insta::assert_snapshot!(err, @"missing field `age` at `people.0`");

    let err = serde_query_items::from_items::<Query>(&items(&[("people.first.name", Some("A"))]))
        .unwrap_err();
    insta::assert_snapshot!(err, @"structural mismatch at `people`: expected a sequence, found key `first`");
}

#[test]
fn deserialize_too_deep() {
    let err = Config::new()
        .max_depth(2)
        .deserialize_items::<serde_json::Value>(&items(&[("a.b.c", Some("1"))]))
        .unwrap_err();
    assert!(err.is_contract_violation(), "got: {err}");
}

#[test]
fn deserialize_map_keys() {
    let map: BTreeMap<u8, bool> =
        serde_query_items::from_items(&items(&[("3", Some("true")), ("1", Some("false"))]))
            .unwrap();
    assert_eq!(map, BTreeMap::from([(1, false), (3, true)]));

    let map: BTreeMap<String, u8> =
        serde_query_items::from_items(&items(&[("b", Some("2")), ("a", Some("1"))])).unwrap();
    assert_eq!(map, BTreeMap::from([("a".to_string(), 1), ("b".to_string(), 2)]));
}

#[test]
fn deserialize_key_strategy() {
    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Query {
        user_id: u32,
        sort_order: String,
    }

    let config = Config::new().key_decoding_strategy(KeyDecodingStrategy::ConvertFromSnakeCase);
    let query: Query = config
        .deserialize_items(&items(&[("user_id", Some("7")), ("sort_order", Some("asc"))]))
        .unwrap();
    assert_eq!(
        query,
        Query {
            user_id: 7,
            sort_order: "asc".to_string(),
        }
    );

    let config = Config::new().key_decoding_strategy(KeyDecodingStrategy::custom(|path, key| {
        if path.is_root() {
            key.trim_start_matches("x-").to_string()
        } else {
            key.to_string()
        }
    }));
    let map: BTreeMap<String, String> = config
        .deserialize_items(&items(&[("x-trace", Some("on"))]))
        .unwrap();
    assert_eq!(map, BTreeMap::from([("trace".to_string(), "on".to_string())]));
}

#[test]
fn deserialize_empty_containers() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Filters {
        name: Option<String>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Query {
        filters: Filters,
        #[serde(default)]
        tags: Vec<String>,
    }

    let query: Query = serde_query_items::from_items(&items(&[("filters", Some(""))])).unwrap();
    assert_eq!(
        query,
        Query {
            filters: Filters { name: None },
            tags: vec![],
        }
    );
}
