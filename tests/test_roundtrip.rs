use serde::{Deserialize, Serialize};
use serde_query_items::{ArrayFormat, Config, QueryItem};
use std::collections::BTreeMap;

fn render(items: &[QueryItem]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("&")
}

/// macro for testing roundtrip serialization and deserialization
///
/// The encoded items are rendered as `name=value` pairs joined by `&` and
/// compared against an inline snapshot.
macro_rules! roundtrip_test {
    (
        $data:expr, @$snapshot:literal
    ) => {
        roundtrip_test!(Config::new(), $data, @$snapshot);
    };
    (
        $config:expr, $data:expr, @$snapshot:literal
    ) => {
        let config = $config;
        let data = &$data;

        let items = config.serialize_items(data).expect("serialize");
        insta::assert_snapshot!(render(&items), @$snapshot);

        let deserialized = config.deserialize_items(&items).expect("deserialize");

        // check we get the same data back
        pretty_assertions::assert_eq!(data, &deserialized);
    };
}

// ========== BASIC STRUCTS ==========

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct FlatStruct {
    a: u8,
    b: u8,
}

#[test]
fn flat_struct() {
    roundtrip_test!(FlatStruct { a: 1, b: 2 }, @"a=1&b=2");
}

// ========== PRIMITIVE TYPES ==========

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct PrimitiveTypes {
    bool_val: bool,
    i8_val: i8,
    i16_val: i16,
    i32_val: i32,
    i64_val: i64,
    u8_val: u8,
    u16_val: u16,
    u32_val: u32,
    u64_val: u64,
    f32_val: f32,
    f64_val: f64,
    char_val: char,
    string_val: String,
}

#[test]
fn primitive_types() {
    roundtrip_test!(PrimitiveTypes {
        bool_val: true,
        i8_val: -128,
        i16_val: -32768,
        i32_val: -2147483648,
        i64_val: -9223372036854775808,
        u8_val: 255,
        u16_val: 65535,
        u32_val: 4294967295,
        u64_val: 18446744073709551615,
        f32_val: 1.5,
        f64_val: -0.25,
        char_val: 'x',
        string_val: "hello world".to_string(),
    }, @"bool_val=true&i8_val=-128&i16_val=-32768&i32_val=-2147483648&i64_val=-9223372036854775808&u8_val=255&u16_val=65535&u32_val=4294967295&u64_val=18446744073709551615&f32_val=1.5&f64_val=-0.25&char_val=x&string_val=hello world");
}

#[test]
fn root_primitive() {
    roundtrip_test!(7u8, @"=7");
}

// ========== NESTED STRUCTS ==========

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Address {
    city: String,
    postcode: Option<String>,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Person {
    name: String,
    address: Address,
}

#[test]
fn nested_struct() {
    roundtrip_test!(Person {
        name: "Acme".to_string(),
        address: Address {
            city: "Carrot City".to_string(),
            postcode: Some("12345".to_string()),
        },
    }, @"name=Acme&address.city=Carrot City&address.postcode=12345");
}

#[test]
fn absent_optional_field_is_skipped() {
    roundtrip_test!(Person {
        name: "Acme".to_string(),
        address: Address {
            city: "Carrot City".to_string(),
            postcode: None,
        },
    }, @"name=Acme&address.city=Carrot City");
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Filters {
    name: Option<String>,
    min_age: Option<u8>,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Search {
    filters: Filters,
    page: u32,
}

#[test]
fn empty_nested_struct_is_preserved() {
    roundtrip_test!(Search {
        filters: Filters {
            name: None,
            min_age: None,
        },
        page: 3,
    }, @"filters=&page=3");
}

// ========== SEQUENCES ==========

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Items {
    items: Vec<String>,
}

#[test]
fn ordered_sequence() {
    roundtrip_test!(Items {
        items: vec!["A".to_string(), "B".to_string(), "C".to_string()],
    }, @"items.0=A&items.1=B&items.2=C");
}

#[test]
fn repeated_sequence() {
    roundtrip_test!(Config::new().array_format(ArrayFormat::Repeated), Items {
        items: vec!["A".to_string(), "B".to_string(), "C".to_string()],
    }, @"items=A&items=B&items=C");
}

#[test]
fn repeated_single_element_sequence() {
    roundtrip_test!(Config::new().array_format(ArrayFormat::Repeated), Items {
        items: vec!["only".to_string()],
    }, @"items=only");
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Defaulted {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    counts: BTreeMap<String, u32>,
}

#[test]
fn empty_sequence_is_erased() {
    roundtrip_test!(Defaulted {
        tags: vec![],
        counts: BTreeMap::new(),
    }, @"counts=");
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Grid {
    grid: Vec<Vec<u8>>,
}

#[test]
fn nested_sequences() {
    roundtrip_test!(Grid {
        grid: vec![vec![1, 2], vec![3]],
    }, @"grid.0.0=1&grid.0.1=2&grid.1.0=3");
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct People {
    people: Vec<Person>,
}

#[test]
fn sequence_of_structs() {
    roundtrip_test!(People {
        people: vec![
            Person {
                name: "A".to_string(),
                address: Address {
                    city: "X".to_string(),
                    postcode: None,
                },
            },
            Person {
                name: "B".to_string(),
                address: Address {
                    city: "Y".to_string(),
                    postcode: Some("1".to_string()),
                },
            },
        ],
    }, @"people.0.name=A&people.0.address.city=X&people.1.name=B&people.1.address.city=Y&people.1.address.postcode=1");
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Sparse {
    values: Vec<Option<u8>>,
}

#[test]
fn sequence_with_nils() {
    roundtrip_test!(Sparse {
        values: vec![Some(1), None, Some(3)],
    }, @"values.0=1&values.1&values.2=3");
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Tuples {
    pair: (u8, String),
    point: Point,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Point(i32, i32);

#[test]
fn tuples() {
    roundtrip_test!(Tuples {
        pair: (1, "x".to_string()),
        point: Point(-1, 2),
    }, @"pair.0=1&pair.1=x&point.0=-1&point.1=2");
}

// ========== MAPS ==========

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Counts {
    counts: BTreeMap<String, u32>,
    by_id: BTreeMap<u16, bool>,
}

#[test]
fn maps() {
    roundtrip_test!(Counts {
        counts: BTreeMap::from([("x".to_string(), 1), ("y".to_string(), 2)]),
        by_id: BTreeMap::from([(10, true), (20, false)]),
    }, @"counts.x=1&counts.y=2&by_id.10=true&by_id.20=false");
}

#[test]
fn map_with_nil_values() {
    roundtrip_test!(
        BTreeMap::from([("a".to_string(), None), ("b".to_string(), Some(2u8))]),
        @"a&b=2"
    );
}

// ========== ENUMS ==========

#[derive(Debug, PartialEq, Deserialize, Serialize)]
enum Shape {
    Point,
    Circle(f64),
    Line(u8, u8),
    Rect { w: u8, h: u8 },
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Drawing {
    shapes: Vec<Shape>,
    background: Shape,
}

#[test]
fn enums() {
    roundtrip_test!(Drawing {
        shapes: vec![
            Shape::Point,
            Shape::Circle(1.5),
            Shape::Line(1, 2),
            Shape::Rect { w: 3, h: 4 },
        ],
        background: Shape::Point,
    }, @"shapes.0=Point&shapes.1.Circle=1.5&shapes.2.Line.0=1&shapes.2.Line.1=2&shapes.3.Rect.w=3&shapes.3.Rect.h=4&background=Point");
}

// ========== UNIT ==========

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct Marker;

#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct WithUnits {
    unit: (),
    marker: Marker,
}

#[test]
fn units() {
    roundtrip_test!(WithUnits {
        unit: (),
        marker: Marker,
    }, @"unit=&marker=");
}
