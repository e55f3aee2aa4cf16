//! Property-based tests over generated documents: whatever is written out
//! parses back to the same values, and no input makes the parser panic.
//!
//! Generated documents mix scalars, datetimes, flat arrays and inline
//! tables under the root, under `[T..]` tables and under `[[A..]]` table
//! array elements with a nested `N` table array.

use chrono::{FixedOffset, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::BTreeMap;
use strict_toml::{parse, to_string, Document, KeyPath, Value};

type Section = BTreeMap<String, Entry>;

/// A key's right-hand side: a plain value or an inline table of values.
#[derive(Debug, Clone)]
enum Entry {
    Plain(Value),
    Inline(BTreeMap<String, Value>),
}

/// One `[[name]]` element and the `[[name.N]]` elements nested under it.
#[derive(Debug, Clone)]
struct Element {
    body: Section,
    children: Vec<Section>,
}

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9_-]{0,8}",
        // Quoted keys with spaces, dots and quotes
        "[a-z .\"#=]{1,8}",
    ]
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        prop::num::f64::NORMAL.prop_map(Value::Float),
        any::<bool>().prop_map(Value::Boolean),
        any::<String>().prop_map(Value::String),
        datetime(),
    ]
}

fn datetime() -> impl Strategy<Value = Value> {
    (0i64..4_102_444_800, -12i32..=14).prop_filter_map("offset in range", |(secs, hours)| {
        let offset = FixedOffset::east_opt(hours * 3600)?;
        let dt = Utc.timestamp_opt(secs, 0).single()?;
        Some(Value::Datetime(dt.with_timezone(&offset)))
    })
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => scalar(),
        1 => prop::collection::vec(any::<i64>().prop_map(Value::Integer), 0..6).prop_map(Value::Array),
        1 => prop::collection::vec(any::<String>().prop_map(Value::String), 0..6).prop_map(Value::Array),
    ]
}

fn entry() -> impl Strategy<Value = Entry> {
    prop_oneof![
        4 => value().prop_map(Entry::Plain),
        1 => prop::collection::btree_map(key(), value(), 0..4).prop_map(Entry::Inline),
    ]
}

fn section() -> impl Strategy<Value = Section> {
    prop::collection::btree_map(key(), entry(), 0..6)
}

fn element() -> impl Strategy<Value = Element> {
    (section(), prop::collection::vec(section(), 0..3))
        .prop_map(|(body, children)| Element { body, children })
}

fn table_arrays() -> impl Strategy<Value = BTreeMap<String, Vec<Element>>> {
    prop::collection::btree_map("A[a-z]{0,3}", prop::collection::vec(element(), 1..4), 0..3)
}

fn render_entry(text: &mut String, key: &str, entry: &Entry) {
    text.push_str(&format!("{} = ", KeyPath::from(key)));
    match entry {
        Entry::Plain(v) => text.push_str(&v.to_string()),
        Entry::Inline(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{} = {}", KeyPath::from(k.as_str()), v))
                .collect();
            if fields.is_empty() {
                text.push_str("{}");
            } else {
                text.push_str(&format!("{{ {} }}", fields.join(", ")));
            }
        }
    }
    text.push('\n');
}

fn render_section(text: &mut String, body: &Section) {
    for (k, entry) in body {
        render_entry(text, k, entry);
    }
}

/// Writes one document with root entries, one section per table and one
/// block per table array element.
fn render(root: &Section, tables: &BTreeMap<String, Section>, arrays: &BTreeMap<String, Vec<Element>>) -> String {
    let mut text = String::new();
    render_section(&mut text, root);
    for (name, body) in tables {
        text.push_str(&format!("\n[{}]\n", name));
        render_section(&mut text, body);
    }
    for (name, elements) in arrays {
        for element in elements {
            text.push_str(&format!("\n[[{}]]\n", name));
            render_section(&mut text, &element.body);
            for child in &element.children {
                text.push_str(&format!("\n[[{}.N]]\n", name));
                render_section(&mut text, child);
            }
        }
    }
    text
}

/// Checks that every entry of `body` reads back from `doc`.
fn check_section(doc: &Document, body: &Section) -> Result<(), TestCaseError> {
    for (k, entry) in body {
        match entry {
            Entry::Plain(v) => {
                prop_assert_eq!(doc.get(k.as_str()).unwrap(), v);
            }
            Entry::Inline(fields) => {
                let table = doc.get_table(k.as_str()).unwrap();
                prop_assert_eq!(table.keys().count(), fields.len());
                for (inner, v) in fields {
                    prop_assert_eq!(doc.get([k.as_str(), inner.as_str()]).unwrap(), v);
                }
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_scalar_values_read_back(k in key(), v in value()) {
        let text = format!("{} = {}", KeyPath::from(k.as_str()), v);
        let doc = parse(&text).unwrap();
        prop_assert_eq!(doc.get(k.as_str()).unwrap(), &v);
    }

    #[test]
    fn prop_documents_read_back(
        root in section(),
        tables in prop::collection::btree_map("T[a-z]{0,4}", section(), 0..4),
        arrays in table_arrays(),
    ) {
        let text = render(&root, &tables, &arrays);
        let doc = parse(&text).unwrap();

        check_section(&doc, &root)?;
        for (name, body) in &tables {
            prop_assert!(doc.contains_table(name.as_str()));
            check_section(&doc.get_table(name.as_str()).unwrap(), body)?;
        }
        for (name, elements) in &arrays {
            let read = doc.get_array_of::<Document, _>(name.as_str()).unwrap();
            prop_assert_eq!(read.len(), elements.len());
            for (table, element) in read.iter().zip(elements) {
                check_section(table, &element.body)?;
                if element.children.is_empty() {
                    prop_assert!(!table.contains_key("N"));
                    continue;
                }
                let children = table.get_array_of::<Document, _>("N").unwrap();
                prop_assert_eq!(children.len(), element.children.len());
                for (child, body) in children.iter().zip(&element.children) {
                    check_section(child, body)?;
                }
            }
        }
    }

    #[test]
    fn prop_serialized_output_is_stable(
        root in section(),
        tables in prop::collection::btree_map("T[a-z]{0,4}", section(), 0..4),
        arrays in table_arrays(),
    ) {
        let doc = parse(&render(&root, &tables, &arrays)).unwrap();
        let text = to_string(&doc);
        let reparsed = parse(&text).unwrap();
        prop_assert_eq!(&reparsed, &doc);
        prop_assert_eq!(to_string(&reparsed), text);
    }

    #[test]
    fn prop_parse_is_deterministic(input in "[a-z0-9 =\\[\\]\"'.,{}#\n]{0,64}") {
        prop_assert_eq!(parse(&input), parse(&input));
    }

    #[test]
    fn prop_arbitrary_input_never_panics(input in any::<String>()) {
        let _ = parse(&input);
    }
}
