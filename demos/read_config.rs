//! Reading a configuration file and querying it.
//!
//! Run with: cargo run --example read_config -- path/to/config.toml
//!
//! Without an argument the bundled TOML example document is used.

use std::error::Error;
use strict_toml::{parse, parse_file, Document, KeyPath};

const FALLBACK: &str = include_str!("../tests/fixtures/valid/toml-example.toml");

fn print_tables(doc: &Document, parent: &KeyPath, depth: usize) {
    for (name, _) in doc.tables(parent) {
        println!("{}[{}]", "  ".repeat(depth), name);
        print_tables(doc, &parent.join(name.as_str()), depth + 1);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let doc = match std::env::args().nth(1) {
        Some(path) => parse_file(path)?,
        None => parse(FALLBACK)?,
    };

    println!("Keys at the root:");
    for key in doc.keys() {
        println!("  {} = {}", key, doc.get(key)?);
    }

    println!("\nTables:");
    print_tables(&doc, &KeyPath::root(), 1);

    if let Ok(ports) = doc.get_array_of::<i64, _>(["database", "ports"]) {
        println!("\nDatabase ports: {:?}", ports);
    }
    if let Ok(products) = doc.get_array_of::<Document, _>("products") {
        println!("\nProducts:");
        for product in &products {
            println!("  {} ({})", product.get_str("name")?, product.get_i64("sku")?);
        }
    }

    println!("\nNormalized:\n{}", doc);
    Ok(())
}
