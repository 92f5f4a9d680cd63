use std::env;
use std::error::Error;
use std::fs;
use std::process;

use serde_json::json;
use vase::vase::store::ValueStore;

fn print_usage() {
    println!("VASE MAP CHECKER - Observed-Value Store Inspection");
    println!();
    println!("Usage:");
    println!("  vase --check <map.json>     Load a VASE map and print its statistics");
    println!("  vase --example <out.json>   Write a small well-formed example map");
    println!("  vase --help                 Show this help message");
    println!();
    println!("The map is the JSON produced by the log-to-map analyser:");
    println!("  location keys loc:<N> or loc:<N>:branch:<B>, each mapping");
    println!("  variable names to lists of {{type, value, ops?}} observations.");
}

fn check_map(path: &str) -> Result<(), Box<dyn Error>> {
    let store = ValueStore::load_from_file(path)?;

    let mut var_count = 0usize;
    let mut value_count = 0usize;
    let mut numeric_count = 0usize;
    for (_location, bundle) in store.iter() {
        var_count += bundle.vars.len();
        for (_name, observations) in &bundle.vars {
            value_count += observations.len();
            numeric_count += observations.iter().filter(|o| o.is_numeric()).count();
        }
    }

    println!("[OK] Map loaded: {}", path);
    println!("  locations: {}", store.len());
    println!("  variables: {}", var_count);
    println!("  values:    {} ({} numeric)", value_count, numeric_count);
    if numeric_count == 0 {
        println!("  note: no numeric values; rewrites would never fire");
    }
    Ok(())
}

fn write_example(path: &str) -> Result<(), Box<dyn Error>> {
    let example = json!({
        "loc:42": {
            "x": [
                { "type": 0, "value": "258" },
                { "type": 0, "value": "1024", "ops": ["icmp eq"] }
            ]
        },
        "loc:42:branch:1": {
            "x": [
                { "type": 0, "value": "258" }
            ]
        },
        "loc:7": {
            "len": [
                { "type": 0, "value": "16" },
                { "type": 1, "value": "hello" }
            ]
        }
    });
    fs::write(path, serde_json::to_string_pretty(&example)?)?;
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Error: Missing arguments");
        println!();
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "--help" | "-h" => {
            print_usage();
        }
        "--example" => {
            if args.len() < 3 {
                eprintln!("Error: Missing output path for example map");
                process::exit(1);
            }
            match write_example(&args[2]) {
                Ok(()) => println!("[OK] Example map created: {}", args[2]),
                Err(e) => {
                    eprintln!("Error creating example map: {}", e);
                    process::exit(1);
                }
            }
        }
        "--check" => {
            if args.len() < 3 {
                eprintln!("Error: Missing map path");
                process::exit(1);
            }
            if let Err(e) = check_map(&args[2]) {
                eprintln!("Error loading map: {}", e);
                process::exit(1);
            }
        }
        path => {
            // Bare path is shorthand for --check
            if let Err(e) = check_map(path) {
                eprintln!("Error loading map: {}", e);
                process::exit(1);
            }
        }
    }
}
