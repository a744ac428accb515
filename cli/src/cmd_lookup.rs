//! `abiscope lookup`: show what a selector or topic resolves to.

use abiscope_core::{EventSignature, FunctionSignature, Param};
use abiscope_registry::SignatureRegistry;
use anyhow::{bail, Result};
use serde_json::json;

pub fn run(registry: &SignatureRegistry, id: &str, as_json: bool) -> Result<()> {
    let digits = id.trim().trim_start_matches("0x").trim_start_matches("0X").len();
    match digits {
        8 => match registry.function_by_selector_hex(id) {
            Some(f) if as_json => println!("{}", serde_json::to_string_pretty(&function_json(f))?),
            Some(f) => print!("{}", describe_function(f)),
            None => bail!("no function registered for selector {id}"),
        },
        64 => {
            let variants = registry.events_by_topic_hex(id);
            if variants.is_empty() {
                bail!("no event registered for topic {id}");
            }
            if as_json {
                let list: Vec<_> = variants.iter().map(event_json).collect();
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                for v in variants {
                    print!("{}", describe_event(v));
                }
            }
        }
        _ => bail!("'{id}' is neither a 4-byte selector nor a 32-byte topic"),
    }
    Ok(())
}

fn describe_function(f: &FunctionSignature) -> String {
    format!(
        "{}  {}\n{}",
        f.selector_hex(),
        f.signature,
        describe_params(&f.inputs)
    )
}

fn describe_event(e: &EventSignature) -> String {
    format!(
        "{}  {}  ({} indexed)\n{}",
        e.topic_hex(),
        e.signature,
        e.indexed_count,
        describe_params(&e.inputs)
    )
}

fn describe_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| {
            let indexed = if p.indexed { " [indexed]" } else { "" };
            format!("    - {}: {}{}\n", p.name, p.kind.declared(), indexed)
        })
        .collect()
}

fn function_json(f: &FunctionSignature) -> serde_json::Value {
    json!({
        "name": f.name,
        "signature": f.signature,
        "selector": f.selector_hex(),
    })
}

fn event_json(e: &EventSignature) -> serde_json::Value {
    json!({
        "name": e.name,
        "signature": e.signature,
        "topic": e.topic_hex(),
        "indexed_count": e.indexed_count,
    })
}
