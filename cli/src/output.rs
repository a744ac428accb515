//! Human-readable rendering of decoded records.

use abiscope_core::{DecodedCall, DecodedLog, DecodedParam};
use std::fmt::Write;

pub fn render_call(call: &DecodedCall) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Function:  {}", call.name);
    let _ = writeln!(out, "Signature: {}", call.signature);
    let _ = writeln!(out, "Selector:  {}", call.selector_hex());
    out.push_str("Inputs:\n");
    for p in &call.params {
        render_param(&mut out, p, 1);
    }
    render_errors(&mut out, call.decode_errors.iter());
    out
}

pub fn render_log(log: &DecodedLog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Event:     {}", log.name);
    let _ = writeln!(out, "Signature: {}", log.signature);
    let _ = writeln!(out, "Topic:     {}", log.topic);
    out.push_str("Params:\n");
    for p in &log.params {
        render_param(&mut out, p, 1);
    }
    render_errors(&mut out, log.decode_errors.iter());
    out
}

fn render_param(out: &mut String, p: &DecodedParam, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = if p.name.is_empty() { "_" } else { p.name.as_str() };
    let indexed = if p.indexed == Some(true) { " [indexed]" } else { "" };
    let value = p.value.as_deref().unwrap_or("<undecoded>");
    let _ = writeln!(out, "{indent}{name} ({}){indexed}: {value}", p.ty);
    if let Some(components) = &p.components {
        for c in components {
            render_param(out, c, depth + 1);
        }
    }
}

fn render_errors<'a>(out: &mut String, errors: impl ExactSizeIterator<Item = (&'a String, &'a String)>) {
    if errors.len() == 0 {
        return;
    }
    out.push_str("Errors:\n");
    for (label, reason) in errors {
        let _ = writeln!(out, "  {label}: {reason}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abiscope_core::RawLog;
    use abiscope_evm::{decode_event_log, decode_function_input};
    use abiscope_registry::{RegistryBuilder, SignatureRegistry};

    fn registry() -> SignatureRegistry {
        let mut builder = RegistryBuilder::new();
        builder.add_document(
            "inline",
            r#"[
                {"type":"function","name":"settle","inputs":[
                    {"name":"order","type":"tuple","components":[
                        {"name":"id","type":"uint256"},{"name":"note","type":"string"}]},
                    {"name":"","type":"bool"}]},
                {"type":"event","name":"Ping","inputs":[
                    {"name":"who","type":"address","indexed":true},
                    {"name":"n","type":"uint8","indexed":false}]}
            ]"#,
        );
        builder.build()
    }

    #[test]
    fn call_renders_components_and_errors() {
        let registry = registry();
        let selector = registry.functions().next().unwrap().selector_hex();
        // Only the first head slot (the tuple offset) is present.
        let raw = format!("{selector}{:064x}", 64);
        let call = decode_function_input(&registry, &raw).unwrap();
        let text = render_call(&call);
        assert!(text.contains("Function:  settle"));
        assert!(text.contains("order (tuple): <undecoded>"));
        assert!(text.contains("_ (bool): <undecoded>"));
        assert!(text.contains("Errors:\n  order: "));
        assert!(text.contains("  arg1: "));
    }

    #[test]
    fn log_marks_indexed_params() {
        let registry = registry();
        let topic = registry.events().next().unwrap().topic_hex();
        let log = RawLog::new(
            vec![topic, format!("0x{:064x}", 0xbeef)],
            format!("0x{:064x}", 7),
        );
        let decoded = decode_event_log(&registry, &log).unwrap();
        let text = render_log(&decoded);
        assert!(text.contains("Event:     Ping"));
        assert!(text.contains(
            "who (address) [indexed]: 0x000000000000000000000000000000000000beef"
        ));
        assert!(text.contains("n (uint8): 7"));
        assert!(!text.contains("Errors:"));
    }
}
