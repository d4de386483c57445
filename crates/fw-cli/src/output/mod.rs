use std::io::IsTerminal;
use std::sync::OnceLock;

use serde::Serialize;
use serde_json::Value;

use crate::cli::{GlobalFlags, OutputFormat};

pub mod table;

static TABLE_OPTIONS: OnceLock<table::TableOptions> = OnceLock::new();

/// Fix table width and coloring for this process from the global flags.
pub fn configure(flags: &GlobalFlags) {
    let _ = TABLE_OPTIONS.set(table_options(
        flags,
        std::io::stdout().is_terminal(),
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var("COLUMNS").ok().as_deref(),
    ));
}

fn table_options(
    flags: &GlobalFlags,
    stdout_is_tty: bool,
    no_color: bool,
    columns: Option<&str>,
) -> table::TableOptions {
    table::TableOptions {
        max_width: table::terminal_width(columns),
        color: flags.format == OutputFormat::Table
            && !flags.quiet
            && flags.color.enabled(stdout_is_tty, no_color),
    }
}

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(&serde_json::to_value(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn options() -> table::TableOptions {
    TABLE_OPTIONS.get().copied().unwrap_or_default()
}

fn render_table(value: &Value) -> anyhow::Result<String> {
    match value {
        Value::Array(items) => Ok(render_rows(items)),
        Value::Object(map) => {
            let rows = flatten_object("", map)
                .into_iter()
                .map(|(key, cell)| vec![key, cell])
                .collect::<Vec<_>>();
            Ok(table::render_table(&["key", "value"], &rows, options()))
        }
        scalar => Ok(table::render_table(
            &["value"],
            &[vec![value_to_cell(scalar)]],
            options(),
        )),
    }
}

/// One row per array item; columns are the union of object keys in first-seen order.
fn render_rows(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    let mut headers: Vec<&str> = Vec::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }
    if headers.is_empty() {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_table(&["value"], &rows, options());
    }

    let rows = items
        .iter()
        .map(|item| {
            headers
                .iter()
                .map(|header| {
                    item.get(header)
                        .map_or_else(|| String::from("-"), value_to_cell)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    table::render_table(&headers, &rows, options())
}

/// Flatten nested objects into dotted keys, e.g. `kinds.report.total`.
fn flatten_object(prefix: &str, map: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => entries.extend(flatten_object(&path, inner)),
            other => entries.push((path, value_to_cell(other))),
        }
    }
    entries
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::{render, table_options};
    use crate::cli::{ColorMode, GlobalFlags, OutputFormat};

    fn flags(format: OutputFormat, color: ColorMode) -> GlobalFlags {
        GlobalFlags {
            format,
            limit: None,
            quiet: false,
            verbose: false,
            color,
            project: None,
            entities: None,
            alerts_out: None,
        }
    }

    #[test]
    fn auto_color_needs_a_terminal_and_no_opt_out() {
        let table = flags(OutputFormat::Table, ColorMode::Auto);
        assert!(table_options(&table, true, false, None).color);
        assert!(!table_options(&table, false, false, None).color);
        assert!(!table_options(&table, true, true, None).color);
    }

    #[test]
    fn color_applies_to_tables_only() {
        let json = flags(OutputFormat::Json, ColorMode::Always);
        assert!(!table_options(&json, true, false, None).color);

        let forced = flags(OutputFormat::Table, ColorMode::Always);
        let options = table_options(&forced, false, true, Some("100"));
        assert!(options.color);
        assert_eq!(options.max_width, Some(100));
    }

    #[derive(Serialize)]
    struct Totals {
        total: u32,
        in_alert: u32,
    }

    #[derive(Serialize)]
    struct Summary {
        kind: &'static str,
        totals: Totals,
    }

    fn summary() -> Summary {
        Summary {
            kind: "report",
            totals: Totals {
                total: 4,
                in_alert: 1,
            },
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&summary(), OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["kind"], "report");
        assert_eq!(parsed["totals"]["total"], 4);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&summary(), OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_flattens_nested_objects() {
        let out = render(&summary(), OutputFormat::Table).expect("table render should work");
        assert!(out.lines().next().is_some_and(|line| line.contains("key")));
        assert!(out.contains("totals.in_alert"));
        assert!(out.contains("totals.total"));
    }

    #[test]
    fn table_render_for_array_uses_item_keys() {
        let rows = vec![summary(), summary()];
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        let header = out.lines().next().unwrap();
        assert!(header.contains("kind"));
        assert!(header.contains("totals"));
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn empty_array_renders_placeholder() {
        let rows: Vec<Summary> = Vec::new();
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        assert_eq!(out, "(no rows)");
    }
}
