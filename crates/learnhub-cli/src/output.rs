use crate::cli::OutputFormat;
use colored::Colorize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Fields tried, in order, for the "label" column of a table row.
const LABEL_FIELDS: &[&str] = &["name", "title", "full_name", "subject", "email"];

pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", pretty(value));
        }
        OutputFormat::Yaml => {
            println!("{}", format_yaml(value, 0));
        }
        OutputFormat::Table => {
            print_as_table(value);
        }
    }
}

pub fn print_items(items: &[Value], format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", render_table(items)),
        _ => print_value(&Value::Array(items.to_vec()), format),
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("{}: {}", label.cyan(), value);
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn print_as_table(value: &Value) {
    match value {
        Value::Array(items) => println!("{}", render_table(items)),
        _ => println!("{}", pretty(value)),
    }
}

pub fn render_table(items: &[Value]) -> String {
    if items.is_empty() {
        return "No records found.".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(["ID", "Label", "Fields"]);
    for item in items {
        let id = item.get("id").map(scalar).unwrap_or_else(|| "-".to_string());
        let label = LABEL_FIELDS
            .iter()
            .find_map(|f| item.get(*f).and_then(|v| v.as_str()))
            .unwrap_or("-")
            .to_string();
        let fields = item
            .as_object()
            .map(|o| o.len().to_string())
            .unwrap_or_else(|| "-".to_string());
        builder.push_record([id, label, fields]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    format!("{table}\nTotal: {}", items.len())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_yaml(value: &Value, indent: usize) -> String {
    let prefix = " ".repeat(indent);
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.contains('\n') || s.contains(':') || s.contains('#') {
                format!(
                    "|\n{}{}",
                    " ".repeat(indent + 2),
                    s.replace('\n', &format!("\n{}", " ".repeat(indent + 2)))
                )
            } else {
                format!("\"{s}\"")
            }
        }
        Value::Array(arr) => {
            if arr.is_empty() {
                return "[]".to_string();
            }
            let items: Vec<String> = arr
                .iter()
                .map(|v| format!("{prefix}- {}", format_yaml(v, indent + 2).trim_start()))
                .collect();
            format!("\n{}", items.join("\n"))
        }
        Value::Object(obj) => {
            if obj.is_empty() {
                return "{}".to_string();
            }
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| {
                    let val = format_yaml(v, indent + 2);
                    if val.starts_with('\n') {
                        format!("{prefix}{k}:{val}")
                    } else {
                        format!("{prefix}{k}: {val}")
                    }
                })
                .collect();
            if indent == 0 {
                items.join("\n")
            } else {
                format!("\n{}", items.join("\n"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_table_uses_label_fields() {
        let table = render_table(&[
            json!({"id": 1, "name": "Rust 101"}),
            json!({"id": "abc", "title": "Capstone", "done": false}),
        ]);
        assert!(table.contains("Rust 101"));
        assert!(table.contains("Capstone"));
        assert!(table.contains("abc"));
        assert!(table.ends_with("Total: 2"));
    }

    #[test]
    fn test_render_empty_table() {
        assert_eq!(render_table(&[]), "No records found.");
    }

    #[test]
    fn test_yaml_scalars() {
        assert_eq!(format_yaml(&json!({"a": 1, "b": "x"}), 0), "a: 1\nb: \"x\"");
        assert_eq!(format_yaml(&json!([]), 0), "[]");
    }
}
