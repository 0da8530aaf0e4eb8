use anyhow::Result;
use capsync_core::{OutcomeKind, OutcomeRecord, RemotePolicy, Summary};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// JSON or YAML rendering of any serializable value.
fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let value = serde_json::to_value(value)?;
    match format {
        OutputFormat::Yaml => println!("{}", format_yaml(&value, 0)),
        _ => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}

pub fn print_summary(summary: &Summary, format: OutputFormat, dry_run: bool) -> Result<()> {
    if !matches!(format, OutputFormat::Table) {
        return print_structured(summary, format);
    }

    let mut builder = Builder::default();
    builder.push_record(["File", "Policy", "Outcome", "ID", "Detail"]);
    for record in &summary.records {
        builder.push_record([
            record.file.clone(),
            record.display_name.clone().unwrap_or_else(|| "-".into()),
            colored_kind(record.kind).to_string(),
            record.id.clone().unwrap_or_else(|| "-".into()),
            detail(record),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    let counts: Vec<String> = OutcomeKind::ALL
        .iter()
        .filter(|k| summary.count(**k) > 0)
        .map(|k| format!("{} {}", summary.count(*k), k))
        .collect();
    println!("{}: {} ({})", "Total".cyan(), summary.total, counts.join(", "));

    if dry_run {
        println!("{}", "Dry run: no changes were made.".cyan());
    }
    Ok(())
}

fn detail(record: &OutcomeRecord) -> String {
    record
        .error
        .clone()
        .or_else(|| record.preview.clone())
        .unwrap_or_default()
}

fn colored_kind(kind: OutcomeKind) -> ColoredString {
    match kind {
        OutcomeKind::Created | OutcomeKind::Updated => kind.as_str().green(),
        OutcomeKind::Failed | OutcomeKind::InvalidDocument => kind.as_str().red(),
        OutcomeKind::ExistsSkipped | OutcomeKind::UserSkipped => kind.as_str().yellow(),
        OutcomeKind::SimulatedCreate
        | OutcomeKind::SimulatedUpdate
        | OutcomeKind::SimulatedExistsSkipped => kind.as_str().cyan(),
    }
}

pub fn print_policies(policies: &[RemotePolicy], format: OutputFormat) -> Result<()> {
    if !matches!(format, OutputFormat::Table) {
        return print_structured(&policies, format);
    }
    if policies.is_empty() {
        println!("No policies found.");
        return Ok(());
    }
    let mut builder = Builder::default();
    builder.push_record(["ID", "DisplayName", "State"]);
    for p in policies {
        builder.push_record([
            p.id.as_str(),
            p.display_name.as_deref().unwrap_or("-"),
            p.state.as_deref().unwrap_or("-"),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));
    println!("Total: {}", policies.len());
    Ok(())
}

/// Template file → tokens it uses, and whether each one already has a value.
#[derive(Serialize)]
pub struct TemplatePlaceholders {
    pub file: String,
    pub tokens: Vec<TokenStatus>,
}

#[derive(Serialize)]
pub struct TokenStatus {
    pub token: String,
    pub seeded: bool,
}

pub fn print_placeholders(items: &[TemplatePlaceholders], format: OutputFormat) -> Result<()> {
    if !matches!(format, OutputFormat::Table) {
        return print_structured(&items, format);
    }
    let mut builder = Builder::default();
    builder.push_record(["File", "Placeholder", "Value"]);
    for item in items {
        for t in &item.tokens {
            let value = if t.seeded {
                "configured".green()
            } else {
                "prompt".yellow()
            };
            builder.push_record([item.file.clone(), t.token.clone(), value.to_string()]);
        }
    }
    println!("{}", builder.build().with(Style::rounded()));
    Ok(())
}

fn format_yaml(value: &Value, indent: usize) -> String {
    let prefix = " ".repeat(indent);
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.contains('\n') {
                format!(
                    "|\n{}{}",
                    " ".repeat(indent + 2),
                    s.replace('\n', &format!("\n{}", " ".repeat(indent + 2)))
                )
            } else {
                serde_json::to_string(s).unwrap_or_default()
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
    fn yaml_renders_nested_summary() {
        let value = json!({
            "total": 1,
            "index_degraded": false,
            "records": [{"file": "01.json", "kind": "created"}]
        });
        let yaml = format_yaml(&value, 0);
        assert!(yaml.contains("total: 1"));
        assert!(yaml.contains("index_degraded: false"));
        assert!(yaml.contains("records:\n  - file: \"01.json\""));
    }

    #[test]
    fn yaml_quotes_strings_with_special_characters() {
        assert_eq!(format_yaml(&json!("a: \"b\""), 0), r#""a: \"b\"""#);
        assert_eq!(format_yaml(&json!([]), 0), "[]");
    }
}
