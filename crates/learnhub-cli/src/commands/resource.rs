use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use colored::Colorize;
use learnhub_gateway::{Gateway, Resource};
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;
use crate::output::{print_items, print_success, print_value};

fn parse_resource(name: &str) -> Result<Resource> {
    Ok(name.parse::<Resource>()?)
}

/// Splits `course/12` into the resource and the item id.
fn parse_reference(reference: &str) -> Result<(Resource, &str)> {
    match reference.split_once('/') {
        Some((name, id)) if !id.trim_matches('/').is_empty() => Ok((parse_resource(name)?, id)),
        _ => anyhow::bail!("Invalid reference \"{reference}\". Expected format: resource/id"),
    }
}

fn parse_params(params: &[String]) -> Result<Vec<(String, String)>> {
    params
        .iter()
        .map(|p| {
            p.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .with_context(|| format!("Invalid filter \"{p}\". Expected key=value"))
        })
        .collect()
}

fn read_body(file: &Option<String>) -> Result<Value> {
    let content = match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Invalid JSON")
}

fn id_of(value: &Value) -> String {
    match value.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    }
}

pub async fn list(
    gateway: &Gateway,
    resource: &str,
    params: &[String],
    format: OutputFormat,
) -> Result<()> {
    let resource = parse_resource(resource)?;
    let query = parse_params(params)?;
    let items = gateway.list_filtered(resource, &query).await?;
    print_items(&items, format);
    Ok(())
}

pub async fn get(gateway: &Gateway, reference: &str, format: OutputFormat) -> Result<()> {
    let (resource, id) = parse_reference(reference)?;
    let item = gateway.get(resource, id).await?;
    print_value(&item, format);
    Ok(())
}

pub async fn create(
    gateway: &Gateway,
    resource: &str,
    file: &Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let resource = parse_resource(resource)?;
    let body = read_body(file)?;
    let created = gateway.create(resource, &body).await?;
    print_success(&format!(
        "Created {}/{}",
        resource.name().cyan(),
        id_of(&created).cyan()
    ));
    print_value(&created, format);
    Ok(())
}

pub async fn update(
    gateway: &Gateway,
    reference: &str,
    file: &Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let (resource, id) = parse_reference(reference)?;
    let body = read_body(file)?;
    let updated = gateway.update(resource, id, &body).await?;
    print_success(&format!("Updated {}/{}", resource.name().cyan(), id.cyan()));
    print_value(&updated, format);
    Ok(())
}

pub async fn patch(
    gateway: &Gateway,
    reference: &str,
    file: &Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let (resource, id) = parse_reference(reference)?;
    let changes = read_body(file)?;
    let patched = gateway.patch(resource, id, &changes).await?;
    print_success(&format!("Patched {}/{}", resource.name().cyan(), id.cyan()));
    print_value(&patched, format);
    Ok(())
}

pub async fn delete(gateway: &Gateway, reference: &str) -> Result<()> {
    let (resource, id) = parse_reference(reference)?;
    gateway.delete(resource, id).await?;
    print_success(&format!("Deleted {}/{}", resource.name().cyan(), id.cyan()));
    Ok(())
}

/// Prints the resource registry: names, paths and supported operations.
pub fn resources(format: OutputFormat) {
    if !matches!(format, OutputFormat::Table) {
        let registry: Vec<Value> = Resource::ALL
            .iter()
            .map(|r| {
                let d = r.descriptor();
                serde_json::json!({
                    "name": d.name,
                    "path": d.path,
                    "operations": d.operations.iter().map(|op| op.as_str()).collect::<Vec<_>>(),
                })
            })
            .collect();
        print_value(&Value::Array(registry), format);
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Resource", "Path", "Operations"]);
    for resource in Resource::ALL {
        let d = resource.descriptor();
        let ops: Vec<&str> = d.operations.iter().map(|op| op.as_str()).collect();
        builder.push_record([d.name.to_string(), d.path.to_string(), ops.join(", ")]);
    }
    println!("{}", builder.build().with(Style::rounded()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference() {
        let (resource, id) = parse_reference("mentor-profile/7").unwrap();
        assert_eq!(resource, Resource::MentorProfile);
        assert_eq!(id, "7");

        assert!(parse_reference("course").is_err());
        assert!(parse_reference("course/").is_err());
        assert!(parse_reference("nope/1").is_err());
    }

    #[test]
    fn test_parse_params() {
        let params = parse_params(&["course=3".into(), "status=active".into()]).unwrap();
        assert_eq!(
            params,
            vec![
                ("course".to_string(), "3".to_string()),
                ("status".to_string(), "active".to_string())
            ]
        );
        assert!(parse_params(&["broken".into()]).is_err());
    }

    #[test]
    fn test_id_of() {
        assert_eq!(id_of(&serde_json::json!({"id": 4})), "4");
        assert_eq!(id_of(&serde_json::json!({"id": "abc"})), "abc");
        assert_eq!(id_of(&serde_json::json!({})), "?");
    }
}
