use anyhow::{Context, Result};
use colored::Colorize;
use learnhub_gateway::{DashboardViewState, Gateway, Role, StatusLevel, resources_for};
use serde_json::{Map, Value, json};

use crate::cli::OutputFormat;
use crate::output::{print_error, print_field, print_items, print_value};

/// Loads the dashboard of `role`, falling back to the logged-in principal's role.
pub async fn show(gateway: &Gateway, role: Option<Role>, format: OutputFormat) -> Result<()> {
    let role = match role {
        Some(role) => role,
        None => gateway
            .session()
            .current()
            .map(|s| s.principal.role)
            .context("Not logged in; pass --role or run `learnhub login`")?,
    };

    let mut state = DashboardViewState::new(role);
    state.load(gateway).await;

    if matches!(format, OutputFormat::Table) {
        print_field("Dashboard", role);
        if let Some(stats) = state.statistics {
            print_field(
                "Totals",
                format!(
                    "{} courses, {} cohorts, {} teams",
                    stats.total_courses, stats.total_cohorts, stats.total_teams
                ),
            );
        }
        for resource in resources_for(role) {
            println!("\n{}", resource.name().bold());
            print_items(state.entities(*resource), format);
        }
    } else {
        let mut entities = Map::new();
        for (resource, items) in &state.entities {
            entities.insert(resource.name().to_string(), Value::Array(items.clone()));
        }
        print_value(
            &json!({
                "role": role,
                "statistics": state.statistics,
                "entities": entities,
            }),
            format,
        );
    }

    match state.status {
        Some(status) if status.level == StatusLevel::Error => print_error(&status.text),
        Some(status) => eprintln!("{}", status.text.dimmed()),
        None => {}
    }
    Ok(())
}
