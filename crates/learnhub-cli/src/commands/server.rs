use anyhow::Result;
use colored::Colorize;
use learnhub_gateway::Gateway;

use crate::cli::OutputFormat;
use crate::output::{print_field, print_value};

pub async fn status(gateway: &Gateway, server: &str) -> Result<()> {
    match gateway.health_check().await {
        Ok(body) => {
            println!("{} {} is {}", "✓".green(), server.cyan(), "reachable".green());
            if let Some(message) = body.get("message").and_then(|v| v.as_str()) {
                println!("  {message}");
            }
        }
        Err(e) => {
            let code = e
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| e.kind.to_string());
            println!(
                "{} {} returned {} {}",
                "✗".red(),
                server.cyan(),
                code.red(),
                e.message
            );
            anyhow::bail!("{server} is not healthy");
        }
    }
    Ok(())
}

pub async fn stats(gateway: &Gateway, format: OutputFormat) -> Result<()> {
    let stats = gateway.statistics().await;
    if matches!(format, OutputFormat::Table) {
        print_field("Courses", stats.total_courses);
        print_field("Cohorts", stats.total_cohorts);
        print_field("Teams", stats.total_teams);
    } else {
        print_value(&serde_json::to_value(stats)?, format);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use learnhub_gateway::{GatewayConfig, NoopNavigator, SessionStore};

    use super::*;

    #[tokio::test]
    async fn test_status_fails_when_backend_is_down() {
        let gateway = Gateway::connect(
            &GatewayConfig::new("http://127.0.0.1:1"),
            Arc::new(SessionStore::in_memory()),
            Arc::new(NoopNavigator),
        )
        .unwrap();

        let err = status(&gateway, "http://127.0.0.1:1").await.unwrap_err();
        assert!(err.to_string().contains("not healthy"), "{err}");
    }
}
