use crate::core::deploy::{DeployOutcome, DeployPlan};
use crate::domain::model::Project;
use crate::utils::error::Result;

pub const DASHBOARD_URL: &str = "https://dash.cloudflare.com/pages";
const PAGES_DOMAIN: &str = ".pages.dev";
const NOT_AVAILABLE: &str = "N/A";

fn rule() -> String {
    "=".repeat(60)
}

pub fn print_banner() {
    println!("{}", rule());
    println!("🚀 CLOUDFLARE PAGES DEPLOYMENT");
    println!("{}", rule());
}

/// `<subdomain>.pages.dev`. Newer API versions already return the full host.
pub fn project_url(project: &Project) -> String {
    match project.subdomain.as_deref() {
        Some(host) if host.ends_with(PAGES_DOMAIN) => host.to_string(),
        Some(subdomain) => format!("{}{}", subdomain, PAGES_DOMAIN),
        None => format!("{}{}", NOT_AVAILABLE, PAGES_DOMAIN),
    }
}

pub fn deployment_status(project: &Project) -> &str {
    project.production_environment().unwrap_or(NOT_AVAILABLE)
}

pub fn format_summary(outcome: &DeployOutcome) -> String {
    let project = &outcome.project;
    let headline = if outcome.already_existed {
        "✅ PROJECT ALREADY PROVISIONED"
    } else {
        "✅ DEPLOYMENT COMPLETE!"
    };

    let mut lines = vec![
        String::new(),
        rule(),
        headline.to_string(),
        rule(),
        String::new(),
        "📊 Project Details:".to_string(),
        format!("  Name: {}", project.name),
        format!("  ID: {}", project.id),
        format!("  URL: {}", project_url(project)),
        format!("  Status: {}", deployment_status(project)),
        String::new(),
    ];
    if !outcome.already_existed {
        lines.push("🔄 First deployment will start automatically!".to_string());
    }
    lines.push(format!("⏱️  Check deployment status at: {}", DASHBOARD_URL));

    lines.join("\n")
}

pub fn print_summary(outcome: &DeployOutcome) {
    println!("{}", format_summary(outcome));
}

pub fn format_plan(plan: &DeployPlan) -> Result<String> {
    let body = serde_json::to_string_pretty(&plan.descriptor)?;
    Ok(format!(
        "🔍 DRY RUN - nothing was created\n\nPOST /accounts/{}/pages/projects\n{}",
        plan.account.id, body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Account, DeploymentConfig, DeploymentConfigs};

    fn project(subdomain: Option<&str>) -> Project {
        Project {
            name: "moimutapiliet".to_string(),
            id: "proj1".to_string(),
            subdomain: subdomain.map(str::to_string),
            deployment_configs: None,
        }
    }

    fn outcome(project: Project, already_existed: bool) -> DeployOutcome {
        DeployOutcome {
            account: Account {
                id: "acct1".to_string(),
                name: "Test".to_string(),
            },
            project,
            already_existed,
        }
    }

    #[test]
    fn test_project_url_appends_pages_domain() {
        assert_eq!(
            project_url(&project(Some("moimutapiliet-abc"))),
            "moimutapiliet-abc.pages.dev"
        );
    }

    #[test]
    fn test_project_url_keeps_full_host() {
        assert_eq!(
            project_url(&project(Some("moimutapiliet.pages.dev"))),
            "moimutapiliet.pages.dev"
        );
    }

    #[test]
    fn test_project_url_without_subdomain() {
        assert_eq!(project_url(&project(None)), "N/A.pages.dev");
    }

    #[test]
    fn test_deployment_status() {
        let mut with_env = project(None);
        with_env.deployment_configs = Some(DeploymentConfigs {
            production: Some(DeploymentConfig {
                environment: Some("production".to_string()),
            }),
        });

        assert_eq!(deployment_status(&with_env), "production");
        assert_eq!(deployment_status(&project(None)), "N/A");
    }

    #[test]
    fn test_summary_lists_project_details() {
        let summary = format_summary(&outcome(project(Some("moimutapiliet-abc")), false));

        assert!(summary.contains("DEPLOYMENT COMPLETE"));
        assert!(summary.contains("  Name: moimutapiliet"));
        assert!(summary.contains("  ID: proj1"));
        assert!(summary.contains("  URL: moimutapiliet-abc.pages.dev"));
        assert!(summary.contains("  Status: N/A"));
        assert!(summary.contains("First deployment will start"));
        assert!(summary.ends_with(DASHBOARD_URL));
    }

    #[test]
    fn test_summary_for_existing_project() {
        let summary = format_summary(&outcome(project(Some("site")), true));

        assert!(summary.contains("ALREADY PROVISIONED"));
        assert!(!summary.contains("First deployment"));
    }
}
