use crate::domain::model::{ApiEnvelope, ApiMessage, Project, ProjectDescriptor};
use crate::domain::ports::ApiTransport;
use crate::utils::error::{DeployError, Result};

/// Error code the Pages API returns when the project name is already in use.
pub const PROJECT_NAME_TAKEN: i64 = 8000002;

pub fn projects_path(account_id: &str) -> String {
    format!("/accounts/{}/pages/projects", account_id)
}

pub fn project_path(account_id: &str, project_name: &str) -> String {
    format!("{}/{}", projects_path(account_id), project_name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created(Project),
    AlreadyExists(Project),
}

impl ProvisionOutcome {
    pub fn project(&self) -> &Project {
        match self {
            ProvisionOutcome::Created(project) | ProvisionOutcome::AlreadyExists(project) => {
                project
            }
        }
    }

    pub fn into_project(self) -> Project {
        match self {
            ProvisionOutcome::Created(project) | ProvisionOutcome::AlreadyExists(project) => {
                project
            }
        }
    }

    pub fn already_existed(&self) -> bool {
        matches!(self, ProvisionOutcome::AlreadyExists(_))
    }
}

/// Creates the Pages project described by a [`ProjectDescriptor`] in one account.
pub struct ProjectProvisioner<'a, T: ApiTransport> {
    transport: &'a T,
    descriptor: &'a ProjectDescriptor,
}

impl<'a, T: ApiTransport> ProjectProvisioner<'a, T> {
    pub fn new(transport: &'a T, descriptor: &'a ProjectDescriptor) -> Self {
        Self {
            transport,
            descriptor,
        }
    }

    /// Looks up a project with the descriptor's name. 404 means it does not exist yet.
    pub async fn find_existing(&self, account_id: &str) -> Result<Option<Project>> {
        let path = project_path(account_id, &self.descriptor.name);
        let reply = self.transport.get(&path).await?;

        match reply.status {
            404 => Ok(None),
            200 => {
                let envelope = reply.envelope::<Project>()?;
                if !envelope.success {
                    println!("❌ API Error: {}", ApiMessage::join(&envelope.errors));
                    return Err(DeployError::Api {
                        endpoint: path,
                        errors: envelope.errors,
                    });
                }
                match envelope.result {
                    Some(project) => Ok(Some(project)),
                    None => {
                        println!("❌ API Error: lookup succeeded without a project object");
                        Err(DeployError::Api {
                            endpoint: path,
                            errors: envelope.errors,
                        })
                    }
                }
            }
            status => {
                println!("❌ Error: {}", status);
                println!("Response: {}", reply.body);
                Err(DeployError::UnexpectedStatus {
                    endpoint: path,
                    status,
                    body: reply.body,
                })
            }
        }
    }

    pub async fn create(&self, account_id: &str) -> Result<Project> {
        println!("\n📝 Creating Pages project in account {}...", account_id);

        let path = projects_path(account_id);
        let payload = serde_json::to_value(self.descriptor)?;
        tracing::debug!(project = %self.descriptor.name, env_vars = self.descriptor.env_vars.len(), "Submitting project descriptor");

        let reply = self.transport.post_json(&path, &payload).await?;
        if !matches!(reply.status, 200 | 201) {
            println!("❌ Error: {}", reply.status);
            println!("Response: {}", reply.body);
            return Err(DeployError::UnexpectedStatus {
                endpoint: path,
                status: reply.status,
                body: reply.body,
            });
        }

        let envelope = reply.envelope::<Project>()?;
        match envelope.result {
            Some(project) if envelope.success => {
                println!("✅ Pages project created successfully!");
                Ok(project)
            }
            // success without a result object carries nothing to report on
            _ => {
                println!("❌ API Error: {}", ApiMessage::join(&envelope.errors));
                Err(DeployError::Api {
                    endpoint: path,
                    errors: envelope.errors,
                })
            }
        }
    }

    /// Creates the project unless one with the same name is already there.
    pub async fn provision(&self, account_id: &str) -> Result<ProvisionOutcome> {
        if let Some(existing) = self.find_existing(account_id).await? {
            println!(
                "\nℹ️  Pages project '{}' already exists in account {}, leaving it as is",
                existing.name, account_id
            );
            return Ok(ProvisionOutcome::AlreadyExists(existing));
        }

        match self.create(account_id).await {
            Ok(project) => Ok(ProvisionOutcome::Created(project)),
            Err(e) if name_taken(&e) => self.recover_from_collision(account_id, e).await,
            Err(e) => Err(e),
        }
    }

    /// A retried create can collide with the project its own first attempt made.
    async fn recover_from_collision(
        &self,
        account_id: &str,
        err: DeployError,
    ) -> Result<ProvisionOutcome> {
        tracing::warn!(project = %self.descriptor.name, error = %err, "Create reported a name collision, looking the project up again");
        match self.find_existing(account_id).await {
            Ok(Some(existing)) => {
                println!(
                    "\nℹ️  Pages project '{}' already exists in account {}, leaving it as is",
                    existing.name, account_id
                );
                Ok(ProvisionOutcome::AlreadyExists(existing))
            }
            Ok(None) => Err(err),
            Err(lookup_err) => {
                tracing::warn!(error = %lookup_err, "Second lookup failed");
                Err(err)
            }
        }
    }
}

fn has_code(errors: &[ApiMessage]) -> bool {
    errors.iter().any(|m| m.code == PROJECT_NAME_TAKEN)
}

fn name_taken(err: &DeployError) -> bool {
    match err {
        DeployError::Api { errors, .. } => has_code(errors),
        DeployError::UnexpectedStatus { status: 409, .. } => true,
        DeployError::UnexpectedStatus { body, .. } => {
            serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
                .map(|envelope| has_code(&envelope.errors))
                .unwrap_or(false)
        }
        _ => false,
    }
}
