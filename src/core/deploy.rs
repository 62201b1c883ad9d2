use crate::core::provisioner::ProjectProvisioner;
use crate::core::resolver::AccountResolver;
use crate::domain::model::{Account, Project, ProjectDescriptor};
use crate::domain::ports::ApiTransport;
use crate::utils::error::{DeployError, Result};
use std::fmt;

/// Progress of one provisioning run. `Failed` is terminal, as is `ProjectCreated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStage {
    Start,
    AccountsResolved,
    ProjectCreated,
    Failed,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeployStage::Start => "start",
            DeployStage::AccountsResolved => "accounts-resolved",
            DeployStage::ProjectCreated => "project-created",
            DeployStage::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub account: Account,
    pub project: Project,
    pub already_existed: bool,
}

/// What a real run would submit. Env var values are already masked.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub account: Account,
    pub descriptor: ProjectDescriptor,
}

pub struct DeployEngine<T: ApiTransport> {
    transport: T,
    descriptor: ProjectDescriptor,
    stage: DeployStage,
}

impl<T: ApiTransport> DeployEngine<T> {
    pub fn new(transport: T, descriptor: ProjectDescriptor) -> Self {
        Self {
            transport,
            descriptor,
            stage: DeployStage::Start,
        }
    }

    pub fn stage(&self) -> DeployStage {
        self.stage
    }

    pub fn descriptor(&self) -> &ProjectDescriptor {
        &self.descriptor
    }

    fn advance(&mut self, next: DeployStage) {
        tracing::debug!(from = %self.stage, to = %next, "Deploy stage transition");
        self.stage = next;
    }

    async fn resolve_account(&mut self) -> Result<Account> {
        let resolved = AccountResolver::new(&self.transport).resolve_default().await;
        match resolved {
            Ok(account) => {
                println!("✅ Using account: {} ({})", account.name, account.id);
                self.advance(DeployStage::AccountsResolved);
                Ok(account)
            }
            Err(e) => {
                if !matches!(e, DeployError::NoAccounts) {
                    println!("\n❌ Failed to connect to Cloudflare");
                }
                self.advance(DeployStage::Failed);
                Err(e)
            }
        }
    }

    /// Resolves the account, then provisions the project in it.
    /// The provisioner is only reached once an account id is known.
    pub async fn run(&mut self) -> Result<DeployOutcome> {
        self.stage = DeployStage::Start;
        let account = self.resolve_account().await?;

        let provisioned = ProjectProvisioner::new(&self.transport, &self.descriptor)
            .provision(&account.id)
            .await;

        match provisioned {
            Ok(outcome) => {
                self.advance(DeployStage::ProjectCreated);
                Ok(DeployOutcome {
                    already_existed: outcome.already_existed(),
                    project: outcome.into_project(),
                    account,
                })
            }
            Err(e) => {
                println!("\n❌ Failed to create Pages project");
                self.advance(DeployStage::Failed);
                Err(e)
            }
        }
    }

    /// Dry run: resolves the account and returns the masked request without creating anything.
    pub async fn plan(&mut self) -> Result<DeployPlan> {
        self.stage = DeployStage::Start;
        let account = self.resolve_account().await?;
        Ok(DeployPlan {
            account,
            descriptor: self.descriptor.redacted(),
        })
    }
}
