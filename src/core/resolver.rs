use crate::domain::model::{Account, ApiMessage};
use crate::domain::ports::ApiTransport;
use crate::utils::error::{DeployError, Result};

pub const ACCOUNTS_PATH: &str = "/accounts";

/// Discovers the accounts the API token can act on.
pub struct AccountResolver<'a, T: ApiTransport> {
    transport: &'a T,
}

impl<'a, T: ApiTransport> AccountResolver<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Accounts in the order the service returned them.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        println!("🔍 Fetching Cloudflare accounts...");

        let reply = self.transport.get(ACCOUNTS_PATH).await?;
        if reply.status != 200 {
            println!("❌ Error: {}", reply.status);
            println!("Response: {}", reply.body);
            return Err(DeployError::UnexpectedStatus {
                endpoint: ACCOUNTS_PATH.to_string(),
                status: reply.status,
                body: reply.body,
            });
        }

        let envelope = reply.envelope::<Vec<Account>>()?;
        if !envelope.success {
            println!("❌ API Error: {}", ApiMessage::join(&envelope.errors));
            return Err(DeployError::Api {
                endpoint: ACCOUNTS_PATH.to_string(),
                errors: envelope.errors,
            });
        }

        println!("✅ Connected to Cloudflare!");
        let accounts = envelope.result.unwrap_or_default();
        tracing::debug!(count = accounts.len(), "Accounts resolved");
        Ok(accounts)
    }

    /// The first account returned. There is no selection beyond that.
    pub async fn resolve_default(&self) -> Result<Account> {
        let mut accounts = self.list_accounts().await?;
        if accounts.is_empty() {
            println!("❌ No accounts found");
            return Err(DeployError::NoAccounts);
        }

        if accounts.len() > 1 {
            tracing::warn!(
                count = accounts.len(),
                chosen = %accounts[0].id,
                "Token can see several accounts; using the first one"
            );
        }

        Ok(accounts.swap_remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::CloudflareClient;
    use crate::config::{ApiSettings, Secret};
    use crate::core::retry::RetryPolicy;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> CloudflareClient {
        let settings = ApiSettings {
            base_url: server.base_url(),
            token: Secret::new("test-token"),
            timeout_seconds: Some(5),
        };
        CloudflareClient::new(&settings, RetryPolicy::none()).unwrap()
    }

    #[tokio::test]
    async fn test_accounts_returned_in_service_order() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/accounts");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "success": true,
                    "errors": [],
                    "messages": [],
                    "result": [
                        {"id": "acct-b", "name": "Second Alphabetically", "type": "standard"},
                        {"id": "acct-a", "name": "First Alphabetically"}
                    ]
                }));
        });

        let client = client(&server);
        let accounts = AccountResolver::new(&client).list_accounts().await.unwrap();

        api_mock.assert();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, "acct-b");
        assert_eq!(accounts[1].name, "First Alphabetically");
    }

    #[tokio::test]
    async fn test_resolve_default_takes_first_account_verbatim() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/accounts");
            then.status(200).json_body(serde_json::json!({
                "success": true,
                "result": [
                    {"id": "023e105f4ecef8ad9ca31a8372d0c353", "name": "Primary"},
                    {"id": "other", "name": "Other"}
                ]
            }));
        });

        let client = client(&server);
        let account = AccountResolver::new(&client).resolve_default().await.unwrap();

        assert_eq!(account.id, "023e105f4ecef8ad9ca31a8372d0c353");
        assert_eq!(account.name, "Primary");
    }

    #[tokio::test]
    async fn test_non_200_status_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/accounts");
            then.status(403).body(r#"{"success":false}"#);
        });

        let client = client(&server);
        let err = AccountResolver::new(&client).list_accounts().await.unwrap_err();

        match err {
            DeployError::UnexpectedStatus {
                endpoint,
                status,
                body,
            } => {
                assert_eq!(endpoint, "/accounts");
                assert_eq!(status, 403);
                assert_eq!(body, r#"{"success":false}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_false_returns_structured_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/accounts");
            then.status(200).json_body(serde_json::json!({
                "success": false,
                "result": null,
                "errors": [{"code": 9109, "message": "Invalid access token"}]
            }));
        });

        let client = client(&server);
        let err = AccountResolver::new(&client).list_accounts().await.unwrap_err();

        match err {
            DeployError::Api { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].code, 9109);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_account_list_is_no_accounts() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/accounts");
            then.status(200)
                .json_body(serde_json::json!({"success": true, "result": []}));
        });

        let client = client(&server);
        let resolver = AccountResolver::new(&client);

        assert!(resolver.list_accounts().await.unwrap().is_empty());
        let err = resolver.resolve_default().await.unwrap_err();
        assert!(matches!(err, DeployError::NoAccounts));
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_serialization_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/accounts");
            then.status(200).body("<html>gateway</html>");
        });

        let client = client(&server);
        let err = AccountResolver::new(&client).list_accounts().await.unwrap_err();
        assert!(matches!(err, DeployError::Serialization(_)));
    }
}
