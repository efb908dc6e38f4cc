//! AWS SDK client setup (Imperative Shell).

use aws_sdk_dynamodb::Client;
use copydata_core::storage::Result;

use super::error::map_list_tables_error;
use crate::config::EnvironmentConfig;

/// Creates a DynamoDB client for one environment.
///
/// Credentials come from the SDK default chain, narrowed to the named profile
/// when one is configured.
pub async fn create_client(config: &EnvironmentConfig) -> Client {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(profile) = &config.profile {
        sdk_config_loader = sdk_config_loader.profile_name(profile);
    }
    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    Client::new(&sdk_config)
}

/// Verifies that the client's credentials can reach DynamoDB.
pub async fn check_connection(client: &Client) -> Result<()> {
    client
        .list_tables()
        .limit(1)
        .send()
        .await
        .map_err(map_list_tables_error)?;
    Ok(())
}
