use crate::constants::DEFAULT_REGION;
use aws_config::default_provider::credentials::default_provider;
use aws_config::sts::AssumeRoleProvider;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_smithy_types::retry::{RetryConfig, RetryMode};
use aws_types::region::Region;
use aws_types::SdkConfig;
use log::info;

/// Set up the config for aws calls, assuming the role named by `assume_role`
/// first if one is provided. Credential resolution otherwise follows the
/// default provider chain.
pub async fn sdk_config(region: &Option<String>, assume_role: &Option<String>) -> SdkConfig {
    let region = region
        .as_ref()
        .unwrap_or(&DEFAULT_REGION.to_string())
        .to_string();
    info!(
        "Creating a custom region provider for '{}' to be used in the aws config.",
        region
    );

    let config_loader = aws_config::from_env().retry_config(
        RetryConfig::standard()
            .with_retry_mode(RetryMode::Adaptive)
            .with_max_attempts(15),
    );

    let base_provider = SharedCredentialsProvider::new(default_provider().await);
    let config_loader = match assume_role {
        Some(role_arn) => {
            info!("Assuming role '{}' for control-plane calls.", role_arn);
            config_loader.credentials_provider(SharedCredentialsProvider::new(
                AssumeRoleProvider::builder(role_arn)
                    .region(Region::new(region.clone()))
                    .session_name("neptune-cloner")
                    .build(base_provider),
            ))
        }
        None => config_loader.credentials_provider(base_provider),
    };

    config_loader.region(Region::new(region)).load().await
}
