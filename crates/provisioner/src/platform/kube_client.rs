use std::path::Path;

use error_stack::ResultExt;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use kube::Client;
use kube::Config;

use crate::error::ProvisionError;
use crate::error::ProvisionResult;

/// Build a client from a kubeconfig file.
///
/// Without an explicit path the default per-user location is read
/// (`$KUBECONFIG`, else `~/.kube/config`). Nothing is sent over the network.
///
/// # Errors
///
/// - [`ProvisionError::Config`] if the kubeconfig cannot be read or parsed
/// - [`ProvisionError::Connection`] if no client can be built from it
pub async fn init_kube_client(kubeconfig: Option<&Path>) -> ProvisionResult<Client> {
    let kubeconfig = match kubeconfig {
        Some(kubeconfig_path) => {
            Kubeconfig::read_from(kubeconfig_path).change_context(ProvisionError::Config {
                message: format!(
                    "Failed to read kubeconfig file: {}",
                    kubeconfig_path.display()
                ),
            })?
        }
        None => Kubeconfig::read().change_context(ProvisionError::Config {
            message: "Failed to read kubeconfig from the default location".to_string(),
        })?,
    };

    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .change_context(ProvisionError::Config {
            message: "Failed to create config from kubeconfig".to_string(),
        })?;

    tracing::debug!(cluster_url = %config.cluster_url, namespace = %config.default_namespace, "Loaded kubeconfig");

    Client::try_from(config).change_context(ProvisionError::Connection {
        message: "Failed to create Kubernetes client from kubeconfig".to_string(),
    })
}
