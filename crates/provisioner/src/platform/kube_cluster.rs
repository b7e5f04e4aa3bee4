use async_trait::async_trait;
use error_stack::Report;
use k8s_openapi::api::apps::v1::Deployment;
use kube::api::DynamicObject;
use kube::api::PostParams;
use kube::Api;
use kube::Client;
use tracing::debug;

use crate::error::ProvisionError;
use crate::error::ProvisionResult;
use crate::platform::ClusterClient;
use crate::platform::Submitted;
use crate::resources::autoscaler;
use crate::resources::version::AUTOSCALING_GROUP;
use crate::resources::AutoscalingPolicySpec;
use crate::resources::AutoscalingVersion;
use crate::resources::WorkloadSpec;
use crate::resources::AUTOSCALER_KIND;
use crate::resources::WORKLOAD_KIND;

/// [`ClusterClient`] backed by a live API server.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterClient for KubeCluster {
    async fn create_workload(&self, spec: &WorkloadSpec) -> ProvisionResult<Submitted> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), &spec.namespace);

        let created = api
            .create(&PostParams::default(), &spec.to_deployment())
            .await
            .map_err(|e| into_report(e, WORKLOAD_KIND, &spec.name, None))?;

        debug!(
            name = %spec.name,
            namespace = %spec.namespace,
            uid = ?created.metadata.uid,
            "Deployment accepted by API server"
        );

        Ok(Submitted {
            kind: WORKLOAD_KIND.to_string(),
            api_version: "apps/v1".to_string(),
            name: spec.name.clone(),
            namespace: spec.namespace.clone(),
        })
    }

    async fn create_autoscaler(
        &self,
        spec: &AutoscalingPolicySpec,
        version: AutoscalingVersion,
    ) -> ProvisionResult<Submitted> {
        let ar = autoscaler::api_resource(version);
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), &spec.namespace, &ar);

        let created = api
            .create(&PostParams::default(), &spec.to_dynamic_object(version))
            .await
            .map_err(|e| into_report(e, AUTOSCALER_KIND, &spec.name, Some(version)))?;

        debug!(
            name = %spec.name,
            namespace = %spec.namespace,
            api_version = %ar.api_version,
            uid = ?created.metadata.uid,
            "HorizontalPodAutoscaler accepted by API server"
        );

        Ok(Submitted {
            kind: AUTOSCALER_KIND.to_string(),
            api_version: ar.api_version,
            name: spec.name.clone(),
            namespace: spec.namespace.clone(),
        })
    }

    async fn served_autoscaling_versions(&self) -> ProvisionResult<Vec<String>> {
        match kube::discovery::group(&self.client, AUTOSCALING_GROUP).await {
            Ok(group) => Ok(group.versions().map(str::to_string).collect()),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(Vec::new()),
            Err(e) => Err(into_report(e, "APIGroup", AUTOSCALING_GROUP, None)),
        }
    }
}

/// Map a kube error onto the provisioning taxonomy, keeping the cause.
fn into_report(
    err: kube::Error,
    kind: &str,
    name: &str,
    version: Option<AutoscalingVersion>,
) -> Report<ProvisionError> {
    let context = classify(&err, kind, name, version);
    Report::new(err).change_context(context)
}

/// Classify a kube error.
///
/// A 404 on a create can only mean the collection path itself is unknown,
/// which for the versioned autoscaler path means the version is not served.
pub(crate) fn classify(
    err: &kube::Error,
    kind: &str,
    name: &str,
    version: Option<AutoscalingVersion>,
) -> ProvisionError {
    let kind = kind.to_string();
    let name = name.to_string();

    let kube::Error::Api(response) = err else {
        return ProvisionError::Connection {
            message: err.to_string(),
        };
    };

    let message = response.message.clone();
    match (response.code, version) {
        (409, _) => ProvisionError::Conflict {
            kind,
            name,
            message,
        },
        (400 | 422, _) => ProvisionError::Validation {
            kind,
            name,
            message,
        },
        (404, Some(version)) => ProvisionError::UnsupportedVersion {
            version: version.to_string(),
            message,
        },
        (401 | 403, _) => ProvisionError::Connection { message },
        (code, _) => ProvisionError::Rejected {
            kind,
            name,
            code,
            message,
        },
    }
}
