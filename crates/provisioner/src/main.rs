use std::process::ExitCode;

use clap::Parser;
use provisioner::config::Cli;
use provisioner::config::ProvisionConfig;
use provisioner::platform::kube_client::init_kube_client;
use provisioner::platform::KubeCluster;
use provisioner::reporter::TracingReporter;
use provisioner::ProvisionPlan;
use provisioner::ProvisioningDriver;
use utils::version;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

/// Every failure is logged exactly once where it happens, then the process
/// exits non-zero.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    setup_global_hooks();

    let cli = Cli::parse();
    utils::logging::init();

    tracing::info!("Starting provisioner {}", &**version::VERSION);

    let client = match init_kube_client(cli.kubeconfig.as_deref()).await {
        Ok(client) => client,
        Err(report) => {
            tracing::error!("Error building kubeconfig: {report:?}");
            return ExitCode::FAILURE;
        }
    };

    let config = ProvisionConfig::default();
    let plan = match ProvisionPlan::from_config(&config) {
        Ok(plan) => plan,
        Err(report) => {
            tracing::error!("Invalid provisioning config: {report:?}");
            return ExitCode::FAILURE;
        }
    };

    let cluster = KubeCluster::new(client);
    let reporter = TracingReporter;
    let mut driver = ProvisioningDriver::new(&cluster, &reporter);

    // the reporter has already logged the failure
    match driver.run(&plan).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
