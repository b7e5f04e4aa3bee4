use std::path::PathBuf;

use clap::Parser;
use utils::version;

/// Create the nginx demo Deployment and its HorizontalPodAutoscaler.
#[derive(Parser, Debug)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[arg(
        long,
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file (defaults to $KUBECONFIG or ~/.kube/config)"
    )]
    pub kubeconfig: Option<PathBuf>,
}
