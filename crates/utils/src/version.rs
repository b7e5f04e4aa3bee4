use std::sync::LazyLock;

/// Defines the application version.
///
/// Git metadata is optional: builds outside a checkout fall back to `unknown`.
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    format_version(
        env!("PROVISIONER_VERSION"),
        option_env!("VERGEN_GIT_SHA"),
        option_env!("VERGEN_GIT_DIRTY") == Some("true"),
    )
});

fn format_version(version: &str, commit_sha: Option<&str>, dirty: bool) -> String {
    format!(
        "{}-{}{}",
        version,
        commit_sha.unwrap_or("unknown"),
        if dirty { "-dirty" } else { "" }
    )
}
