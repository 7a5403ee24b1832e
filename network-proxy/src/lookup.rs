//! Proxy URL discovery from environment variables

use envproxy_env::{EnvSource, ProcessEnv};

/// Variables consulted for the proxy URL, highest priority first.
pub const PROXY_ENV_VARS: [&str; 6] = [
  "HTTPS_PROXY",
  "https_proxy",
  "HTTP_PROXY",
  "http_proxy",
  "ALL_PROXY",
  "all_proxy",
];

/// Variables consulted for proxy exclusions.
pub const NO_PROXY_ENV_VARS: [&str; 2] = ["NO_PROXY", "no_proxy"];

/// A proxy URL together with the variable it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyUrl {
  pub value: String,
  pub source: &'static str,
}

/// First non-empty proxy URL in `env`, in [`PROXY_ENV_VARS`] order.
///
/// The value is returned verbatim; whether it is usable is decided by the
/// transport that consumes it.
pub fn proxy_url_from_env(env: &impl EnvSource) -> Option<ProxyUrl> {
  env
    .first_non_empty(&PROXY_ENV_VARS)
    .map(|(source, value)| ProxyUrl { value, source })
}

/// Proxy URL from the process environment
pub fn proxy_url() -> Option<ProxyUrl> {
  proxy_url_from_env(&ProcessEnv)
}

/// Comma separated exclusion list from `NO_PROXY` / `no_proxy`.
pub fn no_proxy_from_env(env: &impl EnvSource) -> Option<String> {
  env
    .first_non_empty(&NO_PROXY_ENV_VARS)
    .map(|(_, value)| value)
}
