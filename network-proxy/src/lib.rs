//! Environment-driven global HTTP proxy
//!
//! Call [`init_global_proxy`] once at startup, before any outbound request.
//! When one of `HTTPS_PROXY`, `https_proxy`, `HTTP_PROXY`, `http_proxy`,
//! `ALL_PROXY` or `all_proxy` holds a value, [`global_client`] from then on
//! routes every request through that proxy. Later calls do nothing.

use std::sync::atomic::AtomicBool;

use envproxy_config::ProxyConfig;
use envproxy_env::ProcessEnv;

pub mod dispatcher;
pub mod error;
pub mod initializer;
pub mod lookup;
pub mod transport;

pub use dispatcher::{Dispatcher, TransportRegistry, global_client, global_proxy};
pub use error::{ProxyError, Result};
pub use initializer::{InitOutcome, ProxyInitializer};
pub use lookup::{PROXY_ENV_VARS, ProxyUrl, proxy_url, proxy_url_from_env};
pub use transport::{ReqwestTransportFactory, Transport, TransportFactory};

static PROXY_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Install the environment proxy for the whole process with default settings.
pub fn init_global_proxy() {
  init_global_proxy_with_config(&ProxyConfig::default());
}

/// Install the environment proxy for the whole process.
///
/// Only the first call across both entry points has any effect. Errors are
/// logged, never returned; the process keeps its direct client.
pub fn init_global_proxy_with_config(config: &ProxyConfig) {
  ProxyInitializer::new(
    &PROXY_INITIALIZED,
    ProcessEnv,
    ReqwestTransportFactory::new(config.clone()),
    dispatcher::global(),
  )
  .enabled(config.enabled)
  .run();
}
