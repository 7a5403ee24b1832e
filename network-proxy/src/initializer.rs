//! One-shot installation of the environment proxy

use std::sync::atomic::{AtomicBool, Ordering};

use envproxy_env::EnvSource;
use tracing::{debug, error, info};

use crate::dispatcher::TransportRegistry;
use crate::error::ProxyError;
use crate::lookup::{ProxyUrl, proxy_url_from_env};
use crate::transport::TransportFactory;

/// Log target for initializer messages.
pub const LOG_TARGET: &str = "proxy";

/// What a call to [`ProxyInitializer::run`] did.
#[derive(Debug)]
pub enum InitOutcome {
  /// The latch was already set; nothing happened
  AlreadyInitialized,
  /// Proxy installation is switched off in the configuration
  Disabled,
  /// None of the proxy variables held a value
  NoProxyConfigured,
  /// The proxying transport is now the default
  Installed { url: String, source: &'static str },
  /// Building or registering the transport failed; it was logged
  Failed { url: String, error: ProxyError },
}

impl InitOutcome {
  pub fn is_installed(&self) -> bool {
    matches!(self, Self::Installed { .. })
  }
}

/// Installs the environment proxy at most once per latch.
///
/// The latch is flipped before anything else is attempted, so a failed
/// attempt is never retried. Failures are logged and swallowed.
pub struct ProxyInitializer<'a, E, F, R> {
  latch: &'a AtomicBool,
  env: E,
  factory: F,
  registry: R,
  enabled: bool,
}

impl<'a, E, F, R> ProxyInitializer<'a, E, F, R>
where
  E: EnvSource,
  F: TransportFactory,
  R: TransportRegistry<F::Transport>,
{
  pub fn new(latch: &'a AtomicBool, env: E, factory: F, registry: R) -> Self {
    Self {
      latch,
      env,
      factory,
      registry,
      enabled: true,
    }
  }

  /// Skip installation while still consuming the latch.
  pub fn enabled(mut self, enabled: bool) -> Self {
    self.enabled = enabled;
    self
  }

  pub fn run(&self) -> InitOutcome {
    if self.latch.swap(true, Ordering::AcqRel) {
      return InitOutcome::AlreadyInitialized;
    }

    if !self.enabled {
      debug!(target: LOG_TARGET, "global proxy disabled by configuration");
      return InitOutcome::Disabled;
    }

    let Some(ProxyUrl { value: url, source }) = proxy_url_from_env(&self.env) else {
      return InitOutcome::NoProxyConfigured;
    };

    match self.install(&url) {
      Ok(()) => {
        info!(target: LOG_TARGET, "global proxy enabled: {url}");
        InitOutcome::Installed { url, source }
      }
      Err(err) => {
        error!(target: LOG_TARGET, "failed to set global proxy: {err}");
        InitOutcome::Failed { url, error: err }
      }
    }
  }

  fn install(&self, url: &str) -> Result<(), ProxyError> {
    let transport = self.factory.build(url)?;
    self.registry.install(transport)
  }
}
