//! Process-wide transport slot
//!
//! Every outbound request that should honor the environment proxy goes
//! through [`global_client`]. Until a transport is installed that is a plain
//! client which ignores proxy variables; after installation it is the
//! proxying client. The slot is written at most once.

use std::sync::OnceLock;

use reqwest::Client;

use crate::error::{ProxyError, Result};
use crate::transport::Transport;

static GLOBAL: Dispatcher = Dispatcher::new();

/// Accepts the transport that future requests should use.
pub trait TransportRegistry<T> {
  fn install(&self, transport: T) -> Result<()>;
}

impl<T, R: TransportRegistry<T> + ?Sized> TransportRegistry<T> for &R {
  fn install(&self, transport: T) -> Result<()> {
    (**self).install(transport)
  }
}

/// Set-once transport slot with a non-proxying fallback.
#[derive(Debug, Default)]
pub struct Dispatcher {
  installed: OnceLock<Transport>,
  fallback: OnceLock<Client>,
}

impl Dispatcher {
  pub const fn new() -> Self {
    Self {
      installed: OnceLock::new(),
      fallback: OnceLock::new(),
    }
  }

  /// Client for outbound requests.
  pub fn client(&self) -> &Client {
    match self.installed.get() {
      Some(transport) => transport.client(),
      None => self.fallback.get_or_init(default_client),
    }
  }

  /// Proxy URL of the installed transport.
  pub fn proxy_url(&self) -> Option<&str> {
    self.installed.get().map(Transport::proxy_url)
  }

  pub fn is_installed(&self) -> bool {
    self.installed.get().is_some()
  }
}

impl TransportRegistry<Transport> for Dispatcher {
  fn install(&self, transport: Transport) -> Result<()> {
    self
      .installed
      .set(transport)
      .map_err(|_| ProxyError::AlreadyInstalled)
  }
}

/// The dispatcher shared by the whole process.
pub fn global() -> &'static Dispatcher {
  &GLOBAL
}

/// Client every call site should use for outbound HTTP.
pub fn global_client() -> &'static Client {
  GLOBAL.client()
}

/// Proxy URL in effect for [`global_client`], if any.
pub fn global_proxy() -> Option<&'static str> {
  GLOBAL.proxy_url()
}

fn default_client() -> Client {
  Client::builder()
    .no_proxy()
    .build()
    .unwrap_or_else(|_| Client::new())
}
