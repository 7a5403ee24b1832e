//! Proxying transport construction

use envproxy_config::ProxyConfig;
use envproxy_env::{EnvSource, ProcessEnv};
use reqwest::{Client, NoProxy, Proxy, Url};

use crate::error::{ProxyError, Result};
use crate::lookup::no_proxy_from_env;

/// Proxy schemes the client can tunnel through.
pub const SUPPORTED_SCHEMES: [&str; 2] = ["http", "https"];

/// An HTTP client routed through a proxy.
#[derive(Debug, Clone)]
pub struct Transport {
  client: Client,
  proxy_url: String,
}

impl Transport {
  pub fn new(client: Client, proxy_url: impl Into<String>) -> Self {
    Self {
      client,
      proxy_url: proxy_url.into(),
    }
  }

  pub fn client(&self) -> &Client {
    &self.client
  }

  pub fn proxy_url(&self) -> &str {
    &self.proxy_url
  }
}

/// Builds a transport for a proxy URL.
pub trait TransportFactory {
  type Transport;

  fn build(&self, proxy_url: &str) -> Result<Self::Transport>;
}

impl<F: TransportFactory + ?Sized> TransportFactory for &F {
  type Transport = F::Transport;

  fn build(&self, proxy_url: &str) -> Result<Self::Transport> {
    (**self).build(proxy_url)
  }
}

/// Builds `reqwest` clients that send every request through the proxy.
#[derive(Debug, Clone)]
pub struct ReqwestTransportFactory<E = ProcessEnv> {
  config: ProxyConfig,
  env: E,
}

impl ReqwestTransportFactory {
  pub fn new(config: ProxyConfig) -> Self {
    Self::with_env(config, ProcessEnv)
  }
}

impl<E: EnvSource> ReqwestTransportFactory<E> {
  /// `env` is only consulted for `NO_PROXY` when the config asks for it.
  pub fn with_env(config: ProxyConfig, env: E) -> Self {
    Self { config, env }
  }

  fn proxy(&self, proxy_url: &str) -> Result<Proxy> {
    let url = parse_proxy_url(proxy_url)?;
    let proxy = Proxy::all(url).map_err(|source| ProxyError::InvalidProxy {
      url: proxy_url.to_string(),
      source,
    })?;

    if !self.config.respect_no_proxy {
      return Ok(proxy);
    }
    let exclusions = no_proxy_from_env(&self.env);
    Ok(proxy.no_proxy(exclusions.as_deref().and_then(NoProxy::from_string)))
  }
}

/// `reqwest` would read a bare `host:port` as `http://host:port` and accept
/// schemes it has no connector for, so the URL is checked up front.
fn parse_proxy_url(proxy_url: &str) -> Result<Url> {
  let malformed = |reason: String| ProxyError::MalformedProxyUrl {
    url: proxy_url.to_string(),
    reason,
  };

  let url = Url::parse(proxy_url).map_err(|err| malformed(err.to_string()))?;
  if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
    return Err(malformed(format!("unsupported scheme {:?}", url.scheme())));
  }
  if url.host_str().is_none_or(str::is_empty) {
    return Err(malformed("missing host".to_string()));
  }
  Ok(url)
}

impl<E: EnvSource> TransportFactory for ReqwestTransportFactory<E> {
  type Transport = Transport;

  fn build(&self, proxy_url: &str) -> Result<Transport> {
    let mut builder = Client::builder().proxy(self.proxy(proxy_url)?);

    if let Some(timeout) = self.config.connect_timeout() {
      builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = self.config.timeout() {
      builder = builder.timeout(timeout);
    }
    if let Some(user_agent) = &self.config.user_agent {
      builder = builder.user_agent(user_agent.as_str());
    }

    let client = builder.build().map_err(ProxyError::ClientBuild)?;
    Ok(Transport::new(client, proxy_url))
  }
}
