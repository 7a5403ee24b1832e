//! Proxy installation errors

use thiserror::Error;

/// Failure to build or register the proxying transport
#[derive(Error, Debug)]
pub enum ProxyError {
  /// The transport rejected the proxy URL
  #[error("invalid proxy url {url:?}: {source}")]
  InvalidProxy {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  /// The proxy URL does not parse, lacks a host, or uses a scheme the
  /// transport cannot speak
  #[error("invalid proxy url {url:?}: {reason}")]
  MalformedProxyUrl { url: String, reason: String },

  /// The HTTP client could not be built
  #[error("failed to build http client: {0}")]
  ClientBuild(#[source] reqwest::Error),

  /// A transport is already installed in the target slot
  #[error("a global transport is already installed")]
  AlreadyInstalled,
}

/// Alias for Result<T, ProxyError>
pub type Result<T> = std::result::Result<T, ProxyError>;
