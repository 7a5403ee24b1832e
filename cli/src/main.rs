// Envproxy CLI - Command Line Interface Entry Point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use envproxy_config::{ConfigLoader, parse_override};
use envproxy_env::ProcessEnv;
use envproxy_network_proxy::{
  ProxyUrl, global_client, global_proxy, init_global_proxy_with_config, proxy_url,
};

/// Envproxy - route outbound HTTP through the proxy named in the environment
#[derive(Parser, Debug)]
#[command(name = "envproxy")]
#[command(version, about, long_about = None)]
struct TopCli {
  #[clap(flatten)]
  config_overrides: CliConfigOverrides,

  #[clap(subcommand)]
  command: Commands,
}

/// CLI configuration overrides
#[derive(Debug, clap::Args)]
struct CliConfigOverrides {
  /// Configuration override in key=value format
  #[arg(short = 'c', long = "config", value_name = "KEY=VALUE", global = true)]
  overrides: Vec<String>,

  /// Extra configuration file, applied over the global one
  #[arg(long = "config-file", value_name = "PATH", global = true)]
  config_file: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand)]
enum Commands {
  /// Show which proxy the environment selects and whether it is installed
  Show {
    /// Print as JSON
    #[arg(long)]
    json: bool,
  },

  /// GET a URL through the process-wide client
  Fetch {
    /// URL to request
    url: String,
  },
}

/// Proxy state as printed by `show`
#[derive(Debug, Serialize, PartialEq)]
struct ProxyReport {
  variable: Option<&'static str>,
  url: Option<String>,
  installed: bool,
  enabled: bool,
}

impl ProxyReport {
  fn new(detected: Option<ProxyUrl>, installed: Option<&str>, enabled: bool) -> Self {
    let (variable, url) = match detected {
      Some(ProxyUrl { value, source }) => (Some(source), Some(value)),
      None => (None, None),
    };
    Self {
      variable,
      url,
      installed: installed.is_some(),
      enabled,
    }
  }

  fn render(&self) -> String {
    let mut out = String::new();
    match (&self.variable, &self.url) {
      (Some(variable), Some(url)) => out.push_str(&format!("proxy: {url} (from {variable})\n")),
      _ => out.push_str("proxy: none\n"),
    }
    if !self.enabled {
      out.push_str("status: disabled by configuration\n");
    } else if self.installed {
      out.push_str("status: installed\n");
    } else {
      out.push_str("status: not installed\n");
    }
    out
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  // Initialize logging
  tracing_subscriber::fmt()
    .with_env_filter(
      std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .as_str(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = TopCli::parse();

  let overrides = cli
    .config_overrides
    .overrides
    .iter()
    .map(|raw| parse_override(raw))
    .collect::<Result<Vec<_>, _>>()?;

  let mut loader = ConfigLoader::from_env(&ProcessEnv);
  if let Some(path) = cli.config_overrides.config_file {
    loader = loader.with_config_file(path);
  }
  let config = loader
    .load_with_cli_overrides(overrides)
    .context("failed to load configuration")?;
  debug!(?config, "configuration loaded");

  // Must run before any request goes out.
  init_global_proxy_with_config(&config.proxy);

  match cli.command {
    Commands::Show { json } => show(config.proxy.enabled, json)?,
    Commands::Fetch { url } => fetch(&url).await?,
  }

  Ok(())
}

/// Print the detected and installed proxy
fn show(enabled: bool, json: bool) -> Result<()> {
  let report = ProxyReport::new(proxy_url(), global_proxy(), enabled);
  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print!("{}", report.render());
  }
  Ok(())
}

/// Fetch a URL with the process-wide client
async fn fetch(url: &str) -> Result<()> {
  info!("fetching {url}");

  let response = global_client()
    .get(url)
    .send()
    .await
    .with_context(|| format!("request to {url} failed"))?;
  let status = response.status();
  let body = response.text().await?;

  println!("{status}");
  println!("{body}");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_parse_show() {
    let cli = TopCli::try_parse_from(["envproxy", "show", "--json"]).unwrap();
    assert!(matches!(cli.command, Commands::Show { json: true }));
    assert!(cli.config_overrides.overrides.is_empty());
  }

  #[test]
  fn test_parse_fetch_with_overrides() {
    let cli = TopCli::try_parse_from([
      "envproxy",
      "fetch",
      "http://example.com/",
      "-c",
      "proxy.timeout_secs=5",
      "--config",
      "proxy.respect_no_proxy=true",
    ])
    .unwrap();

    assert!(matches!(cli.command, Commands::Fetch { ref url } if url == "http://example.com/"));
    assert_eq!(
      cli.config_overrides.overrides,
      vec![
        "proxy.timeout_secs=5".to_string(),
        "proxy.respect_no_proxy=true".to_string()
      ]
    );
  }

  #[test]
  fn test_subcommand_is_required() {
    assert!(TopCli::try_parse_from(["envproxy"]).is_err());
  }

  #[test]
  fn test_report_installed() {
    let report = ProxyReport::new(
      Some(ProxyUrl {
        value: "http://proxy.example.com:8080".to_string(),
        source: "HTTPS_PROXY",
      }),
      Some("http://proxy.example.com:8080"),
      true,
    );

    assert_eq!(
      report.render(),
      "proxy: http://proxy.example.com:8080 (from HTTPS_PROXY)\nstatus: installed\n"
    );
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["variable"], "HTTPS_PROXY");
    assert_eq!(json["installed"], true);
  }

  #[test]
  fn test_report_without_proxy() {
    let report = ProxyReport::new(None, None, true);
    assert_eq!(report.render(), "proxy: none\nstatus: not installed\n");
  }

  #[test]
  fn test_report_disabled() {
    let report = ProxyReport::new(None, None, false);
    assert_eq!(report.render(), "proxy: none\nstatus: disabled by configuration\n");
  }
}
