use envproxy_config::ProxyConfig;
use envproxy_env::MapEnv;
use envproxy_network_proxy::{
  Dispatcher, ReqwestTransportFactory, TransportFactory, TransportRegistry,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UPSTREAM: &str = "http://upstream.invalid/hello";

async fn mock_proxy() -> MockServer {
  let proxy = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/hello"))
    .and(header("host", "upstream.invalid"))
    .respond_with(ResponseTemplate::new(200).set_body_string("via proxy"))
    .expect(1)
    .mount(&proxy)
    .await;
  proxy
}

#[tokio::test]
async fn test_requests_are_forwarded_to_proxy() {
  let proxy = mock_proxy().await;
  let factory = ReqwestTransportFactory::with_env(ProxyConfig::default(), MapEnv::new());

  let transport = factory.build(&proxy.uri()).unwrap();
  let response = transport.client().get(UPSTREAM).send().await.unwrap();

  assert_eq!(response.status(), 200);
  assert_eq!(response.text().await.unwrap(), "via proxy");
}

#[tokio::test]
async fn test_dispatcher_client_switches_to_proxy() {
  let proxy = mock_proxy().await;
  let dispatcher = Dispatcher::new();
  let factory = ReqwestTransportFactory::with_env(ProxyConfig::default(), MapEnv::new());

  dispatcher.install(factory.build(&proxy.uri()).unwrap()).unwrap();
  let body = dispatcher
    .client()
    .get(UPSTREAM)
    .send()
    .await
    .unwrap()
    .text()
    .await
    .unwrap();

  assert_eq!(body, "via proxy");
  assert_eq!(dispatcher.proxy_url(), Some(proxy.uri().as_str()));
}

#[tokio::test]
async fn test_no_proxy_hosts_bypass_proxy_when_enabled() {
  let proxy = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(502))
    .expect(0)
    .mount(&proxy)
    .await;

  let origin = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/direct"))
    .respond_with(ResponseTemplate::new(200).set_body_string("direct"))
    .expect(1)
    .mount(&origin)
    .await;

  let config = ProxyConfig {
    respect_no_proxy: true,
    ..ProxyConfig::default()
  };
  let env = MapEnv::new().with("NO_PROXY", "127.0.0.1,localhost");
  let transport = ReqwestTransportFactory::with_env(config, env)
    .build(&proxy.uri())
    .unwrap();

  let response = transport
    .client()
    .get(format!("{}/direct", origin.uri()))
    .send()
    .await
    .unwrap();

  assert_eq!(response.status(), 200);
  assert_eq!(response.text().await.unwrap(), "direct");
}

#[tokio::test]
async fn test_no_proxy_ignored_by_default() {
  let proxy = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/direct"))
    .respond_with(ResponseTemplate::new(200).set_body_string("via proxy"))
    .expect(1)
    .mount(&proxy)
    .await;

  let env = MapEnv::new().with("NO_PROXY", "127.0.0.1,localhost");
  let transport = ReqwestTransportFactory::with_env(ProxyConfig::default(), env)
    .build(&proxy.uri())
    .unwrap();

  // The origin does not exist; only the proxy can answer.
  let response = transport
    .client()
    .get("http://127.0.0.1:9/direct")
    .send()
    .await
    .unwrap();

  assert_eq!(response.text().await.unwrap(), "via proxy");
}
