// Utils - Env
// Environment variable sources

use std::collections::HashMap;

/// Read-only view over environment variables.
///
/// The process environment is the usual implementation; [`MapEnv`] lets
/// callers and tests supply variables without touching global state.
pub trait EnvSource {
  /// Raw value of `key`, `None` when unset.
  fn var(&self, key: &str) -> Option<String>;

  /// Value of `key` when it is set to something other than the empty string.
  fn non_empty(&self, key: &str) -> Option<String> {
    self.var(key).filter(|value| !value.is_empty())
  }

  /// First non-empty value among `keys`, together with the key that held it.
  fn first_non_empty<'k>(&self, keys: &[&'k str]) -> Option<(&'k str, String)> {
    keys
      .iter()
      .find_map(|key| self.non_empty(key).map(|value| (*key, value)))
  }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
  fn var(&self, key: &str) -> Option<String> {
    (**self).var(key)
  }
}

/// The environment of the current process.
///
/// Values that are not valid unicode are converted lossily rather than
/// reported as unset, so a set variable always shadows later fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
  fn var(&self, key: &str) -> Option<String> {
    std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
  }
}

/// In-memory environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
  vars: HashMap<String, String>,
}

impl MapEnv {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style insert.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.set(key, value);
    self
  }

  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.vars.insert(key.into(), value.into());
  }

  pub fn remove(&mut self, key: &str) -> Option<String> {
    self.vars.remove(key)
  }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      vars: iter
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect(),
    }
  }
}

impl EnvSource for MapEnv {
  fn var(&self, key: &str) -> Option<String> {
    self.vars.get(key).cloned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_non_empty_skips_blank_values() {
    let env = MapEnv::new().with("SET", "value").with("BLANK", "");

    assert_eq!(env.non_empty("SET"), Some("value".to_string()));
    assert_eq!(env.non_empty("BLANK"), None);
    assert_eq!(env.non_empty("MISSING"), None);
  }

  #[test]
  fn test_first_non_empty_respects_order() {
    let env: MapEnv = [("B", "second"), ("C", "third"), ("A", "")]
      .into_iter()
      .collect();

    assert_eq!(
      env.first_non_empty(&["A", "B", "C"]),
      Some(("B", "second".to_string()))
    );
    assert_eq!(
      env.first_non_empty(&["C", "B"]),
      Some(("C", "third".to_string()))
    );
    assert_eq!(env.first_non_empty(&["A", "Z"]), None);
  }

  #[test]
  fn test_keys_are_case_sensitive() {
    let env = MapEnv::new().with("http_proxy", "lower");

    assert_eq!(env.var("HTTP_PROXY"), None);
    assert_eq!(env.var("http_proxy"), Some("lower".to_string()));
  }

  #[cfg(unix)]
  #[test]
  fn test_process_env_keeps_non_unicode_values() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    const PRIMARY: &str = "ENVPROXY_ENV_TEST_NON_UNICODE";
    const FALLBACK: &str = "ENVPROXY_ENV_TEST_FALLBACK";

    // SAFETY: these names are private to this test and nothing else in the
    // test binary touches the process environment.
    unsafe {
      std::env::set_var(PRIMARY, OsStr::from_bytes(b"http://proxy\xff.example.com"));
      std::env::set_var(FALLBACK, "http://fallback.example.com");
    }

    let value = ProcessEnv.non_empty(PRIMARY).unwrap();
    assert!(value.starts_with("http://proxy"));
    assert!(value.contains('\u{FFFD}'));
    assert_eq!(
      ProcessEnv.first_non_empty(&[PRIMARY, FALLBACK]).map(|(key, _)| key),
      Some(PRIMARY)
    );

    unsafe {
      std::env::remove_var(PRIMARY);
      std::env::remove_var(FALLBACK);
    }
    assert_eq!(ProcessEnv.var(PRIMARY), None);
  }

  #[test]
  fn test_remove() {
    let mut env = MapEnv::new().with("KEY", "v");
    assert_eq!(env.remove("KEY"), Some("v".to_string()));
    assert_eq!(env.var("KEY"), None);
  }
}
