use serde::{Deserialize, Serialize};

/// API ingress configuration, read from `modules.api_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// `host:port` to listen on. Empty means `server.host:server.port`.
    #[serde(default)]
    pub bind_addr: String,
    /// Mount point of every module router.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_true")]
    pub enable_docs: bool,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::new(),
            api_prefix: default_api_prefix(),
            enable_docs: true,
            cors_enabled: false,
            request_timeout_secs: default_request_timeout_secs(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ApiIngressConfig {
    pub fn effective_bind_addr(&self, host: &str, port: u16) -> String {
        if self.bind_addr.trim().is_empty() {
            format!("{host}:{port}")
        } else {
            self.bind_addr.clone()
        }
    }

    /// `api_prefix` with a leading slash and no trailing one; `""` for the root.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.api_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_body_limit_bytes() -> usize {
    5 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let cfg: ApiIngressConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.api_prefix, "/api");
        assert!(cfg.enable_docs);
        assert!(!cfg.cors_enabled);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.body_limit_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<ApiIngressConfig, _> =
            serde_json::from_value(serde_json::json!({ "bind": "x" }));
        assert!(res.is_err());
    }

    #[test]
    fn bind_addr_falls_back_to_server_host_port() {
        let mut cfg = ApiIngressConfig::default();
        assert_eq!(cfg.effective_bind_addr("0.0.0.0", 9000), "0.0.0.0:9000");
        cfg.bind_addr = "127.0.0.1:8087".into();
        assert_eq!(cfg.effective_bind_addr("0.0.0.0", 9000), "127.0.0.1:8087");
    }

    #[test]
    fn prefix_is_normalized() {
        let mut cfg = ApiIngressConfig::default();
        assert_eq!(cfg.normalized_prefix(), "/api");
        cfg.api_prefix = "v1/".into();
        assert_eq!(cfg.normalized_prefix(), "/v1");
        cfg.api_prefix = "/".into();
        assert_eq!(cfg.normalized_prefix(), "");
    }
}
