//! Session configuration loading.

#![allow(missing_docs)]

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::WebCtlError;

pub const DEFAULT_HELPER_DEVICE: &str = "td:";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const DEFAULT_FTP_PORT: u16 = 21;

/// Username/password pair for one controller resource.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: SmolStr,
    pub password: SmolStr,
}

impl Credentials {
    pub fn new(user: impl Into<SmolStr>, password: impl Into<SmolStr>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: SmolStr,
    pub helper_device: SmolStr,
    pub helper_dir: SmolStr,
    pub request_timeout: Duration,
    pub skip_helper_upload: bool,
    /// FTP port; independent of any port given in `host`.
    pub ftp_port: u16,
    pub kcl_auth: Option<Credentials>,
    pub karel_auth: Option<Credentials>,
    pub ftp_auth: Option<Credentials>,
    pub log_level: SmolStr,
}

impl ClientConfig {
    pub fn new(host: impl Into<SmolStr>) -> Self {
        Self {
            host: host.into(),
            helper_device: SmolStr::new(DEFAULT_HELPER_DEVICE),
            helper_dir: SmolStr::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            skip_helper_upload: false,
            ftp_port: DEFAULT_FTP_PORT,
            kcl_auth: None,
            karel_auth: None,
            ftp_auth: None,
            log_level: SmolStr::new(DEFAULT_LOG_LEVEL),
        }
    }

    #[must_use]
    pub fn with_helper_location(
        mut self,
        device: impl Into<SmolStr>,
        dir: impl Into<SmolStr>,
    ) -> Self {
        self.helper_device = device.into();
        self.helper_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_skip_helper_upload(mut self, skip: bool) -> Self {
        self.skip_helper_upload = skip;
        self
    }

    #[must_use]
    pub fn with_ftp_port(mut self, port: u16) -> Self {
        self.ftp_port = port;
        self
    }

    #[must_use]
    pub fn with_kcl_auth(mut self, auth: Credentials) -> Self {
        self.kcl_auth = Some(auth);
        self
    }

    #[must_use]
    pub fn with_karel_auth(mut self, auth: Credentials) -> Self {
        self.karel_auth = Some(auth);
        self
    }

    #[must_use]
    pub fn with_ftp_auth(mut self, auth: Credentials) -> Self {
        self.ftp_auth = Some(auth);
        self
    }

    /// Directory on the controller holding the helper templates.
    #[must_use]
    pub fn base_path(&self) -> SmolStr {
        normalize_base_path(&self.helper_device, &self.helper_dir)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WebCtlError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
        let text = std::fs::read_to_string(path)
            .map_err(|err| WebCtlError::InvalidConfig(format!("{file_name}: {err}").into()))?;
        parse_client_toml_from_text(&text, &file_name)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, WebCtlError> {
        parse_client_toml_from_text(text, "config")
    }
}

#[must_use]
pub fn normalize_base_path(device: &str, dir: &str) -> SmolStr {
    let mut path = format!("{device}/{dir}");
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    if path.ends_with('/') {
        path.pop();
    }
    SmolStr::new(path)
}

fn parse_client_toml_from_text(text: &str, file_name: &str) -> Result<ClientConfig, WebCtlError> {
    let raw: ClientToml = toml::from_str(text)
        .map_err(|err| WebCtlError::InvalidConfig(format!("{file_name}: {err}").into()))?;
    raw.into_config()
        .map_err(|err| prefix_invalid_config(file_name, err))
}

fn prefix_invalid_config(file_name: &str, err: WebCtlError) -> WebCtlError {
    match err {
        WebCtlError::InvalidConfig(message) => {
            WebCtlError::InvalidConfig(format!("{file_name}: {message}").into())
        }
        other => other,
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClientToml {
    controller: ControllerSection,
    auth: Option<AuthSection>,
    log: Option<LogSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ControllerSection {
    host: String,
    helper_device: Option<String>,
    helper_dir: Option<String>,
    request_timeout_ms: Option<u64>,
    skip_helper_upload: Option<bool>,
    ftp_port: Option<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AuthSection {
    kcl: Option<CredentialsSection>,
    karel: Option<CredentialsSection>,
    ftp: Option<CredentialsSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CredentialsSection {
    user: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LogSection {
    level: String,
}

impl ClientToml {
    fn into_config(self) -> Result<ClientConfig, WebCtlError> {
        let controller = self.controller;
        if controller.host.trim().is_empty() {
            return Err(WebCtlError::InvalidConfig(
                "controller.host must not be empty".into(),
            ));
        }
        if controller.ftp_port == Some(0) {
            return Err(WebCtlError::InvalidConfig(
                "controller.ftp_port must be >= 1".into(),
            ));
        }
        if controller.request_timeout_ms == Some(0) {
            return Err(WebCtlError::InvalidConfig(
                "controller.request_timeout_ms must be >= 1".into(),
            ));
        }
        let mut config = ClientConfig::new(controller.host.trim());
        if let Some(device) = controller.helper_device {
            if device.trim().is_empty() {
                return Err(WebCtlError::InvalidConfig(
                    "controller.helper_device must not be empty".into(),
                ));
            }
            config.helper_device = SmolStr::new(device.trim());
        }
        if let Some(dir) = controller.helper_dir {
            config.helper_dir = SmolStr::new(dir.trim());
        }
        if let Some(timeout_ms) = controller.request_timeout_ms {
            config.request_timeout = Duration::from_millis(timeout_ms);
        }
        config.skip_helper_upload = controller.skip_helper_upload.unwrap_or(false);
        if let Some(port) = controller.ftp_port {
            config.ftp_port = port;
        }

        if let Some(auth) = self.auth {
            config.kcl_auth = auth
                .kcl
                .map(|section| section.into_credentials("auth.kcl"))
                .transpose()?;
            config.karel_auth = auth
                .karel
                .map(|section| section.into_credentials("auth.karel"))
                .transpose()?;
            config.ftp_auth = auth
                .ftp
                .map(|section| section.into_credentials("auth.ftp"))
                .transpose()?;
        }

        if let Some(log) = self.log {
            if log.level.trim().is_empty() {
                return Err(WebCtlError::InvalidConfig(
                    "log.level must not be empty".into(),
                ));
            }
            config.log_level = SmolStr::new(log.level.trim());
        }
        Ok(config)
    }
}

impl CredentialsSection {
    fn into_credentials(self, section: &str) -> Result<Credentials, WebCtlError> {
        if self.user.trim().is_empty() {
            return Err(WebCtlError::InvalidConfig(
                format!("{section}.user must not be empty").into(),
            ));
        }
        Ok(Credentials::new(self.user.trim(), self.password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_path_collapses_separators() {
        assert_eq!(normalize_base_path("td:", ""), "td:");
        assert_eq!(normalize_base_path("td:", "/dominh/"), "td:/dominh");
        assert_eq!(normalize_base_path("fr:/", "//helpers"), "fr:/helpers");
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = ClientConfig::from_toml_str(
            r#"
[controller]
host = "10.0.0.5"
"#,
        )
        .expect("parse minimal config");
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.base_path(), "td:");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(!config.skip_helper_upload);
        assert!(config.kcl_auth.is_none());
        assert_eq!(config.ftp_port, DEFAULT_FTP_PORT);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn full_config_round_trips_all_sections() {
        let config = ClientConfig::from_toml_str(
            r#"
[controller]
host = "robot.local"
helper_device = "fr:"
helper_dir = "webctl"
request_timeout_ms = 1500
skip_helper_upload = true
ftp_port = 2121

[auth.kcl]
user = "kcl-user"
password = "kcl-pw"

[auth.ftp]
user = "ftp-user"
password = "ftp-pw"

[log]
level = "debug"
"#,
        )
        .expect("parse full config");
        assert_eq!(config.base_path(), "fr:/webctl");
        assert_eq!(config.request_timeout, Duration::from_millis(1500));
        assert!(config.skip_helper_upload);
        assert_eq!(config.ftp_port, 2121);
        assert_eq!(
            config.kcl_auth,
            Some(Credentials::new("kcl-user", "kcl-pw"))
        );
        assert!(config.karel_auth.is_none());
        assert_eq!(config.ftp_auth.as_ref().map(|auth| auth.user.as_str()), Some("ftp-user"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ClientConfig::from_toml_str(
            r#"
[controller]
host = "robot"
retries = 3
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown field"), "{err}");
    }

    #[test]
    fn rejects_zero_timeout_and_empty_host() {
        let err = ClientConfig::from_toml_str(
            "[controller]\nhost = \"robot\"\nrequest_timeout_ms = 0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms must be >= 1"));

        let err = ClientConfig::from_toml_str("[controller]\nhost = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("config: controller.host must not be empty"));
    }

    #[test]
    fn rejects_credentials_without_user() {
        let err = ClientConfig::from_toml_str(
            "[controller]\nhost = \"robot\"\n[auth.karel]\nuser = \"\"\npassword = \"x\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("auth.karel.user must not be empty"));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("operator", "hunter2"));
        assert!(debug.contains("operator"));
        assert!(!debug.contains("hunter2"));
    }
}
