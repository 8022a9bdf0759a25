use std::path::Path;
use std::time::Duration;

use figment::Figment;
#[cfg(feature = "config_env")]
use figment::providers::Env;
#[cfg(feature = "config_json")]
use figment::providers::Json;
#[cfg(feature = "config_yaml")]
use figment::providers::Yaml;
use figment::providers::{Data, Format};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

use super::{ConfigParsingError, ConfigValidationError};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoCustomConfig;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppCustomConfigSerdeDTO<Custom> {
    #[serde(default)]
    pub(super) app: Custom,
}

#[derive(Debug, Clone)]
pub struct AppConfig<Custom> {
    pub core: CoreConfig,
    pub app: Custom,
}

/// Verifier-wide settings. The signing key stays wrapped in a
/// [`SecretString`] so it never ends up in logs or serialized output.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    /// P-256 private key used to mint capability tokens, either PEM or
    /// base64 wrapped PEM.
    #[serde(default = "empty_secret")]
    pub signing_key: SecretString,
    /// Path prefix under which proof endpoints are reachable from outside.
    #[serde(default = "default_public_base_path")]
    pub public_base_path: String,
    /// Row lifetime in seconds applied when a request does not carry its own.
    #[serde(default = "default_request_ttl")]
    pub default_request_ttl: u64,
    #[serde(default)]
    pub external_presentation: ExternalPresentationConfig,
    #[serde(default)]
    pub signer: SignerServiceConfig,
    #[serde(default)]
    pub topics: TopicsConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPresentationConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Wallet authorization endpoint presenters get redirected to.
    #[serde(default)]
    pub authorize_endpoint: String,
    /// Policy checked against the fetched request object. Empty disables
    /// the check.
    #[serde(default)]
    pub request_object_policy: String,
    /// Policy checked against the caller supplied client id. Empty disables
    /// the check.
    #[serde(default)]
    pub client_id_policy: String,
    /// Scheme forced onto percent-encoded request object URIs.
    #[serde(default = "default_client_url_scheme")]
    pub client_url_scheme: String,
}

impl Default for ExternalPresentationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            authorize_endpoint: String::new(),
            request_object_policy: String::new(),
            client_id_policy: String::new(),
            client_url_scheme: default_client_url_scheme(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerServiceConfig {
    #[serde(default)]
    pub presentation_verify_url: String,
    #[serde(default)]
    pub presentation_sign_url: String,
    #[serde(default)]
    pub signer_topic: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicsConfig {
    #[serde(default)]
    pub authorization: String,
    #[serde(default)]
    pub authorization_reply: String,
    #[serde(default)]
    pub proof_notify: String,
    #[serde(default)]
    pub presentation_request: String,
    #[serde(default)]
    pub storage_request: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingConfig {
    #[serde(default = "default_broker_url")]
    pub broker_url: String,
    #[serde(default = "default_broker_port")]
    pub broker_port: u16,
    /// How long a messaging RPC waits for its reply.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout: Duration,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            broker_url: default_broker_url(),
            broker_port: default_broker_port(),
            reply_timeout: default_reply_timeout(),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            region: String::new(),
            country: String::new(),
            signing_key: empty_secret(),
            public_base_path: default_public_base_path(),
            default_request_ttl: default_request_ttl(),
            external_presentation: ExternalPresentationConfig::default(),
            signer: SignerServiceConfig::default(),
            topics: TopicsConfig::default(),
            messaging: MessagingConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Startup guard for settings without a sensible default.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        use secrecy::ExposeSecret;

        if self.signing_key.expose_secret().is_empty() {
            return Err(ConfigValidationError::MissingField("signingKey".into()));
        }
        if self.topics.authorization.is_empty() {
            return Err(ConfigValidationError::MissingField(
                "topics.authorization".into(),
            ));
        }
        if self.topics.presentation_request.is_empty() {
            return Err(ConfigValidationError::MissingField(
                "topics.presentationRequest".into(),
            ));
        }
        Ok(())
    }
}

fn empty_secret() -> SecretString {
    SecretString::from("")
}

fn default_public_base_path() -> String {
    "/api/presentation/proof".to_owned()
}

fn default_request_ttl() -> u64 {
    3600
}

fn default_client_url_scheme() -> String {
    "https".to_owned()
}

fn default_broker_url() -> String {
    "localhost".to_owned()
}

fn default_broker_port() -> u16 {
    1883
}

fn default_reply_timeout() -> Duration {
    Duration::from_secs(60)
}

pub enum InputFormat {
    #[cfg(feature = "config_yaml")]
    Yaml(Data<Yaml>),
    #[cfg(feature = "config_json")]
    Json(Data<Json>),
}

impl InputFormat {
    #[cfg(feature = "config_yaml")]
    pub fn yaml_file(p: impl AsRef<Path>) -> InputFormat {
        InputFormat::Yaml(Yaml::file(p))
    }

    #[cfg(feature = "config_yaml")]
    pub fn yaml_str(s: impl AsRef<str>) -> InputFormat {
        InputFormat::Yaml(Yaml::string(s.as_ref()))
    }

    #[cfg(feature = "config_json")]
    pub fn json_file(p: impl AsRef<Path>) -> InputFormat {
        InputFormat::Json(Json::file(p))
    }

    #[cfg(feature = "config_json")]
    pub fn json_str(s: impl AsRef<str>) -> InputFormat {
        InputFormat::Json(Json::string(s.as_ref()))
    }
}

impl<Custom> AppConfig<Custom>
where
    Custom: DeserializeOwned + Default,
{
    pub fn from_files(files: &[impl AsRef<Path>]) -> Result<Self, ConfigParsingError> {
        let mut inputs: Vec<InputFormat> = Vec::with_capacity(files.len());

        for path in files {
            #[cfg(feature = "config_yaml")]
            if path
                .as_ref()
                .extension()
                .is_some_and(|ext| ext == "yml" || ext == "yaml")
            {
                inputs.push(InputFormat::Yaml(Yaml::file(path)));
                continue;
            }

            #[cfg(feature = "config_json")]
            if path.as_ref().extension() == Some("json".as_ref()) {
                inputs.push(InputFormat::Json(Json::file(path)));
                continue;
            }

            return Err(ConfigParsingError::GeneralParsingError(format!(
                "Unsupported file or missing file extension: {:?}",
                path.as_ref().to_str()
            )));
        }

        AppConfig::parse(inputs)
    }

    #[cfg(feature = "config_yaml")]
    pub fn from_yaml(
        configs: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, ConfigParsingError> {
        let inputs = configs
            .into_iter()
            .map(|s| Yaml::string(s.as_ref()))
            .map(InputFormat::Yaml);

        AppConfig::parse(inputs)
    }

    pub fn parse(
        inputs: impl IntoIterator<Item = InputFormat>,
    ) -> Result<Self, ConfigParsingError> {
        let mut figment = Figment::new();

        for data in inputs {
            figment = match data {
                #[cfg(feature = "config_yaml")]
                InputFormat::Yaml(content) => figment.merge(content),
                #[cfg(feature = "config_json")]
                InputFormat::Json(content) => figment.merge(content),
            };
        }

        #[cfg(feature = "config_env")]
        {
            figment = figment.merge(Env::prefixed("VERIFICATION_").split("__").lowercase(false));
        }

        let core = figment
            .extract::<CoreConfig>()
            .map_err(|e| ConfigParsingError::GeneralParsingError(e.to_string()))?;
        let custom = figment
            .extract::<AppCustomConfigSerdeDTO<Custom>>()
            .map_err(|e| ConfigParsingError::GeneralParsingError(e.to_string()))?;
        Ok(Self {
            core,
            app: custom.app,
        })
    }
}
