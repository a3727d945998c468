use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::resume::compiler::DEFAULT_PROGRAM;
use crate::vector::pinecone::DEFAULT_CONTROL_PLANE_URL;
use crate::vector::PineconeConfig;

const DEFAULT_INDEX_NAME: &str = "ledger";

/// Vector index settings, shared by the server and the `provision-index` command.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub pinecone_api_key: String,
    pub index_name: String,
    pub index_host: Option<String>,
    pub control_plane_url: String,
    pub cloud: String,
    pub region: String,
    pub embedding_cache_dir: Option<PathBuf>,
}

impl IndexConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(IndexConfig {
            pinecone_api_key: require(&var, "PINECONE_API_KEY")?,
            index_name: optional(&var, "PINECONE_INDEX_NAME")
                .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            index_host: optional(&var, "PINECONE_INDEX_HOST"),
            control_plane_url: optional(&var, "PINECONE_CONTROL_PLANE_URL")
                .unwrap_or_else(|| DEFAULT_CONTROL_PLANE_URL.to_string()),
            cloud: optional(&var, "PINECONE_CLOUD").unwrap_or_else(|| "aws".to_string()),
            region: optional(&var, "PINECONE_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            embedding_cache_dir: optional(&var, "EMBEDDING_CACHE_DIR").map(PathBuf::from),
        })
    }

    pub fn pinecone(&self) -> PineconeConfig {
        PineconeConfig::new(self.pinecone_api_key.clone(), self.index_name.clone())
            .with_control_plane_url(self.control_plane_url.clone())
            .with_index_host(self.index_host.clone())
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub ai_service_api_key: String,
    pub index: IndexConfig,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub llm_temperature: f32,
    pub latex_program: String,
    pub latex_extra_args: Vec<String>,
    pub latex_scratch_dir: Option<PathBuf>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source. `from_env` passes the process environment.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let gemini_api_key = match optional(&var, "GEMINI_API_KEY") {
            Some(key) => key,
            None => require(&var, "GOOGLE_API_KEY")
                .context("Set GEMINI_API_KEY (or GOOGLE_API_KEY) for the inference provider")?,
        };

        Ok(Config {
            ai_service_api_key: require(&var, "AI_SERVICE_API_KEY")?,
            index: IndexConfig::from_vars(&var)?,
            gemini_api_key,
            gemini_model: optional(&var, "GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_temperature: optional(&var, "LLM_TEMPERATURE")
                .map(|t| t.parse::<f32>())
                .transpose()
                .context("LLM_TEMPERATURE must be a number")?
                .unwrap_or(DEFAULT_TEMPERATURE),
            latex_program: optional(&var, "LATEX_PROGRAM")
                .unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            latex_extra_args: optional(&var, "LATEX_EXTRA_ARGS")
                .map(|args| args.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            latex_scratch_dir: optional(&var, "LATEX_SCRATCH_DIR").map(PathBuf::from),
            port: optional(&var, "PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
        })
    }
}

fn require(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    optional(var, key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Blank values count as unset.
fn optional(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    var(key).filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("AI_SERVICE_API_KEY", "secret"),
        ("PINECONE_API_KEY", "pc-key"),
        ("GEMINI_API_KEY", "gm-key"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(REQUIRED)).unwrap();

        assert_eq!(config.ai_service_api_key, "secret");
        assert_eq!(config.index.index_name, "ledger");
        assert_eq!(config.index.index_host, None);
        assert_eq!(config.index.control_plane_url, "https://api.pinecone.io");
        assert_eq!(config.index.cloud, "aws");
        assert_eq!(config.index.region, "us-east-1");
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.llm_temperature, 0.4);
        assert_eq!(config.latex_program, "pdflatex");
        assert!(config.latex_extra_args.is_empty());
        assert_eq!(config.latex_scratch_dir, None);
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_missing_secret_is_reported_by_name() {
        let err = Config::from_vars(vars(&[
            ("PINECONE_API_KEY", "pc-key"),
            ("GEMINI_API_KEY", "gm-key"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("AI_SERVICE_API_KEY"));
    }

    #[test]
    fn test_google_api_key_fallback() {
        let config = Config::from_vars(vars(&[
            ("AI_SERVICE_API_KEY", "secret"),
            ("PINECONE_API_KEY", "pc-key"),
            ("GOOGLE_API_KEY", "google-key"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_api_key, "google-key");
    }

    #[test]
    fn test_missing_inference_key_fails() {
        let err = Config::from_vars(vars(&[
            ("AI_SERVICE_API_KEY", "secret"),
            ("PINECONE_API_KEY", "pc-key"),
        ]))
        .unwrap_err();

        assert!(format!("{err:#}").contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_overrides_and_extra_args() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend_from_slice(&[
            ("PORT", "9100"),
            ("LLM_TEMPERATURE", "0.1"),
            ("LATEX_PROGRAM", "xelatex"),
            ("LATEX_EXTRA_ARGS", "-halt-on-error   -no-shell-escape"),
            ("PINECONE_INDEX_HOST", "ledger-abc.svc.pinecone.io"),
            ("EMBEDDING_CACHE_DIR", "/var/cache/models"),
            ("LATEX_SCRATCH_DIR", "/srv/latex-scratch"),
        ]);
        let config = Config::from_vars(vars(&pairs)).unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.llm_temperature, 0.1);
        assert_eq!(config.latex_program, "xelatex");
        assert_eq!(config.latex_extra_args, vec!["-halt-on-error", "-no-shell-escape"]);
        assert_eq!(
            config.index.index_host.as_deref(),
            Some("ledger-abc.svc.pinecone.io")
        );
        assert_eq!(
            config.index.embedding_cache_dir,
            Some(PathBuf::from("/var/cache/models"))
        );
        assert_eq!(
            config.latex_scratch_dir,
            Some(PathBuf::from("/srv/latex-scratch"))
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));

        assert!(Config::from_vars(vars(&pairs)).is_err());
    }

    #[test]
    fn test_blank_value_counts_as_unset() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PINECONE_INDEX_NAME", "  "));
        let config = Config::from_vars(vars(&pairs)).unwrap();

        assert_eq!(config.index.index_name, "ledger");
    }
}
