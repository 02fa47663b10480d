//! Configuration files through to a working router

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;
    use support_router::{Config, ProviderKind, Router, ServiceError};
    use tempfile::NamedTempFile;

    fn example_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/router.example.yaml")
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_example_config_loads() {
        let config = Config::from_file(example_path()).await.unwrap();

        assert_eq!(
            config.provider_names().collect::<Vec<_>>(),
            ["openai", "anthropic", "gemini"]
        );
        assert_eq!(config.providers[2].kind, ProviderKind::Gemini);
        assert_eq!(config.router.stream_buffer, 64);

        let router = Router::from_config(&config).unwrap();
        assert_eq!(router.providers().len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_names_rejected_from_file() {
        let file = write_config(
            r#"
providers:
  - { name: primary, kind: openai, api_key: k }
  - { name: primary, kind: gemini, api_key: k }
"#,
        );

        let err = Config::from_file(file.path()).await.unwrap_err();
        assert!(matches!(&err, ServiceError::Config(msg) if msg.contains("Duplicate provider name")));
    }

    #[tokio::test]
    async fn test_malformed_yaml_rejected() {
        let file = write_config("providers: [ { name: openai, kind: ");
        let err = Config::from_file(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[tokio::test]
    async fn test_minimal_config_uses_kind_defaults() {
        let file = write_config(
            r#"
providers:
  - name: backup
    kind: anthropic
    api_key: sk-ant-test
"#,
        );
        let config = Config::from_file(file.path()).await.unwrap();
        let provider = &config.providers[0];

        assert_eq!(provider.catalogue(), ProviderKind::Anthropic.default_models());
        assert_eq!(provider.connection().api_key.as_deref(), Some("sk-ant-test"));
        assert_eq!(provider.timeout_secs, None);

        let router = Router::from_config(&config).unwrap();
        assert!(router.provider("backup").unwrap().has_credentials());
    }

    #[tokio::test]
    async fn test_written_config_reloads() {
        let original = Config::from_file(example_path()).await.unwrap();
        let file = write_config(&original.to_yaml().unwrap());

        let reloaded = Config::from_file(file.path()).await.unwrap();
        assert_eq!(reloaded.router, original.router);
        assert_eq!(reloaded.providers, original.providers);
    }
}
