//! # Configuration File Tests
//!
//! An engine built from a TOML file on disk picks up the eligible status
//! set, the numbering prefix and the scan log cap.

#[cfg(test)]
mod tests {
    use crate::support::World;
    use lm_01_manifest_engine::{ConfigError, EngineConfig, ManifestApi, ScanClassification};
    use shared_types::ShipmentStatus;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENGINE_TOML: &str = r#"
[eligibility]
statuses = ["received_at_origin_hub"]

[numbering]
prefix = "lhx"

[audit]
scan_log_limit = 1
"#;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[tokio::test]
    async fn test_engine_from_file() -> anyhow::Result<()> {
        let file = config_file(ENGINE_TOML);
        let config = EngineConfig::load(file.path())?;
        let world = World::with_config(config);

        let manifest = world.open_manifest().await?;
        assert!(manifest.manifest_no.starts_with("LHX-"));

        // Freshly booked shipments are no longer eligible
        world.book("123-45678901", 1, 1.0);
        let outcome = world.scan(manifest.id, "12345678901").await?;
        assert_eq!(outcome.classification, ScanClassification::WrongStatus);
        assert_eq!(outcome.current_status, Some(ShipmentStatus::Created));

        let hub_ready = world
            .book("123-45678902", 1, 1.0)
            .with_status(ShipmentStatus::ReceivedAtOriginHub);
        world.shipments.insert(hub_ready);
        let outcome = world.scan(manifest.id, "12345678902").await?;
        assert_eq!(outcome.classification, ScanClassification::Success);

        let logs = world.engine.scan_logs(world.org, manifest.id).await?;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].classification, ScanClassification::Success);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load("/nonexistent/manifest-engine.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_unknown_status_in_file() {
        let file = config_file("[eligibility]\nstatuses = [\"teleported\"]\n");
        let err = EngineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
