//! Integration tests for cascade resolution against real directories.

use envcascade::core::Provenance;
use envcascade::prelude::*;
use envcascade::sources::SourceRole;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

async fn resolve(dir: &Path, environment: Environment) -> Result<ResolvedConfiguration> {
    Resolver::builder()
        .with_base_dir(dir)
        .with_environment(environment)
        .build()?
        .resolve()
        .await
}

#[tokio::test]
async fn test_single_required_file_is_enough() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        ".env.shared",
        "DATABASE_URL=postgres://localhost/app\nPORT=8080\n",
    );

    let resolved = resolve(temp_dir.path(), Environment::Dev).await.unwrap();
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved.get("DATABASE_URL"), Some("postgres://localhost/app"));
    assert_eq!(resolved.get("PORT"), Some("8080"));
}

#[tokio::test]
async fn test_missing_required_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env", "PORT=8080\n");

    let err = resolve(temp_dir.path(), Environment::Dev).await.unwrap_err();
    match err {
        ResolveError::MissingRequiredSource { file_name, path } => {
            assert_eq!(file_name, ".env.shared");
            assert_eq!(path, temp_dir.path().join(".env.shared"));
        }
        other => panic!("expected MissingRequiredSource, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_required_file_is_fine() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env.shared", "");

    let resolved = resolve(temp_dir.path(), Environment::Ci).await.unwrap();
    assert!(resolved.is_empty());
}

#[tokio::test]
async fn test_full_cascade_precedence() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env", "WINNER=entry\nFROM_ENTRY=yes\n");
    write(temp_dir.path(), ".env.common", "WINNER=common\n");
    write(temp_dir.path(), ".env.common.local", "WINNER=common-local\n");
    write(temp_dir.path(), ".env.shared", "WINNER=shared\nFROM_SHARED=yes\n");
    write(temp_dir.path(), ".env.shared.local", "WINNER=shared-local\n");
    write(temp_dir.path(), ".env.dev", "WINNER=dev\n");
    write(temp_dir.path(), ".env.dev.local", "WINNER=dev-local\n");

    let resolved = resolve(temp_dir.path(), Environment::Dev).await.unwrap();

    // Highest-ranked assignment wins; untouched names survive from below.
    assert_eq!(resolved.get("WINNER"), Some("dev-local"));
    assert_eq!(resolved.get("FROM_ENTRY"), Some("yes"));
    assert_eq!(resolved.get("FROM_SHARED"), Some("yes"));
    assert_eq!(
        resolved.provenance("WINNER"),
        Some(&Provenance::File {
            role: SourceRole::EnvironmentLocal,
            file_name: ".env.dev.local".to_string(),
        })
    );
}

#[tokio::test]
async fn test_local_override_beats_shared_with_provenance() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env.shared", "TZ=UTC\n");
    write(temp_dir.path(), ".env.dev.local", "TZ=America/New_York\n");

    let resolved = resolve(temp_dir.path(), Environment::Dev).await.unwrap();
    assert_eq!(resolved.get("TZ"), Some("America/New_York"));
    assert_eq!(
        resolved.provenance("TZ").unwrap().to_string(),
        ".env.dev.local"
    );
}

#[tokio::test]
async fn test_environments_do_not_leak_into_each_other() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env.shared", "SHARED=yes\n");
    write(temp_dir.path(), ".env.dev", "DEV_ONLY=yes\n");
    write(temp_dir.path(), ".env.test", "TEST_ONLY=yes\n");

    let resolved = resolve(temp_dir.path(), Environment::Test).await.unwrap();
    assert_eq!(resolved.get("TEST_ONLY"), Some("yes"));
    assert_eq!(resolved.get("DEV_ONLY"), None);
}

#[tokio::test]
async fn test_production_variant_file_wins_over_production_local() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env.shared", "API_URL=https://shared\n");
    write(temp_dir.path(), ".env.production", "API_URL=https://prod\n");
    write(temp_dir.path(), ".env.production.local", "API_URL=https://local\n");
    write(
        temp_dir.path(),
        ".env.production.backend",
        "API_URL=https://backend\n",
    );

    let resolved = resolve(
        temp_dir.path(),
        Environment::Production(ProductionVariant::Backend),
    )
    .await
    .unwrap();
    assert_eq!(resolved.get("API_URL"), Some("https://backend"));
    assert_eq!(
        resolved.provenance("API_URL"),
        Some(&Provenance::File {
            role: SourceRole::ProductionVariant,
            file_name: ".env.production.backend".to_string(),
        })
    );
}

#[tokio::test]
async fn test_variants_read_only_their_own_file() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env.shared", "SHARED=yes\n");
    write(temp_dir.path(), ".env.production.backend", "TARGET=backend\n");
    write(temp_dir.path(), ".env.production.frontend", "TARGET=frontend\n");

    let backend = resolve(
        temp_dir.path(),
        Environment::Production(ProductionVariant::Backend),
    )
    .await
    .unwrap();
    let frontend = resolve(
        temp_dir.path(),
        Environment::Production(ProductionVariant::Frontend),
    )
    .await
    .unwrap();

    assert_eq!(backend.get("TARGET"), Some("backend"));
    assert_eq!(frontend.get("TARGET"), Some("frontend"));
}

#[tokio::test]
async fn test_production_requires_a_variant_through_the_facade() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env.shared", "SHARED=yes\n");

    let err = resolve_configuration(temp_dir.path(), "production", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::MissingProductionVariant));
}

#[tokio::test]
async fn test_unknown_environment_through_the_facade() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env.shared", "SHARED=yes\n");

    let err = resolve_configuration(temp_dir.path(), "staging", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::UnknownEnvironment(name) if name == "staging"));
}

#[tokio::test]
async fn test_facade_resolves_production_backend() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env.shared", "SHARED=yes\n");
    write(temp_dir.path(), ".env.production.backend", "TARGET=backend\n");

    let resolved = resolve_configuration(temp_dir.path(), "production", Some("backend"))
        .await
        .unwrap();
    assert_eq!(
        resolved.environment(),
        Environment::Production(ProductionVariant::Backend)
    );
    assert_eq!(resolved.get("TARGET"), Some("backend"));
}

#[tokio::test]
async fn test_malformed_line_reports_file_and_line_only() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        ".env.shared",
        "GOOD=1\n# comment\nNOT_AN_ASSIGNMENT\n",
    );

    let err = resolve(temp_dir.path(), Environment::Dev).await.unwrap_err();
    match &err {
        ResolveError::MalformedLine { path, line } => {
            assert!(path.ends_with(".env.shared"));
            assert_eq!(*line, 3);
        }
        other => panic!("expected MalformedLine, got {other:?}"),
    }
    // The message locates the problem without echoing the line itself.
    let message = err.to_string();
    assert!(message.contains(".env.shared"));
    assert!(!message.contains("NOT_AN_ASSIGNMENT"));
}

#[tokio::test]
async fn test_malformed_optional_file_still_fails() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env.shared", "GOOD=1\n");
    write(temp_dir.path(), ".env.dev.local", "broken\n");

    let err = resolve(temp_dir.path(), Environment::Dev).await.unwrap_err();
    assert!(matches!(err, ResolveError::MalformedLine { line: 1, .. }));
}

#[tokio::test]
async fn test_parsing_rules_apply_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        ".env.shared",
        "# service endpoints\n\nHOST = localhost\nGREETING=\"hello world\"\nDUPLICATE=first\nDUPLICATE=second\nEMPTY=\n",
    );

    let resolved = resolve(temp_dir.path(), Environment::Ci).await.unwrap();
    assert_eq!(resolved.get("HOST"), Some("localhost"));
    assert_eq!(resolved.get("GREETING"), Some("hello world"));
    assert_eq!(resolved.get("DUPLICATE"), Some("second"));
    assert_eq!(resolved.get("EMPTY"), Some(""));
    assert_eq!(resolved.len(), 4);
}

#[tokio::test]
async fn test_resolution_is_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env", "A=1\nB=2\n");
    write(temp_dir.path(), ".env.shared", "B=3\nC=4\n");
    write(temp_dir.path(), ".env.ci", "C=5\nD=6\n");

    let first = resolve(temp_dir.path(), Environment::Ci).await.unwrap();
    let second = resolve(temp_dir.path(), Environment::Ci).await.unwrap();
    assert_eq!(first, second);

    let names: Vec<&str> = first.names().collect();
    assert_eq!(names, vec!["A", "B", "C", "D"]);
}

#[tokio::test]
async fn test_base_dir_must_be_a_directory() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("not-a-dir");
    fs::write(&file_path, "x").unwrap();

    let err = resolve(&file_path, Environment::Dev).await.unwrap_err();
    assert!(matches!(err, ResolveError::BaseDirUnavailable { path } if path == file_path));
}

#[tokio::test]
async fn test_report_names_the_winning_sources() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env.shared", "TZ=UTC\nHOST=localhost\n");
    write(temp_dir.path(), ".env.dev.local", "TZ=America/New_York\n");

    let resolved = resolve(temp_dir.path(), Environment::Dev).await.unwrap();
    let report = resolved.report();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["environment"], "dev");
    let tz = json["variables"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["name"] == "TZ")
        .unwrap();
    assert_eq!(tz["value"], "America/New_York");
    assert_eq!(tz["source"], ".env.dev.local");
}

#[tokio::test]
async fn test_handle_refresh_swaps_in_new_files() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), ".env.shared", "RELEASE=1\n");

    let resolver = Resolver::builder()
        .with_base_dir(temp_dir.path())
        .with_environment(Environment::Ci)
        .build()
        .unwrap();
    let handle = ConfigHandle::initialize(resolver).await.unwrap();
    assert_eq!(handle.current().get("RELEASE"), Some("1"));

    write(temp_dir.path(), ".env.ci", "RELEASE=2\n");
    handle.refresh().await.unwrap();
    assert_eq!(handle.current().get("RELEASE"), Some("2"));
    assert_eq!(
        handle.current().provenance("RELEASE").unwrap().to_string(),
        ".env.ci"
    );
}
