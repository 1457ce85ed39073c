//! End-to-end demo: build a small cascade on disk, resolve it for two
//! environments, and print where every value came from.
//!
//! Run with `cargo run --example resolve`.

use envcascade::prelude::*;
use std::fs;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "envcascade=debug".into()),
        )
        .init();

    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join(".env"), "APP_NAME=demo\n")?;
    fs::write(
        dir.path().join(".env.shared"),
        "DATABASE_URL=postgres://localhost/demo\nTZ=UTC\nPORT=8080\n",
    )?;
    fs::write(dir.path().join(".env.dev"), "PORT=3000\n")?;
    fs::write(dir.path().join(".env.dev.local"), "TZ=America/New_York\n")?;
    fs::write(dir.path().join(".env.production"), "PORT=80\n")?;
    fs::write(
        dir.path().join(".env.production.backend"),
        "WORKERS=16\n",
    )?;

    // Plain resolution from a raw name, as a CLI would do it.
    let dev = resolve_configuration(dir.path(), "dev", None).await?;
    println!("--- dev ---");
    for (name, value) in dev.iter() {
        let source = dev
            .provenance(name)
            .map(ToString::to_string)
            .unwrap_or_default();
        println!("{name}={value}  (from {source})");
    }

    // Production with a variant and a provider-backed secret.
    let resolver = Resolver::builder()
        .with_base_dir(dir.path())
        .with_environment(Environment::Production(ProductionVariant::Backend))
        .with_secret_binding("DATABASE_PASSWORD")
        .with_secret_provider(StaticProvider::new().with_secret("DATABASE_PASSWORD", "hunter2"))
        .build()?;
    let production = resolver.resolve().await?;

    println!("\n--- production.backend (report, secrets redacted) ---");
    println!("{}", serde_json::to_string_pretty(&production.report())?);

    Ok(())
}
