//! Embedded PostgreSQL bootstrap for the Diesel adapter suites.
//!
//! Suites are opt-in: they run only with `RUN_PG_EMBEDDED=1`, because the
//! cluster downloads PostgreSQL binaries on first use.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use uuid::Uuid;
use waterlog::outbound::persistence::run_pending_migrations;

static PG_EMBED_BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 500;

/// True when the caller opted in to embedded PostgreSQL suites.
pub fn enabled() -> bool {
    std::env::var("RUN_PG_EMBEDDED").as_deref() == Ok("1")
}

fn pg_embed_target_dir() -> PathBuf {
    if let Some(target_dir) = std::env::var_os("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir).join("pg-embed");
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("target")
        .join("pg-embed")
}

fn is_transient_error(err: &str) -> bool {
    let err_lower = err.to_lowercase();
    [
        "connection reset",
        "connection refused",
        "timed out",
        "temporarily unavailable",
        "error decoding response body",
    ]
    .iter()
    .any(|pattern| err_lower.contains(pattern))
}

/// Start a cluster with data under the target directory, retrying
/// transient download failures.
pub fn test_cluster() -> Result<TestCluster, String> {
    let _bootstrap_guard = PG_EMBED_BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let base = pg_embed_target_dir().join(format!("bootstrap-{}", Uuid::new_v4()));
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");
    std::fs::create_dir_all(&runtime_dir).map_err(|err| err.to_string())?;
    std::fs::create_dir_all(&data_dir).map_err(|err| err.to_string())?;
    let _env_guard = env_lock::lock_env([
        ("PG_RUNTIME_DIR", Some(runtime_dir.to_string_lossy().into_owned())),
        ("PG_DATA_DIR", Some(data_dir.to_string_lossy().into_owned())),
    ]);

    let mut last_error = String::new();
    for attempt in 0..=MAX_RETRIES {
        match TestCluster::new() {
            Ok(cluster) => return Ok(cluster),
            Err(err) => {
                last_error = format!("{err:?}");
                if attempt < MAX_RETRIES && is_transient_error(&last_error) {
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * (1 << attempt)));
                } else {
                    break;
                }
            }
        }
    }
    Err(last_error)
}

/// Create a fresh migrated database and return its URL.
pub fn migrated_database(cluster: &TestCluster) -> Result<String, String> {
    let connection = cluster.connection();
    let name = format!("waterlog_{}", Uuid::new_v4().simple());
    let mut admin = Client::connect(&connection.database_url("postgres"), NoTls)
        .map_err(|err| err.to_string())?;
    admin
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| err.to_string())?;

    let url = connection.database_url(&name);
    run_pending_migrations(&url).map_err(|err| err.to_string())?;
    Ok(url)
}
