// src/config.rs

use std::{env, fmt::Display, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::{
    db::{self, schema, MainDb},
    services::{
        prod_type::{MissingProdTypeLog, ProdTypeNormalizer},
        tracking_engine::TrackingEngine,
        tracking_queue, EmployeeService, ProductCodeService, TaskService, TrackingService,
        WorkstationService,
    },
};

/// Reader connections on the main file; only the tracking worker uses them.
const MAIN_READERS: u32 = 2;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub main_db_file: PathBuf,
    pub tracking_db_file: PathBuf,
    pub cors_origin: String,
    pub missing_prod_types_file: PathBuf,
    pub db_busy_timeout: Duration,
    pub tracking_readers: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            main_db_file: PathBuf::from("prodigiAllyDatabase.db"),
            tracking_db_file: PathBuf::from("trackingData.db"),
            cors_origin: "https://pro.oneflowcloud.com".to_string(),
            missing_prod_types_file: PathBuf::from("missing_prodTypes.txt"),
            db_busy_timeout: Duration::from_millis(5000),
            tracking_readers: 4,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        _ => Ok(default),
    }
}

impl Settings {
    /// Reads the environment (after `.env` was loaded); unset keys keep their defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env_or("HOST", defaults.host)?,
            port: env_or("PORT", defaults.port)?,
            main_db_file: env_or("MAIN_DB_FILE", defaults.main_db_file)?,
            tracking_db_file: env_or("TRACKING_DB_FILE", defaults.tracking_db_file)?,
            cors_origin: env_or("CORS_ORIGIN", defaults.cors_origin)?,
            missing_prod_types_file: env_or(
                "MISSING_PROD_TYPES_FILE",
                defaults.missing_prod_types_file,
            )?,
            db_busy_timeout: Duration::from_millis(env_or("DB_BUSY_TIMEOUT_MS", 5000u64)?),
            tracking_readers: env_or("TRACKING_READERS", defaults.tracking_readers)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub employee_service: EmployeeService,
    pub workstation_service: WorkstationService,
    pub task_service: TaskService,
    pub product_code_service: ProductCodeService,
    pub tracking_service: TrackingService,
}

impl AppState {
    /// Opens both database files, brings their schemas up to date and starts
    /// the tracking worker. The returned handle finishes once every clone of
    /// the state has been dropped and the queue has drained.
    pub async fn new(settings: Settings) -> anyhow::Result<(Self, JoinHandle<()>)> {
        let main_options = db::connect_options(&settings.main_db_file, settings.db_busy_timeout);
        let mut main_conn = db::open_connection(&main_options)
            .await
            .with_context(|| format!("failed to open {}", settings.main_db_file.display()))?;
        schema::init_main_db(&mut main_conn)
            .await
            .context("failed to initialise the main database")?;

        let tracking_options =
            db::connect_options(&settings.tracking_db_file, settings.db_busy_timeout);
        let mut tracking_conn = db::open_connection(&tracking_options)
            .await
            .with_context(|| format!("failed to open {}", settings.tracking_db_file.display()))?;
        schema::init_tracking_db(&mut tracking_conn)
            .await
            .context("failed to initialise the tracking database")?;
        db::close_quietly(tracking_conn).await;

        tracing::info!(
            "Databases ready: main={}, tracking={}",
            settings.main_db_file.display(),
            settings.tracking_db_file.display()
        );

        let main_reader = db::reader_pool(main_options, MAIN_READERS).await?;
        let tracking_reader =
            db::reader_pool(tracking_options.clone(), settings.tracking_readers).await?;

        let normalizer = ProdTypeNormalizer::new(
            main_reader,
            MissingProdTypeLog::new(&settings.missing_prod_types_file),
        );
        let (queue, worker) =
            tracking_queue::spawn_worker(tracking_options, TrackingEngine::new(normalizer));

        let main_db: MainDb = Arc::new(Mutex::new(main_conn));

        let state = Self {
            settings: Arc::new(settings),
            employee_service: EmployeeService::new(main_db.clone()),
            workstation_service: WorkstationService::new(main_db.clone()),
            task_service: TaskService::new(main_db.clone()),
            product_code_service: ProductCodeService::new(main_db),
            tracking_service: TrackingService::new(tracking_reader, queue),
        };
        Ok((state, worker))
    }
}
