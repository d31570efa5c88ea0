// region:    --- Imports
use crate::account::jwt::TokenIssuer;
use crate::config::{Config, StorageBackend};
use crate::database::DatabaseManager;
use crate::message_broker::{KafkaNotifier, KafkaProducer, LogNotifier, Notifier};
use crate::storage::{CloudinaryStorage, FileStorage, LocalStorage};
use crate::message_broker::BrokerError;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

// endregion: --- Imports

#[derive(Debug, Error)]
pub enum StateError {
    #[error("cloudinary storage needs a cloud name and upload preset")]
    MissingCloudinary,

    #[error("notifier setup failed: {0}")]
    Broker(#[from] BrokerError),
}

/// Everything a handler needs, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenIssuer>,
    pub storage: Arc<dyn FileStorage>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseManager>,
        config: Config,
        storage: Arc<dyn FileStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let tokens = Arc::new(TokenIssuer::new(&config.jwt_secret, config.jwt_expires_days));
        Self {
            db,
            config: Arc::new(config),
            tokens,
            storage,
            notifier,
        }
    }

    /// Wire storage and notifier from configuration.
    pub fn from_config(db: Arc<DatabaseManager>, config: Config) -> Result<Self, StateError> {
        let storage: Arc<dyn FileStorage> = match config.storage_backend {
            StorageBackend::Local => {
                info!("{:<12} --> local storage in {}", "State", config.upload_dir);
                Arc::new(LocalStorage::new(&config.upload_dir))
            }
            StorageBackend::Cloudinary => {
                let (Some(cloud_name), Some(preset)) = (
                    config.cloudinary_cloud_name.as_deref(),
                    config.cloudinary_upload_preset.as_deref(),
                ) else {
                    return Err(StateError::MissingCloudinary);
                };
                info!("{:<12} --> cloudinary storage ({})", "State", cloud_name);
                Arc::new(CloudinaryStorage::new(cloud_name, preset))
            }
        };

        let notifier: Arc<dyn Notifier> = match config.kafka_brokers.as_deref() {
            Some(brokers) => {
                info!("{:<12} --> kafka notifications via {}", "State", brokers);
                let producer = KafkaProducer::new(brokers)?;
                Arc::new(KafkaNotifier::new(producer, config.notification_topic.clone()))
            }
            None => {
                info!("{:<12} --> KAFKA_BROKERS not set, logging notifications", "State");
                Arc::new(LogNotifier)
            }
        };

        Ok(Self::new(db, config, storage, notifier))
    }
}
