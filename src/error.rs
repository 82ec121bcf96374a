use crate::color::ColorError;
use crate::config::ConfigError;
use crate::ecs::EcsError;
use crate::factories::FactoryError;
use crate::platform::PlatformError;

/// Crate-level error, wrapping the error of every subsystem.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Ecs(#[from] EcsError),

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

pub type Result<T> = std::result::Result<T, Error>;
