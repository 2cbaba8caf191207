//! Server configuration.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use battle_runtime::RuntimeConfig;

/// Configuration for the battle server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// RON world file with cards, challenges and starting games.
    pub world_path: PathBuf,
    /// TOML achievement catalog. The built-in catalog is used when absent.
    pub achievements_path: Option<PathBuf>,
    pub runtime: RuntimeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            world_path: PathBuf::from("data/world.ron"),
            achievements_path: Some(PathBuf::from("data/achievements.toml")),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `BATTLE_HOST`, `BATTLE_PORT`: listen address
    /// - `BATTLE_WORLD`: world file path
    /// - `BATTLE_ACHIEVEMENTS`: achievement catalog path (empty string uses
    ///   the built-in catalog)
    ///
    /// Pacing and channel sizes come from [`RuntimeConfig::from_env`].
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(host) = read_env::<IpAddr>("BATTLE_HOST") {
            config.host = host;
        }
        if let Some(port) = read_env::<u16>("BATTLE_PORT") {
            config.port = port;
        }
        if let Ok(path) = env::var("BATTLE_WORLD") {
            config.world_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("BATTLE_ACHIEVEMENTS") {
            config.achievements_path = (!path.is_empty()).then(|| PathBuf::from(path));
        }
        config.runtime = RuntimeConfig::from_env();

        config
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
