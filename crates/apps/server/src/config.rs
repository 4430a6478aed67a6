use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub addr: SocketAddr,
    /// Directory holding the map page and the wasm client package.
    pub static_root: PathBuf,
    /// Per-subscriber backlog of the broadcast channel.
    pub channel_capacity: usize,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, String> {
        let addr = env::var("WAYPOST_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let addr = addr
            .parse()
            .map_err(|e| format!("invalid WAYPOST_ADDR {addr:?}: {e}"))?;
        let static_root = env::var("WAYPOST_STATIC_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("crates/apps/server/static"));

        Ok(Self {
            addr,
            static_root,
            channel_capacity: env_var_usize("WAYPOST_CHANNEL_CAPACITY", 256).max(1),
        })
    }
}

fn env_var_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
