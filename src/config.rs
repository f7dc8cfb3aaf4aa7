//! Server bind configuration, read once at startup.

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 6969;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Load bind address from `CHAT_HOST` / `CHAT_PORT`.
    ///
    /// Missing or malformed values fall back to `0.0.0.0:6969` with a
    /// warning; startup never fails on configuration.
    pub fn from_env() -> Self {
        let host = std::env::var("CHAT_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match std::env::var("CHAT_PORT") {
            Ok(raw) => match raw.trim().parse() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!("invalid CHAT_PORT {:?}, using {}", raw, DEFAULT_PORT);
                    DEFAULT_PORT
                }
            },
            Err(_) => DEFAULT_PORT,
        };

        Self { host, port }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_when_unset() {
        std::env::remove_var("CHAT_HOST");
        std::env::remove_var("CHAT_PORT");

        let config = ServerConfig::from_env();
        assert_eq!(config.addr(), "0.0.0.0:6969");
    }

    #[test]
    #[serial]
    fn reads_host_and_port() {
        std::env::set_var("CHAT_HOST", "127.0.0.1");
        std::env::set_var("CHAT_PORT", "8080");

        let config = ServerConfig::from_env();
        assert_eq!(config.addr(), "127.0.0.1:8080");

        std::env::remove_var("CHAT_HOST");
        std::env::remove_var("CHAT_PORT");
    }

    #[test]
    #[serial]
    fn bad_port_falls_back() {
        std::env::set_var("CHAT_PORT", "not-a-port");

        let config = ServerConfig::from_env();
        assert_eq!(config.port, 6969);

        std::env::remove_var("CHAT_PORT");
    }
}
