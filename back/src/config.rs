use std::{
    fs, io,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 7890;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://todo.db?mode=rwc";

/// Server settings, read from a RON file such as
///
/// ```ron
/// (
///     port: 8080,
///     database_url: "sqlite://todo.db?mode=rwc",
///     tls: Some((cert: "/run/secrets/cert.pem", key: "/run/secrets/key.pem")),
/// )
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub port: u16,
    pub database_url: String,
    pub tls: Option<TlsSettings>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsSettings {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: String::from(DEFAULT_DATABASE_URL),
            tls: None,
        }
    }
}

impl Settings {
    /// Reads `path`, falling back to the defaults when it does not exist.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => eyre::bail!(err),
        };

        Ok(ron::de::from_reader(file)?)
    }

    pub fn from_ron(source: &str) -> eyre::Result<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::from(([0; 4], self.port))
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Todo REST API server")]
pub struct Args {
    /// RON settings file
    #[arg(long, default_value = "config.ron")]
    pub config: PathBuf,

    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// PEM certificate, enables TLS together with --tls-key
    #[arg(long, env = "SSL_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    #[arg(long, env = "SSL_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}

impl Args {
    /// Loads the settings file and applies command line overrides on top.
    pub fn settings(&self) -> eyre::Result<Settings> {
        let settings = Settings::load(&self.config)?;
        Ok(self.apply(settings))
    }

    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(port) = self.port {
            settings.port = port;
        }

        if let Some(url) = &self.database_url {
            settings.database_url = url.clone();
        }

        if let (Some(cert), Some(key)) = (&self.tls_cert, &self.tls_key) {
            settings.tls = Some(TlsSettings {
                cert: cert.clone(),
                key: key.clone(),
            });
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let settings = Settings::load(Path::new("does/not/exist.ron")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.address().port(), DEFAULT_PORT);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = Settings::from_ron("(port: 8080)").unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert!(settings.tls.is_none());
    }

    #[test]
    fn reads_tls_section() {
        let settings =
            Settings::from_ron(r#"(tls: Some((cert: "cert.pem", key: "key.pem")))"#).unwrap();
        let tls = settings.tls.unwrap();
        assert_eq!(tls.cert, PathBuf::from("cert.pem"));
        assert_eq!(tls.key, PathBuf::from("key.pem"));
    }

    #[test]
    fn rejects_malformed_file() {
        assert!(Settings::from_ron("(port: \"eighty\")").is_err());
    }

    #[test]
    fn flags_override_file() {
        let args = Args::try_parse_from([
            "back",
            "--port",
            "9000",
            "--database-url",
            "sqlite::memory:",
            "--tls-cert",
            "c.pem",
            "--tls-key",
            "k.pem",
        ])
        .unwrap();

        let settings = args.apply(Settings::from_ron("(port: 8080)").unwrap());
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.tls.unwrap().key, PathBuf::from("k.pem"));
    }

    #[test]
    fn tls_flags_must_come_together() {
        assert!(Args::try_parse_from(["back", "--tls-cert", "c.pem"]).is_err());
    }
}
