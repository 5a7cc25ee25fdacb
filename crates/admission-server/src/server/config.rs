use admission_sin::{JsonFileStore, MemoryStore, RegistrationStore, SinPolicy};
use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use std::{fmt, path::PathBuf, sync::Arc};

/// Which registration store backs the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Process-local; contents are lost on restart.
    Memory,
    /// A JSON file on local disk.
    #[default]
    Json,
}

/// Runtime configuration for the `admission-server` binary.
///
/// Every value can come from a CLI flag or the environment; a `.env` file in
/// the working directory is loaded first.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "admission-server",
    version,
    about = "Admission registration backend with SIN issuance"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:3000"))]
    pub server_addr: String,

    /// Registration store backend.
    ///
    /// Environment variable: `STORE`
    #[arg(long, env = "STORE", value_enum, default_value_t = StoreKind::Json)]
    pub store: StoreKind,

    /// File used by the `json` store. Parent directories are created on the
    /// first write.
    ///
    /// Environment variable: `DATA_PATH`
    #[arg(long, env = "DATA_PATH", default_value = "data/registrations.json")]
    pub data_path: PathBuf,

    /// Bearer token required by admin endpoints.
    ///
    /// Environment variable: `ADMIN_TOKEN`
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: String,

    /// How SIN discriminators are chosen: `random` or `sequential`.
    ///
    /// Environment variable: `SIN_POLICY`
    #[arg(long, env = "SIN_POLICY", default_value_t = String::from("random"))]
    pub sin_policy: String,

    /// Upper bound on `limit` for the registration listing.
    ///
    /// Environment variable: `MAX_PAGE_SIZE`
    #[arg(long, env = "MAX_PAGE_SIZE", default_value_t = 500)]
    pub max_page_size: usize,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub store: StoreKind,
    pub data_path: PathBuf,
    pub admin_token: String,
    pub sin_policy: SinPolicy,
    pub max_page_size: usize,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.admin_token.trim().is_empty() {
            bail!("ADMIN_TOKEN must not be empty");
        }

        if args.max_page_size == 0 {
            bail!("MAX_PAGE_SIZE must be greater than 0");
        }

        if args.server_addr.trim().is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        let sin_policy = args
            .sin_policy
            .parse::<SinPolicy>()
            .map_err(anyhow::Error::msg)
            .context("invalid SIN_POLICY")?;

        Ok(Self {
            server_addr: args.server_addr,
            store: args.store,
            data_path: args.data_path,
            admin_token: args.admin_token,
            sin_policy,
            max_page_size: args.max_page_size,
        })
    }
}

impl ServerConfig {
    /// Opens the configured store.
    pub fn open_store(&self) -> anyhow::Result<Arc<dyn RegistrationStore>> {
        Ok(match self.store {
            StoreKind::Memory => Arc::new(MemoryStore::new()),
            StoreKind::Json => Arc::new(
                JsonFileStore::open(&self.data_path)
                    .with_context(|| format!("failed to open {}", self.data_path.display()))?,
            ),
        })
    }
}

// Keeps the admin token out of startup logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("server_addr", &self.server_addr)
            .field("store", &self.store)
            .field("data_path", &self.data_path)
            .field("admin_token", &"<redacted>")
            .field("sin_policy", &self.sin_policy)
            .field("max_page_size", &self.max_page_size)
            .finish()
    }
}
