#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub aws: Aws,
    pub s3: S3,
    pub rds_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct App {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub debug: bool,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    pub url: String,
    pub echo: bool,
    pub pool_size: i64,
    pub max_overflow: i64,
}

impl Database {
    /// Upper bound on open connections: the steady pool plus its overflow.
    pub fn max_connections(&self) -> i64 {
        self.pool_size.saturating_add(self.max_overflow)
    }
}

#[derive(Clone, PartialEq)]
pub struct Aws {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

// Credentials never end up in logs.
impl std::fmt::Debug for Aws {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aws")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "***"))
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct S3 {
    pub bucket_name: String,
    pub upload_prefix: String,
    pub presign_ttl_seconds: i64,
}
