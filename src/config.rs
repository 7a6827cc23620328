use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Where uploaded pictures end up.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Files on local disk, served back under `/uploads`.
    Local { dir: PathBuf },
    /// S3 or MinIO bucket; references are presigned GET URLs.
    S3 {
        endpoint: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        region: String,
        url_ttl_secs: u64,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    /// When set, only the owner may update or delete a tattoo.
    pub tattoo_owner_only: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| get(key).with_context(|| format!("{key} is not set"));

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => {
                let user = required("DB_USER")?;
                let password = required("DB_PASSWORD")?;
                let name = required("DB_NAME")?;
                let host = get("DB_HOST").unwrap_or_else(|| "localhost:5432".into());
                format!("postgres://{user}:{password}@{host}/{name}")
            }
        };

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "tattoo-gallery".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "tattoo-gallery-users".into()),
            ttl_minutes: parse_or(&get, "JWT_TTL_MINUTES", 60 * 24 * 7)?,
        };

        let storage = match get("STORAGE_BACKEND").as_deref().unwrap_or("local") {
            "local" => StorageConfig::Local {
                dir: get("UPLOADS_DIR").unwrap_or_else(|| "uploads".into()).into(),
            },
            "s3" => StorageConfig::S3 {
                endpoint: required("S3_ENDPOINT")?,
                bucket: required("S3_BUCKET")?,
                access_key: required("S3_ACCESS_KEY")?,
                secret_key: required("S3_SECRET_KEY")?,
                region: get("S3_REGION").unwrap_or_else(|| "us-east-1".into()),
                url_ttl_secs: parse_or(&get, "S3_URL_TTL_SECS", 60 * 60 * 24 * 7)?,
            },
            other => anyhow::bail!("unknown STORAGE_BACKEND {other:?}, expected local or s3"),
        };

        let port = match get("APP_PORT").or_else(|| get("PORT")) {
            Some(v) => v.parse().with_context(|| format!("invalid port {v:?}"))?,
            None => 4444,
        };

        Ok(Self {
            database_url,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10)?,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt,
            storage,
            tattoo_owner_only: parse_or(&get, "TATTOO_OWNER_ONLY", false)?,
        })
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {v:?}")),
        None => Ok(default),
    }
}
