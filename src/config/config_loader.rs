use std::{collections::HashMap, fmt::Display, path::Path, str::FromStr};

use super::{
    config_model::{App, Aws, Database, S3, Settings},
    error::ConfigurationError,
};

pub const DOTENV_FILE: &str = ".env";

type Result<T> = std::result::Result<T, ConfigurationError>;

pub fn load() -> Result<Settings> {
    load_from_path(DOTENV_FILE)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings> {
    let dotenv = read_dotenv(path.as_ref())?;
    let env = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));

    from_sources(dotenv, env)
}

/// Builds settings from dotenv pairs and environment pairs. Environment wins
/// over the dotenv file, which wins over the defaults.
pub fn from_sources<D, E>(dotenv: D, env: E) -> Result<Settings>
where
    D: IntoIterator<Item = (String, String)>,
    E: IntoIterator<Item = (String, String)>,
{
    let vars = EnvVars::merge(dotenv, env);

    let app = App {
        name: vars.string_or("APP_NAME", "HiddenCatch API"),
        version: vars.string_or("APP_VERSION", "0.1.0"),
        environment: vars.string_or("ENVIRONMENT", "development"),
        debug: vars.bool_or("DEBUG", false)?,
        allowed_origins: vars.list_or("ALLOWED_ORIGINS", &["http://localhost:3000"])?,
    };

    let database = Database {
        url: vars.string_or("DATABASE_URL", ""),
        echo: vars.bool_or("DATABASE_ECHO", false)?,
        pool_size: vars.number_or("DATABASE_POOL_SIZE", 5)?,
        max_overflow: vars.number_or("DATABASE_MAX_OVERFLOW", 10)?,
    };

    let aws = Aws {
        region: vars.string_or("AWS_REGION", "ap-northeast-2"),
        access_key_id: vars.optional_string("AWS_ACCESS_KEY_ID"),
        secret_access_key: vars.optional_string("AWS_SECRET_ACCESS_KEY"),
    };

    let s3 = S3 {
        bucket_name: vars.string_or("S3_BUCKET_NAME", ""),
        upload_prefix: vars.string_or("S3_UPLOAD_PREFIX", "uploads"),
        presign_ttl_seconds: vars.number_or("S3_PRESIGN_TTL_SECONDS", 900)?,
    };

    let rds_url = vars.required("RDS_URL")?;

    Ok(Settings {
        app,
        database,
        aws,
        s3,
        rds_url,
    })
}

fn read_dotenv(path: &Path) -> Result<Vec<(String, String)>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(dotenvy::Error::Io(err).into()),
    };

    let escaped = escape_bare_dollars(&contents);

    Ok(dotenvy::from_read_iter(escaped.as_bytes())
        .collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Only `${NAME}` is interpolated. A bare `$` outside single quotes and
/// comments is escaped so dotenvy keeps it literally.
fn escape_bare_dollars(contents: &str) -> String {
    let mut out = String::with_capacity(contents.len());
    let mut chars = contents.chars().peekable();
    let (mut strong_quote, mut weak_quote, mut escaped) = (false, false, false);
    let mut prev: Option<char> = None;

    while let Some(c) = chars.next() {
        if escaped {
            escaped = false;
            out.push(c);
            prev = Some(c);
            continue;
        }

        match c {
            '\\' if !strong_quote => escaped = true,
            '\'' if !weak_quote => strong_quote = !strong_quote,
            '"' if !strong_quote => weak_quote = !weak_quote,
            '#' if !strong_quote && !weak_quote && prev.is_none_or(char::is_whitespace) => {
                out.push(c);
                for c in chars.by_ref() {
                    out.push(c);
                    if c == '\n' {
                        break;
                    }
                }
                prev = Some('\n');
                continue;
            }
            '$' if !strong_quote && chars.peek() != Some(&'{') => out.push('\\'),
            _ => {}
        }

        out.push(c);
        prev = Some(c);
    }

    out
}

/// Variables keyed by lowercased name so lookups ignore case.
struct EnvVars {
    values: HashMap<String, String>,
}

impl EnvVars {
    fn merge<D, E>(dotenv: D, env: E) -> Self
    where
        D: IntoIterator<Item = (String, String)>,
        E: IntoIterator<Item = (String, String)>,
    {
        let values = dotenv
            .into_iter()
            .chain(env)
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect();

        Self { values }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    fn optional_string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn required(&self, key: &'static str) -> Result<String> {
        self.optional_string(key)
            .ok_or(ConfigurationError::Missing { field: key })
    }

    fn bool_or(&self, key: &'static str, default: bool) -> Result<bool> {
        match self.get(key) {
            Some(raw) => parse_bool(raw).ok_or_else(|| invalid(key, raw, "expected a boolean")),
            None => Ok(default),
        }
    }

    fn number_or<T>(&self, key: &'static str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(raw) => raw.trim().parse().map_err(|err: T::Err| invalid(key, raw, err)),
            None => Ok(default),
        }
    }

    fn list_or(&self, key: &'static str, default: &[&str]) -> Result<Vec<String>> {
        match self.get(key) {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|err| invalid(key, raw, format!("expected a JSON array of strings: {err}"))),
            None => Ok(default.iter().map(|v| v.to_string()).collect()),
        }
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(field: &'static str, value: &str, reason: impl Display) -> ConfigurationError {
    ConfigurationError::Invalid {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
