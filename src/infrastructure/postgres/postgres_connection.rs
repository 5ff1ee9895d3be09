use anyhow::{Result, bail};
use diesel::{
    Connection, PgConnection,
    connection::{CacheSize, InstrumentationEvent},
    r2d2::{ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool},
};
use tracing::debug;

use crate::config::config_model::Database;

#[derive(Debug, Default)]
struct PgConnectionCustomizer {
    echo: bool,
}

impl CustomizeConnection<PgConnection, R2d2Error> for PgConnectionCustomizer {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        conn.set_prepared_statement_cache_size(CacheSize::Disabled);

        if self.echo {
            conn.set_instrumentation(|event: InstrumentationEvent<'_>| {
                if let InstrumentationEvent::StartQuery { query, .. } = event {
                    debug!(target: "hidden_catch::sql", "{}", query);
                }
            });
        }

        Ok(())
    }
}

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

/// Keeps `pool_size` connections warm and allows up to `max_overflow` more
/// under load.
pub fn establish_connection(database: &Database) -> Result<PgPoolSquad> {
    if database.url.is_empty() {
        bail!("DATABASE_URL is empty");
    }

    let (max_size, min_idle) = pool_bounds(database)?;

    let manager = ConnectionManager::<PgConnection>::new(&database.url);
    let pool = Pool::builder()
        .max_size(max_size)
        .min_idle(Some(min_idle))
        .connection_customizer(Box::new(PgConnectionCustomizer {
            echo: database.echo,
        }))
        .build(manager)?;

    Ok(pool)
}

/// Returns `(max_size, min_idle)` for the pool. The total must be at least
/// one connection; a negative `pool_size` keeps no idle connections.
fn pool_bounds(database: &Database) -> Result<(u32, u32)> {
    let total = database.max_connections();
    let max_size = match u32::try_from(total) {
        Ok(size) if size > 0 => size,
        _ => bail!(
            "DATABASE_POOL_SIZE + DATABASE_MAX_OVERFLOW must be between 1 and {}, got {total}",
            u32::MAX
        ),
    };

    let min_idle = u32::try_from(database.pool_size.clamp(0, i64::from(max_size)))?;

    Ok((max_size, min_idle))
}
