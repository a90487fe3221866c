use url::Url;

use crate::{
    ConfigLoadError,
    models::sources::{EnvConfig, FileDatabaseConfig},
};

const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Resolve the PostgreSQL connection URL.
///
/// Order: `DATABASE_URL`, then `[database] url` from the file, then a URL
/// composed from `DB_HOST` / `DB_PORT` / `DB_USER` / `DB_PASSWORD` /
/// `DB_NAME`. `DB_PASSWORD` is also applied to a file URL that carries no
/// password of its own.
pub fn resolve_database_url(
    env: &EnvConfig,
    file_database: &FileDatabaseConfig,
) -> Result<Option<String>, ConfigLoadError> {
    if let Some(url) = non_blank(&env.database_url) {
        return Ok(Some(url));
    }

    if let Some(stored_url) = non_blank(&file_database.url) {
        let mut parsed = Url::parse(&stored_url)
            .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
        if parsed.password().is_none()
            && let Some(password) = non_blank(&env.database_password)
        {
            parsed
                .set_password(Some(&password))
                .map_err(|_| ConfigLoadError::InvalidDatabasePassword)?;
        }
        return Ok(Some(parsed.to_string()));
    }

    let host = non_blank(&env.database_host);
    let user = non_blank(&env.database_user);
    let name = non_blank(&env.database_name);

    if let (Some(host), Some(user), Some(name)) = (host, user, name) {
        let port = env.database_port.unwrap_or(DEFAULT_POSTGRES_PORT);
        let mut url = Url::parse(&format!("postgresql://{host}:{port}/{name}"))
            .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
        url.set_username(&user).map_err(|_| {
            ConfigLoadError::InvalidDatabaseUsername {
                username: user.clone(),
            }
        })?;
        if let Some(password) = non_blank(&env.database_password) {
            url.set_password(Some(&password))
                .map_err(|_| ConfigLoadError::InvalidDatabasePassword)?;
        }
        return Ok(Some(url.to_string()));
    }

    Ok(None)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_env_url_wins() {
        let env = EnvConfig {
            database_url: Some("postgresql://env@db/runway".into()),
            database_host: Some("ignored".into()),
            ..Default::default()
        };
        let file = FileDatabaseConfig {
            url: Some("postgresql://file@db/runway".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_database_url(&env, &file).unwrap().as_deref(),
            Some("postgresql://env@db/runway")
        );
    }

    #[test]
    fn file_url_picks_up_password_from_env() {
        let env = EnvConfig {
            database_password: Some("s3cret".into()),
            ..Default::default()
        };
        let file = FileDatabaseConfig {
            url: Some("postgresql://runway@db:5432/capacity".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_database_url(&env, &file).unwrap().as_deref(),
            Some("postgresql://runway:s3cret@db:5432/capacity")
        );
    }

    #[test]
    fn composes_from_db_variables() {
        let env = EnvConfig {
            database_host: Some("pg.internal".into()),
            database_port: Some(6543),
            database_user: Some("monitor".into()),
            database_name: Some("storage".into()),
            database_password: Some("pw".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_database_url(&env, &FileDatabaseConfig::default())
                .unwrap()
                .as_deref(),
            Some("postgresql://monitor:pw@pg.internal:6543/storage")
        );
    }

    #[test]
    fn incomplete_db_variables_yield_none() {
        let env = EnvConfig {
            database_host: Some("pg.internal".into()),
            database_user: Some("monitor".into()),
            ..Default::default()
        };
        assert!(
            resolve_database_url(&env, &FileDatabaseConfig::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn malformed_file_url_is_an_error() {
        let file = FileDatabaseConfig {
            url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_database_url(&EnvConfig::default(), &file),
            Err(ConfigLoadError::InvalidDatabaseUrl { .. })
        ));
    }
}
