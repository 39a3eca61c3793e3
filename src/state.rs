use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::users::repo::UserStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, users: Arc<dyn UserStore>) -> Self {
        let jwt = JwtKeys::from(&config.jwt);
        Self { config, jwt, users }
    }

    #[cfg(test)]
    pub fn fake(users: Arc<dyn UserStore>) -> Self {
        let config = Arc::new(AppConfig {
            database: crate::config::DatabaseConfig {
                url: crate::config::DEFAULT_DATABASE_URL.into(),
                max_connections: 1,
                run_migrations: false,
            },
            host: "127.0.0.1".into(),
            port: 0,
            jwt: crate::config::JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 20,
            },
        });
        Self::new(config, users)
    }
}
