use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session_secret: String,
    pub site_url: String,
    pub smtp: Option<SmtpConfig>,
    pub admin_email: Option<String>,
    pub telegram: Option<TelegramConfig>,
    pub upi: UpiConfig,
    pub google_oauth: Option<OAuthConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct UpiConfig {
    pub upi_id: String,
    pub payee_name: String,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let session_secret = env::var("SESSION_SECRET")?;
        let site_url =
            env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let smtp = match (
            env::var("SMTP_HOST"),
            env::var("SMTP_USERNAME"),
            env::var("SMTP_PASSWORD"),
            env::var("MAIL_FROM"),
        ) {
            (Ok(host), Ok(username), Ok(password), Ok(from_address)) => Some(SmtpConfig {
                host,
                port: env::var("SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse::<u16>().ok())
                    .unwrap_or(587),
                username,
                password,
                from_address,
            }),
            _ => None,
        };

        let telegram = match (env::var("TELEGRAM_BOT_TOKEN"), env::var("TELEGRAM_CHAT_ID")) {
            (Ok(bot_token), Ok(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        let upi = UpiConfig {
            upi_id: env::var("UPI_ID").unwrap_or_else(|_| "shop@upi".to_string()),
            payee_name: env::var("UPI_PAYEE_NAME").unwrap_or_else(|_| "Storefront".to_string()),
        };

        let google_oauth = match (env::var("GOOGLE_CLIENT_ID"), env::var("GOOGLE_CLIENT_SECRET")) {
            (Ok(client_id), Ok(client_secret)) => Some(OAuthConfig {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            host,
            port,
            session_secret,
            site_url,
            smtp,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            telegram,
            upi,
            google_oauth,
        })
    }
}
