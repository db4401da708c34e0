use std::env;

const DEFAULT_SMTP_PORT: u16 = 587;

/// Outgoing-mail settings. All of SMTP_HOST, SMTP_USERNAME and
/// SMTP_PASSWORD must be present for mail to be enabled; a deployment
/// without them simply never sends anything.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    pub frontend_url: String,
}

impl EmailConfig {
    pub fn from_env() -> Option<Self> {
        let smtp_host = env::var("SMTP_HOST").ok()?;
        let smtp_username = env::var("SMTP_USERNAME").ok()?;
        let smtp_password = env::var("SMTP_PASSWORD").ok()?;

        let smtp_port = parse_port(env::var("SMTP_PORT").ok());

        // Without an explicit sender, mail goes out as the login user.
        let from_address =
            env::var("SMTP_FROM").unwrap_or_else(|_| format!("Chirp <{smtp_username}>"));

        Some(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_address,
            frontend_url: frontend_url(),
        })
    }
}

/// Base URL reset links point at. Read separately so the link target is
/// right even when SMTP itself is not configured.
pub fn frontend_url() -> String {
    env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn parse_port(raw: Option<String>) -> u16 {
    let raw = match raw {
        Some(r) => r,
        None => return DEFAULT_SMTP_PORT,
    };

    match raw.trim().parse() {
        Ok(port) => port,
        Err(_) => {
            tracing::warn!("Invalid SMTP_PORT '{raw}', using {DEFAULT_SMTP_PORT}");
            DEFAULT_SMTP_PORT
        }
    }
}
