// src/config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    // Antivirus daemon (clamd) configuration
    pub clamav_addr: String,
    pub clamav_timeout_secs: u64,
    // Object storage configuration
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_bucket: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    // Mail transport configuration
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from: String,
    pub notification_workers: usize,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let redis_url = std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let clamav_addr = std::env::var("CLAMAV_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3310".to_string());
        let clamav_timeout_secs = std::env::var("CLAMAV_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let s3_endpoint = std::env::var("S3_ENDPOINT").expect("S3_ENDPOINT must be set");
        let s3_region = std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let s3_bucket = std::env::var("S3_BUCKET").expect("S3_BUCKET must be set");
        let s3_access_key = std::env::var("S3_ACCESS_KEY").expect("S3_ACCESS_KEY must be set");
        let s3_secret_key = std::env::var("S3_SECRET_KEY").expect("S3_SECRET_KEY must be set");

        let smtp_host = std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let smtp_username = std::env::var("SMTP_USERNAME").unwrap_or_else(|_| "".to_string());
        let smtp_password = std::env::var("SMTP_PASSWORD").unwrap_or_else(|_| "".to_string());
        let smtp_from = std::env::var("SMTP_FROM")
            .unwrap_or_else(|_| "Support <noreply@localhost>".to_string());
        let notification_workers = std::env::var("NOTIFICATION_WORKERS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1);

        Config {
            database_url,
            redis_url,
            clamav_addr,
            clamav_timeout_secs,
            s3_endpoint,
            s3_region,
            s3_bucket,
            s3_access_key,
            s3_secret_key,
            smtp_host,
            smtp_username,
            smtp_password,
            smtp_from,
            notification_workers,
        }
    }
}
