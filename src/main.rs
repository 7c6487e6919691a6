use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use redis::aio::ConnectionManager;
use tracing_subscriber::filter::LevelFilter;

use supportdesk::antivirus::clamav::ClamAvScanner;
use supportdesk::antivirus::AttachmentScanner;
use supportdesk::config::Config;
use supportdesk::mail::mailer::SmtpMailer;
use supportdesk::queue::redis_queue::RedisNotificationQueue;
use supportdesk::worker::notification_worker::NotificationWorker;

// Notification dispatcher daemon. Ticket operations run inside the API
// processes through the library; mail delivery is decoupled into this
// process so a slow SMTP peer never blocks a request.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    dotenv().ok();

    let config = Config::init();

    let redis = match redis::Client::open(config.redis_url.as_str()) {
        Ok(client) => match ConnectionManager::new(client).await {
            Ok(conn) => {
                println!("✅ Connection to Redis is successful!");
                Arc::new(conn)
            }
            Err(err) => {
                println!("🔥 Failed to connect to Redis: {:?}", err);
                std::process::exit(1);
            }
        },
        Err(err) => {
            println!("🔥 Failed to create Redis client: {:?}", err);
            std::process::exit(1);
        }
    };

    let scanner = ClamAvScanner::new(
        config.clamav_addr.clone(),
        Duration::from_secs(config.clamav_timeout_secs),
    );
    if scanner.available().await {
        tracing::info!("ClamAV daemon is reachable at {}", config.clamav_addr);
    } else {
        // attachments fail closed until the daemon comes back
        tracing::warn!("ClamAV daemon is not reachable at {}", config.clamav_addr);
    }

    let mailer = match SmtpMailer::new(&config) {
        Ok(mailer) => Arc::new(mailer),
        Err(err) => {
            println!("🔥 Failed to configure SMTP transport: {}", err);
            std::process::exit(1);
        }
    };
    let queue = Arc::new(RedisNotificationQueue::new(redis));

    println!("🚀 Notification dispatcher is running");

    let mut workers = Vec::new();
    for _ in 0..config.notification_workers.max(1) {
        let worker = NotificationWorker::new(queue.clone(), mailer.clone());
        workers.push(tokio::spawn(worker.run()));
    }

    for worker in workers {
        let _ = worker.await;
    }
}
