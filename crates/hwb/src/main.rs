use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use hwb_core::{config::Config, critical, poller::Poller};
use hwb_practicum::PracticumClient;
use hwb_telegram::TelegramMessenger;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), hwb_core::Error> {
    hwb_core::config::load_dotenv_if_present(std::path::Path::new(".env"));
    hwb_core::logging::init("hwb", &hwb_core::config::log_file_path())?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            critical!("Required configuration is missing, program stopped: {e}");
            return Err(e);
        }
    };

    let messenger = Arc::new(TelegramMessenger::from_token(&cfg.telegram_token));
    let api = Arc::new(PracticumClient::from_config(&cfg)?);
    tracing::info!("hwb started, notifying chat {}", cfg.telegram_chat_id);

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    Poller::new(cfg, api, messenger).run(shutdown).await
}
