use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use teloxide::Bot;
use tokio::sync::broadcast;
use tracing::{debug, info};

use common::actors::ActorType;
use common::config::AppConfig;
use common::logger;
use market_data::{MarketDataProvider, YahooClient};
use storage::{FundCatalogRepository, PortfolioRepository, ReportWriter, UniverseRepository};

use crate::actors::supervisor::Supervisor;
use crate::services::advisor_service::AdvisorService;
use crate::services::command_service::{CommandContext, CommandService};
use crate::services::report_format;
use crate::services::report_job::{JobKind, ReportJob};
use crate::services::telegram_service::{Notification, TelegramNotifier, TelegramService};

mod actors;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    debug!("System starting up...");

    let config = Arc::new(AppConfig::from_env().context("loading configuration")?);
    debug!("Configuration: {:?}", config);

    let portfolio = PortfolioRepository::load(&config.paths.portfolio_file)?;
    let universe = UniverseRepository::load(&config.paths.tickers_file)?;
    let funds = Arc::new(FundCatalogRepository::load(config.paths.funds_file.as_deref())?);

    let provider: Arc<dyn MarketDataProvider> = Arc::new(YahooClient::new(&config.market)?);
    let advisor = Arc::new(AdvisorService::new(provider, &config, portfolio, universe));
    let writer = ReportWriter::new(config.paths.reports_dir.clone());

    let bot = Bot::new(config.telegram.bot_token.clone());
    let notifier = TelegramNotifier::new(bot.clone(), config.telegram.chat_id);
    let (notify_tx, _) = broadcast::channel::<Notification>(64);

    let mut supervisor = Supervisor::new();

    let notifier_for_service = notifier.clone();
    let tx_for_service = notify_tx.clone();
    supervisor.register_actor(
        ActorType::NotifierActor,
        Box::new(move || {
            Box::new(TelegramService::new(
                notifier_for_service.clone(),
                tx_for_service.subscribe(),
            ))
        }),
    );

    let context = Arc::new(CommandContext {
        advisor: advisor.clone(),
        config: config.clone(),
        funds: funds.as_ref().clone(),
    });
    let bot_for_commands = bot.clone();
    supervisor.register_actor(
        ActorType::CommandActor,
        Box::new(move || Box::new(CommandService::new(bot_for_commands.clone(), context.clone()))),
    );

    for (actor_type, kind, schedule) in [
        (ActorType::WeeklyReportActor, JobKind::Weekly, config.schedule.weekly),
        (ActorType::MonthlyPicksActor, JobKind::Monthly, config.schedule.monthly),
    ] {
        let offset = config.schedule.offset;
        let advisor = advisor.clone();
        let writer = writer.clone();
        let funds = funds.clone();
        let notify_tx = notify_tx.clone();
        supervisor.register_actor(
            actor_type,
            Box::new(move || {
                Box::new(ReportJob::new(
                    kind,
                    schedule,
                    offset,
                    advisor.clone(),
                    writer.clone(),
                    funds.clone(),
                    notify_tx.clone(),
                ))
            }),
        );
    }

    info!(
        "Bot started: weekly report {}, monthly picks {}",
        config.schedule.weekly, config.schedule.monthly
    );
    notifier
        .deliver_or_log(&Notification::text(report_format::startup_notice()))
        .await;

    tokio::select! {
        _ = supervisor.start() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down.");
        }
    }
    Ok(())
}
