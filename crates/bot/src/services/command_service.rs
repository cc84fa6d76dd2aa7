use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, ParseMode};
use teloxide::utils::command::{BotCommands, ParseError};
use tokio::sync::mpsc;
use tracing::{info, warn};

use common::actors::{Actor, ActorType, ControlMessage};
use common::config::AppConfig;
use common::models::FundSuggestion;
use strategy::suggest_funds;

use crate::services::advisor_service::AdvisorService;
use crate::services::report_format::{self, split_message};

fn rest_of_line(input: String) -> Result<(String,), ParseError> {
    Ok((input.trim().to_string(),))
}

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Stock & MF advisor commands:")]
pub enum Command {
    #[command(description = "show the welcome keyboard.")]
    Start,
    #[command(description = "list the commands.")]
    Help,
    #[command(description = "signal, target and stop for every holding.")]
    Status,
    #[command(description = "holdings currently flagged SELL.")]
    Exits,
    #[command(description = "top 10 picks inside the price band.")]
    Picks,
    #[command(description = "analyse one ticker, e.g. /stock INFY.", parse_with = rest_of_line)]
    Stock(String),
    #[command(description = "mutual fund suggestions, optionally filtered by name.", parse_with = rest_of_line)]
    Fund(String),
    #[command(description = "show schedules and screening settings.")]
    Settings,
}

const BUTTON_STATUS: &str = "📊 Portfolio Status";
const BUTTON_PICKS: &str = "📈 Top 10 Picks";
const BUTTON_EXITS: &str = "🚪 Exit Alert";
const BUTTON_FUNDS: &str = "💰 Mutual Funds";
const BUTTON_SETTINGS: &str = "⚙️ Settings";

impl Command {
    /// Maps a reply-keyboard label back to the command it stands for.
    pub fn from_button(text: &str) -> Option<Self> {
        match text.trim() {
            BUTTON_STATUS => Some(Self::Status),
            BUTTON_PICKS => Some(Self::Picks),
            BUTTON_EXITS => Some(Self::Exits),
            BUTTON_FUNDS => Some(Self::Fund(String::new())),
            BUTTON_SETTINGS => Some(Self::Settings),
            _ => None,
        }
    }
}

fn keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BUTTON_STATUS), KeyboardButton::new(BUTTON_PICKS)],
        vec![KeyboardButton::new(BUTTON_EXITS), KeyboardButton::new(BUTTON_FUNDS)],
        vec![KeyboardButton::new(BUTTON_SETTINGS)],
    ])
    .resize_keyboard()
}

/// Shared state handed to every handler.
pub struct CommandContext {
    pub advisor: Arc<AdvisorService>,
    pub config: Arc<AppConfig>,
    pub funds: Vec<FundSuggestion>,
}

impl CommandContext {
    fn chat_id(&self) -> ChatId {
        ChatId(self.config.telegram.chat_id)
    }

    /// Builds the HTML reply for a command. `/start` is answered separately
    /// because it carries the keyboard.
    pub async fn reply_for(&self, cmd: &Command, user: &str) -> String {
        match cmd {
            Command::Start => report_format::greeting(user),
            Command::Help => teloxide::utils::html::escape(&Command::descriptions().to_string()),
            Command::Status => {
                report_format::portfolio_status(&self.advisor.check_portfolio().await)
            }
            Command::Exits => report_format::exit_alerts(&self.advisor.check_portfolio().await),
            Command::Picks => report_format::top_picks(&self.advisor.monthly_picks().await),
            Command::Stock(ticker) if ticker.is_empty() => "Usage: /stock &lt;TICKER&gt;".to_string(),
            Command::Stock(ticker) => match self.advisor.analyze(ticker).await {
                Ok(analysis) => report_format::stock_summary(&analysis),
                Err(e) => {
                    info!("/stock {} found nothing: {}", ticker, e);
                    "No data for this ticker.".to_string()
                }
            },
            Command::Fund(query) => {
                report_format::fund_list(&suggest_funds(&self.funds, query))
            }
            Command::Settings => report_format::settings(
                &self.config,
                self.advisor.portfolio().len(),
                self.advisor.universe_len(),
            ),
        }
    }
}

async fn answer(bot: Bot, msg: Message, cmd: Command, ctx: Arc<CommandContext>) -> ResponseResult<()> {
    let user = msg.chat.first_name().unwrap_or("User").to_string();
    let reply = ctx.reply_for(&cmd, &user).await;

    for (chunk, with_keyboard) in outgoing(&cmd, &reply) {
        let request = bot.send_message(msg.chat.id, chunk).parse_mode(ParseMode::Html);
        if with_keyboard {
            request.reply_markup(keyboard()).await?;
        } else {
            request.await?;
        }
    }
    Ok(())
}

/// Reply chunks in send order, flagged when the keyboard rides along.
/// Only the first chunk of `/start` carries it.
fn outgoing(cmd: &Command, reply: &str) -> Vec<(String, bool)> {
    split_message(reply)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| (chunk, i == 0 && *cmd == Command::Start))
        .collect()
}

async fn answer_button(bot: Bot, msg: Message, ctx: Arc<CommandContext>) -> ResponseResult<()> {
    let Some(cmd) = msg.text().and_then(Command::from_button) else {
        return Ok(());
    };
    answer(bot, msg, cmd, ctx).await
}

fn schema() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .filter(|msg: Message, ctx: Arc<CommandContext>| {
            let allowed = msg.chat.id == ctx.chat_id();
            if !allowed {
                warn!("Ignoring message from unknown chat {}", msg.chat.id);
            }
            allowed
        })
        .branch(dptree::entry().filter_command::<Command>().endpoint(answer))
        .branch(dptree::endpoint(answer_button))
}

/// Long-polls Telegram and answers commands from the configured chat.
pub struct CommandService {
    bot: Bot,
    context: Arc<CommandContext>,
}

impl CommandService {
    pub fn new(bot: Bot, context: Arc<CommandContext>) -> Self {
        Self { bot, context }
    }
}

#[async_trait]
impl Actor for CommandService {
    fn name(&self) -> ActorType {
        ActorType::CommandActor
    }

    async fn run(&mut self, _supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        info!("Starting Telegram command dispatcher");

        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!("Could not register bot commands: {}", e);
        }

        Dispatcher::builder(self.bot.clone(), schema())
            .dependencies(dptree::deps![self.context.clone()])
            .default_handler(|_| async {})
            .build()
            .dispatch()
            .await;

        bail!("Telegram dispatcher stopped")
    }
}
