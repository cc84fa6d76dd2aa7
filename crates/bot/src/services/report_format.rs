//! HTML message bodies for Telegram.

use chrono::{DateTime, FixedOffset};
use teloxide::utils::html::escape;

use common::config::AppConfig;
use common::models::{Analysis, FundSuggestion, HoldingEvaluation, SignalKind};
use strategy::price_levels;

// Telegram rejects messages above 4096 characters.
const MAX_MESSAGE_CHARS: usize = 4000;

fn stamp(now: DateTime<FixedOffset>) -> String {
    now.format("%Y-%m-%d %H:%M").to_string()
}

fn reasons(analysis: &Analysis) -> String {
    if analysis.signal.reasons.is_empty() {
        "-".to_string()
    } else {
        escape(&analysis.reasons_joined(", "))
    }
}

fn holding_line(e: &HoldingEvaluation) -> String {
    format!(
        "{}: {} | Last ₹{:.2} | Target ₹{:.2} | Stop ₹{:.2}",
        escape(&e.analysis.symbol),
        e.analysis.signal.kind,
        e.analysis.last(),
        e.target,
        e.stop
    )
}

fn pick_line(p: &Analysis) -> String {
    format!(
        "{}: ₹{:.2} | Signal: {}",
        escape(&p.symbol),
        p.last(),
        p.signal.kind
    )
}

fn fund_lines(funds: &[&FundSuggestion]) -> String {
    funds
        .iter()
        .map(|f| format!("{} - {}\n", escape(&f.name), escape(&f.reason)))
        .collect()
}

pub fn weekly_alert(evaluations: &[HoldingEvaluation], now: DateTime<FixedOffset>) -> String {
    let mut text = format!("<b>Weekly Portfolio Alert</b>\nDate: {}\n\n", stamp(now));
    if evaluations.is_empty() {
        text.push_str("No portfolio data available or no results.");
    }
    for e in evaluations {
        text.push_str(&format!("{}\nReasons: {}\n\n", holding_line(e), reasons(&e.analysis)));
    }
    text
}

pub fn monthly_picks(
    picks: &[Analysis],
    funds: &[&FundSuggestion],
    min_price: f64,
    max_price: f64,
    now: DateTime<FixedOffset>,
) -> String {
    let mut text = format!(
        "<b>Monthly Top 10 Picks (₹{:.0}-₹{:.0})</b>\nDate: {}\n\n",
        min_price,
        max_price,
        stamp(now)
    );
    if picks.is_empty() {
        text.push_str("No picks generated.\n\n");
    }
    for p in picks {
        text.push_str(&format!("{}\nReasons: {}\n\n", pick_line(p), reasons(p)));
    }
    text.push_str("<b>Mutual Fund Suggestions</b>\n");
    text.push_str(&fund_lines(funds));
    text
}

pub fn portfolio_status(evaluations: &[HoldingEvaluation]) -> String {
    let mut text = String::from("<b>Portfolio Status</b>\n\n");
    if evaluations.is_empty() {
        text.push_str("No portfolio data available.");
    }
    for e in evaluations {
        text.push_str(&holding_line(e));
        text.push('\n');
    }
    text
}

/// Holdings currently flagged SELL.
pub fn exit_alerts(evaluations: &[HoldingEvaluation]) -> String {
    let exits: Vec<&HoldingEvaluation> = evaluations
        .iter()
        .filter(|e| e.analysis.signal.kind == SignalKind::Sell)
        .collect();

    let mut text = String::from("<b>Exit Alerts</b>\n\n");
    if exits.is_empty() {
        text.push_str("No holdings are flagged for exit.");
    }
    for e in exits {
        text.push_str(&format!("{}\nReasons: {}\n\n", holding_line(e), reasons(&e.analysis)));
    }
    text
}

pub fn top_picks(picks: &[Analysis]) -> String {
    let mut text = String::from("<b>Top 10 Picks</b>\n\n");
    if picks.is_empty() {
        text.push_str("No picks generated.");
    }
    for p in picks {
        text.push_str(&pick_line(p));
        text.push('\n');
    }
    text
}

pub fn stock_summary(analysis: &Analysis) -> String {
    let (target, stop) = price_levels(analysis.last(), analysis.signal.kind);
    let snap = &analysis.snapshot;
    let metric = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "n/a".to_string());
    format!(
        "<b>{}</b>: Last ₹{:.2} | Signal: {}\nReasons: {}\nSMA50 {} | SMA200 {} | RSI {}\nTarget ₹{:.2} | Stop ₹{:.2}",
        escape(&analysis.symbol),
        analysis.last(),
        analysis.signal.kind,
        reasons(analysis),
        metric(snap.sma50),
        metric(snap.sma200),
        metric(snap.rsi),
        target,
        stop
    )
}

pub fn fund_list(funds: &[&FundSuggestion]) -> String {
    let mut text = String::from("<b>MF Suggestions</b>\n\n");
    if funds.is_empty() {
        text.push_str("No matching funds.");
    }
    text.push_str(&fund_lines(funds));
    text
}

pub fn settings(config: &AppConfig, holdings: usize, universe: usize) -> String {
    format!(
        "<b>Settings</b>\n\nWeekly report: {}\nMonthly picks: {}\nUTC offset: {}\nPrice band: ₹{:.0}-₹{:.0}\nHistory: {} of {} bars\nHoldings tracked: {}\nTickers screened: {}\n\nChange these through the host environment and restart the bot.",
        config.schedule.weekly,
        config.schedule.monthly,
        config.schedule.offset,
        config.picks.min_price,
        config.picks.max_price,
        escape(&config.market.history_range),
        escape(&config.market.history_interval),
        holdings,
        universe
    )
}

pub fn greeting(name: &str) -> String {
    format!(
        "Hello {}! I am your Stock &amp; MF Advisor Bot. Use the buttons or commands.\nCommands: /stock, /fund, /status, /picks, /exits, /settings",
        escape(name)
    )
}

pub fn startup_notice() -> String {
    "Hello from your Stock Bot, I am LIVE and will send weekly &amp; monthly alerts. Use /picks or /status anytime.".to_string()
}

/// Splits on line boundaries so each chunk fits in one Telegram message.
/// A single line longer than the limit is cut by characters.
pub fn split_message(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > MAX_MESSAGE_CHARS && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > MAX_MESSAGE_CHARS {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(MAX_MESSAGE_CHARS) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
