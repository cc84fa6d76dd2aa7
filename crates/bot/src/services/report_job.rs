use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use common::AdvisorError;
use common::actors::{Actor, ActorType, ControlMessage};
use common::models::FundSuggestion;
use common::schedule::Schedule;
use storage::{ExportError, ReportWriter};
use strategy::suggest_funds;

use crate::services::advisor_service::AdvisorService;
use crate::services::report_format;
use crate::services::telegram_service::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Portfolio check with target and stop levels.
    Weekly,
    /// Universe ranking plus fund suggestions.
    Monthly,
}

/// Sleeps until the next fire time, builds the report, exports it and
/// queues it for delivery. Every run is independent: a failed export or a
/// dropped message is not retried before the next tick.
pub struct ReportJob {
    kind: JobKind,
    schedule: Schedule,
    offset: FixedOffset,
    advisor: Arc<AdvisorService>,
    writer: ReportWriter,
    funds: Arc<Vec<FundSuggestion>>,
    notify_tx: broadcast::Sender<Notification>,
}

impl ReportJob {
    pub fn new(
        kind: JobKind,
        schedule: Schedule,
        offset: FixedOffset,
        advisor: Arc<AdvisorService>,
        writer: ReportWriter,
        funds: Arc<Vec<FundSuggestion>>,
        notify_tx: broadcast::Sender<Notification>,
    ) -> Self {
        Self {
            kind,
            schedule,
            offset,
            advisor,
            writer,
            funds,
            notify_tx,
        }
    }

    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    pub async fn build(&self, now: DateTime<FixedOffset>) -> Notification {
        match self.kind {
            JobKind::Weekly => {
                let evaluations = self.advisor.check_portfolio().await;
                let attachment = exported(self.writer.write_weekly(&evaluations, now));
                Notification::text(report_format::weekly_alert(&evaluations, now))
                    .with_attachment(attachment)
            }
            JobKind::Monthly => {
                let picks = self.advisor.monthly_picks().await;
                let attachment = exported(self.writer.write_monthly(&picks, now));
                let band = self.advisor.picks_config();
                let funds = suggest_funds(&self.funds, "");
                Notification::text(report_format::monthly_picks(
                    &picks,
                    &funds,
                    band.min_price,
                    band.max_price,
                    now,
                ))
                .with_attachment(attachment)
            }
        }
    }
}

fn exported(result: Result<PathBuf, ExportError>) -> Option<PathBuf> {
    match result {
        Ok(path) => Some(path),
        Err(e) => {
            error!("{}", AdvisorError::delivery(e));
            None
        }
    }
}

#[async_trait]
impl Actor for ReportJob {
    fn name(&self) -> ActorType {
        match self.kind {
            JobKind::Weekly => ActorType::WeeklyReportActor,
            JobKind::Monthly => ActorType::MonthlyPicksActor,
        }
    }

    async fn run(&mut self, _supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        loop {
            let now = self.now();
            let next = self.schedule.next_after(now);
            info!("{:?} report scheduled for {}", self.kind, next);

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            let notification = self.build(self.now()).await;
            if self.notify_tx.send(notification).is_err() {
                warn!("No Telegram subscriber for the {:?} report", self.kind);
            }
        }
    }
}
