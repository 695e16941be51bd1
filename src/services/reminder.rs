//! Reminder and report scheduling.
//!
//! One one-shot job per booking, registered by booking id so a cancellation
//! can remove it, plus daily/weekly report cron jobs for administrators. The
//! scheduler runs its own timer loop and fires callbacks as tasks on the same
//! runtime as the bot.

use crate::config::{parse_report_time, Config};
use crate::database::connection::DatabaseManager;
use crate::database::models::Booking;
use crate::services::reports::period_report;
use crate::utils::datetime::booking_datetime;
use chrono::{Duration, Local};
use std::collections::HashMap;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};
use uuid::Uuid;

type ServiceResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub struct ReminderService {
    bot: Bot,
    db: Arc<DatabaseManager>,
    config: Arc<Config>,
    scheduler: JobScheduler,
    /// booking id -> scheduled job, so cancellations can unregister reminders.
    jobs: Arc<Mutex<HashMap<i64, Uuid>>>,
}

impl ReminderService {
    pub async fn new(bot: Bot, db: Arc<DatabaseManager>, config: Arc<Config>) -> ServiceResult<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self {
            bot,
            db,
            config,
            scheduler,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Registers the report cron jobs, re-schedules reminders for every future
    /// active booking, and starts the scheduler loop.
    pub async fn start(&self) -> ServiceResult {
        self.register_report_jobs().await?;
        self.schedule_existing().await?;

        let mut scheduler = self.scheduler.clone();
        scheduler.start().await?;
        info!(
            "Reminder service started - reminders fire {}h before appointments",
            self.config.reminder_hours_before
        );
        Ok(())
    }

    pub async fn stop(&self) -> ServiceResult {
        let mut scheduler = self.scheduler.clone();
        scheduler.shutdown().await?;
        Ok(())
    }

    /// Schedules the one-shot reminder for a booking. Bookings whose reminder
    /// time already passed are skipped silently.
    pub async fn schedule_for(&self, booking: &Booking) -> ServiceResult {
        let appointment = booking_datetime(&booking.booking_date, &booking.booking_time)?;
        let remind_at = appointment - Duration::hours(self.config.reminder_hours_before);
        let now = Local::now().naive_local();
        if remind_at <= now {
            return Ok(());
        }
        let Ok(delay) = (remind_at - now).to_std() else {
            return Ok(());
        };

        let bot = self.bot.clone();
        let jobs = self.jobs.clone();
        let booking_id = booking.id;
        let user_id = booking.user_id;
        let service = booking.service.clone();
        let date = booking.booking_date.clone();
        let time = booking.booking_time.clone();

        let job = Job::new_one_shot_at_instant_async(
            std::time::Instant::now() + delay,
            move |_uuid, _lock| {
                let bot = bot.clone();
                let jobs = jobs.clone();
                let service = service.clone();
                let date = date.clone();
                let time = time.clone();
                Box::pin(async move {
                    let text = format!(
                        "👋 A reminder about your appointment!\n\n\
                         You are booked for {service}.\n\
                         We are waiting for you on {date} at {time}.\n\n\
                         See you soon!"
                    );
                    if let Err(e) = bot.send_message(ChatId(user_id), text).await {
                        error!(
                            "Failed to send reminder for booking #{} to user {}: {}",
                            booking_id, user_id, e
                        );
                    } else {
                        info!("Sent reminder for booking #{} to user {}", booking_id, user_id);
                    }
                    jobs.lock().await.remove(&booking_id);
                })
            },
        )?;

        let job_id = job.guid();
        let mut scheduler = self.scheduler.clone();
        scheduler.add(job).await?;
        self.jobs.lock().await.insert(booking.id, job_id);
        info!("Scheduled reminder for booking #{} at {}", booking.id, remind_at);
        Ok(())
    }

    /// Removes the reminder job for a cancelled booking. A missing job is
    /// logged, not fatal: the reminder may have already fired.
    pub async fn cancel_for(&self, booking_id: i64) {
        let job_id = self.jobs.lock().await.remove(&booking_id);
        match job_id {
            Some(job_id) => {
                let mut scheduler = self.scheduler.clone();
                if let Err(e) = scheduler.remove(&job_id).await {
                    error!("Error cancelling reminder for booking #{}: {}", booking_id, e);
                } else {
                    info!("Cancelled reminder for booking #{}", booking_id);
                }
            }
            None => warn!(
                "No reminder job found for booking #{}. It may have already fired or was never scheduled.",
                booking_id
            ),
        }
    }

    async fn schedule_existing(&self) -> ServiceResult {
        let bookings = Booking::all_active(&self.db.pool).await?;
        info!("Scheduling reminders for {} existing bookings", bookings.len());
        for booking in &bookings {
            if let Err(e) = self.schedule_for(booking).await {
                error!("Failed to schedule reminder for booking #{}: {}", booking.id, e);
            }
        }
        Ok(())
    }

    async fn register_report_jobs(&self) -> ServiceResult {
        let (daily_hour, daily_minute) = parse_report_time(&self.config.daily_report_time)?;
        let (weekly_hour, weekly_minute) = parse_report_time(&self.config.weekly_report_time)?;

        let daily = self.report_job(
            &format!("0 {daily_minute} {daily_hour} * * *"),
            1,
        )?;
        let weekly = self.report_job(
            &format!(
                "0 {weekly_minute} {weekly_hour} * * {}",
                self.config.weekly_report_day
            ),
            7,
        )?;

        let mut scheduler = self.scheduler.clone();
        scheduler.add(daily).await?;
        scheduler.add(weekly).await?;
        info!(
            "Scheduled daily reports at {} and weekly on {} at {}",
            self.config.daily_report_time, self.config.weekly_report_day, self.config.weekly_report_time
        );
        Ok(())
    }

    fn report_job(&self, cron: &str, period_days: i64) -> ServiceResult<Job> {
        let bot = self.bot.clone();
        let db = self.db.clone();
        let admin_ids = self.config.admin_ids.clone();

        let job = Job::new_async(cron, move |_uuid, _lock| {
            let bot = bot.clone();
            let db = db.clone();
            let admin_ids = admin_ids.clone();
            Box::pin(async move {
                let to = Local::now().date_naive();
                let from = to - Duration::days(period_days - 1);
                let report = match period_report(&db.pool, from, to).await {
                    Ok(report) => report,
                    Err(e) => {
                        error!("Failed to generate {}-day report: {}", period_days, e);
                        return;
                    }
                };
                for admin_id in &admin_ids {
                    if let Err(e) = bot.send_message(ChatId(*admin_id), report.clone()).await {
                        error!("Failed to send report to admin {}: {}", admin_id, e);
                    }
                }
                info!("Sent {}-day report to {} admins", period_days, admin_ids.len());
            })
        })?;
        Ok(job)
    }
}
