use anyhow::Result;
use chrono::{Datelike, Duration, Local, NaiveDate};
use detailing_bot::catalog::WORKING_HOURS;
use detailing_bot::database::connection::DatabaseManager;
use detailing_bot::services::availability::{slot_has_room, slot_occupancy, unavailable_dates};
use tempfile::{tempdir, TempDir};

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

async fn seed_booking(
    db: &DatabaseManager,
    date: &str,
    time: &str,
    status: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO bookings (user_id, user_full_name, service, booking_date, \
                               booking_time, price, discount, status, created_at) \
         VALUES (1, 'Test Client', 'Polishing', ?, ?, 6000, 0, ?, '2024-01-01T00:00:00Z')",
    )
    .bind(date)
    .bind(time)
    .bind(status)
    .execute(&db.pool)
    .await?;
    Ok(())
}

fn future_date() -> NaiveDate {
    Local::now().date_naive() + Duration::days(30)
}

fn fmt(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

#[tokio::test]
async fn test_occupancy_counts_only_active_bookings() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let date = future_date();
    let date_str = fmt(date);

    seed_booking(&db, &date_str, "10:00", "pending_confirmation").await?;
    seed_booking(&db, &date_str, "10:00", "confirmed").await?;
    seed_booking(&db, &date_str, "10:00", "cancelled_by_user").await?;
    seed_booking(&db, &date_str, "10:00", "cancelled_by_admin").await?;
    seed_booking(&db, &date_str, "10:00", "completed").await?;
    seed_booking(&db, &date_str, "14:00", "confirmed").await?;

    let occupancy = slot_occupancy(&db.pool, date, 12).await?;
    assert_eq!(occupancy.get("10:00"), Some(&2));
    assert_eq!(occupancy.get("14:00"), Some(&1));

    Ok(())
}

#[tokio::test]
async fn test_slots_without_bookings_have_room() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let date = future_date();

    let occupancy = slot_occupancy(&db.pool, date, 12).await?;
    assert!(occupancy.is_empty());
    for slot in WORKING_HOURS {
        assert!(slot_has_room(&occupancy, slot, 12));
    }

    Ok(())
}

#[tokio::test]
async fn test_full_slot_has_no_room() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let date = future_date();
    let date_str = fmt(date);

    seed_booking(&db, &date_str, "09:00", "confirmed").await?;
    seed_booking(&db, &date_str, "09:00", "pending_confirmation").await?;

    let occupancy = slot_occupancy(&db.pool, date, 2).await?;
    assert!(!slot_has_room(&occupancy, "09:00", 2));
    assert!(slot_has_room(&occupancy, "10:00", 2));

    Ok(())
}

#[tokio::test]
async fn test_past_dates_report_every_slot_full() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let yesterday = Local::now().date_naive() - Duration::days(1);

    let occupancy = slot_occupancy(&db.pool, yesterday, 12).await?;
    for slot in WORKING_HOURS {
        assert!(!slot_has_room(&occupancy, slot, 12));
    }

    Ok(())
}

#[tokio::test]
async fn test_fully_booked_day_is_unavailable() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let date = future_date();
    let date_str = fmt(date);

    // Fill every working-hour slot to capacity 1.
    for slot in WORKING_HOURS {
        seed_booking(&db, &date_str, slot, "confirmed").await?;
    }

    let unavailable = unavailable_dates(&db.pool, date.year(), date.month(), 1).await?;
    assert!(unavailable.contains(&date));

    Ok(())
}

#[tokio::test]
async fn test_partially_booked_day_stays_available() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let date = future_date();
    let date_str = fmt(date);

    // All slots but one are full.
    for slot in WORKING_HOURS.iter().skip(1) {
        seed_booking(&db, &date_str, slot, "confirmed").await?;
    }

    let unavailable = unavailable_dates(&db.pool, date.year(), date.month(), 1).await?;
    assert!(!unavailable.contains(&date));

    Ok(())
}

#[tokio::test]
async fn test_blocked_date_is_unavailable() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let date = future_date();

    sqlx::query("INSERT INTO blocked_dates (blocked_date) VALUES (?)")
        .bind(fmt(date))
        .execute(&db.pool)
        .await?;

    let unavailable = unavailable_dates(&db.pool, date.year(), date.month(), 12).await?;
    assert!(unavailable.contains(&date));

    Ok(())
}

#[tokio::test]
async fn test_blocked_date_in_other_month_is_ignored() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let date = future_date();
    let other = date + Duration::days(65);

    sqlx::query("INSERT INTO blocked_dates (blocked_date) VALUES (?)")
        .bind(fmt(other))
        .execute(&db.pool)
        .await?;

    let unavailable = unavailable_dates(&db.pool, date.year(), date.month(), 12).await?;
    assert!(unavailable.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_bookings_outside_working_hours_do_not_close_a_day() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let date = future_date();
    let date_str = fmt(date);

    // A stray row outside working hours must not count towards day fullness.
    seed_booking(&db, &date_str, "23:00", "confirmed").await?;
    for slot in WORKING_HOURS.iter().skip(1) {
        seed_booking(&db, &date_str, slot, "confirmed").await?;
    }

    let unavailable = unavailable_dates(&db.pool, date.year(), date.month(), 1).await?;
    assert!(!unavailable.contains(&date));

    Ok(())
}
