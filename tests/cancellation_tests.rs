use anyhow::Result;
use detailing_bot::database::connection::DatabaseManager;
use detailing_bot::database::models::{Booking, BookingStatus};
use detailing_bot::services::booking::{
    cancel_booking, confirm_booking, create_booking, BookingError, Canceller, NewBooking,
};
use tempfile::{tempdir, TempDir};

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

async fn seed(db: &DatabaseManager, user_id: i64, time: &str) -> Result<Booking> {
    let booking = create_booking(
        &db.pool,
        12,
        NewBooking {
            user_id,
            user_full_name: format!("Client {user_id}"),
            user_username: None,
            service: "Ceramic coating".to_string(),
            date: "01.06.2099".to_string(),
            time: time.to_string(),
            price: 15000,
            discount: 0,
            promocode: None,
            comment: None,
            media: Vec::new(),
        },
    )
    .await?;
    Ok(booking)
}

#[tokio::test]
async fn test_user_cancels_own_booking() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let booking = seed(&db, 42, "10:00").await?;

    let cancelled = cancel_booking(&db.pool, booking.id, Canceller::User(42)).await?;
    // The returned record is the state before the transition.
    assert_eq!(cancelled.id, booking.id);
    assert_eq!(cancelled.status, BookingStatus::PendingConfirmation);

    let stored = Booking::find_by_id(&db.pool, booking.id).await?.expect("row exists");
    assert_eq!(stored.status, BookingStatus::CancelledByUser);

    Ok(())
}

#[tokio::test]
async fn test_cancelling_missing_booking_reports_not_found() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let result = cancel_booking(&db.pool, 9999, Canceller::User(42)).await;
    assert!(matches!(result, Err(BookingError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn test_foreign_booking_looks_exactly_like_a_missing_one() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let booking = seed(&db, 42, "11:00").await?;

    let foreign = cancel_booking(&db.pool, booking.id, Canceller::User(777)).await;
    let missing = cancel_booking(&db.pool, 9999, Canceller::User(777)).await;
    assert!(matches!(foreign, Err(BookingError::NotFound)));
    assert!(matches!(missing, Err(BookingError::NotFound)));

    // And the target booking is untouched.
    let stored = Booking::find_by_id(&db.pool, booking.id).await?.expect("row exists");
    assert_eq!(stored.status, BookingStatus::PendingConfirmation);

    Ok(())
}

#[tokio::test]
async fn test_double_cancellation_fails_the_second_time() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let booking = seed(&db, 42, "12:00").await?;

    cancel_booking(&db.pool, booking.id, Canceller::User(42)).await?;
    let again = cancel_booking(&db.pool, booking.id, Canceller::User(42)).await;
    assert!(matches!(again, Err(BookingError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn test_admin_cancels_any_booking() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let booking = seed(&db, 42, "13:00").await?;

    let cancelled = cancel_booking(&db.pool, booking.id, Canceller::Admin).await?;
    assert_eq!(cancelled.user_id, 42);

    let stored = Booking::find_by_id(&db.pool, booking.id).await?.expect("row exists");
    assert_eq!(stored.status, BookingStatus::CancelledByAdmin);

    Ok(())
}

#[tokio::test]
async fn test_admin_confirms_pending_booking() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let booking = seed(&db, 42, "14:00").await?;

    let confirmed = confirm_booking(&db.pool, booking.id).await?;
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    // A second confirmation has nothing left to transition.
    let again = confirm_booking(&db.pool, booking.id).await;
    assert!(matches!(again, Err(BookingError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn test_confirmed_booking_can_still_be_cancelled() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let booking = seed(&db, 42, "15:00").await?;

    confirm_booking(&db.pool, booking.id).await?;
    let cancelled = cancel_booking(&db.pool, booking.id, Canceller::User(42)).await?;
    assert_eq!(cancelled.status, BookingStatus::Confirmed);

    let stored = Booking::find_by_id(&db.pool, booking.id).await?.expect("row exists");
    assert_eq!(stored.status, BookingStatus::CancelledByUser);

    Ok(())
}
