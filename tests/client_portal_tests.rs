// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Portal client tests against a real server on a local port.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate, Weekday};
use third_street_gym::client::{
    BookingAction, BookingConfirmation, ClassFilter, ClientConfig, GymApiClient, RetryPolicy,
    SchedulePortal, SlotState,
};
use tokio::io::AsyncReadExt;
use tokio::sync::oneshot;
use third_street_gym::error::AppError;
use third_street_gym::AppState;

mod common;

/// Serve a seeded app on an ephemeral port.
async fn spawn_server() -> (ClientConfig, Arc<AppState>) {
    let (app, state) = common::create_test_app().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig {
        api_url: format!("http://{addr}"),
        anon_key: state.config.public_anon_key.clone(),
    };
    (config, state)
}

fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
}

#[tokio::test]
async fn test_client_reads_catalog() {
    let (config, _) = spawn_server().await;
    let client = GymApiClient::new(&config);

    let schedule = client.fetch_schedule().await.unwrap();
    assert_eq!(schedule.len(), 4);
    assert_eq!(client.fetch_classes().await.unwrap().len(), 3);
    assert_eq!(client.fetch_trainers().await.unwrap().len(), 3);
    assert!(!client.fetch_testimonials().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_member_calls_need_a_session() {
    let (config, _) = spawn_server().await;
    let client = GymApiClient::new(&config);

    assert!(matches!(
        client.fetch_my_bookings().await,
        Err(AppError::Unauthenticated)
    ));
    assert!(matches!(
        client.create_booking("mon-6am-beginner", "Beginner", None).await,
        Err(AppError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_signup_login_and_profile() {
    let (config, _) = spawn_server().await;
    let mut client = GymApiClient::new(&config);

    let user_id = client
        .signup("southpaw@example.com", "hunter22", "Southpaw")
        .await
        .unwrap();
    assert!(client.is_authenticated());

    client.logout();
    assert!(!client.is_authenticated());

    let again = client.login("southpaw@example.com", "hunter22").await.unwrap();
    assert_eq!(again, user_id);

    let profile = client.fetch_profile().await.unwrap();
    assert_eq!(profile.id, user_id);
    assert_eq!(profile.name, "Southpaw");

    let mut other = GymApiClient::new(&config);
    let err = other
        .login("southpaw@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn test_duplicate_signup_is_conflict() {
    let (config, _) = spawn_server().await;
    let mut client = GymApiClient::new(&config);

    client
        .signup("twin@example.com", "hunter22", "Twin")
        .await
        .unwrap();
    let err = client
        .signup("twin@example.com", "hunter22", "Twin")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_portal_books_a_slot() {
    let (config, state) = spawn_server().await;
    let mut portal = SchedulePortal::new(GymApiClient::new(&config), wednesday());

    portal.load().await.unwrap();
    let monday = portal.week().date_of(Weekday::Mon);
    let slot = portal.slots_for_day(Weekday::Mon)[0].clone();
    assert_eq!(slot.slot.id, "mon-6am-beginner");

    assert_eq!(
        portal.request_booking(&slot, monday),
        BookingAction::SignInRequired
    );

    portal
        .client_mut()
        .signup("jabber@example.com", "hunter22", "Jabber")
        .await
        .unwrap();

    let BookingAction::Confirm(confirmation) = portal.request_booking(&slot, monday) else {
        panic!("expected a confirmation step");
    };
    assert_eq!(confirmation.class_name, "Beginner (Fog Cutter)");
    assert_eq!(confirmation.instructor, "Maria 'Mission' Gonzalez");
    assert_eq!(confirmation.duration_minutes, 60);

    let booking = portal.confirm_booking(&confirmation).await.unwrap();
    assert_eq!(booking.class_date.as_deref(), Some("2026-10-19"));

    assert_eq!(portal.slot_state("mon-6am-beginner", monday), SlotState::Booked);
    assert!(portal.is_booked("mon-6am-beginner", monday));
    // Same slot next week is still open
    assert_eq!(
        portal.slot_state("mon-6am-beginner", monday + Days::new(7)),
        SlotState::Available
    );
    assert_eq!(portal.bookings().len(), 1);

    // The refetched schedule shows the taken seat
    let refreshed = portal.slots_for_day(Weekday::Mon)[0];
    assert_eq!(refreshed.slot.current_bookings, 9);

    let stored = state
        .schedule
        .get_slot("mon-6am-beginner")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.current_bookings, 9);
}

#[tokio::test]
async fn test_portal_shows_server_error_on_full_slot() {
    let (config, state) = spawn_server().await;

    let mut full = state
        .schedule
        .get_slot("wed-6pm-advanced")
        .await
        .unwrap()
        .unwrap();
    full.current_bookings = full.max_capacity;
    state.schedule.put_slot(&full).await.unwrap();

    let mut portal = SchedulePortal::new(GymApiClient::new(&config), wednesday());
    portal
        .client_mut()
        .signup("late@example.com", "hunter22", "Late")
        .await
        .unwrap();
    portal.load().await.unwrap();

    let slot = portal.slots_for_day(Weekday::Wed)[0].clone();
    let date = portal.week().date_of(Weekday::Wed);
    let BookingAction::Confirm(confirmation) = portal.request_booking(&slot, date) else {
        panic!("expected a confirmation step");
    };

    let err = portal.confirm_booking(&confirmation).await.unwrap_err();
    assert!(matches!(err, AppError::CapacityExceeded(_)));
    assert_eq!(portal.slot_state("wed-6pm-advanced", date), SlotState::Available);
    assert_eq!(
        portal.slot_error("wed-6pm-advanced", date),
        Some("Class is fully booked")
    );
}

#[tokio::test]
async fn test_portal_shows_server_message_for_unknown_slot() {
    let (config, state) = spawn_server().await;
    let mut portal = SchedulePortal::new(GymApiClient::new(&config), wednesday());
    portal
        .client_mut()
        .signup("lost@example.com", "hunter22", "Lost")
        .await
        .unwrap();

    let date = portal.week().date_of(Weekday::Sun);
    let confirmation = BookingConfirmation {
        slot_id: "sun-3am-nonexistent".to_string(),
        class_name: "Ghost Class".to_string(),
        date,
        time: "03:00".to_string(),
        instructor: "Nobody".to_string(),
        duration_minutes: 60,
    };

    let err = portal.confirm_booking(&confirmation).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(err.to_string(), "Schedule slot not found");
    assert_eq!(
        portal.slot_error("sun-3am-nonexistent", date),
        Some("Schedule slot not found")
    );
    assert_eq!(portal.slot_state("sun-3am-nonexistent", date), SlotState::Available);
    assert!(state.store.get_by_prefix("booking:").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_signup_message_is_verbatim() {
    let (config, _) = spawn_server().await;
    let mut client = GymApiClient::new(&config);

    client
        .signup("echo@example.com", "hunter22", "Echo")
        .await
        .unwrap();
    let err = client
        .signup("echo@example.com", "hunter22", "Echo")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "An account with this email already exists");
}

#[tokio::test]
async fn test_week_navigation_keeps_filter() {
    let (config, _) = spawn_server().await;
    let mut portal = SchedulePortal::new(GymApiClient::new(&config), wednesday());
    portal.load().await.unwrap();

    portal.set_filter(ClassFilter::Advanced);
    let start = portal.week().start();
    assert_eq!(start, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());

    portal.next_week();
    assert_eq!(portal.week().start(), start + Days::new(7));
    assert_eq!(portal.filter(), ClassFilter::Advanced);

    portal.prev_week();
    portal.prev_week();
    assert_eq!(portal.week().start(), start - Days::new(7));
    assert_eq!(portal.filter(), ClassFilter::Advanced);

    assert!(portal.slots_for_day(Weekday::Mon).is_empty());
    let wednesday_slots = portal.slots_for_day(Weekday::Wed);
    assert_eq!(wednesday_slots.len(), 1);
    assert_eq!(wednesday_slots[0].slot.id, "wed-6pm-advanced");
}

#[tokio::test]
async fn test_background_load_settles() {
    let (config, _) = spawn_server().await;
    let mut portal = SchedulePortal::new(GymApiClient::new(&config), wednesday());

    let handle = portal.spawn_load();
    let data = handle.finish().await.unwrap();
    portal.apply(data).unwrap();

    assert_eq!(portal.schedule().len(), 4);
    assert!(portal.banner().is_none());
}

#[tokio::test]
async fn test_dropping_load_handle_cancels_fetch() {
    // Take the schedule request, then hold it without answering
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (request_seen, on_request) = oneshot::channel();
    let (closed, on_closed) = oneshot::channel();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        while !received.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before the request arrived");
            received.extend_from_slice(&buf[..n]);
        }
        let _ = request_seen.send(String::from_utf8_lossy(&received).into_owned());

        // Reads return 0 once the client side hangs up
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
        let _ = closed.send(());
    });

    let client = GymApiClient::new(&ClientConfig {
        api_url: format!("http://{addr}"),
        anon_key: "anon".to_string(),
    });
    let portal = SchedulePortal::new(client, wednesday());

    let handle = portal.spawn_load();
    let request = tokio::time::timeout(Duration::from_secs(5), on_request)
        .await
        .expect("schedule request never arrived")
        .unwrap();
    assert!(request.starts_with("GET /schedule"));

    drop(handle);

    tokio::time::timeout(Duration::from_secs(5), on_closed)
        .await
        .expect("fetch kept running after the handle was dropped")
        .unwrap();
}

#[tokio::test]
async fn test_reads_retry_then_fail() {
    // Bind and drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GymApiClient::new(&ClientConfig {
        api_url: format!("http://{addr}"),
        anon_key: "anon".to_string(),
    })
    .with_retry_policy(RetryPolicy {
        max_retries: 2,
        initial_delay: Duration::from_millis(20),
    });

    let started = Instant::now();
    let err = client.fetch_schedule().await.unwrap_err();
    assert!(matches!(err, AppError::Upstream(_)));
    // 20ms + 40ms of backoff
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn test_failed_load_sets_banner() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GymApiClient::new(&ClientConfig {
        api_url: format!("http://{addr}"),
        anon_key: "anon".to_string(),
    })
    .with_retry_policy(RetryPolicy {
        max_retries: 0,
        initial_delay: Duration::from_millis(1),
    });
    let mut portal = SchedulePortal::new(client, wednesday());

    assert!(portal.load().await.is_err());
    assert!(portal.schedule().is_empty());
    assert!(portal
        .banner()
        .unwrap()
        .starts_with("Could not load the schedule"));
}

#[tokio::test]
async fn test_contact_submission_times_out() {
    // Accept connections but never answer
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = GymApiClient::new(&ClientConfig {
        api_url: format!("http://{addr}"),
        anon_key: "anon".to_string(),
    })
    .with_contact_timeout(Duration::from_millis(200));

    let err = client
        .submit_contact("Pat", "pat@example.com", None, "Hello?")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Timeout(ref what) if what == "Contact form submission timed out"));
}

#[tokio::test]
async fn test_contact_and_newsletter_round_trip() {
    let (config, state) = spawn_server().await;
    let client = GymApiClient::new(&config);

    let message = client
        .submit_contact("Pat", "pat@example.com", Some("415-555-0100"), "Hello!")
        .await
        .unwrap();
    assert_eq!(message, "Contact form submitted");

    let message = client.subscribe_newsletter("pat@example.com").await.unwrap();
    assert_eq!(message, "Subscribed to newsletter");

    assert_eq!(state.store.get_by_prefix("contact:").await.unwrap().len(), 1);
    assert_eq!(
        state.store.get_by_prefix("newsletter:").await.unwrap().len(),
        1
    );
}
