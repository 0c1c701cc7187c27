//! Turf booking demo.
//!
//! Restores (or signs in) a session, then books the first free slot at the
//! first catalog venue by driving the booking-flow store end to end.

use anyhow::{anyhow, Context};
use chrono::Days;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turf_booking::auth::{FileKeyValueStore, Section, SessionContext};
use turf_booking::flow::{BookingFlowState, FlowAction, FlowEnvironment, FlowReducer};
use turf_booking::{BookingLedger, Catalog, Config, PlayerFilter, RandomSlotOracle};
use turf_booking_core::environment::{Clock, SystemClock};
use turf_booking_runtime::Store;

const DEMO_EMAIL: &str = "player@example.com";
const DEMO_PASSWORD: &str = "password";

type FlowStore = Store<BookingFlowState, FlowAction, FlowEnvironment, FlowReducer>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    config.validate().context("invalid configuration")?;
    info!(
        session_file = %config.session_file.display(),
        booking_window_days = config.booking_window_days,
        "Configuration loaded"
    );

    // Session
    let session = SessionContext::with_storage(Arc::new(FileKeyValueStore::new(
        config.session_file.clone(),
    )));
    let user = match session.restore().await? {
        Some(user) => {
            info!(user = %user.name, "Session restored");
            user
        },
        None => session.sign_in(DEMO_EMAIL, DEMO_PASSWORD).await?,
    };
    info!(user = %user.name, redirect = ?session.route_for(Section::Tabs).await, "Signed in");

    // Booking flow
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let catalog = Arc::new(Catalog::seeded());
    let env = FlowEnvironment::from_config(
        &config,
        Arc::clone(&clock),
        Arc::clone(&catalog),
        Arc::new(RandomSlotOracle::new(config.slot_availability)),
    );
    let store = Store::new(BookingFlowState::new(), FlowReducer::new(), env);

    let venue = catalog
        .venues()
        .first()
        .ok_or_else(|| anyhow!("catalog is empty"))?;
    send(&store, FlowAction::OpenVenue {
        venue_id: venue.id.to_string(),
    })
    .await?;
    send(&store, FlowAction::CheckAvailability).await?;

    let today = clock.today();
    let mut offset = 0;
    let start_time = loop {
        let free = store
            .state(|state| {
                state
                    .slot_selection()
                    .and_then(|selection| selection.availability.as_ref())
                    .and_then(|availability| availability.slots.iter().find(|slot| slot.available))
                    .map(|slot| slot.start_time)
            })
            .await;
        if let Some(start_time) = free {
            break start_time;
        }

        offset += 1;
        if offset > config.booking_window_days {
            return Err(anyhow!("no free slot at {} in the booking window", venue.name));
        }
        let date = today
            .checked_add_days(Days::new(u64::from(offset)))
            .ok_or_else(|| anyhow!("date overflow"))?;
        send(&store, FlowAction::SelectDate { date }).await?;
    };

    send(&store, FlowAction::SelectSlot { start_time }).await?;
    send(&store, FlowAction::ContinueToPlayers).await?;
    send(&store, FlowAction::IncrementPlayers).await?;
    send(&store, FlowAction::ContinueToPayment).await?;
    send(&store, FlowAction::PayNow {
        user_id: user.id.clone(),
    })
    .await?;

    let confirmation = store
        .state(|state| state.confirmation().cloned())
        .await
        .ok_or_else(|| anyhow!("booking did not complete"))?;
    info!(
        booking_id = %confirmation.booking.id,
        venue = %confirmation.venue_name,
        date = %confirmation.booking.date,
        start = %confirmation.booking.start_time,
        total = confirmation.booking.total_amount,
        "Booking confirmed"
    );
    send(&store, FlowAction::ViewBookings).await?;

    let ledger = BookingLedger::seeded();
    let open = ledger.find_players(&catalog, &PlayerFilter::all(), today);
    info!(open_bookings = open.len(), "Bookings looking for players");

    store.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

/// Sends `action` and waits for its delayed follow-ups
async fn send(store: &FlowStore, action: FlowAction) -> anyhow::Result<()> {
    let mut handle = store.send(action).await?;
    handle.wait().await;

    if let Some(error) = store.state(|state| state.last_error.clone()).await {
        return Err(anyhow!(error));
    }
    Ok(())
}
