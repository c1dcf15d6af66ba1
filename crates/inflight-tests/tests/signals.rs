use eyre::Result;
use inflight_tests::{field, TestCtxBuilder};
use serde_json::{json, Value};
use util::{station, BOB};

mod util;

#[tokio::test]
#[ntest::timeout(20_000)]
async fn broadcast_is_seen_by_every_session() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_seed(station())
        .build()
        .await?;
    let mut pilot = ctx.api.session().await?;
    let mut passenger = ctx.api.session().await?;

    let empty = passenger.send("GET_BROADCAST", json!({})).await?;
    assert_eq!(empty.fields.get("message"), Some(&Value::Null));
    assert_eq!(field::<i64>(&empty, "timestamp")?, 0);

    let sent = pilot
        .send("TRIGGER_BROADCAST", json!({"message": "Docking in 5"}))
        .await?;
    assert!(sent.is_ok());
    pilot
        .send("TRIGGER_BROADCAST", json!({"message": "Docking now"}))
        .await?;

    let seen = passenger.send("GET_BROADCAST", json!({})).await?;
    assert_eq!(field::<String>(&seen, "message")?, "Docking now");
    assert!(field::<i64>(&seen, "timestamp")? > 0);

    drop((pilot, passenger));
    ctx.finish().await
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn survey_flag_stays_raised() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?.build().await?;
    let mut attendant = ctx.api.session().await?;
    let mut passenger = ctx.api.session().await?;

    let check = passenger.send("CHECK_SURVEY_TRIGGER", json!({})).await?;
    assert!(!field::<bool>(&check, "triggered")?);

    assert!(attendant.send("TRIGGER_SURVEY", json!({})).await?.is_ok());
    assert!(attendant.send("TRIGGER_SURVEY", json!({})).await?.is_ok());
    for _ in 0..3 {
        let check = passenger.send("CHECK_SURVEY_TRIGGER", json!({})).await?;
        assert!(field::<bool>(&check, "triggered")?);
    }

    drop((attendant, passenger));
    ctx.finish().await
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn last_cancellation_names_the_passenger() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_seed(station())
        .build()
        .await?;
    let mut passenger = ctx.api.session().await?;
    let mut pilot = ctx.api.session().await?;

    let none = pilot.send("GET_LAST_CANCELLATION", json!({})).await?;
    assert!(none.is_ok());
    assert_eq!(none.fields.get("passenger"), Some(&Value::Null));

    let booked = passenger.book_slot(BOB, 7, 1).await?;
    passenger
        .cancel_booking(field(&booked, "bookingId")?)
        .await?;

    let last = pilot.send("GET_LAST_CANCELLATION", json!({})).await?;
    assert_eq!(field::<String>(&last, "passenger")?, "bob");

    drop((passenger, pilot));
    ctx.finish().await
}
