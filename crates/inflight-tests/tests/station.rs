use eyre::Result;
use inflight_core::{ChatMessage, InventoryItem, Passenger, Photographer, Status, UserRole};
use inflight_tests::{field, TestCtxBuilder};
use serde_json::json;
use util::{station, ADA, BOB};

mod util;

#[tokio::test]
#[ntest::timeout(20_000)]
async fn inventory_round_trip() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_seed(station())
        .build()
        .await?;
    let mut session = ctx.api.session().await?;

    let listed = session
        .send("GET_INVENTORY_BY_ROLE", json!({"role": "Attendant"}))
        .await?;
    let items: Vec<InventoryItem> = field(&listed, "items")?;
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.owner_role == UserRole::Attendant));

    // sending an item back unchanged is a no-op
    let tether = items[0].clone();
    let echoed = session
        .send("UPDATE_INVENTORY_ITEM", json!({ "item": tether }))
        .await?;
    assert!(echoed.is_ok(), "{echoed:?}");
    let relisted = session
        .send("GET_INVENTORY_BY_ROLE", json!({"role": "ATTENDANT"}))
        .await?;
    assert_eq!(field::<Vec<InventoryItem>>(&relisted, "items")?, items);

    let mut checked_out = tether.clone();
    checked_out.checked_out = true;
    checked_out.condition = String::from("frayed");
    assert!(session
        .send("UPDATE_INVENTORY_ITEM", json!({ "item": checked_out }))
        .await?
        .is_ok());

    let mut broken = checked_out.clone();
    broken.available = false;
    let rejected = session
        .send("UPDATE_INVENTORY_ITEM", json!({ "item": broken }))
        .await?;
    assert_eq!(rejected.status, Status::Error);

    let mut ghost = tether;
    ghost.id = 404;
    let missing = session
        .send("UPDATE_INVENTORY_ITEM", json!({ "item": ghost }))
        .await?;
    assert_eq!(missing.status, Status::NotFound);

    let relisted = session
        .send("GET_INVENTORY_BY_ROLE", json!({"role": "attendant"}))
        .await?;
    let items: Vec<InventoryItem> = field(&relisted, "items")?;
    assert!(items.contains(&checked_out));

    drop(session);
    ctx.finish().await
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn photographers() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_seed(station())
        .build()
        .await?;
    let mut session = ctx.api.session().await?;

    let seeded = session
        .send("GET_PHOTOGRAPHER_BY_NAME", json!({"name": "Nadia"}))
        .await?;
    let nadia: Photographer = field(&seeded, "photographer")?;
    let again = session
        .send("REGISTER_PHOTOGRAPHER", json!({"name": "Nadia"}))
        .await?;
    assert_eq!(field::<Photographer>(&again, "photographer")?, nadia);

    let leo = session
        .send("REGISTER_PHOTOGRAPHER", json!({"name": "Leo"}))
        .await?;
    let leo: Photographer = field(&leo, "photographer")?;
    assert_ne!(leo.id, nadia.id);
    assert!(!leo.checked_out);

    let set = session
        .send(
            "SET_PHOTOGRAPHER_CHECKED_OUT",
            json!({"id": leo.id, "checkedOut": true}),
        )
        .await?;
    assert!(set.is_ok());
    let by_id = session
        .send("GET_PHOTOGRAPHER_BY_ID", json!({"id": leo.id}))
        .await?;
    assert!(field::<Photographer>(&by_id, "photographer")?.checked_out);

    for (action, data) in [
        ("GET_PHOTOGRAPHER_BY_NAME", json!({"name": "Ansel"})),
        ("GET_PHOTOGRAPHER_BY_ID", json!({"id": 99})),
        ("SET_PHOTOGRAPHER_CHECKED_OUT", json!({"id": 99, "checkedOut": true})),
    ] {
        let response = session.send(action, data).await?;
        assert_eq!(response.status, Status::NotFound, "{action}");
    }

    drop(session);
    ctx.finish().await
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn chat_history_in_both_directions() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?.build().await?;
    let mut pilot = ctx.api.session().await?;
    let mut atc = ctx.api.session().await?;

    let lines = [
        ("PILOT", "ATC", "Requesting EVA window"),
        ("ATC", "PILOT", "Window granted"),
        ("ATTENDANT", "PILOT", "Cabin secured"),
        ("pilot", "atc", "Copy"),
    ];
    for (sender, receiver, content) in lines {
        let response = pilot
            .send(
                "SEND_CHAT",
                json!({"sender": sender, "receiver": receiver, "content": content}),
            )
            .await?;
        assert!(response.is_ok(), "{response:?}");
    }

    let history = atc
        .send("GET_CHAT", json!({"sender": "ATC", "receiver": "PILOT"}))
        .await?;
    let messages: Vec<ChatMessage> = field(&history, "messages")?;
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        ["Requesting EVA window", "Window granted", "Copy"]
    );
    assert_eq!(messages[1].sender, UserRole::Atc);

    let unknown_role = pilot
        .send(
            "SEND_CHAT",
            json!({"sender": "CAPTAIN", "receiver": "ATC", "content": "hi"}),
        )
        .await?;
    assert_eq!(unknown_role.status, Status::Error);

    drop((pilot, atc));
    ctx.finish().await
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn chat_echoes_the_role_spelling_of_the_sender() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?.build().await?;
    let mut pilot = ctx.api.session().await?;

    let sent = pilot
        .send(
            "SEND_CHAT",
            json!({"sender": "Pilot", "receiver": "Attendant", "content": "hi"}),
        )
        .await?;
    assert!(sent.is_ok(), "{sent:?}");

    let history = pilot
        .send("GET_CHAT", json!({"sender": "Pilot", "receiver": "Attendant"}))
        .await?;
    let raw = &history.fields["messages"][0];
    assert_eq!(raw["sender"], "Pilot");
    assert_eq!(raw["receiver"], "Attendant");
    assert_eq!(raw["content"], "hi");

    // lookups still ignore case
    let shouted = pilot
        .send("GET_CHAT", json!({"sender": "ATTENDANT", "receiver": "PILOT"}))
        .await?;
    let messages: Vec<ChatMessage> = field(&shouted, "messages")?;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender.as_str(), "Pilot");
    assert_eq!(messages[0].receiver, UserRole::Attendant);

    drop(pilot);
    ctx.finish().await
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn passengers_and_checkout() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_seed(station())
        .build()
        .await?;
    let mut session = ctx.api.session().await?;

    let all = session.send("GET_ALL_PASSENGERS", json!({})).await?;
    let passengers: Vec<Passenger> = field(&all, "passengers")?;
    let names: Vec<&str> = passengers.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(names, ["ada", "bob", "cleo", "dmitri"]);

    let unknown = session.login("zed").await?;
    assert_eq!(unknown.message(), Some("Passenger not found"));

    let status = |id| json!({ "passengerId": id });
    let before = session.send("CHECK_CHECKOUT_STATUS", status(BOB)).await?;
    assert!(!field::<bool>(&before, "checkedOut")?);
    assert!(session.send("CHECK_OUT_PASSENGER", status(BOB)).await?.is_ok());
    let after = session.send("CHECK_CHECKOUT_STATUS", status(BOB)).await?;
    assert!(field::<bool>(&after, "checkedOut")?);

    let reset = session
        .send(
            "SET_CHECKED_OUT_STATUS",
            json!({"passengerId": BOB, "checkedOut": false}),
        )
        .await?;
    assert!(reset.is_ok());
    assert!(!session.passenger(BOB).await?.checked_out);

    let ghost = session.send("CHECK_CHECKOUT_STATUS", status(99)).await?;
    assert!(!field::<bool>(&ghost, "checkedOut")?);
    let missing = session.send("CHECK_OUT_PASSENGER", status(99)).await?;
    assert_eq!(missing.status, Status::Error);

    let top_up = session.update_nova_credits(ADA, 50_000).await?;
    assert_eq!(field::<u32>(&top_up, "newBalance")?, 300_000);
    let deduct = session.update_nova_credits(ADA, -300_001).await?;
    assert_eq!(deduct.status, Status::Error);
    let deduct = session.update_nova_credits(ADA, -300_000).await?;
    assert_eq!(field::<u32>(&deduct, "newBalance")?, 0);

    drop(session);
    ctx.finish().await
}
