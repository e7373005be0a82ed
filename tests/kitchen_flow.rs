mod common;

use common::setup;
use dinely_api::{
    dto::bills::{AddPlateRequest, FinalizeBillRequest, OpenBillRequest},
    error::AppError,
    services::{bill_service, kitchen_service},
};
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn queue_lists_uncooked_plates_and_marking_is_idempotent() -> anyhow::Result<()> {
    let app = setup().await;
    let waiter = app.waiter();
    let kitchen = app.kitchen();

    let bill = bill_service::open_bill(
        &app.state,
        &waiter,
        OpenBillRequest {
            table_code: Some("B1".into()),
            waiter_id: None,
        },
    )
    .await?
    .data
    .expect("bill");
    for name in ["Queso fundido", "Tacos al pastor"] {
        bill_service::add_plate(
            &app.state,
            &waiter,
            bill.id,
            AddPlateRequest {
                plate_id: Some(app.plate_id(name).await),
                quantity: Some(1),
                notes: Some("para compartir".into()),
            },
        )
        .await?;
    }

    let queue = kitchen_service::queue(&app.state, &kitchen)
        .await?
        .data
        .expect("queue");
    assert_eq!(queue.items.len(), 2);
    assert_eq!(queue.items[0].plate_name, "Queso fundido");
    assert_eq!(queue.items[0].table_code.as_deref(), Some("B1"));
    assert_eq!(queue.items[0].bill_code, bill.code);

    let ticket = queue.items[0].bill_plate_id;
    let first = kitchen_service::mark_cooked(&app.state, &kitchen, ticket, true)
        .await?
        .data
        .expect("status");
    assert!(first.cooked);
    let stamped = first.cooked_at.expect("cooked_at");

    let second = kitchen_service::mark_cooked(&app.state, &kitchen, ticket, true)
        .await?
        .data
        .expect("status");
    assert!(second.cooked);
    assert_eq!(second.cooked_at, Some(stamped));

    let queue = kitchen_service::queue(&app.state, &kitchen)
        .await?
        .data
        .expect("queue");
    assert_eq!(queue.items.len(), 1);
    assert_eq!(queue.items[0].plate_name, "Tacos al pastor");

    let undone = kitchen_service::mark_cooked(&app.state, &kitchen, ticket, false)
        .await?
        .data
        .expect("status");
    assert!(!undone.cooked);
    assert_eq!(undone.cooked_at, None);
    Ok(())
}

#[tokio::test]
async fn closed_bill_plates_are_frozen() -> anyhow::Result<()> {
    let app = setup().await;
    let waiter = app.waiter();
    let bill = bill_service::open_bill(
        &app.state,
        &waiter,
        OpenBillRequest {
            table_code: Some("C1".into()),
            waiter_id: None,
        },
    )
    .await?
    .data
    .expect("bill");
    let bill = bill_service::add_plate(
        &app.state,
        &waiter,
        bill.id,
        AddPlateRequest {
            plate_id: Some(app.plate_id("Agua de horchata").await),
            quantity: Some(1),
            notes: None,
        },
    )
    .await?
    .data
    .expect("bill");
    let line = bill.plates[0].id;

    bill_service::finalize_bill(
        &app.state,
        &waiter,
        bill.id,
        FinalizeBillRequest {
            amount_paid: Some(dec!(50)),
            tip_percentage: Some(dec!(10)),
        },
    )
    .await?;

    let frozen = kitchen_service::mark_cooked(&app.state, &app.kitchen(), line, true).await;
    assert!(matches!(frozen, Err(AppError::Forbidden(_))));

    let queue = kitchen_service::queue(&app.state, &app.kitchen())
        .await?
        .data
        .expect("queue");
    assert!(queue.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_plate_and_wrong_role() {
    let app = setup().await;
    let missing = kitchen_service::mark_cooked(&app.state, &app.kitchen(), Uuid::new_v4(), true).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let waiter = kitchen_service::queue(&app.state, &app.waiter()).await;
    assert!(matches!(waiter, Err(AppError::Forbidden(_))));

    let admin = kitchen_service::queue(&app.state, &app.admin()).await;
    assert!(admin.is_ok());
}
