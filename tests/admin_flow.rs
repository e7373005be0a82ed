mod common;

use common::{ana_lopez, setup};
use dinely_api::{
    dto::{
        bills::{AddPlateRequest, OpenBillRequest},
        menu::{CategoryRequest, PlateRequest},
        reservations::AssignTableRequest,
        tables::{AreaRequest, TableRequest},
        users::CreateUserRequest,
    },
    entity::{AuditLogs, audit_logs},
    error::AppError,
    lifecycle::TableStatus,
    services::{bill_service, menu_service, reservation_service, table_service, user_service},
};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

#[tokio::test]
async fn admin_cannot_delete_self() -> anyhow::Result<()> {
    let app = setup().await;
    let admin = app.admin();

    let result = user_service::delete_user(&app.state, &admin, admin.user_id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(app.user(admin.user_id).await.is_some());

    user_service::delete_user(&app.state, &admin, app.seed.kitchen_id).await?;
    assert!(app.user(app.seed.kitchen_id).await.is_none());

    let trail = AuditLogs::find()
        .filter(audit_logs::Column::Action.eq("user_delete"))
        .all(&app.state.orm)
        .await?;
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].actor_id, Some(admin.user_id));
    assert_eq!(trail[0].metadata["user_id"], app.seed.kitchen_id.to_string());
    Ok(())
}

#[tokio::test]
async fn create_user_validates_and_hashes() -> anyhow::Result<()> {
    let app = setup().await;
    let admin = app.admin();

    let created = user_service::create_user(
        &app.state,
        &admin,
        CreateUserRequest {
            name: Some("Luis Pérez".into()),
            email: Some("Luis@Dinely.mx".into()),
            password: Some("super-secreta".into()),
            is_admin: false,
            is_waiter: true,
            is_kitchen: false,
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(created.email, "luis@dinely.mx");
    assert!(created.is_waiter);
    let stored = app.user(created.id).await.expect("stored user");
    assert!(stored.password_hash.starts_with("$argon2"));

    let duplicate = user_service::create_user(
        &app.state,
        &admin,
        CreateUserRequest {
            name: None,
            email: Some("luis@dinely.mx".into()),
            password: Some("corta".into()),
            is_admin: false,
            is_waiter: false,
            is_kitchen: false,
        },
    )
    .await;
    let Err(AppError::Validation(errors)) = duplicate else {
        panic!("expected validation failure");
    };
    assert!(errors.has("name"));
    assert_eq!(errors.get("email"), Some("Email is already taken"));
    assert!(errors.has("password"));

    let denied = user_service::list_users(&app.state, &app.waiter()).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    Ok(())
}

#[tokio::test]
async fn areas_in_use_cannot_be_deleted() -> anyhow::Result<()> {
    let app = setup().await;
    let admin = app.admin();

    let patio = table_service::create_area(
        &app.state,
        &admin,
        AreaRequest {
            label: "patio".into(),
        },
    )
    .await?
    .data
    .expect("area");

    let duplicate = table_service::create_area(
        &app.state,
        &admin,
        AreaRequest {
            label: "terraza".into(),
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Validation(_))));

    let table = table_service::create_table(
        &app.state,
        &admin,
        TableRequest {
            code: Some("p1".into()),
            capacity: Some(4),
            status: None,
            area: Some("patio".into()),
            notes: Some("bajo la pérgola".into()),
        },
    )
    .await?
    .data
    .expect("table");
    assert_eq!(table.code, "P1");
    assert_eq!(table.status, TableStatus::Available);
    assert_eq!(table.area.as_ref().map(|a| a.label.as_str()), Some("patio"));

    let in_use = table_service::delete_area(&app.state, &admin, patio.id).await;
    assert!(matches!(in_use, Err(AppError::Conflict(_))));

    table_service::delete_table(&app.state, &admin, table.id).await?;
    table_service::delete_area(&app.state, &admin, patio.id).await?;

    let areas = table_service::list_areas(&app.state)
        .await?
        .data
        .expect("areas");
    let labels: Vec<_> = areas.items.iter().map(|a| a.label.as_str()).collect();
    assert_eq!(labels, vec!["bar", "interior", "terraza"]);
    Ok(())
}

#[tokio::test]
async fn area_requested_by_reservation_is_kept() -> anyhow::Result<()> {
    let app = setup().await;
    let admin = app.admin();
    let rooftop = table_service::create_area(
        &app.state,
        &admin,
        AreaRequest {
            label: "azotea".into(),
        },
    )
    .await?
    .data
    .expect("area");

    let mut request = ana_lopez();
    request.table_area = Some("azotea".into());
    reservation_service::create_reservation(&app.state, request).await?;

    let result = table_service::delete_area(&app.state, &admin, rooftop.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn table_listing_shows_open_bill() -> anyhow::Result<()> {
    let app = setup().await;
    let bill = bill_service::open_bill(
        &app.state,
        &app.waiter(),
        OpenBillRequest {
            table_code: Some("A2".into()),
            waiter_id: None,
        },
    )
    .await?
    .data
    .expect("bill");

    let tables = table_service::list_tables(&app.state, &app.waiter())
        .await?
        .data
        .expect("tables");
    assert_eq!(tables.items.len(), 6);
    let a2 = tables.items.iter().find(|t| t.code == "A2").expect("A2");
    assert_eq!(a2.status, TableStatus::Occupied);
    assert_eq!(a2.active_bill_code.as_deref(), Some(bill.code.as_str()));

    let with_history = table_service::delete_table(&app.state, &app.admin(), a2.id).await;
    assert!(matches!(with_history, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn plate_price_changes_keep_bill_snapshots() -> anyhow::Result<()> {
    let app = setup().await;
    let admin = app.admin();
    let waiter = app.waiter();

    menu_service::create_category(
        &app.state,
        &admin,
        CategoryRequest {
            label: "Postres".into(),
        },
    )
    .await?;
    let flan = menu_service::create_plate(
        &app.state,
        &admin,
        PlateRequest {
            name: Some("Flan napolitano".into()),
            description: None,
            price: Some(dec!(65.50)),
            category: Some("Postres".into()),
        },
    )
    .await?
    .data
    .expect("plate");
    assert_eq!(flan.price.to_string(), "65.50");

    let bill = bill_service::open_bill(
        &app.state,
        &waiter,
        OpenBillRequest {
            table_code: Some("A1".into()),
            waiter_id: None,
        },
    )
    .await?
    .data
    .expect("bill");
    bill_service::add_plate(
        &app.state,
        &waiter,
        bill.id,
        AddPlateRequest {
            plate_id: Some(flan.id),
            quantity: Some(2),
            notes: None,
        },
    )
    .await?;

    menu_service::update_plate(
        &app.state,
        &admin,
        flan.id,
        PlateRequest {
            name: Some("Flan napolitano".into()),
            description: Some("Receta de la casa".into()),
            price: Some(dec!(80)),
            category: Some("Postres".into()),
        },
    )
    .await?;

    let bill = bill_service::get_bill(&app.state, &waiter, bill.id)
        .await?
        .data
        .expect("bill");
    assert_eq!(bill.total, dec!(131));
    assert_eq!(bill.plates[0].unit_price, dec!(65.50));

    let referenced = menu_service::delete_plate(&app.state, &admin, flan.id).await;
    assert!(matches!(referenced, Err(AppError::Conflict(_))));

    let invalid = menu_service::create_plate(
        &app.state,
        &admin,
        PlateRequest {
            name: Some("Guacamole".into()),
            description: None,
            price: Some(dec!(0)),
            category: Some("Sopas".into()),
        },
    )
    .await;
    let Err(AppError::Validation(errors)) = invalid else {
        panic!("expected validation failure");
    };
    for field in ["name", "price", "category"] {
        assert!(errors.has(field), "missing valid_{field}");
    }

    let menu = menu_service::list_plates(&app.state)
        .await?
        .data
        .expect("menu");
    let flan = menu.items.iter().find(|p| p.name == "Flan napolitano").expect("flan");
    assert_eq!(flan.price, dec!(80));
    assert_eq!(flan.category.as_ref().map(|c| c.label.as_str()), Some("Postres"));
    Ok(())
}

#[tokio::test]
async fn category_rename_keeps_labels_unique() -> anyhow::Result<()> {
    let app = setup().await;
    let admin = app.admin();

    let categories = menu_service::list_categories(&app.state)
        .await?
        .data
        .expect("categories");
    let drinks = categories
        .items
        .iter()
        .find(|c| c.label == "Bebidas")
        .expect("seeded category")
        .id;

    let clash = menu_service::rename_category(
        &app.state,
        &admin,
        drinks,
        CategoryRequest {
            label: "Entradas".into(),
        },
    )
    .await;
    let Err(AppError::Validation(errors)) = clash else {
        panic!("expected validation failure");
    };
    assert!(errors.has("label"));

    let same = menu_service::rename_category(
        &app.state,
        &admin,
        drinks,
        CategoryRequest {
            label: "Bebidas".into(),
        },
    )
    .await?
    .data
    .expect("category");
    assert_eq!(same.label, "Bebidas");

    let renamed = menu_service::rename_category(
        &app.state,
        &admin,
        drinks,
        CategoryRequest {
            label: "  Bebidas y cafés ".into(),
        },
    )
    .await?
    .data
    .expect("category");
    assert_eq!(renamed.label, "Bebidas y cafés");

    let plates = menu_service::list_plates(&app.state)
        .await?
        .data
        .expect("plates");
    let horchata = plates
        .items
        .iter()
        .find(|p| p.name == "Agua de horchata")
        .expect("seeded plate");
    assert_eq!(
        horchata.category.as_ref().map(|c| c.label.as_str()),
        Some("Bebidas y cafés")
    );

    let missing = menu_service::rename_category(
        &app.state,
        &admin,
        uuid::Uuid::new_v4(),
        CategoryRequest {
            label: "Postres".into(),
        },
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn table_held_by_a_reservation_cannot_be_deleted() -> anyhow::Result<()> {
    let app = setup().await;
    let reservation = reservation_service::create_reservation(&app.state, ana_lopez())
        .await?
        .data
        .expect("reservation");
    table_service::assign_table_to_reservation(
        &app.state,
        &app.waiter(),
        reservation.id,
        AssignTableRequest {
            table_code: Some("b3".into()),
        },
    )
    .await?;

    let b3 = app.table("B3").await;
    let result = table_service::delete_table(&app.state, &app.admin(), b3.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(app.table("B3").await.status, TableStatus::Reserved);
    Ok(())
}
