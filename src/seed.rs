//! Demo data for local development. Every insert is keyed on a unique column, so
//! running the seed twice leaves the database unchanged.

use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    db::now,
    entity::{
        PlateCategories, Plates, TableAreas, Tables, Users, plate_categories, plates,
        table_areas, tables, users,
    },
    lifecycle::TableStatus,
    services::auth_service::hash_password,
};

#[derive(Debug, Clone, Copy)]
pub struct SeedSummary {
    pub admin_id: Uuid,
    pub waiter_id: Uuid,
    pub kitchen_id: Uuid,
}

struct StaffSeed {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    is_admin: bool,
    is_waiter: bool,
    is_kitchen: bool,
}

const STAFF: [StaffSeed; 3] = [
    StaffSeed {
        name: "Administración",
        email: "admin@dinely.mx",
        password: "admin12345",
        is_admin: true,
        is_waiter: false,
        is_kitchen: false,
    },
    StaffSeed {
        name: "Mesero Demo",
        email: "mesero@dinely.mx",
        password: "mesero12345",
        is_admin: false,
        is_waiter: true,
        is_kitchen: false,
    },
    StaffSeed {
        name: "Cocina Demo",
        email: "cocina@dinely.mx",
        password: "cocina12345",
        is_admin: false,
        is_waiter: false,
        is_kitchen: true,
    },
];

const AREAS: [&str; 3] = ["terraza", "interior", "bar"];

// (code, capacity, area)
const TABLES: [(&str, i32, &str); 6] = [
    ("A1", 4, "terraza"),
    ("A2", 2, "terraza"),
    ("B1", 6, "interior"),
    ("B2", 4, "interior"),
    ("B3", 8, "interior"),
    ("C1", 2, "bar"),
];

const CATEGORIES: [&str; 3] = ["Entradas", "Platos fuertes", "Bebidas"];

// (name, description, price in cents, category)
const PLATES: [(&str, &str, i64, &str); 6] = [
    ("Guacamole", "Aguacate, cebolla, cilantro y totopos", 11500, "Entradas"),
    ("Queso fundido", "Con chorizo y tortillas de harina", 13500, "Entradas"),
    ("Tacos al pastor", "Orden de cinco con piña", 14500, "Platos fuertes"),
    ("Enchiladas verdes", "Rellenas de pollo con crema", 16500, "Platos fuertes"),
    ("Agua de horchata", "Vaso de 500 ml", 4500, "Bebidas"),
    ("Café de olla", "Con piloncillo y canela", 4000, "Bebidas"),
];

pub async fn seed_demo<C: ConnectionTrait>(conn: &C) -> anyhow::Result<SeedSummary> {
    let mut staff_ids = Vec::with_capacity(STAFF.len());
    for staff in &STAFF {
        staff_ids.push(ensure_staff(conn, staff).await?);
    }

    for label in AREAS {
        ensure_area(conn, label).await?;
    }
    for (code, capacity, area) in TABLES {
        ensure_table(conn, code, capacity, area).await?;
    }

    for label in CATEGORIES {
        ensure_category(conn, label).await?;
    }
    for (name, description, price, category) in PLATES {
        ensure_plate(conn, name, description, price, category).await?;
    }

    tracing::info!(
        staff = staff_ids.len(),
        tables = TABLES.len(),
        plates = PLATES.len(),
        "demo data seeded"
    );
    Ok(SeedSummary {
        admin_id: staff_ids[0],
        waiter_id: staff_ids[1],
        kitchen_id: staff_ids[2],
    })
}

async fn ensure_staff<C: ConnectionTrait>(conn: &C, staff: &StaffSeed) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(users::Column::Email.eq(staff.email))
        .one(conn)
        .await?
    {
        return Ok(existing.id);
    }
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(staff.name.to_string()),
        email: Set(staff.email.to_string()),
        password_hash: Set(hash_password(staff.password)?),
        is_admin: Set(staff.is_admin),
        is_waiter: Set(staff.is_waiter),
        is_kitchen: Set(staff.is_kitchen),
        created_at: Set(now()),
    }
    .insert(conn)
    .await?;
    Ok(user.id)
}

async fn ensure_area<C: ConnectionTrait>(conn: &C, label: &str) -> anyhow::Result<Uuid> {
    if let Some(existing) = TableAreas::find()
        .filter(table_areas::Column::Label.eq(label))
        .one(conn)
        .await?
    {
        return Ok(existing.id);
    }
    let area = table_areas::ActiveModel {
        id: Set(Uuid::new_v4()),
        label: Set(label.to_string()),
    }
    .insert(conn)
    .await?;
    Ok(area.id)
}

async fn ensure_table<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    capacity: i32,
    area: &str,
) -> anyhow::Result<()> {
    let exists = Tables::find()
        .filter(tables::Column::Code.eq(code))
        .one(conn)
        .await?
        .is_some();
    if exists {
        return Ok(());
    }
    let area_id = ensure_area(conn, area).await?;
    tables::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        capacity: Set(capacity),
        status: Set(TableStatus::Available),
        area_id: Set(Some(area_id)),
        notes: Set(None),
        created_at: Set(now()),
    }
    .insert(conn)
    .await?;
    Ok(())
}

async fn ensure_category<C: ConnectionTrait>(conn: &C, label: &str) -> anyhow::Result<Uuid> {
    if let Some(existing) = PlateCategories::find()
        .filter(plate_categories::Column::Label.eq(label))
        .one(conn)
        .await?
    {
        return Ok(existing.id);
    }
    let category = plate_categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        label: Set(label.to_string()),
    }
    .insert(conn)
    .await?;
    Ok(category.id)
}

async fn ensure_plate<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    description: &str,
    price: i64,
    category: &str,
) -> anyhow::Result<()> {
    let exists = Plates::find()
        .filter(plates::Column::Name.eq(name))
        .one(conn)
        .await?
        .is_some();
    if exists {
        return Ok(());
    }
    let category_id = ensure_category(conn, category).await?;
    plates::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(Some(description.to_string())),
        price: Set(price),
        category_id: Set(Some(category_id)),
        created_at: Set(now()),
    }
    .insert(conn)
    .await?;
    Ok(())
}
