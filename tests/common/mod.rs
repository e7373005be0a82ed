#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use dinely_api::{
    config::{AppConfig, offset_from_minutes},
    db::run_migrations,
    dto::reservations::CreateReservationRequest,
    entity::{Plates, Tables, Users, plates, tables, users},
    middleware::auth::AuthUser,
    models::Reservation,
    notify::ReservationNotifier,
    seed::{SeedSummary, seed_demo},
    state::AppState,
};
use sea_orm::{ColumnTrait, ConnectOptions, Database, EntityTrait, QueryFilter};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

/// Remembers every notification instead of logging it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub created: Mutex<Vec<String>>,
    pub cancelled: Mutex<Vec<String>>,
}

impl ReservationNotifier for RecordingNotifier {
    fn reservation_created(&self, reservation: &Reservation) {
        self.created.lock().unwrap().push(reservation.code.clone());
    }

    fn reservation_cancelled(&self, reservation: &Reservation) {
        self.cancelled.lock().unwrap().push(reservation.code.clone());
    }
}

pub struct TestApp {
    pub state: AppState,
    pub seed: SeedSummary,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn admin(&self) -> AuthUser {
        AuthUser {
            user_id: self.seed.admin_id,
            is_admin: true,
            is_waiter: false,
            is_kitchen: false,
        }
    }

    pub fn waiter(&self) -> AuthUser {
        AuthUser {
            user_id: self.seed.waiter_id,
            is_admin: false,
            is_waiter: true,
            is_kitchen: false,
        }
    }

    pub fn kitchen(&self) -> AuthUser {
        AuthUser {
            user_id: self.seed.kitchen_id,
            is_admin: false,
            is_waiter: false,
            is_kitchen: true,
        }
    }

    pub async fn plate_id(&self, name: &str) -> Uuid {
        Plates::find()
            .filter(plates::Column::Name.eq(name))
            .one(&self.state.orm)
            .await
            .unwrap()
            .expect("seeded plate")
            .id
    }

    pub async fn table(&self, code: &str) -> tables::Model {
        Tables::find()
            .filter(tables::Column::Code.eq(code))
            .one(&self.state.orm)
            .await
            .unwrap()
            .expect("seeded table")
    }

    pub async fn user(&self, id: Uuid) -> Option<users::Model> {
        Users::find_by_id(id).one(&self.state.orm).await.unwrap()
    }
}

/// Fresh in-memory database with the schema and demo data applied.
pub async fn setup() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = Database::connect(options).await.expect("sqlite connection");
    run_migrations(&orm).await.expect("migrations");
    let seed = seed_demo(&orm).await.expect("seed");

    let config = AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: JWT_SECRET.into(),
        restaurant_offset: offset_from_minutes(-360).unwrap(),
    };
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::new(orm, config).with_notifier(notifier.clone());

    TestApp {
        state,
        seed,
        notifier,
    }
}

pub fn in_days(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339()
}

pub fn ana_lopez() -> CreateReservationRequest {
    CreateReservationRequest {
        name: Some("Ana López".into()),
        email: Some("ana.lopez@example.com".into()),
        phone_number: Some("5512345678".into()),
        date_time: Some(in_days(3)),
        table_area: Some("terraza".into()),
        amount_people: Some(4),
        notes: Some("Cumpleaños, mesa junto a la ventana".into()),
    }
}
