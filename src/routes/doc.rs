use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        bills::{AddPlateRequest, FinalizeBillRequest, MarkCookedRequest, OpenBillRequest},
        menu::{CategoryRequest, PlateRequest},
        reservations::{
            AssignTableRequest, CancelReservationRequest, CreateReservationRequest,
            EditReservationRequest, IdentityProof,
        },
        reviews::CreateReviewRequest,
        tables::{AreaRequest, TableRequest},
        users::CreateUserRequest,
    },
    lifecycle::{BillState, ReservationState, TableStatus},
    models::{
        Bill, BillPlate, CookedStatus, KitchenTicket, Plate, PlateCategory, Reservation, Review,
        ReviewBoard, Table, TableArea, User,
    },
    response::{ApiResponse, Listing, Meta},
    routes::{
        admin, auth, bills, health, kitchen, menu, params, reservations, reviews, tables, waiter,
    },
    validation::FieldErrors,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        reservations::create,
        reservations::lookup,
        reservations::edit,
        reservations::cancel,
        reservations::mine,
        reviews::list,
        reviews::create,
        waiter::today,
        waiter::assign_table,
        bills::list_bills,
        bills::get_bill,
        bills::open_bill,
        bills::add_plate,
        bills::remove_plate,
        bills::finalize_bill,
        kitchen::queue,
        kitchen::mark_cooked,
        menu::list_plates,
        menu::list_categories,
        tables::list_areas,
        tables::list_tables,
        admin::list_users,
        admin::create_user,
        admin::delete_user,
        admin::create_area,
        admin::update_area,
        admin::delete_area,
        admin::list_tables,
        admin::create_table,
        admin::update_table,
        admin::delete_table,
        admin::create_category,
        admin::rename_category,
        admin::create_plate,
        admin::update_plate,
        admin::delete_plate,
        admin::list_reservations,
        admin::edit_reservation,
        admin::delete_reservation,
        admin::list_bills,
        admin::cancel_bill
    ),
    components(
        schemas(
            User,
            Reservation,
            Table,
            TableArea,
            Plate,
            PlateCategory,
            Bill,
            BillPlate,
            CookedStatus,
            KitchenTicket,
            ReservationState,
            TableStatus,
            BillState,
            Review,
            ReviewBoard,
            FieldErrors,
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            CreateReservationRequest,
            EditReservationRequest,
            CancelReservationRequest,
            IdentityProof,
            AssignTableRequest,
            OpenBillRequest,
            AddPlateRequest,
            FinalizeBillRequest,
            MarkCookedRequest,
            TableRequest,
            AreaRequest,
            PlateRequest,
            CategoryRequest,
            CreateUserRequest,
            CreateReviewRequest,
            params::Pagination,
            params::SortOrder,
            Meta,
            ApiResponse<Reservation>,
            ApiResponse<Bill>,
            ApiResponse<Listing<Reservation>>,
            ApiResponse<Listing<Bill>>,
            ApiResponse<Listing<KitchenTicket>>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Reservations", description = "Customer reservation endpoints"),
        (name = "Waiter", description = "Floor staff endpoints"),
        (name = "Bills", description = "Bill lifecycle endpoints"),
        (name = "Kitchen", description = "Kitchen queue endpoints"),
        (name = "Menu", description = "Public menu endpoints"),
        (name = "Reviews", description = "Customer review endpoints"),
        (name = "Tables", description = "Table and area endpoints"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
