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
    dto::{auth, sales as sale_dto, security},
    models::{
        Customer, GeneralData, Sale, SaleItem, SaleService, SecurityQuestionView, Service, Stock,
        Supplier, UserPublic,
    },
    response::{ApiResponse, Meta},
    routes::{
        customers, general, health, login, params, password_reset, sales, security_questions,
        services, stocks, suppliers, token_validation, users,
    },
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
        login::login,
        token_validation::validate_token,
        sales::create_sale,
        sales::list_sales,
        sales::get_sale,
        sales::update_sale_status,
        sales::best_sells,
        sales::best_services,
        stocks::list_stocks,
        stocks::get_stock,
        stocks::create_stock,
        stocks::update_stock,
        stocks::set_quantity,
        stocks::delete_stock,
        customers::list_customers,
        customers::create_customer,
        customers::delete_customer,
        suppliers::list_suppliers,
        suppliers::get_supplier,
        suppliers::create_supplier,
        suppliers::update_supplier,
        suppliers::delete_supplier,
        services::list_services,
        services::get_service,
        services::create_service,
        services::update_service,
        services::delete_service,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        password_reset::request_reset,
        password_reset::reset_password,
        password_reset::recovery_state,
        security_questions::setup_questions,
        security_questions::get_questions,
        security_questions::get_questions_by_email,
        security_questions::validate_answers,
        general::get_general,
        general::upsert_general,
        general::update_config,
        general::update_schedule
    ),
    components(
        schemas(
            Customer,
            Supplier,
            Service,
            Stock,
            Sale,
            SaleItem,
            SaleService,
            UserPublic,
            SecurityQuestionView,
            GeneralData,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::CreateUserRequest,
            auth::UpdateUserRequest,
            auth::CreatedUserResponse,
            auth::RequestPasswordReset,
            auth::ResetPasswordRequest,
            auth::ActivationResult,
            sale_dto::ProductEntry,
            sale_dto::StockLine,
            sale_dto::ServiceLine,
            sale_dto::CreateSaleRequest,
            sale_dto::SaleWithItems,
            sale_dto::SaleList,
            sale_dto::ServiceWithItems,
            sale_dto::AssembledSale,
            sale_dto::UpdateSaleStatusRequest,
            sale_dto::SaleStatus,
            sale_dto::BestSellRow,
            sale_dto::BestServiceRow,
            security::SetupQuestionsRequest,
            security::QuestionEntry,
            security::CreatedQuestion,
            security::QuestionSet,
            security::ValidateAnswersRequest,
            security::AnswerEntry,
            security::ValidationSuccess,
            security::RecoveryState,
            customers::CreateCustomerRequest,
            customers::CustomerList,
            suppliers::CreateSupplierRequest,
            suppliers::UpdateSupplierRequest,
            suppliers::SupplierList,
            services::CreateServiceRequest,
            services::UpdateServiceRequest,
            services::ServiceList,
            stocks::CreateStockRequest,
            stocks::UpdateStockRequest,
            stocks::SetQuantityRequest,
            stocks::StockWithSupplier,
            stocks::StockList,
            sales::BestSellList,
            sales::BestServiceList,
            general::UpsertGeneralRequest,
            general::ConfigUpdateRequest,
            general::ScheduleUpdateRequest,
            params::Pagination,
            params::SearchQuery,
            Meta,
            ApiResponse<Sale>,
            ApiResponse<sale_dto::SaleWithItems>,
            ApiResponse<sale_dto::AssembledSale>,
            ApiResponse<stocks::StockList>,
            ApiResponse<customers::CustomerList>,
            ApiResponse<UserPublic>,
            ApiResponse<security::RecoveryState>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Sells", description = "Sales and invoicing"),
        (name = "Stocks", description = "Inventory"),
        (name = "Customers", description = "Customer registry"),
        (name = "Suppliers", description = "Supplier registry"),
        (name = "Services", description = "Service catalog"),
        (name = "Users", description = "User administration"),
        (name = "Auth", description = "Login and account activation"),
        (name = "Recovery", description = "Password recovery"),
        (name = "General", description = "Business profile"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
