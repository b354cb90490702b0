use std::sync::Arc;

use destilo_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::sales::{
        CreateSaleRequest, ProductEntry, SaleStatus, ServiceLine, StockLine,
        UpdateSaleStatusRequest,
    },
    entity::{
        customers::ActiveModel as CustomerActive, services::ActiveModel as ServiceActive,
        stocks::ActiveModel as StockActive, stocks::Entity as Stocks,
        suppliers::ActiveModel as SupplierActive,
    },
    mailer::Mailer,
    services::sale_service,
    state::AppState,
};
use chrono::NaiveDate;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: create a sale mixing a stock line and a service with an
// associated product, verify the decrements, the assembled view and the
// status-reversal restock.
#[tokio::test]
async fn sale_lifecycle_decrements_and_restores_stock() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let supplier_id = seed_supplier(&state).await?;
    let shampoo = seed_stock(&state, supplier_id, "SH-001", "Shampoo", 10, 850).await?;
    let tinte = seed_stock(&state, supplier_id, "TN-090", "Tinte", 6, 1250).await?;
    let customer_id = seed_customer(&state, "V-11222333").await?;
    let service_id = seed_service(&state, "Tinte completo", 4500).await?;

    let fecha = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    let created = sale_service::create_sale(
        &state,
        CreateSaleRequest {
            fecha,
            id_factura: 1001,
            customer_id,
            productos: vec![
                ProductEntry::Stock(StockLine {
                    codigo: "SH-001".into(),
                    cantidad: 4,
                    precio_total: 3400,
                    precio_unitario: 850,
                }),
                ProductEntry::Service(ServiceLine {
                    id: service_id,
                    nombre: "Tinte completo".into(),
                    cantidad: 1,
                    precio_total: 4500,
                    precio_unitario: 4500,
                    productos_asociado: vec![StockLine {
                        codigo: "TN-090".into(),
                        cantidad: 2,
                        precio_total: 2500,
                        precio_unitario: 1250,
                    }],
                }),
            ],
        },
    )
    .await?;

    let sale = created.data.expect("sale data");
    assert_eq!(sale.items.len(), 2);
    assert_eq!(sale.services.len(), 1);
    assert_eq!(sale.sale.estado, "pendiente");

    let shampoo_after = Stocks::find_by_id(shampoo).one(&state.orm).await?.unwrap();
    assert_eq!(shampoo_after.cantidad, 6);
    let tinte_after = Stocks::find_by_id(tinte).one(&state.orm).await?.unwrap();
    assert_eq!(tinte_after.cantidad, 4);

    // Assembled view: the associated item is nested under the service, the
    // direct line stays top-level.
    let assembled = sale_service::get_sale(&state, sale.sale.id).await?;
    let assembled = assembled.data.expect("assembled sale");
    assert_eq!(assembled.customer.id, customer_id);
    assert_eq!(assembled.items.len(), 2);

    // Duplicate invoice is rejected before any write.
    let duplicate = sale_service::create_sale(
        &state,
        CreateSaleRequest {
            fecha,
            id_factura: 1001,
            customer_id,
            productos: vec![ProductEntry::Stock(StockLine {
                codigo: "SH-001".into(),
                cantidad: 1,
                precio_total: 850,
                precio_unitario: 850,
            })],
        },
    )
    .await;
    assert!(duplicate.is_err());

    // Completing then cancelling puts the sold quantities back.
    sale_service::update_sale_status(
        &state,
        sale.sale.id,
        UpdateSaleStatusRequest {
            estado: SaleStatus::Completada,
        },
    )
    .await?;
    let cancelled = sale_service::update_sale_status(
        &state,
        sale.sale.id,
        UpdateSaleStatusRequest {
            estado: SaleStatus::Cancelada,
        },
    )
    .await?;
    assert_eq!(cancelled.data.unwrap().sale.estado, "cancelada");

    let shampoo_restored = Stocks::find_by_id(shampoo).one(&state.orm).await?.unwrap();
    assert_eq!(shampoo_restored.cantidad, 10);
    let tinte_restored = Stocks::find_by_id(tinte).one(&state.orm).await?.unwrap();
    assert_eq!(tinte_restored.cantidad, 6);

    // Insufficient stock on any line rejects the whole sale; the valid line
    // stays untouched.
    let ok_stock = seed_stock(&state, supplier_id, "AC-014", "Acondicionador", 5, 790).await?;
    seed_stock(&state, supplier_id, "SH-002", "Shampoo seco", 1, 900).await?;

    let fecha = NaiveDate::from_ymd_opt(2024, 5, 11).unwrap();
    let result = sale_service::create_sale(
        &state,
        CreateSaleRequest {
            fecha,
            id_factura: 2001,
            customer_id,
            productos: vec![
                ProductEntry::Stock(StockLine {
                    codigo: "AC-014".into(),
                    cantidad: 2,
                    precio_total: 1580,
                    precio_unitario: 790,
                }),
                ProductEntry::Stock(StockLine {
                    codigo: "SH-002".into(),
                    cantidad: 5,
                    precio_total: 4500,
                    precio_unitario: 900,
                }),
            ],
        },
    )
    .await;
    assert!(result.is_err(), "short line must fail the whole sale");

    // The valid line must not have been decremented.
    let untouched = Stocks::find_by_id(ok_stock).one(&state.orm).await?.unwrap();
    assert_eq!(untouched.cantidad, 5);

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE sale_items, sale_services, sells, stocks, security_answers, \
         security_questions, password_reset_tokens, activation_tokens, users, customers, \
         suppliers, services, general_data RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(Some(AppState {
        pool,
        orm,
        mailer: Arc::new(Mailer::disabled()),
    }))
}

async fn seed_supplier(state: &AppState) -> anyhow::Result<Uuid> {
    let supplier = SupplierActive {
        id: Set(Uuid::new_v4()),
        nombre: Set("Distribuidora Caribe".into()),
        razon_social: Set(Some("Distribuidora Caribe C.A.".into())),
        rif: Set(None),
        cargo: Set(None),
        telefono: Set(None),
        email: Set(None),
        webrrss: Set(None),
        productos: Set(None),
        servicios: Set(None),
        fecha_registro: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(supplier.id)
}

async fn seed_stock(
    state: &AppState,
    supplier_id: Uuid,
    codigo: &str,
    producto: &str,
    cantidad: i32,
    precio: i64,
) -> anyhow::Result<Uuid> {
    let stock = StockActive {
        id: Set(Uuid::new_v4()),
        codigo: Set(codigo.into()),
        producto: Set(producto.into()),
        cantidad: Set(cantidad),
        precio_unitario: Set(precio),
        proveedor_id: Set(supplier_id),
    }
    .insert(&state.orm)
    .await?;
    Ok(stock.id)
}

async fn seed_customer(state: &AppState, cedula: &str) -> anyhow::Result<Uuid> {
    let customer = CustomerActive {
        id: Set(Uuid::new_v4()),
        cedula: Set(cedula.into()),
        cliente: Set("Ana Pérez".into()),
        email: Set(format!("{cedula}@example.com")),
        telefono: Set(None),
        rif: Set(None),
        empresa: Set(None),
        direccion: Set(None),
        ciudad: Set(None),
        provincia: Set(None),
        pais: Set(None),
        nrocasa: Set(None),
        fecha_registro: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(customer.id)
}

async fn seed_service(state: &AppState, servicio: &str, precio: i64) -> anyhow::Result<Uuid> {
    let service = ServiceActive {
        id: Set(Uuid::new_v4()),
        servicio: Set(servicio.into()),
        descripcion: Set(None),
        precio: Set(precio),
    }
    .insert(&state.orm)
    .await?;
    Ok(service.id)
}
