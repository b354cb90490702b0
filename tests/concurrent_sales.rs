use std::sync::Arc;

use destilo_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::sales::{CreateSaleRequest, ProductEntry, StockLine},
    entity::{
        customers::ActiveModel as CustomerActive, stocks::ActiveModel as StockActive,
        stocks::Entity as Stocks, suppliers::ActiveModel as SupplierActive,
    },
    mailer::Mailer,
    services::sale_service,
    state::AppState,
};
use chrono::NaiveDate;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, Statement};
use uuid::Uuid;

// Two sales racing for the same stock row: the quantity check runs again
// under the row lock, so the sale that loses the race must fail and the
// quantity can never go negative.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_sales_cannot_oversell_a_stock_line() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let supplier_id = seed_supplier(&state).await?;
    let stock_id = seed_stock(&state, supplier_id, "SH-001", "Shampoo", 5, 850).await?;
    let customer_id = seed_customer(&state, "V-11222333").await?;

    let fecha = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    let mut handles = Vec::new();
    for id_factura in [3001_i64, 3002] {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            sale_service::create_sale(
                &state,
                CreateSaleRequest {
                    fecha,
                    id_factura,
                    customer_id,
                    productos: vec![ProductEntry::Stock(StockLine {
                        codigo: "SH-001".into(),
                        cantidad: 4,
                        precio_total: 3400,
                        precio_unitario: 850,
                    })],
                },
            )
            .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await?.is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "exactly one of the racing sales may commit");

    let stock = Stocks::find_by_id(stock_id).one(&state.orm).await?.unwrap();
    assert_eq!(stock.cantidad, 1);

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
        "TRUNCATE TABLE sale_items, sale_services, sells, stocks, customers, suppliers \
         RESTART IDENTITY CASCADE",
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
