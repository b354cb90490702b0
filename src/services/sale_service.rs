//! Sale creation, status transitions and the assembled sale view.
//!
//! Creating a sale is the one multi-table write path in the system: it
//! validates every stock line up front (advisory fast-fail), then re-checks
//! and decrements each stock row under a FOR UPDATE lock inside a single
//! transaction. The lock is what actually prevents two concurrent sales from
//! overselling; the pre-validation only exists to reject bad requests before
//! any row is touched.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm::sea_query::LockType;
use sea_orm::QuerySelect;
use uuid::Uuid;

use crate::{
    dto::sales::{
        AssembledSale, CreateSaleRequest, ProductEntry, SaleLine, SaleList, SaleStatus,
        SaleWithItems, ServiceWithItems, StockLine, UpdateSaleStatusRequest,
    },
    entity::{
        customers::Entity as Customers,
        sale_items::{ActiveModel as SaleItemActive, Column as SaleItemCol, Entity as SaleItems},
        sale_services::{
            ActiveModel as SaleServiceActive, Column as SaleServiceCol, Entity as SaleServices,
        },
        sells::{ActiveModel as SaleActive, Column as SaleCol, Entity as Sells},
        services::Entity as Services,
        stocks::{ActiveModel as StockActive, Column as StockCol, Entity as Stocks},
    },
    error::{AppError, AppResult},
    models::{Customer, Sale, SaleItem, SaleService},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn create_sale(
    state: &AppState,
    payload: CreateSaleRequest,
) -> AppResult<ApiResponse<SaleWithItems>> {
    if payload.productos.is_empty() {
        return Err(AppError::BadRequest(
            "Se requieren: fecha, id_factura y al menos un producto".into(),
        ));
    }

    let duplicate = Sells::find()
        .filter(SaleCol::IdFactura.eq(payload.id_factura))
        .one(&state.orm)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::BadRequest(format!(
            "Ya existe una venta con el ID de factura {}",
            payload.id_factura
        )));
    }

    let customer = Customers::find_by_id(payload.customer_id)
        .one(&state.orm)
        .await?;
    if customer.is_none() {
        return Err(AppError::BadRequest(format!(
            "No existe un cliente con el ID {}",
            payload.customer_id
        )));
    }

    // Advisory pre-validation over the flattened stock lines: reject the whole
    // request before any write if a line is malformed, unknown or short.
    for line in flatten_stock_lines(&payload.productos) {
        if line.cantidad <= 0 {
            return Err(AppError::BadRequest(format!(
                "La cantidad del producto {} debe ser un entero positivo",
                line.codigo
            )));
        }
        let stock = Stocks::find()
            .filter(StockCol::Codigo.eq(line.codigo.as_str()))
            .one(&state.orm)
            .await?;
        let stock = match stock {
            Some(s) => s,
            None => {
                return Err(AppError::BadRequest(format!(
                    "No existe un producto con el código {}",
                    line.codigo
                )));
            }
        };
        if stock.cantidad < line.cantidad {
            return Err(AppError::BadRequest(format!(
                "Stock insuficiente para el producto {}. Disponible: {}, Solicitado: {}",
                stock.producto, stock.cantidad, line.cantidad
            )));
        }
    }

    let txn = state.orm.begin().await?;

    let sale = SaleActive {
        id: Set(Uuid::new_v4()),
        fecha: Set(payload.fecha),
        id_factura: Set(payload.id_factura),
        customer_id: Set(payload.customer_id),
        estado: Set("pendiente".into()),
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<SaleItem> = Vec::new();
    let mut services: Vec<SaleService> = Vec::new();

    for producto in &payload.productos {
        match producto {
            ProductEntry::Stock(line) => {
                let item = sell_stock_line(&txn, sale.id, payload.fecha, line, None).await?;
                items.push(item);
            }
            ProductEntry::Service(line) => {
                let known = Services::find_by_id(line.id).one(&txn).await?;
                if known.is_none() {
                    return Err(AppError::BadRequest(format!(
                        "No existe un servicio con el ID {}",
                        line.id
                    )));
                }

                let sold = SaleServiceActive {
                    id: Set(Uuid::new_v4()),
                    sell_id: Set(sale.id),
                    service_id: Set(line.id),
                    nombre: Set(line.nombre.clone()),
                    cantidad: Set(line.cantidad),
                    fecha: Set(payload.fecha),
                    precio_total: Set(line.precio_total),
                    precio_unitario: Set(line.precio_unitario),
                }
                .insert(&txn)
                .await?;

                for asociado in &line.productos_asociado {
                    let item =
                        sell_stock_line(&txn, sale.id, payload.fecha, asociado, Some(sold.id))
                            .await?;
                    items.push(item);
                }
                services.push(sale_service_from_entity(sold));
            }
        }
    }

    txn.commit().await?;

    tracing::info!(sale_id = %sale.id, id_factura = sale.id_factura, "sale created");

    Ok(ApiResponse::success(
        "Venta creada",
        SaleWithItems {
            sale: sale_from_entity(sale),
            items,
            services,
        },
        Some(Meta::empty()),
    ))
}

/// Lock the stock row, re-check availability under the lock, record the sold
/// line and decrement the counter. Runs inside the caller's transaction;
/// returning an error rolls the whole sale back.
async fn sell_stock_line(
    txn: &sea_orm::DatabaseTransaction,
    sell_id: Uuid,
    fecha: chrono::NaiveDate,
    line: &StockLine,
    service_id: Option<Uuid>,
) -> AppResult<SaleItem> {
    let stock = Stocks::find()
        .filter(StockCol::Codigo.eq(line.codigo.as_str()))
        .lock(LockType::Update)
        .one(txn)
        .await?;
    let stock = match stock {
        Some(s) => s,
        None => {
            return Err(AppError::BadRequest(format!(
                "No existe un producto con el código {}",
                line.codigo
            )));
        }
    };

    // The pre-validation pass may have raced another sale; this check under
    // the row lock is the one that guarantees cantidad never goes negative.
    if stock.cantidad < line.cantidad {
        return Err(AppError::BadRequest(format!(
            "Stock insuficiente para el producto {}. Disponible: {}, Solicitado: {}",
            stock.producto, stock.cantidad, line.cantidad
        )));
    }

    let item = SaleItemActive {
        id: Set(Uuid::new_v4()),
        sell_id: Set(sell_id),
        producto_id: Set(line.codigo.clone()),
        nombre: Set(stock.producto.clone()),
        cantidad: Set(line.cantidad),
        fecha: Set(fecha),
        precio_total: Set(line.precio_total),
        precio_unitario: Set(line.precio_unitario),
        service_id: Set(service_id),
    }
    .insert(txn)
    .await?;

    let remaining = stock.cantidad - line.cantidad;
    let mut active: StockActive = stock.into();
    active.cantidad = Set(remaining);
    active.update(txn).await?;

    Ok(sale_item_from_entity(item))
}

pub async fn list_sales(state: &AppState) -> AppResult<ApiResponse<SaleList>> {
    let sales = Sells::find()
        .order_by_desc(SaleCol::Fecha)
        .all(&state.orm)
        .await?;

    let mut out = Vec::with_capacity(sales.len());
    for sale in sales {
        let items = SaleItems::find()
            .filter(SaleItemCol::SellId.eq(sale.id))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(sale_item_from_entity)
            .collect();
        let services = SaleServices::find()
            .filter(SaleServiceCol::SellId.eq(sale.id))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(sale_service_from_entity)
            .collect();
        out.push(SaleWithItems {
            sale: sale_from_entity(sale),
            items,
            services,
        });
    }

    let total = out.len() as i64;
    Ok(ApiResponse::success(
        "Ok",
        SaleList { items: out },
        Some(Meta::new(1, total.max(1), total)),
    ))
}

/// Rebuild the unified item list for one sale: services with their consumed
/// stock nested, plus the independently sold items, newest first.
pub async fn get_sale(state: &AppState, id: Uuid) -> AppResult<ApiResponse<AssembledSale>> {
    let sale = Sells::find_by_id(id).one(&state.orm).await?;
    let sale = match sale {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    let customer = Customers::find_by_id(sale.customer_id)
        .one(&state.orm)
        .await?;
    let customer = match customer {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let mut services: Vec<ServiceWithItems> = Vec::new();
    for sold in SaleServices::find()
        .filter(SaleServiceCol::SellId.eq(id))
        .all(&state.orm)
        .await?
    {
        let nested = SaleItems::find()
            .filter(SaleItemCol::ServiceId.eq(sold.id))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(sale_item_from_entity)
            .collect();
        services.push(ServiceWithItems {
            service: sale_service_from_entity(sold),
            items: nested,
        });
    }

    let all_items: Vec<SaleItem> = SaleItems::find()
        .filter(SaleItemCol::SellId.eq(id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(sale_item_from_entity)
        .collect();

    let independent = independent_items(all_items, &services);

    let mut lines: Vec<SaleLine> = services.into_iter().map(SaleLine::Service).collect();
    lines.extend(independent.into_iter().map(SaleLine::Item));
    lines.sort_by(|a, b| b.fecha().cmp(&a.fecha()));

    Ok(ApiResponse::success(
        "Ok",
        AssembledSale {
            sale: sale_from_entity(sale),
            customer: customer_from_entity(customer),
            items: lines,
        },
        Some(Meta::empty()),
    ))
}

/// Items already nested under a service are dropped from the top-level list.
/// The match is by `service_id` equality against every service's nested
/// items, not against the specific service an item was fetched for; the
/// frontend depends on this exact shape, so keep it.
fn independent_items(items: Vec<SaleItem>, services: &[ServiceWithItems]) -> Vec<SaleItem> {
    let nested_service_ids: HashSet<Uuid> = services
        .iter()
        .flat_map(|s| s.items.iter())
        .filter_map(|i| i.service_id)
        .collect();

    items
        .into_iter()
        .filter(|item| match item.service_id {
            Some(sid) => !nested_service_ids.contains(&sid),
            None => true,
        })
        .collect()
}

pub async fn update_sale_status(
    state: &AppState,
    id: Uuid,
    payload: UpdateSaleStatusRequest,
) -> AppResult<ApiResponse<SaleWithItems>> {
    let txn = state.orm.begin().await?;

    let sale = Sells::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let sale = match sale {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    let items = SaleItems::find()
        .filter(SaleItemCol::SellId.eq(sale.id))
        .all(&txn)
        .await?;

    // Cancelling a completed sale puts every sold quantity back on the shelf.
    if payload.estado == SaleStatus::Cancelada && sale.estado == "completada" {
        for item in &items {
            let stock = Stocks::find()
                .filter(StockCol::Codigo.eq(item.producto_id.as_str()))
                .lock(LockType::Update)
                .one(&txn)
                .await?;
            if let Some(stock) = stock {
                let restored = stock.cantidad + item.cantidad;
                let mut active: StockActive = stock.into();
                active.cantidad = Set(restored);
                active.update(&txn).await?;
            }
        }
    }

    let mut active: SaleActive = sale.into();
    active.estado = Set(payload.estado.as_str().to_string());
    let sale = active.update(&txn).await?;

    let services = SaleServices::find()
        .filter(SaleServiceCol::SellId.eq(sale.id))
        .all(&txn)
        .await?
        .into_iter()
        .map(sale_service_from_entity)
        .collect();

    txn.commit().await?;

    tracing::info!(sale_id = %sale.id, estado = %sale.estado, "sale status updated");

    Ok(ApiResponse::success(
        "Venta actualizada",
        SaleWithItems {
            sale: sale_from_entity(sale),
            items: items.into_iter().map(sale_item_from_entity).collect(),
            services,
        },
        Some(Meta::empty()),
    ))
}

/// Every stock-affecting line of the request: direct stock entries plus each
/// service entry's associated products.
fn flatten_stock_lines(productos: &[ProductEntry]) -> Vec<&StockLine> {
    let mut lines = Vec::new();
    for producto in productos {
        match producto {
            ProductEntry::Stock(line) => lines.push(line),
            ProductEntry::Service(line) => lines.extend(line.productos_asociado.iter()),
        }
    }
    lines
}

fn sale_from_entity(model: crate::entity::sells::Model) -> Sale {
    Sale {
        id: model.id,
        fecha: model.fecha,
        id_factura: model.id_factura,
        customer_id: model.customer_id,
        estado: model.estado,
    }
}

fn sale_item_from_entity(model: crate::entity::sale_items::Model) -> SaleItem {
    SaleItem {
        id: model.id,
        sell_id: model.sell_id,
        producto_id: model.producto_id,
        nombre: model.nombre,
        cantidad: model.cantidad,
        fecha: model.fecha,
        precio_total: model.precio_total,
        precio_unitario: model.precio_unitario,
        service_id: model.service_id,
    }
}

fn sale_service_from_entity(model: crate::entity::sale_services::Model) -> SaleService {
    SaleService {
        id: model.id,
        sell_id: model.sell_id,
        service_id: model.service_id,
        nombre: model.nombre,
        cantidad: model.cantidad,
        fecha: model.fecha,
        precio_total: model.precio_total,
        precio_unitario: model.precio_unitario,
    }
}

fn customer_from_entity(model: crate::entity::customers::Model) -> Customer {
    Customer {
        id: model.id,
        cedula: model.cedula,
        cliente: model.cliente,
        email: model.email,
        telefono: model.telefono,
        rif: model.rif,
        empresa: model.empresa,
        direccion: model.direccion,
        ciudad: model.ciudad,
        provincia: model.provincia,
        pais: model.pais,
        nrocasa: model.nrocasa,
        fecha_registro: model.fecha_registro.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::sales::ServiceLine;
    use chrono::NaiveDate;

    fn item(producto: &str, service_id: Option<Uuid>) -> SaleItem {
        SaleItem {
            id: Uuid::new_v4(),
            sell_id: Uuid::nil(),
            producto_id: producto.to_string(),
            nombre: producto.to_string(),
            cantidad: 1,
            fecha: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            precio_total: 100,
            precio_unitario: 100,
            service_id,
        }
    }

    fn service_with(id: Uuid, nested: Vec<SaleItem>) -> ServiceWithItems {
        ServiceWithItems {
            service: SaleService {
                id,
                sell_id: Uuid::nil(),
                service_id: Uuid::new_v4(),
                nombre: "corte".into(),
                cantidad: 1,
                fecha: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                precio_total: 500,
                precio_unitario: 500,
            },
            items: nested,
        }
    }

    #[test]
    fn flatten_collects_direct_and_associated_lines() {
        let productos = vec![
            ProductEntry::Stock(StockLine {
                codigo: "P1".into(),
                cantidad: 2,
                precio_total: 200,
                precio_unitario: 100,
            }),
            ProductEntry::Service(ServiceLine {
                id: Uuid::new_v4(),
                nombre: "corte".into(),
                cantidad: 1,
                precio_total: 500,
                precio_unitario: 500,
                productos_asociado: vec![
                    StockLine {
                        codigo: "P2".into(),
                        cantidad: 1,
                        precio_total: 50,
                        precio_unitario: 50,
                    },
                    StockLine {
                        codigo: "P3".into(),
                        cantidad: 3,
                        precio_total: 30,
                        precio_unitario: 10,
                    },
                ],
            }),
        ];

        let flat = flatten_stock_lines(&productos);
        let codigos: Vec<&str> = flat.iter().map(|l| l.codigo.as_str()).collect();
        assert_eq!(codigos, vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn items_nested_under_a_service_are_not_independent() {
        let sid = Uuid::new_v4();
        let nested = item("P2", Some(sid));
        let services = vec![service_with(sid, vec![nested.clone()])];

        let all = vec![item("P1", None), item("P2", Some(sid))];
        let independent = independent_items(all, &services);

        assert_eq!(independent.len(), 1);
        assert_eq!(independent[0].producto_id, "P1");
    }

    #[test]
    fn untagged_items_stay_independent() {
        let services = vec![service_with(Uuid::new_v4(), vec![])];
        let all = vec![item("P1", None)];
        let independent = independent_items(all, &services);
        assert_eq!(independent.len(), 1);
    }

    #[test]
    fn match_is_by_service_id_across_all_services() {
        // An item tagged with a service id that appears nested under any
        // service in the sale is filtered out, even when it was not fetched
        // for that particular service.
        let sid_a = Uuid::new_v4();
        let sid_b = Uuid::new_v4();
        let services = vec![
            service_with(sid_a, vec![item("P2", Some(sid_a))]),
            service_with(sid_b, vec![]),
        ];

        let all = vec![item("P2", Some(sid_a)), item("P9", Some(sid_b))];
        let independent = independent_items(all, &services);

        // sid_b never shows up among nested items, so P9 survives.
        assert_eq!(independent.len(), 1);
        assert_eq!(independent[0].producto_id, "P9");
    }
}
