//! Implementaciones Postgres (Diesel) de los puertos del core.
//!
//! Objetivo general del módulo:
//! - Proveer una capa de persistencia durable con paridad de comportamiento
//!   respecto al backend en memoria de `courier-core`.
//! - Hacer que el invariante "un registro por `(order_id, step_code)`" lo
//!   garantice la base: constraint UNIQUE + upsert `ON CONFLICT DO UPDATE`
//!   en una sola sentencia, de modo que dos recorders concurrentes nunca
//!   puedan insertar dos filas.
//! - Ejecutar `complete_with_status` dentro de UNA transacción Diesel:
//!   cambio de status del pedido y registro de completación se confirman
//!   juntos o no se confirman.
//! - Manejo básico de errores transitorios: reintento con backoff en
//!   escrituras y lecturas.
//!
//! Contrato de resiliencia: las lecturas que devuelven `Option`/`Vec`
//! loguean el error y degradan (None / vacío); las escrituras devuelven
//! `Result` y fallan cerradas.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use log::{debug, error, warn};
use uuid::Uuid;

use courier_core::{CoreError, OrderStore, PaymentStore, ProgressStore, StatusCatalog, StepCatalog, UserStore,
                   WorkflowBackend};
use courier_domain::{Order, Payment, ProgressRecord, Role, Status, StatusCategory, StepDefinition, User};

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::{orders, payments, statuses, users, workflow_progress, workflow_steps};

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
///
/// Al construirlo se corre automáticamente el set de migraciones pendientes
/// (una sola vez).
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real (producción/tests de integración) o
/// simular en tests unitarios sin acoplar a r2d2.
pub trait ConnectionProvider: Send + Sync + 'static {
    /// Obtiene una conexión lista para ejecutar consultas Diesel.
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}
impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos mensajes de error (dependen de driver/pg) pueden llegar como Unknown
        // con texto. Hacemos best-effort string match sin acoplar a SQLSTATE.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Retry simple con backoff exponencial muy pequeño (hasta 3 intentos).
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms",
                      attempts + 1,
                      e,
                      delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

// ---- Filas mapeadas ----

#[derive(Queryable, Debug)]
struct UserRow {
    id: Uuid,
    username: String,
    display_name: String,
    phone: String,
    role: String,
}

fn user_from_row(row: UserRow) -> Option<User> {
    match Role::parse(&row.role) {
        Some(role) => Some(User::from_parts(row.id, row.username, row.display_name, row.phone, role)),
        None => {
            warn!("users: fila {} con rol no reconocido '{}', se omite", row.id, row.role);
            None
        }
    }
}

#[derive(Queryable, Debug)]
struct StatusRow {
    id: Uuid,
    category: String,
    name: String,
}

fn status_from_row(row: StatusRow) -> Option<Status> {
    match StatusCategory::parse(&row.category) {
        Some(category) => Some(Status::from_parts(row.id, category, row.name)),
        None => {
            warn!("statuses: fila {} con categoría no reconocida '{}', se omite", row.id, row.category);
            None
        }
    }
}

#[derive(Queryable, Debug)]
struct OrderRow {
    id: Uuid,
    code: String,
    created_by: Uuid,
    status_id: Uuid,
    created_at: DateTime<Utc>,
}

fn order_from_row(row: OrderRow) -> Order {
    Order::from_parts(row.id, row.code, row.created_by, row.status_id, row.created_at)
}

#[derive(Queryable, Debug)]
struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    amount_cents: i64,
    status_id: Uuid,
    created_at: DateTime<Utc>,
}

fn payment_from_row(row: PaymentRow) -> Payment {
    Payment::from_parts(row.id, row.order_id, row.amount_cents, row.status_id, row.created_at)
}

#[derive(Queryable, Debug)]
struct StepRow {
    code: String,
    role: String,
    name: String,
    description: String,
    order_index: i32,
}

fn step_from_row(row: StepRow) -> Option<StepDefinition> {
    let role = Role::parse(&row.role)?;
    let order_index = u32::try_from(row.order_index).ok()?;
    match StepDefinition::new(role, row.code, row.name, row.description, order_index) {
        Ok(step) => Some(step),
        Err(e) => {
            warn!("workflow_steps: fila inválida, se omite: {e}");
            None
        }
    }
}

#[derive(Queryable, Debug)]
struct ProgressRow {
    id: Uuid,
    user_id: Uuid,
    order_id: Uuid,
    step_code: String,
    completed: bool,
    completed_at: DateTime<Utc>,
    details: String,
}

fn progress_from_row(row: ProgressRow) -> ProgressRecord {
    ProgressRecord::from_parts(row.id,
                               row.user_id,
                               row.order_id,
                               row.step_code,
                               row.completed,
                               row.completed_at,
                               row.details)
}

/// Fila para insertar en `workflow_progress`. El `ON CONFLICT` sobre
/// `(order_id, step_code)` convierte el insert en la sobreescritura
/// last-writer-wins del registro existente.
#[derive(Insertable, Debug)]
#[diesel(table_name = workflow_progress)]
struct NewProgressRow<'a> {
    id: Uuid,
    user_id: Uuid,
    order_id: Uuid,
    step_code: &'a str,
    completed: bool,
    completed_at: DateTime<Utc>,
    details: &'a str,
}

/// Sentencia de upsert compartida por `upsert_completion` y la transacción
/// de `complete_with_status`.
fn upsert_statement(conn: &mut PgConnection,
                    order_id: Uuid,
                    step_code: &str,
                    user_id: Uuid,
                    details: &str)
                    -> Result<ProgressRow, diesel::result::Error> {
    let now = Utc::now();
    let row = NewProgressRow { id: Uuid::new_v4(),
                               user_id,
                               order_id,
                               step_code,
                               completed: true,
                               completed_at: now,
                               details };
    diesel::insert_into(workflow_progress::table)
        .values(&row)
        .on_conflict((workflow_progress::order_id, workflow_progress::step_code))
        .do_update()
        .set((workflow_progress::user_id.eq(user_id),
              workflow_progress::completed.eq(true),
              workflow_progress::completed_at.eq(now),
              workflow_progress::details.eq(details)))
        .returning(workflow_progress::all_columns)
        .get_result(conn)
}

/// Backend Postgres del motor de workflow.
pub struct PgWorkflowStore<P: ConnectionProvider> {
    provider: P,
}

impl<P: ConnectionProvider> PgWorkflowStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Lectura con retry que degrada a `None` logueando el error.
    fn read_optional<T, F>(&self, what: &str, f: F) -> Option<T>
        where F: FnMut(&mut PgConnection) -> Result<Option<T>, diesel::result::Error>
    {
        let mut f = f;
        let result = with_retry(|| {
            let mut conn = self.provider.connection()?;
            f(&mut conn).map_err(PersistenceError::from)
        });
        match result {
            Ok(v) => v,
            Err(e) => {
                error!("{what}: read error {e}");
                None
            }
        }
    }

    /// Lectura con retry que degrada a vacío logueando el error.
    fn read_list<T, F>(&self, what: &str, f: F) -> Vec<T>
        where F: FnMut(&mut PgConnection) -> Result<Vec<T>, diesel::result::Error>
    {
        let mut f = f;
        let result = with_retry(|| {
            let mut conn = self.provider.connection()?;
            f(&mut conn).map_err(PersistenceError::from)
        });
        match result {
            Ok(v) => v,
            Err(e) => {
                error!("{what}: read error {e}");
                Vec::new()
            }
        }
    }
}

impl<P: ConnectionProvider> StepCatalog for PgWorkflowStore<P> {
    fn steps_for(&self, role: Role) -> Vec<StepDefinition> {
        let rows = self.read_list("steps_for", |conn| {
            workflow_steps::table.filter(workflow_steps::role.eq(role.as_str()))
                                 .order(workflow_steps::order_index.asc())
                                 .load::<StepRow>(conn)
        });
        rows.into_iter().filter_map(step_from_row).collect()
    }

    fn find_step(&self, code: &str) -> Option<StepDefinition> {
        self.read_optional("find_step", |conn| {
                workflow_steps::table.filter(workflow_steps::code.eq(code))
                                     .first::<StepRow>(conn)
                                     .optional()
            })
            .and_then(step_from_row)
    }
}

impl<P: ConnectionProvider> ProgressStore for PgWorkflowStore<P> {
    fn find_record(&self, order_id: Uuid, step_code: &str) -> Option<ProgressRecord> {
        self.read_optional("find_record", |conn| {
                workflow_progress::table.filter(workflow_progress::order_id.eq(order_id))
                                        .filter(workflow_progress::step_code.eq(step_code))
                                        .first::<ProgressRow>(conn)
                                        .optional()
            })
            .map(progress_from_row)
    }

    fn records_for_order(&self, order_id: Uuid) -> Vec<ProgressRecord> {
        let rows = self.read_list("records_for_order", |conn| {
            workflow_progress::table.filter(workflow_progress::order_id.eq(order_id))
                                    .order((workflow_progress::completed_at.asc(), workflow_progress::step_code.asc()))
                                    .load::<ProgressRow>(conn)
        });
        rows.into_iter().map(progress_from_row).collect()
    }

    fn find_for_user(&self, user_id: Uuid, step_code: &str, order_scope: Option<Uuid>) -> Option<ProgressRecord> {
        self.read_optional("find_for_user", |conn| {
                let mut query = workflow_progress::table.filter(workflow_progress::user_id.eq(user_id))
                                                        .filter(workflow_progress::step_code.eq(step_code))
                                                        .into_boxed();
                if let Some(order_id) = order_scope {
                    query = query.filter(workflow_progress::order_id.eq(order_id));
                }
                query.order(workflow_progress::completed_at.desc())
                     .first::<ProgressRow>(conn)
                     .optional()
            })
            .map(progress_from_row)
    }

    fn upsert_completion(&self, order_id: Uuid, step_code: &str, user_id: Uuid, details: &str)
                         -> Result<ProgressRecord, CoreError> {
        debug!("upsert_completion:start order={order_id} step={step_code} user={user_id}");
        let row = with_retry(|| {
                      let mut conn = self.provider.connection()?;
                      upsert_statement(&mut conn, order_id, step_code, user_id, details).map_err(PersistenceError::from)
                  }).map_err(CoreError::from)?;
        debug!("upsert_completion:done order={order_id} step={step_code} seq_id={}", row.id);
        Ok(progress_from_row(row))
    }
}

impl<P: ConnectionProvider> OrderStore for PgWorkflowStore<P> {
    fn get_order(&self, id: Uuid) -> Option<Order> {
        self.read_optional("get_order", |conn| {
                orders::table.filter(orders::id.eq(id)).first::<OrderRow>(conn).optional()
            })
            .map(order_from_row)
    }

    fn update_status(&self, id: Uuid, status_id: Uuid) -> Result<(), CoreError> {
        let affected = with_retry(|| {
                           let mut conn = self.provider.connection()?;
                           diesel::update(orders::table.filter(orders::id.eq(id)))
                               .set(orders::status_id.eq(status_id))
                               .execute(&mut conn)
                               .map_err(PersistenceError::from)
                       }).map_err(CoreError::from)?;
        if affected == 0 {
            return Err(CoreError::OrderNotFound(id));
        }
        Ok(())
    }

    fn list_by_creator(&self, user_id: Uuid) -> Vec<Order> {
        let rows = self.read_list("list_by_creator", |conn| {
            orders::table.filter(orders::created_by.eq(user_id))
                         .order(orders::created_at.desc())
                         .load::<OrderRow>(conn)
        });
        rows.into_iter().map(order_from_row).collect()
    }
}

impl<P: ConnectionProvider> PaymentStore for PgWorkflowStore<P> {
    fn list_by_order(&self, order_id: Uuid) -> Vec<Payment> {
        let rows = self.read_list("payments:list_by_order", |conn| {
            payments::table.filter(payments::order_id.eq(order_id))
                           .order(payments::created_at.desc())
                           .load::<PaymentRow>(conn)
        });
        rows.into_iter().map(payment_from_row).collect()
    }
}

impl<P: ConnectionProvider> UserStore for PgWorkflowStore<P> {
    fn get_user(&self, id: Uuid) -> Option<User> {
        self.read_optional("get_user", |conn| {
                users::table.filter(users::id.eq(id)).first::<UserRow>(conn).optional()
            })
            .and_then(user_from_row)
    }

    fn get_by_username(&self, username: &str) -> Option<User> {
        self.read_optional("get_by_username", |conn| {
                users::table.filter(users::username.eq(username)).first::<UserRow>(conn).optional()
            })
            .and_then(user_from_row)
    }

    fn list_by_role(&self, role: Role) -> Vec<User> {
        let rows = self.read_list("list_by_role", |conn| {
            users::table.filter(users::role.eq(role.as_str()))
                        .order(users::username.asc())
                        .load::<UserRow>(conn)
        });
        rows.into_iter().filter_map(user_from_row).collect()
    }
}

impl<P: ConnectionProvider> StatusCatalog for PgWorkflowStore<P> {
    fn get_status(&self, id: Uuid) -> Option<Status> {
        self.read_optional("get_status", |conn| {
                statuses::table.filter(statuses::id.eq(id)).first::<StatusRow>(conn).optional()
            })
            .and_then(status_from_row)
    }

    fn get_by_type_and_name(&self, category: StatusCategory, name: &str) -> Option<Status> {
        self.read_optional("get_by_type_and_name", |conn| {
                statuses::table.filter(statuses::category.eq(category.as_str()))
                               .filter(statuses::name.eq(name))
                               .first::<StatusRow>(conn)
                               .optional()
            })
            .and_then(status_from_row)
    }

    fn list_by_type(&self, category: StatusCategory) -> Vec<Status> {
        let rows = self.read_list("list_by_type", |conn| {
            statuses::table.filter(statuses::category.eq(category.as_str()))
                           .order(statuses::name.asc())
                           .load::<StatusRow>(conn)
        });
        rows.into_iter().filter_map(status_from_row).collect()
    }
}

impl<P: ConnectionProvider> WorkflowBackend for PgWorkflowStore<P> {
    fn complete_with_status(&self,
                            order_id: Uuid,
                            step_code: &str,
                            user_id: Uuid,
                            details: &str,
                            status: Option<&Status>)
                            -> Result<ProgressRecord, CoreError> {
        let status_id = status.map(|s| s.id());
        debug!("complete_with_status:start order={order_id} step={step_code} status={status_id:?}");
        // Transacción atómica: upsert de progreso y (si aplica) cambio de
        // status del pedido. Si falla cualquiera, se revierte todo.
        let result = with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction()
                .read_write()
                .run(|tx_conn| {
                    let row = upsert_statement(tx_conn, order_id, step_code, user_id, details)?;
                    if let Some(status_id) = status_id {
                        let affected = diesel::update(orders::table.filter(orders::id.eq(order_id)))
                            .set(orders::status_id.eq(status_id))
                            .execute(tx_conn)?;
                        if affected == 0 {
                            // fuerza rollback del upsert ya ejecutado
                            return Err(diesel::result::Error::NotFound);
                        }
                    }
                    Ok::<ProgressRow, diesel::result::Error>(row)
                })
                .map_err(PersistenceError::from)
        });
        match result {
            Ok(row) => {
                debug!("complete_with_status:done order={order_id} step={step_code}");
                Ok(progress_from_row(row))
            }
            Err(PersistenceError::NotFound) => Err(CoreError::OrderNotFound(order_id)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Construye un pool Postgres r2d2 a partir de URL.
///
/// Comportamiento:
/// - Valida y ajusta tamaños (si `min_size > max_size`, usa `min_size =
///   max_size`).
/// - Ejecuta migraciones inmediatamente tras el primer `get()`.
/// - Devuelve `PersistenceError::TransientIo` ante errores del pool/manager.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = if min_size == 0 { 1 } else { min_size };
    let validated_max = if max_size == 0 { 1 } else { max_size };
    if validated_min > validated_max {
        eprintln!("WARN: min_size > max_size ({} > {}), ajustando min=max",
                  validated_min, validated_max);
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    // Ejecutar migraciones una sola vez al construir (primer connection checkout).
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Helper de desarrollo: carga `.env`, lee configuración (DATABASE_URL,
/// tamaños) y construye un pool ya migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env();
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}
