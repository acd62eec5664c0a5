//! courier-persistence
//!
//! Implementación Postgres (Diesel) de los puertos de `courier-core`.
//! Objetivo: un backend durable con paridad de comportamiento frente al
//! backend en memoria, más las garantías que solo la base puede dar: el
//! constraint UNIQUE sobre `(order_id, step_code)` y el upsert
//! `ON CONFLICT` que hacen imposible duplicar registros de progreso bajo
//! concurrencia, y la transacción única que confirma juntos el cambio de
//! status del pedido y la completación del paso.
//!
//! Módulos:
//! - `pg`: implementaciones sobre Postgres (pool r2d2 + retry acotado).
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::init_dotenv;
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, ConnectionProvider, PgPool, PgWorkflowStore, PoolProvider};
