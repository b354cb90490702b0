use std::sync::Arc;

use crate::db::{DbPool, OrmConn};
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub mailer: Arc<Mailer>,
}
