//! Users application.
//!
//! # Routes
//! ```text
//! GET  /usuarios                  list
//! GET  /usuarios/novo             creation form
//! POST /usuarios                  create, redirect to list
//! GET  /usuarios/<id>             detail
//! GET  /usuarios/<id>/editar      edit form
//! POST /usuarios/<id>/atualizar   update, redirect to list
//! POST /usuarios/<id>/excluir     delete, redirect to list
//! ```
//!
//! `/usuarios/novo` is registered before `/usuarios/<id>` so the literal
//! wins; the router never reorders.

pub mod handlers;
pub mod pages;
pub mod store;

use std::sync::Arc;

use crate::routing::{PatternError, Router};

pub use store::{FileStore, MemoryStore, StorageError, User, UserStore};

/// Register every users route on `router`, in matching order.
pub fn register_routes(router: &mut Router, store: Arc<dyn UserStore>) -> Result<(), PatternError> {
    router
        .get("/usuarios", handlers::list(store.clone()))?
        .get("/usuarios/novo", handlers::new_form())?
        .post("/usuarios", handlers::create(store.clone()))?
        .get("/usuarios/<id>", handlers::detail(store.clone()))?
        .get("/usuarios/<id>/editar", handlers::edit_form(store.clone()))?
        .post("/usuarios/<id>/atualizar", handlers::update(store.clone()))?
        .post("/usuarios/<id>/excluir", handlers::delete(store))?;
    Ok(())
}
