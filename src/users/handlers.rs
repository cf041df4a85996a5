//! CRUD handlers for the `/usuarios` resource.
//!
//! Each constructor captures the store and returns a `Handler`. Mutating
//! handlers load the whole store, change it, and save it back.

use std::collections::HashMap;
use std::sync::Arc;

use crate::http::request::Request;
use crate::http::response::Reply;
use crate::routing::{Handler, HandlerError, Params};
use crate::users::pages;
use crate::users::store::{is_storable, next_id, User, UserStore};

pub const LIST_PATH: &str = "/usuarios";

pub const INVALID_ID: &str = "ID de usuário inválido.";
pub const INVALID_DATA: &str = "Dados de usuário inválidos.";
pub const USER_NOT_FOUND: &str = "Usuário não encontrado.";
pub const UPDATE_NOT_FOUND: &str = "Usuário não encontrado para atualizar.";
pub const DELETE_NOT_FOUND: &str = "Usuário não encontrado para excluir.";

fn user_id(params: &Params) -> Option<u64> {
    params.get("id").and_then(|id| id.parse().ok())
}

const FIELDS: [&str; 3] = ["nome", "email", "telefone"];

fn field<'a>(form: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    form.get(name).map(String::as_str)
}

/// A blank value counts as absent.
fn filled<'a>(form: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    field(form, name).filter(|v| !v.is_empty())
}

fn fields_storable(form: &HashMap<String, String>) -> bool {
    FIELDS
        .iter()
        .filter_map(|name| field(form, name))
        .all(is_storable)
}

pub fn list(store: Arc<dyn UserStore>) -> impl Handler {
    move |_: &Request, _: &Params| -> Result<Reply, HandlerError> {
        let users = store.load()?;
        Ok(Reply::ok(pages::list(&users)))
    }
}

pub fn new_form() -> impl Handler {
    |_: &Request, _: &Params| -> Result<Reply, HandlerError> { Ok(Reply::ok(pages::new_form())) }
}

pub fn create(store: Arc<dyn UserStore>) -> impl Handler {
    move |request: &Request, _: &Params| -> Result<Reply, HandlerError> {
        let form = request.form();
        if !fields_storable(&form) {
            return Ok(Reply::bad_request(INVALID_DATA));
        }

        let mut users = store.load()?;
        let Some(id) = next_id(&users) else {
            return Err(HandlerError::Other("user id space exhausted".to_string()));
        };
        let [name, email, phone] = FIELDS.map(|name| field(&form, name).unwrap_or_default());
        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        };
        tracing::info!(user_id = user.id, "User created");
        users.push(user);
        store.save(&users)?;

        Ok(Reply::redirect(LIST_PATH))
    }
}

pub fn detail(store: Arc<dyn UserStore>) -> impl Handler {
    move |_: &Request, params: &Params| -> Result<Reply, HandlerError> {
        let Some(id) = user_id(params) else {
            return Ok(Reply::bad_request(INVALID_ID));
        };
        let users = store.load()?;
        Ok(match users.iter().find(|u| u.id == id) {
            Some(user) => Reply::ok(pages::detail(user)),
            None => Reply::not_found(USER_NOT_FOUND),
        })
    }
}

pub fn edit_form(store: Arc<dyn UserStore>) -> impl Handler {
    move |_: &Request, params: &Params| -> Result<Reply, HandlerError> {
        let Some(id) = user_id(params) else {
            return Ok(Reply::bad_request(INVALID_ID));
        };
        let users = store.load()?;
        Ok(match users.iter().find(|u| u.id == id) {
            Some(user) => Reply::ok(pages::edit_form(user)),
            None => Reply::not_found(USER_NOT_FOUND),
        })
    }
}

/// Fields missing from the form keep their stored value.
pub fn update(store: Arc<dyn UserStore>) -> impl Handler {
    move |request: &Request, params: &Params| -> Result<Reply, HandlerError> {
        let Some(id) = user_id(params) else {
            return Ok(Reply::bad_request(INVALID_ID));
        };
        let form = request.form();
        if !fields_storable(&form) {
            return Ok(Reply::bad_request(INVALID_DATA));
        }

        let mut users = store.load()?;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(Reply::not_found(UPDATE_NOT_FOUND));
        };
        if let Some(name) = filled(&form, "nome") {
            user.name = name.to_string();
        }
        if let Some(email) = filled(&form, "email") {
            user.email = email.to_string();
        }
        if let Some(phone) = filled(&form, "telefone") {
            user.phone = phone.to_string();
        }
        store.save(&users)?;
        tracing::info!(user_id = id, "User updated");

        Ok(Reply::redirect(LIST_PATH))
    }
}

pub fn delete(store: Arc<dyn UserStore>) -> impl Handler {
    move |_: &Request, params: &Params| -> Result<Reply, HandlerError> {
        let Some(id) = user_id(params) else {
            return Ok(Reply::bad_request(INVALID_ID));
        };
        let mut users = store.load()?;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(Reply::not_found(DELETE_NOT_FOUND));
        }
        store.save(&users)?;
        tracing::info!(user_id = id, "User deleted");

        Ok(Reply::redirect(LIST_PATH))
    }
}
