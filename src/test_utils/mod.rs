#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value,
    assert_form_submit_button, assert_form_submit_button_with_text, assert_hx_endpoint,
    must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok, get_header};

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    auth::{PasswordHash, User, create_user, parse_email},
    db::initialize,
};

/// An in-memory database with every table created and a single user.
pub(crate) fn test_db_with_user() -> (Arc<Mutex<Connection>>, User) {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");
    let user = create_user(
        parse_email("test@example.com").unwrap(),
        PasswordHash::new_unchecked("hunter2"),
        &connection,
    )
    .expect("Could not create test user");

    (Arc::new(Mutex::new(connection)), user)
}

/// Add a second user so tests can check that data stays scoped to its owner.
pub(crate) fn create_other_user(connection: &Connection) -> User {
    create_user(
        parse_email("other@example.com").unwrap(),
        PasswordHash::new_unchecked("hunter3"),
        connection,
    )
    .expect("Could not create other test user")
}
