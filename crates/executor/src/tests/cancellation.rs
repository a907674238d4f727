//! Cancellation tests.

use std::thread;

use super::{insert_user, Fixture};
use crate::{Error, RecordType};

#[test]
fn test_cancelled_command_makes_no_requests() {
    let fx = Fixture::new();
    let command = fx
        .command("Users", "INSERT Users (Users.Email) VALUES (@Email)")
        .with_parameter("Users.Email", "a@b.com");
    command.cancel();

    assert_eq!(command.execute_non_query(), Err(Error::Cancelled));
    assert_eq!(fx.store.stats().total(), 0);
}

#[test]
fn test_cancel_from_another_thread() {
    let fx = Fixture::new();
    insert_user(&fx, "Ann", "a@b.com", 30);
    let command = fx
        .command("Users", "SELECT * FROM Users r")
        .with_record_type(RecordType::named("Users"));
    let token = command.cancel_token();

    thread::spawn(move || token.cancel()).join().unwrap();

    assert!(matches!(command.execute_reader(), Err(Error::Cancelled)));
}

#[test]
fn test_reset_token_allows_rerun() {
    let fx = Fixture::new();
    let command = fx
        .command("Users", "INSERT Users (Users.Email) VALUES (@Email)")
        .with_parameter("Users.Email", "a@b.com");
    command.cancel();
    assert!(command.execute_non_query().is_err());

    command.cancel_token().reset();
    assert_eq!(command.execute_non_query().unwrap().rows, 1);
}

#[test]
fn test_cancelled_sequence_allocation_stops_before_counter() {
    let fx = Fixture::new();
    let command = fx
        .command("Users", "INSERT Users (Users.UserId) VALUES (@UserId)")
        .with_id_field("UserId")
        .with_parameter("Users.UserId", 0i64);
    command.cancel();

    assert_eq!(command.execute_non_query(), Err(Error::Cancelled));
    assert!(fx.documents("Users").is_empty());
}
