//! Storage contract shared by every `UserRepository` implementation.
//!
//! Each check takes a fresh, empty repository.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use domain_users::{ErrorKind, Technology, User, UserFilter, UserRepository};
use std::sync::Arc;

pub fn user(email: &str, technology: Technology) -> User {
    User {
        name: "John".to_string(),
        surname: "Smith".to_string(),
        email: email.to_string(),
        password: "iAmJohnny".to_string(),
        birthday: Utc.with_ymd_and_hms(1980, 1, 1, 0, 0, 0).unwrap(),
        address: "some city, some street 1".to_string(),
        phone: None,
        technology,
        deleted: None,
    }
}

pub async fn create_then_get<R: UserRepository>(repo: &R) {
    repo.create(user("john@smith.name", Technology::Php))
        .await
        .unwrap();

    let found = repo.get("john@smith.name").await.unwrap().unwrap();
    assert_eq!(found.email, "john@smith.name");
    assert_eq!(found.technology, Technology::Php);
    assert!(found.deleted.is_none());
}

pub async fn duplicate_create_conflicts<R: UserRepository>(repo: &R) {
    repo.create(user("john@smith.name", Technology::Php))
        .await
        .unwrap();

    let err = repo
        .create(user("john@smith.name", Technology::Go))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let stored = repo.get("john@smith.name").await.unwrap().unwrap();
    assert_eq!(stored.technology, Technology::Php, "existing record unchanged");

    let all = repo.list(UserFilter::any()).await.unwrap();
    assert_eq!(all.len(), 1, "no second record");
}

pub async fn email_reusable_after_delete<R: UserRepository>(repo: &R) {
    repo.create(user("bobby@xkcd.com", Technology::Go))
        .await
        .unwrap();
    repo.delete("bobby@xkcd.com").await.unwrap();
    repo.create(user("bobby@xkcd.com", Technology::Js))
        .await
        .unwrap();
    repo.delete("bobby@xkcd.com").await.unwrap();
    repo.create(user("bobby@xkcd.com", Technology::Java))
        .await
        .unwrap();

    let active = repo.get("bobby@xkcd.com").await.unwrap().unwrap();
    assert_eq!(active.technology, Technology::Java);

    let deleted = repo
        .list(UserFilter {
            technology: None,
            deleted: Some(true),
        })
        .await
        .unwrap();
    assert_eq!(deleted.len(), 2);
    assert!(deleted.iter().all(|u| u.deleted.is_some()));
}

pub async fn delete_hides_user<R: UserRepository>(repo: &R) {
    repo.create(user("anne@vonflick.de", Technology::Java))
        .await
        .unwrap();
    repo.create(user("john@smith.name", Technology::Php))
        .await
        .unwrap();

    repo.delete("anne@vonflick.de").await.unwrap();

    assert!(repo.get("anne@vonflick.de").await.unwrap().is_none());

    let active = repo.list(UserFilter::default()).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].email, "john@smith.name");

    let everyone = repo.list(UserFilter::any()).await.unwrap();
    assert_eq!(everyone.len(), 2);
}

pub async fn delete_missing_is_not_found<R: UserRepository>(repo: &R) {
    let err = repo.delete("ghost@example.com").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    repo.create(user("john@smith.name", Technology::Php))
        .await
        .unwrap();
    repo.delete("john@smith.name").await.unwrap();

    let err = repo.delete("john@smith.name").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound, "second delete");
}

pub async fn modify_replaces_mutable_fields<R: UserRepository>(repo: &R) {
    repo.create(user("john@smith.name", Technology::Php))
        .await
        .unwrap();

    let mut changed = user("john@smith.name", Technology::Go);
    changed.address = "another city".to_string();
    changed.phone = Some("+1 555".to_string());
    repo.modify(changed).await.unwrap();

    let stored = repo.get("john@smith.name").await.unwrap().unwrap();
    assert_eq!(stored.technology, Technology::Go);
    assert_eq!(stored.address, "another city");
    assert_eq!(stored.phone.as_deref(), Some("+1 555"));
    assert!(stored.deleted.is_none());
}

pub async fn modify_missing_is_not_found<R: UserRepository>(repo: &R) {
    let err = repo
        .modify(user("ghost@example.com", Technology::Go))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    repo.create(user("john@smith.name", Technology::Php))
        .await
        .unwrap();
    repo.delete("john@smith.name").await.unwrap();

    let err = repo
        .modify(user("john@smith.name", Technology::Go))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound, "soft-deleted rows are not modified");
}

pub async fn list_filters_by_technology<R: UserRepository>(repo: &R) {
    repo.create(user("a@go.dev", Technology::Go)).await.unwrap();
    repo.create(user("b@go.dev", Technology::Go)).await.unwrap();
    repo.create(user("c@php.net", Technology::Php))
        .await
        .unwrap();
    repo.delete("b@go.dev").await.unwrap();

    let go_active = repo
        .list(UserFilter {
            technology: Some(Technology::Go),
            deleted: Some(false),
        })
        .await
        .unwrap();
    let emails: Vec<_> = go_active.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, ["a@go.dev"]);

    let go_any = repo
        .list(UserFilter {
            technology: Some(Technology::Go),
            deleted: None,
        })
        .await
        .unwrap();
    assert_eq!(go_any.len(), 2);

    let js = repo
        .list(UserFilter {
            technology: Some(Technology::Js),
            deleted: None,
        })
        .await
        .unwrap();
    assert!(js.is_empty());
}

pub async fn returned_records_are_copies<R: UserRepository>(repo: &R) {
    repo.create(user("john@smith.name", Technology::Php))
        .await
        .unwrap();

    let mut fetched = repo.get("john@smith.name").await.unwrap().unwrap();
    fetched.name = "Mallory".to_string();

    let mut listed = repo.list(UserFilter::default()).await.unwrap();
    listed[0].deleted = Some(Utc::now());

    let stored = repo.get("john@smith.name").await.unwrap().unwrap();
    assert_eq!(stored.name, "John");
    assert!(stored.deleted.is_none());
}

/// Many concurrent creates with one email: exactly one wins.
pub async fn concurrent_creates_admit_one<R: UserRepository + 'static>(repo: Arc<R>) {
    const ATTEMPTS: usize = 32;

    let handles: Vec<_> = (0..ATTEMPTS)
        .map(|_| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move { repo.create(user("race@example.com", Technology::Go)).await })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    let mut created = 0;
    let mut conflicts = 0;
    for result in results {
        match result.unwrap() {
            Ok(()) => created += 1,
            Err(e) => {
                assert_eq!(e.kind(), ErrorKind::Conflict);
                conflicts += 1;
            }
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, ATTEMPTS - 1);

    let active = repo.list(UserFilter::default()).await.unwrap();
    assert_eq!(active.len(), 1);
}
