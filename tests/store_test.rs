//! Permission record store: validation, upsert-by-grantee, cascading delete.

mod common;

use common::{build_tree, engine, grant, inherit, SPACE};
use page_permissions::{
    Capability, Grantee, GranteeInput, PermissionError, PermissionInput, PermissionLevel,
    TemplateLevel,
};

#[test]
fn fresh_permission_is_local_with_one_grantee() {
    let engine = engine();
    build_tree(&engine, &[("root", None)]);

    let created = grant(&engine, "root", GranteeInput::user("u1"), "edit");
    assert!(created.is_local());
    assert!(created.source_permission.is_none());
    assert_eq!(created.grantee, Grantee::User("u1".into()));
    assert_eq!(
        created.permission_level,
        PermissionLevel::Template(TemplateLevel::Edit)
    );
}

#[test]
fn create_is_idempotent_per_page_and_grantee() {
    let engine = engine();
    build_tree(&engine, &[("root", None)]);

    let first = grant(&engine, "root", GranteeInput::space(SPACE), "view");
    let second = grant(&engine, "root", GranteeInput::space(SPACE), "view");
    assert_eq!(first.id, second.id);

    let updated = grant(&engine, "root", GranteeInput::space(SPACE), "full_access");
    assert_eq!(updated.id, first.id);
    assert_eq!(
        updated.permission_level,
        PermissionLevel::Template(TemplateLevel::FullAccess)
    );

    let rows = engine.list_permissions("root").unwrap();
    assert_eq!(rows.len(), 1, "second write must update, not duplicate");
}

#[test]
fn same_grantee_on_different_pages_are_separate_rows() {
    let engine = engine();
    build_tree(&engine, &[("root", None), ("child", Some("root"))]);

    let a = grant(&engine, "root", GranteeInput::role("editors"), "edit");
    let b = grant(&engine, "child", GranteeInput::role("editors"), "edit");
    assert_ne!(a.id, b.id);
}

#[test]
fn fresh_permission_requires_exactly_one_grantee() {
    let engine = engine();
    build_tree(&engine, &[("root", None)]);

    let none = engine.create_permission(PermissionInput::fresh(
        "root",
        GranteeInput::default(),
        "view",
    ));
    assert!(matches!(none, Err(PermissionError::InvalidPermissionGrantee { .. })));

    let two = engine.create_permission(PermissionInput::fresh(
        "root",
        GranteeInput {
            user_id: Some("u1".into()),
            role_id: Some("r1".into()),
            space_id: None,
        },
        "view",
    ));
    assert!(matches!(two, Err(PermissionError::InvalidPermissionGrantee { .. })));
    assert!(engine.list_permissions("root").unwrap().is_empty());
}

#[test]
fn unknown_level_is_rejected() {
    let engine = engine();
    build_tree(&engine, &[("root", None)]);

    let err = engine
        .create_permission(PermissionInput::fresh("root", GranteeInput::user("u1"), "owner"))
        .unwrap_err();
    assert!(matches!(err, PermissionError::InvalidPermissionLevel { .. }));
}

#[test]
fn custom_level_keeps_capabilities() {
    let engine = engine();
    build_tree(&engine, &[("root", None)]);

    let created = engine
        .create_permission(PermissionInput::custom(
            "root",
            GranteeInput::user("u1"),
            ["read", "comment"],
        ))
        .unwrap();

    let stored = engine.get_permission(&created.id).unwrap().unwrap();
    assert_eq!(stored.permission_level.name(), "custom");
    assert_eq!(
        stored.permission_level.capabilities(),
        [Capability::Read, Capability::Comment].into_iter().collect()
    );
}

#[test]
fn write_to_unknown_page_fails() {
    let engine = engine();
    let err = engine
        .create_permission(PermissionInput::fresh("ghost", GranteeInput::user("u1"), "view"))
        .unwrap_err();
    assert!(matches!(err, PermissionError::PageNotFound { .. }));
}

#[test]
fn inherited_permission_copies_source_and_joins_it() {
    let engine = engine();
    build_tree(&engine, &[("root", None), ("child", Some("root"))]);

    let source = grant(&engine, "root", GranteeInput::space(SPACE), "comment");
    let copy = inherit(&engine, "child", &source.id);

    assert_eq!(copy.inherited_from_permission.as_deref(), Some(source.id.as_str()));
    assert_eq!(copy.grantee, source.grantee);
    assert_eq!(copy.permission_level, source.permission_level);
    assert_eq!(
        copy.source_permission.as_ref().map(|s| s.id.as_str()),
        Some(source.id.as_str())
    );

    let listed = engine.list_permissions("child").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].source_permission.as_ref().unwrap().page_id, "root");
}

#[test]
fn inheriting_from_missing_permission_fails() {
    let engine = engine();
    build_tree(&engine, &[("root", None)]);

    let err = engine
        .create_permission(PermissionInput::inherited("root", "no-such-permission"))
        .unwrap_err();
    assert!(matches!(err, PermissionError::PermissionNotFound { .. }));
}

#[test]
fn inheriting_from_own_page_is_self_inheritance() {
    let engine = engine();
    build_tree(&engine, &[("root", None)]);

    let own = grant(&engine, "root", GranteeInput::user("u1"), "view");
    let err = engine
        .create_permission(PermissionInput::inherited("root", &own.id))
        .unwrap_err();
    assert!(matches!(err, PermissionError::SelfInheritancePermission { .. }));
}

#[test]
fn inheriting_back_through_a_copy_is_circular() {
    let engine = engine();
    build_tree(&engine, &[("root", None), ("child", Some("root"))]);

    let root_grant = grant(&engine, "root", GranteeInput::user("u1"), "view");
    let child_copy = inherit(&engine, "child", &root_grant.id);

    let err = engine
        .create_permission(PermissionInput::inherited("root", &child_copy.id))
        .unwrap_err();
    assert!(matches!(err, PermissionError::CircularPermission { .. }));

    // The rejected write left the root row untouched.
    let root_row = engine.get_permission(&root_grant.id).unwrap().unwrap();
    assert!(root_row.is_local());
}

#[test]
fn delete_removes_row_and_its_inheritors() {
    let engine = engine();
    build_tree(
        &engine,
        &[("root", None), ("a", Some("root")), ("b", Some("root"))],
    );

    let source = grant(&engine, "root", GranteeInput::space(SPACE), "view");
    let copy_a = inherit(&engine, "a", &source.id);
    let copy_b = inherit(&engine, "b", &source.id);
    let unrelated = grant(&engine, "a", GranteeInput::user("u1"), "edit");

    assert!(engine.delete_permission(&source.id).unwrap());

    assert!(engine.get_permission(&source.id).unwrap().is_none());
    assert!(engine.get_permission(&copy_a.id).unwrap().is_none());
    assert!(engine.get_permission(&copy_b.id).unwrap().is_none());
    assert!(engine.get_permission(&unrelated.id).unwrap().is_some());
}

#[test]
fn delete_of_missing_permission_fails() {
    let engine = engine();
    let err = engine.delete_permission("missing").unwrap_err();
    assert!(matches!(err, PermissionError::PermissionNotFound { .. }));
}

#[test]
fn find_existing_permission_by_grantee() {
    let engine = engine();
    build_tree(&engine, &[("root", None)]);

    assert!(engine
        .find_existing_permission("root", GranteeInput::role("r1"))
        .unwrap()
        .is_none());
    let created = grant(&engine, "root", GranteeInput::role("r1"), "comment");
    let found = engine
        .find_existing_permission("root", GranteeInput::role("r1"))
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);
}

#[test]
fn delete_reaches_chained_copies_at_every_depth() {
    let engine = engine();
    build_tree(
        &engine,
        &[("root", None), ("c", Some("root")), ("s", Some("c"))],
    );

    let source = grant(&engine, "root", GranteeInput::user("u1"), "comment");
    let c_copy = inherit(&engine, "c", &source.id);
    let s_copy = inherit(&engine, "s", &c_copy.id);

    engine.delete_permission(&source.id).unwrap();

    assert!(engine.get_permission(&c_copy.id).unwrap().is_none());
    assert!(engine.get_permission(&s_copy.id).unwrap().is_none());
    assert!(engine.list_permissions("s").unwrap().is_empty());
}
