use super::*;
use std::collections::HashSet;

#[test]
fn test_block_alias_default_prefix() {
    let ids = CqlIdentifiers::new();
    assert_eq!(ids.block_alias(1), "T1");
    assert_eq!(ids.block_alias(12), "T12");
    assert_eq!(ids.extent_row_alias(), "T");
}

#[test]
fn test_from_variable_default_prefix() {
    let ids = CqlIdentifiers::new();
    assert_eq!(ids.from_variable(0), "_from0");
}

#[test]
fn test_alias_avoids_registered_member_name() {
    let mut ids = CqlIdentifiers::new();
    ids.add_identifier("t1");
    assert_eq!(ids.block_alias(1), "_T1");
    assert_eq!(ids.block_alias(2), "T2");
}

#[test]
fn test_alias_avoids_chain_of_conflicts() {
    let mut ids = CqlIdentifiers::new();
    ids.add_identifier("T1");
    ids.add_identifier("_T1");
    assert_eq!(ids.block_alias(1), "__T1");
}

#[test]
fn test_extent_row_alias_avoids_conflict() {
    let mut ids = CqlIdentifiers::new();
    ids.add_identifier("T");
    assert_eq!(ids.extent_row_alias(), "_T");
}

#[test]
fn test_distinct_numbers_never_collide() {
    let mut ids = CqlIdentifiers::new();
    ids.add_identifier("T1");
    ids.add_identifier("T3");
    ids.add_identifier("_T3");
    let aliases: HashSet<String> = (0..50).map(|n| ids.block_alias(n)).collect();
    assert_eq!(aliases.len(), 50);
}

#[test]
fn test_resolution_is_deterministic() {
    let mut a = CqlIdentifiers::new();
    let mut b = CqlIdentifiers::new();
    for ids in [&mut a, &mut b] {
        ids.add_identifier("Name");
        ids.add_identifier("T2");
    }
    for n in 0..10 {
        assert_eq!(a.block_alias(n), b.block_alias(n));
    }
}

#[test]
fn test_from_config_registers_reserved_names() {
    let config = IdentifierConfig {
        block_prefix: "B".to_string(),
        from_prefix: "_f".to_string(),
        reserved: vec!["B1".to_string()],
    };
    let ids = CqlIdentifiers::from_config(&config);
    assert_eq!(ids.block_alias(1), "_B1");
    assert_eq!(ids.from_variable(4), "_f4");
}
