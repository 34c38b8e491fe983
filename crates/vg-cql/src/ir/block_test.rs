use super::*;
use crate::ir::bool_expr::CompareOp;
use crate::ir::case_statement::{CaseStatement, CaseValue, WhenThen};
use vg_core::{Literal, MemberPath};

fn people(member: &str) -> MemberPath {
    MemberPath::new("People", [member])
}

fn is_manager() -> BoolExpr {
    BoolExpr::IsOf {
        member: MemberPath::extent_root("People"),
        type_name: "Model.Manager".to_string(),
        only: false,
    }
}

/// `SELECT Name, Age, <is manager> FROM People AS T` aliased `T1`
fn people_block(ids: &CqlIdentifiers) -> CqlBlock {
    CqlBlock::extent(
        vec![
            SlotInfo::member(people("Name")),
            SlotInfo::member(people("Age")),
            SlotInfo::boolean(is_manager(), 0, ids),
        ],
        "People",
        BoolExpr::True,
        ids,
        1,
    )
    .unwrap()
}

fn role_statement() -> CaseStatement {
    CaseStatement::new(
        people("Name"),
        vec![WhenThen {
            condition: BoolExpr::Flag("_from0".to_string()),
            value: CaseValue::Constant(Literal::from("Manager")),
        }],
        Some(CaseValue::Constant(Literal::from("Employee"))),
    )
}

fn case_block(ids: &CqlIdentifiers, where_clause: BoolExpr) -> CqlBlock {
    CqlBlock::case(
        vec![
            SlotInfo::case(role_statement()),
            SlotInfo::boolean_column(0, ids),
        ],
        0,
        people_block(ids),
        where_clause,
        ids,
        2,
    )
    .unwrap()
}

const CHILD_TEXT: &str = "
    SELECT
        T.Name AS Name,
        T.Age AS Age,
        T IS OF ([Model].[Manager]) AS _from0
    FROM People AS T";

#[test]
fn test_case_block_without_filter_omits_where() {
    let ids = CqlIdentifiers::new();
    let block = case_block(&ids, BoolExpr::True);

    let esql = block.to_esql(true).unwrap();
    let expected = format!(
        "SELECT VALUE -- Constructing Name
    CASE
        WHEN T1._from0 THEN 'Manager'
        ELSE 'Employee'
    END
FROM ({CHILD_TEXT}
) AS T1"
    );
    assert_eq!(esql, expected);
    assert!(!esql.contains("WHERE"));

    match block.render_structural(true).unwrap() {
        DbExpression::Project { input, .. } => {
            assert_eq!(input.variable_name, "T1");
            assert!(matches!(*input.expression, DbExpression::Project { .. }));
        }
        other => panic!("expected projection, got {other:?}"),
    }
}

#[test]
fn test_case_block_with_filter_renders_where() {
    let ids = CqlIdentifiers::new();
    let adult = BoolExpr::compare(people("Age"), CompareOp::Gt, 18);
    let block = case_block(&ids, adult);

    let esql = block.to_esql(true).unwrap();
    assert!(esql.ends_with(") AS T1\nWHERE T1.Age > 18"), "{esql}");

    match block.render_structural(true).unwrap() {
        DbExpression::Project { input, .. } => match *input.expression {
            DbExpression::Filter { input, predicate } => {
                assert_eq!(input.variable_name, "T1");
                assert_eq!(
                    *predicate,
                    DbExpression::Comparison {
                        op: CompareOp::Gt,
                        left: Box::new(DbExpression::variable("T1").property("Age")),
                        right: Box::new(DbExpression::constant(18)),
                    }
                );
            }
            other => panic!("expected filter, got {other:?}"),
        },
        other => panic!("expected projection, got {other:?}"),
    }
}

#[test]
fn test_filter_equivalent_to_true_is_omitted() {
    let ids = CqlIdentifiers::new();
    let block = case_block(
        &ids,
        BoolExpr::And(vec![BoolExpr::True, BoolExpr::Or(vec![BoolExpr::True])]),
    );
    assert!(!block.has_filter());
    assert!(!block.to_esql(true).unwrap().contains("WHERE"));
}

#[test]
fn test_nested_render_has_no_value_keyword() {
    let ids = CqlIdentifiers::new();
    let block = case_block(&ids, BoolExpr::True);
    let nested = block.to_esql(false).unwrap();
    assert!(nested.starts_with("SELECT -- Constructing Name"), "{nested}");
    assert!(nested.contains("END AS Name,"));
    assert!(nested.contains("T1._from0 AS _from0"));
}

#[test]
fn test_render_text_appends_at_indent() {
    let ids = CqlIdentifiers::new();
    let block = people_block(&ids);
    let mut builder = String::from("prefix");
    block.render_text(&mut builder, false, 1).unwrap();
    assert_eq!(builder, format!("prefix{CHILD_TEXT}"));
}

#[test]
fn test_render_is_repeatable() {
    let ids = CqlIdentifiers::new();
    let block = case_block(&ids, BoolExpr::compare(people("Age"), CompareOp::Gt, 18));
    assert_eq!(block.to_esql(true).unwrap(), block.to_esql(true).unwrap());
    assert_eq!(
        block.render_structural(true).unwrap(),
        block.render_structural(true).unwrap()
    );
}

#[test]
fn test_case_slot_must_have_member() {
    let ids = CqlIdentifiers::new();
    let err = CqlBlock::case(
        vec![
            SlotInfo::case(role_statement()),
            SlotInfo::boolean_column(0, &ids),
        ],
        1,
        people_block(&ids),
        BoolExpr::True,
        &ids,
        2,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PlanError::CaseSlotWithoutMember { slot: 1, .. }
    ));
    assert!(err.to_string().starts_with("[P001]"));
}

#[test]
fn test_case_slot_out_of_range() {
    let ids = CqlIdentifiers::new();
    let err = CqlBlock::case(
        vec![SlotInfo::case(role_statement())],
        4,
        people_block(&ids),
        BoolExpr::True,
        &ids,
        2,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PlanError::SlotIndexOutOfRange { index: 4, len: 1, .. }
    ));
}

#[test]
fn test_extent_rejects_qualified_slot() {
    let ids = CqlIdentifiers::new();
    let err = CqlBlock::extent(
        vec![SlotInfo::qualified(0, people("Name"))],
        "People",
        BoolExpr::True,
        &ids,
        1,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PlanError::UnsupportedSlot {
            kind: "extent",
            value: "qualified",
            ..
        }
    ));
}

#[test]
fn test_top_level_requires_single_member_slot() {
    let ids = CqlIdentifiers::new();
    let block = people_block(&ids);
    let err = block.to_esql(true).unwrap_err();
    assert!(matches!(
        err,
        PlanError::TopLevelProjection { found: 2, .. }
    ));
    assert!(matches!(
        block.render_structural(true),
        Err(PlanError::TopLevelProjection { found: 2, .. })
    ));
}

#[test]
fn test_projected_slots_skip_unrequired() {
    let ids = CqlIdentifiers::new();
    let block = CqlBlock::extent(
        vec![
            SlotInfo::member(people("Name")),
            SlotInfo::member(people("Age")).not_required(),
            SlotInfo::boolean(is_manager(), 0, &ids),
        ],
        "People",
        BoolExpr::True,
        &ids,
        1,
    )
    .unwrap();

    let nested: Vec<&str> = block
        .projected_slots(false)
        .unwrap()
        .into_iter()
        .map(SlotInfo::field_alias)
        .collect();
    assert_eq!(nested, vec!["Name", "_from0"]);

    let top: Vec<&str> = block
        .projected_slots(true)
        .unwrap()
        .into_iter()
        .map(SlotInfo::field_alias)
        .collect();
    assert_eq!(top, vec!["Name"]);
    assert_eq!(block.to_esql(true).unwrap(), "SELECT VALUE\n    T.Name\nFROM People AS T");
}

#[test]
fn test_aliases_come_from_registry() {
    let mut ids = CqlIdentifiers::new();
    ids.add_identifier("t1");
    let block = case_block(&ids, BoolExpr::True);
    assert_eq!(block.aliases(), vec!["T2", "_T1"]);
    assert!(block.to_esql(true).unwrap().contains(") AS _T1"));
}

fn staff_block(ids: &CqlIdentifiers) -> CqlBlock {
    CqlBlock::extent(
        vec![
            SlotInfo::member(MemberPath::new("Staff", ["PersonId"])),
            SlotInfo::member(MemberPath::new("Staff", ["Salary"])),
        ],
        "Staff",
        BoolExpr::True,
        ids,
        3,
    )
    .unwrap()
}

fn ids_block(ids: &CqlIdentifiers) -> CqlBlock {
    CqlBlock::extent(
        vec![
            SlotInfo::member(people("Id")),
            SlotInfo::member(people("Name")),
        ],
        "People",
        BoolExpr::True,
        ids,
        2,
    )
    .unwrap()
}

fn join_clause() -> JoinClause {
    JoinClause {
        kind: JoinKind::LeftOuter,
        on: vec![JoinCondition {
            left: ColumnRef::new(0, "Id"),
            right: ColumnRef::new(1, "PersonId"),
        }],
    }
}

#[test]
fn test_join_block_text() {
    let ids = CqlIdentifiers::new();
    let join = CqlBlock::join(
        vec![
            SlotInfo::qualified(0, people("Name")),
            SlotInfo::qualified(1, MemberPath::new("Staff", ["Salary"])),
        ],
        vec![ids_block(&ids), staff_block(&ids)],
        vec![join_clause()],
        &ids,
        1,
    )
    .unwrap();

    assert_eq!(join.where_clause(), &BoolExpr::True);
    assert_eq!(join.children().len(), 2);
    assert_eq!(
        join.to_esql(false).unwrap(),
        "SELECT
    T2.Name AS Name,
    T3.Salary AS Salary
FROM (
    SELECT
        T.Id AS Id,
        T.Name AS Name
    FROM People AS T
) AS T2
LEFT OUTER JOIN (
    SELECT
        T.PersonId AS PersonId,
        T.Salary AS Salary
    FROM Staff AS T
) AS T3 ON T2.Id = T3.PersonId"
    );
}

#[test]
fn test_join_block_tree() {
    let ids = CqlIdentifiers::new();
    let join = CqlBlock::join(
        vec![SlotInfo::qualified(1, MemberPath::new("Staff", ["Salary"]))],
        vec![ids_block(&ids), staff_block(&ids)],
        vec![join_clause()],
        &ids,
        1,
    )
    .unwrap();

    match join.render_structural(false).unwrap() {
        DbExpression::Project { input, projection } => {
            assert_eq!(input.variable_name, "T1");
            assert_eq!(
                projection.row_columns(),
                vec!["Salary"]
            );
            match *input.expression {
                DbExpression::Join { inputs, clauses } => {
                    let vars: Vec<&str> =
                        inputs.iter().map(|i| i.variable_name.as_str()).collect();
                    assert_eq!(vars, vec!["T2", "T3"]);
                    assert_eq!(clauses[0].kind, JoinKind::LeftOuter);
                    assert_eq!(
                        clauses[0].condition,
                        DbExpression::Comparison {
                            op: CompareOp::Eq,
                            left: Box::new(DbExpression::variable("T2").property("Id")),
                            right: Box::new(DbExpression::variable("T3").property("PersonId")),
                        }
                    );
                }
                other => panic!("expected join, got {other:?}"),
            }
        }
        other => panic!("expected projection, got {other:?}"),
    }
}

#[test]
fn test_join_requires_two_children() {
    let ids = CqlIdentifiers::new();
    let err = CqlBlock::join(
        vec![SlotInfo::qualified(0, people("Name"))],
        vec![ids_block(&ids)],
        vec![],
        &ids,
        1,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PlanError::ChildArity {
            kind: "join",
            found: 1,
            ..
        }
    ));
}

#[test]
fn test_join_clause_count() {
    let ids = CqlIdentifiers::new();
    let err = CqlBlock::join(
        vec![SlotInfo::qualified(0, people("Name"))],
        vec![ids_block(&ids), staff_block(&ids)],
        vec![],
        &ids,
        1,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PlanError::JoinClauseCount {
            expected: 1,
            found: 0,
            ..
        }
    ));
}

#[test]
fn test_join_rejects_member_slot_and_bad_child() {
    let ids = CqlIdentifiers::new();
    let err = CqlBlock::join(
        vec![SlotInfo::member(people("Name"))],
        vec![ids_block(&ids), staff_block(&ids)],
        vec![join_clause()],
        &ids,
        1,
    )
    .unwrap_err();
    assert!(matches!(err, PlanError::UnsupportedSlot { kind: "join", .. }));

    let err = CqlBlock::join(
        vec![SlotInfo::qualified(2, people("Name"))],
        vec![ids_block(&ids), staff_block(&ids)],
        vec![join_clause()],
        &ids,
        1,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PlanError::ChildIndexOutOfRange {
            index: 2,
            children: 2,
            ..
        }
    ));
}

#[test]
fn test_join_clause_cannot_see_later_children() {
    let ids = CqlIdentifiers::new();
    let third = CqlBlock::extent(
        vec![SlotInfo::member(people("Id"))],
        "People",
        BoolExpr::True,
        &ids,
        4,
    )
    .unwrap();
    let early = JoinClause {
        kind: JoinKind::Inner,
        on: vec![JoinCondition {
            left: ColumnRef::new(0, "Id"),
            right: ColumnRef::new(2, "Id"),
        }],
    };
    let err = CqlBlock::join(
        vec![SlotInfo::qualified(0, people("Name"))],
        vec![ids_block(&ids), staff_block(&ids), third],
        vec![early, join_clause()],
        &ids,
        1,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PlanError::ChildIndexOutOfRange {
            index: 2,
            children: 2,
            ..
        }
    ));
}

#[test]
fn test_union_text_and_tree() {
    let ids = CqlIdentifiers::new();
    let left = CqlBlock::extent(
        vec![SlotInfo::member(people("Name"))],
        "People",
        BoolExpr::True,
        &ids,
        2,
    )
    .unwrap();
    let right = CqlBlock::extent(
        vec![SlotInfo::member(MemberPath::new("Staff", ["Name"]))],
        "Staff",
        BoolExpr::True,
        &ids,
        3,
    )
    .unwrap();
    let union = CqlBlock::union(
        vec![SlotInfo::member(people("Name"))],
        vec![left, right],
        &ids,
        1,
    )
    .unwrap();

    assert_eq!(
        union.to_esql(true).unwrap(),
        "(
    SELECT VALUE
        T.Name
    FROM People AS T
)
UNION ALL
(
    SELECT VALUE
        T.Name
    FROM Staff AS T
)"
    );
    assert!(matches!(
        union.render_structural(true).unwrap(),
        DbExpression::UnionAll { .. }
    ));
}

#[test]
fn test_union_children_must_match() {
    let ids = CqlIdentifiers::new();
    let err = CqlBlock::union(
        vec![SlotInfo::member(people("Name"))],
        vec![ids_block(&ids), staff_block(&ids)],
        &ids,
        1,
    )
    .unwrap_err();
    match err {
        PlanError::UnionMismatch {
            child,
            expected,
            found,
            ..
        } => {
            assert_eq!(child, 0);
            assert_eq!(expected, "Name");
            assert_eq!(found, "Id, Name");
        }
        other => panic!("expected union mismatch, got {other:?}"),
    }
}

#[test]
fn test_case_statement_constructs_type() {
    let ids = CqlIdentifiers::new();
    let statement = CaseStatement::new(
        MemberPath::extent_root("People"),
        vec![WhenThen {
            condition: BoolExpr::Flag("_from0".to_string()),
            value: CaseValue::Construct {
                type_name: "Model.Manager".to_string(),
                args: vec![people("Name")],
            },
        }],
        None,
    );
    let block = CqlBlock::case(
        vec![SlotInfo::case(statement)],
        0,
        people_block(&ids),
        BoolExpr::True,
        &ids,
        2,
    )
    .unwrap();

    let esql = block.to_esql(true).unwrap();
    assert!(esql.starts_with("SELECT VALUE -- Constructing People"));
    assert!(esql.contains("WHEN T1._from0 THEN [Model].[Manager](T1.Name)"));
    assert!(!esql.contains("ELSE"));

    match block.render_structural(true).unwrap() {
        DbExpression::Project { projection, .. } => match *projection {
            DbExpression::Case {
                whens,
                thens,
                else_expression,
            } => {
                assert_eq!(whens, vec![DbExpression::variable("T1").property("_from0")]);
                assert!(matches!(&thens[0], DbExpression::NewInstance { type_name, .. } if type_name == "Model.Manager"));
                assert_eq!(*else_expression, DbExpression::null());
            }
            other => panic!("expected case, got {other:?}"),
        },
        other => panic!("expected projection, got {other:?}"),
    }
}

#[test]
fn test_join_rejects_children_sharing_an_alias() {
    let ids = CqlIdentifiers::new();
    let staff_as_two = CqlBlock::extent(
        vec![
            SlotInfo::member(MemberPath::new("Staff", ["PersonId"])),
            SlotInfo::member(MemberPath::new("Staff", ["Salary"])),
        ],
        "Staff",
        BoolExpr::True,
        &ids,
        2,
    )
    .unwrap();
    let err = CqlBlock::join(
        vec![SlotInfo::qualified(0, people("Name"))],
        vec![ids_block(&ids), staff_as_two],
        vec![join_clause()],
        &ids,
        1,
    )
    .unwrap_err();
    match err {
        PlanError::DuplicateAlias { block, alias } => {
            assert_eq!(block, "T1");
            assert_eq!(alias, "T2");
        }
        other => panic!("expected duplicate alias, got {other:?}"),
    }

    // The join's own alias may not reappear below it either
    let err = CqlBlock::join(
        vec![SlotInfo::qualified(0, people("Name"))],
        vec![ids_block(&ids), staff_block(&ids)],
        vec![join_clause()],
        &ids,
        3,
    )
    .unwrap_err();
    assert!(matches!(err, PlanError::DuplicateAlias { ref alias, .. } if alias == "T3"));
    assert!(err.to_string().starts_with("[P013] Malformed plan"));
}

#[test]
fn test_case_and_union_reject_shared_aliases() {
    let ids = CqlIdentifiers::new();
    let err = CqlBlock::case(
        vec![SlotInfo::case(role_statement())],
        0,
        people_block(&ids),
        BoolExpr::True,
        &ids,
        1,
    )
    .unwrap_err();
    assert!(matches!(err, PlanError::DuplicateAlias { ref alias, .. } if alias == "T1"));

    let name_only = |num| {
        CqlBlock::extent(
            vec![SlotInfo::member(people("Name"))],
            "People",
            BoolExpr::True,
            &ids,
            num,
        )
        .unwrap()
    };
    let err = CqlBlock::union(
        vec![SlotInfo::member(people("Name"))],
        vec![name_only(2), name_only(2)],
        &ids,
        1,
    )
    .unwrap_err();
    assert!(matches!(err, PlanError::DuplicateAlias { ref alias, .. } if alias == "T2"));
}

#[test]
fn test_top_level_case_block_projects_case_slot() {
    let ids = CqlIdentifiers::new();
    let block = CqlBlock::case(
        vec![
            SlotInfo::case(role_statement()).not_required(),
            SlotInfo::member(people("Age")),
            SlotInfo::boolean_column(0, &ids),
        ],
        0,
        people_block(&ids),
        BoolExpr::True,
        &ids,
        2,
    )
    .unwrap();

    assert!(matches!(
        block.to_esql(true),
        Err(PlanError::TopLevelCaseSlot { case_slot: 0, .. })
    ));
    assert!(matches!(
        block.render_structural(true),
        Err(PlanError::TopLevelCaseSlot { case_slot: 0, .. })
    ));

    // Nested, the parent decides which slots it reads
    let nested = block.to_esql(false).unwrap();
    assert!(nested.contains("T1.Age AS Age"), "{nested}");
}
