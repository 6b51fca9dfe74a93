use super::*;

const CREATE_SQL: &str = "CREATE TABLE IF NOT EXISTS test_table(
    id INTEGER PRIMARY KEY,
    name VARCHAR NOT NULL
);
";

fn assert_invalid(name: &str) {
    match parse_definition(name, b"this does not matter") {
        Err(CoreError::InvalidDefinitionFormat { name: n, .. }) => assert_eq!(n, name),
        other => panic!("Expected InvalidDefinitionFormat for {name:?}, got {other:?}"),
    }
}

#[test]
fn test_parse_up_definition() {
    let def = parse_definition("001.up.sql", CREATE_SQL.as_bytes()).unwrap();
    assert_eq!(def.version, "001");
    assert_eq!(def.direction, Direction::Up);
    assert_eq!(def.script, CREATE_SQL);
}

#[test]
fn test_parse_down_definition() {
    let def = parse_definition("002.down.sql", b"DROP TABLE some_other_table;").unwrap();
    assert_eq!(def.version, "002");
    assert_eq!(def.direction, Direction::Down);
    assert_eq!(def.script, "DROP TABLE some_other_table;");
}

#[test]
fn test_version_taken_verbatim() {
    let def = parse_definition("v2024_01.up.sql", b"").unwrap();
    assert_eq!(def.version, "v2024_01");
    assert_eq!(def.script, "");
}

#[test]
fn test_no_extension_rejected() {
    assert_invalid("somestring");
}

#[test]
fn test_invalid_action_rejected() {
    assert_invalid("somestring.else.sql");
}

#[test]
fn test_non_sql_extension_rejected() {
    assert_invalid("somestring.up.txt");
}

#[test]
fn test_too_many_fields_rejected() {
    assert_invalid("001.add_users.up.sql");
}

#[test]
fn test_direction_is_case_sensitive() {
    assert_invalid("001.UP.sql");
}

#[test]
fn test_empty_version_rejected() {
    assert_invalid(".up.sql");
}

#[test]
fn test_sentinel_version_rejected() {
    assert_invalid("000.up.sql");
    assert_invalid("000.down.sql");
    // Only the exact sentinel is reserved
    assert_eq!(parse_definition("0000.up.sql", b"").unwrap().version, "0000");
}

#[test]
fn test_invalid_utf8_rejected() {
    let err = parse_definition("001.up.sql", &[0xff, 0xfe, 0x00]).unwrap_err();
    assert!(matches!(err, CoreError::InvalidDefinitionFormat { .. }));
}

#[test]
fn test_parse_is_deterministic() {
    let a = parse_definition("003.up.sql", b"SELECT 1").unwrap();
    let b = parse_definition("003.up.sql", b"SELECT 1").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_direction_from_str() {
    assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
    assert_eq!("down".parse::<Direction>().unwrap(), Direction::Down);
    assert!(matches!(
        "sideways".parse::<Direction>(),
        Err(CoreError::InvalidAction { action }) if action == "sideways"
    ));
}
