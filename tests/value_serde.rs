#![cfg(feature = "serde")]

extern crate sdbus_dump;

use sdbus_dump::value::Value;

#[test]
fn properties_to_json() {
    let props = Value::properties(vec![
        ("Type", Value::from("simple")),
        ("MainPID", Value::from(1234u32)),
        ("NRestarts", Value::from(0u32)),
        ("Conditions", Value::array("(sbbsi)", vec![])),
    ]);

    let json = serde_json::to_value(&props).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            ["Type", "simple"],
            ["MainPID", 1234],
            ["NRestarts", 0],
            ["Conditions", []],
        ])
    );
}

#[test]
fn scalars_to_json() {
    let values = vec![
        Value::from(true),
        Value::from(-1i64),
        Value::from(0.5f64),
        Value::ObjectPath("/org/freedesktop/systemd1".into()),
        Value::Struct(vec![Value::from(1u8), Value::Signature("s".into())]),
        Value::Unknown(b'z'),
    ];

    assert_eq!(
        serde_json::to_string(&values).unwrap(),
        r#"[true,-1,0.5,"/org/freedesktop/systemd1",[1,"s"],null]"#
    );
}
