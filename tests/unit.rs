extern crate sdbus_dump;

use sdbus_dump::unit;

#[test]
fn escape_label() {
    let samples = vec![
        // (input, escaped)
        ("test", "test"),
        ("foobar.service", "foobar_2eservice"),
        ("foo_bar.service", "foo_5fbar_2eservice"),
        ("dev-sda1.device", "dev_2dsda1_2edevice"),
        ("", "_"),
        ("1.mount", "_31_2emount"),
        ("Hallöchen", "Hall_c3_b6chen"),
    ];

    for (input, escaped) in samples {
        assert_eq!(unit::escape_label(input), escaped);
        assert_eq!(unit::unescape_label(escaped).as_deref(), Some(input));
    }
}

#[test]
fn unescape_invalid() {
    assert_eq!(unit::unescape_label("foo_2"), None);
    assert_eq!(unit::unescape_label("foo_zz"), None);
    assert_eq!(unit::unescape_label("foo.service"), None);
    assert_eq!(unit::unescape_label("_ff"), None);
}

#[test]
fn object_path() {
    assert_eq!(
        unit::object_path("foobar.service"),
        "/org/freedesktop/systemd1/unit/foobar_2eservice"
    );
    assert_eq!(
        unit::name_from_object_path("/org/freedesktop/systemd1/unit/dbus_2eservice").as_deref(),
        Some("dbus.service")
    );
    assert_eq!(
        unit::name_from_object_path("/org/freedesktop/systemd1"),
        None
    );
    assert_eq!(
        unit::name_from_object_path("/org/freedesktop/systemd1/unit/a/b"),
        None
    );
}
