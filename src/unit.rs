/// Object path prefix under which systemd exports its units.
pub const UNIT_PATH_PREFIX: &str = "/org/freedesktop/systemd1/unit";

/// Escape a string so it can be used as a single element of a dbus object path.
///
/// ASCII letters and digits are kept, except for a leading digit. Every other byte becomes `_`
/// followed by two lowercase hex digits. The empty string is encoded as a lone `_`. This matches
/// `sd_bus_path_encode()`.
pub fn escape_label(s: &str) -> String {
    if s.is_empty() {
        return "_".to_owned();
    }

    let mut escaped = String::with_capacity(s.len() * 3);
    for (index, b) in s.bytes().enumerate() {
        if b.is_ascii_alphabetic() || (0 < index && b.is_ascii_digit()) {
            escaped.push(char::from(b));
        } else {
            escaped.push_str(&format!("_{:02x}", b));
        }
    }
    escaped
}

/// Reverse [`escape_label`]. Returns `None` if `label` is not a valid escaped element or does
/// not decode to UTF-8.
pub fn unescape_label(label: &str) -> Option<String> {
    if label == "_" {
        return Some(String::new());
    }

    let b = label.as_bytes();
    let mut out = Vec::with_capacity(b.len());
    let mut i = 0;
    while i < b.len() {
        match b[i] {
            b'_' => {
                let hex = label.get(i + 1..i + 3)?;
                if !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
                    return None;
                }
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            c if c.is_ascii_alphanumeric() => {
                out.push(c);
                i += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(out).ok()
}

/// The object path systemd uses for the unit `name`, for example
/// `/org/freedesktop/systemd1/unit/foobar_2eservice` for `foobar.service`.
pub fn object_path(name: &str) -> String {
    format!("{}/{}", UNIT_PATH_PREFIX, escape_label(name))
}

/// The unit name encoded in a unit object path, if `path` is one.
pub fn name_from_object_path(path: &str) -> Option<String> {
    let label = path.strip_prefix(UNIT_PATH_PREFIX)?.strip_prefix('/')?;
    if label.contains('/') {
        return None;
    }
    unescape_label(label)
}
