/// Label reported for departments nobody owns.
pub const UNASSIGNED_LABEL: &str = "Non assigné";

/// Trims a department code and left-pads a lone digit (`"7"` → `"07"`).
///
/// Two-character codes such as `"2A"` and overseas codes such as `"971"` pass through.
pub fn normalize_department_code(raw: &str) -> String {
    let code = raw.trim();
    let mut chars = code.chars();
    match (chars.next(), chars.next()) {
        (Some(digit), None) if digit.is_ascii_digit() => format!("0{digit}"),
        _ => code.to_owned(),
    }
}
