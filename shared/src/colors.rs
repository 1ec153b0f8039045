/// Display colors keyed by representative name.
pub const NAMED_COLORS: [(&str, &str); 13] = [
    ("Alex", "#3B82F6"),
    ("Caroline", "#EF4444"),
    ("Charles", "#10B981"),
    ("Charlotte", "#F59E0B"),
    ("Isabelle", "#8B5CF6"),
    ("Laurence", "#EC4899"),
    ("Marvin", "#14B8A6"),
    ("Olivier", "#F97316"),
    ("Pascal", "#06B6D4"),
    ("Paul", "#84CC16"),
    ("Pierre", "#F43F5E"),
    ("Victor", "#6366F1"),
    ("Virginie", "#8B5CF6"),
];

/// Palette cycled for names missing from `NAMED_COLORS`.
pub const FALLBACK_PALETTE: [&str; 12] = [
    "#3B82F6", "#EF4444", "#10B981", "#F59E0B", "#8B5CF6", "#EC4899", "#14B8A6", "#F97316",
    "#06B6D4", "#84CC16", "#F43F5E", "#6366F1",
];

/// Fill for departments nobody owns.
pub const UNASSIGNED_COLOR: &str = "#E5E7EB";

pub fn named_color(name: &str) -> Option<&'static str> {
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, color)| *color)
}

/// Color for a representative given the position at which its name was first seen.
///
/// Known names keep their fixed color. Anything else cycles through the
/// fallback palette, so the 13th unknown name reuses the first fallback color.
pub fn representative_color(name: &str, first_seen_index: usize) -> &'static str {
    named_color(name).unwrap_or(FALLBACK_PALETTE[first_seen_index % FALLBACK_PALETTE.len()])
}
