//! Cooking-method equivalence. Labels in the same group count as the same technique when
//! picking the second side dish of a bento.

const EQUIVALENCE_GROUPS: &[&[&str]] = &[
    &["きんぴら", "金平"],
    &["煮物", "煮", "煮浸し", "揚げ浸し", "煮付け", "含め煮", "甘辛煮"],
    &["和え物", "和え", "胡麻和え", "ごま和え", "おかか和え", "白和え", "ナムル"],
    &["炒め物", "炒め", "ソテー", "チャンプルー"],
];

/// Canonical label of the group `label` belongs to, or the label itself.
pub fn canonical_method(label: &str) -> &str {
    let label = label.trim();
    EQUIVALENCE_GROUPS
        .iter()
        .find(|group| group.contains(&label))
        .map(|group| group[0])
        .unwrap_or(label)
}

/// Empty labels are never equivalent to anything.
pub fn methods_equivalent(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    if a.is_empty() || b.is_empty() {
        return false;
    }
    canonical_method(a) == canonical_method(b)
}
