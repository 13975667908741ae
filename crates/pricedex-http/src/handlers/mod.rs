pub mod get;
pub mod post;

/// Split a comma-separated query value into trimmed, non-empty entries.
/// An absent or all-empty value yields an empty list.
pub(crate) fn split_csv(raw: Option<&str>) -> Vec<String> {
  raw
    .map(|s| {
      s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
    })
    .unwrap_or_default()
}
