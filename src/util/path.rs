use std::borrow::Cow;

/// Splits a slash-separated path into its non-empty segments.
///
/// Repeated and trailing separators collapse, so `"/a//b/"` gives `["a", "b"]`
/// and `"/"` gives no segments at all.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Normalizes a segment for lookup. With `fold_case` the segment is lower-cased,
/// matching how a case-insensitive storage service treats names.
pub fn segment_key(segment: &str, fold_case: bool) -> Cow<'_, str> {
    if fold_case && segment.chars().any(char::is_uppercase) {
        Cow::Owned(segment.to_lowercase())
    } else {
        Cow::Borrowed(segment)
    }
}

/// Joins segments back into an absolute display path ("/" for none)
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(segment.as_ref());
    }
    out
}
