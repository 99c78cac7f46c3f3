use super::policy::IllegalCharacters;

/// Characters that may not appear in a file name on common filesystems.
pub const RESERVED: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];
const FULL_WIDTH: [char; 9] = ['＼', '／', '＊', '？', '：', '＂', '＜', '＞', '｜'];

/// Which reserved characters to treat as illegal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reserved {
    All,
    /// Path separators are left for [`normalize_path`].
    ExceptSeparators,
}

/// Removes or replaces every reserved character in `text`.
pub(crate) fn sanitize(text: &str, policy: IllegalCharacters, reserved: Reserved) -> String {
    text.chars()
        .filter_map(|c| {
            let Some(index) = RESERVED.iter().position(|r| *r == c) else {
                return Some(c);
            };
            if reserved == Reserved::ExceptSeparators && matches!(c, '/' | '\\') {
                return Some(c);
            }
            match policy {
                IllegalCharacters::Strip => None,
                IllegalCharacters::FullWidth => Some(FULL_WIDTH[index]),
            }
        })
        .collect()
}

/// Turns backslashes into `/`, trims every segment and drops the empty ones,
/// along with `.` and `..`: a compiled path only ever descends.
pub(crate) fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .map(str::trim)
        .filter(|s| !matches!(*s, "" | "." | ".."))
        .collect::<Vec<_>>()
        .join("/")
}
