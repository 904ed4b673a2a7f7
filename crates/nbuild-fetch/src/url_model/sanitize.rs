//! Linux-safe file names.

/// Replaces NUL, `/`, `\` and control characters with `_`.
///
/// Everything else is kept as is, so distinct URL basenames keep distinct
/// cache entries. Names longer than 255 bytes (Linux NAME_MAX) are cut at a
/// char boundary.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out: String = name
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if out.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !out.is_char_boundary(take) {
            take -= 1;
        }
        out.truncate(take);
    }
    out
}
