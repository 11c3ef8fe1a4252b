use derive_more::IsVariant;

#[derive(Debug, Clone, Copy, IsVariant)]
enum Seq {
    Slash,
    SlashDot,
    Other,
}

/// Normalizes a `/`-delimited path into its segments joined by single `/`s, with no leading or
/// trailing separator. Repeated separators collapse, `.` segments and NUL characters are dropped
/// and `..` is kept as an ordinary segment. The root path normalizes to the empty string.
pub(crate) fn sanitize(value: &str) -> String {
    // Pretend the value starts with a separator, so that a leading "." segment is recognised.
    let mut last_seq = Seq::Slash;
    let mut valid = String::with_capacity(value.len());

    for ch in value.chars() {
        match (ch, last_seq) {
            ('\0', _) => (),
            ('/', Seq::Slash) => (),
            ('/', Seq::SlashDot) => {
                last_seq = Seq::Slash;
            },
            ('/', Seq::Other) => {
                last_seq = Seq::Slash;
                valid.push(ch);
            },
            ('.', Seq::Slash) => {
                last_seq = Seq::SlashDot;
            },
            (_, Seq::Slash) => {
                last_seq = Seq::Other;
                valid.push(ch);
            },
            (_, Seq::SlashDot) => {
                last_seq = Seq::Other;
                valid.push('.');
                valid.push(ch);
            },
            (_, Seq::Other) => {
                valid.push(ch);
            },
        }
    }

    // A trailing separator (possibly followed by a dropped "." segment) was pushed but never
    // followed by another segment.
    if !last_seq.is_other() && valid.ends_with('/') {
        valid.pop();
    }

    valid
}

/// Returns whether `value` is already in the form produced by [`sanitize`].
pub(crate) fn is_sanitized(value: &str) -> bool {
    value.is_empty()
        || value
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && !segment.contains('\0'))
}
