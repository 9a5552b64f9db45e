//! ## fmt
//!
//! error text formatting

/// Marker prepended to every error text which leaves the client.
/// Scripts detect errors raised by this layer with a plain substring match.
pub const ERROR_SENTINEL: &str = "#ERROR#";

/// Tag `err` with [`ERROR_SENTINEL`], unless it already carries it.
pub fn tag_error<E: ToString>(err: E) -> String {
    let text = err.to_string();
    if text.contains(ERROR_SENTINEL) {
        text
    } else {
        format!("{} {}", ERROR_SENTINEL, text)
    }
}

/// Tells whether `text` carries the sentinel
pub fn is_tagged<S: AsRef<str>>(text: S) -> bool {
    text.as_ref().contains(ERROR_SENTINEL)
}
