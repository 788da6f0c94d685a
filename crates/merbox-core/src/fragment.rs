use crate::codec;
use crate::state::{EditorState, Theme};

/// Marks an address-bar fragment that carries an encoded [`EditorState`].
pub const FRAGMENT_PREFIX: &str = "#pako:";

/// Only a `custom` theme takes its config along into the link.
pub fn share_fragment(state: &EditorState) -> String {
    let theme_config = state
        .theme_config
        .as_ref()
        .filter(|_| state.theme == Theme::Custom);
    format!(
        "{FRAGMENT_PREFIX}{}",
        codec::encode(&state.code, state.theme, theme_config)
    )
}

/// Replaces any existing fragment of `base` with the encoded state.
pub fn share_url(base: &str, state: &EditorState) -> String {
    let base = base.split_once('#').map_or(base, |(head, _)| head);
    format!("{base}{}", share_fragment(state))
}

/// Extracts the token from a `#pako:` fragment or a full URL carrying one.
///
/// Returns `None` when there is no encoded state in the input.
pub fn token_from_fragment(input: &str) -> Option<&str> {
    let hash = input.find('#').map(|i| &input[i..])?;
    hash.strip_prefix(FRAGMENT_PREFIX)
}

/// Decodes the state carried by a fragment or URL, if any.
pub fn decode_fragment(input: &str) -> Option<EditorState> {
    codec::decode(token_from_fragment(input)?)
}
