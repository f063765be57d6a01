mod id;

pub use id::*;

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap();
}

/// Returns true for `#rgb` and `#rrggbb` colors.
pub fn is_hex_color(input: &str) -> bool {
    HEX_COLOR.is_match(input)
}

/// Parses an absolute http(s) url with a host.
pub fn parse_http_url(input: &str) -> Option<Url> {
    Url::parse(input)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .filter(|u| u.host_str().is_some())
}
