// ABOUTME: Built-in sanitization rules keyed by control type
// ABOUTME: Checkbox, color, page id, URL, choice, post markup and plain text cleaning

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::types::SettingDescriptor;

/// Schemes a stored URL may use; anything else sanitizes to an empty string
pub const SAFE_URL_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "irc6", "ircs", "gopher", "nntp",
    "feed", "telnet", "mms", "rtsp", "sms", "svn", "tel", "fax", "xmpp", "webcal", "urn",
];

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([A-Fa-f0-9]{3}){1,2}$").expect("valid hex color regex"));

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").expect("valid number regex")
});

static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid scheme regex"));

static ENCODED_LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)%0[ad]").expect("valid line break regex"));

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>")
        .expect("valid script regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("valid tag regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("valid whitespace regex"));

static ENCODED_OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("valid octet regex"));

static POST_ALLOWLIST: LazyLock<ammonia::Builder<'static>> = LazyLock::new(|| {
    let mut builder = ammonia::Builder::default();
    builder.add_generic_attributes(&["class", "id"]);
    builder
});

// Rule adapters used by the sanitizer's dispatch table

pub fn checkbox(raw: &Value, _setting: &SettingDescriptor) -> Value {
    if loosely_equals_one(raw) {
        Value::from(1)
    } else {
        Value::String(String::new())
    }
}

pub fn color(raw: &Value, _setting: &SettingDescriptor) -> Value {
    match raw {
        Value::String(s) => sanitize_hex_color(s)
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

pub fn page_id(raw: &Value, _setting: &SettingDescriptor) -> Value {
    Value::from(intval(raw))
}

pub fn url(raw: &Value, _setting: &SettingDescriptor) -> Value {
    Value::String(esc_url(&value_to_text(raw)))
}

pub fn choice(raw: &Value, setting: &SettingDescriptor) -> Value {
    match choice_key(raw) {
        Some(key) if setting.choices.contains_key(&key) => raw.clone(),
        _ => Value::Null,
    }
}

pub fn post_content(raw: &Value, _setting: &SettingDescriptor) -> Value {
    Value::String(kses_post(&value_to_text(raw)))
}

pub fn text_field(raw: &Value, _setting: &SettingDescriptor) -> Value {
    Value::String(sanitize_text_field(&value_to_text(raw)))
}

// Value-level helpers

/// Loose comparison against the integer 1: numbers, `true` and numeric strings qualify
pub fn loosely_equals_one(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => s.trim().parse::<f64>().map(|f| f == 1.0).unwrap_or(false),
        _ => false,
    }
}

/// Returns the color unchanged when it is `#rgb` or `#rrggbb`.
/// An empty string is accepted as "no color".
pub fn sanitize_hex_color(color: &str) -> Option<&str> {
    if color.is_empty() || HEX_COLOR.is_match(color) {
        Some(color)
    } else {
        None
    }
}

/// Integer conversion that never fails: truncates floats, reads the leading
/// number of a string, and falls back to 0.
pub fn intval(raw: &Value) -> i64 {
    match raw {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .unwrap_or_else(|| float_to_int(n.as_f64().unwrap_or_default())),
        Value::String(s) => parse_leading_int(s),
        Value::Array(a) => i64::from(!a.is_empty()),
        Value::Object(o) => i64::from(!o.is_empty()),
    }
}

fn float_to_int(f: f64) -> i64 {
    if f.is_finite() {
        // `as` saturates at the i64 bounds
        f.trunc() as i64
    } else {
        0
    }
}

fn parse_leading_int(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let Some(number) = LEADING_NUMBER.find(trimmed).map(|m| m.as_str()) else {
        return 0;
    };

    if number.bytes().all(|b| b.is_ascii_digit() || b == b'+' || b == b'-') {
        return number.parse::<i64>().unwrap_or(if number.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        });
    }

    number.parse::<f64>().map(float_to_int).unwrap_or(0)
}

/// Key under which a raw value would be looked up in a choice set
fn choice_key(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        // Fractional keys truncate
        Value::Number(n) if n.is_f64() => Some(intval(raw).to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(i64::from(*b).to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Render a scalar as text; containers and null become empty
pub fn value_to_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || !c.is_ascii() || "-~+_.?#=!&;,/:%@$|*'()[]".contains(c)
}

/// Clean a URL for storage.
///
/// Disallowed characters and encoded line breaks are removed, relative
/// references (`/`, `#`, `?`) are kept as-is and scheme-less input is treated
/// as `http://`. Unparseable URLs and unsafe schemes yield an empty string.
pub fn esc_url(raw: &str) -> String {
    let url: String = raw
        .trim()
        .replace(' ', "%20")
        .chars()
        .filter(|c| is_url_char(*c))
        .collect();

    let mut url = url;
    while ENCODED_LINE_BREAK.is_match(&url) {
        url = ENCODED_LINE_BREAK.replace_all(&url, "").into_owned();
    }
    let url = url.replace(";//", "://");

    if url.is_empty() {
        return String::new();
    }
    if url.starts_with(['/', '#', '?']) {
        return url;
    }

    let candidate = if URL_SCHEME.is_match(&url) {
        url
    } else {
        format!("http://{}", url)
    };

    match Url::parse(&candidate) {
        Ok(parsed) if SAFE_URL_SCHEMES.contains(&parsed.scheme()) => parsed.to_string(),
        Ok(parsed) => {
            tracing::debug!("Discarding URL with unsafe scheme '{}'", parsed.scheme());
            String::new()
        }
        Err(_) => String::new(),
    }
}

/// Filter markup through the post-content allowlist.
///
/// Unbalanced tags are closed by the HTML parser; script and style elements
/// are dropped together with their content.
pub fn kses_post(html: &str) -> String {
    POST_ALLOWLIST.clean(html).to_string()
}

/// Reduce input to a single line of plain text.
pub fn sanitize_text_field(input: &str) -> String {
    let mut text = input.to_string();

    if text.contains('<') {
        text = SCRIPT_OR_STYLE.replace_all(&text, "").into_owned();
        text = TAG.replace_all(&text, "").into_owned();
        // Whatever '<' survives does not open a tag
        text = text.replace('<', "&lt;");
    }

    text = WHITESPACE_RUN.replace_all(&text, " ").trim().to_string();

    let mut found_octets = false;
    while ENCODED_OCTET.is_match(&text) {
        text = ENCODED_OCTET.replace_all(&text, "").into_owned();
        found_octets = true;
    }
    if found_octets {
        text = WHITESPACE_RUN.replace_all(&text, " ").trim().to_string();
    }

    text
}
