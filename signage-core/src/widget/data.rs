use std::fmt::Display;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{is_hex_color, parse_http_url, DocumentId};

lazy_static! {
    static ref IMAGE_PATH: Regex =
        Regex::new(r"(?i)\.(?:png|jpe?g|gif|webp|svg|bmp|avif)$").unwrap();
    static ref YOUTUBE_VIDEO_ID: Regex = Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap();
}

/// The closed set of widget types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Announcement,
    Congrats,
    Image,
    List,
    Slideshow,
    Weather,
    Web,
    YouTube,
    Empty,
}

impl WidgetType {
    /// A human readable name, used in validation messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Announcement => "Announcement",
            Self::Congrats => "Congrats",
            Self::Image => "Image",
            Self::List => "List",
            Self::Slideshow => "Slideshow",
            Self::Weather => "Weather",
            Self::Web => "Web",
            Self::YouTube => "YouTube",
            Self::Empty => "Empty",
        }
    }
}

impl Display for WidgetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a widget's payload doesn't fit its type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid data for {kind} widget: {reason}")]
pub struct WidgetDataError {
    pub kind: WidgetType,
    pub reason: String,
}

impl WidgetDataError {
    pub fn new(kind: WidgetType, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementData {
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CongratsData {
    pub text: String,
    #[serde(default)]
    pub recipient: Option<String>,
    /// Name of the celebration animation, the client picks one if absent
    #[serde(default)]
    pub animation: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    #[default]
    Contain,
    Cover,
    Fill,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub url: String,
    #[serde(default)]
    pub fit: ImageFit,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub ordered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideshowData {
    pub slideshow_id: DocumentId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnits {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherData {
    pub location: String,
    #[serde(default)]
    pub units: TemperatureUnits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebData {
    pub url: String,
    /// Seconds between reloads of the page, never reloaded if absent
    #[serde(default)]
    pub refresh_interval: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YouTubeData {
    pub url: String,
    #[serde(default = "default_true")]
    pub muted: bool,
    #[serde(default = "default_true")]
    pub looped: bool,
}

fn default_true() -> bool {
    true
}

/// The type-specific content of a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetData {
    Announcement(AnnouncementData),
    Congrats(CongratsData),
    Image(ImageData),
    List(ListData),
    Slideshow(SlideshowData),
    Weather(WeatherData),
    Web(WebData),
    YouTube(YouTubeData),
    Empty,
}

impl WidgetData {
    pub const MIN_REFRESH_INTERVAL: u32 = 5;
    pub const MAX_LIST_ITEMS: usize = 50;

    /// Builds and validates the payload for a widget type from raw JSON.
    pub fn from_parts(kind: WidgetType, data: Value) -> Result<Self, WidgetDataError> {
        let widget_data = match kind {
            WidgetType::Announcement => Self::Announcement(payload(kind, data)?),
            WidgetType::Congrats => Self::Congrats(payload(kind, data)?),
            WidgetType::Image => Self::Image(payload(kind, data)?),
            WidgetType::List => Self::List(payload(kind, data)?),
            WidgetType::Slideshow => Self::Slideshow(payload(kind, data)?),
            WidgetType::Weather => Self::Weather(payload(kind, data)?),
            WidgetType::Web => Self::Web(payload(kind, data)?),
            WidgetType::YouTube => Self::YouTube(payload(kind, data)?),
            WidgetType::Empty => Self::Empty,
        };

        widget_data.validate()?;
        Ok(widget_data)
    }

    pub fn kind(&self) -> WidgetType {
        match self {
            Self::Announcement(_) => WidgetType::Announcement,
            Self::Congrats(_) => WidgetType::Congrats,
            Self::Image(_) => WidgetType::Image,
            Self::List(_) => WidgetType::List,
            Self::Slideshow(_) => WidgetType::Slideshow,
            Self::Weather(_) => WidgetType::Weather,
            Self::Web(_) => WidgetType::Web,
            Self::YouTube(_) => WidgetType::YouTube,
            Self::Empty => WidgetType::Empty,
        }
    }

    /// Returns the payload as raw JSON, the inverse of [WidgetData::from_parts]
    pub fn to_value(&self) -> Value {
        let value = match self {
            Self::Announcement(data) => serde_json::to_value(data),
            Self::Congrats(data) => serde_json::to_value(data),
            Self::Image(data) => serde_json::to_value(data),
            Self::List(data) => serde_json::to_value(data),
            Self::Slideshow(data) => serde_json::to_value(data),
            Self::Weather(data) => serde_json::to_value(data),
            Self::Web(data) => serde_json::to_value(data),
            Self::YouTube(data) => serde_json::to_value(data),
            Self::Empty => Ok(Value::Object(Default::default())),
        };

        // Payloads only contain strings, numbers and booleans
        value.unwrap_or_default()
    }

    /// The slideshow this widget shows, if it's a slideshow widget
    pub fn slideshow_id(&self) -> Option<DocumentId> {
        match self {
            Self::Slideshow(data) => Some(data.slideshow_id),
            _ => None,
        }
    }

    /// Checks the rules each widget type places on its payload.
    pub fn validate(&self) -> Result<(), WidgetDataError> {
        let kind = self.kind();
        let fail = |reason: &str| Err(WidgetDataError::new(kind, reason));

        match self {
            Self::Announcement(data) => {
                if data.text.trim().is_empty() {
                    return fail("text is required");
                }

                if data.color.as_deref().is_some_and(|c| !is_hex_color(c)) {
                    return fail("color must be a hex color");
                }
            }
            Self::Congrats(data) => {
                if data.text.trim().is_empty() {
                    return fail("text is required");
                }
            }
            Self::Image(data) => {
                let is_image = parse_http_url(&data.url)
                    .map(|url| IMAGE_PATH.is_match(url.path()))
                    .unwrap_or(false);

                if !is_image {
                    return fail("URL must be a valid image URL");
                }
            }
            Self::List(data) => {
                if data.items.len() > Self::MAX_LIST_ITEMS {
                    return fail("list can't have more than 50 items");
                }

                if data.items.iter().any(|i| i.trim().is_empty()) {
                    return fail("list items can't be empty");
                }
            }
            // The reference itself is checked against the store
            Self::Slideshow(_) => {}
            Self::Weather(data) => {
                if data.location.trim().is_empty() {
                    return fail("location is required");
                }
            }
            Self::Web(data) => {
                if parse_http_url(&data.url).is_none() {
                    return fail("URL must be a valid http(s) URL");
                }

                if data
                    .refresh_interval
                    .is_some_and(|i| i < Self::MIN_REFRESH_INTERVAL)
                {
                    return fail("refresh interval must be at least 5 seconds");
                }
            }
            Self::YouTube(data) => {
                if youtube_video_id(&data.url).is_none() {
                    return fail("URL must be a YouTube video link");
                }
            }
            Self::Empty => {}
        }

        Ok(())
    }
}

fn payload<T: DeserializeOwned>(kind: WidgetType, data: Value) -> Result<T, WidgetDataError> {
    serde_json::from_value(data)
        .map_err(|e| WidgetDataError::new(kind, format!("payload is malformed ({})", e)))
}

/// Extracts the video id from a youtube.com or youtu.be link.
pub fn youtube_video_id(input: &str) -> Option<String> {
    let url = parse_http_url(input)?;
    let host = url.host_str()?;

    let candidate = if host == "youtu.be" {
        url.path_segments()?.next().map(str::to_string)
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        let mut segments = url.path_segments()?;

        match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            "embed" | "shorts" | "v" | "live" => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    };

    candidate.filter(|id| YOUTUBE_VIDEO_ID.is_match(id))
}
