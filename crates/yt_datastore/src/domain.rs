use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::{duration::IsoDuration, error::RecordError};

/// A video entry as found in the daily metadata dump. Every key is optional
/// at this stage; [`VideoRow::try_from`] decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawVideoRecord {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, rename = "viewCount", deserialize_with = "deserialize_count")]
    pub view_count: Option<i64>,
    #[serde(default, rename = "likeCount", deserialize_with = "deserialize_count")]
    pub like_count: Option<i64>,
    #[serde(default, rename = "commentCount", deserialize_with = "deserialize_count")]
    pub comment_count: Option<i64>,
}

/// One row of `youtube.raw_youtube_data`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRow {
    pub video_id: String,
    pub title: String,
    pub upload_date: Option<NaiveDateTime>,
    pub duration: Option<IsoDuration>,
    pub video_views: Option<i64>,
    pub likes_count: Option<i64>,
    pub comments_count: Option<i64>,
}

impl TryFrom<RawVideoRecord> for VideoRow {
    type Error = RecordError;

    fn try_from(
        RawVideoRecord {
            video_id,
            title,
            published_at,
            duration,
            view_count,
            like_count,
            comment_count,
        }: RawVideoRecord,
    ) -> Result<Self, Self::Error> {
        let video_id = video_id.ok_or(RecordError::MissingField("video_id"))?;
        let title = title.ok_or(RecordError::MissingField("title"))?;

        // an empty duration string counts as absent
        let duration = duration
            .filter(|d| !d.trim().is_empty())
            .map(|d| d.parse::<IsoDuration>())
            .transpose()
            .map_err(|source| RecordError::InvalidDuration {
                video_id: video_id.clone(),
                source,
            })?;

        let upload_date = published_at
            .map(|value| {
                parse_published_at(&value).ok_or_else(|| RecordError::InvalidTimestamp {
                    video_id: video_id.clone(),
                    value,
                })
            })
            .transpose()?;

        Ok(VideoRow {
            video_id,
            title,
            upload_date,
            duration,
            video_views: view_count,
            likes_count: like_count,
            comments_count: comment_count,
        })
    }
}

/// `publishedAt` is RFC 3339 from the YouTube API. Offsets are normalised to
/// UTC since the column is a plain `TIMESTAMP`. A bare date is midnight.
fn parse_published_at(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Counts arrive either as JSON numbers or, straight from the API, as strings.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(i64),
        Text(String),
    }

    match Option::<Count>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Count::Number(n)) => Ok(Some(n)),
        Some(Count::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Count::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid count '{s}'"))),
    }
}
