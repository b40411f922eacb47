use url::Url;

use crate::error::{EngineError, Result};
use crate::timeline::Clip;

/// Builds shareable links into the source video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    base: Url,
    video_id: String,
}

impl LinkBuilder {
    /// Creates a builder for `https://<host>/...` links.
    pub fn new(host: &str, video_id: &str) -> Result<Self> {
        let base = Url::parse(&format!("https://{host}/")).map_err(|source| {
            EngineError::InvalidLinkHost {
                host: host.to_owned(),
                source,
            }
        })?;
        if base.host_str().is_none() || base.path() != "/" {
            return Err(EngineError::InvalidConfig {
                reason: format!("link host must be a bare host name: {host:?}"),
            });
        }
        Ok(Self {
            base,
            video_id: video_id.to_owned(),
        })
    }

    /// Timestamped watch link that opens the video at `start_seconds`.
    ///
    /// Only the whole start second is encoded; the link has no end bound.
    ///
    /// # Example
    /// ```
    /// use engine::link::LinkBuilder;
    ///
    /// let links = LinkBuilder::new("www.youtube.com", "BYizgB2FcAQ").expect("valid host");
    /// assert_eq!(
    ///     links.watch(10.7),
    ///     "https://www.youtube.com/watch?v=BYizgB2FcAQ&t=10s"
    /// );
    /// ```
    pub fn watch(&self, start_seconds: f64) -> String {
        let mut url = self.base.clone();
        url.set_path("watch");
        url.query_pairs_mut()
            .append_pair("v", &self.video_id)
            .append_pair("t", &format!("{}s", whole_seconds_floor(start_seconds)));
        url.into()
    }

    /// Embed link bounded to the clip range.
    ///
    /// The start is floored and the end rounded up so the whole clip plays.
    pub fn embed(&self, clip: &Clip) -> String {
        let mut url = self.base.clone();
        url.set_path(&format!("embed/{}", self.video_id));
        url.query_pairs_mut()
            .append_pair("start", &whole_seconds_floor(clip.start_time()).to_string())
            .append_pair("end", &whole_seconds_ceil(clip.end_time()).to_string());
        url.into()
    }
}

fn whole_seconds_floor(seconds: f64) -> u64 {
    if seconds.is_finite() {
        seconds.max(0.0).floor() as u64
    } else {
        0
    }
}

fn whole_seconds_ceil(seconds: f64) -> u64 {
    if seconds.is_finite() {
        seconds.max(0.0).ceil() as u64
    } else {
        0
    }
}
