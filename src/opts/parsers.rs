use std::str::FromStr;

use reqwest::Url;

use crate::prelude::*;

/// Parses the upstream base URL and trims the trailing slashes,
/// so that `/predict` may be appended as is.
pub fn base_url(value: &str) -> Result<String> {
    let url = Url::parse(value).with_context(|| format!("`{}` is not a valid URL", value))?;
    match url.scheme() {
        "http" | "https" => Ok(value.trim_end_matches('/').to_string()),
        scheme => Err(anyhow!("unsupported URL scheme `{}`", scheme)),
    }
}

pub fn non_zero_duration(value: &str) -> Result<StdDuration> {
    match humantime::parse_duration(value)? {
        duration if !duration.is_zero() => Ok(duration),
        _ => Err(anyhow!("expected a non-zero duration")),
    }
}

pub fn sample_rate(value: &str) -> Result<f32> {
    match f32::from_str(value)? {
        rate if (0.0..=1.0).contains(&rate) => Ok(rate),
        rate => Err(anyhow!("{} is not within [0, 1]", rate)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trims_trailing_slash_ok() -> Result {
        assert_eq!(base_url("http://70.34.200.208:5000/")?, "http://70.34.200.208:5000");
        assert_eq!(base_url("https://example.com/api//")?, "https://example.com/api");
        Ok(())
    }

    #[test]
    fn base_url_rejects_other_schemes() {
        assert!(base_url("ftp://example.com").is_err());
        assert!(base_url("70.34.200.208:5000").is_err());
    }

    #[test]
    fn non_zero_duration_ok() -> Result {
        assert_eq!(non_zero_duration("30s")?, StdDuration::from_secs(30));
        assert_eq!(non_zero_duration("1m 500ms")?, StdDuration::from_millis(60_500));
        assert!(non_zero_duration("0s").is_err());
        Ok(())
    }

    #[test]
    fn sample_rate_ok() -> Result {
        assert_eq!(sample_rate("0.25")?, 0.25);
        assert!(sample_rate("1.5").is_err());
        assert!(sample_rate("-0.1").is_err());
        Ok(())
    }
}
