//! Release domain types
//!
//! A release is the published output of the remote build workflow. It
//! appears asynchronously after the workflow has been dispatched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published release with its downloadable assets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A single downloadable file attached to a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    pub browser_download_url: String,
}

impl Release {
    /// Download URL of the first asset, if any asset has been uploaded yet
    pub fn first_asset_url(&self) -> Option<&str> {
        self.assets
            .first()
            .map(|asset| asset.browser_download_url.as_str())
    }

    /// A release is ready once it is published and carries at least one asset
    pub fn is_ready(&self) -> bool {
        !self.draft && !self.assets.is_empty()
    }

    /// Human-readable label: the release name, or the tag when unnamed
    pub fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.tag_name,
        }
    }
}

/// Picks the newest non-draft release by creation time
///
/// List order returned by the remote host is not relied upon. When two
/// releases share the same `created_at`, the one listed first wins.
pub fn latest_release(releases: &[Release]) -> Option<&Release> {
    releases
        .iter()
        .filter(|release| !release.draft)
        .fold(None, |best: Option<&Release>, candidate| match best {
            Some(current) if current.created_at >= candidate.created_at => Some(current),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn release(id: u64, minute: u32, assets: usize) -> Release {
        Release {
            id,
            tag_name: format!("v{}", id),
            name: None,
            draft: false,
            prerelease: false,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
            published_at: None,
            assets: (0..assets)
                .map(|i| ReleaseAsset {
                    id: id * 100 + i as u64,
                    name: format!("app-{}.apk", i),
                    size: 1024,
                    browser_download_url: format!("https://example/{}/app-{}.apk", id, i),
                })
                .collect(),
        }
    }

    #[test]
    fn test_latest_release_ignores_list_order() {
        let releases = vec![release(1, 5, 1), release(2, 30, 1), release(3, 10, 1)];
        assert_eq!(latest_release(&releases).map(|r| r.id), Some(2));
    }

    #[test]
    fn test_latest_release_tie_prefers_first_listed() {
        let releases = vec![release(7, 15, 1), release(8, 15, 1)];
        assert_eq!(latest_release(&releases).map(|r| r.id), Some(7));
    }

    #[test]
    fn test_latest_release_skips_drafts() {
        let mut newest = release(2, 50, 1);
        newest.draft = true;
        let releases = vec![release(1, 5, 1), newest];
        assert_eq!(latest_release(&releases).map(|r| r.id), Some(1));
    }

    #[test]
    fn test_latest_release_empty() {
        assert!(latest_release(&[]).is_none());
    }

    #[test]
    fn test_first_asset_url_and_readiness() {
        let with_assets = release(1, 0, 2);
        assert_eq!(
            with_assets.first_asset_url(),
            Some("https://example/1/app-0.apk")
        );
        assert!(with_assets.is_ready());

        let without_assets = release(2, 0, 0);
        assert_eq!(without_assets.first_asset_url(), None);
        assert!(!without_assets.is_ready());
    }

    #[test]
    fn test_label_falls_back_to_tag() {
        let mut r = release(4, 0, 0);
        assert_eq!(r.label(), "v4");
        r.name = Some("Android build".to_string());
        assert_eq!(r.label(), "Android build");
    }

    #[test]
    fn test_deserialize_release_listing() {
        let json = r#"[{
            "id": 1,
            "tag_name": "build-1",
            "name": "Build 1",
            "draft": false,
            "prerelease": false,
            "created_at": "2024-05-01T12:00:00Z",
            "published_at": "2024-05-01T12:01:00Z",
            "html_url": "https://github.com/o/r/releases/tag/build-1",
            "assets": [{
                "id": 10,
                "name": "app-release.apk",
                "size": 4096,
                "content_type": "application/vnd.android.package-archive",
                "browser_download_url": "https://github.com/o/r/releases/download/build-1/app-release.apk"
            }]
        }]"#;

        let releases: Vec<Release> = serde_json::from_str(json).unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(
            releases[0].first_asset_url(),
            Some("https://github.com/o/r/releases/download/build-1/app-release.apk")
        );
    }
}
