//! Farcaster hub social source with optional OpenRank percentile

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::http::ProviderHttpClient;
use super::{SocialSource, SourceError};
use crate::collector::SocialData;
use crate::registry::normalize_address;

/// Casts counted from a single page of the hub listing
const CAST_PAGE_SIZE: &str = "1000";

#[derive(Debug, Default, Deserialize)]
struct UserResponse {
    #[serde(default)]
    result: Option<UserResult>,
}

#[derive(Debug, Default, Deserialize)]
struct UserResult {
    #[serde(default)]
    user: Option<HubUser>,
}

#[derive(Debug, Deserialize)]
struct HubUser {
    fid: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LinksResponse {
    #[serde(default)]
    result: LinksResult,
}

#[derive(Debug, Default, Deserialize)]
struct LinksResult {
    #[serde(default)]
    links: Vec<HubLink>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HubLink {
    fid: u64,
    target_fid: u64,
}

#[derive(Debug, Default, Deserialize)]
struct CastsResponse {
    #[serde(default)]
    result: CastsResult,
}

#[derive(Debug, Default, Deserialize)]
struct CastsResult {
    #[serde(default)]
    casts: Vec<serde_json::Value>,
}

/// Hub link listings only cover one direction each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkDirection {
    /// `linksByFid`: links the account created
    Following,
    /// `linksByTargetFid`: links pointing at the account
    Followers,
}

impl LinkDirection {
    fn endpoint(self) -> (&'static str, &'static str) {
        match self {
            LinkDirection::Following => ("v1/linksByFid", "fid"),
            LinkDirection::Followers => ("v1/linksByTargetFid", "targetFid"),
        }
    }

    fn count(self, links: &[HubLink], fid: u64) -> u32 {
        let matching = links
            .iter()
            .filter(|link| match self {
                LinkDirection::Following => link.fid == fid,
                LinkDirection::Followers => link.target_fid == fid,
            })
            .count();
        u32::try_from(matching).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Deserialize)]
struct RankResponse {
    rank: Option<u64>,
}

/// Ranking lookup turning an OpenRank position into a percentile
pub struct OpenRankClient {
    base_url: String,
    population: u64,
    timeout: Duration,
    http: ProviderHttpClient,
}

impl OpenRankClient {
    pub fn new(
        base_url: impl Into<String>,
        population: u64,
        timeout: Duration,
        http: ProviderHttpClient,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            population,
            timeout,
            http,
        }
    }

    /// Rank and percentile for `fid`; `None` when unranked
    pub async fn rank(&self, fid: u64) -> Result<Option<(u64, f64)>, SourceError> {
        let url = self
            .http
            .endpoint(&self.base_url, &format!("rankings/fid/{}", fid), &[])?;

        let response: Option<RankResponse> =
            tokio::time::timeout(self.timeout, self.http.get_json_optional(url, &[]))
                .await
                .map_err(|_| SourceError::Timeout(self.timeout))??;

        Ok(response
            .and_then(|r| r.rank)
            .filter(|rank| *rank > 0)
            .map(|rank| (rank, rank_percentile(rank, self.population))))
    }
}

/// `(population - rank) / population * 100`, clamped to 0-100
pub fn rank_percentile(rank: u64, population: u64) -> f64 {
    if population == 0 {
        return 0.0;
    }
    let population = population as f64;
    ((population - rank as f64) / population * 100.0).clamp(0.0, 100.0)
}

pub struct FarcasterHubSource {
    name: String,
    hub_url: String,
    http: ProviderHttpClient,
    ranking: Option<OpenRankClient>,
}

impl FarcasterHubSource {
    pub fn new(
        name: impl Into<String>,
        hub_url: impl Into<String>,
        http: ProviderHttpClient,
        ranking: Option<OpenRankClient>,
    ) -> Self {
        Self {
            name: name.into(),
            hub_url: hub_url.into(),
            http,
            ranking,
        }
    }

    /// Link count in one direction; 0 when the listing fails
    async fn link_count(&self, fid: u64, direction: LinkDirection) -> u32 {
        let (path, param) = direction.endpoint();
        let fid_param = fid.to_string();
        let url = self
            .http
            .endpoint(&self.hub_url, path, &[(param, fid_param.as_str())]);
        let links = match url {
            Ok(url) => self.http.get_json::<LinksResponse>(url, &[]).await,
            Err(e) => Err(e),
        };

        match links {
            Ok(links) => direction.count(&links.result.links, fid),
            Err(e) => {
                debug!("{} {:?} lookup failed for fid {}: {}", self.name, direction, fid, e);
                0
            }
        }
    }

    async fn casts(&self, fid: u64) -> Result<CastsResponse, SourceError> {
        let fid = fid.to_string();
        let url = self.http.endpoint(
            &self.hub_url,
            "v1/castsByFid",
            &[("fid", fid.as_str()), ("pageSize", CAST_PAGE_SIZE)],
        )?;
        self.http.get_json(url, &[]).await
    }
}

#[async_trait]
impl SocialSource for FarcasterHubSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_social(&self, address: &str) -> Result<SocialData, SourceError> {
        let address = normalize_address(address);
        let url = self.http.endpoint(
            &self.hub_url,
            "v1/userByVerification",
            &[("address", address.as_str())],
        )?;

        // No verified account: nothing to score
        let Some(user) = self.http.get_json_optional::<UserResponse>(url, &[]).await? else {
            return Ok(SocialData::default());
        };
        let Some(fid) = user.result.and_then(|r| r.user).and_then(|u| u.fid) else {
            return Ok(SocialData::default());
        };

        let (followers, following, casts) = tokio::join!(
            self.link_count(fid, LinkDirection::Followers),
            self.link_count(fid, LinkDirection::Following),
            self.casts(fid),
        );

        let casts = match casts {
            Ok(casts) => u32::try_from(casts.result.casts.len()).unwrap_or(u32::MAX),
            Err(e) => {
                debug!("{} casts lookup failed for fid {}: {}", self.name, fid, e);
                0
            }
        };

        let (rank, percentile) = match &self.ranking {
            Some(ranking) => match ranking.rank(fid).await {
                Ok(Some((rank, percentile))) => (Some(rank), Some(percentile)),
                Ok(None) => (None, None),
                Err(e) => {
                    warn!("OpenRank lookup failed for fid {} (optional): {}", fid, e);
                    (None, None)
                }
            },
            None => (None, None),
        };

        Ok(SocialData {
            percentile,
            rank,
            social_id: Some(fid),
            followers,
            following,
            casts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_percentile() {
        assert!((rank_percentile(1, 1_000_000) - 99.9999).abs() < 1e-9);
        assert!((rank_percentile(50_000, 1_000_000) - 95.0).abs() < 1e-9);
        assert_eq!(rank_percentile(2_000_000, 1_000_000), 0.0);
        assert_eq!(rank_percentile(5, 0), 0.0);
    }

    #[test]
    fn test_parse_user_fid() {
        let user: UserResponse =
            serde_json::from_str(r#"{"result":{"user":{"fid":3,"username":"dwr"}}}"#).unwrap();
        assert_eq!(user.result.and_then(|r| r.user).and_then(|u| u.fid), Some(3));

        let missing: UserResponse = serde_json::from_str(r#"{"result":{}}"#).unwrap();
        assert!(missing.result.and_then(|r| r.user).is_none());
    }

    #[test]
    fn test_count_links() {
        let links: LinksResponse = serde_json::from_str(
            r#"{"result":{"links":[
                {"fid":3,"targetFid":10},
                {"fid":3,"targetFid":11},
                {"fid":12,"targetFid":3}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(LinkDirection::Following.count(&links.result.links, 3), 2);
        assert_eq!(LinkDirection::Followers.count(&links.result.links, 3), 1);
    }

    #[test]
    fn test_followers_come_from_target_listing() {
        assert_eq!(LinkDirection::Following.endpoint(), ("v1/linksByFid", "fid"));
        assert_eq!(
            LinkDirection::Followers.endpoint(),
            ("v1/linksByTargetFid", "targetFid")
        );

        // Incoming listing: every link targets the account
        let incoming: LinksResponse = serde_json::from_str(
            r#"{"result":{"links":[
                {"fid":20,"targetFid":3},
                {"fid":21,"targetFid":3},
                {"fid":22,"targetFid":3}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(LinkDirection::Followers.count(&incoming.result.links, 3), 3);
        assert_eq!(LinkDirection::Following.count(&incoming.result.links, 3), 0);
    }

    #[test]
    fn test_parse_casts() {
        let casts: CastsResponse =
            serde_json::from_str(r#"{"result":{"casts":[{"hash":"0x1"},{"hash":"0x2"}]}}"#)
                .unwrap();
        assert_eq!(casts.result.casts.len(), 2);

        let empty: CastsResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.result.casts.is_empty());
    }
}
