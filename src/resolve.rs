use crate::error::InstallError;
use crate::types::GitHubAsset;
use crate::version::NormalizedVersion;
use regex::Regex;

/// One way of picking an asset out of a release.
enum AssetMatcher {
    /// `<product>-<version>-<channel>.zip`, nothing else.
    Exact(String),
    /// `^<product>-.*-<channel>\.zip$` for names with extra build metadata.
    Pattern(Regex),
}

impl AssetMatcher {
    fn find<'a>(&self, assets: &'a [GitHubAsset]) -> Option<&'a GitHubAsset> {
        match self {
            AssetMatcher::Exact(name) => assets.iter().find(|a| &a.name == name),
            AssetMatcher::Pattern(re) => assets.iter().find(|a| re.is_match(&a.name)),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            AssetMatcher::Exact(_) => "exact name",
            AssetMatcher::Pattern(_) => "name pattern",
        }
    }
}

pub fn canonical_asset_name(product: &str, version: &NormalizedVersion, channel: &str) -> String {
    format!("{}-{}-{}.zip", product, version, channel)
}

/// The product segment is deliberately left unescaped.
pub fn asset_name_pattern(product: &str, channel: &str) -> String {
    format!(r"^{}-.*-{}\.zip$", product, regex::escape(channel))
}

/// Select the release asset for `product` at `version` on `channel`.
///
/// The canonical file name is tried first; if no asset carries it, the first
/// asset (in release order) matching the looser name pattern is used.
pub fn resolve_asset<'a>(
    assets: &'a [GitHubAsset],
    product: &str,
    version: &NormalizedVersion,
    channel: &str,
) -> Result<&'a GitHubAsset, InstallError> {
    let expected = canonical_asset_name(product, version, channel);
    let pattern = asset_name_pattern(product, channel);

    let mut matchers = vec![AssetMatcher::Exact(expected.clone())];
    match Regex::new(&pattern) {
        Ok(re) => matchers.push(AssetMatcher::Pattern(re)),
        Err(e) => tracing::warn!("Skipping asset name pattern '{}': {}", pattern, e),
    }

    tracing::trace!(
        "Resolving asset among {} candidates: {:?}",
        assets.len(),
        assets.iter().map(|a| a.name.as_str()).collect::<Vec<_>>()
    );

    for matcher in &matchers {
        if let Some(asset) = matcher.find(assets) {
            tracing::info!("Found asset '{}' by {}", asset.name, matcher.describe());
            return Ok(asset);
        }
        tracing::debug!("No asset matched by {}", matcher.describe());
    }

    Err(InstallError::AssetNotFound {
        expected,
        pattern,
        channel: channel.to_string(),
    })
}
