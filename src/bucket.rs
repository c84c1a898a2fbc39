//! Groups releases of a target month by product.
use std::collections::BTreeMap;

use crate::{
    forge::types::{Release, RepoSlug},
    month::TargetMonth,
};

/// Default label for repositories missing from the product table.
pub const DEFAULT_PRODUCT: &str = "General";

/// Static repository to product-name table.
///
/// Keys may be either `owner/repo` or a bare `repo`; the full form wins when
/// both are present.
#[derive(Debug, Clone)]
pub struct ProductMap {
    products: BTreeMap<String, String>,
    default_product: String,
}

impl Default for ProductMap {
    fn default() -> Self {
        Self::new(BTreeMap::new(), DEFAULT_PRODUCT)
    }
}

impl ProductMap {
    pub fn new(
        products: BTreeMap<String, String>,
        default_product: impl Into<String>,
    ) -> Self {
        Self {
            products,
            default_product: default_product.into(),
        }
    }

    pub fn default_product(&self) -> &str {
        &self.default_product
    }

    pub fn label_for(&self, repo: &RepoSlug) -> &str {
        self.products
            .get(&repo.full_name())
            .or_else(|| self.products.get(&repo.name))
            .map(String::as_str)
            .unwrap_or(&self.default_product)
    }
}

/// Releases that share a product label.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductGroup {
    pub product: String,
    pub releases: Vec<Release>,
}

/// Releases of one month grouped by product.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    pub month: TargetMonth,
    /// Sorted by product label with the default product last.
    pub groups: Vec<ProductGroup>,
}

impl MonthBucket {
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.releases.is_empty())
    }

    pub fn release_count(&self) -> usize {
        self.groups.iter().map(|g| g.releases.len()).sum()
    }

    /// All releases across groups ordered by publish time.
    pub fn releases_by_date(&self) -> Vec<&Release> {
        let mut releases = self
            .groups
            .iter()
            .flat_map(|g| g.releases.iter())
            .collect::<Vec<&Release>>();
        releases.sort_by(|a, b| release_order(a, b));
        releases
    }
}

fn release_order(a: &Release, b: &Release) -> std::cmp::Ordering {
    a.published_at
        .cmp(&b.published_at)
        .then_with(|| a.repo.cmp(&b.repo))
        .then_with(|| a.tag.cmp(&b.tag))
}

/// Keeps the releases published within `month` and groups them by product.
pub fn bucket_releases(
    month: TargetMonth,
    releases: Vec<Release>,
    products: &ProductMap,
) -> MonthBucket {
    let mut by_product: BTreeMap<String, Vec<Release>> = BTreeMap::new();
    let mut unmapped = vec![];

    for release in releases
        .into_iter()
        .filter(|r| month.contains(&r.published_at))
    {
        let label = products.label_for(&release.repo);

        if label == products.default_product() {
            unmapped.push(release);
        } else {
            by_product.entry(label.to_string()).or_default().push(release);
        }
    }

    let mut groups = by_product
        .into_iter()
        .map(|(product, releases)| ProductGroup { product, releases })
        .collect::<Vec<ProductGroup>>();

    if !unmapped.is_empty() {
        groups.push(ProductGroup {
            product: products.default_product().to_string(),
            releases: unmapped,
        });
    }

    for group in groups.iter_mut() {
        group.releases.sort_by(release_order);
    }

    MonthBucket { month, groups }
}
