//! Keyword filter over asset metadata

use dam_client::Asset;

/// Assets whose name, title, description or keywords contain `keyword`,
/// ignoring case. A blank keyword matches everything. Input order is kept.
pub fn filter_assets<'a>(assets: &'a [Asset], keyword: &str) -> Vec<&'a Asset> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return assets.iter().collect();
    }
    assets.iter().filter(|a| matches(a, &needle)).collect()
}

fn matches(asset: &Asset, needle: &str) -> bool {
    let fields = [
        asset.name.as_deref(),
        asset.title.as_deref(),
        asset.description.as_deref(),
    ];
    fields
        .into_iter()
        .flatten()
        .chain(asset.keywords().iter().map(String::as_str))
        .any(|text| text.to_lowercase().contains(needle))
}
