use regex::Regex;
use std::sync::LazyLock;

struct DistrictRule {
    prefecture: &'static str,
    city: Regex,
    district: &'static str,
}

fn rule(prefecture: &'static str, city: &str, district: &'static str) -> DistrictRule {
    DistrictRule {
        prefecture,
        city: Regex::new(city).expect("district pattern is valid"),
        district,
    }
}

// First matching rule per prefecture wins.
static RULES: LazyLock<Vec<DistrictRule>> = LazyLock::new(|| {
    vec![
        rule("東京都", "千代田区", "東京1区"),
        rule("東京都", "中央区", "東京1区"),
        rule("東京都", "港区", "東京1区"),
        rule("東京都", "新宿区", "東京10区"),
        rule("東京都", "渋谷区", "東京7区"),
        rule("大阪府", "大阪市北区|大阪市福島区|大阪市此花区", "大阪1区"),
        rule("千葉県", "柏市", "千葉8区"),
    ]
});

/// Estimates the lower-house single-seat district for an address.
/// Returns `None` for prefectures without rules or cities no rule covers.
pub fn resolve_district(prefecture: &str, city: &str) -> Option<&'static str> {
    let prefecture = prefecture.trim();
    RULES
        .iter()
        .filter(|r| r.prefecture == prefecture)
        .find(|r| r.city.is_match(city))
        .map(|r| r.district)
}
