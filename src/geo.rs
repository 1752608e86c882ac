//! Country name to ISO 3166-1 alpha-3 code resolution.
//!
//! The choropleth needs ISO3 codes, but the sales data only has free-text country names. The
//! aggregation pipeline asks a `CountryResolver` for each name and treats a miss as a normal
//! outcome, so any lookup strategy can be plugged in.

use isocountry::CountryCode;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// A three-letter ISO 3166-1 alpha-3 country code, e.g. `GBR`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Iso3(String);

impl Iso3 {
    /// Creates a code from three ASCII letters. Returns `None` for anything else.
    pub fn new(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(Self(code.to_ascii_uppercase()))
        } else {
            None
        }
    }
}

impl AsRef<str> for Iso3 {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Iso3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Iso3 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// Resolves a free-text country name to its ISO3 code.
pub trait CountryResolver {
    /// Returns `None` when the name cannot be resolved.
    fn resolve(&self, name: &str) -> Option<Iso3>;
}

impl<F> CountryResolver for F
where
    F: Fn(&str) -> Option<Iso3>,
{
    fn resolve(&self, name: &str) -> Option<Iso3> {
        self(name)
    }
}

/// Informal names that do not appear in the ISO 3166 registry, keyed by ISO3 code.
const ALIASES: &[(&str, &[&str])] = &[
    ("ARE", &["UAE", "Emirates"]),
    ("BOL", &["Bolivia"]),
    ("CHN", &["People's Republic of China", "PRC"]),
    ("CZE", &["Czech Republic"]),
    (
        "GBR",
        &["UK", "United Kingdom", "Great Britain", "Britain", "England", "Scotland", "Wales"],
    ),
    ("IRN", &["Iran"]),
    ("KOR", &["South Korea", "Korea"]),
    ("LAO", &["Laos"]),
    ("MDA", &["Moldova"]),
    ("NLD", &["Holland", "The Netherlands"]),
    ("PRK", &["North Korea"]),
    ("RUS", &["Russia"]),
    ("SYR", &["Syria"]),
    ("TUR", &["Turkey", "Türkiye"]),
    ("TWN", &["Taiwan"]),
    ("TZA", &["Tanzania"]),
    ("USA", &["United States", "America", "U.S.A.", "U.S."]),
    ("VEN", &["Venezuela"]),
    ("VNM", &["Vietnam"]),
];

/// A built-in resolver backed by the ISO 3166-1 registry from `isocountry`, plus a table of
/// informal names.
///
/// Lookup tries, in order: an exact name or alias, an ISO2 or ISO3 code, then a fuzzy match where
/// the query is a whole-word prefix of exactly one known name, or one known name is contained in
/// the query. All comparisons ignore case and punctuation.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    names: HashMap<String, &'static str>,
    codes: HashMap<String, &'static str>,
}

impl Default for StaticResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticResolver {
    pub fn new() -> Self {
        let mut names = HashMap::new();
        let mut codes = HashMap::new();
        for country in CountryCode::iter() {
            let iso3 = country.alpha3();
            names.insert(normalize(country.name()), iso3);
            codes.insert(iso3.to_ascii_lowercase(), iso3);
            codes.insert(country.alpha2().to_ascii_lowercase(), iso3);
        }
        for (iso3, aliases) in ALIASES {
            for alias in aliases.iter() {
                names.insert(normalize(alias), *iso3);
            }
        }
        Self { names, codes }
    }

    fn fuzzy(&self, query: &str) -> Option<&'static str> {
        // A known name starting with the query, e.g. "new zeal" -> "new zealand".
        let mut prefixed = self
            .names
            .iter()
            .filter(|(name, _)| name.starts_with(query))
            .map(|(_, code)| *code);
        if let Some(code) = prefixed.next() {
            if prefixed.all(|other| other == code) {
                return Some(code);
            }
            return None;
        }

        // The query contains a known name, e.g. "republic of india" -> "india". The longest
        // contained name wins so that "south korea" does not become "korea" by accident.
        let padded = format!(" {query} ");
        self.names
            .iter()
            .filter(|(name, _)| name.len() > 3 && padded.contains(&format!(" {name} ")))
            .max_by(|a, b| a.0.len().cmp(&b.0.len()).then_with(|| b.1.cmp(a.1)))
            .map(|(_, code)| *code)
    }
}

impl CountryResolver for StaticResolver {
    fn resolve(&self, name: &str) -> Option<Iso3> {
        let query = normalize(name);
        if query.is_empty() {
            return None;
        }
        let code = self
            .names
            .get(&query)
            .or_else(|| self.codes.get(&query))
            .copied()
            .or_else(|| self.fuzzy(&query))?;
        Iso3::new(code)
    }
}

/// Lowercases and replaces punctuation with spaces, collapsing runs of whitespace.
fn normalize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(name: &str) -> Option<String> {
        StaticResolver::new()
            .resolve(name)
            .map(|c| c.as_ref().to_string())
    }

    #[test]
    fn test_dataset_countries() {
        assert_eq!(code("Australia").as_deref(), Some("AUS"));
        assert_eq!(code("Canada").as_deref(), Some("CAN"));
        assert_eq!(code("India").as_deref(), Some("IND"));
        assert_eq!(code("New Zealand").as_deref(), Some("NZL"));
        assert_eq!(code("UK").as_deref(), Some("GBR"));
        assert_eq!(code("USA").as_deref(), Some("USA"));
    }

    #[test]
    fn test_case_and_punctuation() {
        assert_eq!(code("  united   KINGDOM ").as_deref(), Some("GBR"));
        assert_eq!(code("U.S.A.").as_deref(), Some("USA"));
        assert_eq!(code("nz").as_deref(), Some("NZL"));
    }

    #[test]
    fn test_fuzzy() {
        assert_eq!(code("New Zeal").as_deref(), Some("NZL"));
        assert_eq!(code("Republic of India").as_deref(), Some("IND"));
        assert_eq!(code("Kingdom of Spain").as_deref(), Some("ESP"));
    }

    #[test]
    fn test_registry_coverage() {
        assert_eq!(code("Ghana").as_deref(), Some("GHA"));
        assert_eq!(code("Burkina Faso").as_deref(), Some("BFA"));
        assert_eq!(code("Mongolia").as_deref(), Some("MNG"));
        assert_eq!(code("ISL").as_deref(), Some("ISL"));
        assert_eq!(code("Vietnam").as_deref(), Some("VNM"));
        let resolver = StaticResolver::new();
        assert!(CountryCode::iter().all(|c| {
            resolver.resolve(c.name()).map(|iso3| iso3.to_string()).as_deref() == Some(c.alpha3())
        }));
    }

    #[test]
    fn test_ambiguous_prefix_is_unresolved() {
        // "united" starts "united kingdom", "united states" and "united arab emirates".
        assert_eq!(code("United"), None);
    }

    #[test]
    fn test_unresolved() {
        assert_eq!(code("Narnia"), None);
        assert_eq!(code(""), None);
        assert_eq!(code("???"), None);
    }

    #[test]
    fn test_closure_resolver() {
        let only_peru = |name: &str| (name == "Peru").then(|| Iso3::new("per")).flatten();
        assert_eq!(only_peru.resolve("Peru").unwrap().as_ref(), "PER");
        assert!(only_peru.resolve("Chile").is_none());
    }

    #[test]
    fn test_iso3_new() {
        assert!(Iso3::new("GB").is_none());
        assert!(Iso3::new("G1R").is_none());
        assert_eq!(Iso3::new("gbr").unwrap().to_string(), "GBR");
    }
}
