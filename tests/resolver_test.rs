//! Coverage resolver integration tests
//!
//! Runs the same scenarios against the in-memory catalog and against an
//! in-memory SQLite catalog loaded from the sample fixture.

use std::path::PathBuf;
use std::sync::Arc;

use coverage_node::db::CatalogFixture;
use coverage_node::{
    CatalogDb, CoverageResolver, CoverageRow, InMemoryCatalog, Provider, ResolveError, ValidationError,
};

fn provider(id: i64, name: &str, slug: &str, techs: &[&str]) -> Provider {
    Provider {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
        category: "Internet".to_string(),
        technologies: techs.iter().map(|t| t.to_string()).collect(),
    }
}

fn coverage(provider_id: i64, zip: &str, active: bool, tech: Option<&str>) -> CoverageRow {
    CoverageRow {
        provider_id,
        zip_code: zip.to_string(),
        has_service: active,
        technology: tech.map(String::from),
        availability_percent: None,
        max_speed: None,
    }
}

/// 78701: att-internet (Fiber), spectrum (Cable), inactive defunct-co
fn austin_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_provider(provider(1, "AT&T Internet", "att-internet", &["Fiber", "DSL"]))
        .with_provider(provider(2, "Spectrum", "spectrum", &["Cable"]))
        .with_provider(provider(3, "Defunct Co", "defunct-co", &["DSL"]))
        .with_coverage(coverage(1, "78701", true, Some("Fiber")))
        .with_coverage(coverage(2, "78701", true, Some("Cable")))
        .with_coverage(coverage(3, "78701", false, Some("DSL")))
        .with_coverage(coverage(3, "73301", true, Some("DSL")))
}

fn slugs(providers: &[Provider]) -> Vec<&str> {
    providers.iter().map(|p| p.slug.as_str()).collect()
}

fn sample_db() -> Arc<CatalogDb> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample-catalog.json");
    let fixture = CatalogFixture::from_file(&path).expect("sample fixture");
    let db = CatalogDb::open_in_memory().unwrap();
    db.import(&fixture).unwrap();
    Arc::new(db)
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_zip_returns_active_providers_only() {
    let resolver = CoverageResolver::from_catalog(Arc::new(austin_catalog()));

    let providers = resolver.resolve("78701", None).await.unwrap();
    assert_eq!(slugs(&providers), vec!["att-internet", "spectrum"]);
}

#[tokio::test]
async fn test_technology_filter_applies_to_coverage_rows() {
    let resolver = CoverageResolver::from_catalog(Arc::new(austin_catalog()));

    let fiber = resolver.resolve("78701", Some("Fiber")).await.unwrap();
    assert_eq!(slugs(&fiber), vec!["att-internet"]);

    // AT&T lists DSL on its provider record but has no DSL coverage row here
    let dsl = resolver.resolve("78701", Some("DSL")).await.unwrap();
    assert!(dsl.is_empty());
}

#[tokio::test]
async fn test_malformed_zip_makes_no_calls() {
    let catalog = Arc::new(austin_catalog());
    let resolver = CoverageResolver::from_catalog(catalog.clone());

    for zip in ["ABCDE", "", "1234", "123456", "7870a"] {
        let err = resolver.resolve(zip, None).await.unwrap_err();
        assert!(
            matches!(err, ResolveError::Validation(ValidationError::InvalidZip)),
            "{:?} gave {:?}",
            zip,
            err
        );
    }
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn test_unknown_technology_makes_no_calls() {
    let catalog = Arc::new(austin_catalog());
    let resolver = CoverageResolver::from_catalog(catalog.clone());

    let err = resolver.resolve("78701", Some("LTE")).await.unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Validation(ValidationError::UnsupportedTechnology(ref t)) if t == "LTE"
    ));
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn test_technology_must_match_canonical_spelling() {
    let catalog = Arc::new(austin_catalog());
    let resolver = CoverageResolver::from_catalog(catalog.clone());

    for raw in ["fiber", "FIBER", " Fiber "] {
        let err = resolver.resolve("78701", Some(raw)).await.unwrap_err();
        assert!(
            matches!(
                err,
                ResolveError::Validation(ValidationError::UnsupportedTechnology(ref t)) if t == raw
            ),
            "{:?} gave {:?}",
            raw,
            err
        );
    }
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn test_unknown_zip_is_empty_success() {
    let catalog = Arc::new(austin_catalog());
    let resolver = CoverageResolver::from_catalog(catalog.clone());

    let providers = resolver.resolve("99999", None).await.unwrap();
    assert!(providers.is_empty());
    // no provider lookup for an empty id set
    assert_eq!(catalog.coverage_calls(), 1);
    assert_eq!(catalog.provider_calls(), 0);
}

#[tokio::test]
async fn test_duplicate_rows_collapse_to_one_provider() {
    let catalog = InMemoryCatalog::new()
        .with_provider(provider(1, "Xfinity", "xfinity", &["Cable", "Fiber"]))
        .with_provider(provider(2, "T-Mobile", "t-mobile", &["5G"]))
        .with_coverage(coverage(1, "10001", true, Some("Cable")))
        .with_coverage(coverage(1, "10001", true, Some("Fiber")))
        .with_coverage(coverage(1, "10001", true, Some("Cable")))
        .with_coverage(coverage(2, "10001", true, Some("5G")))
        .with_coverage(coverage(2, "10001", true, None));
    let resolver = CoverageResolver::from_catalog(Arc::new(catalog));

    let first = resolver.resolve("10001", None).await.unwrap();
    let second = resolver.resolve("10001", None).await.unwrap();

    assert_eq!(slugs(&first), vec!["t-mobile", "xfinity"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_inactive_row_does_not_leak_from_other_zip() {
    let resolver = CoverageResolver::from_catalog(Arc::new(austin_catalog()));

    // defunct-co is active in 73301 but inactive in 78701
    let austin = resolver.resolve("78701", None).await.unwrap();
    assert!(!slugs(&austin).contains(&"defunct-co"));

    let other = resolver.resolve("73301", None).await.unwrap();
    assert_eq!(slugs(&other), vec!["defunct-co"]);
}

// =============================================================================
// Dependency failures
// =============================================================================

#[tokio::test]
async fn test_coverage_failure_is_dependency_error() {
    let catalog = Arc::new(austin_catalog());
    catalog.fail_coverage(true);
    let resolver = CoverageResolver::from_catalog(catalog.clone());

    let err = resolver.resolve("78701", None).await.unwrap_err();
    assert!(matches!(err, ResolveError::Dependency(_)));
    assert!(!err.is_validation());
    assert_eq!(catalog.provider_calls(), 0);
}

#[tokio::test]
async fn test_provider_failure_fails_whole_resolution() {
    let catalog = Arc::new(austin_catalog());
    catalog.fail_providers(true);
    let resolver = CoverageResolver::from_catalog(catalog.clone());

    let err = resolver.resolve("78701", None).await.unwrap_err();
    assert!(matches!(err, ResolveError::Dependency(_)));
    assert_eq!(catalog.coverage_calls(), 1);
}

#[tokio::test]
async fn test_separate_collaborators() {
    let coverage_side = Arc::new(austin_catalog());
    let provider_side = Arc::new(
        InMemoryCatalog::new().with_provider(provider(2, "Spectrum", "spectrum", &["Cable"])),
    );
    let resolver = CoverageResolver::new(coverage_side, provider_side.clone());

    // provider 1 is referenced by coverage but unknown to the provider side
    let providers = resolver.resolve("78701", None).await.unwrap();
    assert_eq!(slugs(&providers), vec!["spectrum"]);
    assert_eq!(provider_side.provider_calls(), 1);
}

// =============================================================================
// Coverage detail & stats
// =============================================================================

#[tokio::test]
async fn test_resolve_with_coverage_on_sqlite() {
    let resolver = CoverageResolver::from_catalog(sample_db());

    let providers = resolver.resolve_with_coverage("78701", None).await.unwrap();
    assert_eq!(providers.len(), 2);

    let att = &providers[0];
    assert_eq!(att.provider.slug, "att-internet");
    assert_eq!(att.covered_technologies, vec!["Fiber", "DSL"]);
    assert_eq!(att.availability_percent, Some(97.0));
    assert_eq!(att.max_speed, Some(5000.0));

    let fiber_only = resolver.resolve_with_coverage("78701", Some("Fiber")).await.unwrap();
    assert_eq!(fiber_only.len(), 1);
    assert_eq!(fiber_only[0].covered_technologies, vec!["Fiber"]);
    assert_eq!(fiber_only[0].availability_percent, Some(82.0));
}

#[tokio::test]
async fn test_sqlite_matches_scenarios() {
    let resolver = CoverageResolver::from_catalog(sample_db());

    let all = resolver.resolve("78701", None).await.unwrap();
    assert_eq!(slugs(&all), vec!["att-internet", "spectrum"]);

    let fiber = resolver.resolve("78701", Some("Fiber")).await.unwrap();
    assert_eq!(slugs(&fiber), vec!["att-internet"]);

    assert!(resolver.resolve("99999", None).await.unwrap().is_empty());
    assert!(resolver.resolve("ABCDE", None).await.unwrap_err().is_validation());
}

#[tokio::test]
async fn test_coverage_stats() {
    let resolver = CoverageResolver::from_catalog(sample_db());

    let stats = resolver.coverage_stats("78701").await.unwrap();
    assert_eq!(stats.provider_count, 2);

    let techs: Vec<(&str, usize)> = stats
        .by_technology
        .iter()
        .map(|t| (t.technology.as_str(), t.providers))
        .collect();
    assert_eq!(techs, vec![("Fiber", 1), ("Cable", 1), ("DSL", 1)]);

    let empty = resolver.coverage_stats("99999").await.unwrap();
    assert_eq!(empty.provider_count, 0);
    assert!(empty.by_technology.is_empty());
}
