//! Commit range analysis: parsing bug references out of commits and
//! deciding which commits make it into the changelog.
pub mod classifier;
pub mod commit;
pub mod validate;
