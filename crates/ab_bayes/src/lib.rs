//! The posterior comparison engine.
//!
//! Inference backends ([`remote_backend`], [`local_backend`]) turn a [`VariantSet`] into one
//! posterior sample collection per variant. The [`comparison`] engine reduces a control/variant
//! pair to a [`ComparisonSummary`] plus the absolute "B vs A" difference posterior, and the
//! [`density`] estimator turns any posterior into a smoothed curve for plotting.
//!
//! [`VariantSet`]: ab_bayes_types::variant::VariantSet
//! [`ComparisonSummary`]: ab_bayes_types::summary::ComparisonSummary

pub mod analysis;
pub mod comparison;
pub mod correlation;
pub mod density;
pub mod diagnostics;
pub mod local_backend;
pub mod mcmc;
pub mod percentile;
pub mod remote_backend;
pub mod timing;
