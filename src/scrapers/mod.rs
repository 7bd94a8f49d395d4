//! Listing scrapers for the configured news sources.
//!
//! All sources share one pipeline:
//!
//! 1. **Fetching** ([`fetch`]): GET each listing page with browser headers
//! 2. **Extracting** ([`extract`]): apply the source's selector recipe
//! 3. **Running** ([`run`]): walk the active sources in order, filter by the
//!    cutoff date and merge the results
//!
//! Adding a site means adding a [`crate::models::Source`] entry, not code.
//!
//! Failures are contained: a broken item is skipped, an unreachable source
//! yields no articles and a warning, and the run carries on.

pub mod extract;
pub mod fetch;
pub mod run;
