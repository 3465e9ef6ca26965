// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Certificate validity resolution.

use std::time::Duration;

/// Resolves the effective TTL for an enrollment.
///
/// A zero `requested` TTL falls back to `default`. The result is then clamped
/// to `max` when `max` is non-zero; an over-long request is shortened, never
/// rejected.
///
/// ```
/// use std::time::Duration;
/// use cagw_core::ttl::resolve_ttl;
///
/// let hour = Duration::from_secs(3600);
/// assert_eq!(resolve_ttl(Duration::ZERO, hour, Duration::ZERO), hour);
/// assert_eq!(resolve_ttl(hour * 48, hour, hour * 24), hour * 24);
/// ```
pub fn resolve_ttl(requested: Duration, default: Duration, max: Duration) -> Duration {
    let ttl = if requested.is_zero() { default } else { requested };
    if !max.is_zero() && ttl > max { max } else { ttl }
}

/// Renders a TTL as the gateway's validity period, truncated to whole minutes.
///
/// ```
/// use std::time::Duration;
/// use cagw_core::ttl::validity_period;
///
/// assert_eq!(validity_period(Duration::from_secs(3600)), "PT60M");
/// assert_eq!(validity_period(Duration::from_secs(119)), "PT1M");
/// ```
pub fn validity_period(ttl: Duration) -> String {
    format!("PT{}M", ttl.as_secs() / 60)
}
