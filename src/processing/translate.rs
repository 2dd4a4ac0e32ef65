//! Address substitution for NAT style rules.

use crate::error::{AlgebraError, Result};
use crate::models::{AddressSet, IpFamily, NetworkGroup};
use log::debug;

/// Rewrite `input` through `translator`.
///
/// An empty translator passes the input through. Otherwise, per family, the input is kept when
/// the translator covers it and replaced by the whole translator list when it does not.
///
/// # Returns
/// * `Err(TranslatorFamilyMissing)` - if `input` has addresses in a family the translator lacks
///
/// # Examples
/// ```
/// use network_algebra::models::NetworkGroup;
/// use network_algebra::processing::translate;
///
/// let input = NetworkGroup::parse("1.1.1.0/24").unwrap();
/// let pool = NetworkGroup::parse("1.1.1.1-1.1.1.255").unwrap();
/// assert_eq!(translate(&input, &pool).unwrap(), pool);
/// ```
pub fn translate(input: &NetworkGroup, translator: &NetworkGroup) -> Result<NetworkGroup> {
    if translator.is_empty() {
        return Ok(input.clone());
    }
    let mut out = NetworkGroup::new();
    for family in [IpFamily::V4, IpFamily::V6] {
        let source = input.network_list(family);
        let target = translator.network_list(family);
        if source.is_empty() {
            continue;
        }
        if target.is_empty() {
            return Err(AlgebraError::TranslatorFamilyMissing(family));
        }
        if target.matches(source) {
            out.add_list(source);
        } else {
            debug!("{} translated to {}", source, target);
            out.add_list(target);
        }
    }
    Ok(out)
}
