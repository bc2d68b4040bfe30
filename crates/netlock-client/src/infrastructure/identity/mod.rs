//! Machine identity: the MAC address of the first allow-listed interface.
//!
//! Interface names come from `if-addrs` and hardware addresses from
//! `mac_address`.  Each allow-list entry is a regular expression anchored at
//! the start of the interface name, so `Ethernet` also matches `Ethernet 2`
//! while `^Ethernet$` does not.  An empty allow-list accepts every interface.

use regex::Regex;
use tracing::debug;

use crate::application::ports::{IdentityError, IdentityResolver};

/// Resolves identities from the live network interfaces.
pub struct InterfaceIdentityResolver {
    patterns: Vec<Regex>,
}

impl InterfaceIdentityResolver {
    /// Compiles the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Pattern`] for an invalid expression.
    pub fn new(patterns: &[String]) -> Result<Self, IdentityError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(&format!("^(?:{p})")).map_err(|source| IdentityError::Pattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }
}

impl IdentityResolver for InterfaceIdentityResolver {
    fn resolve(&self) -> Result<Vec<String>, IdentityError> {
        let interfaces = if_addrs::get_if_addrs().map_err(IdentityError::Enumerate)?;

        // get_if_addrs yields one entry per address; keep the first per name.
        let mut names: Vec<String> = Vec::new();
        for iface in interfaces.into_iter().filter(|i| !i.is_loopback()) {
            if !names.contains(&iface.name) {
                names.push(iface.name);
            }
        }

        let candidates = names.into_iter().filter_map(|name| {
            match mac_address::mac_address_by_name(&name) {
                Ok(Some(mac)) => Some((name, mac.bytes())),
                Ok(None) => None,
                Err(e) => {
                    debug!(interface = %name, "no hardware address: {e}");
                    None
                }
            }
        });

        Ok(select_identities(candidates, &self.patterns))
    }
}

/// Filters `(interface name, hardware address)` pairs through the
/// allow-list and formats the surviving addresses.
///
/// All-zero addresses (tunnels, loopback) are skipped.  Order is preserved.
pub fn select_identities<I>(interfaces: I, patterns: &[Regex]) -> Vec<String>
where
    I: IntoIterator<Item = (String, [u8; 6])>,
{
    interfaces
        .into_iter()
        .filter(|(_, mac)| *mac != [0u8; 6])
        .filter(|(name, _)| patterns.is_empty() || patterns.iter().any(|p| p.is_match(name)))
        .map(|(_, mac)| format_mac(mac))
        .collect()
}

/// Formats a hardware address as `AA:BB:CC:DD:EE:FF`.
pub fn format_mac(mac: [u8; 6]) -> String {
    mac.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Fixed identity list, used by tests.
pub struct StaticIdentityResolver {
    identities: Vec<String>,
}

impl StaticIdentityResolver {
    pub fn new(identities: Vec<String>) -> Self {
        Self { identities }
    }
}

impl IdentityResolver for StaticIdentityResolver {
    fn resolve(&self) -> Result<Vec<String>, IdentityError> {
        Ok(self.identities.clone())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const MAC_A: [u8; 6] = [0xAA, 0xBB, 0xCC, 0x00, 0x11, 0x22];
    const MAC_B: [u8; 6] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];

    fn compile(patterns: &[&str]) -> Vec<Regex> {
        let owned: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        InterfaceIdentityResolver::new(&owned).unwrap().patterns
    }

    fn sample() -> Vec<(String, [u8; 6])> {
        vec![
            ("Wi-Fi".to_string(), MAC_B),
            ("Ethernet".to_string(), MAC_A),
            ("Ethernet 2".to_string(), MAC_B),
        ]
    }

    #[test]
    fn test_format_mac_is_uppercase_colon_separated() {
        assert_eq!(format_mac(MAC_A), "AA:BB:CC:00:11:22");
    }

    #[test]
    fn test_exact_pattern_selects_single_interface() {
        let patterns = compile(&["^Ethernet$"]);

        let ids = select_identities(sample(), &patterns);

        assert_eq!(ids, vec!["AA:BB:CC:00:11:22".to_string()]);
    }

    #[test]
    fn test_pattern_matches_at_start_of_name() {
        // "thernet" would match inside "Ethernet" with an unanchored search.
        let patterns = compile(&["thernet"]);
        assert!(select_identities(sample(), &patterns).is_empty());

        let patterns = compile(&["Ethernet"]);
        assert_eq!(select_identities(sample(), &patterns).len(), 2);
    }

    #[test]
    fn test_empty_pattern_list_accepts_all_in_order() {
        let ids = select_identities(sample(), &[]);

        assert_eq!(
            ids,
            vec![
                "01:02:03:04:05:06".to_string(),
                "AA:BB:CC:00:11:22".to_string(),
                "01:02:03:04:05:06".to_string(),
            ]
        );
    }

    #[test]
    fn test_zero_mac_is_skipped() {
        let ifaces = vec![("Ethernet".to_string(), [0u8; 6])];

        assert!(select_identities(ifaces, &compile(&["Ethernet"])).is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = InterfaceIdentityResolver::new(&["(".to_string()]);

        assert!(matches!(result, Err(IdentityError::Pattern { .. })));
    }

    #[test]
    fn test_static_resolver_returns_configured_list() {
        let resolver = StaticIdentityResolver::new(vec!["AA:BB:CC:DD:EE:FF".into()]);

        assert_eq!(resolver.resolve().unwrap(), vec!["AA:BB:CC:DD:EE:FF"]);
    }
}
