//! Integration tests for printer port discovery
//!
//! These tests drive the scanner through fixed port listings and verify:
//! - Tier ordering of ranked candidates
//! - Enumeration order within a tier
//! - Failure propagation from the port source
//! - Keyword overrides through the scanner configuration

use thermal_detect::{
    Candidate, DetectError, FixedPorts, Keyword, MatchTier, PortDescriptor, PortScanner,
    PortSource, ScannerConfig,
};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// A port source whose OS listing call always fails
    pub struct BrokenSource;

    impl PortSource for BrokenSource {
        fn list_ports(&self) -> Result<Vec<PortDescriptor>, DetectError> {
            Err(DetectError::EnumerationFailed(
                "serial subsystem unavailable".into(),
            ))
        }
    }

    pub fn scanner(ports: Vec<PortDescriptor>) -> PortScanner<FixedPorts> {
        PortScanner::with_source(FixedPorts(ports))
    }

    pub fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.port()).collect()
    }
}

// ============================================================================
// Ranking
// ============================================================================

#[test]
fn vendor_matches_come_first_in_enumeration_order() {
    let scanner = helpers::scanner(vec![
        PortDescriptor::new("COM3", "Standard Serial over Bluetooth link"),
        PortDescriptor::new("COM8", "Netum NT-1809D"),
        PortDescriptor::new("COM1", "Communications Port"),
        PortDescriptor::new("/dev/rfcomm0", "n/a"),
        PortDescriptor::new("COM9", "POS-58 Printer"),
    ]);

    let candidates = scanner.discover_candidates().unwrap();

    assert_eq!(
        helpers::names(&candidates),
        vec!["COM8", "COM9", "COM3", "/dev/rfcomm0"]
    );
}

#[test]
fn office_printer_does_not_outrank_thermal_printer() {
    let scanner = helpers::scanner(vec![
        PortDescriptor::new("/dev/ttyACM0", "HP LaserJet USB Printer"),
        PortDescriptor::new("/dev/rfcomm0", "n/a"),
        PortDescriptor::new("/dev/cu.NT-1809D", "n/a"),
    ]);

    let candidates = scanner.discover_candidates().unwrap();

    assert_eq!(
        helpers::names(&candidates),
        vec!["/dev/cu.NT-1809D", "/dev/ttyACM0", "/dev/rfcomm0"]
    );
    assert_eq!(candidates[1].tier, MatchTier::Generic);
}

#[test]
fn no_ports_is_empty_not_error() {
    let scanner = helpers::scanner(Vec::new());
    assert!(scanner.discover_candidates().unwrap().is_empty());
}

#[test]
fn no_matching_ports_is_empty() {
    let scanner = helpers::scanner(vec![
        PortDescriptor::new("/dev/ttyUSB0", "FT232R USB UART"),
        PortDescriptor::new("/dev/ttyS0", "n/a"),
    ]);
    assert!(scanner.discover_candidates().unwrap().is_empty());
}

#[test]
fn enumeration_failure_propagates() {
    let scanner = PortScanner::with_source(helpers::BrokenSource);

    let result = scanner.discover_candidates();

    assert!(matches!(result, Err(DetectError::EnumerationFailed(_))));
}

#[test]
fn custom_keywords_replace_defaults() {
    let config = ScannerConfig {
        keywords: vec![
            Keyword::new(MatchTier::Vendor, "goojprt"),
            Keyword::new(MatchTier::Generic, "wireless"),
        ],
        skip_patterns: Vec::new(),
    };
    let scanner = helpers::scanner(vec![
        PortDescriptor::new("COM4", "Netum NT-1809D"),
        PortDescriptor::new("COM5", "Wireless serial"),
        PortDescriptor::new("COM6", "Goojprt PT-210"),
    ])
    .with_config(config);

    let candidates = scanner.discover_candidates().unwrap();

    assert_eq!(helpers::names(&candidates), vec!["COM6", "COM5"]);
}

#[test]
fn discovery_is_not_cached() {
    let scanner = helpers::scanner(vec![PortDescriptor::new("COM8", "Netum")]);

    let first = scanner.discover_candidates().unwrap();
    let second = scanner.discover_candidates().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;
    use thermal_detect::{default_keywords, rank_candidates};

    // Descriptions drawn from what real hosts report, plus noise
    fn description() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Netum NT-1809D".to_string()),
            Just("POS-58 Printer".to_string()),
            Just("Standard Serial over Bluetooth link".to_string()),
            Just("Communications Port".to_string()),
            Just("FT232R USB UART".to_string()),
            "[a-z ]{0,12}",
        ]
    }

    fn ports() -> impl Strategy<Value = Vec<PortDescriptor>> {
        prop::collection::vec(description(), 0..12).prop_map(|descs| {
            descs
                .into_iter()
                .enumerate()
                .map(|(i, d)| PortDescriptor::new(format!("COM{}", i + 1), d))
                .collect()
        })
    }

    fn index_of(ports: &[PortDescriptor], name: &str) -> usize {
        ports.iter().position(|p| p.port == name).unwrap()
    }

    proptest! {
        #[test]
        fn vendor_strictly_before_generic(ports in ports()) {
            let ranked = rank_candidates(ports, &default_keywords());

            if let Some(first_generic) = ranked.iter().position(|c| c.tier == MatchTier::Generic) {
                prop_assert!(ranked[first_generic..].iter().all(|c| c.tier == MatchTier::Generic));
            }
        }

        #[test]
        fn enumeration_order_kept_within_tier(ports in ports()) {
            let ranked = rank_candidates(ports.clone(), &default_keywords());

            for pair in ranked.windows(2) {
                if pair[0].tier == pair[1].tier {
                    prop_assert!(index_of(&ports, pair[0].port()) < index_of(&ports, pair[1].port()));
                }
            }
        }

        #[test]
        fn ranking_never_invents_ports(ports in ports()) {
            let ranked = rank_candidates(ports.clone(), &default_keywords());

            prop_assert!(ranked.len() <= ports.len());
            for candidate in &ranked {
                prop_assert!(ports.contains(&candidate.descriptor));
            }
        }
    }
}
