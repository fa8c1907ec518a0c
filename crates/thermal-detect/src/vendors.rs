//! Keyword table for recognizing thermal printer ports
//!
//! Printers paired over Bluetooth SPP show up as ordinary serial ports, so
//! the only handle we have on them is the text the OS attaches to the port:
//! the friendly description, the hardware id and the device name itself.
//! Each keyword carries a tier; vendor keywords are strong evidence that the
//! port is a receipt printer, generic keywords only say it is a wireless
//! serial link that might be one.

use serde::{Deserialize, Serialize};

/// Match confidence for a keyword
///
/// Ordering is by confidence: `Vendor` sorts before `Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    /// Known thermal printer vendor or model name
    Vendor,
    /// Generic Bluetooth / serial link wording
    Generic,
}

impl MatchTier {
    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::Vendor => "vendor",
            MatchTier::Generic => "generic",
        }
    }
}

/// A keyword paired with the tier it grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub tier: MatchTier,
    pub text: String,
}

impl Keyword {
    pub fn new(tier: MatchTier, text: impl Into<String>) -> Self {
        Self {
            tier,
            text: text.into(),
        }
    }
}

/// Built-in keyword list, matched case-insensitively as substrings
pub const DEFAULT_KEYWORDS: &[(MatchTier, &str)] = &[
    // Netum NT-1809D / NT-5890 and relabelled clones
    (MatchTier::Vendor, "netum"),
    (MatchTier::Vendor, "nt-1809"),
    (MatchTier::Vendor, "nt-5890"),
    // Generic 58mm POS printer firmware names
    (MatchTier::Vendor, "pos-58"),
    (MatchTier::Vendor, "pos58"),
    (MatchTier::Vendor, "mtp-"),
    // Windows: "Standard Serial over Bluetooth link"
    (MatchTier::Generic, "bluetooth"),
    // Windows hardware ids of SPP ports
    (MatchTier::Generic, "bthenum"),
    // Linux: /dev/rfcommN
    (MatchTier::Generic, "rfcomm"),
    (MatchTier::Generic, "spp"),
    // Also matches office printers' serial gadgets
    (MatchTier::Generic, "printer"),
];

/// The built-in keyword list as owned values
pub fn default_keywords() -> Vec<Keyword> {
    DEFAULT_KEYWORDS
        .iter()
        .map(|(tier, text)| Keyword::new(*tier, *text))
        .collect()
}

/// Find the strongest keyword contained in any of the given strings
///
/// Returns the tier and the keyword that produced it. Among keywords of the
/// same tier the first one in list order wins.
pub fn best_match<'k>(keywords: &'k [Keyword], fields: &[&str]) -> Option<&'k Keyword> {
    let haystacks: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();

    let mut best: Option<&Keyword> = None;
    for keyword in keywords {
        let needle = keyword.text.to_lowercase();
        if needle.is_empty() || !haystacks.iter().any(|h| h.contains(&needle)) {
            continue;
        }
        match best {
            Some(current) if current.tier <= keyword.tier => {}
            _ => best = Some(keyword),
        }
    }
    best
}

/// Pull a Bluetooth device address out of a hardware id string
///
/// Windows reports SPP ports with ids such as
/// `BTHENUM\{00001101-...}_LOCALMFG&0002\7&2A4E3C&0&6622FA2B78F1_C00000000`;
/// the first run of exactly twelve hex digits outside the braced service
/// GUID is the remote address.
pub fn extract_bt_address(hwid: &str) -> Option<String> {
    let mut depth = 0usize;
    let upper: String = hwid
        .chars()
        .map(|c| match c {
            '{' => {
                depth += 1;
                ' '
            }
            '}' => {
                depth = depth.saturating_sub(1);
                ' '
            }
            _ if depth > 0 => ' ',
            _ => c.to_ascii_uppercase(),
        })
        .collect();
    let bytes = upper.as_bytes();

    let mut start = 0;
    while start < bytes.len() {
        if !bytes[start].is_ascii_hexdigit() {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_hexdigit() {
            end += 1;
        }
        if end - start == 12 {
            let digits = &upper[start..end];
            let pairs: Vec<&str> = (0..12).step_by(2).map(|i| &digits[i..i + 2]).collect();
            return Some(pairs.join(":"));
        }
        start = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(MatchTier::Vendor < MatchTier::Generic);
    }

    #[test]
    fn test_vendor_beats_generic() {
        let keywords = default_keywords();
        let hit = best_match(&keywords, &["Netum Bluetooth Printer", "COM8"]).unwrap();
        assert_eq!(hit.tier, MatchTier::Vendor);
        assert_eq!(hit.text, "netum");
    }

    #[test]
    fn test_generic_only() {
        let keywords = default_keywords();
        let hit = best_match(&keywords, &["Standard Serial over Bluetooth link (COM4)"]).unwrap();
        assert_eq!(hit.tier, MatchTier::Generic);
        assert_eq!(hit.text, "bluetooth");
    }

    #[test]
    fn test_printer_word_is_generic() {
        let keywords = default_keywords();
        let hit = best_match(&keywords, &["HP LaserJet USB Printer", "/dev/ttyACM0"]).unwrap();
        assert_eq!(hit.tier, MatchTier::Generic);
        assert_eq!(hit.text, "printer");

        let hit = best_match(&keywords, &["POS-58 Printer", "COM9"]).unwrap();
        assert_eq!(hit.tier, MatchTier::Vendor);
    }

    #[test]
    fn test_case_insensitive() {
        let keywords = vec![Keyword::new(MatchTier::Vendor, "NETUM")];
        assert!(best_match(&keywords, &["/dev/cu.netum-nt1809"]).is_some());
    }

    #[test]
    fn test_no_match() {
        let keywords = default_keywords();
        assert!(best_match(&keywords, &["FT232R USB UART", "/dev/ttyUSB0"]).is_none());
    }

    #[test]
    fn test_empty_keyword_ignored() {
        let keywords = vec![Keyword::new(MatchTier::Vendor, "")];
        assert!(best_match(&keywords, &["anything"]).is_none());
    }

    #[test]
    fn test_extract_bt_address() {
        let hwid = r"BTHENUM\{00001101-0000-1000-8000-00805F9B34FB}_LOCALMFG&0002\7&2A4E3C&0&6622FA2B78F1_C00000000";
        assert_eq!(
            extract_bt_address(hwid).as_deref(),
            Some("66:22:FA:2B:78:F1")
        );
    }

    #[test]
    fn test_extract_bt_address_lowercase() {
        assert_eq!(
            extract_bt_address("bt 0011627a9bc4").as_deref(),
            Some("00:11:62:7A:9B:C4")
        );
    }

    #[test]
    fn test_extract_bt_address_none() {
        assert_eq!(extract_bt_address("USB VID:PID=0403:6001 SER=A12345"), None);
        assert_eq!(extract_bt_address(""), None);
    }

    #[test]
    fn test_extract_bt_address_skips_service_guid() {
        let hwid = r"BTHENUM\{00001101-0000-1000-8000-00805F9B34FB}_LOCALMFG&0000\7&1F2C&0&000000000000_00000000";
        assert_eq!(
            extract_bt_address(hwid).as_deref(),
            Some("00:00:00:00:00:00")
        );
        assert_eq!(
            extract_bt_address("{00001101-0000-1000-8000-00805F9B34FB}"),
            None
        );
    }
}
