//! Order status classification.

#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusType {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

// Checked top to bottom; the first set with a hit wins.
const RULES: &[(&[&str], StatusType)] = &[
    (&["pending", "awaiting"], StatusType::Pending),
    (&["processing", "preparing"], StatusType::Processing),
    (&["shipped", "transit"], StatusType::Shipped),
    (&["delivered", "completed"], StatusType::Delivered),
    (&["cancelled", "refunded"], StatusType::Cancelled),
];

impl StatusType {
    /// Classify a free-form status label by case-insensitive keyword match.
    /// Labels matching nothing are treated as pending.
    pub fn classify(label: &str) -> Self {
        let lower = label.to_lowercase();
        RULES
            .iter()
            .find(|(words, _)| words.iter().any(|w| lower.contains(w)))
            .map(|(_, ty)| *ty)
            .unwrap_or(StatusType::Pending)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_labels() {
        let cases = [
            ("Awaiting Payment", StatusType::Pending),
            ("Preparing Shipment", StatusType::Processing),
            ("In Transit", StatusType::Shipped),
            ("Completed", StatusType::Delivered),
            ("Refunded", StatusType::Cancelled),
            ("Something Else", StatusType::Pending),
        ];
        for (label, want) in cases {
            assert_eq!(StatusType::classify(label), want, "label {label:?}");
        }
    }

    #[test]
    fn earlier_rule_wins_on_multiple_keywords() {
        // "processing" is checked before "shipped"
        assert_eq!(StatusType::classify("Shipped, processing return"), StatusType::Processing);
        // "shipped" before "cancelled"
        assert_eq!(StatusType::classify("CANCELLED after shipped"), StatusType::Shipped);
    }

    #[test]
    fn empty_label_is_pending() {
        assert_eq!(StatusType::classify(""), StatusType::Pending);
    }
}
