use chrono::{DateTime, Utc};

use crate::filter::DealType;
use crate::types::ProductSummary;

pub const DEALS_PER_BUCKET: usize = 8;
const URGENT_BELOW_SECS: u64 = 3600;

// =============================================================================
// DEAL BUCKETS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DealBucket {
    pub deal_type: DealType,
    pub products: Vec<ProductSummary>,
}

impl DealBucket {
    pub fn label(&self) -> &'static str {
        self.deal_type.label()
    }
}

pub fn matches_deal(product: &ProductSummary, deal_type: DealType) -> bool {
    product.deal_type.as_deref() == Some(deal_type.as_str())
        || product.tags.iter().any(|t| t == deal_type.tag())
}

/// Groups on-sale products by deal type, in `DealType::ALL` order. A product
/// may appear in several buckets; empty buckets are dropped.
pub fn group_deals(products: &[ProductSummary], per_bucket: usize) -> Vec<DealBucket> {
    DealType::ALL
        .into_iter()
        .map(|deal_type| DealBucket {
            deal_type,
            products: products
                .iter()
                .filter(|p| matches_deal(p, deal_type))
                .take(per_bucket)
                .cloned()
                .collect(),
        })
        .filter(|bucket| !bucket.products.is_empty())
        .collect()
}

// =============================================================================
// COUNTDOWN
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u64,
}

impl Countdown {
    pub fn new(remaining_secs: u64) -> Self {
        Self { remaining_secs }
    }

    /// Counts down to `deadline`; already-passed deadlines read as zero.
    pub fn until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let secs = (deadline - now).num_seconds().max(0) as u64;
        Self::new(secs)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_secs == 0
    }

    pub fn is_urgent(&self) -> bool {
        self.remaining_secs < URGENT_BELOW_SECS
    }

    /// One second elapses. Stays at zero once finished.
    pub fn tick(&mut self) {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
    }

    /// `[Nd:]HH:MM:SS`
    pub fn format(&self) -> String {
        let secs = self.remaining_secs;
        let days = secs / 86_400;
        let hours = (secs % 86_400) / 3600;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;
        if days > 0 {
            format!("{}d:{:02}:{:02}:{:02}", days, hours, minutes, seconds)
        } else {
            format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
        }
    }

    pub fn label(&self) -> String {
        format!("Ends in: {}", self.format())
    }
}
