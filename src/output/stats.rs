//! Statistics over a finished crawl
//!
//! This module provides functionality for summarizing extracted records by
//! type and region, and for printing those counts.

use crate::item::{ItemRecord, ItemType};
use crate::output::traits::CrawlSummary;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Total number of records produced
    pub total_records: usize,

    /// Count of records by item type
    pub records_by_type: BTreeMap<ItemType, usize>,

    /// Count of records by region
    pub records_by_region: BTreeMap<String, usize>,

    /// Records that carry a price
    pub with_price: usize,

    /// Records that carry an image link
    pub with_image: usize,
}

impl CrawlStatistics {
    /// Tallies a set of records
    pub fn from_records(records: &[ItemRecord]) -> Self {
        let mut stats = Self {
            total_records: records.len(),
            ..Self::default()
        };

        for record in records {
            *stats.records_by_type.entry(record.item_type).or_default() += 1;
            *stats
                .records_by_region
                .entry(record.region.clone())
                .or_default() += 1;
            if record.price.is_some() {
                stats.with_price += 1;
            }
            if record.image_link.is_some() {
                stats.with_image += 1;
            }
        }

        stats
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(summary: &CrawlSummary, stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Records extracted: {}", stats.total_records);
    println!("  Items skipped: {}", summary.items_skipped);
    println!("  Pages visited: {}", summary.pages_visited);
    println!("  Links discovered: {}", summary.links_discovered);
    println!("  Stopped: {}", summary.stop_reason);
    println!();

    println!("Records by Type:");
    for (item_type, count) in &stats.records_by_type {
        println!("  {}: {}", item_type, count);
    }
    println!();

    println!("Records by Region:");
    // Sort regions by count (descending)
    let mut region_counts: Vec<_> = stats.records_by_region.iter().collect();
    region_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (region, count) in region_counts {
        let percentage = if stats.total_records > 0 {
            (*count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", region, count, percentage);
    }
    println!();

    println!(
        "With price: {} / {}, with image: {} / {}",
        stats.with_price, stats.total_records, stats.with_image, stats.total_records
    );
    println!(
        "Success Rate: {:.1}% ({} extracted, {} skipped)",
        summary.success_rate(),
        summary.count,
        summary.items_skipped
    );
}
